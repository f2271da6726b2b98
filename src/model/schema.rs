//! 模型模式
//!
//! 每个模型类型在管理器创建时构建一次，之后只读：集合名、字段表、访问器表和验证器列表

use crate::model::accessor::AccessorTable;
use crate::model::conversion::coerce;
use crate::model::field_types::{FieldDefinition, FieldType, IndexDefinition, ModelMeta};
use crate::model::traits::Model;
use crate::model::validation::FieldValidator;
use crate::types::{DataValue, Document};
use crate::utils::inflector::Inflector;
use std::collections::HashMap;

/// 已解析的模型模式
#[derive(Debug, Clone)]
pub struct ModelSchema {
    model_name: String,
    collection_name: String,
    fields: HashMap<String, FieldDefinition>,
    indexes: Vec<IndexDefinition>,
    accessors: AccessorTable,
    validators: Vec<FieldValidator>,
}

impl ModelSchema {
    /// 从模型类型构建
    pub fn of<M: Model>(inflector: &dyn Inflector) -> Self {
        Self::new(&M::model_name(), M::meta(), M::validators(), inflector)
    }

    /// 从元数据构建，未指定集合名时由模型名推导
    pub fn new(
        model_name: &str,
        meta: ModelMeta,
        validators: Vec<FieldValidator>,
        inflector: &dyn Inflector,
    ) -> Self {
        let collection_name = match meta.collection_name {
            Some(name) if !name.is_empty() => name,
            _ => inflector.tableize(model_name),
        };
        let accessors = AccessorTable::from_fields(meta.fields.keys());
        Self {
            model_name: model_name.to_string(),
            collection_name,
            fields: meta.fields,
            indexes: meta.indexes,
            accessors,
            validators,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    pub fn collection_name(&self) -> &str {
        &self.collection_name
    }

    /// 字段表
    pub fn fields_of(&self) -> &HashMap<String, FieldDefinition> {
        &self.fields
    }

    pub fn field_type(&self, field: &str) -> Option<&FieldType> {
        self.fields.get(field).map(|definition| &definition.field_type)
    }

    pub fn indexes(&self) -> &[IndexDefinition] {
        &self.indexes
    }

    pub fn accessors(&self) -> &AccessorTable {
        &self.accessors
    }

    pub fn validators(&self) -> &[FieldValidator] {
        &self.validators
    }

    /// 按声明类型转换单个字段，未声明字段原样返回
    pub fn coerce_field(&self, field: &str, value: DataValue) -> DataValue {
        match self.field_type(field) {
            Some(field_type) => coerce(field_type, value),
            None => value,
        }
    }

    /// 转换整行
    pub fn coerce_row(&self, row: Document) -> Document {
        row.into_iter()
            .map(|(field, value)| {
                let value = self.coerce_field(&field, value);
                (field, value)
            })
            .collect()
    }

    /// 原地转换属性表
    pub fn coerce_in_place(&self, row: &mut Document) {
        for (field, value) in row.iter_mut() {
            if let Some(field_type) = self.field_type(field) {
                let raw = std::mem::replace(value, DataValue::Null);
                *value = coerce(field_type, raw);
            }
        }
    }
}

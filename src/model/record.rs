//! 记录实例
//!
//! 单条记录的属性表、新旧标记和验证失败列表，以及验证、保存、删除和动态访问器

use crate::debug_log;
use crate::error::QuickRecordResult;
use crate::model::accessor::AccessorKind;
use crate::model::manager::ModelManager;
use crate::model::traits::Model;
use crate::model::validation::ValidationFailure;
use crate::quick_error;
use crate::types::{DataValue, Document, Filter, WriteOptions};
use rat_logger::{debug, warn};
use std::sync::Arc;

/// 标识符键
pub const ID_KEY: &str = "_id";

/// 动态访问器调用的结果
pub enum CallResult<'a, M: Model> {
    /// `get` 取到的值
    Value(DataValue),
    /// `set` 返回记录本身，便于链式调用
    Record(&'a mut ActiveRecord<M>),
}

impl<'a, M: Model> CallResult<'a, M> {
    pub fn value(self) -> Option<DataValue> {
        match self {
            CallResult::Value(value) => Some(value),
            CallResult::Record(_) => None,
        }
    }

    pub fn record(self) -> Option<&'a mut ActiveRecord<M>> {
        match self {
            CallResult::Record(record) => Some(record),
            CallResult::Value(_) => None,
        }
    }
}

/// Active Record 实例
pub struct ActiveRecord<M: Model> {
    attributes: Document,
    is_new: bool,
    errors: Vec<ValidationFailure>,
    manager: Arc<ModelManager<M>>,
}

impl<M: Model> ActiveRecord<M> {
    /// 构造记录
    ///
    /// 输入中的 `id` 键改名为 `_id`；`is_new` 为 true 时触发 `after_new`
    pub fn new(manager: Arc<ModelManager<M>>, mut attributes: Document, is_new: bool) -> Self {
        if let Some(id) = attributes.remove("id") {
            if attributes.contains_key(ID_KEY) {
                warn!("同时给出了 id 和 _id，忽略 id: {}", id);
            } else {
                attributes.insert(ID_KEY.to_string(), id);
            }
        }

        let mut record = Self {
            attributes,
            is_new,
            errors: Vec::new(),
            manager,
        };
        if is_new {
            M::after_new(&mut record);
        }
        record
    }

    pub fn manager(&self) -> &Arc<ModelManager<M>> {
        &self.manager
    }

    /// 全部属性
    pub fn attributes(&self) -> &Document {
        &self.attributes
    }

    pub fn into_attributes(self) -> Document {
        self.attributes
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// 最近一次验证的失败记录
    pub fn errors(&self) -> &[ValidationFailure] {
        &self.errors
    }

    /// 读取属性，缺失时返回 Null；`id` 键读取 `_id`
    pub fn get(&self, key: &str) -> DataValue {
        let key = if key == "id" { ID_KEY } else { key };
        self.attributes.get(key).cloned().unwrap_or(DataValue::Null)
    }

    /// 写入属性；`id` 键写到 `_id`
    pub fn set(&mut self, key: &str, value: impl Into<DataValue>) -> &mut Self {
        let key = if key == "id" { ID_KEY } else { key };
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    /// 记录标识符
    pub fn id(&self) -> Option<&DataValue> {
        self.attributes.get(ID_KEY)
    }

    pub fn set_id(&mut self, id: impl Into<DataValue>) -> &mut Self {
        self.attributes.insert(ID_KEY.to_string(), id.into());
        self
    }

    /// 动态访问器调用：`getFirstName()`、`setFirstName(value)`
    ///
    /// `get` 忽略参数且从不失败；`set` 必须恰好一个参数
    pub fn call(&mut self, method: &str, args: Vec<DataValue>) -> QuickRecordResult<CallResult<'_, M>> {
        let resolved = self
            .manager
            .schema()
            .accessors()
            .resolve(method, self.manager.inflector())?;

        match resolved.kind {
            AccessorKind::Get => Ok(CallResult::Value(self.get(&resolved.key))),
            AccessorKind::Set => {
                let mut args = args;
                if args.len() != 1 {
                    return Err(quick_error!(
                        accessor,
                        method,
                        format!("setter 需要恰好一个参数，实际 {} 个", args.len())
                    ));
                }
                let value = args.remove(0);
                Ok(CallResult::Record(self.set(&resolved.key, value)))
            }
        }
    }

    /// 按访问器属性名读取，用于验证器
    fn property_value(&self, property: &str) -> DataValue {
        let key = match self.manager.schema().accessors().lookup(property) {
            Some(key) => key.to_string(),
            None => self.manager.inflector().to_snake_case(property),
        };
        self.get(&key)
    }

    /// 验证记录
    ///
    /// 按声明类型原地转换属性，依次执行 before_validation、验证器（遇到第一个失败即停止）、
    /// after_validation
    pub fn validate(&mut self) -> bool {
        self.errors.clear();
        let manager = self.manager.clone();
        let schema = manager.schema();

        schema.coerce_in_place(&mut self.attributes);
        M::before_validation(self);

        let mut valid = true;
        for validator in schema.validators() {
            let value = self.property_value(&validator.property);
            if !validator.check(&value) {
                debug_log!("验证失败: model={}, field={}, value={:?}", schema.model_name(), validator.property, value);
                self.errors.push(ValidationFailure {
                    field: validator.property.clone(),
                });
                valid = false;
                break;
            }
        }

        M::after_validation(self);
        valid
    }

    /// 保存记录
    ///
    /// 验证失败时返回 false 且不访问存储；成功写入后标记为非新记录
    pub async fn save(&mut self, options: &WriteOptions) -> QuickRecordResult<bool> {
        if !self.validate() {
            return Ok(false);
        }
        M::before_save(self);

        let collection = self.manager.collection().await?;
        let id = collection.save(&self.attributes, options).await?;
        if !self.attributes.contains_key(ID_KEY) {
            self.attributes.insert(ID_KEY.to_string(), id);
        }
        self.is_new = false;
        debug!("保存 {}: _id={:?}", self.manager.collection_name(), self.id());

        M::after_save(self);
        Ok(true)
    }

    /// 删除记录对应的文档
    ///
    /// 新记录不会访问存储；返回是否发出了删除请求
    pub async fn destroy(&mut self) -> QuickRecordResult<bool> {
        M::before_destroy(self);
        if self.is_new {
            return Ok(false);
        }
        let id = match self.id() {
            Some(id) => id.clone(),
            None => {
                warn!("记录没有 _id，跳过删除: collection={}", self.manager.collection_name());
                return Ok(false);
            }
        };

        let filter = Filter::new().eq(ID_KEY, id.clone());
        let collection = self.manager.collection().await?;
        collection.remove(&filter, &WriteOptions::new().just_one(true)).await?;
        debug!("删除 {}: _id={:?}", self.manager.collection_name(), id);
        Ok(true)
    }
}

impl<M: Model> Clone for ActiveRecord<M> {
    fn clone(&self) -> Self {
        Self {
            attributes: self.attributes.clone(),
            is_new: self.is_new,
            errors: self.errors.clone(),
            manager: self.manager.clone(),
        }
    }
}

impl<M: Model> std::fmt::Debug for ActiveRecord<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveRecord")
            .field("model", &self.manager.schema().model_name())
            .field("attributes", &self.attributes)
            .field("is_new", &self.is_new)
            .field("errors", &self.errors)
            .finish()
    }
}

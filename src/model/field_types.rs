//! 字段类型定义模块
//!
//! 定义模型字段的类型、选项和模型元数据

use crate::types::{DataValue, IndexKeys, IndexOptions};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 字段类型枚举
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// 布尔类型
    Boolean,
    /// 整数类型
    Integer,
    /// 浮点数类型
    Float,
    /// 字符串类型
    String,
    /// 数组类型（异构有序列表）
    Array,
    /// 对象类型（无序键值结构）
    Object,
    /// 日期类型（存储原生时间戳）
    Date,
    /// 未识别的类型名，值原样传递
    Untyped(String),
}

impl FieldType {
    /// 按类型名解析，接受常见别名，未知名称得到 `Untyped`
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => FieldType::Boolean,
            "int" | "integer" => FieldType::Integer,
            "float" | "double" | "real" => FieldType::Float,
            "str" | "string" => FieldType::String,
            "arr" | "array" => FieldType::Array,
            "obj" | "object" => FieldType::Object,
            "date" => FieldType::Date,
            _ => FieldType::Untyped(name.to_string()),
        }
    }

    /// 规范类型名
    pub fn name(&self) -> &str {
        match self {
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::String => "string",
            FieldType::Array => "array",
            FieldType::Object => "object",
            FieldType::Date => "date",
            FieldType::Untyped(name) => name,
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        FieldType::parse(name)
    }
}

/// 字段定义
///
/// 只有 `field_type` 参与类型转换，`options` 留给扩展使用
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// 字段类型
    pub field_type: FieldType,
    /// 附加选项
    pub options: HashMap<String, DataValue>,
}

impl FieldDefinition {
    /// 创建新的字段定义
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            options: HashMap::new(),
        }
    }

    /// 设置附加选项
    pub fn option(mut self, key: &str, value: impl Into<DataValue>) -> Self {
        self.options.insert(key.to_string(), value.into());
        self
    }

    /// 从类型描述解析
    ///
    /// 支持两种写法：类型名字符串 `"integer"`，或结构 `{"type": "integer", ...}`。
    /// 结构中缺少 `type` 时按未识别类型处理
    pub fn from_spec(spec: &DataValue) -> Self {
        match spec {
            DataValue::String(name) => FieldDefinition::new(FieldType::parse(name)),
            DataValue::Object(map) => {
                let field_type = match map.get("type") {
                    Some(DataValue::String(name)) => FieldType::parse(name),
                    _ => FieldType::Untyped(String::new()),
                };
                let options = map
                    .iter()
                    .filter(|(key, _)| key.as_str() != "type")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                FieldDefinition { field_type, options }
            }
            _ => FieldDefinition::new(FieldType::Untyped(String::new())),
        }
    }
}

impl From<&str> for FieldDefinition {
    fn from(name: &str) -> Self {
        FieldDefinition::new(FieldType::parse(name))
    }
}

impl From<FieldType> for FieldDefinition {
    fn from(field_type: FieldType) -> Self {
        FieldDefinition::new(field_type)
    }
}

/// 模型元数据
#[derive(Debug, Clone, Default)]
pub struct ModelMeta {
    /// 集合名覆盖，None 时由模型名推导
    pub collection_name: Option<String>,
    /// 字段定义
    pub fields: HashMap<String, FieldDefinition>,
    /// 索引定义
    pub indexes: Vec<IndexDefinition>,
    /// 模型描述
    pub description: Option<String>,
}

impl ModelMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collection(mut self, name: &str) -> Self {
        self.collection_name = Some(name.to_string());
        self
    }

    pub fn field(mut self, name: &str, definition: impl Into<FieldDefinition>) -> Self {
        self.fields.insert(name.to_string(), definition.into());
        self
    }

    pub fn index(mut self, index: IndexDefinition) -> Self {
        self.indexes.push(index);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// 索引定义
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// 索引键
    pub keys: IndexKeys,
    /// 索引选项
    pub options: IndexOptions,
}

impl IndexDefinition {
    pub fn new(keys: IndexKeys) -> Self {
        Self {
            keys,
            options: IndexOptions::default(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.options.unique = true;
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.options.name = Some(name.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Document;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(FieldType::parse("bool"), FieldType::Boolean);
        assert_eq!(FieldType::parse("int"), FieldType::Integer);
        assert_eq!(FieldType::parse("real"), FieldType::Float);
        assert_eq!(FieldType::parse("double"), FieldType::Float);
        assert_eq!(FieldType::parse("str"), FieldType::String);
        assert_eq!(FieldType::parse("arr"), FieldType::Array);
        assert_eq!(FieldType::parse("obj"), FieldType::Object);
        assert_eq!(FieldType::parse("Date"), FieldType::Date);
        assert_eq!(FieldType::parse("money"), FieldType::Untyped("money".to_string()));
    }

    #[test]
    fn test_from_spec_shorthand_and_structure() {
        let shorthand = FieldDefinition::from_spec(&DataValue::from("integer"));
        assert_eq!(shorthand.field_type, FieldType::Integer);
        assert!(shorthand.options.is_empty());

        let mut spec = Document::new();
        spec.insert("type".to_string(), DataValue::from("string"));
        spec.insert("max_length".to_string(), DataValue::Int(32));
        let structured = FieldDefinition::from_spec(&DataValue::Object(spec));
        assert_eq!(structured.field_type, FieldType::String);
        assert_eq!(structured.options.get("max_length"), Some(&DataValue::Int(32)));
    }
}

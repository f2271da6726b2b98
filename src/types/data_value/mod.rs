use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// 文档：字段名到值的有序映射
pub type Document = BTreeMap<String, DataValue>;

/// 通用数据值类型 - 文档数据库中的值表示
#[derive(Clone, PartialEq)]
pub enum DataValue {
    /// 空值
    Null,
    /// 布尔值
    Bool(bool),
    /// 整数
    Int(i64),
    /// 浮点数
    Float(f64),
    /// 字符串
    String(String),
    /// 存储原生时间戳（UTC）
    DateTime(DateTime<Utc>),
    /// 存储原生标识符（24位十六进制）
    ObjectId(String),
    /// 数组
    Array(Vec<DataValue>),
    /// 对象/文档
    Object(Document),
}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Null => write!(f, "null"),
            DataValue::Bool(b) => write!(f, "{}", b),
            DataValue::Int(i) => write!(f, "{}", i),
            DataValue::Float(fl) => write!(f, "{}", fl),
            DataValue::String(s) => write!(f, "{}", s),
            DataValue::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            DataValue::ObjectId(oid) => write!(f, "ObjectId({})", oid),
            DataValue::Array(_) | DataValue::Object(_) => write!(f, "{}", self.to_json_value()),
        }
    }
}

impl std::fmt::Debug for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Debug 和 Display 保持一致，字符串额外加引号便于区分 "5" 和 5
        match self {
            DataValue::String(s) => write!(f, "{:?}", s),
            _ => write!(f, "{}", self),
        }
    }
}

impl DataValue {
    /// 获取数据类型名称
    pub fn type_name(&self) -> &'static str {
        match self {
            DataValue::Null => "null",
            DataValue::Bool(_) => "boolean",
            DataValue::Int(_) => "integer",
            DataValue::Float(_) => "float",
            DataValue::String(_) => "string",
            DataValue::DateTime(_) => "date",
            DataValue::ObjectId(_) => "object_id",
            DataValue::Array(_) => "array",
            DataValue::Object(_) => "object",
        }
    }

    /// 判断是否为空值
    pub fn is_null(&self) -> bool {
        matches!(self, DataValue::Null)
    }

    /// 是否为复合值（数组或对象）
    pub fn is_composite(&self) -> bool {
        matches!(self, DataValue::Array(_) | DataValue::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DataValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DataValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DataValue::Int(i) => Some(*i as f64),
            DataValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DataValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<DataValue>> {
        match self {
            DataValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Document> {
        match self {
            DataValue::Object(map) => Some(map),
            _ => None,
        }
    }

    /// 转换为 JSON 值
    ///
    /// 时间戳输出为 RFC3339 字符串，ObjectId 输出为 `{"$oid": "..."}`
    pub fn to_json_value(&self) -> serde_json::Value {
        match self {
            DataValue::Null => serde_json::Value::Null,
            DataValue::Bool(b) => serde_json::Value::Bool(*b),
            DataValue::Int(i) => serde_json::Value::Number(serde_json::Number::from(*i)),
            DataValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DataValue::String(s) => serde_json::Value::String(s.clone()),
            DataValue::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
            DataValue::ObjectId(oid) => {
                let mut map = serde_json::Map::new();
                map.insert("$oid".to_string(), serde_json::Value::String(oid.clone()));
                serde_json::Value::Object(map)
            }
            DataValue::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(|item| item.to_json_value()).collect())
            }
            DataValue::Object(obj) => serde_json::Value::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), v.to_json_value()))
                    .collect(),
            ),
        }
    }

    /// 从 JSON 值解析
    ///
    /// 整数保持为 Int，其余数字为 Float；`{"$oid": "..."}` 还原为 ObjectId
    pub fn from_json_value(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => DataValue::Null,
            serde_json::Value::Bool(b) => DataValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DataValue::Int(i)
                } else {
                    DataValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => DataValue::String(s),
            serde_json::Value::Array(arr) => {
                DataValue::Array(arr.into_iter().map(DataValue::from_json_value).collect())
            }
            serde_json::Value::Object(obj) => {
                if obj.len() == 1 {
                    if let Some(serde_json::Value::String(oid)) = obj.get("$oid") {
                        return DataValue::ObjectId(oid.clone());
                    }
                }
                DataValue::Object(
                    obj.into_iter()
                        .map(|(k, v)| (k, DataValue::from_json_value(v)))
                        .collect(),
                )
            }
        }
    }

    /// 期望Object类型，如果不是则返回错误
    pub fn expect_object(self) -> Result<Document, crate::error::QuickRecordError> {
        match self {
            DataValue::Object(map) => Ok(map),
            other => Err(crate::quick_error!(
                validation,
                "data_type",
                format!("期望Object类型，但收到: {}", other.type_name())
            )),
        }
    }
}

/// 从 JSON 对象构造文档，非对象输入返回错误
pub fn document_from_json(value: serde_json::Value) -> Result<Document, crate::error::QuickRecordError> {
    DataValue::from_json_value(value).expect_object()
}

impl From<bool> for DataValue {
    fn from(value: bool) -> Self {
        DataValue::Bool(value)
    }
}

impl From<i32> for DataValue {
    fn from(value: i32) -> Self {
        DataValue::Int(value as i64)
    }
}

impl From<i64> for DataValue {
    fn from(value: i64) -> Self {
        DataValue::Int(value)
    }
}

impl From<u32> for DataValue {
    fn from(value: u32) -> Self {
        DataValue::Int(value as i64)
    }
}

impl From<f64> for DataValue {
    fn from(value: f64) -> Self {
        DataValue::Float(value)
    }
}

impl From<&str> for DataValue {
    fn from(value: &str) -> Self {
        DataValue::String(value.to_string())
    }
}

impl From<String> for DataValue {
    fn from(value: String) -> Self {
        DataValue::String(value)
    }
}

impl From<DateTime<Utc>> for DataValue {
    fn from(value: DateTime<Utc>) -> Self {
        DataValue::DateTime(value)
    }
}

impl From<Document> for DataValue {
    fn from(value: Document) -> Self {
        DataValue::Object(value)
    }
}

impl From<serde_json::Value> for DataValue {
    fn from(value: serde_json::Value) -> Self {
        DataValue::from_json_value(value)
    }
}

impl<T: Into<DataValue>> From<Vec<T>> for DataValue {
    fn from(value: Vec<T>) -> Self {
        DataValue::Array(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DataValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_conversion_keeps_integers_and_object_ids() {
        let value = DataValue::from_json_value(json!({
            "_id": {"$oid": "5f1d7f3b9a1b2c3d4e5f6a7b"},
            "age": 5,
            "score": 1.5,
            "tags": ["a", "b"],
        }));

        let doc = value.expect_object().unwrap();
        assert_eq!(doc["_id"], DataValue::ObjectId("5f1d7f3b9a1b2c3d4e5f6a7b".to_string()));
        assert_eq!(doc["age"], DataValue::Int(5));
        assert_eq!(doc["score"], DataValue::Float(1.5));
        assert!(doc["tags"].is_composite());

        let back = DataValue::Object(doc).to_json_value();
        assert_eq!(back["_id"]["$oid"], json!("5f1d7f3b9a1b2c3d4e5f6a7b"));
    }

    #[test]
    fn test_expect_object_rejects_scalars() {
        assert!(DataValue::Int(1).expect_object().is_err());
        assert!(document_from_json(json!([1, 2])).is_err());
    }
}

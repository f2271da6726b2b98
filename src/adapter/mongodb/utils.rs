//! MongoDB工具函数模块
//!
//! BSON 与 DataValue 之间的转换，以及过滤器/排序/投影/索引键到 BSON 文档的转换

use crate::types::*;
use chrono::{TimeZone, Utc};
use mongodb::bson::{self, Bson, oid::ObjectId};

/// 将DataValue转换为BSON值
pub(crate) fn data_value_to_bson(value: &DataValue) -> Bson {
    match value {
        DataValue::Null => Bson::Null,
        DataValue::Bool(b) => Bson::Boolean(*b),
        DataValue::Int(i) => Bson::Int64(*i),
        DataValue::Float(f) => Bson::Double(*f),
        DataValue::String(s) => Bson::String(s.clone()),
        DataValue::DateTime(dt) => Bson::DateTime(bson::DateTime::from_millis(dt.timestamp_millis())),
        DataValue::ObjectId(hex) => match ObjectId::parse_str(hex) {
            Ok(oid) => Bson::ObjectId(oid),
            // 不是合法的ObjectId时按字符串存储
            Err(_) => Bson::String(hex.clone()),
        },
        DataValue::Array(items) => Bson::Array(items.iter().map(data_value_to_bson).collect()),
        DataValue::Object(map) => Bson::Document(document_to_bson(map)),
    }
}

/// 将BSON值转换为DataValue
pub(crate) fn bson_to_data_value(value: Bson) -> DataValue {
    match value {
        Bson::Null | Bson::Undefined => DataValue::Null,
        Bson::Boolean(b) => DataValue::Bool(b),
        Bson::Int32(i) => DataValue::Int(i as i64),
        Bson::Int64(i) => DataValue::Int(i),
        Bson::Double(f) => DataValue::Float(f),
        Bson::String(s) => DataValue::String(s),
        Bson::ObjectId(oid) => DataValue::ObjectId(oid.to_hex()),
        Bson::DateTime(dt) => match Utc.timestamp_millis_opt(dt.timestamp_millis()).single() {
            Some(dt) => DataValue::DateTime(dt),
            None => DataValue::Null,
        },
        Bson::Array(items) => DataValue::Array(items.into_iter().map(bson_to_data_value).collect()),
        Bson::Document(doc) => DataValue::Object(bson_to_document(doc)),
        // 其他BSON类型走扩展JSON表示
        other => DataValue::from_json_value(other.into_relaxed_extjson()),
    }
}

/// 文档转BSON文档
pub(crate) fn document_to_bson(document: &Document) -> bson::Document {
    document
        .iter()
        .map(|(key, value)| (key.clone(), data_value_to_bson(value)))
        .collect()
}

/// BSON文档转文档
pub(crate) fn bson_to_document(document: bson::Document) -> Document {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_data_value(value)))
        .collect()
}

/// 过滤器转BSON查询文档
pub(crate) fn filter_to_bson(filter: &Filter) -> bson::Document {
    let mut query = bson::Document::new();
    for (field, condition) in filter.iter() {
        let value = match condition {
            Condition::Literal(value) => data_value_to_bson(value),
            Condition::Operators(ops) => Bson::Document(
                ops.iter()
                    .map(|(operator, operand)| (operator.as_str().to_string(), data_value_to_bson(operand)))
                    .collect(),
            ),
        };
        query.insert(field.clone(), value);
    }
    query
}

/// 排序配置转BSON
pub(crate) fn sort_to_bson(sort: &[SortConfig]) -> bson::Document {
    sort.iter()
        .map(|config| (config.field.clone(), Bson::Int32(config.direction.as_i32())))
        .collect()
}

/// 索引键转BSON
pub(crate) fn index_keys_to_bson(keys: &IndexKeys) -> bson::Document {
    keys.keys
        .iter()
        .map(|(field, direction)| (field.clone(), Bson::Int32(direction.as_i32())))
        .collect()
}

/// 比较两组索引键：字段顺序一致且方向数值相等（存储端可能返回 Int32/Int64/Double）
pub(crate) fn same_index_keys(left: &bson::Document, right: &bson::Document) -> bool {
    fn direction(value: &Bson) -> Option<f64> {
        match value {
            Bson::Int32(i) => Some(*i as f64),
            Bson::Int64(i) => Some(*i as f64),
            Bson::Double(f) => Some(*f),
            _ => None,
        }
    }

    left.len() == right.len()
        && left.iter().zip(right.iter()).all(|((lk, lv), (rk, rv))| {
            lk == rk && direction(lv).is_some() && direction(lv) == direction(rv)
        })
}

/// 投影字段转BSON
pub(crate) fn projection_to_bson(fields: &[String]) -> bson::Document {
    fields
        .iter()
        .map(|field| (field.clone(), Bson::Int32(1)))
        .collect()
}

//! 内存驱动的过滤器匹配、排序和投影

use crate::error::QuickRecordResult;
use crate::quick_error;
use crate::types::{Condition, DataValue, Document, Filter, QueryOperator, SortConfig, SortDirection};
use regex::Regex;
use std::cmp::Ordering;

/// 按点号路径取值，数组段支持数字下标
pub fn lookup<'a>(document: &'a Document, path: &str) -> Option<&'a DataValue> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = document.get(first)?;
    for segment in segments {
        current = match current {
            DataValue::Object(map) => map.get(segment)?,
            DataValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// 文档是否满足过滤器的全部条件
pub fn matches(document: &Document, filter: &Filter) -> QuickRecordResult<bool> {
    for (path, condition) in filter.iter() {
        let value = lookup(document, path);
        let ok = match condition {
            Condition::Literal(expected) => equals_or_contains(value, expected),
            Condition::Operators(ops) => {
                let mut all = true;
                for (operator, operand) in ops {
                    if !apply_operator(value, operator, operand)? {
                        all = false;
                        break;
                    }
                }
                all
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn apply_operator(
    value: Option<&DataValue>,
    operator: &QueryOperator,
    operand: &DataValue,
) -> QuickRecordResult<bool> {
    let result = match operator {
        QueryOperator::Eq => equals_or_contains(value, operand),
        QueryOperator::Ne => !equals_or_contains(value, operand),
        QueryOperator::Gt => compares(value, operand, |o| o == Ordering::Greater),
        QueryOperator::Gte => compares(value, operand, |o| o != Ordering::Less),
        QueryOperator::Lt => compares(value, operand, |o| o == Ordering::Less),
        QueryOperator::Lte => compares(value, operand, |o| o != Ordering::Greater),
        QueryOperator::In => candidates(operator, operand)?
            .iter()
            .any(|candidate| equals_or_contains(value, candidate)),
        QueryOperator::NotIn => !candidates(operator, operand)?
            .iter()
            .any(|candidate| equals_or_contains(value, candidate)),
        QueryOperator::All => {
            let required = candidates(operator, operand)?;
            match value {
                Some(DataValue::Array(items)) => required
                    .iter()
                    .all(|candidate| items.iter().any(|item| values_equal(item, candidate))),
                _ => false,
            }
        }
        QueryOperator::Exists => {
            let wanted = !matches!(
                operand,
                DataValue::Bool(false) | DataValue::Int(0) | DataValue::Null
            );
            value.is_some() == wanted
        }
        QueryOperator::Regex => {
            let pattern = operand
                .as_str()
                .ok_or_else(|| quick_error!(query, "$regex 的操作数必须是字符串"))?;
            let regex = Regex::new(pattern)
                .map_err(|e| quick_error!(query, format!("无效的正则表达式 {}: {}", pattern, e)))?;
            match value {
                Some(DataValue::String(text)) => regex.is_match(text),
                Some(DataValue::Array(items)) => items
                    .iter()
                    .any(|item| item.as_str().is_some_and(|text| regex.is_match(text))),
                _ => false,
            }
        }
        QueryOperator::Other(name) => {
            return Err(quick_error!(query, format!("内存驱动不支持操作符 {}", name)));
        }
    };
    Ok(result)
}

fn candidates<'a>(operator: &QueryOperator, operand: &'a DataValue) -> QuickRecordResult<&'a [DataValue]> {
    operand.as_array().map(Vec::as_slice).ok_or_else(|| {
        quick_error!(query, format!("{} 的操作数必须是数组", operator.as_str()))
    })
}

/// 等值匹配；字段是数组而期望值不是数组时，匹配任一元素
fn equals_or_contains(value: Option<&DataValue>, expected: &DataValue) -> bool {
    match value {
        None => expected.is_null(),
        Some(actual) => {
            if values_equal(actual, expected) {
                return true;
            }
            match actual {
                DataValue::Array(items) => items.iter().any(|item| values_equal(item, expected)),
                _ => false,
            }
        }
    }
}

fn compares(value: Option<&DataValue>, operand: &DataValue, accept: impl Fn(Ordering) -> bool) -> bool {
    match value {
        None => false,
        Some(DataValue::Array(items)) if !operand.is_composite() => items
            .iter()
            .any(|item| compare_same_kind(item, operand).is_some_and(&accept)),
        Some(actual) => compare_same_kind(actual, operand).is_some_and(&accept),
    }
}

/// 整数与浮点数按数值比较，其余按结构相等
pub fn values_equal(a: &DataValue, b: &DataValue) -> bool {
    match (a, b) {
        (DataValue::Int(x), DataValue::Float(y)) | (DataValue::Float(y), DataValue::Int(x)) => {
            (*x as f64) == *y
        }
        _ => a == b,
    }
}

/// 同类值比较，类型不同时返回 None（不参与范围匹配）
fn compare_same_kind(a: &DataValue, b: &DataValue) -> Option<Ordering> {
    match (a, b) {
        (DataValue::String(x), DataValue::String(y)) => Some(x.cmp(y)),
        (DataValue::DateTime(x), DataValue::DateTime(y)) => Some(x.cmp(y)),
        (DataValue::Bool(x), DataValue::Bool(y)) => Some(x.cmp(y)),
        (DataValue::ObjectId(x), DataValue::ObjectId(y)) => Some(x.cmp(y)),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

/// 跨类型排序的类型顺序
fn type_rank(value: Option<&DataValue>) -> u8 {
    match value {
        None | Some(DataValue::Null) => 0,
        Some(DataValue::Int(_)) | Some(DataValue::Float(_)) => 1,
        Some(DataValue::String(_)) => 2,
        Some(DataValue::Object(_)) => 3,
        Some(DataValue::Array(_)) => 4,
        Some(DataValue::ObjectId(_)) => 5,
        Some(DataValue::Bool(_)) => 6,
        Some(DataValue::DateTime(_)) => 7,
    }
}

fn sort_order(a: Option<&DataValue>, b: Option<&DataValue>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(x), Some(y)) => compare_same_kind(x, y).unwrap_or_else(|| {
            x.to_json_value().to_string().cmp(&y.to_json_value().to_string())
        }),
        _ => Ordering::Equal,
    }
}

/// 多键稳定排序
pub fn sort_documents(documents: &mut [Document], sort: &[SortConfig]) {
    if sort.is_empty() {
        return;
    }
    documents.sort_by(|a, b| {
        for key in sort {
            let order = sort_order(lookup(a, &key.field), lookup(b, &key.field));
            let order = match key.direction {
                SortDirection::Asc => order,
                SortDirection::Desc => order.reverse(),
            };
            if order != Ordering::Equal {
                return order;
            }
        }
        Ordering::Equal
    });
}

/// 字段投影，`_id` 总是保留
pub fn project(document: &Document, fields: &[String]) -> Document {
    let mut projected = Document::new();
    if let Some(id) = document.get("_id") {
        projected.insert("_id".to_string(), id.clone());
    }
    for path in fields {
        if let Some(value) = lookup(document, path) {
            insert_path(&mut projected, path, value.clone());
        }
    }
    projected
}

fn insert_path(target: &mut Document, path: &str, value: DataValue) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| DataValue::Object(Document::new()));
            if !matches!(entry, DataValue::Object(_)) {
                *entry = DataValue::Object(Document::new());
            }
            if let DataValue::Object(child) = entry {
                insert_path(child, rest, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::document_from_json;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        document_from_json(value).unwrap()
    }

    fn filter(value: serde_json::Value) -> Filter {
        Filter::from_json(value).unwrap()
    }

    #[test]
    fn test_literal_and_array_contains() {
        let user = doc(json!({"name": "ann", "tags": ["a", "b"], "profile": {"city": "Paris"}}));
        assert!(matches(&user, &filter(json!({"name": "ann"}))).unwrap());
        assert!(matches(&user, &filter(json!({"tags": "b"}))).unwrap());
        assert!(matches(&user, &filter(json!({"profile.city": "Paris"}))).unwrap());
        assert!(matches(&user, &filter(json!({"missing": null}))).unwrap());
        assert!(!matches(&user, &filter(json!({"name": "bob"}))).unwrap());
    }

    #[test]
    fn test_comparison_and_set_operators() {
        let user = doc(json!({"age": 30, "score": 1.5, "tags": ["x", "y"]}));
        assert!(matches(&user, &filter(json!({"age": {"$gte": 18, "$lt": 65}}))).unwrap());
        assert!(!matches(&user, &filter(json!({"age": {"$gt": "18"}}))).unwrap());
        assert!(matches(&user, &filter(json!({"score": {"$lt": 2}}))).unwrap());
        assert!(matches(&user, &filter(json!({"age": {"$in": [1, 30]}}))).unwrap());
        assert!(matches(&user, &filter(json!({"age": {"$nin": [1, 2]}}))).unwrap());
        assert!(matches(&user, &filter(json!({"tags": {"$all": ["y", "x"]}}))).unwrap());
        assert!(matches(&user, &filter(json!({"nick": {"$exists": false}}))).unwrap());
        assert!(matches(&user, &filter(json!({"age": {"$ne": 31}}))).unwrap());
    }

    #[test]
    fn test_regex_and_unsupported_operator() {
        let user = doc(json!({"email": "ann@example.com"}));
        assert!(matches(&user, &filter(json!({"email": {"$regex": "@example\\.com$"}}))).unwrap());
        assert!(matches(&user, &filter(json!({"email": {"$where": "1"}}))).is_err());
        assert!(matches(&user, &filter(json!({"email": {"$regex": "("}}))).is_err());
    }

    #[test]
    fn test_multi_key_sort() {
        let mut docs = vec![
            doc(json!({"n": "b", "age": 2})),
            doc(json!({"n": "a", "age": 2})),
            doc(json!({"n": "c", "age": 1})),
        ];
        sort_documents(&mut docs, &[SortConfig::desc("age"), SortConfig::asc("n")]);
        let names: Vec<_> = docs.iter().map(|d| d["n"].clone()).collect();
        assert_eq!(names, vec![DataValue::from("a"), DataValue::from("b"), DataValue::from("c")]);
    }

    #[test]
    fn test_projection_keeps_id() {
        let user = doc(json!({"_id": "1", "name": "ann", "age": 3, "profile": {"city": "x", "zip": "y"}}));
        let projected = project(&user, &["name".to_string(), "profile.city".to_string()]);
        assert_eq!(
            projected,
            doc(json!({"_id": "1", "name": "ann", "profile": {"city": "x"}}))
        );
    }
}

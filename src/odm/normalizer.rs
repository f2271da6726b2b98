//! 查询规范化
//!
//! 对过滤器中的字面值和操作符值按字段声明类型做转换，使查询与写入使用同一套转换规则。
//! `$in` 的候选列表不转换，原样传给存储端

use crate::debug_log;
use crate::error::QuickRecordResult;
use crate::model::schema::ModelSchema;
use crate::quick_error;
use crate::types::{Condition, DataValue, Document, Filter, QueryOperator};

/// 规范化过滤器
pub fn normalize(schema: &ModelSchema, filter: &Filter) -> Filter {
    let mut literals = Vec::new();
    let mut operator_maps = Vec::new();
    for (field, condition) in filter.iter() {
        match condition {
            Condition::Literal(value) => literals.push((field, value)),
            Condition::Operators(ops) => operator_maps.push((field, ops)),
        }
    }

    let mut normalized = Filter::new();
    for (field, ops) in operator_maps {
        let ops = ops
            .iter()
            .map(|(operator, value)| {
                let value = normalize_operand(schema, field, operator, value.clone());
                (operator.clone(), value)
            })
            .collect();
        normalized.insert(field.clone(), Condition::Operators(ops));
    }
    // 字面值后写入，同名键以字面值为准
    for (field, value) in literals {
        let value = schema.coerce_field(field, value.clone());
        normalized.insert(field.clone(), Condition::Literal(value));
    }

    debug_log!("规范化过滤器: {:?} -> {:?}", filter, normalized);
    normalized
}

fn normalize_operand(
    schema: &ModelSchema,
    field: &str,
    operator: &QueryOperator,
    value: DataValue,
) -> DataValue {
    match operator {
        QueryOperator::Eq
        | QueryOperator::Ne
        | QueryOperator::Gt
        | QueryOperator::Gte
        | QueryOperator::Lt
        | QueryOperator::Lte => schema.coerce_field(field, value),
        QueryOperator::NotIn | QueryOperator::All => match value {
            DataValue::Array(items) => DataValue::Array(
                items
                    .into_iter()
                    .map(|item| schema.coerce_field(field, item))
                    .collect(),
            ),
            other => other,
        },
        // `$in` 保持原样；`$exists`/`$regex` 的操作数不是字段值
        QueryOperator::In
        | QueryOperator::Exists
        | QueryOperator::Regex
        | QueryOperator::Other(_) => value,
    }
}

/// 待写入的行集合：单行或多行
#[derive(Debug, Clone, PartialEq)]
pub enum RowSet {
    Single(Document),
    Batch(Vec<Document>),
}

impl RowSet {
    /// 从未分类的数据推断单行还是多行
    ///
    /// 看第一个值是否为复合值：是则按多行处理，否则按单行处理。
    /// 被推断为多行但其中某个元素不是文档时（例如首字段本身是数组的单行），
    /// 返回 `ValidationError`
    ///
    /// 文档按键名排序，"第一个值"是键名最小的字段，与调用方写入的顺序无关
    pub fn detect(data: DataValue) -> QuickRecordResult<RowSet> {
        match data {
            DataValue::Array(items) => {
                let first_is_composite = items.first().is_none_or(DataValue::is_composite);
                if !first_is_composite {
                    return Err(quick_error!(validation, "rows", "数组中的元素不是文档"));
                }
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| expect_row(index.to_string(), item))
                    .collect::<QuickRecordResult<Vec<_>>>()
                    .map(RowSet::Batch)
            }
            DataValue::Object(map) => {
                let first_is_composite = map.values().next().is_some_and(DataValue::is_composite);
                if !first_is_composite {
                    return Ok(RowSet::Single(map));
                }
                map.into_iter()
                    .map(|(key, item)| expect_row(key, item))
                    .collect::<QuickRecordResult<Vec<_>>>()
                    .map(RowSet::Batch)
            }
            other => Err(quick_error!(
                validation,
                "rows",
                format!("期望文档或文档列表，但收到: {}", other.type_name())
            )),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RowSet::Single(_) => 1,
            RowSet::Batch(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 按模式转换每一行
    pub fn coerce(self, schema: &ModelSchema) -> Vec<Document> {
        match self {
            RowSet::Single(row) => vec![schema.coerce_row(row)],
            RowSet::Batch(rows) => rows.into_iter().map(|row| schema.coerce_row(row)).collect(),
        }
    }
}

fn expect_row(position: String, item: DataValue) -> QuickRecordResult<Document> {
    match item {
        DataValue::Object(row) => Ok(row),
        other => Err(quick_error!(
            validation,
            format!("rows[{}]", position),
            format!("期望文档，但收到: {}", other.type_name())
        )),
    }
}

impl From<Document> for RowSet {
    fn from(row: Document) -> Self {
        RowSet::Single(row)
    }
}

impl From<Vec<Document>> for RowSet {
    fn from(rows: Vec<Document>) -> Self {
        RowSet::Batch(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuickRecordError;
    use crate::model::field_types::ModelMeta;
    use crate::utils::DefaultInflector;
    use serde_json::json;

    fn schema() -> ModelSchema {
        let meta = ModelMeta::new()
            .field("age", "integer")
            .field("name", "string")
            .field("score", "float");
        ModelSchema::new("User", meta, Vec::new(), &DefaultInflector)
    }

    fn operators(filter: &Filter, field: &str) -> Vec<(QueryOperator, DataValue)> {
        match filter.get(field) {
            Some(Condition::Operators(ops)) => ops.clone(),
            other => panic!("expected operators for {}: {:?}", field, other),
        }
    }

    #[test]
    fn test_literal_values_are_coerced() {
        let filter = Filter::from_json(json!({"age": "5", "nickname": "5"})).unwrap();
        let normalized = normalize(&schema(), &filter);
        assert_eq!(normalized.get("age"), Some(&Condition::Literal(DataValue::Int(5))));
        assert_eq!(
            normalized.get("nickname"),
            Some(&Condition::Literal(DataValue::from("5")))
        );
    }

    #[test]
    fn test_range_operators_are_coerced() {
        let filter = Filter::new()
            .op("age", QueryOperator::Gte, "18")
            .op("age", QueryOperator::Lt, "65");
        let ops = operators(&normalize(&schema(), &filter), "age");
        assert!(ops.contains(&(QueryOperator::Gte, DataValue::Int(18))));
        assert!(ops.contains(&(QueryOperator::Lt, DataValue::Int(65))));
    }

    #[test]
    fn test_set_membership_values_stay_verbatim() {
        let filter = Filter::from_json(json!({"age": {"$in": ["5", "6"]}})).unwrap();
        let ops = operators(&normalize(&schema(), &filter), "age");
        assert_eq!(
            ops,
            vec![(QueryOperator::In, DataValue::from(vec!["5", "6"]))]
        );
    }

    #[test]
    fn test_exclusion_lists_are_coerced_element_wise() {
        let filter = Filter::new().op("age", QueryOperator::NotIn, vec!["1", "2"]);
        let ops = operators(&normalize(&schema(), &filter), "age");
        assert_eq!(ops, vec![(QueryOperator::NotIn, DataValue::from(vec![1, 2]))]);
    }

    #[test]
    fn test_exists_and_regex_operands_untouched() {
        let filter = Filter::new()
            .op("age", QueryOperator::Exists, true)
            .op("name", QueryOperator::Regex, "^a");
        let normalized = normalize(&schema(), &filter);
        assert_eq!(
            operators(&normalized, "age"),
            vec![(QueryOperator::Exists, DataValue::Bool(true))]
        );
        assert_eq!(
            operators(&normalized, "name"),
            vec![(QueryOperator::Regex, DataValue::from("^a"))]
        );
    }

    #[test]
    fn test_detect_batch_and_single() {
        let batch = RowSet::detect(DataValue::from(json!([{"name": "a"}, {"name": "b"}]))).unwrap();
        assert_eq!(batch.len(), 2);

        let single = RowSet::detect(DataValue::from(json!({"name": "a", "age": "3"}))).unwrap();
        assert!(matches!(single, RowSet::Single(_)));
        let rows = single.coerce(&schema());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["age"], DataValue::Int(3));
    }

    #[test]
    fn test_detect_reports_misclassified_row() {
        // 首字段是数组的单行被推断为多行
        let result = RowSet::detect(DataValue::from(json!({"aliases": ["x"], "name": "a"})));
        match result {
            Err(QuickRecordError::ValidationError { field, .. }) => assert_eq!(field, "rows[aliases]"),
            other => panic!("unexpected: {:?}", other),
        }

        assert!(RowSet::detect(DataValue::Int(1)).is_err());
        assert!(RowSet::detect(DataValue::from(vec![1, 2])).is_err());
    }
}

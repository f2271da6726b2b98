use crate::error::QuickRecordResult;
use crate::types::data_value::{DataValue, Document};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 查询操作符
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOperator {
    /// 等于
    Eq,
    /// 不等于
    Ne,
    /// 大于
    Gt,
    /// 大于等于
    Gte,
    /// 小于
    Lt,
    /// 小于等于
    Lte,
    /// 在列表中（集合成员）
    In,
    /// 不在列表中
    NotIn,
    /// 数组包含全部候选值
    All,
    /// 字段存在
    Exists,
    /// 正则表达式匹配
    Regex,
    /// 其他存储端操作符，原样传递
    Other(String),
}

impl QueryOperator {
    /// 存储端操作符名称
    pub fn as_str(&self) -> &str {
        match self {
            QueryOperator::Eq => "$eq",
            QueryOperator::Ne => "$ne",
            QueryOperator::Gt => "$gt",
            QueryOperator::Gte => "$gte",
            QueryOperator::Lt => "$lt",
            QueryOperator::Lte => "$lte",
            QueryOperator::In => "$in",
            QueryOperator::NotIn => "$nin",
            QueryOperator::All => "$all",
            QueryOperator::Exists => "$exists",
            QueryOperator::Regex => "$regex",
            QueryOperator::Other(name) => name,
        }
    }

    /// 从存储端操作符名称解析
    pub fn parse(name: &str) -> Self {
        match name {
            "$eq" => QueryOperator::Eq,
            "$ne" => QueryOperator::Ne,
            "$gt" => QueryOperator::Gt,
            "$gte" => QueryOperator::Gte,
            "$lt" => QueryOperator::Lt,
            "$lte" => QueryOperator::Lte,
            "$in" => QueryOperator::In,
            "$nin" => QueryOperator::NotIn,
            "$all" => QueryOperator::All,
            "$exists" => QueryOperator::Exists,
            "$regex" => QueryOperator::Regex,
            other => QueryOperator::Other(other.to_string()),
        }
    }
}

/// 单个字段上的查询条件
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// 字面值（等值匹配）
    Literal(DataValue),
    /// 操作符映射，例如 `{"$gt": 1, "$lt": 10}`
    Operators(Vec<(QueryOperator, DataValue)>),
}

/// 查询过滤器：字段名到条件的映射
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: BTreeMap<String, Condition>,
}

impl Filter {
    /// 创建空过滤器（匹配全部文档）
    pub fn new() -> Self {
        Self::default()
    }

    /// 等值条件
    pub fn eq(mut self, field: &str, value: impl Into<DataValue>) -> Self {
        self.conditions
            .insert(field.to_string(), Condition::Literal(value.into()));
        self
    }

    /// 追加操作符条件，同一字段的多个操作符会合并到同一个映射里
    pub fn op(mut self, field: &str, operator: QueryOperator, value: impl Into<DataValue>) -> Self {
        let value = value.into();
        match self.conditions.get_mut(field) {
            Some(Condition::Operators(ops)) => {
                ops.retain(|(existing, _)| existing != &operator);
                ops.push((operator, value));
            }
            _ => {
                self.conditions.insert(
                    field.to_string(),
                    Condition::Operators(vec![(operator, value)]),
                );
            }
        }
        self
    }

    /// 直接设置某字段的条件
    pub fn insert(&mut self, field: impl Into<String>, condition: Condition) {
        self.conditions.insert(field.into(), condition);
    }

    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Condition)> {
        self.conditions.iter()
    }

    /// 从 JSON 过滤器构造
    ///
    /// 所有键都以 `$` 开头的嵌套对象视为操作符映射，其余值视为字面值
    pub fn from_json(value: serde_json::Value) -> QuickRecordResult<Self> {
        let document = crate::types::data_value::document_from_json(value)?;
        Ok(Self::from_document(document))
    }

    /// 从文档构造，规则同 [`Filter::from_json`]
    pub fn from_document(document: Document) -> Self {
        let mut filter = Filter::new();
        for (field, value) in document {
            let condition = match value {
                DataValue::Object(map)
                    if !map.is_empty() && map.keys().all(|key| key.starts_with('$')) =>
                {
                    Condition::Operators(
                        map.into_iter()
                            .map(|(op, v)| (QueryOperator::parse(&op), v))
                            .collect(),
                    )
                }
                other => Condition::Literal(other),
            };
            filter.conditions.insert(field, condition);
        }
        filter
    }

    /// 还原为文档表示（驱动和日志使用）
    pub fn to_document(&self) -> Document {
        self.conditions
            .iter()
            .map(|(field, condition)| {
                let value = match condition {
                    Condition::Literal(v) => v.clone(),
                    Condition::Operators(ops) => DataValue::Object(
                        ops.iter()
                            .map(|(op, v)| (op.as_str().to_string(), v.clone()))
                            .collect(),
                    ),
                };
                (field.clone(), value)
            })
            .collect()
    }
}

impl IntoIterator for Filter {
    type Item = (String, Condition);
    type IntoIter = std::collections::btree_map::IntoIter<String, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.conditions.into_iter()
    }
}

impl FromIterator<(String, Condition)> for Filter {
    fn from_iter<I: IntoIterator<Item = (String, Condition)>>(iter: I) -> Self {
        Filter {
            conditions: iter.into_iter().collect(),
        }
    }
}

/// 排序配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortConfig {
    /// 字段名
    pub field: String,
    /// 排序方向
    pub direction: SortDirection,
}

impl SortConfig {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    /// 升序
    Asc,
    /// 降序
    Desc,
}

impl SortDirection {
    /// 存储端表示：1 / -1
    pub fn as_i32(&self) -> i32 {
        match self {
            SortDirection::Asc => 1,
            SortDirection::Desc => -1,
        }
    }
}

/// 查询选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindOptions {
    /// 投影字段（None 表示返回全部字段）
    pub fields: Option<Vec<String>>,
    /// 排序配置
    pub sort: Vec<SortConfig>,
    /// 跳过的记录数
    pub offset: Option<u64>,
    /// 限制返回的记录数
    pub limit: Option<u64>,
    /// 查询超时（毫秒），未设置时使用模型的默认超时
    pub timeout_ms: Option<u64>,
}

impl FindOptions {
    /// 创建新的查询选项
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置字段投影
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    /// 设置排序
    pub fn with_sort(mut self, sort: Vec<SortConfig>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

/// 写入选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOptions {
    /// 删除时只删除第一条匹配文档
    pub just_one: bool,
    /// 批量插入时是否按顺序执行（遇错即停）
    pub ordered: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            just_one: false,
            ordered: true,
        }
    }
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn just_one(mut self, just_one: bool) -> Self {
        self.just_one = just_one;
        self
    }

    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }
}

/// 索引键：有序的字段和方向
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexKeys {
    pub keys: Vec<(String, SortDirection)>,
}

impl IndexKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asc(mut self, field: &str) -> Self {
        self.keys.push((field.to_string(), SortDirection::Asc));
        self
    }

    pub fn desc(mut self, field: &str) -> Self {
        self.keys.push((field.to_string(), SortDirection::Desc));
        self
    }

    /// 存储端默认索引名，例如 `name_1_age_-1`
    pub fn default_name(&self) -> String {
        self.keys
            .iter()
            .map(|(field, direction)| format!("{}_{}", field, direction.as_i32()))
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// 索引选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// 索引名称，未设置时使用默认名
    pub name: Option<String>,
    /// 是否唯一索引
    pub unique: bool,
    /// 是否稀疏索引
    pub sparse: bool,
    /// 是否后台创建
    pub background: bool,
}

impl IndexOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    pub fn sparse(mut self, sparse: bool) -> Self {
        self.sparse = sparse;
        self
    }

    pub fn background(mut self, background: bool) -> Self {
        self.background = background;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_splits_literals_and_operator_maps() {
        let filter = Filter::from_json(json!({
            "age": {"$gt": 5, "$lt": "10"},
            "name": "bob",
            "profile": {"city": "x"},
        }))
        .unwrap();

        assert_eq!(filter.get("name"), Some(&Condition::Literal(DataValue::from("bob"))));
        match filter.get("age") {
            Some(Condition::Operators(ops)) => {
                assert!(ops.contains(&(QueryOperator::Gt, DataValue::Int(5))));
                assert!(ops.contains(&(QueryOperator::Lt, DataValue::from("10"))));
            }
            other => panic!("unexpected condition: {:?}", other),
        }
        // 嵌套文档不是操作符映射
        assert!(matches!(filter.get("profile"), Some(Condition::Literal(DataValue::Object(_)))));
    }

    #[test]
    fn test_op_merges_operators_on_same_field() {
        let filter = Filter::new()
            .op("age", QueryOperator::Gte, 1)
            .op("age", QueryOperator::Lte, 9)
            .op("age", QueryOperator::Gte, 2);

        match filter.get("age") {
            Some(Condition::Operators(ops)) => {
                assert_eq!(ops.len(), 2);
                assert!(ops.contains(&(QueryOperator::Gte, DataValue::Int(2))));
            }
            other => panic!("unexpected condition: {:?}", other),
        }
    }

    #[test]
    fn test_index_default_name() {
        let keys = IndexKeys::new().asc("name").desc("age");
        assert_eq!(keys.default_name(), "name_1_age_-1");
    }
}

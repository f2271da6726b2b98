//! 字段验证器
//!
//! 每个模型类型注册一个有序的 (属性名, 谓词) 列表，验证时按顺序执行，
//! 第一个失败即停止

use crate::types::DataValue;
use std::fmt;
use std::sync::Arc;

/// 验证谓词
pub type ValidatorFn = Arc<dyn Fn(&DataValue) -> bool + Send + Sync>;

/// 单个字段验证器
#[derive(Clone)]
pub struct FieldValidator {
    /// 访问器属性名，例如 `Name`、`Age` 或直接写属性键 `first_name`
    pub property: String,
    predicate: ValidatorFn,
}

impl FieldValidator {
    pub fn new<F>(property: &str, predicate: F) -> Self
    where
        F: Fn(&DataValue) -> bool + Send + Sync + 'static,
    {
        Self {
            property: property.to_string(),
            predicate: Arc::new(predicate),
        }
    }

    /// 对当前值执行谓词
    pub fn check(&self, value: &DataValue) -> bool {
        (self.predicate)(value)
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("property", &self.property)
            .finish_non_exhaustive()
    }
}

/// 验证失败记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    /// 失败的验证器对应的属性名
    pub field: String,
}

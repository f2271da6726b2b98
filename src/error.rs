//! 错误处理模块
//!
//! 定义 Active Record 层统一的错误类型，错误消息通过 i18n 模块本地化

use crate::i18n;
use thiserror::Error;

/// rat_quickrecord 错误类型
#[derive(Error, Debug)]
pub enum QuickRecordError {
    /// 配置错误：数据库未选择、连接未建立、配置文件无效等
    #[error("{}", i18n::message("error.config", .message))]
    ConfigError { message: String },

    /// 动态访问器调用无效（既不是 get 也不是 set，或 set 参数个数不对）
    #[error("{}", i18n::accessor_message(.method, .reason))]
    InvalidAccessor { method: String, reason: String },

    /// 存储连接错误（由驱动产生，原样向上传播）
    #[error("{}", i18n::message("error.connection", .message))]
    ConnectionError { message: String },

    /// 存储查询/写入错误（由驱动产生，原样向上传播）
    #[error("{}", i18n::message("error.query", .message))]
    QueryError { message: String },

    /// 输入结构错误（不是验证器返回 false，验证器失败只通过 bool 表达）
    #[error("{}", i18n::validation_message(.field, .message))]
    ValidationError { field: String, message: String },

    /// 序列化错误
    #[error("{}", i18n::message("error.serialization", .message))]
    SerializationError { message: String },

    /// IO 错误
    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),
}

/// 结果类型别名
pub type QuickRecordResult<T> = Result<T, QuickRecordError>;

impl From<serde_json::Error> for QuickRecordError {
    fn from(err: serde_json::Error) -> Self {
        QuickRecordError::SerializationError {
            message: err.to_string(),
        }
    }
}

/// 便捷错误构造宏
///
/// ```ignore
/// quick_error!(config, "未选择数据库");
/// quick_error!(accessor, "getFoo", "参数个数错误");
/// quick_error!(validation, "rows", "不是文档");
/// ```
#[macro_export]
macro_rules! quick_error {
    (config, $msg:expr) => {
        $crate::error::QuickRecordError::ConfigError {
            message: $msg.to_string(),
        }
    };
    (accessor, $method:expr, $reason:expr) => {
        $crate::error::QuickRecordError::InvalidAccessor {
            method: $method.to_string(),
            reason: $reason.to_string(),
        }
    };
    (connection, $msg:expr) => {
        $crate::error::QuickRecordError::ConnectionError {
            message: $msg.to_string(),
        }
    };
    (query, $msg:expr) => {
        $crate::error::QuickRecordError::QueryError {
            message: $msg.to_string(),
        }
    };
    (validation, $field:expr, $msg:expr) => {
        $crate::error::QuickRecordError::ValidationError {
            field: $field.to_string(),
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::QuickRecordError::SerializationError {
            message: $msg.to_string(),
        }
    };
}

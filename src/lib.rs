//! rat_quickrecord - 面向文档数据库的 Active Record 层
//!
//! 为模型类型提供声明式字段类型转换、查询过滤器规范化、
//! 统一的增删改查接口以及验证/保存/删除生命周期钩子

// 导出所有公共模块
pub mod adapter;
pub mod config;
pub mod error;
pub mod i18n;
pub mod manager;
pub mod model;
pub mod odm;
pub mod types;
pub mod utils;

// 重新导出常用类型和函数
pub use adapter::{
    MemoryDriver, MemoryStats, StoreCollection, StoreConnection, StoreCursor, StoreDriver,
};
#[cfg(feature = "mongodb-support")]
pub use adapter::MongoDriver;
pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{QuickRecordError, QuickRecordResult};
pub use manager::{ConnectionManager, global_connection_manager, set_global_connection_manager};
pub use model::{
    ActiveRecord, CallResult, FieldDefinition, FieldType, FieldValidator, IndexDefinition, Model,
    ModelManager, ModelMeta, ModelSchema, ValidationFailure, array_field, boolean_field, coerce,
    date_field, float_field, integer_field, object_field, string_field,
};
pub use odm::{RecordCursor, RowSet, normalize};
pub use types::*;
pub use utils::{DefaultInflector, Inflector};

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 初始化rat_quickrecord库
///
/// 注册多语言错误消息并按环境变量选择语言。
/// 日志系统由调用者自行初始化，本库不初始化日志
pub fn init() {
    i18n::ErrorMessageI18n::init();
}

/// 生成ObjectId字符串
///
/// 生成类似MongoDB ObjectId的24位十六进制字符串
/// 格式：时间戳(4字节) + 机器ID(3字节) + 进程ID(2字节) + 计数器(3字节)
pub fn generate_object_id() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
        & 0xFFFF_FFFF;
    let counter = COUNTER.fetch_add(1, Ordering::SeqCst);
    let machine_id = std::process::id() % 0xFFFFFF;

    format!(
        "{:08x}{:06x}{:04x}{:06x}",
        timestamp,
        machine_id,
        (machine_id >> 8) & 0xFFFF,
        counter % 0xFFFFFF
    )
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids_are_unique_hex() {
        let a = generate_object_id();
        let b = generate_object_id();
        assert_eq!(a.len(), 24);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_info() {
        assert!(get_info().starts_with("rat_quickrecord v"));
    }
}

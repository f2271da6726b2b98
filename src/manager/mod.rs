//! 连接管理器模块
//!
//! 管理存储连接的建立、数据库选择、懒重连和集合句柄解析

mod manager;

pub use manager::ConnectionManager;

use crate::error::QuickRecordResult;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// 可选的全局连接管理器
///
/// 只能设置一次；模型管理器也可以直接接收显式的连接管理器而不经过这里
static GLOBAL_CONNECTION_MANAGER: OnceCell<Arc<ConnectionManager>> = OnceCell::new();

/// 设置全局连接管理器，已设置过时返回配置错误
pub fn set_global_connection_manager(manager: Arc<ConnectionManager>) -> QuickRecordResult<()> {
    GLOBAL_CONNECTION_MANAGER
        .set(manager)
        .map_err(|_| crate::quick_error!(config, "全局连接管理器已经设置"))
}

/// 获取全局连接管理器
pub fn global_connection_manager() -> QuickRecordResult<Arc<ConnectionManager>> {
    GLOBAL_CONNECTION_MANAGER
        .get()
        .cloned()
        .ok_or_else(|| crate::quick_error!(config, "全局连接管理器尚未设置"))
}

//! # 存储配置构建器模块
//!
//! 提供存储配置的构建器实现，支持链式调用和严格验证

use crate::config::core::StoreConfig;
use crate::error::QuickRecordError;
use rat_logger::info;

/// 存储配置构建器
///
/// 主机和查询超时必须显式设置，数据库名可选
#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    host: Option<String>,
    database: Option<String>,
    find_timeout_ms: Option<u64>,
}

impl StoreConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置主机地址
    ///
    /// # 参数
    ///
    /// * `host` - `host:port` 形式的地址
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// 设置默认数据库
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// 设置默认查询超时（毫秒）
    pub fn find_timeout_ms(mut self, timeout: u64) -> Self {
        self.find_timeout_ms = Some(timeout);
        self
    }

    /// 构建存储配置
    ///
    /// # 错误
    ///
    /// 主机或超时未设置、主机为空、超时为零时返回配置错误
    pub fn build(self) -> Result<StoreConfig, QuickRecordError> {
        let host = self
            .host
            .ok_or_else(|| crate::quick_error!(config, "主机地址必须设置"))?;

        let find_timeout_ms = self
            .find_timeout_ms
            .ok_or_else(|| crate::quick_error!(config, "查询超时必须设置"))?;

        let config = StoreConfig {
            host,
            database: self.database,
            find_timeout_ms,
        };
        config.check()?;

        info!(
            "创建存储配置: 主机={}, 数据库={:?}, 查询超时={}ms",
            config.host, config.database, config.find_timeout_ms
        );
        Ok(config)
    }
}

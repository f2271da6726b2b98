//! # 配置管理模块 - 核心配置类型
//!
//! 存储连接配置：主机、默认数据库和默认查询超时。
//! 可以从环境变量、配置文件或构建器得到

use crate::error::{QuickRecordError, QuickRecordResult};
use rat_logger::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 默认主机
pub const DEFAULT_HOST: &str = "localhost:27017";

/// 默认查询超时（毫秒）
pub const DEFAULT_FIND_TIMEOUT_MS: u64 = 20000;

/// 主机环境变量
pub const ENV_HOST: &str = "MONGO_HOST";
/// 数据库环境变量
pub const ENV_DATABASE: &str = "MONGO_DB";
/// 查询超时环境变量
pub const ENV_FIND_TIMEOUT: &str = "MONGO_FIND_TIMEOUT";

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_find_timeout() -> u64 {
    DEFAULT_FIND_TIMEOUT_MS
}

/// 存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 存储主机（`host:port`）
    #[serde(default = "default_host")]
    pub host: String,
    /// 默认数据库名，未设置时必须在 `start_db` 中显式给出
    #[serde(default)]
    pub database: Option<String>,
    /// 默认查询超时（毫秒）
    #[serde(default = "default_find_timeout")]
    pub find_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            database: None,
            find_timeout_ms: DEFAULT_FIND_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// 创建配置构建器
    pub fn builder() -> crate::config::builders::StoreConfigBuilder {
        crate::config::builders::StoreConfigBuilder::new()
    }

    /// 从进程环境变量读取
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// 从给定的查找函数读取环境变量
    ///
    /// 空值视为未设置；超时无法解析时使用默认值并记录警告
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let host = read(ENV_HOST).unwrap_or_else(default_host);
        let database = read(ENV_DATABASE);
        let find_timeout_ms = match read(ENV_FIND_TIMEOUT) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(timeout) => timeout,
                Err(_) => {
                    warn!("{} 无法解析为毫秒数: {}，使用默认值 {}", ENV_FIND_TIMEOUT, raw, DEFAULT_FIND_TIMEOUT_MS);
                    DEFAULT_FIND_TIMEOUT_MS
                }
            },
            None => DEFAULT_FIND_TIMEOUT_MS,
        };

        Self {
            host,
            database,
            find_timeout_ms,
        }
    }

    /// 从文件加载配置
    ///
    /// 扩展名为 `toml` 时按 TOML 解析，否则按 JSON 解析
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> QuickRecordResult<Self> {
        let content = std::fs::read_to_string(config_path.as_ref()).map_err(QuickRecordError::IoError)?;

        let config: StoreConfig = if is_toml(config_path.as_ref()) {
            toml::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析TOML配置文件失败: {}", e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| crate::quick_error!(config, format!("解析JSON配置文件失败: {}", e)))?
        };
        config.check()?;

        info!("从文件加载配置: {:?}", config_path.as_ref());
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, config_path: P) -> QuickRecordResult<()> {
        let content = if is_toml(config_path.as_ref()) {
            toml::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化TOML配置失败: {}", e)))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| crate::quick_error!(config, format!("序列化JSON配置失败: {}", e)))?
        };

        std::fs::write(config_path.as_ref(), content)?;
        info!("配置已保存到文件: {:?}", config_path.as_ref());
        Ok(())
    }

    /// 检查配置是否可用
    pub fn check(&self) -> QuickRecordResult<()> {
        if self.host.trim().is_empty() {
            return Err(crate::quick_error!(config, "主机地址不能为空"));
        }
        if self.find_timeout_ms == 0 {
            return Err(crate::quick_error!(config, "查询超时不能为零"));
        }
        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("toml")
}

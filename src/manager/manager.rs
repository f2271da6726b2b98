//! 连接管理器核心定义

use crate::adapter::{StoreCollection, StoreConnection, StoreDriver};
use crate::config::StoreConfig;
use crate::error::QuickRecordResult;
use rat_logger::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::RwLock;

/// 当前连接和选中的数据库
#[derive(Default)]
struct ConnectionState {
    connection: Option<Arc<dyn StoreConnection>>,
    database: Option<String>,
}

/// 连接管理器
///
/// 持有存储驱动、配置、当前连接和选中的数据库。多个模型管理器通过 `Arc` 共享同一个实例
pub struct ConnectionManager {
    driver: Arc<dyn StoreDriver>,
    config: StoreConfig,
    state: RwLock<ConnectionState>,
}

impl ConnectionManager {
    /// 创建连接管理器，不立即连接
    pub fn new(driver: Arc<dyn StoreDriver>, config: StoreConfig) -> Self {
        info!(
            "创建连接管理器: driver={}, host={}, database={:?}",
            driver.name(),
            config.host,
            config.database
        );
        Self {
            driver,
            config,
            state: RwLock::new(ConnectionState::default()),
        }
    }

    /// 使用环境变量配置创建
    pub fn from_env(driver: Arc<dyn StoreDriver>) -> Self {
        Self::new(driver, StoreConfig::from_env())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// 建立连接
    ///
    /// 已有连接且未要求强制时不做任何事；主机和数据库未给出时取配置中的默认值
    pub async fn start_db(
        &self,
        host: Option<&str>,
        database: Option<&str>,
        force: bool,
    ) -> QuickRecordResult<()> {
        let mut state = self.state.write().await;
        if state.connection.is_some() && !force {
            return Ok(());
        }

        let host = host.unwrap_or(&self.config.host);
        let database = database
            .map(str::to_string)
            .or_else(|| self.config.database.clone());

        let connection = self.driver.connect(host).await?;
        info!("已连接存储: host={}, database={:?}", host, database);
        if database.is_none() {
            warn!("连接已建立但未选择数据库");
        }
        state.connection = Some(connection);
        state.database = database;
        Ok(())
    }

    /// 切换选中的数据库
    pub async fn set_database(&self, database: &str) {
        let mut state = self.state.write().await;
        state.database = Some(database.to_string());
    }

    /// 当前选中的数据库
    pub async fn database(&self) -> Option<String> {
        self.state.read().await.database.clone()
    }

    /// 是否已建立连接
    pub async fn is_started(&self) -> bool {
        self.state.read().await.connection.is_some()
    }

    /// 获取集合句柄
    ///
    /// 未连接时先按默认配置连接；连接对象报告已断开时先重连
    pub async fn collection(&self, name: &str) -> QuickRecordResult<Arc<dyn StoreCollection>> {
        if !self.is_started().await {
            self.start_db(None, None, false).await?;
        }

        let (connection, database) = {
            let state = self.state.read().await;
            (state.connection.clone(), state.database.clone())
        };
        let database = match database {
            Some(database) if !database.is_empty() => database,
            _ => {
                warn!("获取集合 {} 失败: 未选择数据库", name);
                return Err(crate::quick_error!(config, "未选择数据库"));
            }
        };
        let connection = match connection {
            Some(connection) => connection,
            None => {
                warn!("获取集合 {} 失败: 连接未建立", name);
                return Err(crate::quick_error!(config, "连接未建立"));
            }
        };

        if !connection.is_connected() {
            info!("存储连接已断开，重新连接");
            connection.reconnect().await?;
        }

        debug!("解析集合: {}.{}", database, name);
        Ok(connection.select_collection(&database, name))
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("driver", &self.driver.name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

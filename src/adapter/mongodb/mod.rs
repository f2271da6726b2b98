//! MongoDB适配器模块
//!
//! 基于官方 mongodb 驱动实现存储驱动契约：
//! - mod.rs: 驱动和连接
//! - operations.rs: 集合操作和游标
//! - utils.rs: BSON数据转换工具函数

pub mod operations;
pub mod utils;

use crate::adapter::{StoreCollection, StoreConnection, StoreDriver};
use crate::error::{QuickRecordError, QuickRecordResult};
use async_trait::async_trait;
use mongodb::Client;
use operations::MongoCollection;
use parking_lot::RwLock;
use rat_logger::info;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// MongoDB驱动
#[derive(Debug, Clone, Default)]
pub struct MongoDriver;

impl MongoDriver {
    pub fn new() -> Self {
        Self
    }
}

async fn open_client(uri: &str) -> QuickRecordResult<Client> {
    Client::with_uri_str(uri)
        .await
        .map_err(|e| QuickRecordError::ConnectionError {
            message: format!("MongoDB连接失败: {}", e),
        })
}

#[async_trait]
impl StoreDriver for MongoDriver {
    fn name(&self) -> &str {
        "mongodb"
    }

    async fn connect(&self, host: &str) -> QuickRecordResult<Arc<dyn StoreConnection>> {
        let uri = if host.starts_with("mongodb://") || host.starts_with("mongodb+srv://") {
            host.to_string()
        } else {
            format!("mongodb://{}", host)
        };
        let client = open_client(&uri).await?;
        info!("MongoDB客户端已创建: {}", host);
        Ok(Arc::new(MongoConnection {
            uri,
            client: RwLock::new(client),
            connected: AtomicBool::new(true),
        }))
    }
}

struct MongoConnection {
    uri: String,
    client: RwLock<Client>,
    connected: AtomicBool,
}

#[async_trait]
impl StoreConnection for MongoConnection {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn reconnect(&self) -> QuickRecordResult<()> {
        let client = open_client(&self.uri).await?;
        *self.client.write() = client;
        self.connected.store(true, Ordering::SeqCst);
        info!("MongoDB客户端已重建");
        Ok(())
    }

    fn select_collection(&self, database: &str, name: &str) -> Arc<dyn StoreCollection> {
        let collection = self.client.read().database(database).collection(name);
        Arc::new(MongoCollection {
            name: name.to_string(),
            collection,
        })
    }
}

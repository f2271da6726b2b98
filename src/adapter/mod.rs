//! 存储驱动适配器模块
//!
//! 定义 Active Record 层依赖的文档存储驱动契约：驱动、连接、集合句柄和游标。
//! 记录层不翻译驱动返回的错误，原样向上传播

use crate::error::QuickRecordResult;
use crate::types::*;
use async_trait::async_trait;
use std::sync::Arc;

pub mod memory;
#[cfg(feature = "mongodb-support")]
pub mod mongodb;

pub use self::memory::{MemoryDriver, MemoryStats};
#[cfg(feature = "mongodb-support")]
pub use self::mongodb::MongoDriver;

/// 存储驱动：负责建立连接
#[async_trait]
pub trait StoreDriver: Send + Sync {
    /// 驱动名称，用于日志
    fn name(&self) -> &str;

    /// 连接到指定主机（`host:port`）
    async fn connect(&self, host: &str) -> QuickRecordResult<Arc<dyn StoreConnection>>;
}

/// 存储连接
#[async_trait]
pub trait StoreConnection: Send + Sync {
    /// 连接当前是否可用
    fn is_connected(&self) -> bool;

    /// 重新建立连接
    async fn reconnect(&self) -> QuickRecordResult<()>;

    /// 获取 (数据库, 集合) 的句柄
    fn select_collection(&self, database: &str, name: &str) -> Arc<dyn StoreCollection>;
}

/// 集合句柄
#[async_trait]
pub trait StoreCollection: Send + Sync {
    /// 集合名
    fn name(&self) -> &str;

    /// 查询，返回尚未执行的游标；`projection` 为 None 时返回全部字段
    async fn find(
        &self,
        filter: &Filter,
        projection: Option<&[String]>,
    ) -> QuickRecordResult<Box<dyn StoreCursor>>;

    /// 按 `_id` 插入或替换，返回文档的 `_id`（缺失时由存储分配）
    async fn save(&self, document: &Document, options: &WriteOptions) -> QuickRecordResult<DataValue>;

    /// 删除匹配的文档，返回删除数量
    async fn remove(&self, filter: &Filter, options: &WriteOptions) -> QuickRecordResult<u64>;

    /// 统计匹配的文档数量
    async fn count(&self, filter: &Filter) -> QuickRecordResult<u64>;

    /// 一次性插入多个文档，返回按输入顺序排列的 `_id`
    async fn batch_insert(
        &self,
        documents: &[Document],
        options: &WriteOptions,
    ) -> QuickRecordResult<Vec<DataValue>>;

    /// 创建索引（已存在时不报错），返回索引名
    async fn ensure_index(&self, keys: &IndexKeys, options: &IndexOptions) -> QuickRecordResult<String>;

    /// 删除索引
    async fn delete_index(&self, keys: &IndexKeys) -> QuickRecordResult<()>;
}

/// 游标
///
/// 排序/跳过/限制/超时在第一次 `next` 之前设置，第一次 `next` 时才真正执行查询
#[async_trait]
pub trait StoreCursor: Send {
    fn sort(&mut self, sort: &[SortConfig]);

    fn skip(&mut self, count: u64);

    fn limit(&mut self, count: u64);

    /// 查询超时（毫秒）
    fn timeout(&mut self, timeout_ms: u64);

    /// 取下一条文档，耗尽时返回 None
    async fn next(&mut self) -> QuickRecordResult<Option<Document>>;
}

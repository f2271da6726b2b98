//! ModelManager 实现模块
//!
//! 每个模型类型一个管理器，提供查询、统计、删除、批量插入和索引管理，
//! 并负责把存储文档实例化为记录

use crate::adapter::StoreCollection;
use crate::debug_log;
use crate::error::QuickRecordResult;
use crate::manager::{ConnectionManager, global_connection_manager};
use crate::model::record::ActiveRecord;
use crate::model::schema::ModelSchema;
use crate::model::traits::Model;
use crate::odm::{RecordCursor, RowSet, normalize};
use crate::types::*;
use crate::utils::inflector::{DefaultInflector, Inflector};
use rat_logger::debug;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 模型管理器
pub struct ModelManager<M: Model> {
    connections: Arc<ConnectionManager>,
    schema: Arc<ModelSchema>,
    inflector: Arc<dyn Inflector>,
    find_timeout_ms: AtomicU64,
    _phantom: PhantomData<M>,
}

impl<M: Model> ModelManager<M> {
    /// 使用默认命名变换器创建
    pub fn new(connections: Arc<ConnectionManager>) -> Arc<Self> {
        Self::with_inflector(connections, Arc::new(DefaultInflector))
    }

    /// 使用指定的命名变换器创建
    pub fn with_inflector(connections: Arc<ConnectionManager>, inflector: Arc<dyn Inflector>) -> Arc<Self> {
        let schema = ModelSchema::of::<M>(inflector.as_ref());
        let find_timeout_ms = connections.config().find_timeout_ms;
        debug!(
            "创建模型管理器: model={}, collection={}, fields={}",
            schema.model_name(),
            schema.collection_name(),
            schema.fields_of().len()
        );
        Arc::new(Self {
            connections,
            schema: Arc::new(schema),
            inflector,
            find_timeout_ms: AtomicU64::new(find_timeout_ms),
            _phantom: PhantomData,
        })
    }

    /// 使用全局连接管理器创建
    pub fn from_global() -> QuickRecordResult<Arc<Self>> {
        Ok(Self::new(global_connection_manager()?))
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn inflector(&self) -> &dyn Inflector {
        self.inflector.as_ref()
    }

    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    pub fn collection_name(&self) -> &str {
        self.schema.collection_name()
    }

    /// 当前模型的集合句柄
    pub async fn collection(&self) -> QuickRecordResult<Arc<dyn StoreCollection>> {
        self.connections.collection(self.collection_name()).await
    }

    /// 默认查询超时（毫秒）
    pub fn find_timeout(&self) -> u64 {
        self.find_timeout_ms.load(Ordering::Relaxed)
    }

    /// 修改默认查询超时，只影响之后发起的查询
    pub fn set_find_timeout(&self, timeout_ms: u64) {
        self.find_timeout_ms.store(timeout_ms, Ordering::Relaxed);
    }

    /// 构造新记录（is_new = true，触发 after_new）
    pub fn new_record(self: &Arc<Self>, attributes: Document) -> ActiveRecord<M> {
        ActiveRecord::new(self.clone(), attributes, true)
    }

    /// 按给定的新旧标记构造记录
    pub fn instantiate(self: &Arc<Self>, attributes: Document, is_new: bool) -> ActiveRecord<M> {
        ActiveRecord::new(self.clone(), attributes, is_new)
    }

    /// 查询，返回惰性记录游标
    pub async fn find(self: &Arc<Self>, filter: &Filter, options: &FindOptions) -> QuickRecordResult<RecordCursor<M>> {
        let filter = normalize(&self.schema, filter);
        let collection = self.collection().await?;
        let mut cursor = collection.find(&filter, options.fields.as_deref()).await?;

        if !options.sort.is_empty() {
            cursor.sort(&options.sort);
        }
        if let Some(offset) = options.offset {
            cursor.skip(offset);
        }
        if let Some(limit) = options.limit {
            cursor.limit(limit);
        }
        cursor.timeout(options.timeout_ms.unwrap_or_else(|| self.find_timeout()));

        debug_log!("查询 {}: filter={:?}, options={:?}", self.collection_name(), filter, options);
        Ok(RecordCursor::new(cursor, self.clone()))
    }

    /// 查询并一次性读取全部结果
    pub async fn find_all(self: &Arc<Self>, filter: &Filter, options: &FindOptions) -> QuickRecordResult<Vec<ActiveRecord<M>>> {
        self.find(filter, options).await?.collect_all().await
    }

    /// 查询第一条匹配的记录
    pub async fn find_one(self: &Arc<Self>, filter: &Filter, options: &FindOptions) -> QuickRecordResult<Option<ActiveRecord<M>>> {
        let options = options.clone().with_limit(1);
        self.find(filter, &options).await?.next().await
    }

    /// 统计匹配数量
    ///
    /// 过滤器不经过类型规范化，原样交给存储
    pub async fn count(&self, filter: &Filter) -> QuickRecordResult<u64> {
        self.collection().await?.count(filter).await
    }

    /// 删除所有匹配的文档
    pub async fn remove(&self, filter: &Filter, options: &WriteOptions) -> QuickRecordResult<u64> {
        let filter = normalize(&self.schema, filter);
        let removed = self.collection().await?.remove(&filter, options).await?;
        debug!("删除 {}: filter={:?}, removed={}", self.collection_name(), filter, removed);
        Ok(removed)
    }

    /// 批量插入，每行按模式转换后一次写入
    pub async fn batch_insert(&self, rows: impl Into<RowSet>, options: &WriteOptions) -> QuickRecordResult<Vec<DataValue>> {
        let rows = rows.into().coerce(&self.schema);
        let ids = self.collection().await?.batch_insert(&rows, options).await?;
        debug!("批量插入 {}: {} 行", self.collection_name(), ids.len());
        Ok(ids)
    }

    /// 批量插入未分类的数据，按首个值是否为复合值判断单行还是多行
    pub async fn batch_insert_value(&self, data: DataValue, options: &WriteOptions) -> QuickRecordResult<Vec<DataValue>> {
        let rows = RowSet::detect(data)?;
        self.batch_insert(rows, options).await
    }

    /// 创建索引，返回索引名
    pub async fn ensure_index(&self, keys: &IndexKeys, options: &IndexOptions) -> QuickRecordResult<String> {
        self.collection().await?.ensure_index(keys, options).await
    }

    /// 删除索引
    pub async fn delete_index(&self, keys: &IndexKeys) -> QuickRecordResult<()> {
        self.collection().await?.delete_index(keys).await
    }

    /// 创建模型元数据中声明的全部索引
    pub async fn ensure_declared_indexes(&self) -> QuickRecordResult<Vec<String>> {
        let collection = self.collection().await?;
        let mut names = Vec::with_capacity(self.schema.indexes().len());
        for index in self.schema.indexes() {
            names.push(collection.ensure_index(&index.keys, &index.options).await?);
        }
        Ok(names)
    }
}

impl<M: Model> std::fmt::Debug for ModelManager<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("model", &self.schema.model_name())
            .field("collection", &self.schema.collection_name())
            .field("find_timeout_ms", &self.find_timeout())
            .finish()
    }
}

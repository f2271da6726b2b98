//! 进程内文档存储驱动
//!
//! 与真实驱动实现同一契约，数据保存在内存中。用于测试和无外部依赖的场景，
//! 提供操作计数和断开连接开关以便观察记录层的行为

pub mod matcher;

use crate::adapter::{StoreCollection, StoreConnection, StoreCursor, StoreDriver};
use crate::error::QuickRecordResult;
use crate::{generate_object_id, quick_error};
use crate::types::*;
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use rat_logger::{debug, info};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// 操作计数快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub connects: u64,
    pub reconnects: u64,
    pub finds: u64,
    pub saves: u64,
    pub removes: u64,
    pub counts: u64,
    pub batch_inserts: u64,
    pub index_changes: u64,
    /// 最近一次执行的查询所带的超时（毫秒），未设置时为 0
    pub last_find_timeout_ms: u64,
}

#[derive(Default)]
struct Counters {
    connects: AtomicU64,
    reconnects: AtomicU64,
    finds: AtomicU64,
    saves: AtomicU64,
    removes: AtomicU64,
    counts: AtomicU64,
    batch_inserts: AtomicU64,
    index_changes: AtomicU64,
    last_find_timeout_ms: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> MemoryStats {
        MemoryStats {
            connects: self.connects.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            finds: self.finds.load(Ordering::Relaxed),
            saves: self.saves.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            counts: self.counts.load(Ordering::Relaxed),
            batch_inserts: self.batch_inserts.load(Ordering::Relaxed),
            index_changes: self.index_changes.load(Ordering::Relaxed),
            last_find_timeout_ms: self.last_find_timeout_ms.load(Ordering::Relaxed),
        }
    }
}

/// 单个集合的数据：按插入顺序保存文档，加上已建立的索引
#[derive(Default)]
struct CollectionData {
    documents: RwLock<Vec<Document>>,
    indexes: RwLock<Vec<(String, IndexKeys, IndexOptions)>>,
}

impl CollectionData {
    /// 检查唯一索引冲突，`skip_id` 为被替换的文档
    fn check_unique(
        &self,
        documents: &[Document],
        candidate: &Document,
        skip_id: Option<&DataValue>,
    ) -> QuickRecordResult<()> {
        let indexes = self.indexes.read();
        for (name, keys, options) in indexes.iter().filter(|(_, _, options)| options.unique) {
            let key_of = |doc: &Document| -> Option<Vec<DataValue>> {
                let values: Vec<DataValue> = keys
                    .keys
                    .iter()
                    .map(|(field, _)| matcher::lookup(doc, field).cloned().unwrap_or(DataValue::Null))
                    .collect();
                if options.sparse && values.iter().all(DataValue::is_null) {
                    None
                } else {
                    Some(values)
                }
            };
            let Some(candidate_key) = key_of(candidate) else {
                continue;
            };
            let duplicate = documents
                .iter()
                .filter(|doc| skip_id.is_none_or(|id| doc.get("_id") != Some(id)))
                .any(|doc| key_of(doc).as_ref() == Some(&candidate_key));
            if duplicate {
                return Err(quick_error!(
                    query,
                    format!("唯一索引 {} 冲突: {:?}", name, candidate_key)
                ));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct MemoryState {
    collections: DashMap<String, Arc<CollectionData>>,
    connected: AtomicBool,
    counters: Counters,
}

impl MemoryState {
    fn collection(&self, database: &str, name: &str) -> Arc<CollectionData> {
        self.collections
            .entry(format!("{}.{}", database, name))
            .or_default()
            .clone()
    }
}

/// 内存驱动
///
/// 克隆得到的驱动共享同一份数据
#[derive(Clone, Default)]
pub struct MemoryDriver {
    state: Arc<MemoryState>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 操作计数快照
    pub fn stats(&self) -> MemoryStats {
        self.state.counters.snapshot()
    }

    /// 模拟连接断开，下次获取集合时记录层应当重连
    pub fn disconnect(&self) {
        self.state.connected.store(false, Ordering::SeqCst);
    }

    /// 直接读取集合中的全部文档（按插入顺序）
    pub fn documents(&self, database: &str, collection: &str) -> Vec<Document> {
        self.state
            .collection(database, collection)
            .documents
            .read()
            .clone()
    }

    /// 集合上已建立的索引名
    pub fn index_names(&self, database: &str, collection: &str) -> Vec<String> {
        self.state
            .collection(database, collection)
            .indexes
            .read()
            .iter()
            .map(|(name, _, _)| name.clone())
            .collect()
    }
}

#[async_trait]
impl StoreDriver for MemoryDriver {
    fn name(&self) -> &str {
        "memory"
    }

    async fn connect(&self, host: &str) -> QuickRecordResult<Arc<dyn StoreConnection>> {
        info!("内存存储已连接: {}", host);
        Counters::bump(&self.state.counters.connects);
        self.state.connected.store(true, Ordering::SeqCst);
        Ok(Arc::new(MemoryConnection {
            state: self.state.clone(),
        }))
    }
}

struct MemoryConnection {
    state: Arc<MemoryState>,
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    fn is_connected(&self) -> bool {
        self.state.connected.load(Ordering::SeqCst)
    }

    async fn reconnect(&self) -> QuickRecordResult<()> {
        Counters::bump(&self.state.counters.reconnects);
        self.state.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn select_collection(&self, database: &str, name: &str) -> Arc<dyn StoreCollection> {
        Arc::new(MemoryCollection {
            name: name.to_string(),
            data: self.state.collection(database, name),
            state: self.state.clone(),
        })
    }
}

struct MemoryCollection {
    name: String,
    data: Arc<CollectionData>,
    state: Arc<MemoryState>,
}

impl MemoryCollection {
    fn ensure_connected(&self) -> QuickRecordResult<()> {
        if self.state.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(quick_error!(connection, "内存存储连接已断开"))
        }
    }

    fn with_id(document: &Document) -> (Document, DataValue) {
        let mut document = document.clone();
        let id = document
            .entry("_id".to_string())
            .or_insert_with(|| DataValue::ObjectId(generate_object_id()))
            .clone();
        (document, id)
    }
}

#[async_trait]
impl StoreCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(
        &self,
        filter: &Filter,
        projection: Option<&[String]>,
    ) -> QuickRecordResult<Box<dyn StoreCursor>> {
        self.ensure_connected()?;
        Counters::bump(&self.state.counters.finds);
        Ok(Box::new(MemoryCursor {
            data: self.data.clone(),
            state: self.state.clone(),
            filter: filter.clone(),
            projection: projection.map(<[String]>::to_vec),
            sort: Vec::new(),
            skip: 0,
            limit: None,
            timeout_ms: None,
            results: None,
        }))
    }

    async fn save(&self, document: &Document, _options: &WriteOptions) -> QuickRecordResult<DataValue> {
        self.ensure_connected()?;
        Counters::bump(&self.state.counters.saves);
        let (document, id) = Self::with_id(document);

        let mut documents = self.data.documents.write();
        self.data.check_unique(&documents, &document, Some(&id))?;
        match documents.iter_mut().find(|doc| doc.get("_id") == Some(&id)) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
        debug!("内存存储保存文档: collection={}, _id={}", self.name, id);
        Ok(id)
    }

    async fn remove(&self, filter: &Filter, options: &WriteOptions) -> QuickRecordResult<u64> {
        self.ensure_connected()?;
        Counters::bump(&self.state.counters.removes);

        let mut documents = self.data.documents.write();
        let mut hits = Vec::new();
        for (position, document) in documents.iter().enumerate() {
            if matcher::matches(document, filter)? {
                hits.push(position);
                if options.just_one {
                    break;
                }
            }
        }
        for position in hits.iter().rev() {
            documents.remove(*position);
        }
        Ok(hits.len() as u64)
    }

    async fn count(&self, filter: &Filter) -> QuickRecordResult<u64> {
        self.ensure_connected()?;
        Counters::bump(&self.state.counters.counts);
        let documents = self.data.documents.read();
        let mut total = 0u64;
        for document in documents.iter() {
            if matcher::matches(document, filter)? {
                total += 1;
            }
        }
        Ok(total)
    }

    async fn batch_insert(
        &self,
        documents: &[Document],
        options: &WriteOptions,
    ) -> QuickRecordResult<Vec<DataValue>> {
        self.ensure_connected()?;
        Counters::bump(&self.state.counters.batch_inserts);

        let mut stored = self.data.documents.write();
        let mut ids = Vec::with_capacity(documents.len());
        let mut first_error = None;
        for document in documents {
            let (document, id) = Self::with_id(document);
            let duplicate_id = stored.iter().any(|doc| doc.get("_id") == Some(&id));
            let outcome = if duplicate_id {
                Err(quick_error!(query, format!("_id 重复: {}", id)))
            } else {
                self.data.check_unique(&stored, &document, None)
            };
            match outcome {
                Ok(()) => {
                    stored.push(document);
                    ids.push(id);
                }
                // 有序插入遇错即停，无序插入跳过失败的文档继续
                Err(e) if options.ordered => return Err(e),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(ids),
        }
    }

    async fn ensure_index(&self, keys: &IndexKeys, options: &IndexOptions) -> QuickRecordResult<String> {
        self.ensure_connected()?;
        if keys.keys.is_empty() {
            return Err(quick_error!(query, "索引键不能为空"));
        }
        let name = options.name.clone().unwrap_or_else(|| keys.default_name());
        // 加锁顺序与写入路径一致：先 documents 后 indexes
        let documents = self.data.documents.read();
        let mut indexes = self.data.indexes.write();
        if !indexes.iter().any(|(existing, _, _)| existing == &name) {
            if options.unique {
                let candidate = CollectionData::default();
                candidate.indexes.write().push((name.clone(), keys.clone(), options.clone()));
                for (position, document) in documents.iter().enumerate() {
                    candidate.check_unique(&documents[..position], document, None)?;
                }
            }
            Counters::bump(&self.state.counters.index_changes);
            indexes.push((name.clone(), keys.clone(), options.clone()));
        }
        Ok(name)
    }

    async fn delete_index(&self, keys: &IndexKeys) -> QuickRecordResult<()> {
        self.ensure_connected()?;
        let mut indexes = self.data.indexes.write();
        let before = indexes.len();
        indexes.retain(|(_, existing, _)| existing != keys);
        if indexes.len() == before {
            return Err(quick_error!(query, format!("索引不存在: {}", keys.default_name())));
        }
        Counters::bump(&self.state.counters.index_changes);
        Ok(())
    }
}

/// 内存游标：第一次 `next` 时按当时的数据快照执行查询
struct MemoryCursor {
    data: Arc<CollectionData>,
    state: Arc<MemoryState>,
    filter: Filter,
    projection: Option<Vec<String>>,
    sort: Vec<SortConfig>,
    skip: u64,
    limit: Option<u64>,
    timeout_ms: Option<u64>,
    results: Option<std::vec::IntoIter<Document>>,
}

impl MemoryCursor {
    fn execute(&self) -> QuickRecordResult<Vec<Document>> {
        let mut selected = Vec::new();
        for document in self.data.documents.read().iter() {
            if matcher::matches(document, &self.filter)? {
                selected.push(document.clone());
            }
        }
        matcher::sort_documents(&mut selected, &self.sort);

        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let limit = match self.limit {
            // 存储端约定：limit 为 0 表示不限制
            Some(0) | None => usize::MAX,
            Some(n) => usize::try_from(n).unwrap_or(usize::MAX),
        };
        let documents = selected.into_iter().skip(skip).take(limit);
        Ok(match &self.projection {
            Some(fields) => documents.map(|doc| matcher::project(&doc, fields)).collect(),
            None => documents.collect(),
        })
    }
}

#[async_trait]
impl StoreCursor for MemoryCursor {
    fn sort(&mut self, sort: &[SortConfig]) {
        self.sort = sort.to_vec();
    }

    fn skip(&mut self, count: u64) {
        self.skip = count;
    }

    fn limit(&mut self, count: u64) {
        self.limit = Some(count);
    }

    fn timeout(&mut self, timeout_ms: u64) {
        self.timeout_ms = Some(timeout_ms);
    }

    async fn next(&mut self) -> QuickRecordResult<Option<Document>> {
        if self.results.is_none() {
            debug!(
                "内存游标执行查询: filter={:?}, timeout_ms={:?}",
                self.filter, self.timeout_ms
            );
            self.state
                .counters
                .last_find_timeout_ms
                .store(self.timeout_ms.unwrap_or(0), Ordering::Relaxed);
            self.results = Some(self.execute()?.into_iter());
        }
        Ok(self.results.as_mut().and_then(Iterator::next))
    }
}

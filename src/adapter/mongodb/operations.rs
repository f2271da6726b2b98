//! MongoDB集合操作模块
//!
//! StoreCollection 和 StoreCursor 的 MongoDB 实现

use crate::adapter::mongodb::utils::*;
use crate::adapter::{StoreCollection, StoreCursor};
use crate::error::{QuickRecordError, QuickRecordResult};
use crate::types::*;
use async_trait::async_trait;
use mongodb::bson::{self, Bson, doc};
use mongodb::options::{FindOptions as MongoFindOptions, IndexOptions as MongoIndexOptions, InsertManyOptions, ReplaceOptions};
use mongodb::{Collection, Cursor, IndexModel};
use rat_logger::debug;
use std::time::Duration;

fn query_error(action: &str, e: mongodb::error::Error) -> QuickRecordError {
    QuickRecordError::QueryError {
        message: format!("MongoDB{}失败: {}", action, e),
    }
}

pub(crate) struct MongoCollection {
    pub(crate) name: String,
    pub(crate) collection: Collection<bson::Document>,
}

#[async_trait]
impl StoreCollection for MongoCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find(
        &self,
        filter: &Filter,
        projection: Option<&[String]>,
    ) -> QuickRecordResult<Box<dyn StoreCursor>> {
        let mut options = MongoFindOptions::default();
        options.projection = projection.map(projection_to_bson);
        Ok(Box::new(MongoCursor {
            collection: self.collection.clone(),
            query: filter_to_bson(filter),
            options,
            cursor: None,
        }))
    }

    async fn save(&self, document: &Document, _options: &WriteOptions) -> QuickRecordResult<DataValue> {
        let bson_document = document_to_bson(document);
        match document.get("_id") {
            Some(id) => {
                let query = doc! { "_id": data_value_to_bson(id) };
                let mut options = ReplaceOptions::default();
                options.upsert = Some(true);
                debug!("执行MongoDB保存: collection={}, {:?}", self.name, query);
                self.collection
                    .replace_one(query, bson_document, options)
                    .await
                    .map_err(|e| query_error("保存", e))?;
                Ok(id.clone())
            }
            None => {
                let result = self
                    .collection
                    .insert_one(bson_document, None)
                    .await
                    .map_err(|e| query_error("插入", e))?;
                Ok(bson_to_data_value(result.inserted_id))
            }
        }
    }

    async fn remove(&self, filter: &Filter, options: &WriteOptions) -> QuickRecordResult<u64> {
        let query = filter_to_bson(filter);
        debug!("执行MongoDB删除: collection={}, {:?}", self.name, query);
        let result = if options.just_one {
            self.collection.delete_one(query, None).await
        } else {
            self.collection.delete_many(query, None).await
        }
        .map_err(|e| query_error("删除", e))?;
        Ok(result.deleted_count)
    }

    async fn count(&self, filter: &Filter) -> QuickRecordResult<u64> {
        let query = filter_to_bson(filter);
        debug!("执行MongoDB计数: {:?}", query);
        self.collection
            .count_documents(query, None)
            .await
            .map_err(|e| query_error("计数", e))
    }

    async fn batch_insert(
        &self,
        documents: &[Document],
        options: &WriteOptions,
    ) -> QuickRecordResult<Vec<DataValue>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let mut insert_options = InsertManyOptions::default();
        insert_options.ordered = Some(options.ordered);

        let result = self
            .collection
            .insert_many(documents.iter().map(document_to_bson), insert_options)
            .await
            .map_err(|e| query_error("批量插入", e))?;

        let mut ids: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
        ids.sort_by_key(|(position, _)| *position);
        Ok(ids.into_iter().map(|(_, id)| bson_to_data_value(id)).collect())
    }

    async fn ensure_index(&self, keys: &IndexKeys, options: &IndexOptions) -> QuickRecordResult<String> {
        let mut index_options = MongoIndexOptions::default();
        index_options.name = options.name.clone();
        index_options.unique = options.unique.then_some(true);
        index_options.sparse = options.sparse.then_some(true);
        index_options.background = options.background.then_some(true);

        let model = IndexModel::builder()
            .keys(index_keys_to_bson(keys))
            .options(index_options)
            .build();
        debug!("创建MongoDB索引: collection={}, keys={:?}", self.name, keys);
        let result = self
            .collection
            .create_index(model, None)
            .await
            .map_err(|e| query_error("创建索引", e))?;
        Ok(result.index_name)
    }

    async fn delete_index(&self, keys: &IndexKeys) -> QuickRecordResult<()> {
        // 按键匹配已有索引，自定义名称的索引也能删除
        let wanted = index_keys_to_bson(keys);
        let mut indexes = self
            .collection
            .list_indexes(None)
            .await
            .map_err(|e| query_error("列出索引", e))?;
        let mut name = None;
        while indexes.advance().await.map_err(|e| query_error("列出索引", e))? {
            let index = indexes
                .deserialize_current()
                .map_err(|e| query_error("索引反序列化", e))?;
            if same_index_keys(&index.keys, &wanted) {
                name = index.options.and_then(|options| options.name);
                break;
            }
        }
        let name = name.unwrap_or_else(|| keys.default_name());

        debug!("删除MongoDB索引: collection={}, name={}", self.name, name);
        self.collection
            .drop_index(name, None)
            .await
            .map_err(|e| query_error("删除索引", e))
    }
}

/// 第一次 `next` 时才发出查询
pub(crate) struct MongoCursor {
    collection: Collection<bson::Document>,
    query: bson::Document,
    options: MongoFindOptions,
    cursor: Option<Cursor<bson::Document>>,
}

#[async_trait]
impl StoreCursor for MongoCursor {
    fn sort(&mut self, sort: &[SortConfig]) {
        self.options.sort = Some(sort_to_bson(sort));
    }

    fn skip(&mut self, count: u64) {
        self.options.skip = Some(count);
    }

    fn limit(&mut self, count: u64) {
        self.options.limit = Some(i64::try_from(count).unwrap_or(i64::MAX));
    }

    fn timeout(&mut self, timeout_ms: u64) {
        self.options.max_time = Some(Duration::from_millis(timeout_ms));
    }

    async fn next(&mut self) -> QuickRecordResult<Option<Document>> {
        if self.cursor.is_none() {
            debug!("执行MongoDB查询: {:?}", self.query);
            let cursor = self
                .collection
                .find(self.query.clone(), self.options.clone())
                .await
                .map_err(|e| query_error("查询", e))?;
            self.cursor = Some(cursor);
        }
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };

        if !cursor.advance().await.map_err(|e| query_error("游标遍历", e))? {
            return Ok(None);
        }
        let document = cursor
            .deserialize_current()
            .map_err(|e| query_error("文档反序列化", e))?;
        Ok(Some(bson_to_document(document)))
    }
}

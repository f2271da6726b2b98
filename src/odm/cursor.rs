//! 记录游标
//!
//! 包装驱动游标，逐条把存储文档实例化为 `is_new = false` 的记录

use crate::adapter::StoreCursor;
use crate::error::{QuickRecordError, QuickRecordResult};
use crate::model::manager::ModelManager;
use crate::model::record::ActiveRecord;
use crate::model::traits::Model;
use futures::stream::{self, Stream};
use std::sync::Arc;

/// 惰性记录序列
pub struct RecordCursor<M: Model> {
    inner: Box<dyn StoreCursor>,
    manager: Arc<ModelManager<M>>,
}

impl<M: Model> RecordCursor<M> {
    pub(crate) fn new(inner: Box<dyn StoreCursor>, manager: Arc<ModelManager<M>>) -> Self {
        Self { inner, manager }
    }

    /// 下一条记录，耗尽时返回 None
    pub async fn next(&mut self) -> QuickRecordResult<Option<ActiveRecord<M>>> {
        let document = self.inner.next().await?;
        Ok(document.map(|document| self.manager.instantiate(document, false)))
    }

    /// 读取剩余的全部记录
    pub async fn collect_all(mut self) -> QuickRecordResult<Vec<ActiveRecord<M>>> {
        let mut records = Vec::new();
        while let Some(record) = self.next().await? {
            records.push(record);
        }
        Ok(records)
    }

    /// 转换为异步流
    pub fn into_stream(self) -> impl Stream<Item = QuickRecordResult<ActiveRecord<M>>> + Send {
        stream::try_unfold(self, |mut cursor| async move {
            let record = cursor.next().await?;
            Ok::<_, QuickRecordError>(record.map(|record| (record, cursor)))
        })
    }
}

//! 公共类型模块
//!
//! 数据值、文档、过滤器与查询/写入/索引选项

pub mod data_value;
pub mod query;

pub use data_value::{DataValue, Document, document_from_json};
pub use query::{
    Condition, Filter, FindOptions, IndexKeys, IndexOptions, QueryOperator, SortConfig,
    SortDirection, WriteOptions,
};

//! # 查询层模块
//!
//! 查询规范化、待写入行的单行/多行判定，以及惰性记录游标

pub mod cursor;
pub mod normalizer;

pub use cursor::RecordCursor;
pub use normalizer::{RowSet, normalize};

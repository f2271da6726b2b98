//! 工具模块

pub mod inflector;

pub use inflector::{DefaultInflector, Inflector};

//! # 配置管理模块
//!
//! 存储连接配置，支持环境变量、配置文件和构建器三种来源

pub mod builders;
pub mod core;

pub use builders::StoreConfigBuilder;
pub use core::{
    DEFAULT_FIND_TIMEOUT_MS, DEFAULT_HOST, ENV_DATABASE, ENV_FIND_TIMEOUT, ENV_HOST, StoreConfig,
};

//! 模型定义系统模块
//!
//! 声明式字段类型、类型转换、动态访问器、验证器、模型管理器和记录实例

pub mod accessor;
pub mod convenience;
pub mod conversion;
pub mod field_types;
pub mod macros;
pub mod manager;
pub mod record;
pub mod schema;
pub mod traits;
pub mod validation;

// 重新导出核心类型
pub use accessor::{AccessorKind, AccessorTable, ResolvedAccessor};
pub use convenience::*;
pub use conversion::coerce;
pub use field_types::{FieldDefinition, FieldType, IndexDefinition, ModelMeta};
pub use manager::ModelManager;
pub use record::{ActiveRecord, CallResult, ID_KEY};
pub use schema::ModelSchema;
pub use traits::Model;
pub use validation::{FieldValidator, ValidationFailure, ValidatorFn};

//! 模型便捷函数模块
//!
//! 提供创建各种字段类型的便捷函数

use crate::model::field_types::{FieldDefinition, FieldType};

/// 便捷函数：创建布尔字段
pub fn boolean_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Boolean)
}

/// 便捷函数：创建整数字段
pub fn integer_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Integer)
}

/// 便捷函数：创建浮点数字段
pub fn float_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Float)
}

/// 便捷函数：创建字符串字段
pub fn string_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::String)
}

/// 便捷函数：创建数组字段
pub fn array_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Array)
}

/// 便捷函数：创建对象字段
pub fn object_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Object)
}

/// 便捷函数：创建日期字段
/// 写入时解析为存储原生时间戳
pub fn date_field() -> FieldDefinition {
    FieldDefinition::new(FieldType::Date)
}

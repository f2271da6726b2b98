//! 字段类型转换模块
//!
//! 根据声明的字段类型把原始值规范化为对应的类型值。转换永不失败，
//! 无法识别的输入按弱类型语义退化为零值

pub mod datetime_conversion;
pub mod primitive_impls;

use crate::model::field_types::FieldType;
use crate::types::DataValue;

/// 将原始值转换为声明的字段类型
///
/// 对已经是目标类型的值再次转换得到相同结果
pub fn coerce(field_type: &FieldType, value: DataValue) -> DataValue {
    match field_type {
        FieldType::Boolean => primitive_impls::to_boolean(value),
        FieldType::Integer => primitive_impls::to_integer(value),
        FieldType::Float => primitive_impls::to_float(value),
        FieldType::String => primitive_impls::to_string(value),
        FieldType::Array => primitive_impls::to_array(value),
        FieldType::Object => primitive_impls::to_object(value),
        FieldType::Date => datetime_conversion::to_date(value),
        FieldType::Untyped(_) => value,
    }
}

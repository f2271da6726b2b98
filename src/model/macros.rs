//! 模型相关的宏定义
//!
//! 提供便捷的宏来声明字段表

/// 便捷宏：声明字段表
///
/// 值可以是类型名字符串（简写），也可以是任何能转换为 `FieldDefinition` 的表达式
///
/// ```ignore
/// let fields = model_fields! {
///     "name" => "string",
///     "age" => integer_field(),
/// };
/// ```
#[macro_export]
macro_rules! model_fields {
    ($($name:expr => $definition:expr),* $(,)?) => {{
        let mut fields: ::std::collections::HashMap<
            String,
            $crate::model::field_types::FieldDefinition,
        > = ::std::collections::HashMap::new();
        $(
            fields.insert(
                $name.to_string(),
                $crate::model::field_types::FieldDefinition::from($definition),
            );
        )*
        fields
    }};
}

//! Model trait 定义模块
//!
//! 模型类型通过实现该 trait 声明字段、验证器和生命周期钩子。
//! 模型类型本身不保存数据，实例数据存放在 [`ActiveRecord`] 的属性表中

use crate::model::field_types::ModelMeta;
use crate::model::record::ActiveRecord;
use crate::model::validation::FieldValidator;

/// 模型特征
///
/// 钩子默认都是空操作，按需覆盖
pub trait Model: Sized + Send + Sync + 'static {
    /// 获取模型元数据
    fn meta() -> ModelMeta;

    /// 模型名，用于推导默认集合名；默认取类型名最后一段
    fn model_name() -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// 有序验证器列表
    fn validators() -> Vec<FieldValidator> {
        Vec::new()
    }

    /// 以 new=true 构造记录后调用
    fn after_new(_record: &mut ActiveRecord<Self>) {}

    /// 字段转换完成后、验证器执行前调用
    fn before_validation(_record: &mut ActiveRecord<Self>) {}

    /// 验证器执行后调用（即使验证失败）
    fn after_validation(_record: &mut ActiveRecord<Self>) {}

    /// 验证通过后、写入存储前调用
    fn before_save(_record: &mut ActiveRecord<Self>) {}

    /// 写入成功后调用
    fn after_save(_record: &mut ActiveRecord<Self>) {}

    /// 删除前调用，删除后没有对应钩子
    fn before_destroy(_record: &mut ActiveRecord<Self>) {}
}

/// `my_app::models::BlogPost<T>` → `BlogPost`
fn short_type_name(full: &str) -> String {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .to_string()
}

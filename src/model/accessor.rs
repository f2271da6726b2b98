//! 动态访问器解析
//!
//! 在模式定义时生成“访问器名 → 属性键”表，运行时 `getFoo`/`setFoo`
//! 调用先查表，未声明的名称再交给命名变换器解码

use crate::error::QuickRecordResult;
use crate::quick_error;
use crate::utils::inflector::{Inflector, to_pascal_case};
use std::collections::HashMap;

/// 访问器动作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessorKind {
    Get,
    Set,
}

/// 解析后的访问器调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAccessor {
    pub kind: AccessorKind,
    /// 目标属性键
    pub key: String,
}

/// 访问器表
#[derive(Debug, Clone, Default)]
pub struct AccessorTable {
    entries: HashMap<String, String>,
}

impl AccessorTable {
    /// 由声明字段生成访问器表，`ID`/`Id` 固定映射到 `_id`
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = &'a String>) -> Self {
        let mut entries = HashMap::new();
        for field in fields {
            entries.insert(to_pascal_case(field), field.clone());
        }
        entries.insert("ID".to_string(), "_id".to_string());
        entries.insert("Id".to_string(), "_id".to_string());
        Self { entries }
    }

    /// 查表得到属性键
    pub fn lookup(&self, property: &str) -> Option<&str> {
        self.entries.get(property).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 解析形如 `getFirstName` / `setFirstName` 的方法名
    ///
    /// 前缀大小写不敏感；前缀不是 get/set 或属性名为空时返回 `InvalidAccessor`
    pub fn resolve(
        &self,
        method: &str,
        inflector: &dyn Inflector,
    ) -> QuickRecordResult<ResolvedAccessor> {
        let (prefix, property) = match (method.get(..3), method.get(3..)) {
            (Some(prefix), Some(property)) => (prefix, property),
            _ => return Err(quick_error!(accessor, method, "方法名过短")),
        };
        let kind = match prefix.to_ascii_lowercase().as_str() {
            "get" => AccessorKind::Get,
            "set" => AccessorKind::Set,
            _ => return Err(quick_error!(accessor, method, "方法不存在")),
        };
        if property.is_empty() {
            return Err(quick_error!(accessor, method, "属性名为空"));
        }

        let key = match self.lookup(property) {
            Some(key) => key.to_string(),
            None => inflector.to_snake_case(property),
        };
        // `getid` / `setid` 等解码为 `id` 时同样指向 `_id`
        let key = if key == "id" { "_id".to_string() } else { key };
        if key.is_empty() {
            return Err(quick_error!(accessor, method, "属性名为空"));
        }
        Ok(ResolvedAccessor { kind, key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuickRecordError;
    use crate::utils::DefaultInflector;

    fn table() -> AccessorTable {
        let fields = vec!["first_name".to_string(), "age".to_string()];
        AccessorTable::from_fields(&fields)
    }

    #[test]
    fn test_declared_fields_resolve_through_table() {
        let table = table();
        let resolved = table.resolve("getFirstName", &DefaultInflector).unwrap();
        assert_eq!(resolved.kind, AccessorKind::Get);
        assert_eq!(resolved.key, "first_name");

        let resolved = table.resolve("SETAge", &DefaultInflector).unwrap();
        assert_eq!(resolved.kind, AccessorKind::Set);
        assert_eq!(resolved.key, "age");

        assert_eq!(table.resolve("getID", &DefaultInflector).unwrap().key, "_id");
        assert_eq!(table.resolve("setid", &DefaultInflector).unwrap().key, "_id");
        assert_eq!(table.resolve("GETiD", &DefaultInflector).unwrap().key, "_id");
    }

    #[test]
    fn test_undeclared_names_fall_back_to_inflector() {
        let resolved = table().resolve("getLastLogin", &DefaultInflector).unwrap();
        assert_eq!(resolved.key, "last_login");
    }

    #[test]
    fn test_invalid_shapes() {
        let table = table();
        for method in ["fetchName", "get", "ab", "", "isReady"] {
            match table.resolve(method, &DefaultInflector) {
                Err(QuickRecordError::InvalidAccessor { method: m, .. }) => assert_eq!(m, method),
                other => panic!("{} resolved unexpectedly: {:?}", method, other),
            }
        }
    }
}

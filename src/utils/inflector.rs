//! 命名变换工具
//!
//! 访问器方法名解码（驼峰 → 下划线）与默认集合名推导（类型名 → 复数下划线形式）

/// 命名变换协作者
///
/// 模型管理器通过该 trait 解码访问器名和推导集合名，可替换为自定义实现
pub trait Inflector: Send + Sync {
    /// 驼峰/帕斯卡命名转下划线命名
    fn to_snake_case(&self, identifier: &str) -> String;

    /// 类型名转集合名（下划线 + 复数）
    fn tableize(&self, type_name: &str) -> String;
}

/// 默认命名变换实现（英文规则）
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultInflector;

/// 不规则复数
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
];

/// 单复数同形
const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "news",
    "data",
];

impl Inflector for DefaultInflector {
    fn to_snake_case(&self, identifier: &str) -> String {
        to_snake_case(identifier)
    }

    fn tableize(&self, type_name: &str) -> String {
        let snake = to_snake_case(type_name);
        // 只对最后一个单词做复数变换
        match snake.rsplit_once('_') {
            Some((head, last)) => format!("{}_{}", head, pluralize(last)),
            None => pluralize(&snake),
        }
    }
}

/// 驼峰转下划线
///
/// 连续大写视为缩写：`HTMLParser` → `html_parser`，`userID` → `user_id`
pub fn to_snake_case(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut result = String::with_capacity(identifier.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' {
            if !result.ends_with('_') && !result.is_empty() {
                result.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = if i > 0 { Some(chars[i - 1]) } else { None };
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

/// 单词复数化
pub fn pluralize(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    if lower.is_empty() || UNCOUNTABLE.contains(&lower.as_str()) {
        return lower;
    }
    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return plural.to_string();
    }
    if IRREGULAR.iter().any(|(_, plural)| *plural == lower) {
        return lower;
    }

    if let Some(stem) = lower.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{}ies", stem);
        }
    }
    if let Some(stem) = lower.strip_suffix("fe") {
        return format!("{}ves", stem);
    }
    if lower.ends_with("lf") || lower.ends_with("rf") {
        return format!("{}ves", &lower[..lower.len() - 1]);
    }
    if lower.ends_with("ss")
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{}es", lower);
    }
    if lower.ends_with('s') {
        // 已是复数
        return lower;
    }
    format!("{}s", lower)
}

/// 下划线转帕斯卡命名：`first_name` → `FirstName`
pub fn to_pascal_case(name: &str) -> String {
    name.split(|c| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

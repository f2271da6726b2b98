//! 基础类型弱转换
//!
//! 语义与弱类型语言的强制转换一致：永不失败，无法识别的输入退化为零值

use crate::types::{DataValue, Document};

/// 转换为布尔值
pub fn to_boolean(value: DataValue) -> DataValue {
    let truthy = match &value {
        DataValue::Null => false,
        DataValue::Bool(b) => *b,
        DataValue::Int(i) => *i != 0,
        DataValue::Float(f) => *f != 0.0,
        DataValue::String(s) => !(s.is_empty() || s == "0"),
        DataValue::Array(items) => !items.is_empty(),
        DataValue::Object(map) => !map.is_empty(),
        DataValue::DateTime(_) | DataValue::ObjectId(_) => true,
    };
    DataValue::Bool(truthy)
}

/// 转换为整数
pub fn to_integer(value: DataValue) -> DataValue {
    let number = match value {
        DataValue::Null => 0,
        DataValue::Bool(b) => b as i64,
        DataValue::Int(i) => i,
        DataValue::Float(f) => float_to_int(f),
        DataValue::String(s) => parse_int_prefix(&s),
        DataValue::Array(items) => (!items.is_empty()) as i64,
        DataValue::Object(map) => (!map.is_empty()) as i64,
        DataValue::DateTime(dt) => dt.timestamp(),
        DataValue::ObjectId(_) => 1,
    };
    DataValue::Int(number)
}

/// 转换为浮点数
pub fn to_float(value: DataValue) -> DataValue {
    let number = match value {
        DataValue::Null => 0.0,
        DataValue::Bool(b) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        DataValue::Int(i) => i as f64,
        DataValue::Float(f) => f,
        DataValue::String(s) => parse_float_prefix(&s),
        DataValue::Array(items) => (!items.is_empty()) as i64 as f64,
        DataValue::Object(map) => (!map.is_empty()) as i64 as f64,
        DataValue::DateTime(dt) => dt.timestamp_millis() as f64 / 1000.0,
        DataValue::ObjectId(_) => 1.0,
    };
    DataValue::Float(number)
}

/// 转换为字符串
pub fn to_string(value: DataValue) -> DataValue {
    let text = match value {
        DataValue::Null => String::new(),
        DataValue::Bool(true) => "1".to_string(),
        DataValue::Bool(false) => String::new(),
        DataValue::Int(i) => i.to_string(),
        DataValue::Float(f) => f.to_string(),
        DataValue::String(s) => s,
        DataValue::DateTime(dt) => dt.to_rfc3339(),
        DataValue::ObjectId(oid) => oid,
        composite @ (DataValue::Array(_) | DataValue::Object(_)) => {
            composite.to_json_value().to_string()
        }
    };
    DataValue::String(text)
}

/// 转换为数组：对象取按键排序的值，标量包装为单元素数组
pub fn to_array(value: DataValue) -> DataValue {
    match value {
        DataValue::Array(items) => DataValue::Array(items),
        DataValue::Object(map) => DataValue::Array(map.into_values().collect()),
        DataValue::Null => DataValue::Array(Vec::new()),
        scalar => DataValue::Array(vec![scalar]),
    }
}

/// 转换为对象：数组按下标生成键，标量放在 `scalar` 键下
pub fn to_object(value: DataValue) -> DataValue {
    match value {
        DataValue::Object(map) => DataValue::Object(map),
        DataValue::Array(items) => DataValue::Object(
            items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
        ),
        DataValue::Null => DataValue::Object(Document::new()),
        scalar => {
            let mut map = Document::new();
            map.insert("scalar".to_string(), scalar);
            DataValue::Object(map)
        }
    }
}

fn float_to_int(f: f64) -> i64 {
    if f.is_finite() {
        // `as` 在超出范围时饱和
        f.trunc() as i64
    } else {
        0
    }
}

/// 字符串开头的数字部分，返回 (文本, 是否纯整数)
fn numeric_prefix(s: &str) -> Option<(&str, bool)> {
    let trimmed = s.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut int_digits = end - int_start;
    let mut is_integer = true;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || int_digits > 0 {
            int_digits += frac_end - frac_start;
            end = frac_end;
            is_integer = false;
        }
    }
    if int_digits == 0 {
        return None;
    }

    // 指数部分必须带数字才算
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
            is_integer = false;
        }
    }

    Some((&trimmed[..end], is_integer))
}

pub(crate) fn parse_int_prefix(s: &str) -> i64 {
    match numeric_prefix(s) {
        Some((text, true)) => text.parse::<i64>().unwrap_or_else(|_| {
            if text.starts_with('-') {
                i64::MIN
            } else {
                i64::MAX
            }
        }),
        Some((text, false)) => float_to_int(text.parse::<f64>().unwrap_or(0.0)),
        None => 0,
    }
}

pub(crate) fn parse_float_prefix(s: &str) -> f64 {
    match numeric_prefix(s) {
        Some((text, _)) => text.parse::<f64>().unwrap_or(0.0),
        None => 0.0,
    }
}

//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use rat_embed_lang::register_translations;
use std::collections::HashMap;
use std::sync::Once;

static REGISTER: Once = Once::new();

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

fn entry(zh: &str, en: &str, ja: &str) -> HashMap<String, String> {
    let mut messages = HashMap::new();
    messages.insert("zh-CN".to_string(), zh.to_string());
    messages.insert("en-US".to_string(), en.to_string());
    messages.insert("ja-JP".to_string(), ja.to_string());
    messages
}

impl ErrorMessageI18n {
    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let mut translations = HashMap::new();

        translations.insert(
            "error.config".to_string(),
            entry(
                "配置错误: {message}",
                "Configuration error: {message}",
                "設定エラー: {message}",
            ),
        );
        translations.insert(
            "error.accessor".to_string(),
            entry(
                "无效的访问器调用 {method}: {reason}",
                "Invalid accessor call {method}: {reason}",
                "無効なアクセサ呼び出し {method}: {reason}",
            ),
        );
        translations.insert(
            "error.connection".to_string(),
            entry(
                "数据库连接失败: {message}",
                "Database connection failed: {message}",
                "データベース接続に失敗しました: {message}",
            ),
        );
        translations.insert(
            "error.query".to_string(),
            entry(
                "查询执行失败: {message}",
                "Query execution failed: {message}",
                "クエリ実行が失敗しました: {message}",
            ),
        );
        translations.insert(
            "error.validation".to_string(),
            entry(
                "数据验证失败: {field} - {message}",
                "Data validation failed: {field} - {message}",
                "データ検証が失敗しました: {field} - {message}",
            ),
        );
        translations.insert(
            "error.serialization".to_string(),
            entry(
                "数据序列化失败: {message}",
                "Data serialization failed: {message}",
                "データシリアライズが失敗しました: {message}",
            ),
        );

        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::ensure_registered();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }

    /// 仅注册一次翻译表
    pub fn ensure_registered() {
        REGISTER.call_once(Self::register_all_translations);
    }
}

/// 渲染只带 message 参数的错误消息
pub(crate) fn message(key: &str, message: &str) -> String {
    ErrorMessageI18n::ensure_registered();
    tf(key, &[("message", message)])
}

pub(crate) fn accessor_message(method: &str, reason: &str) -> String {
    ErrorMessageI18n::ensure_registered();
    tf("error.accessor", &[("method", method), ("reason", reason)])
}

pub(crate) fn validation_message(field: &str, message: &str) -> String {
    ErrorMessageI18n::ensure_registered();
    tf("error.validation", &[("field", field), ("message", message)])
}

/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{current_language, set_language, t, tf};

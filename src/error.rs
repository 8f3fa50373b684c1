//! # 统一错误处理模块
//!
//! 定义 smact-structure 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 包装 `rusqlite`, `serde_json`, `csv` 的原生错误

use thiserror::Error;

/// smact-structure 统一错误类型
#[derive(Error, Debug)]
pub enum SmactError {
    // ─────────────────────────────────────────────────────────────
    // 校验错误
    // ─────────────────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Alignment mismatch in {context}: expected {expected}, found {found}")]
    Alignment {
        context: String,
        expected: usize,
        found: usize,
    },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format}: {reason}")]
    ParseError { format: String, reason: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ─────────────────────────────────────────────────────────────
    // 外部服务错误
    // ─────────────────────────────────────────────────────────────
    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Oxidation state decoration failed: {0}")]
    Decoration(String),

    #[error("Unsupported space group: {0}")]
    UnsupportedSpaceGroup(u32),

    // ─────────────────────────────────────────────────────────────
    // 数据库错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid table name: '{0}'")]
    InvalidTableName(String),

    #[error("Database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Other(String),
}

impl SmactError {
    /// 构造解析错误的便捷方法
    pub fn parse(format: &str, reason: impl Into<String>) -> Self {
        SmactError::ParseError {
            format: format.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SmactError>;

//! # 批量处理模块
//!
//! 为 `db import` 提供文件收集与并行解析。
//!
//! ## 功能
//! - 单文件或目录输入
//! - 多模式 glob 匹配
//! - 并行处理，进度反馈与失败汇总
//!
//! ## 依赖关系
//! - 被 `commands/db.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner};

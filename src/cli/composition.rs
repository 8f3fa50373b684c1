//! # composition 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/composition.rs`

use clap::Args;
use std::path::PathBuf;

/// composition 子命令参数
#[derive(Args, Debug)]
pub struct CompositionArgs {
    /// SMACT POSCAR files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

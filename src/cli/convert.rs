//! # convert 子命令 CLI 定义
//!
//! VASP POSCAR -> SMACT POSCAR，可选按元素固定氧化态修饰
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use clap::Args;
use std::path::PathBuf;

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input VASP POSCAR / CONTCAR / *.vasp file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fixed oxidation states per element, e.g. "Ca=2,Ti=4,O=-2"
    #[arg(long)]
    pub oxidation: Option<String>,

    /// Fail instead of continuing when decoration fails
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

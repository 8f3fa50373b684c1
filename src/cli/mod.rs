//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `convert`: 外部结构转规范文本
//! - `composition`: 打印组成键
//! - `db`: 结构数据库（嵌套子命令）
//! - `build`: 原型构建
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert, composition, db, build

pub mod build;
pub mod composition;
pub mod convert;
pub mod db;

use clap::{Parser, Subcommand};

/// smact - 材料筛选用的晶体结构记录工具
#[derive(Parser)]
#[command(name = "smact")]
#[command(version)]
#[command(about = "Canonical crystal structure records for materials screening", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert a VASP POSCAR into a SMACT POSCAR record
    Convert(convert::ConvertArgs),

    /// Print the composition keys of SMACT POSCAR files
    Composition(composition::CompositionArgs),

    /// Manage a SQLite structure database
    Db(db::DbArgs),

    /// Build an idealized prototype lattice
    Build(build::BuildArgs),
}

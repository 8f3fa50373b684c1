//! # build 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/build.rs`

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 可构建的原型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Prototype {
    /// Cubic perovskite ABX3 (space group 221)
    Perovskite,
    /// Wurtzite AB (space group 186, fixed cell)
    Wurtzite,
}

impl std::fmt::Display for Prototype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Prototype::Perovskite => write!(f, "perovskite"),
            Prototype::Wurtzite => write!(f, "wurtzite"),
        }
    }
}

/// build 子命令参数
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Prototype to build
    #[arg(value_enum)]
    pub prototype: Prototype,

    /// Element symbols, one per basis point (A B X for perovskite, A B for wurtzite)
    #[arg(short, long, num_args = 1.., required = true)]
    pub species: Vec<String>,

    /// Cell parameters: a b c alpha beta gamma
    #[arg(long, num_args = 6, allow_negative_numbers = true)]
    pub cell_par: Option<Vec<f64>>,

    /// Supercell repetitions along a, b, c
    #[arg(long, num_args = 3, default_values_t = [1usize, 1, 1])]
    pub repetitions: Vec<usize>,

    /// Write the generated structure as a VASP POSCAR
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the site lattice as JSON instead of a table
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

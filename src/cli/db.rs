//! # db 子命令 CLI 定义
//!
//! 结构数据库管理：建表、批量导入、按组成键查询、列表。
//! 数据库路径与表名可由环境变量 `SMACT_DB`、`SMACT_TABLE` 提供。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/db.rs`

use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

/// db 子命令参数
#[derive(Args, Debug)]
pub struct DbArgs {
    /// SQLite database file
    #[arg(long, env = "SMACT_DB", default_value = "structures.db")]
    pub db: PathBuf,

    #[command(subcommand)]
    pub command: DbCommands,
}

/// db 下的嵌套子命令
#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create a new structure table
    Init(InitArgs),

    /// Parse structure files in parallel and insert them in one transaction
    Import(ImportArgs),

    /// Retrieve all structures with an exact composition key
    Query(QueryArgs),

    /// List tables with their record counts
    Tables,
}

/// 导入文件的格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ImportFormat {
    /// SMACT POSCAR records
    Smact,
    /// VASP POSCAR files, converted on import
    Vasp,
}

impl ImportFormat {
    /// 未给出 `--pattern` 时使用的文件名模式
    pub fn default_pattern(self) -> &'static str {
        match self {
            ImportFormat::Smact => "*.txt",
            ImportFormat::Vasp => "POSCAR*,CONTCAR*,*.vasp",
        }
    }
}

impl std::fmt::Display for ImportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportFormat::Smact => write!(f, "smact"),
            ImportFormat::Vasp => write!(f, "vasp"),
        }
    }
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Table name
    #[arg(short, long, env = "SMACT_TABLE", default_value = "structures")]
    pub table: String,
}

/// import 子命令参数
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Input file or directory
    #[arg(short, long)]
    pub input: PathBuf,

    /// Table name
    #[arg(short, long, env = "SMACT_TABLE", default_value = "structures")]
    pub table: String,

    /// File name patterns, comma-separated [default: "*.txt" for smact, "POSCAR*,CONTCAR*,*.vasp" for vasp]
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Format of the input files
    #[arg(short, long, value_enum, default_value_t = ImportFormat::Smact)]
    pub format: ImportFormat,

    /// Fixed oxidation states for VASP input, e.g. "Ca=2,Ti=4,O=-2"
    #[arg(long)]
    pub oxidation: Option<String>,
}

impl ImportArgs {
    pub fn pattern(&self) -> &str {
        self.pattern
            .as_deref()
            .unwrap_or_else(|| self.format.default_pattern())
    }
}

/// query 子命令参数
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Composition key, e.g. "Ca_1_2+O_3_2-Ti_1_4+"
    pub composition: String,

    /// Table name
    #[arg(short, long, env = "SMACT_TABLE", default_value = "structures")]
    pub table: String,

    /// Write each match as a SMACT POSCAR file into this directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write matches as VASP POSCAR files instead of SMACT POSCAR
    #[arg(long, default_value_t = false, requires = "output")]
    pub vasp: bool,

    /// Save a summary of the matches as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
}

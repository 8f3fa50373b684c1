//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `utils/` 与 `smact_structure` 库
//! - 子模块: convert, composition, db, build

pub mod build;
pub mod composition;
pub mod convert;
pub mod db;

use crate::cli::Commands;
use smact_structure::error::Result;
use smact_structure::oxidation::{FixedOxidationDecorator, OxidationDecorator};

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Convert(args) => convert::execute(args),
        Commands::Composition(args) => composition::execute(args),
        Commands::Db(args) => db::execute(args),
        Commands::Build(args) => build::execute(args),
    }
}

/// 解析 `--oxidation` 参数
fn oxidation_decorator(spec: Option<&str>) -> Result<Option<FixedOxidationDecorator>> {
    spec.map(FixedOxidationDecorator::parse).transpose()
}

fn as_decorator(decorator: &Option<FixedOxidationDecorator>) -> Option<&dyn OxidationDecorator> {
    decorator.as_ref().map(|d| d as &dyn OxidationDecorator)
}

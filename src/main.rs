//! # smact - 结构记录命令行工具
//!
//! 基于 `smact_structure` 库的单一可执行文件。
//!
//! ## 子命令
//! - `convert`     - VASP POSCAR 转 SMACT POSCAR
//! - `composition` - 打印 SMACT POSCAR 文件的组成键
//! - `db`          - 结构数据库管理（嵌套子命令）
//!   - `init` / `import` / `query` / `tables`
//! - `build`       - 构建钙钛矿 / 纤锌矿原型
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     └── smact_structure (库)
//!   ├── batch/      (并行批处理)
//!   └── utils/      (工具函数)
//! ```

mod batch;
mod cli;
mod commands;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}

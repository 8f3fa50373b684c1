//! # composition 命令实现
//!
//! 读取 SMACT POSCAR 文件并以表格列出组成键、约化化学式与位点数。
//!
//! ## 依赖关系
//! - 使用 `cli/composition.rs` 定义的参数
//! - 使用 `tabled` 显示表格

use crate::cli::composition::CompositionArgs;
use crate::utils::output;
use smact_structure::error::Result;
use smact_structure::StructureRecord;

use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct CompositionRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Composition")]
    composition: String,
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "Sites")]
    sites: usize,
}

/// 执行 composition 命令
pub fn execute(args: CompositionArgs) -> Result<()> {
    let mut rows = Vec::with_capacity(args.files.len());
    let mut failed = 0;

    for path in &args.files {
        match StructureRecord::from_file(path) {
            Ok(record) => rows.push(CompositionRow {
                file: path.display().to_string(),
                composition: record.composition(),
                formula: record.reduced_formula(),
                sites: record.num_sites(),
            }),
            Err(e) => {
                failed += 1;
                output::print_error(&format!("{}: {}", path.display(), e));
            }
        }
    }

    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }
    if failed > 0 {
        output::print_warning(&format!("{} file(s) could not be read", failed));
    }

    Ok(())
}

//! # convert 命令实现
//!
//! 读取 VASP POSCAR，可选修饰氧化态，输出 SMACT POSCAR。
//! 修饰失败默认只给出警告并以未修饰的结构继续，`--strict` 时报错。
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `smact_structure::{parsers, models, oxidation}`
//! - 使用 `utils/output.rs`

use super::{as_decorator, oxidation_decorator};
use crate::cli::convert::ConvertArgs;
use crate::utils::output;
use smact_structure::error::Result;
use smact_structure::parsers;
use smact_structure::StructureRecord;

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<()> {
    let crystal = parsers::parse_structure_file(&args.input)?;
    let decorator = oxidation_decorator(args.oxidation.as_deref())?;

    let decorated = StructureRecord::from_crystal(&crystal, as_decorator(&decorator))?;
    let record = if args.strict {
        decorated.strict()?
    } else {
        if let Some(warning) = &decorated.warning {
            output::print_warning(&warning.to_string());
        }
        decorated.into_inner()
    };

    match &args.output {
        Some(path) => {
            record.write_file(path)?;
            output::print_conversion(
                &args.input.display().to_string(),
                &path.display().to_string(),
            );
            output::print_info(&format!("Composition: {}", record.composition()));
        }
        None => {
            // stdout 只输出记录本身，便于重定向
            print!("{}", record);
            log::info!("Composition: {}", record.composition());
        }
    }

    Ok(())
}

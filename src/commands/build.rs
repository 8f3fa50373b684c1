//! # build 命令实现
//!
//! 构建钙钛矿 / 纤锌矿原型，以表格或 JSON 显示位点，可导出 VASP POSCAR。
//!
//! ## 依赖关系
//! - 使用 `cli/build.rs` 定义的参数
//! - 使用 `smact_structure::builder`, `smact_structure::parsers::poscar`
//! - 使用 `tabled` 显示表格, `serde_json` 输出 JSON

use crate::cli::build::{BuildArgs, Prototype};
use crate::utils::output;
use smact_structure::builder::{self, PrototypeParams, PEROVSKITE_CELL, WURTZITE_CELL};
use smact_structure::error::{Result, SmactError};
use smact_structure::parsers::poscar::to_poscar_string;

use serde::Serialize;
use std::fs;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct SiteRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Element")]
    element: String,
    #[tabled(rename = "Position (frac)")]
    position: String,
    #[tabled(rename = "Oxidation")]
    oxidation: String,
}

#[derive(Debug, Serialize)]
struct BuildOutput<'a> {
    prototype: String,
    lattice: &'a [[f64; 3]; 3],
    sites: Vec<SiteOutput<'a>>,
}

#[derive(Debug, Serialize)]
struct SiteOutput<'a> {
    element: &'a str,
    position: [f64; 3],
    oxidation_states: &'a [i32],
}

/// 执行 build 命令
pub fn execute(args: BuildArgs) -> Result<()> {
    let params = prototype_params(&args)?;
    let species: Vec<&str> = args.species.iter().map(String::as_str).collect();

    let (lattice, system) = match args.prototype {
        Prototype::Perovskite => builder::cubic_perovskite(&species, &params)?,
        Prototype::Wurtzite => {
            if args.cell_par.is_some() {
                output::print_warning("Wurtzite always uses the fixed cell [3, 3, 6, 90, 90, 120].");
            }
            builder::wurtzite(&species, &params)?
        }
    };

    if args.json {
        let out = BuildOutput {
            prototype: args.prototype.to_string(),
            lattice: &system.lattice.matrix,
            sites: system
                .atoms
                .iter()
                .zip(&lattice.sites)
                .map(|(atom, site)| SiteOutput {
                    element: atom.element(),
                    position: site.position,
                    oxidation_states: &site.oxidation_states,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        output::print_header(&format!(
            "{} {} ({} sites)",
            system.formula(),
            args.prototype,
            lattice.len()
        ));

        let rows: Vec<SiteRow> = system
            .atoms
            .iter()
            .zip(&lattice.sites)
            .enumerate()
            .map(|(i, (atom, site))| SiteRow {
                index: i + 1,
                element: atom.element().to_string(),
                position: format!(
                    "{:.4} {:.4} {:.4}",
                    site.position[0], site.position[1], site.position[2]
                ),
                oxidation: site
                    .oxidation_states
                    .iter()
                    .map(|o| format!("{:+}", o))
                    .collect::<Vec<_>>()
                    .join(","),
            })
            .collect();

        println!("{}", Table::new(&rows));
    }

    if let Some(path) = &args.output {
        fs::write(path, to_poscar_string(&system)).map_err(|e| SmactError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;
        output::print_success(&format!("Structure written to '{}'", path.display()));
    }

    Ok(())
}

fn prototype_params(args: &BuildArgs) -> Result<PrototypeParams> {
    let default_cell = match args.prototype {
        Prototype::Perovskite => PEROVSKITE_CELL,
        Prototype::Wurtzite => WURTZITE_CELL,
    };

    let cell_par = match &args.cell_par {
        Some(values) => <[f64; 6]>::try_from(values.as_slice()).map_err(|_| {
            SmactError::InvalidArgument(format!("Expected 6 cell parameters, got {}", values.len()))
        })?,
        None => default_cell,
    };

    let repetitions = <[usize; 3]>::try_from(args.repetitions.as_slice()).map_err(|_| {
        SmactError::InvalidArgument(format!(
            "Expected 3 repetitions, got {}",
            args.repetitions.len()
        ))
    })?;

    Ok(PrototypeParams::new(cell_par).with_repetitions(repetitions))
}

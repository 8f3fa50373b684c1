//! # db 命令实现
//!
//! ## 功能
//! - `init`: 新建结构表
//! - `import`: 并行解析文件，单事务批量写入
//! - `query`: 按组成键检索，表格显示，可导出文件与 CSV
//! - `tables`: 列出表及记录数
//!
//! ## 依赖关系
//! - 使用 `cli/db.rs` 定义的参数
//! - 使用 `batch/` 收集与并行解析文件
//! - 使用 `smact_structure::store`
//! - 使用 `tabled` 显示表格, `csv` 导出

use super::{as_decorator, oxidation_decorator};
use crate::batch::{BatchRunner, FileCollector};
use crate::cli::db::{DbArgs, DbCommands, ImportArgs, ImportFormat, InitArgs, QueryArgs};
use crate::utils::output;
use smact_structure::error::{Result, SmactError};
use smact_structure::oxidation::OxidationDecorator;
use smact_structure::parsers::poscar::{parse_poscar_file, to_poscar_string};
use smact_structure::{StructureRecord, StructureStore};

use std::fs;
use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct MatchRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "Sites")]
    sites: usize,
    #[tabled(rename = "a (Å)")]
    a: String,
    #[tabled(rename = "Volume (Å³)")]
    volume: String,
}

#[derive(Debug, Clone, Tabled)]
struct TableRow {
    #[tabled(rename = "Table")]
    name: String,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Compositions")]
    compositions: usize,
}

/// 执行 db 命令
pub fn execute(args: DbArgs) -> Result<()> {
    let store = StructureStore::new(&args.db);
    log::debug!("Using database {}", store.path().display());

    match args.command {
        DbCommands::Init(init) => execute_init(&store, init),
        DbCommands::Import(import) => execute_import(&store, import),
        DbCommands::Query(query) => execute_query(&store, query),
        DbCommands::Tables => execute_tables(&store),
    }
}

fn execute_init(store: &StructureStore, args: InitArgs) -> Result<()> {
    store.add_table(&args.table)?;
    output::print_success(&format!(
        "Created table '{}' in '{}'",
        args.table,
        store.path().display()
    ));
    Ok(())
}

fn execute_import(store: &StructureStore, args: ImportArgs) -> Result<()> {
    output::print_header(&format!("Importing {} structures", args.format));

    let pattern = args.pattern();
    let files = FileCollector::new(args.input.clone())
        .with_pattern(pattern)?
        .recursive(args.recursive)
        .collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No files matched '{}' under {}",
            pattern,
            args.input.display()
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} files to import", files.len()));

    if args.oxidation.is_some() && args.format == ImportFormat::Smact {
        output::print_warning("--oxidation only applies to VASP input. Ignoring.");
    }
    let decorator = oxidation_decorator(args.oxidation.as_deref())?;

    let runner = BatchRunner::new(args.jobs);
    let batch = runner.run(&files, "Parsing", |path| {
        load_record(path, args.format, as_decorator(&decorator))
    })?;

    for (path, err) in &batch.failures {
        output::print_error(&format!("{}: {}", path, err));
    }

    if batch.items.is_empty() {
        output::print_warning("No structures could be parsed, nothing inserted.");
        return Ok(());
    }

    let inserted = store.add_structs(&batch.items, &args.table)?;

    output::print_done(&format!(
        "Inserted {} structure(s) into '{}' ({} of {} file(s) failed)",
        inserted,
        args.table,
        batch.failures.len(),
        batch.total()
    ));

    Ok(())
}

fn execute_query(store: &StructureStore, args: QueryArgs) -> Result<()> {
    let records = store.get_structs(&args.composition, &args.table)?;

    if records.is_empty() {
        output::print_warning(&format!(
            "No structures with composition '{}' in '{}'",
            args.composition, args.table
        ));
        return Ok(());
    }

    output::print_header(&format!(
        "{} structure(s) with composition {}",
        records.len(),
        args.composition
    ));

    let rows: Vec<MatchRow> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let crystal = r.to_crystal(&r.reduced_formula());
            let (a, _, _, _, _, _) = crystal.lattice.parameters();
            MatchRow {
                index: i + 1,
                formula: r.reduced_formula(),
                sites: r.num_sites(),
                a: format!("{:.4}", a),
                volume: format!("{:.4}", crystal.lattice.volume()),
            }
        })
        .collect();

    println!("{}", Table::new(&rows));

    if let Some(dir) = &args.output {
        write_records(&records, &args.composition, dir, args.vasp)?;
        output::print_success(&format!(
            "Wrote {} file(s) to '{}'",
            records.len(),
            dir.display()
        ));
    }

    if let Some(path) = &args.csv {
        save_matches_csv(&records, path)?;
        output::print_success(&format!("Summary saved to '{}'", path.display()));
    }

    Ok(())
}

fn execute_tables(store: &StructureStore) -> Result<()> {
    let names = store.list_tables()?;

    if names.is_empty() {
        output::print_warning(&format!("No tables in '{}'", store.path().display()));
        return Ok(());
    }

    let rows = names
        .into_iter()
        .map(|name| -> Result<TableRow> {
            Ok(TableRow {
                records: store.count(&name)?,
                compositions: store.compositions(&name)?.len(),
                name,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    println!("{}", Table::new(&rows));
    Ok(())
}

/// 按导入格式读取一个文件
///
/// VASP 输入不按扩展名分派，匹配到的文件一律按 POSCAR 解析。
fn load_record(
    path: &Path,
    format: ImportFormat,
    decorator: Option<&dyn OxidationDecorator>,
) -> Result<StructureRecord> {
    match format {
        ImportFormat::Smact => StructureRecord::from_file(path),
        ImportFormat::Vasp => {
            let crystal = parse_poscar_file(path)?;
            let decorated = StructureRecord::from_crystal(&crystal, decorator)?;
            if let Some(warning) = &decorated.warning {
                log::warn!("{}: {}", path.display(), warning);
            }
            Ok(decorated.into_inner())
        }
    }
}

/// 每条记录写为 `{composition}_{n}.txt`，`vasp` 时写为 `{composition}_{n}.vasp`
fn write_records(records: &[StructureRecord], composition: &str, dir: &Path, vasp: bool) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| SmactError::FileWriteError {
        path: dir.display().to_string(),
        source: e,
    })?;

    for (i, record) in records.iter().enumerate() {
        let stem = format!("{}_{}", composition, i + 1);
        if vasp {
            let path = dir.join(format!("{}.vasp", stem));
            let content = to_poscar_string(&record.to_crystal(&record.reduced_formula()));
            fs::write(&path, content).map_err(|e| SmactError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
        } else {
            record.write_file(&dir.join(format!("{}.txt", stem)))?;
        }
    }
    Ok(())
}

/// 保存检索结果摘要到 CSV
fn save_matches_csv(records: &[StructureRecord], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["index", "composition", "formula", "sites", "lattice_param", "volume"])?;

    for (i, r) in records.iter().enumerate() {
        let volume = r.to_crystal("").lattice.volume();
        wtr.write_record(&[
            (i + 1).to_string(),
            r.composition(),
            r.reduced_formula(),
            r.num_sites().to_string(),
            r.lattice_param().to_string(),
            format!("{:.10}", volume),
        ])?;
    }

    wtr.flush().map_err(|e| SmactError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use smact_structure::oxidation::FixedOxidationDecorator;

    const CA_TI_O3_VASP: &str = r#"CaTiO3
1.0
3.9 0.0 0.0
0.0 3.9 0.0
0.0 0.0 3.9
Ca Ti O
1 1 3
Direct
0.0 0.0 0.0
0.5 0.5 0.5
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
"#;

    struct TempFile(std::path::PathBuf);

    impl TempFile {
        fn new(name: &str, content: &str) -> Self {
            let path = std::env::temp_dir().join(format!("smact_db_{}_{}", std::process::id(), name));
            fs::write(&path, content).unwrap();
            TempFile(path)
        }
    }

    impl Drop for TempFile {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    #[test]
    fn test_vasp_import_ignores_extension() {
        let file = TempFile::new("CaTiO3.txt", CA_TI_O3_VASP);
        let decorator = FixedOxidationDecorator::parse("Ca=2,Ti=4,O=-2").unwrap();

        let record = load_record(&file.0, ImportFormat::Vasp, Some(&decorator)).unwrap();
        assert_eq!(record.composition(), "Ca_1_2+O_3_2-Ti_1_4+");
    }

    #[test]
    fn test_smact_import_reads_record_text() {
        let source = TempFile::new("CaTiO3.vasp", CA_TI_O3_VASP);
        let record = load_record(&source.0, ImportFormat::Vasp, None).unwrap();

        let file = TempFile::new("CaTiO3_smact.txt", &record.as_poscar());
        let loaded = load_record(&file.0, ImportFormat::Smact, None).unwrap();
        assert_eq!(loaded, record);
    }
}

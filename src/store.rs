//! # 结构数据库
//!
//! 以组成键为索引持久化结构记录的 SQLite 存储。
//! 每张表两列：`composition` (组成键) 与 `structure` (SMACT POSCAR 文本)。
//! 不做去重或唯一性约束，同一组成键可对应多条记录。
//!
//! 每个操作独立打开连接并在一个事务内完成：
//! 打开 → 执行 → 提交（出错则回滚）→ 关闭。多个调用之间不共享事务。
//!
//! ## 依赖关系
//! - 使用 `models/record.rs` 进行序列化与反序列化
//! - 使用 `rusqlite`

use crate::error::{Result, SmactError};
use crate::models::record::StructureRecord;

use rusqlite::{params, Connection, Transaction};
use std::path::{Path, PathBuf};

/// SQLite 结构数据库
#[derive(Debug, Clone)]
pub struct StructureStore {
    path: PathBuf,
}

impl StructureStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        StructureStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 在独立连接的单个事务中执行 `f`
    ///
    /// `f` 返回错误时事务回滚；无论成败连接都会关闭。
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = Connection::open(&self.path)?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        conn.close().map_err(|(_, e)| SmactError::Store(e))?;
        Ok(value)
    }

    /// 新建结构表，表已存在时返回数据库原生错误
    pub fn add_table(&self, table: &str) -> Result<()> {
        validate_table_name(table)?;
        self.with_connection(|tx| {
            tx.execute(
                &format!(
                    "CREATE TABLE {} (composition TEXT NOT NULL, structure TEXT NOT NULL)",
                    table
                ),
                [],
            )?;
            Ok(())
        })?;
        log::debug!("Created table '{}' in {}", table, self.path.display());
        Ok(())
    }

    /// 插入一条结构记录
    pub fn add_struct(&self, record: &StructureRecord, table: &str) -> Result<()> {
        self.add_structs(std::slice::from_ref(record), table)
            .map(|_| ())
    }

    /// 批量插入结构记录（同一事务，全部成功或全部回滚）
    pub fn add_structs(&self, records: &[StructureRecord], table: &str) -> Result<usize> {
        validate_table_name(table)?;
        let entries: Vec<(String, String)> = records
            .iter()
            .map(|r| (r.composition(), r.as_poscar()))
            .collect();

        let inserted = self.with_connection(|tx| {
            let mut stmt = tx.prepare(&format!("INSERT INTO {} VALUES (?1, ?2)", table))?;
            for (composition, poscar) in &entries {
                stmt.execute(params![composition, poscar])?;
            }
            Ok(entries.len())
        })?;

        log::debug!("Inserted {} structure(s) into '{}'", inserted, table);
        Ok(inserted)
    }

    /// 取出组成键完全匹配的全部结构，无匹配时返回空列表
    pub fn get_structs(&self, composition: &str, table: &str) -> Result<Vec<StructureRecord>> {
        validate_table_name(table)?;
        let texts: Vec<String> = self.with_connection(|tx| {
            let mut stmt =
                tx.prepare(&format!("SELECT structure FROM {} WHERE composition = ?1", table))?;
            let rows = stmt.query_map(params![composition], |row| row.get::<_, String>(0))?;
            let texts = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(texts)
        })?;

        texts
            .iter()
            .map(|text| StructureRecord::from_poscar(text))
            .collect()
    }

    /// 列出数据库中的所有表
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.with_connection(|tx| {
            let mut stmt = tx.prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let names = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(names)
        })
    }

    /// 表中记录总数
    pub fn count(&self, table: &str) -> Result<usize> {
        validate_table_name(table)?;
        self.with_connection(|tx| {
            let n: i64 = tx.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
            Ok(n as usize)
        })
    }

    /// 表中出现过的组成键（去重，按首次插入顺序）
    pub fn compositions(&self, table: &str) -> Result<Vec<String>> {
        validate_table_name(table)?;
        self.with_connection(|tx| {
            let mut stmt = tx.prepare(&format!(
                "SELECT composition FROM {} GROUP BY composition ORDER BY MIN(rowid)",
                table
            ))?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            let names = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(names)
        })
    }
}

/// 表名会直接拼入 SQL，只允许 `[A-Za-z_][A-Za-z0-9_]*`
fn validate_table_name(table: &str) -> Result<()> {
    let mut chars = table.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(SmactError::InvalidTableName(table.to_string()))
    }
}

//! # 文件收集器
//!
//! 根据输入路径和模式收集待导入的结构文件。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - 逗号分隔的多个 glob 模式
//! - 递归目录搜索，结果按路径排序
//!
//! ## 依赖关系
//! - 被 `commands/db.rs` 调用
//! - 使用 `walkdir` 遍历目录, `glob` 匹配文件名

use smact_structure::error::{Result, SmactError};

use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    input: PathBuf,
    patterns: Vec<Pattern>,
    recursive: bool,
}

impl FileCollector {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式），空模式匹配全部文件
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                Pattern::new(s).map_err(|e| {
                    SmactError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(self)
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        if !self.input.is_dir() {
            return Err(SmactError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| self.matches_patterns(e.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        Ok(files)
    }

    fn matches_patterns(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return true;
        }

        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.patterns.iter().any(|p| p.matches(name)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    struct TempTree(PathBuf);

    impl TempTree {
        fn new(name: &str) -> Self {
            let root = std::env::temp_dir().join(format!("smact_collect_{}_{}", std::process::id(), name));
            let _ = fs::remove_dir_all(&root);
            fs::create_dir_all(root.join("nested")).unwrap();
            for file in ["a.txt", "b.txt", "POSCAR", "notes.md", "nested/c.txt"] {
                fs::write(root.join(file), "").unwrap();
            }
            TempTree(root)
        }
    }

    impl Drop for TempTree {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn names(files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_collect_flat() {
        let tree = TempTree::new("flat");
        let files = FileCollector::new(tree.0.clone())
            .with_pattern("*.txt")
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(names(&files), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn test_collect_recursive_multi_pattern() {
        let tree = TempTree::new("recursive");
        let files = FileCollector::new(tree.0.clone())
            .with_pattern("*.txt, POSCAR*")
            .unwrap()
            .recursive(true)
            .collect()
            .unwrap();
        assert_eq!(files.len(), 4);
        assert!(names(&files).contains(&"c.txt".to_string()));
        assert!(names(&files).contains(&"POSCAR".to_string()));
    }

    #[test]
    fn test_missing_input() {
        let err = FileCollector::new(PathBuf::from("/nonexistent/smact/input"))
            .collect()
            .unwrap_err();
        assert!(matches!(err, SmactError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(FileCollector::new(PathBuf::from(".")).with_pattern("[").is_err());
    }
}

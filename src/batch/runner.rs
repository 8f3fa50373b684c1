//! # 批量执行器
//!
//! 在独立的 rayon 线程池中并行处理文件，收集成功结果与失败详情。
//!
//! ## 依赖关系
//! - 被 `commands/db.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条
//! - 使用 `rayon` 进行并行计算

use crate::utils::progress;
use smact_structure::error::{Result, SmactError};

use rayon::prelude::*;
use std::path::PathBuf;

/// 批量处理结果，成功项保持输入顺序
#[derive(Debug)]
pub struct BatchResult<T> {
    pub items: Vec<T>,
    /// (文件路径, 错误信息)
    pub failures: Vec<(String, String)>,
}

impl<T> BatchResult<T> {
    pub fn total(&self) -> usize {
        self.items.len() + self.failures.len()
    }
}

/// 批量执行器
pub struct BatchRunner {
    jobs: usize,
}

impl BatchRunner {
    /// `jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self { jobs }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// 并行处理文件列表
    pub fn run<T, F>(&self, files: &[PathBuf], message: &str, processor: F) -> Result<BatchResult<T>>
    where
        T: Send,
        F: Fn(&PathBuf) -> Result<T> + Sync + Send,
    {
        let pb = progress::create_progress_bar(files.len() as u64, message);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| SmactError::Other(format!("Failed to build thread pool: {}", e)))?;

        let results: Vec<(String, Result<T>)> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let result = processor(file);
                    pb.inc(1);
                    (file.display().to_string(), result)
                })
                .collect()
        });

        pb.finish_and_clear();

        let mut batch = BatchResult {
            items: Vec::with_capacity(results.len()),
            failures: Vec::new(),
        };
        for (path, result) in results {
            match result {
                Ok(item) => batch.items.push(item),
                Err(e) => {
                    log::debug!("{}: {}", path, e);
                    batch.failures.push((path, e.to_string()));
                }
            }
        }

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_keeps_order_and_collects_failures() {
        let files: Vec<PathBuf> = (0..6).map(|i| PathBuf::from(format!("{}.txt", i))).collect();
        let batch = BatchRunner::new(2)
            .run(&files, "Parsing", |path| {
                let stem = path.file_stem().unwrap().to_string_lossy();
                let n: usize = stem.parse().unwrap();
                if n % 3 == 0 {
                    Err(SmactError::Other(format!("bad {}", n)))
                } else {
                    Ok(n)
                }
            })
            .unwrap();

        assert_eq!(batch.items, vec![1, 2, 4, 5]);
        assert_eq!(batch.failures.len(), 2);
        assert_eq!(batch.failures[0].0, "0.txt");
        assert_eq!(batch.total(), 6);
    }

    #[test]
    fn test_zero_jobs_uses_all_cpus() {
        assert_eq!(BatchRunner::new(0).jobs(), num_cpus::get());
    }
}

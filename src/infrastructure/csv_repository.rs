// CSV file repository implementation
use crate::application::log_repository::LogRepository;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CsvFileRepository {
    path: PathBuf,
}

impl CsvFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl LogRepository for CsvFileRepository {
    async fn read_raw(&self) -> Result<String> {
        tracing::debug!("Reading log file {}", self.path.display());
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read log file {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_file_contents() {
        let path = std::env::temp_dir().join(format!("log-dashboard-{}.csv", std::process::id()));
        tokio::fs::write(&path, "h\n1,2024-01-01,10:00:00,INFO,A,x,E1\n").await.unwrap();

        let raw = CsvFileRepository::new(&path).read_raw().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert!(raw.starts_with("h\n1,2024-01-01"));
    }

    #[tokio::test]
    async fn test_missing_file_names_path() {
        let repo = CsvFileRepository::new("/nonexistent/dir/logs.csv");
        let err = repo.read_raw().await.unwrap_err();

        assert!(err.to_string().contains("/nonexistent/dir/logs.csv"));
    }
}

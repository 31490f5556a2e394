// Repository trait for raw log data access
use async_trait::async_trait;

#[async_trait]
pub trait LogRepository: Send + Sync {
    /// Read the full CSV text of the log file, header line included
    async fn read_raw(&self) -> anyhow::Result<String>;
}

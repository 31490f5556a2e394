// Log analytics service - Use cases behind the dashboard log endpoints
use crate::application::log_repository::LogRepository;
use crate::domain::chart::DistributionDatum;
use crate::domain::filter::{paginate, Page, PagedRecords, RecordFilter};
use crate::domain::log_record::{parse_records, LogRecord};
use crate::domain::ranking::{aggregate_by_component, aggregate_by_event, BucketPoint, EventCount};
use crate::domain::stats::{compute_stats, HourlyPoint, LogCounts, LogStats};
use crate::domain::time_bucket::{aggregate_by_time, TimeBucketPoint, TimeUnit};
use anyhow::Context;
use std::sync::Arc;

#[derive(Clone)]
pub struct LogAnalyticsService {
    repository: Arc<dyn LogRepository>,
}

impl LogAnalyticsService {
    pub fn new(repository: Arc<dyn LogRepository>) -> Self {
        Self { repository }
    }

    /// Load, parse and filter the full record set. Every call re-reads the source.
    pub async fn load_records(&self, filter: &RecordFilter) -> anyhow::Result<Vec<LogRecord>> {
        let raw = self
            .repository
            .read_raw()
            .await
            .context("Failed to read log source")?;

        let records = filter.apply(parse_records(&raw));
        tracing::debug!("Loaded {} records (filtered: {})", records.len(), !filter.is_empty());
        Ok(records)
    }

    pub async fn list_records(&self, filter: &RecordFilter, page: Page) -> anyhow::Result<PagedRecords> {
        let records = self.load_records(filter).await?;
        Ok(paginate(records, page))
    }

    pub async fn stats(&self, filter: &RecordFilter) -> anyhow::Result<LogStats> {
        let records = self.load_records(filter).await?;
        Ok(compute_stats(&records))
    }

    pub async fn counts(&self, filter: &RecordFilter) -> anyhow::Result<LogCounts> {
        Ok(self.stats(filter).await?.counts())
    }

    pub async fn hourly(&self, filter: &RecordFilter) -> anyhow::Result<Vec<HourlyPoint>> {
        Ok(self.stats(filter).await?.hourly())
    }

    /// Top components as `{name, value}` pairs
    pub async fn top_components(&self, filter: &RecordFilter) -> anyhow::Result<Vec<DistributionDatum>> {
        let points = self.component_levels(filter).await?;
        Ok(points.iter().map(BucketPoint::to_datum).collect())
    }

    /// Top components with their per-level breakdown
    pub async fn component_levels(&self, filter: &RecordFilter) -> anyhow::Result<Vec<BucketPoint>> {
        let records = self.load_records(filter).await?;
        Ok(aggregate_by_component(&records))
    }

    pub async fn top_events(&self, filter: &RecordFilter) -> anyhow::Result<Vec<EventCount>> {
        let records = self.load_records(filter).await?;
        Ok(aggregate_by_event(&records).into_iter().map(EventCount::from).collect())
    }

    pub async fn time_series(&self, filter: &RecordFilter, unit: TimeUnit) -> anyhow::Result<Vec<TimeBucketPoint>> {
        let records = self.load_records(filter).await?;
        Ok(aggregate_by_time(&records, unit))
    }
}

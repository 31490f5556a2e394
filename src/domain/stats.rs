// Level/component/hour/date histograms over a record set
use super::log_record::{LevelCounts, LogRecord};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogStats {
    pub total: u64,
    pub by_level: LevelCounts,
    pub by_component: BTreeMap<String, u64>,
    pub by_hour: BTreeMap<String, LevelCounts>,
    pub by_date: BTreeMap<String, u64>,
}

/// Totals for the counts endpoint: `{total, INFO, WARN, ERROR, DEBUG}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LogCounts {
    pub total: u64,
    #[serde(flatten)]
    pub levels: LevelCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub hour: String,
    #[serde(flatten)]
    pub levels: LevelCounts,
}

impl LogStats {
    pub fn counts(&self) -> LogCounts {
        LogCounts {
            total: self.total,
            levels: self.by_level,
        }
    }

    /// Hour rows ordered by hour string.
    pub fn hourly(&self) -> Vec<HourlyPoint> {
        self.by_hour
            .iter()
            .map(|(hour, levels)| HourlyPoint {
                hour: hour.clone(),
                levels: *levels,
            })
            .collect()
    }
}

pub fn compute_stats(records: &[LogRecord]) -> LogStats {
    let mut stats = LogStats::default();

    for record in records {
        stats.total += 1;
        stats.by_level.increment(record.level);

        if !record.component.is_empty() {
            *stats.by_component.entry(record.component.clone()).or_insert(0) += 1;
        }

        stats
            .by_hour
            .entry(record.hour().to_string())
            .or_default()
            .increment(record.level);

        *stats.by_date.entry(record.date.clone()).or_insert(0) += 1;
    }

    stats
}

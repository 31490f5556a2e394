// Time-bucketed level counts for time-series charts
use super::log_record::{prefix, LevelCounts, LogRecord};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeUnit {
    Second,
    Minute,
    #[default]
    Hour,
    Day,
    Month,
    Year,
}

impl TimeUnit {
    /// Unknown names fall back to hourly buckets.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "second" => TimeUnit::Second,
            "minute" => TimeUnit::Minute,
            "hour" => TimeUnit::Hour,
            "day" => TimeUnit::Day,
            "month" => TimeUnit::Month,
            "year" => TimeUnit::Year,
            _ => TimeUnit::Hour,
        }
    }

    pub fn bucket_key(&self, record: &LogRecord) -> String {
        let date = record.date.as_str();
        let time = record.time.as_str();
        match self {
            TimeUnit::Second => format!("{} {}", date, time),
            TimeUnit::Minute => format!("{} {}", date, prefix(time, 5)),
            TimeUnit::Hour => format!("{} {}:00", date, prefix(time, 2)),
            TimeUnit::Day => date.to_string(),
            TimeUnit::Month => prefix(date, 7).to_string(),
            TimeUnit::Year => prefix(date, 4).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeBucketPoint {
    pub time: String,
    pub count: u64,
    #[serde(flatten)]
    pub levels: LevelCounts,
}

/// Group records into buckets of `unit` and return them in ascending key order.
pub fn aggregate_by_time(records: &[LogRecord], unit: TimeUnit) -> Vec<TimeBucketPoint> {
    let mut buckets: HashMap<String, TimeBucketPoint> = HashMap::new();

    for record in records {
        let key = unit.bucket_key(record);
        let point = buckets.entry(key).or_insert_with_key(|key| TimeBucketPoint {
            time: key.clone(),
            count: 0,
            levels: LevelCounts::default(),
        });
        point.count += 1;
        point.levels.increment(record.level);
    }

    // Keys at a given unit share one zero-padded layout, so string order is time order.
    let mut points: Vec<TimeBucketPoint> = buckets.into_values().collect();
    points.sort_by(|a, b| a.time.cmp(&b.time));
    points
}

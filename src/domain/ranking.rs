// Top-N component and event rankings
use super::chart::DistributionDatum;
use super::log_record::{LevelCounts, LogRecord};
use serde::Serialize;
use std::collections::HashMap;

pub const TOP_COMPONENTS: usize = 5;
pub const TOP_EVENTS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketPoint {
    pub key: String,
    pub count: u64,
    #[serde(flatten)]
    pub levels: LevelCounts,
}

impl BucketPoint {
    pub fn to_datum(&self) -> DistributionDatum {
        DistributionDatum::new(self.key.clone(), self.count as f64)
    }
}

/// Event frequency row: `{eventId, count}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventCount {
    pub event_id: String,
    pub count: u64,
}

impl From<BucketPoint> for EventCount {
    fn from(point: BucketPoint) -> Self {
        Self {
            event_id: point.key,
            count: point.count,
        }
    }
}

/// Group records by `key_fn`, rank by count descending and keep the first `limit`.
/// Ties keep the order in which keys were first seen.
pub fn aggregate_by_key<F>(records: &[LogRecord], key_fn: F, limit: usize) -> Vec<BucketPoint>
where
    F: Fn(&LogRecord) -> &str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut points: Vec<BucketPoint> = Vec::new();

    for record in records {
        let key = key_fn(record);
        let idx = *index.entry(key).or_insert_with(|| {
            points.push(BucketPoint {
                key: key.to_string(),
                count: 0,
                levels: LevelCounts::default(),
            });
            points.len() - 1
        });
        points[idx].count += 1;
        points[idx].levels.increment(record.level);
    }

    // sort_by is stable
    points.sort_by(|a, b| b.count.cmp(&a.count));
    points.truncate(limit);
    points
}

pub fn aggregate_by_component(records: &[LogRecord]) -> Vec<BucketPoint> {
    aggregate_by_key(records, |r| r.component.as_str(), TOP_COMPONENTS)
}

pub fn aggregate_by_event(records: &[LogRecord]) -> Vec<BucketPoint> {
    aggregate_by_key(records, |r| r.event_id.as_str(), TOP_EVENTS)
}

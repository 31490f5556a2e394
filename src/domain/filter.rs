// Record filtering and pagination
use super::log_record::{LogLevel, LogRecord};
use chrono::NaiveDate;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 500;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum FilterError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("date range is empty: {from} is after {to}")]
    EmptyRange { from: String, to: String },
}

/// Caller-held filter state applied before aggregation. All criteria are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub level: Option<LogLevel>,
    pub component: Option<String>,
    /// Inclusive bounds, kept in the records' `YYYY-MM-DD` form.
    pub from: Option<String>,
    pub to: Option<String>,
    pub search: Option<String>,
}

impl RecordFilter {
    /// Build a filter from loosely typed request parameters. Blank values are
    /// treated as absent.
    pub fn from_params(
        level: Option<LogLevel>,
        component: Option<String>,
        from: Option<&str>,
        to: Option<&str>,
        search: Option<String>,
    ) -> Result<Self, FilterError> {
        let from = parse_date(from)?;
        let to = parse_date(to)?;

        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(FilterError::EmptyRange {
                    from: f.to_string(),
                    to: t.to_string(),
                });
            }
        }

        Ok(Self {
            level,
            component: non_blank(component),
            from: from.map(|d| d.format(DATE_FORMAT).to_string()),
            to: to.map(|d| d.format(DATE_FORMAT).to_string()),
            search: non_blank(search).map(|s| s.to_lowercase()),
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        if let Some(level) = self.level {
            if record.level != level {
                return false;
            }
        }
        if let Some(component) = &self.component {
            if &record.component != component {
                return false;
            }
        }
        // Record dates are zero-padded ISO strings, so string order is date order.
        if let Some(from) = &self.from {
            if record.date < *from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if record.date > *to {
                return false;
            }
        }
        if let Some(search) = &self.search {
            if !record.content.to_lowercase().contains(search.as_str()) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, records: Vec<LogRecord>) -> Vec<LogRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, FilterError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => NaiveDate::parse_from_str(v, DATE_FORMAT)
            .map(Some)
            .map_err(|_| FilterError::InvalidDate(v.to_string())),
        None => Ok(None),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Page {
    pub page: usize,
    pub page_size: usize,
}

impl Page {
    pub fn new(page: Option<usize>, page_size: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedRecords {
    pub items: Vec<LogRecord>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

pub fn paginate(records: Vec<LogRecord>, page: Page) -> PagedRecords {
    let total = records.len();
    let total_pages = total.div_ceil(page.page_size);
    let start = (page.page - 1).saturating_mul(page.page_size);

    let items = records
        .into_iter()
        .skip(start)
        .take(page.page_size)
        .collect();

    PagedRecords {
        items,
        total,
        page: page.page,
        page_size: page.page_size,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(line_id: i64, date: &str, level: LogLevel, component: &str, content: &str) -> LogRecord {
        LogRecord {
            line_id,
            date: date.to_string(),
            time: "12:00:00".to_string(),
            level,
            component: component.to_string(),
            content: content.to_string(),
            event_id: "E1".to_string(),
        }
    }

    fn sample() -> Vec<LogRecord> {
        vec![
            record(1, "2024-01-01", LogLevel::Info, "api", "started"),
            record(2, "2024-01-02", LogLevel::Error, "db", "Connection refused"),
            record(3, "2024-01-03", LogLevel::Error, "api", "timeout"),
            record(4, "2024-01-04", LogLevel::Warn, "db", "slow query"),
        ]
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = RecordFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(sample()).len(), 4);
    }

    #[test]
    fn test_level_and_component() {
        let filter = RecordFilter::from_params(Some(LogLevel::Error), Some("api".into()), None, None, None).unwrap();
        let kept = filter.apply(sample());

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].line_id, 3);
    }

    #[test]
    fn test_inclusive_date_range() {
        let filter = RecordFilter::from_params(None, None, Some("2024-01-02"), Some("2024-01-03"), None).unwrap();
        let ids: Vec<i64> = filter.apply(sample()).iter().map(|r| r.line_id).collect();

        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_date_bounds_are_stored_as_record_dates() {
        let filter = RecordFilter::from_params(None, None, Some(" 2024-01-02 "), Some("2024-01-03"), None).unwrap();

        assert_eq!(filter.from.as_deref(), Some("2024-01-02"));
        assert_eq!(filter.to.as_deref(), Some("2024-01-03"));
        let ids: Vec<i64> = filter.apply(sample()).iter().map(|r| r.line_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let filter = RecordFilter::from_params(None, None, None, None, Some("CONNECTION".into())).unwrap();
        let kept = filter.apply(sample());

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].line_id, 2);
    }

    #[test]
    fn test_blank_params_are_ignored() {
        let filter = RecordFilter::from_params(None, Some("  ".into()), Some(""), None, Some(String::new())).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(
            RecordFilter::from_params(None, None, Some("2024-13-01"), None, None),
            Err(FilterError::InvalidDate("2024-13-01".to_string()))
        );
        assert!(matches!(
            RecordFilter::from_params(None, None, Some("2024-02-01"), Some("2024-01-01"), None),
            Err(FilterError::EmptyRange { .. })
        ));
    }

    #[test]
    fn test_paginate() {
        let page = paginate(sample(), Page::new(Some(2), Some(3)));

        assert_eq!(page.total, 4);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].line_id, 4);

        let beyond = paginate(sample(), Page::new(Some(9), Some(3)));
        assert!(beyond.items.is_empty());
    }

    #[test]
    fn test_page_defaults_and_clamping() {
        assert_eq!(Page::default(), Page { page: 1, page_size: DEFAULT_PAGE_SIZE });
        assert_eq!(Page::new(Some(0), Some(0)), Page { page: 1, page_size: 1 });
        assert_eq!(Page::new(None, Some(10_000)).page_size, MAX_PAGE_SIZE);
    }
}

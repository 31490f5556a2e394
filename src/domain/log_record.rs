// Log record domain model and CSV row parser
use serde::{Deserialize, Serialize};

const MIN_FIELDS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogLevel {
    /// Exact, case-sensitive match against the level names used in the log files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            "DEBUG" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub line_id: i64,
    pub date: String,
    pub time: String,
    pub level: LogLevel,
    pub component: String,
    pub content: String,
    pub event_id: String,
}

impl LogRecord {
    /// Hour-of-day bucket ("00".."23") taken from the first two characters of `time`.
    pub fn hour(&self) -> &str {
        prefix(&self.time, 2)
    }
}

/// Per-level counters shared by stats, time buckets and ranked points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelCounts {
    #[serde(rename = "INFO")]
    pub info: u64,
    #[serde(rename = "WARN")]
    pub warn: u64,
    #[serde(rename = "ERROR")]
    pub error: u64,
    #[serde(rename = "DEBUG")]
    pub debug: u64,
}

impl LevelCounts {
    pub fn increment(&mut self, level: LogLevel) {
        match level {
            LogLevel::Info => self.info += 1,
            LogLevel::Warn => self.warn += 1,
            LogLevel::Error => self.error += 1,
            LogLevel::Debug => self.debug += 1,
        }
    }

    #[cfg(test)]
    pub fn total(&self) -> u64 {
        self.info + self.warn + self.error + self.debug
    }
}

/// Parse raw CSV text into log records.
///
/// The first line is a header and is skipped. Rows with fewer than seven
/// fields, or with an empty date, time or component, are dropped without
/// error. Quoted content containing commas is not supported: the row is split
/// on every comma and only a single pair of surrounding quotes is removed.
pub fn parse_records(raw: &str) -> Vec<LogRecord> {
    let mut seen = 0usize;
    let records: Vec<LogRecord> = raw
        .split('\n')
        .skip(1)
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .inspect(|_| seen += 1)
        .filter_map(parse_row)
        .collect();

    tracing::debug!("Parsed {} of {} log rows", records.len(), seen);
    records
}

fn parse_row(line: &str) -> Option<LogRecord> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let line_id = fields[0].parse::<i64>().unwrap_or(0);
    // Unrecognized levels are counted as INFO; downstream views rely on this.
    let level = LogLevel::from_name(fields[3]).unwrap_or(LogLevel::Info);

    let record = LogRecord {
        line_id,
        date: fields[1].to_string(),
        time: fields[2].to_string(),
        level,
        component: fields[4].to_string(),
        content: strip_quotes(fields[5]).to_string(),
        event_id: fields[6].to_string(),
    };

    if record.date.is_empty() || record.time.is_empty() || record.component.is_empty() {
        return None;
    }

    Some(record)
}

fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// First `n` characters of `s`, or all of `s` when it is shorter.
pub fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_quoted_row() {
        let records = parse_records("h\n1,2024-01-01,10:15:30,ERROR,Compx,\"boom\",E1\n");

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            LogRecord {
                line_id: 1,
                date: "2024-01-01".to_string(),
                time: "10:15:30".to_string(),
                level: LogLevel::Error,
                component: "Compx".to_string(),
                content: "boom".to_string(),
                event_id: "E1".to_string(),
            }
        );
    }

    #[test]
    fn test_header_only_and_empty_input() {
        assert!(parse_records("").is_empty());
        assert!(parse_records("header\n").is_empty());
        assert!(parse_records("LineId,Date,Time,Level,Component,Content,EventId").is_empty());
    }

    #[test]
    fn test_short_rows_are_dropped() {
        let raw = "h\n\
                   1,2024-01-01,10:00:00,INFO,A,hello,E1\n\
                   2,2024-01-01,10:00:01,INFO,A,hello\n\
                   \n\
                   3,2024-01-01,10:00:02,WARN,B,world,E2,extra,fields\n";
        let records = parse_records(raw);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line_id, 1);
        assert_eq!(records[1].line_id, 3);
        assert_eq!(records[1].event_id, "E2");
    }

    #[test]
    fn test_empty_required_fields_are_dropped() {
        let raw = "h\n\
                   1,,10:00:00,INFO,A,x,E1\n\
                   2,2024-01-01,,INFO,A,x,E1\n\
                   3,2024-01-01,10:00:00,INFO,,x,E1\n\
                   4,2024-01-01,10:00:00,INFO,A,,\n";
        let records = parse_records(raw);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_id, 4);
        assert_eq!(records[0].content, "");
        assert_eq!(records[0].event_id, "");
    }

    #[test]
    fn test_lenient_defaults() {
        let raw = "h\r\nabc,2024-01-01,10:00:00,TRACE,A,x,E1\r\n5,2024-01-01,10:00:00,warn,A,x,E1\r\n";
        let records = parse_records(raw);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line_id, 0);
        assert_eq!(records[0].level, LogLevel::Info);
        // Level matching is case-sensitive.
        assert_eq!(records[1].level, LogLevel::Info);
        assert_eq!(records[1].event_id, "E1");
    }

    #[test]
    fn test_embedded_comma_splits_content() {
        let records = parse_records("h\n1,2024-01-01,10:00:00,INFO,A,\"a,b\",E1\n");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content, "a");
        assert_eq!(records[0].event_id, "b\"");
    }

    #[test]
    fn test_row_count_matches_valid_rows() {
        let mut raw = String::from("header\n");
        for i in 0..25 {
            raw.push_str(&format!("{},2024-02-0{},0{}:00:00,DEBUG,C{},msg,E{}\n", i, i % 9 + 1, i % 10, i % 3, i));
        }
        raw.push_str("bad,row\n");

        assert_eq!(parse_records(&raw).len(), 25);
    }

    #[test]
    fn test_prefix() {
        assert_eq!(prefix("10:15:30", 2), "10");
        assert_eq!(prefix("10:15:30", 5), "10:15");
        assert_eq!(prefix("9", 2), "9");
        assert_eq!(prefix("", 4), "");
    }

    #[test]
    fn test_level_counts() {
        let mut counts = LevelCounts::default();
        counts.increment(LogLevel::Error);
        counts.increment(LogLevel::Error);
        counts.increment(LogLevel::Debug);

        assert_eq!(counts.error, 2);
        assert_eq!(counts.info, 0);
        assert_eq!(counts.total(), 3);

        let json = serde_json::to_value(counts).unwrap();
        assert_eq!(json["ERROR"], 2);
        assert_eq!(json["DEBUG"], 1);
    }
}

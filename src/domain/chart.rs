// Chart-ready data shaping: Others collapse, reference lines and margins
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Circular charts show at most this many slices before collapsing the tail.
pub const MAX_VISIBLE_ITEMS: usize = 3;
pub const OTHERS_LABEL: &str = "Others";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionDatum {
    pub name: String,
    pub value: f64,
}

impl DistributionDatum {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Pie,
    Radar,
    RadialBar,
    Bar,
    Line,
    Area,
    Scatter,
    Table,
    Unknown,
}

impl ChartKind {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "pie" => ChartKind::Pie,
            "radar" => ChartKind::Radar,
            "radialbar" | "radial-bar" | "radial_bar" => ChartKind::RadialBar,
            "bar" => ChartKind::Bar,
            "line" => ChartKind::Line,
            "area" => ChartKind::Area,
            "scatter" => ChartKind::Scatter,
            "table" => ChartKind::Table,
            _ => ChartKind::Unknown,
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, ChartKind::Pie | ChartKind::Radar | ChartKind::RadialBar)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedChartData {
    pub data: Vec<DistributionDatum>,
    pub total_items: usize,
    pub has_others: bool,
    pub others_value: f64,
}

/// Sort by value descending; circular charts keep the top items and fold the
/// rest into a trailing "Others" entry.
pub fn process_for_chart(data: Vec<DistributionDatum>, kind: ChartKind) -> ProcessedChartData {
    let total_items = data.len();
    if total_items <= 1 {
        return ProcessedChartData {
            data,
            total_items,
            has_others: false,
            others_value: 0.0,
        };
    }

    let mut sorted = data;
    sorted.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));

    if kind.is_circular() && sorted.len() > MAX_VISIBLE_ITEMS {
        let others_value: f64 = sorted[MAX_VISIBLE_ITEMS..].iter().map(|d| d.value).sum();
        sorted.truncate(MAX_VISIBLE_ITEMS);
        sorted.push(DistributionDatum::new(OTHERS_LABEL, others_value));

        return ProcessedChartData {
            data: sorted,
            total_items,
            has_others: true,
            others_value,
        };
    }

    ProcessedChartData {
        data: sorted,
        total_items,
        has_others: false,
        others_value: 0.0,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLines {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub ticks: Vec<f64>,
}

/// Min/avg/max guide lines over already-processed chart data.
pub fn reference_lines(data: &[DistributionDatum]) -> ReferenceLines {
    if data.is_empty() {
        return ReferenceLines {
            min: 0.0,
            max: 0.0,
            avg: 0.0,
            ticks: Vec::new(),
        };
    }

    let min = data.iter().map(|d| d.value).fold(f64::INFINITY, f64::min);
    let max = data.iter().map(|d| d.value).fold(f64::NEG_INFINITY, f64::max);
    let avg = data.iter().map(|d| d.value).sum::<f64>() / data.len() as f64;

    let mut ticks = vec![min, avg, max];
    ticks.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    ticks.dedup();

    ReferenceLines { min, max, avg, ticks }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Margins {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

pub fn margins_for(item_count: usize, kind: ChartKind) -> Margins {
    if kind.is_circular() {
        return Margins {
            top: 30,
            right: 30,
            bottom: 30,
            left: 30,
        };
    }

    let bottom = if item_count > 15 {
        40
    } else if item_count > 8 {
        30
    } else {
        20
    };

    Margins {
        top: 20,
        right: 30,
        bottom,
        left: 5,
    }
}

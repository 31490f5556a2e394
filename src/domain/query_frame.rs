// Tabular query results and the group/aggregate/sort pipeline that shapes them for charts
use super::chart::DistributionDatum;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

pub const TIMESTAMP_COLUMN: &str = "timestamp";
pub const TOTAL_GROUP_COLUMN: &str = "group";
pub const TOTAL_GROUP_KEY: &str = "total";
const TAGS_PREFIX: &str = "tags.";
const VALUE_COLUMN: &str = "value";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Null,
}

impl CellValue {
    /// Numeric view of the cell; numeric strings count as numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// String form used for group keys and chart labels.
    pub fn key_string(&self) -> String {
        match self {
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Null => String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResultFrame {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<CellValue>>,
}

impl QueryResultFrame {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    fn column_index(&self) -> HashMap<&str, usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Count,
    Sum,
    Avg,
    None,
}

/// How an aggregated column is reduced within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
    RowCount,
}

impl Aggregation {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "COUNT" => Aggregation::Count,
            "SUM" => Aggregation::Sum,
            "AVG" => Aggregation::Avg,
            _ => Aggregation::None,
        }
    }

    /// Upstream rows already carry per-row counts, so COUNT sums them.
    pub fn reduction(&self) -> Reduction {
        match self {
            Aggregation::Count | Aggregation::Sum => Reduction::Sum,
            Aggregation::Avg => Reduction::Mean,
            Aggregation::None => Reduction::RowCount,
        }
    }

    /// Suffix of the synthesized aggregate columns, e.g. `value_sum`.
    pub fn suffix(&self) -> &'static str {
        match self {
            Aggregation::Count => "count",
            Aggregation::Sum => "sum",
            Aggregation::Avg => "avg",
            Aggregation::None => "count",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortField {
    Value,
    Time,
    Column(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub group_by_fields: Vec<String>,
    pub aggregation: Aggregation,
    pub sort: Option<SortSpec>,
}

impl GroupSpec {
    pub fn new(group_by_fields: Vec<String>, aggregation: Aggregation, sort: Option<SortSpec>) -> Self {
        // Tags are flattened into top-level columns upstream.
        let group_by_fields = group_by_fields
            .into_iter()
            .map(|f| f.strip_prefix(TAGS_PREFIX).map(str::to_string).unwrap_or(f))
            .filter(|f| !f.is_empty())
            .collect();

        Self {
            group_by_fields,
            aggregation,
            sort,
        }
    }

    /// Validate the loosely typed interpretation returned by the query backend.
    /// Returns `None` when no aggregation was given at all.
    pub fn from_interpreted(query: &InterpretedQuery) -> Option<Self> {
        let aggregation = Aggregation::from_name(query.aggregation.as_deref()?);

        let group_by = match &query.group_by {
            Some(GroupBy::One(field)) => vec![field.clone()],
            Some(GroupBy::Many(fields)) => fields.clone(),
            None => Vec::new(),
        };

        let sort = query.sort.as_ref().and_then(RawSort::to_spec);

        Some(Self::new(group_by, aggregation, sort))
    }
}

/// `interpretedQuery` as sent by the NL-query backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterpretedQuery {
    #[serde(default)]
    pub group_by: Option<GroupBy>,
    #[serde(default)]
    pub aggregation: Option<String>,
    #[serde(default)]
    pub sort: Option<RawSort>,
    #[serde(default)]
    pub visualization_hint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupBy {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSort {
    Field(String),
    Spec {
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        order: Option<String>,
    },
}

impl RawSort {
    fn to_spec(&self) -> Option<SortSpec> {
        let (field, order) = match self {
            RawSort::Field(field) => (field.as_str(), None),
            RawSort::Spec { field, order } => (field.as_deref()?, order.as_deref()),
        };

        let field = match field.trim() {
            "" => return None,
            "value" => SortField::Value,
            "time" => SortField::Time,
            other => SortField::Column(other.to_string()),
        };

        Some(SortSpec {
            field,
            order: order.map(SortOrder::from_name).unwrap_or_default(),
        })
    }
}

/// Column-oriented grouping result. `values[i]` holds the cells of
/// `columns[i]`; every column has one cell per group, in group order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedFrame {
    pub columns: Vec<String>,
    pub values: Vec<Vec<CellValue>>,
    group_columns: usize,
    /// Index of the charted aggregate: `value_{suffix}`, else the first aggregate.
    value_column: Option<usize>,
}

impl GroupedFrame {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.values.first().map(Vec::len).unwrap_or(0)
    }

    pub fn aggregate_columns(&self) -> &[String] {
        &self.columns[self.group_columns..]
    }

    /// One datum per group: group values joined as the name, and the charted
    /// aggregate as the value.
    pub fn to_distribution(&self) -> Vec<DistributionDatum> {
        let Some(value_idx) = self.value_column else {
            return Vec::new();
        };

        (0..self.row_count())
            .map(|row| {
                let name = self.values[..self.group_columns]
                    .iter()
                    .map(|col| col[row].key_string())
                    .collect::<Vec<_>>()
                    .join(" / ");
                let value = self.values[value_idx][row].as_f64().unwrap_or(0.0);
                DistributionDatum::new(name, value)
            })
            .collect()
    }
}

#[cfg(test)]
impl GroupedFrame {
    pub fn column(&self, name: &str) -> Option<&[CellValue]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    pub fn group_columns(&self) -> &[String] {
        &self.columns[..self.group_columns]
    }
}

impl Serialize for GroupedFrame {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, values) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    numeric: usize,
    non_null: usize,
}

impl Accumulator {
    fn add(&mut self, cell: Option<&CellValue>) {
        let Some(cell) = cell else { return };
        if !cell.is_null() {
            self.non_null += 1;
        }
        if let Some(n) = cell.as_f64() {
            self.sum += n;
            self.numeric += 1;
        }
    }

    fn finish(&self, reduction: Reduction) -> f64 {
        match reduction {
            Reduction::Sum => self.sum,
            Reduction::Mean if self.numeric == 0 => 0.0,
            Reduction::Mean => self.sum / self.numeric as f64,
            Reduction::RowCount => self.non_null as f64,
        }
    }
}

struct Group {
    key_cells: Vec<CellValue>,
    accumulators: Vec<Accumulator>,
}

/// Group `frame` rows by `spec.group_by_fields` and reduce the remaining numeric
/// columns. Degenerate frames produce an empty result.
pub fn group_and_aggregate(frame: &QueryResultFrame, spec: &GroupSpec) -> GroupedFrame {
    if frame.is_empty() {
        return GroupedFrame::default();
    }

    let index = frame.column_index();
    let timestamp_idx = index.get(TIMESTAMP_COLUMN).copied();

    let mut seen_fields = HashSet::new();
    let group_idx: Vec<usize> = spec
        .group_by_fields
        .iter()
        .filter(|f| seen_fields.insert(f.as_str()))
        .filter_map(|f| index.get(f.as_str()).copied())
        .collect();

    let value_idx: Vec<usize> = (0..frame.columns.len())
        .filter(|i| !group_idx.contains(i) && Some(*i) != timestamp_idx)
        .filter(|i| frame.rows.iter().any(|row| row.get(*i).and_then(CellValue::as_f64).is_some()))
        .collect();

    let mut rows: Vec<&Vec<CellValue>> = frame.rows.iter().collect();
    if let (Some(SortSpec { field: SortField::Time, .. }), Some(t)) = (&spec.sort, timestamp_idx) {
        rows.sort_by(|a, b| compare_cells(a.get(t), b.get(t)));
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut lookup: HashMap<Vec<String>, usize> = HashMap::new();

    for row in rows {
        let key: Vec<String> = if group_idx.is_empty() {
            vec![TOTAL_GROUP_KEY.to_string()]
        } else {
            group_idx
                .iter()
                .map(|&i| row.get(i).map(CellValue::key_string).unwrap_or_default())
                .collect()
        };

        let slot = *lookup.entry(key).or_insert_with(|| {
            let key_cells = if group_idx.is_empty() {
                vec![CellValue::Text(TOTAL_GROUP_KEY.to_string())]
            } else {
                group_idx
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(CellValue::Null))
                    .collect()
            };
            groups.push(Group {
                key_cells,
                accumulators: vec![Accumulator::default(); value_idx.len()],
            });
            groups.len() - 1
        });

        for (acc, &i) in groups[slot].accumulators.iter_mut().zip(&value_idx) {
            acc.add(row.get(i));
        }
    }

    let reduction = spec.aggregation.reduction();
    let suffix = spec.aggregation.suffix();

    // Both the value sort and the chart read the `value` column's aggregate.
    let value_pos = index
        .get(VALUE_COLUMN)
        .and_then(|vi| value_idx.iter().position(|i| i == vi));

    if let Some(SortSpec { field: SortField::Value, order }) = &spec.sort {
        if let Some(pos) = value_pos {
            groups.sort_by(|a, b| {
                let ord = a.accumulators[pos]
                    .finish(reduction)
                    .partial_cmp(&b.accumulators[pos].finish(reduction))
                    .unwrap_or(Ordering::Equal);
                match order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }
    }

    let mut columns: Vec<String> = if group_idx.is_empty() {
        vec![TOTAL_GROUP_COLUMN.to_string()]
    } else {
        group_idx.iter().map(|&i| frame.columns[i].clone()).collect()
    };
    let group_columns = columns.len();
    columns.extend(value_idx.iter().map(|&i| format!("{}_{}", frame.columns[i], suffix)));

    let mut values: Vec<Vec<CellValue>> = vec![Vec::with_capacity(groups.len()); columns.len()];
    for group in &groups {
        for (col, cell) in group.key_cells.iter().enumerate() {
            values[col].push(cell.clone());
        }
        for (offset, acc) in group.accumulators.iter().enumerate() {
            values[group_columns + offset].push(CellValue::Number(acc.finish(reduction)));
        }
    }

    tracing::debug!(
        "Grouped {} rows into {} groups by {:?}",
        frame.rows.len(),
        groups.len(),
        spec.group_by_fields
    );

    let value_column = match (value_pos, value_idx.is_empty()) {
        (Some(pos), _) => Some(group_columns + pos),
        (None, false) => Some(group_columns),
        (None, true) => None,
    };

    GroupedFrame {
        columns,
        values,
        group_columns,
        value_column,
    }
}

fn compare_cells(a: Option<&CellValue>, b: Option<&CellValue>) -> Ordering {
    match (a, b) {
        (Some(CellValue::Number(x)), Some(CellValue::Number(y))) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) if !x.is_null() && !y.is_null() => x.key_string().cmp(&y.key_string()),
        (Some(x), _) if !x.is_null() => Ordering::Less,
        (_, Some(y)) if !y.is_null() => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

// Query service - Natural-language questions shaped into chart-ready results
use crate::application::query_backend::QueryBackend;
use crate::domain::chart::{
    margins_for, process_for_chart, reference_lines, ChartKind, Margins, ProcessedChartData, ReferenceLines,
};
use crate::domain::query_frame::{group_and_aggregate, CellValue, GroupSpec, GroupedFrame, InterpretedQuery};
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInsight {
    pub question: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
    pub interpreted_query: Option<InterpretedQuery>,
    pub grouped: GroupedFrame,
    pub chart_kind: ChartKind,
    pub chart: ProcessedChartData,
    pub reference_lines: ReferenceLines,
    pub margins: Margins,
}

#[derive(Clone)]
pub struct QueryService {
    backend: Arc<dyn QueryBackend>,
}

impl QueryService {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self { backend }
    }

    /// Ask the backend and shape its table for display.
    ///
    /// `chart_kind` overrides the backend's visualization hint. Without an
    /// interpretation carrying an aggregation, the grouped view and chart are empty.
    pub async fn ask(&self, question: &str, chart_kind: Option<ChartKind>) -> anyhow::Result<QueryInsight> {
        let response = self
            .backend
            .run_query(question)
            .await
            .context("Query backend request failed")?;

        let spec = response.interpreted_query.as_ref().and_then(GroupSpec::from_interpreted);
        let grouped = match &spec {
            Some(spec) => group_and_aggregate(&response.frame, spec),
            None => GroupedFrame::default(),
        };

        if grouped.is_empty() && !response.frame.is_empty() {
            tracing::warn!("Query result has {} rows but no usable grouping", response.frame.rows.len());
        }

        let chart_kind = chart_kind.unwrap_or_else(|| {
            response
                .interpreted_query
                .as_ref()
                .and_then(|q| q.visualization_hint.as_deref())
                .map(ChartKind::from_name)
                .unwrap_or(ChartKind::Bar)
        });

        let chart = process_for_chart(grouped.to_distribution(), chart_kind);
        let reference_lines = reference_lines(&chart.data);
        let margins = margins_for(chart.data.len(), chart_kind);

        tracing::info!(
            "Answered query with {} rows, {} groups, chart {:?}",
            response.frame.rows.len(),
            grouped.row_count(),
            chart_kind
        );

        Ok(QueryInsight {
            question: question.to_string(),
            columns: response.frame.columns,
            rows: response.frame.rows,
            interpreted_query: response.interpreted_query,
            grouped,
            chart_kind,
            chart,
            reference_lines,
            margins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::query_backend::QueryResponse;
    use async_trait::async_trait;

    struct CannedBackend(serde_json::Value);

    #[async_trait]
    impl QueryBackend for CannedBackend {
        async fn run_query(&self, _question: &str) -> anyhow::Result<QueryResponse> {
            Ok(serde_json::from_value(self.0.clone())?)
        }
    }

    struct DownBackend;

    #[async_trait]
    impl QueryBackend for DownBackend {
        async fn run_query(&self, _question: &str) -> anyhow::Result<QueryResponse> {
            anyhow::bail!("connection refused")
        }
    }

    fn service(value: serde_json::Value) -> QueryService {
        QueryService::new(Arc::new(CannedBackend(value)))
    }

    fn component_response(hint: &str) -> serde_json::Value {
        serde_json::json!({
            "columns": ["component", "value"],
            "rows": [["a", 50], ["b", 20], ["c", 15], ["d", 10], ["e", 5]],
            "interpretedQuery": {
                "group_by": ["tags.component"],
                "aggregation": "COUNT",
                "sort": {"field": "value", "order": "desc"},
                "visualization_hint": hint
            }
        })
    }

    #[tokio::test]
    async fn test_pie_hint_collapses_others() {
        let insight = service(component_response("pie")).ask("errors by component", None).await.unwrap();

        assert_eq!(insight.chart_kind, ChartKind::Pie);
        assert_eq!(insight.grouped.row_count(), 5);
        assert!(insight.chart.has_others);
        assert_eq!(insight.chart.others_value, 15.0);
        assert_eq!(insight.chart.data.len(), 4);
        assert_eq!(insight.chart.data[3].name, "Others");
        assert_eq!(insight.reference_lines.max, 50.0);
        assert_eq!(insight.margins.left, 30);
    }

    #[tokio::test]
    async fn test_explicit_kind_overrides_hint() {
        let insight = service(component_response("pie"))
            .ask("errors by component", Some(ChartKind::Bar))
            .await
            .unwrap();

        assert_eq!(insight.chart_kind, ChartKind::Bar);
        assert!(!insight.chart.has_others);
        assert_eq!(insight.chart.data.len(), 5);
        assert_eq!(insight.margins.bottom, 20);
    }

    #[tokio::test]
    async fn test_missing_interpretation_gives_empty_chart() {
        let insight = service(serde_json::json!({"columns": ["a"], "rows": [[1]]}))
            .ask("anything", None)
            .await
            .unwrap();

        assert!(insight.grouped.is_empty());
        assert!(insight.chart.data.is_empty());
        assert_eq!(insight.chart_kind, ChartKind::Bar);
        assert_eq!(insight.rows.len(), 1);
    }

    #[tokio::test]
    async fn test_backend_failure_is_an_error() {
        let svc = QueryService::new(Arc::new(DownBackend));
        let err = svc.ask("anything", None).await.unwrap_err();

        assert!(format!("{:#}", err).contains("connection refused"));
    }
}

// Client trait for the external natural-language query backend
use crate::domain::query_frame::{InterpretedQuery, QueryResultFrame};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Response of the NL-query backend: a result table plus how the question was interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(flatten)]
    pub frame: QueryResultFrame,
    #[serde(default)]
    pub interpreted_query: Option<InterpretedQuery>,
}

#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Translate a natural-language question into a tabular result
    async fn run_query(&self, question: &str) -> anyhow::Result<QueryResponse>;
}

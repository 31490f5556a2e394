// HTTP client for the external analytics / NL-query backend
use crate::application::query_backend::{QueryBackend, QueryResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpQueryBackend {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct QueryRequest<'a> {
    question: &'a str,
}

impl HttpQueryBackend {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            client,
        })
    }

    fn query_url(&self) -> String {
        format!("{}/query", self.base_url)
    }
}

#[async_trait]
impl QueryBackend for HttpQueryBackend {
    async fn run_query(&self, question: &str) -> Result<QueryResponse> {
        let url = self.query_url();
        tracing::debug!("Sending query to {}", url);

        let mut request = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .json(&QueryRequest { question });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("Failed to send request to query backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Query backend failed with status {}: {}", status, body);
        }

        let data = response
            .json::<QueryResponse>()
            .await
            .context("Failed to parse query backend response")?;

        tracing::debug!("Query backend returned {} rows", data.frame.rows.len());
        Ok(data)
    }
}

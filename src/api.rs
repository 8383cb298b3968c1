//! Direct Exa REST client
//!
//! Thin wrapper over the vendor HTTP API. In the current routing only
//! `answer` goes through here; the other methods exist so the direct path
//! keeps the same surface as the MCP path and stays callable if the
//! routing table ever changes.
//! See: https://docs.exa.ai/reference

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{ExaError, Result};

/// Base URL for the Exa REST API
pub const DEFAULT_API_BASE: &str = "https://api.exa.ai";

/// Options for the `answer` endpoint
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOptions {
    /// Model variant (`exa` or `exa-pro`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// JSON schema for structured answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Include full citation text in the response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<bool>,
}

/// Response from the `answer` endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    /// Plain string, or an object when an output schema was supplied
    pub answer: Value,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// A source cited by an answer
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
}

/// Exa REST API client
pub struct ExaApi {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ExaApi {
    pub fn new(api_key: &str) -> Self {
        let client = Client::builder()
            .user_agent("exa-cli/0.1")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: DEFAULT_API_BASE.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Point the client at a different API base (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// POST /answer - answer a question with citations
    pub async fn answer(&self, query: &str, options: &AnswerOptions) -> Result<AnswerResponse> {
        let mut body = serde_json::to_value(options)?;
        body["query"] = json!(query);

        let value = self.post("/answer", &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// POST /search - not wired into the routing client today
    pub async fn search(&self, query: &str, num_results: Option<u32>) -> Result<Value> {
        let mut body = json!({ "query": query });
        if let Some(n) = num_results {
            body["numResults"] = json!(n);
        }
        self.post("/search", &body).await
    }

    /// POST /contents - not wired into the routing client today
    pub async fn get_contents(&self, urls: &[String]) -> Result<Value> {
        self.post("/contents", &json!({ "urls": urls })).await
    }

    /// POST /research/v1 - not wired into the routing client today
    pub async fn research_create(&self, instructions: &str, model: &str) -> Result<Value> {
        let body = json!({ "instructions": instructions, "model": model });
        self.post("/research/v1", &body).await
    }

    /// GET /research/v1/{id} - not wired into the routing client today
    pub async fn research_get(&self, id: &str, events: bool) -> Result<Value> {
        let mut request = self
            .client
            .get(format!("{}/research/v1/{}", self.base_url, id))
            .header("x-api-key", &self.api_key);
        if events {
            request = request.query(&[("events", "true")]);
        }

        Self::into_json(request.send().await?).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("x-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        Self::into_json(response).await
    }

    async fn into_json(response: reqwest::Response) -> Result<Value> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExaError::ApiStatus { status, body });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_options_omit_unset_fields() {
        let body = serde_json::to_value(AnswerOptions::default()).unwrap();
        assert_eq!(body, json!({}));
    }

    #[test]
    fn answer_options_serialize_camel_case() {
        let options = AnswerOptions {
            model: Some("exa-pro".to_string()),
            output_schema: Some(json!({"type": "object"})),
            text: None,
        };
        let body = serde_json::to_value(&options).unwrap();
        assert_eq!(body["model"], "exa-pro");
        assert_eq!(body["outputSchema"]["type"], "object");
        assert!(body.get("text").is_none());
    }

    #[test]
    fn answer_response_accepts_string_answer() {
        let response: AnswerResponse = serde_json::from_value(json!({
            "answer": "42",
            "citations": [{"url": "https://example.com", "title": "Example"}],
            "requestId": "req-1",
        }))
        .unwrap();

        assert_eq!(response.answer, json!("42"));
        assert_eq!(response.citations.len(), 1);
        assert_eq!(response.request_id.as_deref(), Some("req-1"));
    }

    #[test]
    fn answer_response_accepts_structured_answer() {
        let response: AnswerResponse = serde_json::from_value(json!({
            "answer": {"population": 8000000},
        }))
        .unwrap();

        assert_eq!(response.answer["population"], 8000000);
        assert!(response.citations.is_empty());
    }
}

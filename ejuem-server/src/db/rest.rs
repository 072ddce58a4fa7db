//! PostgREST 风格的托管记录存储
//!
//! ```text
//! GET    {url}/rest/v1/{table}?select=...&col=eq.v&order=col.desc
//! POST   {url}/rest/v1/{table}            (Prefer: return=representation)
//! PATCH  {url}/rest/v1/{table}?id=eq.x    (Prefer: return=representation)
//! DELETE {url}/rest/v1/{table}?id=eq.x    (Prefer: return=representation)
//! ```
//!
//! 每个请求都带 `apikey` 与 `Authorization: Bearer` 头。
//! 该后端不发布变更通知，订单推送退化为轮询。

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

use super::query::{Direction, Filter, Query};
use super::{RecordStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn send(&self, req: RequestBuilder) -> StoreResult<Vec<Value>> {
        let response = self.authorized(req).send().await.map_err(map_reqwest)?;
        let status = response.status();
        let text = response.text().await.map_err(map_reqwest)?;

        if !status.is_success() {
            let message = error_message(&text);
            return Err(match status {
                StatusCode::CONFLICT => StoreError::Conflict(message),
                _ => StoreError::Rejected {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row => Ok(vec![row]),
        }
    }
}

/// Query-string pairs for equality filters (`col=eq.value`)
fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.clone(), format!("eq.{}", render_value(&f.value))))
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Pull `message` out of a PostgREST error body, falling back to the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn map_reqwest(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::Timeout
    } else if err.is_decode() {
        StoreError::Decode(err.to_string())
    } else {
        StoreError::Network(err.to_string())
    }
}

/// Full query-string for a select
fn select_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), query.select_clause())];
    params.extend(filter_params(&query.filters));
    if let Some(order) = &query.order_by {
        let dir = match order.direction {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        };
        params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
    }
    params
}

#[async_trait]
impl RecordStore for RestStore {
    async fn select(&self, table: &str, query: &Query) -> StoreResult<Vec<Value>> {
        let req = self
            .client
            .get(self.table_url(table))
            .query(&select_params(query));
        self.send(req).await
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> StoreResult<Vec<Value>> {
        let req = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&rows);
        self.send(req).await
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Value,
    ) -> StoreResult<Vec<Value>> {
        let req = self
            .client
            .patch(self.table_url(table))
            .query(&filter_params(filters))
            .header("Prefer", "return=representation")
            .json(&patch);
        self.send(req).await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> StoreResult<Vec<Value>> {
        let req = self
            .client
            .delete(self.table_url(table))
            .query(&filter_params(filters))
            .header("Prefer", "return=representation");
        self.send(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Embed;

    #[test]
    fn test_select_params() {
        let query = Query::new()
            .embed(Embed::new("categories").columns(["name"]))
            .eq("available", true)
            .order_by("created_at", Direction::Desc);

        assert_eq!(
            select_params(&query),
            vec![
                ("select".to_string(), "*, categories(name)".to_string()),
                ("available".to_string(), "eq.true".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_string_filters_are_unquoted() {
        let params = filter_params(&[Filter::eq("status", "pendiente"), Filter::eq("number", 4)]);
        assert_eq!(params[0].1, "eq.pendiente");
        assert_eq!(params[1].1, "eq.4");
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        assert_eq!(
            error_message(body),
            "duplicate key value violates unique constraint"
        );
        assert_eq!(error_message("gateway down"), "gateway down");
    }
}

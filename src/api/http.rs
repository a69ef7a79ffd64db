use super::provider::{ContentApi, ListQuery, Page};
use crate::error::Result;
use crate::models::Collection;
use crate::DashboardError;
use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::time::Duration;

pub struct HttpContentApi {
    client: Client,
    base_url: String,
}

impl HttpContentApi {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("safari-admin/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DashboardError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpContentApi { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn send_json(&self, method: Method, path: &str, payload: Option<Value>) -> Result<Value> {
        let url = self.url(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(payload) = payload {
            request = request.json(&payload);
        }
        let response = request
            .send()
            .await
            .map_err(|e| DashboardError::Network(format!("Failed to send request: {}", e)))?;

        read_json(ensure_success(response).await?).await
    }
}

/// Routes and verbs for an update call; the two collections differ.
pub fn update_route(collection: Collection, id: &str) -> (Method, String) {
    match collection {
        Collection::Blogs => (Method::PUT, format!("blogs/{}/update", id)),
        Collection::Itineraries => (Method::PATCH, format!("itineraries/update/{}", id)),
    }
}

/// Picks a human readable message out of an error body.
pub(crate) fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(|message| message.to_string())
}

pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::warn!("Request failed ({}): {}", status, body);
    Err(DashboardError::Api {
        status: status.as_u16(),
        message: server_message(&body),
    })
}

async fn read_json(response: Response) -> Result<Value> {
    let text = response
        .text()
        .await
        .map_err(|e| DashboardError::Network(format!("Failed to read response: {}", e)))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[async_trait]
impl ContentApi for HttpContentApi {
    async fn list(&self, collection: Collection, query: &ListQuery) -> Result<Page<Value>> {
        let url = self.url(&format!("{}/", collection));
        tracing::debug!("GET {} page {}", url, query.page);

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DashboardError::Network(format!("Failed to send request: {}", e)))?;

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| DashboardError::Network(format!("Failed to parse list response: {}", e)))
    }

    async fn fetch_full(&self, collection: Collection, id: &str) -> Result<Value> {
        match self
            .send_json(Method::GET, &format!("{}/{}/full", collection, id), None)
            .await
        {
            Err(DashboardError::Api { status: 404, .. }) => Err(DashboardError::NotFound(format!(
                "{} {}",
                collection.singular(),
                id
            ))),
            other => other,
        }
    }

    async fn create(&self, collection: Collection, payload: Value) -> Result<Value> {
        self.send_json(Method::POST, &format!("{}/", collection), Some(payload))
            .await
    }

    async fn update(&self, collection: Collection, id: &str, payload: Value) -> Result<Value> {
        let (method, path) = update_route(collection, id);
        self.send_json(method, &path, Some(payload)).await
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<()> {
        self.send_json(Method::DELETE, &format!("{}/{}/delete", collection, id), None)
            .await?;
        Ok(())
    }
}

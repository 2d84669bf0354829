//! Shared JSON-over-HTTP plumbing for backend and upstream calls.

use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use vesave_core::{Result, VeSaveError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Joins `base` and an absolute `path`, tolerating a trailing slash on the base.
pub fn join_path(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

/// A base URL plus a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct JsonHttp {
    client: Client,
    base: String,
}

impl JsonHttp {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base: base.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        join_path(&self.base, path)
    }

    /// POSTs `body` as JSON and decodes a JSON response.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        decode(&url, response).await
    }

    /// POSTs with an empty body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        decode(&url, response).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        decode(&url, response).await
    }

    /// Sends a DELETE and discards any response body.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        let response = self
            .client
            .delete(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(status_error(&url, status, response).await)
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> VeSaveError {
    tracing::warn!("[Http] Request to {} failed: {}", url, err);
    VeSaveError::http(err.status().map(|s| s.as_u16()), err.to_string())
}

async fn decode<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(url, status, response).await);
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, e))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Builds an `Http` error from a non-2xx response.
///
/// Prefers the `error` field of a JSON body; the field may itself be an
/// upstream JSON document, in which case it is rendered compactly.
async fn status_error(url: &str, status: StatusCode, response: Response) -> VeSaveError {
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        format!("Request to {} failed (HTTP {}).", url, status.as_u16())
    });
    tracing::warn!(
        status = status.as_u16(),
        "[Http] {} responded with error: {}",
        url,
        message
    );
    VeSaveError::http(Some(status.as_u16()), message)
}

fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(message) if !message.trim().is_empty() => Some(message.clone()),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    }
}

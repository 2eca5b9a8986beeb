//! HTTP plumbing shared by the moderation and directory clients.
//!
//! Every request reads the session token at send time, carries the
//! configured timeout, and maps failures into [`ClientError`]. A 401 clears
//! the session (once per credential) and is never retried.

use std::time::Instant;

use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::session::Session;

#[derive(Clone)]
pub struct Transport {
    http_client: Client,
    config: ClientConfig,
    session: Session,
}

impl Transport {
    pub fn new(config: ClientConfig, session: Session) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            config,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let token = self.session.token().await;
        self.send::<()>(Method::GET, path, query, None, token).await
    }

    /// `GET` with a token that is not (yet) the session's. A 401 here leaves
    /// the session alone.
    pub async fn get_as(&self, path: &str, token: &str) -> Result<Value> {
        self.send::<()>(Method::GET, path, &[], None, Some(token.to_string()))
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        let token = self.session.token().await;
        self.send(Method::POST, path, &[], Some(body), token).await
    }

    /// `POST` without a body (approve, reject, confirm).
    pub async fn post_empty(&self, path: &str) -> Result<Value> {
        let token = self.session.token().await;
        self.send::<()>(Method::POST, path, &[], None, token).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        let token = self.session.token().await;
        self.send::<()>(Method::DELETE, path, &[], None, token).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
        token: Option<String>,
    ) -> Result<Value> {
        let start = Instant::now();

        let mut request = self.http_client.request(method.clone(), self.config.url(path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(method = %method, path, error = %e, "Mosques API request failed");
            ClientError::from(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(ClientError::from)?;

        debug!(
            method = %method,
            path,
            status = status.as_u16(),
            duration_ms = start.elapsed().as_millis(),
            "Mosques API request"
        );

        if status == StatusCode::UNAUTHORIZED {
            if let Some(token) = &token {
                self.session.invalidate(token).await;
            }
            return Err(ClientError::Auth(
                error_message(&text).unwrap_or_else(|| "Session expired".to_string()),
            ));
        }

        if status == StatusCode::FORBIDDEN {
            return Err(ClientError::Forbidden(
                error_message(&text).unwrap_or_else(|| "Forbidden".to_string()),
            ));
        }

        if !status.is_success() {
            let message = error_message(&text).unwrap_or_else(|| status.to_string());
            warn!(status = %status, error = %message, path, "Mosques API error");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Api {
            status: status.as_u16(),
            message: format!("Invalid JSON in response: {}", e),
        })
    }
}

/// Best human-readable message in an error body: `message`, then `error`,
/// then the raw text.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["message", "error"] {
            if let Some(Value::String(message)) = map.get(key) {
                return Some(message.clone());
            }
        }
    }
    Some(trimmed.to_string())
}

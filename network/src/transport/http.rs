// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON long-poll transport over HTTP

use super::Transport;
use crate::config::ClientConfig;
use crate::error::TransportError;
use crate::messages::{ClientMessage, ServerMessage};
use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::Deserialize;

/// Transport that POSTs requests and GETs message batches from one URL.
///
/// The session cookie set by the server is kept in the client's cookie
/// store, so a single instance must be used for the whole session.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// Build a transport for the configured server
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.request_timeout)
            .user_agent(concat!("kgsgo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            url: config.server_url.clone(),
        })
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, message: &ClientMessage) -> Result<(), TransportError> {
        let body =
            serde_json::to_vec(message).map_err(|e| TransportError::Encode(e.to_string()))?;
        tracing::debug!(kind = message.kind(), "sending request");

        let response = self
            .client
            .post(&self.url)
            .header(header::CONTENT_TYPE, "application/json;charset=UTF-8")
            .body(body)
            .send()
            .await
            .map_err(request_error)?;
        check_status(response.status())
    }

    async fn receive(&self) -> Result<Vec<ServerMessage>, TransportError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(request_error)?;
        check_status(response.status())?;

        let body = response.text().await.map_err(request_error)?;
        let batch = decode_batch(&body)?;
        tracing::trace!(count = batch.len(), "received batch");
        Ok(batch)
    }
}

fn check_status(status: StatusCode) -> Result<(), TransportError> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            Err(TransportError::NoSession)
        }
        s => Err(TransportError::Http(s.as_u16())),
    }
}

fn request_error(err: reqwest::Error) -> TransportError {
    if err.is_decode() {
        TransportError::Decode(err.to_string())
    } else {
        TransportError::Network(err.to_string())
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    messages: Vec<serde_json::Value>,
}

/// Decode a receive response body.
///
/// An empty body is an empty batch. Messages that fail to decode are
/// logged and skipped so one bad record does not drop the whole batch.
pub fn decode_batch(body: &str) -> Result<Vec<ServerMessage>, TransportError> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| TransportError::Decode(e.to_string()))?;

    let mut batch = Vec::with_capacity(envelope.messages.len());
    for raw in envelope.messages {
        match serde_json::from_value::<ServerMessage>(raw) {
            Ok(message) => batch.push(message),
            Err(e) => tracing::warn!(error = %e, "skipping undecodable message"),
        }
    }
    Ok(batch)
}

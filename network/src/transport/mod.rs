// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message transport seam
//!
//! The session only needs two calls: push one request, and block until the
//! server flushes a batch. [`HttpTransport`] does this over the JSON
//! long-poll endpoint; tests plug in scripted transports.

use crate::error::TransportError;
use crate::messages::{ClientMessage, ServerMessage};
use async_trait::async_trait;

mod http;

pub use http::{decode_batch, HttpTransport};

/// A bidirectional message channel to the server
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Deliver one request
    async fn send(&self, message: &ClientMessage) -> Result<(), TransportError>;

    /// Wait for the next batch of messages, in server order
    async fn receive(&self) -> Result<Vec<ServerMessage>, TransportError>;
}

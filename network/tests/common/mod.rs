// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for session integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use kgsgo_network::{ClientConfig, ClientMessage, ServerMessage, Transport, TransportError, User};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Transport that replays scripted outcomes and records what was sent.
///
/// Once the receive script runs out, `receive` never returns, like a long
/// poll with nothing to deliver.
#[derive(Default)]
pub struct ScriptedTransport {
    receives: Mutex<VecDeque<Result<Vec<ServerMessage>, TransportError>>>,
    sends: Mutex<VecDeque<Result<(), TransportError>>>,
    sent: Mutex<Vec<ClientMessage>>,
    receive_calls: AtomicUsize,
}

impl ScriptedTransport {
    /// Script receive outcomes in order
    pub fn with_receives(
        receives: impl IntoIterator<Item = Result<Vec<ServerMessage>, TransportError>>,
    ) -> Self {
        Self {
            receives: Mutex::new(receives.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Script send outcomes in order; unscripted sends succeed
    pub fn fail_sends(self, sends: impl IntoIterator<Item = Result<(), TransportError>>) -> Self {
        *self.sends.lock() = sends.into_iter().collect();
        self
    }

    /// Requests sent so far
    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().clone()
    }

    /// Number of receive calls made
    pub fn receive_calls(&self) -> usize {
        self.receive_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, message: &ClientMessage) -> Result<(), TransportError> {
        self.sent.lock().push(message.clone());
        let outcome = self.sends.lock().pop_front();
        outcome.unwrap_or(Ok(()))
    }

    async fn receive(&self) -> Result<Vec<ServerMessage>, TransportError> {
        self.receive_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.receives.lock().pop_front();
        match next {
            Some(outcome) => outcome,
            None => std::future::pending().await,
        }
    }
}

/// Config with the default retry policy and a 3s backoff
pub fn test_config() -> ClientConfig {
    ClientConfig {
        retry_delay: Duration::from_secs(3),
        ..ClientConfig::default()
    }
}

/// A `LOGIN_SUCCESS` for `name`
pub fn login_success(name: &str) -> ServerMessage {
    ServerMessage::LoginSuccess {
        you: User::named(name),
        rooms: vec![],
    }
}

/// A transient network failure
pub fn network_down() -> TransportError {
    TransportError::Network("connection reset".to_string())
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session protocol state machine
//!
//! A [`Session`] owns the transport and the [`SessionState`]. Sends are
//! awaited by the caller and fail fast. Receives run in a background loop
//! that forwards every batch, in transport order, to the channel returned by
//! [`Session::new`]; after a failed receive the loop ends and a fresh one is
//! scheduled once the fixed backoff has elapsed.

use crate::config::ClientConfig;
use crate::error::SessionError;
use crate::messages::{ClientMessage, Password, ServerMessage};
use crate::schedule::ScheduledTask;
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

mod poll;
mod state;

pub use state::{NetworkStatus, RetryDecision, SessionState, SessionStatus};

/// Messages from one receive call
#[derive(Debug, Clone, PartialEq)]
pub struct MessageBatch {
    /// Messages in server order
    pub messages: Vec<ServerMessage>,
    /// When the batch arrived
    pub received_at: DateTime<Utc>,
}

/// Retry and login settings taken from [`ClientConfig`]
#[derive(Debug, Clone)]
struct SessionSettings {
    retry_delay: Duration,
    max_retries: u32,
    locale: String,
}

/// A login session against one server
pub struct Session<T: Transport> {
    transport: Arc<T>,
    settings: SessionSettings,
    state: Mutex<SessionState>,
    state_tx: watch::Sender<SessionState>,
    batch_tx: mpsc::UnboundedSender<MessageBatch>,
    poller: Mutex<Option<ScheduledTask>>,
}

impl<T: Transport> Session<T> {
    /// Create a logged out session and the receiver its batches go to
    pub fn new(
        transport: T,
        config: &ClientConfig,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<MessageBatch>) {
        let (state_tx, _) = watch::channel(SessionState::default());
        let (batch_tx, batch_rx) = mpsc::unbounded_channel();
        let session = Arc::new(Self {
            transport: Arc::new(transport),
            settings: SessionSettings {
                retry_delay: config.retry_delay,
                max_retries: config.max_retries.max(1),
                locale: config.locale.clone(),
            },
            state: Mutex::new(SessionState::default()),
            state_tx,
            batch_tx,
            poller: Mutex::new(None),
        });
        (session, batch_rx)
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        *self.state.lock()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// The transport in use
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Whether the receive loop is running
    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .as_ref()
            .map_or(false, ScheduledTask::is_running)
    }

    /// Apply `f` to the state and publish the result if it changed
    fn transition<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.lock();
        let before = *state;
        let out = f(&mut state);
        if *state != before {
            tracing::debug!(
                status = ?state.status,
                network = ?state.network,
                retry_times = state.retry_times,
                "session state changed"
            );
            self.state_tx.send_replace(*state);
        }
        out
    }

    /// Log in and start receiving.
    ///
    /// Connectivity failures are folded into the state (status falls back to
    /// logged out) and not returned; only structural errors are.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(self: &Arc<Self>, name: &str, password: &str) -> Result<(), SessionError> {
        let status = self.state().status;
        if status != SessionStatus::LoggedOut {
            return Err(SessionError::InvalidStatus {
                action: "log in",
                status,
            });
        }

        self.transition(SessionState::begin_login);
        let request = ClientMessage::Login {
            name: name.to_string(),
            password: Password::new(password),
            locale: self.settings.locale.clone(),
        };
        match self.send(&request).await {
            Ok(()) => {
                self.start_polling();
                Ok(())
            }
            Err(SessionError::Transport(err)) if err.is_structural() => Err(err.into()),
            Err(err) => {
                tracing::warn!(error = %err, "login request failed");
                Ok(())
            }
        }
    }

    /// Send a logout request. The session ends client-side even if it fails.
    #[tracing::instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.transition(SessionState::begin_logout);
        self.send(&ClientMessage::Logout).await
    }

    /// Send one request, updating connectivity from the outcome
    pub async fn send(&self, message: &ClientMessage) -> Result<(), SessionError> {
        match self.transport.send(message).await {
            Ok(()) => {
                self.transition(SessionState::send_succeeded);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(kind = message.kind(), error = %err, "send failed");
                self.transition(|state| state.send_failed(&err));
                Err(err.into())
            }
        }
    }

    /// Start the receive loop, replacing any previous one
    pub fn start_polling(self: &Arc<Self>) {
        let session = Arc::clone(self);
        let task = ScheduledTask::spawn("session.poll", poll::run(session));
        *self.poller.lock() = Some(task);
    }

    /// Restart the receive loop once `delay` has elapsed. Does nothing after
    /// [`Session::shutdown`].
    fn schedule_retry(self: &Arc<Self>, delay: Duration) {
        let session = Arc::clone(self);
        let mut poller = self.poller.lock();
        if poller.is_none() {
            return;
        }
        let retry = ScheduledTask::after("session.retry", delay, poll::run(session));
        // the replaced task is the caller, which returns right after
        let finished = poller.replace(retry);
        drop(poller);
        drop(finished);
    }

    /// Stop the receive loop without touching the session state
    pub fn shutdown(&self) {
        if let Some(task) = self.poller.lock().take() {
            task.cancel();
        }
    }
}

impl<T: Transport> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("polling", &self.is_polling())
            .finish()
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session status transitions, kept free of I/O so they can be tested directly

use crate::error::TransportError;
use crate::messages::ServerMessage;
use serde::{Deserialize, Serialize};

/// Authentication status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionStatus {
    /// No session
    #[default]
    LoggedOut,
    /// Login sent, waiting for the server's answer
    LoggingIn,
    /// Session established
    LoggedIn,
    /// Logout sent
    LoggingOut,
}

/// Connectivity as last observed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NetworkStatus {
    /// Last call succeeded
    #[default]
    Online,
    /// Last call failed
    Error,
}

/// What the receive loop should do after a failed receive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait the backoff delay, then receive again
    Retry,
    /// Stop the loop
    Stop,
}

/// Client-visible session state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Authentication status
    pub status: SessionStatus,
    /// Connectivity
    pub network: NetworkStatus,
    /// Consecutive failed receives
    pub retry_times: u32,
}

impl SessionState {
    /// A login request is about to be sent
    pub fn begin_login(&mut self) {
        self.status = SessionStatus::LoggingIn;
    }

    /// A logout request is about to be sent; any stale error is cleared
    pub fn begin_logout(&mut self) {
        self.network = NetworkStatus::Online;
        self.status = SessionStatus::LoggingOut;
    }

    /// Any send succeeded
    pub fn send_succeeded(&mut self) {
        self.network = NetworkStatus::Online;
        self.retry_times = 0;
    }

    /// A send failed. A failed login or logout ends the session client-side;
    /// any other failure only marks the network as broken.
    pub fn send_failed(&mut self, err: &TransportError) {
        match self.status {
            SessionStatus::LoggingIn | SessionStatus::LoggingOut => {
                self.status = SessionStatus::LoggedOut;
            }
            SessionStatus::LoggedIn | SessionStatus::LoggedOut => {
                self.network = NetworkStatus::Error;
            }
        }
        tracing::debug!(error = %err, status = ?self.status, "send failed");
    }

    /// A receive returned `batch`. Updates the status from login and logout
    /// messages, and appends [`ServerMessage::SessionExpired`] when a session
    /// that was retrying comes back only to be logged out.
    pub fn receive_succeeded(&mut self, batch: &mut Vec<ServerMessage>) {
        let reconnecting = self.retry_times > 0;
        self.retry_times = 0;
        self.network = NetworkStatus::Online;

        for message in batch.iter() {
            match message {
                ServerMessage::Logout { .. } => self.status = SessionStatus::LoggedOut,
                ServerMessage::LoginSuccess { .. } => self.status = SessionStatus::LoggedIn,
                _ => {}
            }
        }

        if reconnecting && matches!(batch.last(), Some(ServerMessage::Logout { .. })) {
            batch.push(ServerMessage::SessionExpired);
        }
    }

    /// A receive failed. `max_retries` consecutive failures give the session up.
    pub fn receive_failed(&mut self, err: &TransportError, max_retries: u32) -> RetryDecision {
        if err.is_no_session() {
            self.status = SessionStatus::LoggedOut;
            self.network = NetworkStatus::Online;
            self.retry_times = 0;
            return RetryDecision::Stop;
        }

        self.network = NetworkStatus::Error;
        if self.status == SessionStatus::LoggedOut {
            self.retry_times = 0;
            return RetryDecision::Stop;
        }

        self.retry_times += 1;
        if self.retry_times >= max_retries {
            self.retry_times = 0;
            self.status = SessionStatus::LoggedOut;
            return RetryDecision::Stop;
        }
        RetryDecision::Retry
    }

    /// Whether the receive loop should keep going
    pub fn is_active(&self) -> bool {
        self.status != SessionStatus::LoggedOut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logged_in() -> SessionState {
        SessionState {
            status: SessionStatus::LoggedIn,
            ..SessionState::default()
        }
    }

    #[test]
    fn login_success_in_batch_logs_in() {
        let mut state = SessionState::default();
        state.begin_login();
        let mut batch = vec![
            ServerMessage::Hello,
            ServerMessage::LoginSuccess {
                you: crate::messages::User::named("alice"),
                rooms: vec![],
            },
        ];
        state.receive_succeeded(&mut batch);
        assert_eq!(state.status, SessionStatus::LoggedIn);
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn logout_after_retries_synthesizes_expiry() {
        let mut state = logged_in();
        assert_eq!(
            state.receive_failed(&TransportError::Network("reset".into()), 10),
            RetryDecision::Retry
        );
        assert_eq!(state.network, NetworkStatus::Error);
        assert_eq!(state.retry_times, 1);

        let mut batch = vec![ServerMessage::Logout { text: None }];
        state.receive_succeeded(&mut batch);
        assert_eq!(state.status, SessionStatus::LoggedOut);
        assert_eq!(state.network, NetworkStatus::Online);
        assert_eq!(state.retry_times, 0);
        assert_eq!(batch.last(), Some(&ServerMessage::SessionExpired));
    }

    #[test]
    fn plain_logout_is_not_expiry() {
        let mut state = logged_in();
        let mut batch = vec![ServerMessage::Logout { text: None }];
        state.receive_succeeded(&mut batch);
        assert_eq!(batch.len(), 1);
    }

    #[test]
    fn no_session_stops_immediately() {
        let mut state = logged_in();
        state.retry_times = 4;
        state.network = NetworkStatus::Error;
        assert_eq!(
            state.receive_failed(&TransportError::NoSession, 10),
            RetryDecision::Stop
        );
        assert_eq!(
            state,
            SessionState {
                status: SessionStatus::LoggedOut,
                network: NetworkStatus::Online,
                retry_times: 0,
            }
        );
    }

    #[test]
    fn retries_are_bounded() {
        let mut state = logged_in();
        let err = TransportError::Http(502);
        for attempt in 1..10 {
            assert_eq!(state.receive_failed(&err, 10), RetryDecision::Retry);
            assert_eq!(state.retry_times, attempt);
        }
        assert_eq!(state.receive_failed(&err, 10), RetryDecision::Stop);
        assert_eq!(state.status, SessionStatus::LoggedOut);
        assert_eq!(state.network, NetworkStatus::Error);
        assert_eq!(state.retry_times, 0);
    }

    #[test]
    fn send_failure_depends_on_status() {
        let err = TransportError::Network("down".into());

        let mut state = logged_in();
        state.send_failed(&err);
        assert_eq!(state.status, SessionStatus::LoggedIn);
        assert_eq!(state.network, NetworkStatus::Error);
        state.send_succeeded();
        assert_eq!(state.network, NetworkStatus::Online);

        let mut state = SessionState::default();
        state.begin_login();
        state.send_failed(&err);
        assert_eq!(state.status, SessionStatus::LoggedOut);

        let mut state = logged_in();
        state.network = NetworkStatus::Error;
        state.begin_logout();
        assert_eq!(state.network, NetworkStatus::Online);
        state.send_failed(&err);
        assert_eq!(state.status, SessionStatus::LoggedOut);
    }
}

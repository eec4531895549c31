// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the transport and session layers

use crate::session::SessionStatus;
use thiserror::Error;

/// Failure of a single send or receive call
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server no longer knows this client's session
    #[error("no active session")]
    NoSession,

    /// Non-success HTTP status other than the session rejections
    #[error("server answered with HTTP status {0}")]
    Http(u16),

    /// Connection, timeout or body read failure
    #[error("network failure: {0}")]
    Network(String),

    /// Response body was not a message envelope
    #[error("malformed server response: {0}")]
    Decode(String),

    /// Request could not be serialized
    #[error("could not encode request: {0}")]
    Encode(String),
}

impl TransportError {
    /// Whether the server rejected the session outright
    pub fn is_no_session(&self) -> bool {
        matches!(self, TransportError::NoSession)
    }

    /// Whether this is a programming error rather than a connectivity one
    pub fn is_structural(&self) -> bool {
        matches!(self, TransportError::Encode(_))
    }
}

/// Errors surfaced by [`crate::Session`] operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The underlying call failed; session state was updated first
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The operation is not valid in the current session status
    #[error("cannot {action} while {status:?}")]
    InvalidStatus {
        /// What was attempted
        action: &'static str,
        /// Status at the time
        status: SessionStatus,
    },
}

impl SessionError {
    /// The transport failure behind this error, if any
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            SessionError::Transport(err) => Some(err),
            SessionError::InvalidStatus { .. } => None,
        }
    }
}

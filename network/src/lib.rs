// SPDX-License-Identifier: MIT OR Apache-2.0

//! KGS Go Network - session protocol over the JSON long-poll API
//!
//! This crate provides the client's connection to the server including:
//! - Typed inbound and outbound wire messages
//! - A transport trait with an HTTP long-poll implementation
//! - The session state machine: login, logout, sends and the retrying
//!   receive loop
//! - Client configuration stored as TOML

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod messages;
pub mod schedule;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use error::{SessionError, TransportError};
pub use messages::{ChannelId, ClientMessage, GameSummary, ServerMessage, User};
pub use schedule::ScheduledTask;
pub use session::{MessageBatch, NetworkStatus, Session, SessionState, SessionStatus};
pub use transport::{HttpTransport, Transport};

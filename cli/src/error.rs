// SPDX-License-Identifier: MIT OR Apache-2.0

use kgsgo_core::CoreError;
use kgsgo_network::{ChannelId, SessionError};
use thiserror::Error;

/// Errors raised by the client store and its intents
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClientError {
    /// A game record broke a tree invariant; never retried
    #[error("game record invariant violated: {0}")]
    Invariant(#[from] CoreError),

    /// A request to the server failed
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The channel is not a game this client has joined
    #[error("channel {0} is not a joined game")]
    UnknownGame(ChannelId),

    /// The logged in user has no seat in the game
    #[error("not playing in game {0}")]
    NotPlaying(ChannelId),

    /// The store loop has exited
    #[error("client store stopped")]
    Stopped,
}

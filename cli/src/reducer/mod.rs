// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message-driven state reducer
//!
//! [`reduce`] applies one server message to an owned [`AppState`] and hands
//! it back. Every handler is idempotent: list-like state is keyed by channel
//! id, user name or the message's place in its batch (receive time and
//! index), so a re-delivered message leaves the state as it was. Messages the client does not act on leave the
//! state unchanged.
//!
//! [`reduce_local`] applies actions that originate in this client, such as
//! an optimistic move or viewer navigation.

use crate::error::ClientError;
use crate::state::{AppState, ChatKind};
use chrono::{DateTime, Utc};
use kgsgo_core::{Color, Location, NodeId};
use kgsgo_network::{ChannelId, MessageBatch, ServerMessage, SessionState};

mod chat;
mod games;
mod rooms;
mod session;

/// Where to move the viewer in a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Jump to a node
    Jump(NodeId),
    /// One node forward along the current line
    Next,
    /// One node back along the current line
    Prev,
    /// Back to the live position
    Live,
}

/// State changes that do not come from the server
#[derive(Debug, Clone, PartialEq)]
pub enum LocalAction {
    /// The session state machine moved
    SessionChanged(SessionState),
    /// A move was sent and awaits confirmation
    PendingMove {
        /// Game channel
        channel_id: ChannelId,
        /// Stone color
        color: Color,
        /// Target point
        loc: Location,
    },
    /// The move could not be sent
    ClearPending {
        /// Game channel
        channel_id: ChannelId,
    },
    /// Move the viewer
    Navigate {
        /// Game channel
        channel_id: ChannelId,
        /// Where to
        to: Navigation,
    },
    /// The undo request was answered
    UndoAnswered {
        /// Game channel
        channel_id: ChannelId,
    },
}

/// Apply one server message received at `at`, as the only message of its
/// batch
pub fn reduce(
    state: AppState,
    message: &ServerMessage,
    at: DateTime<Utc>,
) -> Result<AppState, ClientError> {
    reduce_at(state, message, at, 0)
}

fn reduce_at(
    state: AppState,
    message: &ServerMessage,
    at: DateTime<Utc>,
    position: usize,
) -> Result<AppState, ClientError> {
    let state = match message {
        ServerMessage::Hello => {
            tracing::debug!("server hello");
            state
        }
        ServerMessage::LoginSuccess { you, rooms } => session::login_success(state, you, rooms),
        ServerMessage::LoginFailedNoSuchUser
        | ServerMessage::LoginFailedBadPassword
        | ServerMessage::LoginFailedUserAlreadyExists => session::login_failed(state, message),
        ServerMessage::Logout { text } => session::logout(state, text.as_deref()),
        ServerMessage::Reconnect | ServerMessage::SessionExpired => {
            session::notice(state, message)
        }

        ServerMessage::RoomNames { rooms } => rooms::room_names(state, rooms),
        ServerMessage::RoomJoin {
            channel_id,
            users,
            games,
        } => rooms::room_join(state, *channel_id, users, games),
        ServerMessage::RoomDesc {
            channel_id,
            description,
            owners,
        } => rooms::room_desc(state, *channel_id, description, owners),
        ServerMessage::UserAdded { channel_id, user } => {
            rooms::user_added(state, *channel_id, user)
        }
        ServerMessage::UserRemoved { channel_id, user } => {
            rooms::user_removed(state, *channel_id, user)
        }
        ServerMessage::UserUpdate { user } => rooms::user_update(state, user),
        ServerMessage::GameList { channel_id, games } => {
            rooms::game_list(state, *channel_id, games)
        }
        ServerMessage::GameContainerRemoveGame {
            channel_id,
            game_id,
        } => rooms::remove_game(state, *channel_id, *game_id),
        ServerMessage::Unjoin { channel_id } | ServerMessage::Close { channel_id } => {
            rooms::leave_channel(state, *channel_id)
        }

        ServerMessage::GameJoin {
            channel_id,
            game_summary,
            users,
            sgf_events,
        } => games::game_join(state, *channel_id, game_summary, users, sgf_events, at)?,
        ServerMessage::GameUpdate {
            channel_id,
            sgf_events,
        } => games::game_update(state, *channel_id, sgf_events, at)?,
        ServerMessage::GameState {
            channel_id,
            actions,
            clocks,
            over,
        } => games::game_state(state, *channel_id, actions, clocks, *over),
        ServerMessage::GameReview { channel_id, review } => {
            games::game_review(state, *channel_id, review)
        }
        ServerMessage::GameUndoRequest { channel_id } => games::undo_request(state, *channel_id),
        ServerMessage::ChallengeJoin {
            channel_id,
            game_summary,
            users,
        } => games::challenge_join(state, *channel_id, game_summary.as_ref(), users),
        ServerMessage::ChallengeProposal {
            channel_id,
            proposal,
        } => games::challenge_proposal(state, *channel_id, proposal),
        ServerMessage::ChallengeSubmit {
            channel_id,
            proposal,
        } => games::challenge_submit(state, *channel_id, proposal),
        ServerMessage::ChallengeDecline { channel_id } => {
            games::challenge_decline(state, *channel_id)
        }
        ServerMessage::ChallengeFinal {
            channel_id,
            game_channel_id,
        } => games::challenge_final(state, *channel_id, *game_channel_id),

        ServerMessage::Chat {
            channel_id,
            user,
            text,
        } => chat::chat(state, *channel_id, ChatKind::Chat, user, text, at, position),
        ServerMessage::Announce {
            channel_id,
            user,
            text,
        } => chat::chat(state, *channel_id, ChatKind::Announce, user, text, at, position),
        ServerMessage::ModeratedChat {
            channel_id,
            user,
            text,
        } => chat::chat(state, *channel_id, ChatKind::Moderated, user, text, at, position),
        ServerMessage::Announcement { text } => chat::announcement(state, text, at, position),

        ServerMessage::Unknown => {
            tracing::debug!("ignoring unmodelled server message");
            state
        }
    };
    Ok(state)
}

/// Fold a batch, in order, into a new state. `state` itself is left alone.
pub fn reduce_batch(state: &AppState, batch: &MessageBatch) -> Result<AppState, ClientError> {
    batch
        .messages
        .iter()
        .enumerate()
        .try_fold(state.clone(), |state, (position, message)| {
            reduce_at(state, message, batch.received_at, position)
        })
}

/// Apply an action that originated in this client
pub fn reduce_local(state: AppState, action: &LocalAction) -> Result<AppState, ClientError> {
    match action {
        LocalAction::SessionChanged(session) => Ok(AppState {
            session: *session,
            ..state
        }),
        LocalAction::PendingMove {
            channel_id,
            color,
            loc,
        } => games::set_pending(state, *channel_id, *color, *loc),
        LocalAction::ClearPending { channel_id } => games::clear_pending(state, *channel_id),
        LocalAction::Navigate { channel_id, to } => games::navigate(state, *channel_id, *to),
        LocalAction::UndoAnswered { channel_id } => Ok(games::undo_answered(state, *channel_id)),
    }
}

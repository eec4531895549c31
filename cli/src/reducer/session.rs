// SPDX-License-Identifier: MIT OR Apache-2.0

use super::rooms;
use crate::state::{AppState, LoginError, SessionNotice};
use kgsgo_network::messages::RoomInfo;
use kgsgo_network::{ServerMessage, User};

pub(super) fn login_success(state: AppState, you: &User, rooms: &[RoomInfo]) -> AppState {
    tracing::info!(user = %you.name, rooms = rooms.len(), "logged in");
    let state = AppState {
        user: Some(you.clone()),
        login_error: None,
        notice: None,
        ..state
    };
    rooms::room_names(state, rooms)
}

pub(super) fn login_failed(state: AppState, message: &ServerMessage) -> AppState {
    let reason = match message {
        ServerMessage::LoginFailedNoSuchUser => LoginError::NoSuchUser,
        ServerMessage::LoginFailedBadPassword => LoginError::BadPassword,
        _ => LoginError::UserAlreadyExists,
    };
    tracing::info!(?reason, "login refused");
    AppState {
        login_error: Some(reason),
        ..state
    }
}

/// Channel data goes with the session. The user stays so the client can
/// tell a dropped session from one that never started.
pub(super) fn logout(state: AppState, reason: Option<&str>) -> AppState {
    tracing::info!(reason, "logged out by server");
    AppState {
        notice: Some(SessionNotice::LoggedOut {
            reason: reason.map(str::to_string),
        }),
        rooms: Default::default(),
        games: Default::default(),
        challenges: Default::default(),
        chats: Default::default(),
        ..state
    }
}

pub(super) fn notice(state: AppState, message: &ServerMessage) -> AppState {
    let notice = match message {
        ServerMessage::Reconnect => SessionNotice::LoggedInElsewhere,
        _ => SessionNotice::SessionExpired,
    };
    AppState {
        notice: Some(notice),
        ..state
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Room directory, memberships and game listings

use crate::state::{AppState, Room};
use kgsgo_network::messages::RoomInfo;
use kgsgo_network::{ChannelId, GameSummary, User};
use std::collections::BTreeMap;
use std::sync::Arc;

fn room_mut(state: &mut AppState, channel_id: ChannelId) -> &mut Room {
    let room = state
        .rooms
        .entry(channel_id)
        .or_insert_with(|| Arc::new(Room::new(channel_id)));
    Arc::make_mut(room)
}

fn by_name(users: &[User]) -> BTreeMap<String, User> {
    users.iter().map(|u| (u.name.clone(), u.clone())).collect()
}

pub(super) fn room_names(mut state: AppState, rooms: &[RoomInfo]) -> AppState {
    for info in rooms {
        room_mut(&mut state, info.channel_id).merge_info(info);
    }
    state
}

/// The join message carries the full member and game lists, so they replace
/// whatever was there.
pub(super) fn room_join(
    mut state: AppState,
    channel_id: ChannelId,
    users: &[User],
    games: &[GameSummary],
) -> AppState {
    tracing::debug!(channel_id, users = users.len(), games = games.len(), "joined room");
    let room = room_mut(&mut state, channel_id);
    room.joined = true;
    room.users = by_name(users);
    room.games = games.iter().map(|g| (g.channel_id, g.clone())).collect();
    state
}

pub(super) fn room_desc(
    mut state: AppState,
    channel_id: ChannelId,
    description: &str,
    owners: &[User],
) -> AppState {
    let room = room_mut(&mut state, channel_id);
    room.description = description.to_string();
    room.owners = owners.iter().map(|u| u.name.clone()).collect();
    state
}

pub(super) fn user_added(mut state: AppState, channel_id: ChannelId, user: &User) -> AppState {
    if let Some(room) = state.rooms.get_mut(&channel_id) {
        Arc::make_mut(room)
            .users
            .insert(user.name.clone(), user.clone());
    } else if let Some(game) = state.games.get_mut(&channel_id) {
        Arc::make_mut(game)
            .users
            .insert(user.name.clone(), user.clone());
    } else if let Some(challenge) = state.challenges.get_mut(&channel_id) {
        Arc::make_mut(challenge)
            .users
            .insert(user.name.clone(), user.clone());
    } else {
        tracing::debug!(channel_id, user = %user.name, "user added to unknown channel");
    }
    state
}

pub(super) fn user_removed(mut state: AppState, channel_id: ChannelId, user: &User) -> AppState {
    if let Some(room) = state.rooms.get_mut(&channel_id) {
        if room.users.contains_key(&user.name) {
            Arc::make_mut(room).users.remove(&user.name);
        }
    } else if let Some(game) = state.games.get_mut(&channel_id) {
        if game.users.contains_key(&user.name) {
            Arc::make_mut(game).users.remove(&user.name);
        }
    } else if let Some(challenge) = state.challenges.get_mut(&channel_id) {
        if challenge.users.contains_key(&user.name) {
            Arc::make_mut(challenge).users.remove(&user.name);
        }
    }
    state
}

/// Refresh a user's rank and flags wherever they appear
pub(super) fn user_update(mut state: AppState, user: &User) -> AppState {
    for room in state.rooms.values_mut() {
        if room.users.contains_key(&user.name) {
            Arc::make_mut(room)
                .users
                .insert(user.name.clone(), user.clone());
        }
    }
    for game in state.games.values_mut() {
        if game.users.contains_key(&user.name) {
            Arc::make_mut(game)
                .users
                .insert(user.name.clone(), user.clone());
        }
    }
    for challenge in state.challenges.values_mut() {
        if challenge.users.contains_key(&user.name) {
            Arc::make_mut(challenge)
                .users
                .insert(user.name.clone(), user.clone());
        }
    }
    if state.user.as_ref().map(|u| u.name == user.name).unwrap_or(false) {
        state.user = Some(user.clone());
    }
    state
}

pub(super) fn game_list(mut state: AppState, channel_id: ChannelId, games: &[GameSummary]) -> AppState {
    let room = room_mut(&mut state, channel_id);
    for game in games {
        room.games.insert(game.channel_id, game.clone());
    }
    state
}

pub(super) fn remove_game(mut state: AppState, channel_id: ChannelId, game_id: ChannelId) -> AppState {
    if let Some(room) = state.rooms.get_mut(&channel_id) {
        if room.games.contains_key(&game_id) {
            Arc::make_mut(room).games.remove(&game_id);
        }
    }
    state
}

/// Forget everything joined under `channel_id`. Rooms stay in the directory.
pub(super) fn leave_channel(mut state: AppState, channel_id: ChannelId) -> AppState {
    tracing::debug!(channel_id, "left channel");
    if let Some(room) = state.rooms.get_mut(&channel_id) {
        let room = Arc::make_mut(room);
        room.joined = false;
        room.users.clear();
        room.games.clear();
    }
    state.games.remove(&channel_id);
    state.challenges.remove(&channel_id);
    state.chats.remove(&channel_id);
    state
}

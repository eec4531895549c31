// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::state::{Announcement, AppState, ChatEntry, ChatKind};
use chrono::{DateTime, Utc};
use kgsgo_network::{ChannelId, User};
use std::sync::Arc;

/// Append a chat line unless the message at this place of this batch is
/// already recorded. Identical lines within one batch are distinct.
pub(super) fn chat(
    mut state: AppState,
    channel_id: ChannelId,
    kind: ChatKind,
    user: &User,
    text: &str,
    at: DateTime<Utc>,
    position: usize,
) -> AppState {
    let log = state.chats.entry(channel_id).or_default();
    if log.contains(at, position) {
        return state;
    }
    let entry = ChatEntry {
        id: state.ids.next_id(),
        kind,
        sender: user.name.clone(),
        text: text.to_string(),
        timestamp: at,
        position,
    };
    Arc::make_mut(log).push(entry);
    state
}

pub(super) fn announcement(
    mut state: AppState,
    text: &str,
    at: DateTime<Utc>,
    position: usize,
) -> AppState {
    let seen = state
        .announcements
        .iter()
        .any(|a| a.received_at == at && a.position == position);
    if !seen {
        state.announcements.push(Announcement {
            text: text.to_string(),
            received_at: at,
            position,
        });
    }
    state
}

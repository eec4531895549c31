// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turning snapshot differences into terminal output

use crate::state::{AppState, LoginError, SessionNotice};
use kgsgo_network::{ChannelId, NetworkStatus, SessionStatus};
use std::sync::Arc;

/// One line per user-visible change between two snapshots
pub fn describe_changes(prev: &AppState, next: &AppState) -> Vec<String> {
    let mut lines = Vec::new();

    if prev.session.status != next.session.status {
        lines.push(match next.session.status {
            SessionStatus::LoggingIn => "Logging in...".to_string(),
            SessionStatus::LoggedIn => match &next.user {
                Some(user) => format!("Logged in as {}", user.name),
                None => "Logged in".to_string(),
            },
            SessionStatus::LoggingOut => "Logging out...".to_string(),
            SessionStatus::LoggedOut => "Logged out".to_string(),
        });
    }
    let problem = next.connection_problem();
    if problem != prev.connection_problem() {
        lines.push(if !problem {
            "Connection restored".to_string()
        } else if next.session.network == NetworkStatus::Error {
            format!(
                "[!] Network problem, retrying ({} so far)",
                next.session.retry_times.max(1)
            )
        } else {
            "[!] Disconnected from the server".to_string()
        });
    }
    if next.login_error.is_some() && prev.login_error != next.login_error {
        lines.push(
            match next.login_error {
                Some(LoginError::NoSuchUser) => "Login failed: no such user",
                Some(LoginError::BadPassword) => "Login failed: wrong password",
                _ => "Login failed: that name is already in use",
            }
            .to_string(),
        );
    }
    if prev.notice != next.notice {
        match &next.notice {
            Some(SessionNotice::LoggedOut { reason: Some(reason) }) => {
                lines.push(format!("[!] Server logged you out: {reason}"))
            }
            Some(SessionNotice::LoggedOut { reason: None }) => {
                lines.push("[!] Server logged you out".to_string())
            }
            Some(SessionNotice::SessionExpired) => {
                lines.push("[!] Your session expired while reconnecting".to_string())
            }
            Some(SessionNotice::LoggedInElsewhere) => {
                lines.push("[!] You logged in from somewhere else".to_string())
            }
            None => {}
        }
    }

    for (id, room) in &next.rooms {
        let was_joined = prev.rooms.get(id).map_or(false, |r| r.joined);
        let name = room.name.as_deref().unwrap_or("unnamed room");
        if room.joined && !was_joined {
            lines.push(format!(
                "Joined room {id} ({name}): {} users, {} games",
                room.users.len(),
                room.games.len()
            ));
        } else if !room.joined && was_joined {
            lines.push(format!("Left room {id} ({name})"));
        }
    }
    for id in next.games.keys().filter(|id| !prev.games.contains_key(*id)) {
        lines.push(format!("Joined game {id}"));
    }
    for id in prev.games.keys().filter(|id| !next.games.contains_key(*id)) {
        lines.push(format!("Left game {id}"));
    }
    for (id, game) in &next.games {
        let was = prev.games.get(id);
        if game.undo_requested && !was.map_or(false, |g| g.undo_requested) {
            lines.push(format!("Game {id}: opponent asks for an undo"));
        }
        if game.over && !was.map_or(false, |g| g.over) {
            lines.push(format!("Game {id} is over"));
        }
    }
    for (id, challenge) in &next.challenges {
        let was = prev.challenges.get(id);
        if was.is_none() {
            lines.push(format!("Joined challenge {id}"));
        }
        if challenge.declined && !was.map_or(false, |c| c.declined) {
            lines.push(format!("Challenge {id} was declined"));
        }
        if let Some(game_id) = challenge.game_channel_id {
            if was.and_then(|c| c.game_channel_id).is_none() {
                lines.push(format!("Challenge {id} became game {game_id}"));
            }
        }
    }

    for (id, log) in &next.chats {
        let seen = prev.chats.get(id).map_or(0, |l| l.entries().len());
        for entry in log.entries().iter().skip(seen) {
            lines.push(format!("[{id}] {}: {}", entry.sender, entry.text));
        }
    }
    for announcement in next.announcements.iter().skip(prev.announcements.len()) {
        lines.push(format!("*** {}", announcement.text));
    }
    lines
}

/// Games whose record or view changed and should be redrawn
pub fn changed_games(prev: &AppState, next: &AppState) -> Vec<ChannelId> {
    next.games
        .iter()
        .filter(|(id, game)| {
            prev.games
                .get(*id)
                .map_or(true, |old| !Arc::ptr_eq(&old.tree, &game.tree))
        })
        .map(|(id, _)| *id)
        .collect()
}

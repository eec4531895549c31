// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application state snapshots
//!
//! An [`AppState`] is published as `Arc<AppState>` and never mutated after
//! that. Per-channel records sit behind their own `Arc`s so the reducer can
//! copy only what a message touches (`Arc::make_mut`).

use chrono::{DateTime, Utc};
use kgsgo_core::{Color, GameTree};
use kgsgo_network::messages::{Clocks, GameAction, Proposal, RoomInfo};
use kgsgo_network::{ChannelId, GameSummary, SessionState, User};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Monotonic id generator owned by one store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdSequence {
    /// A sequence whose first id is `first`
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Take the next id
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Why the last login attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoginError {
    /// Unknown account
    NoSuchUser,
    /// Wrong password
    BadPassword,
    /// Guest name already in use
    UserAlreadyExists,
}

/// Session event worth a banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionNotice {
    /// The server ended the session
    LoggedOut {
        /// Reason text, if the server gave one
        reason: Option<String>,
    },
    /// The session ended while the client was reconnecting
    SessionExpired,
    /// The account logged in from somewhere else
    LoggedInElsewhere,
}

/// A room in the directory, joined or not
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Room {
    /// Room channel
    pub channel_id: ChannelId,
    /// Display name
    pub name: Option<String>,
    /// Directory category
    pub category: Option<String>,
    /// Hidden room
    pub private: bool,
    /// Description text
    pub description: String,
    /// Owner names
    pub owners: Vec<String>,
    /// Whether this client is in the room
    pub joined: bool,
    /// Users present, by name
    pub users: BTreeMap<String, User>,
    /// Listed games, by channel
    pub games: BTreeMap<ChannelId, GameSummary>,
}

impl Room {
    /// An empty room entry
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            ..Self::default()
        }
    }

    pub(crate) fn merge_info(&mut self, info: &RoomInfo) {
        if info.name.is_some() {
            self.name = info.name.clone();
        }
        if info.category.is_some() {
            self.category = info.category.clone();
        }
        self.private = info.private;
    }
}

/// A joined game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameRecord {
    /// Local record id
    pub id: u64,
    /// Game channel
    pub channel_id: ChannelId,
    /// Server summary
    pub summary: GameSummary,
    /// Users watching, by name
    pub users: BTreeMap<String, User>,
    /// The game record
    pub tree: Arc<GameTree>,
    /// What each user may do now
    pub actions: Vec<GameAction>,
    /// Latest clock readings
    pub clocks: Clocks,
    /// Game has ended
    pub over: bool,
    /// The opponent asked for an undo
    pub undo_requested: bool,
    /// Review game this turned into
    pub review: Option<GameSummary>,
}

impl GameRecord {
    /// Color `name` plays in this game, if seated
    pub fn color_of(&self, name: &str) -> Option<Color> {
        [Color::Black, Color::White]
            .into_iter()
            .find(|color| self.summary.player(*color).map(|u| u.name.as_str()) == Some(name))
    }
}

/// A challenge channel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Challenge {
    /// Challenge channel
    pub channel_id: ChannelId,
    /// Listing
    pub summary: Option<GameSummary>,
    /// Users present, by name
    pub users: BTreeMap<String, User>,
    /// Creator's terms
    pub proposal: Option<Proposal>,
    /// Terms submitted by challengers
    pub submissions: Vec<Proposal>,
    /// Declined by the other side
    pub declined: bool,
    /// Game the challenge turned into
    pub game_channel_id: Option<ChannelId>,
}

impl Challenge {
    /// An empty challenge entry
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            summary: None,
            users: BTreeMap::new(),
            proposal: None,
            submissions: Vec::new(),
            declined: false,
            game_channel_id: None,
        }
    }
}

/// How a chat line was posted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatKind {
    /// Ordinary chat
    Chat,
    /// Channel announcement
    Announce,
    /// Released by a moderator
    Moderated,
}

/// One chat line in a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    /// Local id from the store's sequence
    pub id: u64,
    /// How it was posted
    pub kind: ChatKind,
    /// Speaker name
    pub sender: String,
    /// Text
    pub text: String,
    /// When its batch arrived
    pub timestamp: DateTime<Utc>,
    /// Index of the message within its batch
    pub position: usize,
}

/// Chat lines of one channel, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatLog {
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    /// Lines in arrival order
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    /// Whether the message at `position` of the batch received at
    /// `timestamp` is already recorded
    pub fn contains(&self, timestamp: DateTime<Utc>, position: usize) -> bool {
        self.entries
            .iter()
            .any(|e| e.timestamp == timestamp && e.position == position)
    }

    pub(crate) fn push(&mut self, entry: ChatEntry) {
        self.entries.push(entry);
    }
}

/// A server-wide announcement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    /// Text
    pub text: String,
    /// When its batch arrived
    pub received_at: DateTime<Utc>,
    /// Index of the message within its batch
    pub position: usize,
}

/// Everything the client shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    /// Connection state, mirrored from the session
    pub session: SessionState,
    /// The logged in user
    pub user: Option<User>,
    /// Last login refusal
    pub login_error: Option<LoginError>,
    /// Last session banner
    pub notice: Option<SessionNotice>,
    /// Room directory
    pub rooms: BTreeMap<ChannelId, Arc<Room>>,
    /// Joined games
    pub games: BTreeMap<ChannelId, Arc<GameRecord>>,
    /// Joined challenges
    pub challenges: BTreeMap<ChannelId, Arc<Challenge>>,
    /// Chat per channel
    pub chats: BTreeMap<ChannelId, Arc<ChatLog>>,
    /// Server-wide announcements, oldest first
    pub announcements: Vec<Announcement>,
    /// Id source for new records and chat lines
    pub ids: IdSequence,
}

impl AppState {
    /// Empty state drawing ids from `ids`
    pub fn with_ids(ids: IdSequence) -> Self {
        Self {
            ids,
            ..Self::default()
        }
    }

    /// A joined game
    pub fn game(&self, channel_id: ChannelId) -> Option<&GameRecord> {
        self.games.get(&channel_id).map(Arc::as_ref)
    }

    /// A room entry
    pub fn room(&self, channel_id: ChannelId) -> Option<&Room> {
        self.rooms.get(&channel_id).map(Arc::as_ref)
    }

    /// Chat lines of a channel
    pub fn chat(&self, channel_id: ChannelId) -> &[ChatEntry] {
        self.chats
            .get(&channel_id)
            .map(|log| log.entries())
            .unwrap_or(&[])
    }

    /// Whether the UI should show a connectivity banner
    pub fn connection_problem(&self) -> bool {
        use kgsgo_network::{NetworkStatus, SessionStatus};
        self.session.network == NetworkStatus::Error
            || (self.session.status == SessionStatus::LoggedOut && self.user.is_some())
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire messages exchanged with the server
//!
//! Both directions are JSON records discriminated by a `type` field.
//! Inbound types this client does not model decode to
//! [`ServerMessage::Unknown`] and are ignored downstream.

use kgsgo_core::{Color, GameRules, Location, SgfEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server-assigned id of a room, game or challenge channel
pub type ChannelId = u64;

/// A user as described by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Account name, unique on the server
    pub name: String,
    /// Rank string such as `3k` or `2d`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<String>,
    /// Status flag letters
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub flags: String,
}

impl User {
    /// A user with no rank or flags
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rank: None,
            flags: String::new(),
        }
    }
}

/// Room entry from `LOGIN_SUCCESS` or `ROOM_NAMES`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomInfo {
    /// Room channel
    pub channel_id: ChannelId,
    /// Display name, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Directory category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Hidden from the public directory
    #[serde(default)]
    pub private: bool,
}

/// Summary of a game or challenge listed in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    /// Game channel
    pub channel_id: ChannelId,
    /// Game kind (`ranked`, `free`, `challenge`, `review`, ...)
    #[serde(default)]
    pub game_type: String,
    /// Participants by role (`white`, `black`, `owner`, `challengeCreator`, ...)
    #[serde(default)]
    pub players: BTreeMap<String, User>,
    /// Board size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u8>,
    /// Moves played so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_num: Option<u32>,
    /// Free-form game name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Final score text, once the game is over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<serde_json::Value>,
}

impl GameSummary {
    /// The player in a color role
    pub fn player(&self, color: Color) -> Option<&User> {
        self.players.get(&color.to_string())
    }
}

/// What a user may currently do in a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// Play a move
    Move,
    /// Edit the record
    Edit,
    /// Mark dead stones
    Score,
    /// Set up a challenge
    ChallengeCreate,
    /// Adjust a challenge
    ChallengeSetup,
    /// Wait on a challenge
    ChallengeWait,
    /// Accept a challenge proposal
    ChallengeAccept,
    /// Proposal already submitted
    ChallengeSubmitted,
    /// Editing paused
    EditDelay,
    /// Anything else
    #[serde(other)]
    Other,
}

/// One entry of `GAME_STATE.actions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAction {
    /// Allowed action
    pub action: ActionKind,
    /// Who may take it
    pub user: User,
}

/// A running clock as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameClock {
    /// Seconds left in the current period
    #[serde(default)]
    pub time: f64,
    /// Byo-yomi periods left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub periods_left: Option<u32>,
    /// Canadian stones left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stones_left: Option<u32>,
    /// Clock is ticking
    #[serde(default)]
    pub running: bool,
    /// Clock is paused
    #[serde(default)]
    pub paused: bool,
}

/// Both clocks of a game
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Clocks {
    /// Black's clock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black: Option<GameClock>,
    /// White's clock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white: Option<GameClock>,
}

/// A seat in a challenge proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalPlayer {
    /// Seat role (`white`, `black`, `challengeCreator`)
    pub role: String,
    /// Account filling the seat
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Terms of a challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    /// Game kind
    pub game_type: String,
    /// Board and clock settings
    pub rules: GameRules,
    /// Colors chosen at random
    #[serde(default)]
    pub nigiri: bool,
    /// Seats
    #[serde(default)]
    pub players: Vec<ProposalPlayer>,
}

/// Messages delivered by the server in a receive batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// First message of a fresh connection
    Hello,
    /// Login accepted
    LoginSuccess {
        /// The logged in account
        you: User,
        /// Rooms known at login time
        #[serde(default)]
        rooms: Vec<RoomInfo>,
    },
    /// Login rejected: unknown account
    LoginFailedNoSuchUser,
    /// Login rejected: wrong password
    LoginFailedBadPassword,
    /// Login rejected: guest name taken
    LoginFailedUserAlreadyExists,
    /// The session ended
    Logout {
        /// Reason given by the server
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
    },
    /// The same account logged in elsewhere
    Reconnect,
    /// Added by the client when a session ends while it was reconnecting
    SessionExpired,
    /// Names for room channels
    RoomNames {
        /// Room entries
        rooms: Vec<RoomInfo>,
    },
    /// This client joined a room
    #[serde(rename_all = "camelCase")]
    RoomJoin {
        /// Room channel
        channel_id: ChannelId,
        /// Users present
        #[serde(default)]
        users: Vec<User>,
        /// Games listed in the room
        #[serde(default)]
        games: Vec<GameSummary>,
    },
    /// Room description
    #[serde(rename_all = "camelCase")]
    RoomDesc {
        /// Room channel
        channel_id: ChannelId,
        /// Description text
        #[serde(default)]
        description: String,
        /// Room owners
        #[serde(default)]
        owners: Vec<User>,
    },
    /// A user entered a channel
    #[serde(rename_all = "camelCase")]
    UserAdded {
        /// Channel joined
        channel_id: ChannelId,
        /// The user
        user: User,
    },
    /// A user left a channel
    #[serde(rename_all = "camelCase")]
    UserRemoved {
        /// Channel left
        channel_id: ChannelId,
        /// The user
        user: User,
    },
    /// A user's rank or flags changed
    UserUpdate {
        /// Updated user
        user: User,
    },
    /// Games added to or changed in a room listing
    #[serde(rename_all = "camelCase")]
    GameList {
        /// Room channel
        channel_id: ChannelId,
        /// New or changed games
        #[serde(default)]
        games: Vec<GameSummary>,
    },
    /// A game left a room listing
    #[serde(rename_all = "camelCase")]
    GameContainerRemoveGame {
        /// Room channel
        channel_id: ChannelId,
        /// Game channel removed
        game_id: ChannelId,
    },
    /// This client left a channel
    #[serde(rename_all = "camelCase")]
    Unjoin {
        /// Channel left
        channel_id: ChannelId,
    },
    /// A channel was closed by the server
    #[serde(rename_all = "camelCase")]
    Close {
        /// Closed channel
        channel_id: ChannelId,
    },
    /// This client joined a game channel
    #[serde(rename_all = "camelCase")]
    GameJoin {
        /// Game channel
        channel_id: ChannelId,
        /// Game description
        game_summary: GameSummary,
        /// Users watching
        #[serde(default)]
        users: Vec<User>,
        /// The record so far
        #[serde(default)]
        sgf_events: Vec<SgfEvent>,
    },
    /// New record edits for a joined game
    #[serde(rename_all = "camelCase")]
    GameUpdate {
        /// Game channel
        channel_id: ChannelId,
        /// Edits in order
        #[serde(default)]
        sgf_events: Vec<SgfEvent>,
    },
    /// Clocks, allowed actions and end flag
    #[serde(rename_all = "camelCase")]
    GameState {
        /// Game channel
        channel_id: ChannelId,
        /// What each user may do now
        #[serde(default)]
        actions: Vec<GameAction>,
        /// Clock readings
        #[serde(default)]
        clocks: Clocks,
        /// Game has ended
        #[serde(default)]
        over: bool,
    },
    /// A game turned into a review
    #[serde(rename_all = "camelCase")]
    GameReview {
        /// Former game channel
        channel_id: ChannelId,
        /// The review game
        review: GameSummary,
    },
    /// This client joined a challenge channel
    #[serde(rename_all = "camelCase")]
    ChallengeJoin {
        /// Challenge channel
        channel_id: ChannelId,
        /// Challenge listing
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game_summary: Option<GameSummary>,
        /// Users present
        #[serde(default)]
        users: Vec<User>,
    },
    /// The challenge creator proposes terms
    #[serde(rename_all = "camelCase")]
    ChallengeProposal {
        /// Challenge channel
        channel_id: ChannelId,
        /// Proposed terms
        proposal: Proposal,
    },
    /// A challenger submitted terms
    #[serde(rename_all = "camelCase")]
    ChallengeSubmit {
        /// Challenge channel
        channel_id: ChannelId,
        /// Submitted terms
        proposal: Proposal,
    },
    /// The challenge was declined
    #[serde(rename_all = "camelCase")]
    ChallengeDecline {
        /// Challenge channel
        channel_id: ChannelId,
    },
    /// The challenge became a game
    #[serde(rename_all = "camelCase")]
    ChallengeFinal {
        /// Challenge channel
        channel_id: ChannelId,
        /// Channel of the new game
        game_channel_id: ChannelId,
    },
    /// The opponent asked to undo
    #[serde(rename_all = "camelCase")]
    GameUndoRequest {
        /// Game channel
        channel_id: ChannelId,
    },
    /// Chat line in a channel
    #[serde(rename_all = "camelCase")]
    Chat {
        /// Channel
        channel_id: ChannelId,
        /// Speaker
        user: User,
        /// Text
        text: String,
    },
    /// Announcement posted to a channel
    #[serde(rename_all = "camelCase")]
    Announce {
        /// Channel
        channel_id: ChannelId,
        /// Speaker
        user: User,
        /// Text
        text: String,
    },
    /// Chat line released by a moderator
    #[serde(rename_all = "camelCase")]
    ModeratedChat {
        /// Channel
        channel_id: ChannelId,
        /// Speaker
        user: User,
        /// Text
        text: String,
    },
    /// Server-wide announcement
    Announcement {
        /// Text
        text: String,
    },
    /// Any message type this client does not model
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Wire type name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::Hello => "HELLO",
            ServerMessage::LoginSuccess { .. } => "LOGIN_SUCCESS",
            ServerMessage::LoginFailedNoSuchUser => "LOGIN_FAILED_NO_SUCH_USER",
            ServerMessage::LoginFailedBadPassword => "LOGIN_FAILED_BAD_PASSWORD",
            ServerMessage::LoginFailedUserAlreadyExists => "LOGIN_FAILED_USER_ALREADY_EXISTS",
            ServerMessage::Logout { .. } => "LOGOUT",
            ServerMessage::Reconnect => "RECONNECT",
            ServerMessage::SessionExpired => "SESSION_EXPIRED",
            ServerMessage::RoomNames { .. } => "ROOM_NAMES",
            ServerMessage::RoomJoin { .. } => "ROOM_JOIN",
            ServerMessage::RoomDesc { .. } => "ROOM_DESC",
            ServerMessage::UserAdded { .. } => "USER_ADDED",
            ServerMessage::UserRemoved { .. } => "USER_REMOVED",
            ServerMessage::UserUpdate { .. } => "USER_UPDATE",
            ServerMessage::GameList { .. } => "GAME_LIST",
            ServerMessage::GameContainerRemoveGame { .. } => "GAME_CONTAINER_REMOVE_GAME",
            ServerMessage::Unjoin { .. } => "UNJOIN",
            ServerMessage::Close { .. } => "CLOSE",
            ServerMessage::GameJoin { .. } => "GAME_JOIN",
            ServerMessage::GameUpdate { .. } => "GAME_UPDATE",
            ServerMessage::GameState { .. } => "GAME_STATE",
            ServerMessage::GameReview { .. } => "GAME_REVIEW",
            ServerMessage::ChallengeJoin { .. } => "CHALLENGE_JOIN",
            ServerMessage::ChallengeProposal { .. } => "CHALLENGE_PROPOSAL",
            ServerMessage::ChallengeSubmit { .. } => "CHALLENGE_SUBMIT",
            ServerMessage::ChallengeDecline { .. } => "CHALLENGE_DECLINE",
            ServerMessage::ChallengeFinal { .. } => "CHALLENGE_FINAL",
            ServerMessage::GameUndoRequest { .. } => "GAME_UNDO_REQUEST",
            ServerMessage::Chat { .. } => "CHAT",
            ServerMessage::Announce { .. } => "ANNOUNCE",
            ServerMessage::ModeratedChat { .. } => "MODERATED_CHAT",
            ServerMessage::Announcement { .. } => "ANNOUNCEMENT",
            ServerMessage::Unknown => "UNKNOWN",
        }
    }
}

/// A password that never shows up in logs
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    /// Wrap a plain password
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Requests sent to the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Start a session
    Login {
        /// Account name
        name: String,
        /// Account password
        password: Password,
        /// Locale such as `en_US`
        locale: String,
    },
    /// End the session
    Logout,
    /// Join a room, game or challenge channel
    #[serde(rename_all = "camelCase")]
    JoinRequest {
        /// Channel to join
        channel_id: ChannelId,
    },
    /// Leave a channel
    #[serde(rename_all = "camelCase")]
    UnjoinRequest {
        /// Channel to leave
        channel_id: ChannelId,
    },
    /// Offer terms to a challenge
    #[serde(rename_all = "camelCase")]
    ChallengeSubmit {
        /// Challenge channel
        channel_id: ChannelId,
        /// Offered terms
        proposal: Proposal,
    },
    /// Accept the submitted terms
    #[serde(rename_all = "camelCase")]
    ChallengeAccept {
        /// Challenge channel
        channel_id: ChannelId,
        /// Accepted terms
        proposal: Proposal,
    },
    /// Decline a challenge
    #[serde(rename_all = "camelCase")]
    ChallengeDecline {
        /// Challenge channel
        channel_id: ChannelId,
    },
    /// Play a stone or pass
    #[serde(rename_all = "camelCase")]
    GameMove {
        /// Game channel
        channel_id: ChannelId,
        /// Point or `PASS`
        loc: Location,
    },
    /// Toggle a group dead or alive while scoring
    #[serde(rename_all = "camelCase")]
    GameMarkLife {
        /// Game channel
        channel_id: ChannelId,
        /// Column
        x: u8,
        /// Row
        y: u8,
        /// New status
        alive: bool,
    },
    /// Ask the opponent to undo
    #[serde(rename_all = "camelCase")]
    GameUndoRequest {
        /// Game channel
        channel_id: ChannelId,
    },
    /// Grant the opponent's undo
    #[serde(rename_all = "camelCase")]
    GameUndoAccept {
        /// Game channel
        channel_id: ChannelId,
    },
    /// Refuse the opponent's undo
    #[serde(rename_all = "camelCase")]
    GameUndoDecline {
        /// Game channel
        channel_id: ChannelId,
    },
    /// Give the opponent extra time
    #[serde(rename_all = "camelCase")]
    GameAddTime {
        /// Game channel
        channel_id: ChannelId,
        /// Seconds to add
        seconds: u32,
    },
    /// Say something in a channel
    #[serde(rename_all = "camelCase")]
    Chat {
        /// Channel
        channel_id: ChannelId,
        /// Text
        text: String,
    },
}

impl ClientMessage {
    /// Wire type name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Login { .. } => "LOGIN",
            ClientMessage::Logout => "LOGOUT",
            ClientMessage::JoinRequest { .. } => "JOIN_REQUEST",
            ClientMessage::UnjoinRequest { .. } => "UNJOIN_REQUEST",
            ClientMessage::ChallengeSubmit { .. } => "CHALLENGE_SUBMIT",
            ClientMessage::ChallengeAccept { .. } => "CHALLENGE_ACCEPT",
            ClientMessage::ChallengeDecline { .. } => "CHALLENGE_DECLINE",
            ClientMessage::GameMove { .. } => "GAME_MOVE",
            ClientMessage::GameMarkLife { .. } => "GAME_MARK_LIFE",
            ClientMessage::GameUndoRequest { .. } => "GAME_UNDO_REQUEST",
            ClientMessage::GameUndoAccept { .. } => "GAME_UNDO_ACCEPT",
            ClientMessage::GameUndoDecline { .. } => "GAME_UNDO_DECLINE",
            ClientMessage::GameAddTime { .. } => "GAME_ADD_TIME",
            ClientMessage::Chat { .. } => "CHAT",
        }
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for client integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use kgsgo_core::{Color, GameRules, Location, NodeId, Prop, SgfEvent};
use kgsgo_network::{
    ClientConfig, ClientMessage, GameSummary, MessageBatch, ServerMessage, Transport,
    TransportError, User,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Transport that replays scripted receive outcomes and records sends.
/// An exhausted script blocks `receive` forever.
#[derive(Default)]
pub struct ScriptedTransport {
    receives: Mutex<VecDeque<Result<Vec<ServerMessage>, TransportError>>>,
    sends: Mutex<VecDeque<Result<(), TransportError>>>,
    sent: Mutex<Vec<ClientMessage>>,
}

impl ScriptedTransport {
    pub fn with_receives(
        receives: impl IntoIterator<Item = Result<Vec<ServerMessage>, TransportError>>,
    ) -> Self {
        Self {
            receives: Mutex::new(receives.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Script send outcomes after the login request, which always succeeds
    pub fn with_sends(self, sends: impl IntoIterator<Item = Result<(), TransportError>>) -> Self {
        *self.sends.lock() = std::iter::once(Ok(())).chain(sends).collect();
        self
    }

    pub fn sent(&self) -> Vec<ClientMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, message: &ClientMessage) -> Result<(), TransportError> {
        self.sent.lock().push(message.clone());
        let outcome = self.sends.lock().pop_front();
        outcome.unwrap_or(Ok(()))
    }

    async fn receive(&self) -> Result<Vec<ServerMessage>, TransportError> {
        let next = self.receives.lock().pop_front();
        match next {
            Some(outcome) => outcome,
            None => std::future::pending().await,
        }
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        retry_delay: Duration::from_secs(3),
        ..ClientConfig::default()
    }
}

/// Fixed receive time so re-deliveries compare equal
pub fn at(second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, second)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn batch(messages: Vec<ServerMessage>, received_at: DateTime<Utc>) -> MessageBatch {
    MessageBatch {
        messages,
        received_at,
    }
}

pub fn login_success(name: &str) -> ServerMessage {
    ServerMessage::LoginSuccess {
        you: User::named(name),
        rooms: vec![],
    }
}

/// Summary of a game between `black` and `white`
pub fn summary(channel_id: u64, black: &str, white: &str) -> GameSummary {
    serde_json::from_value(serde_json::json!({
        "channelId": channel_id,
        "gameType": "free",
        "size": 9,
        "players": {"black": {"name": black}, "white": {"name": white}}
    }))
    .unwrap()
}

pub fn child(parent: u32, child: u32) -> SgfEvent {
    SgfEvent::ChildAdded {
        node_id: NodeId(parent),
        child_node_id: NodeId(child),
        position: None,
    }
}

pub fn add(node: u32, prop: Prop) -> SgfEvent {
    SgfEvent::PropAdded {
        node_id: NodeId(node),
        prop,
    }
}

pub fn activate(node: u32) -> SgfEvent {
    SgfEvent::Activated {
        node_id: NodeId(node),
        prev_node_id: None,
    }
}

pub fn mv(color: Color, x: u8, y: u8) -> Prop {
    Prop::Move {
        color,
        loc: Location::point(x, y),
    }
}

pub fn rules(size: u8) -> Prop {
    Prop::Rules(GameRules {
        size,
        ..GameRules::default()
    })
}

/// `GAME_JOIN` for a 9x9 game with black's first move at (2,2) live
pub fn game_join(channel_id: u64) -> ServerMessage {
    ServerMessage::GameJoin {
        channel_id,
        game_summary: summary(channel_id, "bob", "alice"),
        users: vec![User::named("alice"), User::named("bob")],
        sgf_events: vec![
            add(0, rules(9)),
            child(0, 1),
            add(1, mv(Color::Black, 2, 2)),
            activate(1),
        ],
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived per-node state

use crate::{Board, Captures, Color, Coord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One player's clock
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// Seconds left in the current period
    pub seconds: f64,
    /// Overtime periods or stones left, 0 while in main time
    pub periods: u32,
}

/// Both clocks after a node, `None` for an untimed player
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeLeft {
    /// Black's clock
    pub black: Option<Clock>,
    /// White's clock
    pub white: Option<Clock>,
}

impl TimeLeft {
    /// Both players start with `main_time`, or untimed
    pub fn starting(main_time: Option<f64>) -> Self {
        let clock = main_time.map(|seconds| Clock { seconds, periods: 0 });
        Self {
            black: clock,
            white: clock,
        }
    }

    /// Clock for one color
    pub fn get(&self, color: Color) -> Option<Clock> {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    pub(crate) fn set(&mut self, color: Color, clock: Clock) {
        match color {
            Color::Black => self.black = Some(clock),
            Color::White => self.white = Some(clock),
        }
    }
}

/// A marker drawn on a board point
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mark {
    /// Stone played at this node
    LastMove {
        /// Color of the played stone
        color: Color,
    },
    /// Unconfirmed move sent by this client
    Pending {
        /// Color of the pending stone
        color: Color,
    },
    /// Triangle
    Triangle,
    /// Square
    Square,
    /// Circle
    Circle,
    /// Cross
    Cross,
    /// Text label
    Label {
        /// Label text
        text: String,
    },
    /// Territory owned by a color
    Territory {
        /// Owner
        color: Color,
    },
    /// Stone marked dead
    Dead,
}

/// A mark at a point
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkedPoint {
    /// Board point
    pub coord: Coord,
    /// The mark
    pub mark: Mark,
}

/// All marks for one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup(Vec<MarkedPoint>);

impl Markup {
    pub(crate) fn push(&mut self, coord: Coord, mark: Mark) {
        self.0.push(MarkedPoint { coord, mark });
    }

    /// Marks at one point
    pub fn at(&self, coord: Coord) -> impl Iterator<Item = &Mark> + '_ {
        self.0
            .iter()
            .filter(move |m| m.coord == coord)
            .map(|m| &m.mark)
    }

    /// Every mark
    pub fn iter(&self) -> impl Iterator<Item = &MarkedPoint> + '_ {
        self.0.iter()
    }

    /// Whether there are no marks
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Derived state after a node's properties are applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeState {
    /// Stones captured so far on this line
    pub captures: Captures,
    /// Clocks after this node
    pub time_left: TimeLeft,
    /// Board after this node
    pub board: Arc<Board>,
    /// Markers to draw for this node
    pub markup: Markup,
}

/// A chat line split out of a node comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLine {
    /// Speaker, when the line has a `name [rank]:` prefix
    pub sender: Option<String>,
    /// Speaker rank as written
    pub rank: Option<String>,
    /// Message body
    pub text: String,
    /// When the client received the comment
    pub received_at: DateTime<Utc>,
}

impl ChatLine {
    /// Split comment text into lines of the form `name [rank]: text`
    pub fn parse_comment(text: &str, received_at: DateTime<Utc>) -> Vec<ChatLine> {
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Self::parse_line(line, received_at))
            .collect()
    }

    fn parse_line(line: &str, received_at: DateTime<Utc>) -> ChatLine {
        let unattributed = || ChatLine {
            sender: None,
            rank: None,
            text: line.to_string(),
            received_at,
        };

        let Some((head, body)) = line.split_once(": ") else {
            return unattributed();
        };
        let (name, rank) = match head.split_once(" [") {
            Some((name, rest)) => match rest.strip_suffix(']') {
                Some(rank) => (name, Some(rank.to_string())),
                None => return unattributed(),
            },
            None => (head, None),
        };
        if name.is_empty() || name.contains(char::is_whitespace) {
            return unattributed();
        }
        ChatLine {
            sender: Some(name.to_string()),
            rank,
            text: body.to_string(),
            received_at,
        }
    }
}

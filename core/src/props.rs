// SPDX-License-Identifier: MIT OR Apache-2.0

//! Properties attached to game tree nodes

use crate::{BoardEdit, Color, GameRules, Location};
use serde::{Deserialize, Serialize};

/// One tagged property of a game node, as sent by the server.
///
/// Properties the client does not model deserialize to [`Prop::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum Prop {
    /// Rule declaration, normally on the root node
    #[serde(rename = "RULES")]
    Rules(GameRules),
    /// A played stone
    #[serde(rename = "MOVE")]
    Move {
        /// Stone color
        color: Color,
        /// Point played, or pass
        loc: Location,
    },
    /// Setup stone; `empty` clears the point
    #[serde(rename = "ADDSTONE")]
    AddStone {
        /// Stone color or `None` for empty
        #[serde(with = "stone_or_empty")]
        color: Option<Color>,
        /// Target point
        loc: Location,
    },
    /// Clock reading for one player after this node
    #[serde(rename = "TIMELEFT")]
    TimeLeft {
        /// Whose clock
        color: Color,
        /// Seconds remaining in the current period
        #[serde(rename = "float")]
        seconds: f64,
        /// Overtime periods or stones remaining, 0 in main time
        #[serde(rename = "int", default)]
        periods: u32,
    },
    /// Node comment; in live games this accumulates the game chat
    #[serde(rename = "COMMENT")]
    Comment {
        /// Comment text
        text: String,
    },
    /// Triangle markup
    #[serde(rename = "TRIANGLE")]
    Triangle {
        /// Marked point
        loc: Location,
    },
    /// Square markup
    #[serde(rename = "SQUARE")]
    Square {
        /// Marked point
        loc: Location,
    },
    /// Circle markup
    #[serde(rename = "CIRCLE")]
    Circle {
        /// Marked point
        loc: Location,
    },
    /// Cross markup
    #[serde(rename = "CROSS")]
    Cross {
        /// Marked point
        loc: Location,
    },
    /// Clears a phantom stone drawn at a point
    #[serde(rename = "PHANTOMCLEAR")]
    PhantomClear {
        /// Cleared point
        loc: Location,
    },
    /// Text label
    #[serde(rename = "LABEL")]
    Label {
        /// Labelled point
        loc: Location,
        /// Label text
        text: String,
    },
    /// Territory marker during or after scoring
    #[serde(rename = "TERRITORY")]
    Territory {
        /// Owner of the point
        color: Color,
        /// Marked point
        loc: Location,
    },
    /// Dead stone marker during or after scoring
    #[serde(rename = "DEAD")]
    Dead {
        /// Marked point
        loc: Location,
    },
    /// Player name for one color
    #[serde(rename = "PLAYERNAME")]
    PlayerName {
        /// Which player
        color: Color,
        /// Account name
        text: String,
    },
    /// Player rank for one color
    #[serde(rename = "PLAYERRANK")]
    PlayerRank {
        /// Which player
        color: Color,
        /// Rank value as sent
        #[serde(default)]
        int: i32,
    },
    /// Game name
    #[serde(rename = "GAMENAME")]
    GameName {
        /// Name text
        text: String,
    },
    /// Final result
    #[serde(rename = "RESULT")]
    Result {
        /// Result text
        text: String,
    },
    /// Any property this client does not render
    #[serde(other, rename = "UNKNOWN")]
    Unknown,
}

/// Identity used to match a property for removal or replacement:
/// the property name plus its location, or its color for properties
/// that are per-player rather than per-point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropKey {
    /// Wire name
    pub name: &'static str,
    /// Location for point properties
    pub loc: Option<Location>,
    /// Color for per-player properties without a location
    pub color: Option<Color>,
}

impl Prop {
    /// Wire name of the property
    pub fn name(&self) -> &'static str {
        match self {
            Prop::Rules(_) => "RULES",
            Prop::Move { .. } => "MOVE",
            Prop::AddStone { .. } => "ADDSTONE",
            Prop::TimeLeft { .. } => "TIMELEFT",
            Prop::Comment { .. } => "COMMENT",
            Prop::Triangle { .. } => "TRIANGLE",
            Prop::Square { .. } => "SQUARE",
            Prop::Circle { .. } => "CIRCLE",
            Prop::Cross { .. } => "CROSS",
            Prop::PhantomClear { .. } => "PHANTOMCLEAR",
            Prop::Label { .. } => "LABEL",
            Prop::Territory { .. } => "TERRITORY",
            Prop::Dead { .. } => "DEAD",
            Prop::PlayerName { .. } => "PLAYERNAME",
            Prop::PlayerRank { .. } => "PLAYERRANK",
            Prop::GameName { .. } => "GAMENAME",
            Prop::Result { .. } => "RESULT",
            Prop::Unknown => "UNKNOWN",
        }
    }

    /// Location the property refers to, if any
    pub fn loc(&self) -> Option<Location> {
        match self {
            Prop::Move { loc, .. }
            | Prop::AddStone { loc, .. }
            | Prop::Triangle { loc }
            | Prop::Square { loc }
            | Prop::Circle { loc }
            | Prop::Cross { loc }
            | Prop::PhantomClear { loc }
            | Prop::Label { loc, .. }
            | Prop::Territory { loc, .. }
            | Prop::Dead { loc } => Some(*loc),
            _ => None,
        }
    }

    /// Matching identity, see [`PropKey`]
    pub fn key(&self) -> PropKey {
        let loc = self.loc();
        let color = match self {
            Prop::TimeLeft { color, .. }
            | Prop::PlayerName { color, .. }
            | Prop::PlayerRank { color, .. } => Some(*color),
            _ => None,
        };
        PropKey {
            name: self.name(),
            loc,
            color: if loc.is_some() { None } else { color },
        }
    }

    /// Whether `other` names the same property slot as `self`
    pub fn matches(&self, other: &Prop) -> bool {
        self.key() == other.key()
    }

    /// The board edit this property performs, if it changes stones
    pub fn board_edit(&self) -> Option<BoardEdit> {
        match self {
            Prop::Move { color, loc } => Some(BoardEdit::Move {
                color: *color,
                loc: *loc,
            }),
            Prop::AddStone { color, loc } => Some(BoardEdit::AddStone {
                color: *color,
                loc: *loc,
            }),
            _ => None,
        }
    }
}

mod stone_or_empty {
    use crate::Color;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    enum Stone {
        Black,
        White,
        Empty,
    }

    pub fn serialize<S: Serializer>(color: &Option<Color>, s: S) -> Result<S::Ok, S::Error> {
        match color {
            Some(Color::Black) => Stone::Black,
            Some(Color::White) => Stone::White,
            None => Stone::Empty,
        }
        .serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Color>, D::Error> {
        Ok(match Stone::deserialize(d)? {
            Stone::Black => Some(Color::Black),
            Stone::White => Some(Color::White),
            Stone::Empty => None,
        })
    }
}

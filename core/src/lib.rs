// SPDX-License-Identifier: MIT OR Apache-2.0

//! KGS Go Core - Board and Game Tree Logic
//!
//! This crate provides the client-side game model including:
//! - Go board representation, group/liberty computation and capture resolution
//! - Game rule declarations (board size, ruleset, time system)
//! - Game record properties as delivered by the server
//! - The game tree, rebuilt from structural edit events, with cached
//!   per-node board state along the line being viewed
//!
//! The server is authoritative: nothing in here enforces rules, it only
//! mirrors what the server says happened.

#![deny(unsafe_code)]
#![deny(clippy::all)]

pub mod board;
pub mod props;
pub mod rules;
pub mod tree;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use board::{apply_edits, get_group, Board, BoardEdit, Captures, Group};
pub use props::Prop;
pub use rules::{GameRules, Ruleset, TimeSystem};
pub use tree::{
    ChatLine, Clock, GameNode, GameTree, Mark, Markup, NodeId, NodeState, PendingMove, SgfEvent,
    TimeLeft,
};

/// Player color in a Go game (Black or White)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Black player (traditionally goes first)
    Black,
    /// White player
    White,
}

impl Color {
    /// Returns the opposite color
    pub fn opposite(&self) -> Self {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Black => f.write_str("black"),
            Color::White => f.write_str("white"),
        }
    }
}

/// Board coordinate representing a position. `y = 0` is the top row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    /// X coordinate (column)
    pub x: u8,
    /// Y coordinate (row)
    pub y: u8,
}

impl Coord {
    /// Create a new coordinate
    pub fn new(x: u8, y: u8) -> Self {
        Self { x, y }
    }

    /// Check if coordinate is valid for a board of given size
    pub fn is_valid(&self, board_size: u8) -> bool {
        self.x < board_size && self.y < board_size
    }
}

/// Where a move or markup property points: a board point, or a pass.
///
/// On the wire this is either `{"x": 3, "y": 4}` or the string `"PASS"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LocationRepr", into = "LocationRepr")]
pub enum Location {
    /// A point on the board
    Point(Coord),
    /// No point at all
    Pass,
}

impl Location {
    /// Shorthand for a board point
    pub fn point(x: u8, y: u8) -> Self {
        Location::Point(Coord::new(x, y))
    }

    /// The board point, if this is not a pass
    pub fn coord(&self) -> Option<Coord> {
        match self {
            Location::Point(coord) => Some(*coord),
            Location::Pass => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LocationRepr {
    Point { x: u8, y: u8 },
    Named(String),
}

impl TryFrom<LocationRepr> for Location {
    type Error = String;

    fn try_from(repr: LocationRepr) -> Result<Self, Self::Error> {
        match repr {
            LocationRepr::Point { x, y } => Ok(Location::point(x, y)),
            LocationRepr::Named(name) if name == "PASS" => Ok(Location::Pass),
            LocationRepr::Named(name) => Err(format!("unknown location {name:?}")),
        }
    }
}

impl From<Location> for LocationRepr {
    fn from(loc: Location) -> Self {
        match loc {
            Location::Point(Coord { x, y }) => LocationRepr::Point { x, y },
            Location::Pass => LocationRepr::Named("PASS".to_string()),
        }
    }
}

/// Errors raised by the board and tree engines.
///
/// These signal a bug in the caller or a malformed record from the server;
/// they are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Board side length outside the supported range
    #[error("board size {0} outside 2..=38")]
    InvalidBoardSize(u8),

    /// A location does not fit on the board it is applied to
    #[error("location ({x}, {y}) is off a {size}x{size} board")]
    InvalidLocation {
        /// Column
        x: u8,
        /// Row
        y: u8,
        /// Board side length
        size: u8,
    },

    /// A tree operation referenced a node the tree does not hold
    #[error("game tree has no node {0}")]
    MissingNode(NodeId),
}

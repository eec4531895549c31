// SPDX-License-Identifier: MIT OR Apache-2.0

//! Board representation, stone groups and capture resolution

use crate::{Color, Coord, CoreError, Location};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Represents the Go board with stones and empty positions
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Side length, 2 to 38
    size: u8,
    /// Positions on the board, row-major
    positions: Vec<Option<Color>>,
}

impl Board {
    /// Smallest supported side length
    pub const MIN_SIZE: u8 = 2;
    /// Largest supported side length
    pub const MAX_SIZE: u8 = 38;

    /// Create a new empty board with the specified size
    pub fn new(size: u8) -> Result<Self, CoreError> {
        if !(Self::MIN_SIZE..=Self::MAX_SIZE).contains(&size) {
            return Err(CoreError::InvalidBoardSize(size));
        }
        let cells = (size as usize) * (size as usize);
        Ok(Self {
            size,
            positions: vec![None; cells],
        })
    }

    /// Get the stone at the specified coordinate
    pub fn get(&self, coord: Coord) -> Option<Color> {
        if !coord.is_valid(self.size) {
            return None;
        }
        self.positions[self.coord_to_index(coord)]
    }

    /// Place a stone at, or clear, the specified coordinate.
    ///
    /// Returns false if the coordinate is off the board.
    pub fn set(&mut self, coord: Coord, stone: Option<Color>) -> bool {
        if !coord.is_valid(self.size) {
            return false;
        }
        let idx = self.coord_to_index(coord);
        self.positions[idx] = stone;
        true
    }

    /// Convert a coordinate to a vector index
    fn coord_to_index(&self, coord: Coord) -> usize {
        (coord.y as usize) * (self.size as usize) + (coord.x as usize)
    }

    /// Get adjacent coordinates (up, down, left, right)
    pub fn adjacent_coords(&self, coord: Coord) -> Vec<Coord> {
        let mut result = Vec::with_capacity(4);
        let x = coord.x;
        let y = coord.y;

        // Up
        if y > 0 {
            result.push(Coord::new(x, y - 1));
        }

        // Down
        if y < self.size - 1 {
            result.push(Coord::new(x, y + 1));
        }

        // Left
        if x > 0 {
            result.push(Coord::new(x - 1, y));
        }

        // Right
        if x < self.size - 1 {
            result.push(Coord::new(x + 1, y));
        }

        result
    }

    /// Get the size of the board
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Iterate over every occupied point
    pub fn stones(&self) -> impl Iterator<Item = (Coord, Color)> + '_ {
        let size = self.size as usize;
        self.positions
            .iter()
            .enumerate()
            .filter_map(move |(idx, stone)| {
                stone.map(|color| (Coord::new((idx % size) as u8, (idx / size) as u8), color))
            })
    }

    /// Count stones of one color
    pub fn count(&self, color: Color) -> usize {
        self.positions
            .iter()
            .filter(|stone| **stone == Some(color))
            .count()
    }
}

/// A maximal 4-connected set of same-colored stones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// `y * size + x` of the lowest-indexed member; only meaningful for
    /// telling groups apart within one board
    pub id: usize,
    /// Color of every stone in the group
    pub color: Color,
    /// Member points
    pub stones: Vec<Coord>,
    /// Empty neighbor count, one per adjacent (stone, empty point) pair.
    /// An empty point touching two members counts twice; only zero versus
    /// non-zero is meaningful.
    pub liberties: usize,
}

/// Find the group containing the stone at `coord`, or `None` for an empty
/// or off-board point.
pub fn get_group(board: &Board, coord: Coord) -> Option<Group> {
    let color = board.get(coord)?;

    let mut stones = Vec::new();
    let mut visited = HashSet::new();
    let mut queue = vec![coord];
    let mut liberties = 0;

    while let Some(current) = queue.pop() {
        if !visited.insert(current) {
            continue;
        }
        stones.push(current);

        for neighbor in board.adjacent_coords(current) {
            match board.get(neighbor) {
                None => liberties += 1,
                Some(c) if c == color && !visited.contains(&neighbor) => queue.push(neighbor),
                Some(_) => {}
            }
        }
    }

    let id = stones
        .iter()
        .map(|c| board.coord_to_index(*c))
        .min()
        .unwrap_or_default();

    Some(Group {
        id,
        color,
        stones,
        liberties,
    })
}

/// Captured stone tallies, keyed by the capturing color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Captures {
    /// White stones taken by black
    pub black: u32,
    /// Black stones taken by white
    pub white: u32,
}

impl Captures {
    /// Stones taken by `color`
    pub fn get(&self, color: Color) -> u32 {
        match color {
            Color::Black => self.black,
            Color::White => self.white,
        }
    }

    /// Credit `count` captured stones to `color`
    pub fn add(&mut self, color: Color, count: u32) {
        match color {
            Color::Black => self.black += count,
            Color::White => self.white += count,
        }
    }

    /// Sum of two tallies
    pub fn combined(self, other: Captures) -> Captures {
        Captures {
            black: self.black + other.black,
            white: self.white + other.white,
        }
    }
}

/// A single board-changing edit taken from a node's properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardEdit {
    /// A played stone; resolves captures of opposing neighbors
    Move {
        /// Stone color
        color: Color,
        /// Target point, or pass
        loc: Location,
    },
    /// Setup stone placement or removal; never captures
    AddStone {
        /// Stone color, `None` clears the point
        color: Option<Color>,
        /// Target point, or pass
        loc: Location,
    },
}

/// Apply `edits` in order to a copy of `board`.
///
/// Returns the new board and the stones captured by these edits alone.
/// Suicide is not resolved: only opposing groups adjacent to a just-played
/// stone are removed, the server decides the rest.
pub fn apply_edits(edits: &[BoardEdit], board: &Board) -> Result<(Board, Captures), CoreError> {
    let mut next = board.clone();
    let mut captures = Captures::default();

    for edit in edits {
        match *edit {
            BoardEdit::Move { loc: Location::Pass, .. }
            | BoardEdit::AddStone { loc: Location::Pass, .. } => {}
            BoardEdit::AddStone {
                color,
                loc: Location::Point(coord),
            } => {
                place(&mut next, coord, color)?;
            }
            BoardEdit::Move {
                color,
                loc: Location::Point(coord),
            } => {
                place(&mut next, coord, Some(color))?;
                let taken = resolve_captures(&mut next, coord, color);
                if taken > 0 {
                    tracing::trace!(x = coord.x, y = coord.y, %color, taken, "stones captured");
                }
                captures.add(color, taken);
            }
        }
    }

    Ok((next, captures))
}

fn place(board: &mut Board, coord: Coord, stone: Option<Color>) -> Result<(), CoreError> {
    if board.set(coord, stone) {
        Ok(())
    } else {
        Err(CoreError::InvalidLocation {
            x: coord.x,
            y: coord.y,
            size: board.size(),
        })
    }
}

/// Remove every opposing group next to `played` that has no liberties left.
fn resolve_captures(board: &mut Board, played: Coord, color: Color) -> u32 {
    let opponent = color.opposite();
    let mut removed_groups = HashSet::new();
    let mut taken = 0;

    for neighbor in board.adjacent_coords(played) {
        if board.get(neighbor) != Some(opponent) {
            continue;
        }
        let Some(group) = get_group(board, neighbor) else {
            continue;
        };
        if group.liberties > 0 || !removed_groups.insert(group.id) {
            continue;
        }
        for stone in &group.stones {
            board.set(*stone, None);
        }
        taken += group.stones.len() as u32;
    }

    taken
}

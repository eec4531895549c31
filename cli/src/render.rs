// SPDX-License-Identifier: MIT OR Apache-2.0

//! ASCII board rendering for the CLI.

use crate::state::GameRecord;
use kgsgo_core::{Board, Color, Coord, CoreError, Location, Mark, Markup, NodeState};
use std::fmt::Write;
use std::sync::Arc;

const COLUMNS: &[u8] = b"ABCDEFGHJKLMNOPQRSTUVWXYZabcdefghjklmnopqrstuvwxyz";

/// Render a board with its markup. The last move is bracketed, GNU Go style.
pub fn render_board(board: &Board, markup: &Markup) -> String {
    let size = board.size();
    let mut output = String::new();
    let labels = column_labels(size);

    output.push_str(&labels);
    for y in 0..size {
        let row = size - y;
        let _ = write!(output, "{:2} ", row);

        let mut last_move = None;
        let cells: Vec<char> = (0..size)
            .map(|x| {
                let coord = Coord::new(x, y);
                if markup.at(coord).any(|m| matches!(m, Mark::LastMove { .. })) {
                    last_move = Some(x);
                }
                point_symbol(board, markup, coord)
            })
            .collect();

        for (x, symbol) in cells.iter().enumerate() {
            let sep = if last_move == Some(x as u8) {
                '('
            } else if x > 0 && last_move == Some(x as u8 - 1) {
                ')'
            } else {
                ' '
            };
            output.push(sep);
            output.push(*symbol);
        }
        let closing = if last_move == Some(size - 1) { ')' } else { ' ' };
        let _ = writeln!(output, "{closing}{row}");
    }
    output.push_str(&labels);
    output
}

fn column_labels(size: u8) -> String {
    let mut labels = String::from("   ");
    for x in 0..size {
        labels.push(' ');
        labels.push(column_label(x));
    }
    labels.push('\n');
    labels
}

fn point_symbol(board: &Board, markup: &Markup, coord: Coord) -> char {
    let marks: Vec<&Mark> = markup.at(coord).collect();
    let dead = marks.iter().any(|m| matches!(m, Mark::Dead));

    match board.get(coord) {
        Some(Color::Black) if dead => 'x',
        Some(Color::White) if dead => 'o',
        Some(Color::Black) => '●',
        Some(Color::White) => '○',
        None => {
            let overlay = marks.iter().find_map(|mark| match mark {
                Mark::Pending { .. } => Some('*'),
                Mark::Triangle => Some('△'),
                Mark::Square => Some('□'),
                Mark::Circle => Some('◌'),
                Mark::Cross => Some('X'),
                Mark::Label { text } => text.chars().next(),
                Mark::Territory { color: Color::Black } => Some('▪'),
                Mark::Territory { color: Color::White } => Some('▫'),
                Mark::LastMove { .. } | Mark::Dead => None,
            });
            match overlay {
                Some(symbol) => symbol,
                None if is_star_point(coord, board.size()) => '+',
                None => '·',
            }
        }
    }
}

/// Column letter for an x coordinate, skipping I
pub fn column_label(x: u8) -> char {
    COLUMNS.get(x as usize).map_or('?', |b| *b as char)
}

/// Human name of a location, e.g. `D4` or `pass`
pub fn location_name(loc: Location, size: u8) -> String {
    match loc {
        Location::Point(coord) => format!("{}{}", column_label(coord.x), size - coord.y),
        Location::Pass => "pass".to_string(),
    }
}

/// Parse `D4` style input (or `pass`) for a board of `size`
pub fn parse_point(input: &str, size: u8) -> Option<Location> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("pass") {
        return Some(Location::Pass);
    }

    let mut chars = input.chars();
    let column = chars.next()?;
    let x = if size <= 25 {
        COLUMNS[..25]
            .iter()
            .position(|c| (*c as char).eq_ignore_ascii_case(&column))?
    } else {
        COLUMNS.iter().position(|c| *c as char == column)?
    };
    let row: u8 = chars.as_str().parse().ok()?;
    if x >= size as usize || row == 0 || row > size {
        return None;
    }
    Some(Location::point(x as u8, size - row))
}

/// Check if a coordinate is a star point on the board
fn is_star_point(coord: Coord, board_size: u8) -> bool {
    let (x, y) = (coord.x, coord.y);

    match board_size {
        9 => matches!((x, y), (2, 2) | (2, 6) | (4, 4) | (6, 2) | (6, 6)),
        13 => matches!((x, y), (3, 3) | (3, 9) | (6, 6) | (9, 3) | (9, 9)),
        19 => matches!(x, 3 | 9 | 15) && matches!(y, 3 | 9 | 15),
        _ => false,
    }
}

/// Derived state of the node being viewed, computing it on a scratch copy
/// of the tree when the snapshot has not cached it
pub fn viewed_state(record: &GameRecord) -> Result<Arc<NodeState>, CoreError> {
    let current = record.tree.current();
    if let Some(state) = record.tree.state(current) {
        return Ok(Arc::clone(state));
    }
    let mut tree = (*record.tree).clone();
    tree.compute_states(current)?
        .get(&current)
        .cloned()
        .ok_or(CoreError::MissingNode(current))
}

fn player_line(record: &GameRecord, color: Color) -> String {
    match record.summary.player(color) {
        Some(user) => match &user.rank {
            Some(rank) => format!("{} [{}]", user.name, rank),
            None => user.name.clone(),
        },
        None => "?".to_string(),
    }
}

/// Render a game header, the viewed board and its captures
pub fn render_game(record: &GameRecord) -> Result<String, CoreError> {
    let state = viewed_state(record)?;
    let tree = &record.tree;
    let mut output = String::new();

    let _ = writeln!(
        output,
        "Game {}: {} (W) vs {} (B){}",
        record.channel_id,
        player_line(record, Color::White),
        player_line(record, Color::Black),
        record
            .summary
            .name
            .as_deref()
            .map(|n| format!(" - {n}"))
            .unwrap_or_default()
    );
    let position = tree
        .current_line()
        .iter()
        .position(|id| *id == tree.current())
        .unwrap_or(0);
    let _ = writeln!(
        output,
        "Node {} ({} of line){}",
        tree.current(),
        position,
        if tree.is_following_active() {
            ""
        } else {
            " - browsing, type `live` to return"
        }
    );
    let _ = writeln!(
        output,
        "Captures: Black {} - White {}",
        state.captures.black, state.captures.white
    );
    for color in [Color::Black, Color::White] {
        if let Some(clock) = state.time_left.get(color) {
            let _ = writeln!(
                output,
                "{color} clock: {:.0}s{}",
                clock.seconds,
                if clock.periods > 0 {
                    format!(" ({} left)", clock.periods)
                } else {
                    String::new()
                }
            );
        }
    }
    if let Some(pending) = tree.pending() {
        let _ = writeln!(
            output,
            "Waiting for {} at {}",
            pending.color,
            location_name(pending.loc, state.board.size())
        );
    }
    if record.undo_requested {
        output.push_str("Opponent requests an undo (allow-undo / deny-undo)\n");
    }
    if record.over {
        output.push_str("Game over\n");
    }
    output.push('\n');
    output.push_str(&render_board(&state.board, &state.markup));

    for line in tree.messages(tree.current()) {
        let _ = writeln!(
            output,
            "{}: {}",
            line.sender.as_deref().unwrap_or("*"),
            line.text
        );
    }
    Ok(output)
}

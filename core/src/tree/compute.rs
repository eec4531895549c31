// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incremental derivation of board state along a line of play

use super::{GameNode, GameTree, Mark, Markup, NodeId, NodeState, PendingMove, TimeLeft};
use crate::{apply_edits, Board, Captures, Clock, CoreError, GameRules, Prop};
use std::sync::Arc;

/// Root-to-leaf line passing through `node_id`: its ancestors, the node,
/// then first children down to a leaf.
pub(super) fn line_through(tree: &GameTree, node_id: NodeId) -> Result<Vec<NodeId>, CoreError> {
    let node = tree.node(node_id).ok_or(CoreError::MissingNode(node_id))?;

    let mut line = vec![node_id];
    let mut cursor = node.parent;
    while let Some(id) = cursor {
        line.push(id);
        cursor = tree.node(id).ok_or(CoreError::MissingNode(id))?.parent;
    }
    line.reverse();

    let mut cursor = node.children.first().copied();
    while let Some(id) = cursor {
        line.push(id);
        cursor = tree
            .node(id)
            .ok_or(CoreError::MissingNode(id))?
            .children
            .first()
            .copied();
    }

    Ok(line)
}

/// Fill the state cache for every node on the line through `node_id`.
pub(super) fn compute_states(tree: &mut GameTree, node_id: NodeId) -> Result<(), CoreError> {
    let line = line_through(tree, node_id)?;

    // cached entries are a prefix of the line
    let resume = line
        .iter()
        .position(|id| !tree.states.contains_key(id))
        .unwrap_or(line.len());
    if resume == line.len() {
        return Ok(());
    }

    let rules = line_rules(tree, &line);
    let (mut captures, mut time_left, mut board) = match resume {
        0 => (
            Captures::default(),
            TimeLeft::starting(rules.starting_time()),
            Arc::new(Board::new(rules.size)?),
        ),
        _ => {
            let prev = &tree.states[&line[resume - 1]];
            (prev.captures, prev.time_left, prev.board.clone())
        }
    };

    tracing::trace!(
        node_id = %node_id,
        from = resume,
        to = line.len(),
        "computing node states"
    );

    for id in &line[resume..] {
        let node = tree.node(*id).ok_or(CoreError::MissingNode(*id))?;

        let edits: Vec<_> = node.props.iter().filter_map(Prop::board_edit).collect();
        if !edits.is_empty() {
            let (next, taken) = apply_edits(&edits, &board)?;
            board = Arc::new(next);
            captures = captures.combined(taken);
        }

        for prop in &node.props {
            if let Prop::TimeLeft {
                color,
                seconds,
                periods,
            } = prop
            {
                time_left.set(
                    *color,
                    Clock {
                        seconds: *seconds,
                        periods: *periods,
                    },
                );
            }
        }

        let markup = markup_for(node, tree.pending.as_ref(), &board);
        let state = NodeState {
            captures,
            time_left,
            board: board.clone(),
            markup,
        };
        tree.states.insert(*id, Arc::new(state));
    }

    Ok(())
}

/// Rules declared on the line's root, or the defaults
fn line_rules(tree: &GameTree, line: &[NodeId]) -> GameRules {
    line.first()
        .and_then(|id| tree.node(*id))
        .and_then(|root| {
            root.props.iter().find_map(|p| match p {
                Prop::Rules(rules) => Some(rules.clone()),
                _ => None,
            })
        })
        .unwrap_or_default()
}

fn markup_for(node: &GameNode, pending: Option<&PendingMove>, board: &Board) -> Markup {
    let mut markup = Markup::default();

    for prop in &node.props {
        let Some(coord) = prop.loc().and_then(|loc| loc.coord()) else {
            continue;
        };
        let mark = match prop {
            Prop::Move { color, .. } if board.get(coord) == Some(*color) => {
                Mark::LastMove { color: *color }
            }
            Prop::Triangle { .. } => Mark::Triangle,
            Prop::Square { .. } => Mark::Square,
            Prop::Circle { .. } => Mark::Circle,
            Prop::Cross { .. } => Mark::Cross,
            Prop::Label { text, .. } => Mark::Label { text: text.clone() },
            Prop::Territory { color, .. } => Mark::Territory { color: *color },
            Prop::Dead { .. } => Mark::Dead,
            _ => continue,
        };
        markup.push(coord, mark);
    }

    if let Some(pending) = pending.filter(|p| p.node_id == node.id) {
        if let Some(coord) = pending.loc.coord() {
            markup.push(
                coord,
                Mark::Pending {
                    color: pending.color,
                },
            );
        }
    }

    markup
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Games and challenges

use super::Navigation;
use crate::error::ClientError;
use crate::state::{AppState, Challenge, GameRecord};
use chrono::{DateTime, Utc};
use kgsgo_core::{Color, GameTree, Location, PendingMove, Prop, SgfEvent};
use kgsgo_network::messages::{Clocks, GameAction, Proposal};
use kgsgo_network::{ChannelId, GameSummary, User};
use std::sync::Arc;

fn game_mut(state: &mut AppState, channel_id: ChannelId) -> Option<&mut GameRecord> {
    match state.games.get_mut(&channel_id) {
        Some(game) => Some(Arc::make_mut(game)),
        None => {
            tracing::debug!(channel_id, "message for a game that is not joined");
            None
        }
    }
}

fn challenge_mut(state: &mut AppState, channel_id: ChannelId) -> &mut Challenge {
    let challenge = state
        .challenges
        .entry(channel_id)
        .or_insert_with(|| Arc::new(Challenge::new(channel_id)));
    Arc::make_mut(challenge)
}

/// Rebuild the record from the full event list. A re-join keeps the record
/// id so views keyed on it survive.
pub(super) fn game_join(
    mut state: AppState,
    channel_id: ChannelId,
    summary: &GameSummary,
    users: &[User],
    events: &[SgfEvent],
    at: DateTime<Utc>,
) -> Result<AppState, ClientError> {
    let tree = GameTree::from_events(events, at)?;
    let id = match state.games.get(&channel_id) {
        Some(existing) => existing.id,
        None => state.ids.next_id(),
    };
    tracing::info!(channel_id, id, nodes = tree.len(), "joined game");

    let record = GameRecord {
        id,
        channel_id,
        summary: summary.clone(),
        users: users.iter().map(|u| (u.name.clone(), u.clone())).collect(),
        tree: Arc::new(tree),
        actions: Vec::new(),
        clocks: Clocks::default(),
        over: false,
        undo_requested: false,
        review: None,
    };
    state.games.insert(channel_id, Arc::new(record));
    Ok(state)
}

/// Whether `event` settles an outstanding optimistic move
fn confirms(pending: &PendingMove, event: &SgfEvent) -> bool {
    let has_move = |props: &[Prop]| props.iter().any(|p| matches!(p, Prop::Move { .. }));
    match event {
        SgfEvent::ChildAdded { node_id, .. } => *node_id == pending.node_id,
        SgfEvent::PropAdded { node_id, prop } | SgfEvent::PropChanged { node_id, prop } => {
            *node_id == pending.node_id && has_move(std::slice::from_ref(prop))
        }
        SgfEvent::PropGroupAdded { node_id, props } => {
            *node_id == pending.node_id && has_move(props)
        }
        SgfEvent::Activated { node_id, .. } => *node_id != pending.node_id,
        _ => false,
    }
}

pub(super) fn game_update(
    mut state: AppState,
    channel_id: ChannelId,
    events: &[SgfEvent],
    at: DateTime<Utc>,
) -> Result<AppState, ClientError> {
    let Some(game) = game_mut(&mut state, channel_id) else {
        return Ok(state);
    };
    let tree = Arc::make_mut(&mut game.tree);

    let mut settled = false;
    for event in events {
        tree.apply_event(event, at)?;
        if let Some(pending) = tree.pending() {
            if confirms(pending, event) {
                settled = true;
            }
        }
    }
    if settled {
        tracing::debug!(channel_id, "pending move settled by server");
        tree.set_pending(None)?;
    }
    Ok(state)
}

pub(super) fn game_state(
    mut state: AppState,
    channel_id: ChannelId,
    actions: &[GameAction],
    clocks: &Clocks,
    over: bool,
) -> AppState {
    if let Some(game) = game_mut(&mut state, channel_id) {
        game.actions = actions.to_vec();
        game.clocks = *clocks;
        if over && !game.over {
            tracing::info!(channel_id, "game over");
        }
        game.over = over;
    }
    state
}

pub(super) fn game_review(
    mut state: AppState,
    channel_id: ChannelId,
    review: &GameSummary,
) -> AppState {
    if let Some(game) = game_mut(&mut state, channel_id) {
        game.review = Some(review.clone());
    }
    state
}

pub(super) fn undo_request(mut state: AppState, channel_id: ChannelId) -> AppState {
    if let Some(game) = game_mut(&mut state, channel_id) {
        game.undo_requested = true;
    }
    state
}

pub(super) fn undo_answered(mut state: AppState, channel_id: ChannelId) -> AppState {
    if let Some(game) = game_mut(&mut state, channel_id) {
        game.undo_requested = false;
    }
    state
}

pub(super) fn challenge_join(
    mut state: AppState,
    channel_id: ChannelId,
    summary: Option<&GameSummary>,
    users: &[User],
) -> AppState {
    let challenge = challenge_mut(&mut state, channel_id);
    if let Some(summary) = summary {
        challenge.summary = Some(summary.clone());
    }
    challenge.users = users.iter().map(|u| (u.name.clone(), u.clone())).collect();
    state
}

pub(super) fn challenge_proposal(
    mut state: AppState,
    channel_id: ChannelId,
    proposal: &Proposal,
) -> AppState {
    let challenge = challenge_mut(&mut state, channel_id);
    challenge.proposal = Some(proposal.clone());
    challenge.declined = false;
    state
}

pub(super) fn challenge_submit(
    mut state: AppState,
    channel_id: ChannelId,
    proposal: &Proposal,
) -> AppState {
    let challenge = challenge_mut(&mut state, channel_id);
    if !challenge.submissions.contains(proposal) {
        challenge.submissions.push(proposal.clone());
    }
    state
}

pub(super) fn challenge_decline(mut state: AppState, channel_id: ChannelId) -> AppState {
    challenge_mut(&mut state, channel_id).declined = true;
    state
}

pub(super) fn challenge_final(
    mut state: AppState,
    channel_id: ChannelId,
    game_channel_id: ChannelId,
) -> AppState {
    tracing::info!(channel_id, game_channel_id, "challenge accepted");
    challenge_mut(&mut state, channel_id).game_channel_id = Some(game_channel_id);
    state
}

/// Mark a move as sent on the live node
pub(super) fn set_pending(
    mut state: AppState,
    channel_id: ChannelId,
    color: Color,
    loc: Location,
) -> Result<AppState, ClientError> {
    if let Some(game) = game_mut(&mut state, channel_id) {
        let tree = Arc::make_mut(&mut game.tree);
        let pending = PendingMove {
            node_id: tree.active(),
            color,
            loc,
        };
        tree.set_pending(Some(pending))?;
    }
    Ok(state)
}

pub(super) fn clear_pending(
    mut state: AppState,
    channel_id: ChannelId,
) -> Result<AppState, ClientError> {
    if let Some(game) = game_mut(&mut state, channel_id) {
        if game.tree.pending().is_some() {
            Arc::make_mut(&mut game.tree).set_pending(None)?;
        }
    }
    Ok(state)
}

pub(super) fn navigate(
    mut state: AppState,
    channel_id: ChannelId,
    to: Navigation,
) -> Result<AppState, ClientError> {
    let Some(game) = game_mut(&mut state, channel_id) else {
        return Ok(state);
    };
    if let Navigation::Jump(node_id) = to {
        if !game.tree.contains(node_id) {
            tracing::debug!(channel_id, node_id = %node_id, "no such node to jump to");
            return Ok(state);
        }
    }

    let tree = Arc::make_mut(&mut game.tree);
    match to {
        Navigation::Jump(node_id) => tree.set_current(node_id)?,
        Navigation::Next => {
            tree.next()?;
        }
        Navigation::Prev => {
            tree.prev()?;
        }
        Navigation::Live => tree.follow_active()?,
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgsgo_core::NodeId;

    #[test]
    fn activation_elsewhere_settles() {
        let pending = PendingMove {
            node_id: NodeId(3),
            color: Color::Black,
            loc: Location::point(2, 2),
        };
        let activate = |id| SgfEvent::Activated {
            node_id: NodeId(id),
            prev_node_id: None,
        };
        assert!(confirms(&pending, &activate(4)));
        assert!(!confirms(&pending, &activate(3)));
        assert!(confirms(
            &pending,
            &SgfEvent::ChildAdded {
                node_id: NodeId(3),
                child_node_id: NodeId(4),
                position: None
            }
        ));
        assert!(!confirms(
            &pending,
            &SgfEvent::PropAdded {
                node_id: NodeId(3),
                prop: Prop::Comment {
                    text: "alice: hi".into()
                }
            }
        ));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structural edit events and how they change the tree

use super::{compute, GameTree, NodeId};
use crate::{ChatLine, CoreError, Prop};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One structural edit to a game record, as streamed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SgfEvent {
    /// Append one property to a node
    #[serde(rename_all = "camelCase")]
    PropAdded {
        /// Target node
        node_id: NodeId,
        /// New property
        prop: Prop,
    },
    /// Append several properties to a node
    #[serde(rename_all = "camelCase")]
    PropGroupAdded {
        /// Target node
        node_id: NodeId,
        /// New properties
        props: Vec<Prop>,
    },
    /// Remove properties matching one property's identity
    #[serde(rename_all = "camelCase")]
    PropRemoved {
        /// Target node
        node_id: NodeId,
        /// Property to match
        prop: Prop,
    },
    /// Remove properties matching any of several identities
    #[serde(rename_all = "camelCase")]
    PropGroupRemoved {
        /// Target node
        node_id: NodeId,
        /// Properties to match
        props: Vec<Prop>,
    },
    /// Replace the property with the same identity
    #[serde(rename_all = "camelCase")]
    PropChanged {
        /// Target node
        node_id: NodeId,
        /// Replacement property
        prop: Prop,
    },
    /// Replace a node's child order
    #[serde(rename_all = "camelCase")]
    ChildrenReordered {
        /// Parent node
        node_id: NodeId,
        /// New child order
        children: Vec<NodeId>,
    },
    /// Create a child node
    #[serde(rename_all = "camelCase")]
    ChildAdded {
        /// Parent node
        node_id: NodeId,
        /// New child id
        child_node_id: NodeId,
        /// Insert position among siblings, default last
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
    },
    /// Move the live position
    #[serde(rename_all = "camelCase")]
    Activated {
        /// New active node
        node_id: NodeId,
        /// Previously active node, as the server saw it
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prev_node_id: Option<NodeId>,
    },
    /// Event kinds this client does not model
    #[serde(other)]
    Unsupported,
}

pub(super) fn apply(
    tree: &mut GameTree,
    event: &SgfEvent,
    received_at: DateTime<Utc>,
) -> Result<(), CoreError> {
    match event {
        SgfEvent::PropAdded { node_id, prop } => {
            add_props(tree, *node_id, std::slice::from_ref(prop), received_at);
            refresh_node(tree, *node_id)
        }
        SgfEvent::PropGroupAdded { node_id, props } => {
            add_props(tree, *node_id, props, received_at);
            refresh_node(tree, *node_id)
        }
        SgfEvent::PropRemoved { node_id, prop } => {
            remove_props(tree, *node_id, std::slice::from_ref(prop));
            refresh_node(tree, *node_id)
        }
        SgfEvent::PropGroupRemoved { node_id, props } => {
            remove_props(tree, *node_id, props);
            refresh_node(tree, *node_id)
        }
        SgfEvent::PropChanged { node_id, prop } => {
            change_prop(tree, *node_id, prop, received_at);
            refresh_node(tree, *node_id)
        }
        SgfEvent::ChildrenReordered { node_id, children } => {
            reorder_children(tree, *node_id, children)
        }
        SgfEvent::ChildAdded {
            node_id,
            child_node_id,
            position,
        } => add_child(tree, *node_id, *child_node_id, *position),
        SgfEvent::Activated { node_id, .. } => activate(tree, *node_id),
        SgfEvent::Unsupported => {
            tracing::debug!("ignoring unsupported game tree event");
            Ok(())
        }
    }
}

fn add_props(tree: &mut GameTree, node_id: NodeId, props: &[Prop], received_at: DateTime<Utc>) {
    for prop in props {
        if let Prop::Comment { text } = prop {
            attach_chat(tree, node_id, text, received_at);
        }
    }
    tree.node_mut(node_id).props.extend(props.iter().cloned());
}

fn remove_props(tree: &mut GameTree, node_id: NodeId, props: &[Prop]) {
    let node = tree.node_mut(node_id);
    let before = node.props.len();
    node.props
        .retain(|existing| !props.iter().any(|gone| gone.matches(existing)));
    tracing::trace!(
        node_id = %node_id,
        removed = before - node.props.len(),
        "removed properties"
    );
}

/// Comments only ever grow: the server resends the whole accumulated text,
/// and only the part not seen yet is kept as a new property.
fn change_prop(tree: &mut GameTree, node_id: NodeId, prop: &Prop, received_at: DateTime<Utc>) {
    if let Prop::Comment { text } = prop {
        let seen: String = tree
            .node_mut(node_id)
            .props
            .iter()
            .filter_map(|p| match p {
                Prop::Comment { text } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        let fresh = text.strip_prefix(seen.as_str()).unwrap_or(text.as_str());
        if !fresh.is_empty() {
            let addition = Prop::Comment {
                text: fresh.to_string(),
            };
            add_props(tree, node_id, std::slice::from_ref(&addition), received_at);
        }
        return;
    }

    let node = tree.node_mut(node_id);
    match node.props.iter_mut().find(|existing| existing.matches(prop)) {
        Some(existing) => *existing = prop.clone(),
        None => node.props.push(prop.clone()),
    }
}

fn attach_chat(tree: &mut GameTree, node_id: NodeId, text: &str, received_at: DateTime<Utc>) {
    let lines = ChatLine::parse_comment(text, received_at);
    if !lines.is_empty() {
        tree.messages.entry(node_id).or_default().extend(lines);
    }
}

/// Drop the cache from `node_id` down and rebuild the line through it.
/// Nodes not yet linked under the root stay uncomputed until their parent
/// link arrives.
fn refresh_node(tree: &mut GameTree, node_id: NodeId) -> Result<(), CoreError> {
    tree.invalidate_from(node_id);
    compute_if_rooted(tree, node_id)
}

fn compute_if_rooted(tree: &mut GameTree, node_id: NodeId) -> Result<(), CoreError> {
    if !tree.is_ancestor(tree.root, node_id) {
        tracing::trace!(node_id = %node_id, "node not linked to the root yet");
        return Ok(());
    }
    compute::compute_states(tree, node_id)
}

fn reorder_children(
    tree: &mut GameTree,
    node_id: NodeId,
    children: &[NodeId],
) -> Result<(), CoreError> {
    let linked: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|child| link_child(tree, node_id, *child))
        .collect();
    tree.node_mut(node_id).children = linked;
    if tree.current_line.contains(&node_id) {
        tree.refresh_current_line()?;
    }
    Ok(())
}

fn add_child(
    tree: &mut GameTree,
    node_id: NodeId,
    child: NodeId,
    position: Option<usize>,
) -> Result<(), CoreError> {
    if !link_child(tree, node_id, child) {
        return Ok(());
    }
    let siblings = &mut tree.node_mut(node_id).children;
    if siblings.contains(&child) {
        return Ok(());
    }
    let at = position.unwrap_or(siblings.len()).min(siblings.len());
    siblings.insert(at, child);

    if tree.current_line.contains(&node_id) || tree.current_line.contains(&child) {
        tree.refresh_current_line()?;
    }
    Ok(())
}

/// Give `child` its parent. Refuses links that would re-parent a node or
/// close a cycle.
fn link_child(tree: &mut GameTree, parent: NodeId, child: NodeId) -> bool {
    tree.ensure_node(parent);
    if tree.is_ancestor(child, parent) {
        tracing::warn!(parent = %parent, child = %child, "refusing cyclic child link");
        return false;
    }
    let existing = tree.node_mut(child).parent;
    match existing {
        None => {
            tree.node_mut(child).parent = Some(parent);
            // anything cached for the node was computed as if it were a root
            tree.invalidate_from(child);
            true
        }
        Some(existing) if existing == parent => true,
        Some(existing) => {
            tracing::warn!(
                child = %child,
                parent = %parent,
                existing = %existing,
                "child already has a different parent"
            );
            false
        }
    }
}

fn activate(tree: &mut GameTree, node_id: NodeId) -> Result<(), CoreError> {
    tree.ensure_node(node_id);
    let previous = tree.active;
    tree.active = node_id;
    if tree.current == previous {
        tree.current = node_id;
        if !tree.current_line.contains(&node_id) {
            tree.refresh_current_line()?;
        }
    }
    compute_if_rooted(tree, node_id)
}

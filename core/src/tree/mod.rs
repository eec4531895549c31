// SPDX-License-Identifier: MIT OR Apache-2.0

//! Game tree rebuilt from the server's structural edit events
//!
//! The tree keeps:
//! - an arena of nodes indexed by server node id
//! - a cache of derived per-node state (board, captures, clocks, markup)
//! - per-node chat lines split out of `COMMENT` properties
//! - the active node (live position), the current node (what the viewer
//!   looks at) and the current line through the current node
//!
//! Cached state forms a prefix along every line: editing a node drops the
//! cache for that node and everything below it.

use crate::{Color, CoreError, Location, Prop};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

mod compute;
mod events;
mod state;

pub use events::SgfEvent;
pub use state::{ChatLine, Clock, Mark, MarkedPoint, Markup, NodeState, TimeLeft};

/// Server-assigned node identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One position in the game record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameNode {
    /// Node id
    pub id: NodeId,
    /// Parent node, `None` for the root (or a node not yet linked)
    pub parent: Option<NodeId>,
    /// Child ids; the first child continues the main line
    pub children: Vec<NodeId>,
    /// Properties in arrival order
    pub props: Vec<Prop>,
}

impl GameNode {
    fn new(id: NodeId, parent: Option<NodeId>) -> Self {
        Self {
            id,
            parent,
            children: Vec::new(),
            props: Vec::new(),
        }
    }

    /// The move played at this node, if any
    pub fn played_move(&self) -> Option<(Color, Location)> {
        self.props.iter().find_map(|p| match p {
            Prop::Move { color, loc } => Some((*color, *loc)),
            _ => None,
        })
    }
}

/// An optimistic move the client sent but the server has not confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMove {
    /// Node the move will follow
    pub node_id: NodeId,
    /// Stone color
    pub color: Color,
    /// Target point
    pub loc: Location,
}

/// A game record as a tree of nodes
#[derive(Debug, Clone, Serialize)]
pub struct GameTree {
    /// Node arena
    nodes: Vec<GameNode>,
    /// Node id to arena slot
    #[serde(skip)]
    index: HashMap<NodeId, usize>,
    /// Derived state cache
    states: HashMap<NodeId, Arc<NodeState>>,
    /// Chat split out of comments, per node
    messages: HashMap<NodeId, Vec<ChatLine>>,
    root: NodeId,
    active: NodeId,
    current: NodeId,
    current_line: Vec<NodeId>,
    pending: Option<PendingMove>,
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}

impl GameTree {
    /// Server id of every game record's root node
    pub const ROOT: NodeId = NodeId(0);

    /// Create a tree holding only the root node
    pub fn new() -> Self {
        let root = Self::ROOT;
        Self {
            nodes: vec![GameNode::new(root, None)],
            index: HashMap::from([(root, 0)]),
            states: HashMap::new(),
            messages: HashMap::new(),
            root,
            active: root,
            current: root,
            current_line: vec![root],
            pending: None,
        }
    }

    /// Build a tree by applying `events` in order
    pub fn from_events<'a, I>(
        events: I,
        received_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = &'a SgfEvent>,
    {
        let mut tree = Self::new();
        tree.apply_events(events, received_at)?;
        Ok(tree)
    }

    /// Apply one structural edit event
    pub fn apply_event(
        &mut self,
        event: &SgfEvent,
        received_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), CoreError> {
        events::apply(self, event, received_at)
    }

    /// Apply a sequence of events in order
    pub fn apply_events<'a, I>(
        &mut self,
        events: I,
        received_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = &'a SgfEvent>,
    {
        for event in events {
            events::apply(self, event, received_at)?;
        }
        Ok(())
    }

    /// Compute derived state along the line through `node_id`, resuming
    /// from the deepest cached node, and return the whole cache
    pub fn compute_states(
        &mut self,
        node_id: NodeId,
    ) -> Result<&HashMap<NodeId, Arc<NodeState>>, CoreError> {
        compute::compute_states(self, node_id)?;
        Ok(&self.states)
    }

    /// Root-to-leaf line through `node_id`, continuing below it along
    /// first children
    pub fn line_through(&self, node_id: NodeId) -> Result<Vec<NodeId>, CoreError> {
        compute::line_through(self, node_id)
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Option<&GameNode> {
        self.index.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Whether the tree holds `id`
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Cached derived state for a node
    pub fn state(&self, id: NodeId) -> Option<&Arc<NodeState>> {
        self.states.get(&id)
    }

    /// Chat lines attached to a node
    pub fn messages(&self, id: NodeId) -> &[ChatLine] {
        self.messages.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Live position according to the server
    pub fn active(&self) -> NodeId {
        self.active
    }

    /// Position the viewer is displaying
    pub fn current(&self) -> NodeId {
        self.current
    }

    /// Line through the current node
    pub fn current_line(&self) -> &[NodeId] {
        &self.current_line
    }

    /// Whether the viewer is following live play
    pub fn is_following_active(&self) -> bool {
        self.current == self.active
    }

    /// Rule declaration on the root node, if present
    pub fn rules(&self) -> Option<&crate::GameRules> {
        self.node(self.root)?.props.iter().find_map(|p| match p {
            Prop::Rules(rules) => Some(rules),
            _ => None,
        })
    }

    /// The unconfirmed move, if one is outstanding
    pub fn pending(&self) -> Option<&PendingMove> {
        self.pending.as_ref()
    }

    /// Record or clear the optimistic move and refresh the affected node
    pub fn set_pending(&mut self, pending: Option<PendingMove>) -> Result<(), CoreError> {
        let touched: Vec<NodeId> = self
            .pending
            .iter()
            .chain(pending.iter())
            .map(|p| p.node_id)
            .collect();
        if let Some(p) = &pending {
            if !self.contains(p.node_id) {
                return Err(CoreError::MissingNode(p.node_id));
            }
        }
        self.pending = pending;
        for id in touched {
            if self.contains(id) {
                self.invalidate_from(id);
                compute::compute_states(self, id)?;
            }
        }
        Ok(())
    }

    /// Jump the viewer to `node_id`
    pub fn set_current(&mut self, node_id: NodeId) -> Result<(), CoreError> {
        if !self.contains(node_id) {
            return Err(CoreError::MissingNode(node_id));
        }
        self.current = node_id;
        if !self.current_line.contains(&node_id) {
            self.refresh_current_line()?;
        }
        compute::compute_states(self, node_id)?;
        Ok(())
    }

    /// Step the viewer one node forward along the current line
    pub fn next(&mut self) -> Result<bool, CoreError> {
        self.step(1)
    }

    /// Step the viewer one node back along the current line
    pub fn prev(&mut self) -> Result<bool, CoreError> {
        self.step(-1)
    }

    /// Return the viewer to the live position
    pub fn follow_active(&mut self) -> Result<(), CoreError> {
        self.set_current(self.active)
    }

    fn step(&mut self, delta: isize) -> Result<bool, CoreError> {
        let Some(pos) = self.current_line.iter().position(|id| *id == self.current) else {
            return Err(CoreError::MissingNode(self.current));
        };
        let target = pos as isize + delta;
        if target < 0 || target as usize >= self.current_line.len() {
            return Ok(false);
        }
        let id = self.current_line[target as usize];
        self.set_current(id)?;
        Ok(true)
    }

    /// Arena slot for a node, creating an unlinked node if needed
    fn ensure_node(&mut self, id: NodeId) -> usize {
        if let Some(&slot) = self.index.get(&id) {
            return slot;
        }
        tracing::trace!(node_id = %id, "creating node");
        self.nodes.push(GameNode::new(id, None));
        let slot = self.nodes.len() - 1;
        self.index.insert(id, slot);
        slot
    }

    fn node_mut(&mut self, id: NodeId) -> &mut GameNode {
        let slot = self.ensure_node(id);
        &mut self.nodes[slot]
    }

    /// Drop cached state for `id` and its whole subtree
    fn invalidate_from(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            self.states.remove(&next);
            if let Some(node) = self.node(next) {
                stack.extend(node.children.iter().copied());
            }
        }
    }

    /// Whether `ancestor` lies on the parent chain of `id` (or is `id`)
    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(c) = cursor {
            if c == ancestor {
                return true;
            }
            cursor = self.node(c).and_then(|n| n.parent);
        }
        false
    }

    fn refresh_current_line(&mut self) -> Result<(), CoreError> {
        self.current_line = compute::line_through(self, self.current)?;
        Ok(())
    }
}

impl PartialEq for GameTree {
    fn eq(&self, other: &Self) -> bool {
        self.nodes == other.nodes
            && self.states == other.states
            && self.messages == other.messages
            && self.root == other.root
            && self.active == other.active
            && self.current == other.current
            && self.current_line == other.current_line
            && self.pending == other.pending
    }
}

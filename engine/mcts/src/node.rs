//! MCTS tree node representation.
//!
//! Each node holds a neutral-perspective board reached by firing at `action`
//! from the parent, plus the visit statistics used for PUCT selection.

use games_battleship::BoardState;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Cell fired at by the parent's mover to reach this node
    pub action: usize,

    /// Board from the perspective of the side to move here (always +1)
    pub state: BoardState,

    /// Number of times this node has been visited
    pub visit_count: u32,

    /// Sum of values backpropagated through this node.
    /// Q(s,a) = value_sum / visit_count
    pub value_sum: f32,

    /// Masked oracle prior of `action` at the parent.
    pub prior: f32,

    /// Whether either side has already sunk the whole enemy fleet
    pub is_terminal: bool,

    /// Value backed up from this node when terminal (the negated outcome)
    pub terminal_value: f32,

    /// Children: Vec of (action, NodeId) pairs in insertion order.
    /// Empty until node is expanded.
    pub children: Vec<(usize, NodeId)>,
}

impl MctsNode {
    /// Create a new root node.
    pub fn new_root(state: BoardState) -> Self {
        Self {
            parent: NodeId::NONE,
            action: 0,
            state,
            visit_count: 0,
            value_sum: 0.0,
            prior: 1.0,
            is_terminal: false,
            terminal_value: 0.0,
            children: Vec::new(),
        }
    }

    /// Create a new child node.
    pub fn new_child(
        parent: NodeId,
        action: usize,
        prior: f32,
        state: BoardState,
        is_terminal: bool,
        terminal_value: f32,
    ) -> Self {
        Self {
            parent,
            action,
            state,
            visit_count: 0,
            value_sum: 0.0,
            prior,
            is_terminal,
            terminal_value,
            children: Vec::new(),
        }
    }

    /// Get the mean value (Q-value) of this node.
    /// Returns 0 for unvisited nodes.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.value_sum / self.visit_count as f32
        }
    }

    /// Exploitation term seen from the parent.
    ///
    /// The child's mean lies in [-1, 1] from the opponent's point of view, so
    /// it is mapped to [0, 1] and inverted. Unvisited children score 0.
    #[inline]
    pub fn exploitation(&self) -> f32 {
        if self.visit_count == 0 {
            0.0
        } else {
            1.0 - (self.mean_value() + 1.0) / 2.0
        }
    }

    /// PUCT score of this node as a child:
    /// `Q + c_puct * sqrt(N_parent) / (N + 1) * P`.
    ///
    /// Takes pre-computed sqrt(parent_visits) to avoid redundant sqrt calls
    /// when comparing multiple children.
    #[inline]
    pub fn puct_score(&self, parent_visits_sqrt: f32, c_puct: f32) -> f32 {
        let u = c_puct * parent_visits_sqrt / (self.visit_count as f32 + 1.0) * self.prior;
        self.exploitation() + u
    }

    /// Convenience wrapper around [`MctsNode::puct_score`].
    #[inline]
    pub fn puct_score_with_parent_visits(&self, parent_visits: u32, c_puct: f32) -> f32 {
        self.puct_score((parent_visits as f32).sqrt(), c_puct)
    }

    /// Check if this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }

    /// Check if this is a leaf node (not expanded or terminal).
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_terminal || !self.is_expanded()
    }
}

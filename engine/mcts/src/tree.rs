//! MCTS tree structure with arena allocation.
//!
//! Nodes are stored in a contiguous Vec and referenced by NodeId indices.
//! Parents own their children's ids; the parent id on each node is only
//! followed during backpropagation.

use games_battleship::BoardState;

use crate::node::{MctsNode, NodeId};

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl MctsTree {
    /// Create a new tree with the given neutral root state.
    pub fn new(root_state: BoardState) -> Self {
        Self {
            nodes: vec![MctsNode::new_root(root_state)],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.0 as usize]
    }

    /// Allocate a new node and return its ID.
    pub fn allocate(&mut self, node: MctsNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (never true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Select the child with the highest PUCT score.
    ///
    /// Ties go to the earliest inserted child.
    pub fn select_child(&self, node_id: NodeId, c_puct: f32) -> Option<NodeId> {
        let node = self.get(node_id);
        let parent_visits_sqrt = (node.visit_count as f32).sqrt();

        let mut best: Option<(f32, NodeId)> = None;
        for &(_, child_id) in &node.children {
            let score = self.get(child_id).puct_score(parent_visits_sqrt, c_puct);
            match best {
                Some((best_score, _)) if score <= best_score => {}
                _ => best = Some((score, child_id)),
            }
        }
        best.map(|(_, id)| id)
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        action: usize,
        prior: f32,
        state: BoardState,
        is_terminal: bool,
        terminal_value: f32,
    ) -> NodeId {
        let child = MctsNode::new_child(parent_id, action, prior, state, is_terminal, terminal_value);
        let child_id = self.allocate(child);

        self.get_mut(parent_id).children.push((action, child_id));

        child_id
    }

    /// Backpropagate a value from a leaf to the root.
    /// Value is negated at each level (opponent's perspective).
    pub fn backpropagate(&mut self, leaf_id: NodeId, value: f32) {
        let mut current_id = leaf_id;
        let mut current_value = value;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.visit_count += 1;
            node.value_sum += current_value;

            current_value = -current_value;
            current_id = node.parent;
        }
    }

    /// Most visited root action, first one on ties.
    /// Returns (action, visit_count) or None if root has no children.
    pub fn best_action(&self) -> Option<(usize, u32)> {
        let root = self.get(self.root);
        let mut best: Option<(usize, u32)> = None;
        for &(action, id) in &root.children {
            let visits = self.get(id).visit_count;
            match best {
                Some((_, best_visits)) if visits <= best_visits => {}
                _ => best = Some((action, visits)),
            }
        }
        best
    }

    /// Visit distribution over all `num_actions` cells.
    ///
    /// With temperature 1.0 this is `visits / sum(child visits)`; lower
    /// temperatures sharpen it and 0.0 puts all mass on [`best_action`].
    /// Actions without a child get 0.
    ///
    /// [`best_action`]: MctsTree::best_action
    pub fn root_policy(&self, num_actions: usize, temperature: f32) -> Vec<f32> {
        let root = self.get(self.root);
        let mut policy = vec![0.0; num_actions];

        if root.children.is_empty() {
            return policy;
        }

        if temperature < 1e-6 {
            if let Some((action, _)) = self.best_action() {
                policy[action] = 1.0;
            }
            return policy;
        }

        let visits: Vec<f32> = root
            .children
            .iter()
            .map(|(_, id)| {
                let v = self.get(*id).visit_count as f32;
                if temperature == 1.0 {
                    v
                } else {
                    v.powf(1.0 / temperature)
                }
            })
            .collect();

        let total: f32 = visits.iter().sum();
        if total > 0.0 {
            for ((action, _), &v) in root.children.iter().zip(visits.iter()) {
                policy[*action] = v / total;
            }
        }

        policy
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(self.root, 0),
        }
    }

    fn compute_max_depth(&self, node_id: NodeId, current_depth: u32) -> u32 {
        let node = self.get(node_id);
        if node.children.is_empty() {
            return current_depth;
        }

        node.children
            .iter()
            .map(|(_, id)| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}

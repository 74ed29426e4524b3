//! MCTS tree structure with arena allocation.
//!
//! Nodes live in a contiguous Vec and are referenced by [`NodeId`] indices.
//! The tree does not own a board. Selection and expansion walk a caller's
//! scratch board forward and back with `apply_move`/`undo_move`, so the tree
//! only ever stores columns and counters.
//!
//! Committing a real move re-roots the tree at the matching child and
//! compacts the arena, so only the subtree that is still reachable keeps
//! its memory.

use engine_core::BoardEngine;
use tracing::{debug, trace};

use crate::node::{MctsNode, NodeId};
use crate::rollout::RolloutStats;
use crate::search::SearchError;

/// MCTS tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree {
    /// Arena storing all nodes
    nodes: Vec<MctsNode>,

    /// Root node index (always 0 after construction or re-rooting)
    root: NodeId,
}

impl Default for MctsTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MctsTree {
    /// Create a tree holding a single fresh root.
    pub fn new() -> Self {
        Self {
            nodes: vec![MctsNode::new_root()],
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
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode {
        &mut self.nodes[id.index()]
    }

    /// Allocate a new node and return its ID.
    fn allocate(&mut self, node: MctsNode) -> NodeId {
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

    /// Get the arena slice for read access.
    #[inline]
    pub fn arena(&self) -> &[MctsNode] {
        &self.nodes
    }

    /// Children of a node in move order.
    #[inline]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    /// Add an unexpanded child for `column` under `parent_id`.
    pub fn add_child(&mut self, parent_id: NodeId, column: u8) -> NodeId {
        let parent_player = self.get(parent_id).player;
        let child_id = self.allocate(MctsNode::new_child(parent_id, parent_player, column));
        self.get_mut(parent_id).children.push(child_id);
        child_id
    }

    /// Child of `node_id` with the highest UCB score.
    ///
    /// Ties go to the child that comes first in move order. Returns `None`
    /// for a node without children.
    pub fn select_child(&self, node_id: NodeId, exploration: f64) -> Option<NodeId> {
        let node = self.get(node_id);
        let mut best: Option<(NodeId, f64)> = None;

        for &child_id in &node.children {
            let score = self.get(child_id).ucb_score(node.visits, exploration);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }

        best.map(|(id, _)| id)
    }

    /// Descend from the root to a node without children.
    ///
    /// `board` must hold the root position. Every non-root node on the way
    /// down has its move applied, so on return `board` holds the position of
    /// the returned leaf.
    pub fn select<B: BoardEngine>(
        &self,
        board: &mut B,
        exploration: f64,
    ) -> Result<NodeId, SearchError> {
        let mut current = self.root;
        let mut depth = 0u32;

        loop {
            let node = self.get(current);
            if !node.is_root {
                board
                    .apply_move(node.column, node.player)
                    .map_err(SearchError::InvalidMove)?;
                depth += 1;
            }

            match self.select_child(current, exploration) {
                Some(child_id) => current = child_id,
                None => {
                    trace!(leaf = current.0, depth, "Selected leaf");
                    return Ok(current);
                }
            }
        }
    }

    /// Create children for every legal move from the position in `board`,
    /// marking the ones that end the game.
    ///
    /// Each child's move is applied and undone in turn, leaving `board` as
    /// it was.
    fn populate_children<B: BoardEngine>(
        &mut self,
        node_id: NodeId,
        board: &mut B,
    ) -> Result<(), SearchError> {
        for column in board.legal_moves() {
            let child_id = self.add_child(node_id, column);
            let player = self.get(child_id).player;

            board
                .apply_move(column, player)
                .map_err(SearchError::InvalidMove)?;
            let terminal = board.is_terminal();
            board
                .undo_move(column, player)
                .map_err(SearchError::Desync)?;

            self.get_mut(child_id).terminal = terminal;
        }
        Ok(())
    }

    /// Expand the leaf returned by [`select`](Self::select).
    ///
    /// `board` must hold the leaf's position. Returns the nodes to simulate:
    ///
    /// - a terminal leaf undoes its own move on `board` and returns itself
    ///   once per board column, without creating children;
    /// - otherwise children are created for every legal move, and if any of
    ///   them ends the game only those are returned, else all of them.
    ///
    /// For a non-terminal leaf `board` is left unchanged.
    pub fn expand<B: BoardEngine>(
        &mut self,
        leaf: NodeId,
        board: &mut B,
    ) -> Result<Vec<NodeId>, SearchError> {
        let node = self.get(leaf);

        if node.terminal {
            if node.is_root {
                return Err(SearchError::GameOver);
            }
            board
                .undo_move(node.column, node.player)
                .map_err(SearchError::Desync)?;
            return Ok(vec![leaf; board.width()]);
        }

        if node.is_expanded() {
            return Err(SearchError::InvalidState(format!(
                "node {} is already expanded",
                leaf.0
            )));
        }

        self.populate_children(leaf, board)?;

        let children = &self.get(leaf).children;
        let terminal: Vec<NodeId> = children
            .iter()
            .copied()
            .filter(|&id| self.get(id).terminal)
            .collect();

        trace!(
            leaf = leaf.0,
            children = children.len(),
            terminal = terminal.len(),
            "Expanded node"
        );

        if terminal.is_empty() {
            Ok(children.clone())
        } else {
            Ok(terminal)
        }
    }

    /// Add `stats` to `node_id` and every ancestor.
    ///
    /// `stats` is from the node's player's perspective. Wins and losses swap
    /// at each step up, since the parent's player is the opponent.
    pub fn backpropagate(&mut self, node_id: NodeId, stats: RolloutStats) {
        let mut current_id = node_id;
        let mut current = stats;

        while current_id.is_some() {
            let node = self.get_mut(current_id);
            node.wins += current.wins;
            node.ties += current.ties;
            node.visits += current.total();

            current = current.swapped();
            current_id = node.parent;
        }
    }

    /// Re-root the tree at the child for `column`.
    ///
    /// `board` is the position before the move. An unexpanded root is
    /// expanded first so that any legal column can be committed. Returns the
    /// number of nodes reclaimed.
    pub fn commit_move<B: BoardEngine>(
        &mut self,
        board: &B,
        column: u8,
    ) -> Result<usize, SearchError> {
        let root = self.get(self.root);
        if !root.is_expanded() {
            if root.terminal || board.is_terminal() {
                return Err(SearchError::GameOver);
            }
            let mut scratch = board.clone();
            self.populate_children(self.root, &mut scratch)?;
        }

        let child = self
            .get(self.root)
            .children
            .iter()
            .copied()
            .find(|&id| self.get(id).column == column)
            .ok_or(SearchError::IllegalMove { column })?;

        let reclaimed = self.reroot(child);
        debug!(
            column,
            reclaimed,
            remaining = self.nodes.len(),
            "Re-rooted search tree"
        );
        Ok(reclaimed)
    }

    /// Keep only the subtree under `new_root`, renumbered breadth-first
    /// from index 0.
    fn reroot(&mut self, new_root: NodeId) -> usize {
        let before = self.nodes.len();

        let mut order = vec![new_root];
        let mut next = 0;
        while next < order.len() {
            let id = order[next];
            order.extend(self.get(id).children.iter().copied());
            next += 1;
        }

        let mut remap = vec![NodeId::NONE; before];
        for (new_index, id) in order.iter().enumerate() {
            remap[id.index()] = NodeId(new_index as u32);
        }

        let mut old: Vec<Option<MctsNode>> =
            std::mem::take(&mut self.nodes).into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());

        for id in order {
            let Some(mut node) = old[id.index()].take() else {
                continue;
            };
            if id == new_root {
                node.parent = NodeId::NONE;
                node.is_root = true;
            } else {
                node.parent = remap[node.parent.index()];
            }
            for child in &mut node.children {
                *child = remap[child.index()];
            }
            nodes.push(node);
        }

        self.nodes = nodes;
        self.root = NodeId(0);
        before - self.nodes.len()
    }

    /// Discard everything and start again from a fresh root.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Visits recorded at the root.
    pub fn root_visits(&self) -> u64 {
        self.get(self.root).visits
    }

    /// Win rate of each root child in move order, `None` if unvisited.
    pub fn root_win_rates(&self) -> Vec<(u8, Option<f64>)> {
        self.get(self.root)
            .children
            .iter()
            .map(|&id| {
                let child = self.get(id);
                let rate = (child.visits > 0).then(|| child.win_rate());
                (child.column, rate)
            })
            .collect()
    }

    /// Root child with the highest win rate, first in move order on ties.
    /// Returns None if the root has no children.
    pub fn best_move(&self) -> Option<(u8, &MctsNode)> {
        let mut best: Option<&MctsNode> = None;
        for &id in &self.get(self.root).children {
            let child = self.get(id);
            if best.map_or(true, |b| child.win_rate() > b.win_rate()) {
                best = Some(child);
            }
        }
        best.map(|node| (node.column, node))
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits,
            root_win_rate: root.win_rate(),
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
            .map(|id| self.compute_max_depth(*id, current_depth + 1))
            .max()
            .unwrap_or(current_depth)
    }
}

/// Statistics about an MCTS tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u64,
    pub root_win_rate: f64,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::Player;
    use games_connect4::Connect4Board;

    /// Expand the root of a fresh tree on `board` and return the children.
    fn expanded(board: &Connect4Board) -> (MctsTree, Vec<NodeId>) {
        let mut tree = MctsTree::new();
        let mut scratch = board.clone();
        let leaf = tree.select(&mut scratch, 2.0).unwrap();
        let children = tree.expand(leaf, &mut scratch).unwrap();
        assert_eq!(&scratch, board);
        (tree, children)
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert!(root.is_root);
        assert!(!root.is_expanded());
    }

    #[test]
    fn test_add_child() {
        let mut tree = MctsTree::new();

        let child_id = tree.add_child(tree.root(), 4);

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));
        assert_eq!(tree.get(tree.root()).children, vec![NodeId(1)]);

        let child = tree.get(child_id);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.column, 4);
        assert_eq!(child.player, Player::Red);
    }

    #[test]
    fn test_select_fresh_tree_returns_root() {
        let tree = MctsTree::new();
        let mut board = Connect4Board::new();

        let leaf = tree.select(&mut board, 2.0).unwrap();

        assert_eq!(leaf, tree.root());
        assert_eq!(board, Connect4Board::new());
    }

    #[test]
    fn test_expand_creates_child_per_legal_move() {
        let board = Connect4Board::new();
        let (tree, children) = expanded(&board);

        assert_eq!(children.len(), 7);
        assert_eq!(tree.len(), 8);
        for (i, &id) in children.iter().enumerate() {
            let child = tree.get(id);
            assert_eq!(child.column, i as u8);
            assert_eq!(child.player, Player::Red);
            assert!(!child.terminal);
            assert!(!child.is_root);
        }
    }

    #[test]
    fn test_expand_skips_full_columns() {
        let board = Connect4Board::from_moves(&[2, 2, 2, 2, 2, 2]).unwrap();
        let (tree, children) = expanded(&board);

        let columns: Vec<u8> = children.iter().map(|&id| tree.get(id).column).collect();
        assert_eq!(columns, vec![0, 1, 3, 4, 5, 6]);
    }

    #[test]
    fn test_expand_returns_only_terminal_children() {
        // Red to move, column 3 completes the bottom row
        let board = Connect4Board::from_moves(&[0, 0, 1, 1, 2, 6]).unwrap();
        let (tree, targets) = expanded(&board);

        assert_eq!(targets.len(), 1);
        assert_eq!(tree.get(targets[0]).column, 3);
        assert!(tree.get(targets[0]).terminal);

        // All seven children still exist
        assert_eq!(tree.get(tree.root()).children.len(), 7);
    }

    #[test]
    fn test_expand_terminal_leaf_requeues_itself() {
        let board = Connect4Board::from_moves(&[0, 0, 1, 1, 2, 6]).unwrap();
        let (mut tree, targets) = expanded(&board);
        let winning = targets[0];

        // Simulated once, so selection now prefers it
        tree.backpropagate(winning, RolloutStats::new(4, 0, 0));

        let mut scratch = board.clone();
        let leaf = tree.select(&mut scratch, 2.0).unwrap();
        assert_eq!(leaf, winning);
        assert_eq!(scratch.winner(), Some(Player::Red));

        let requeued = tree.expand(leaf, &mut scratch).unwrap();
        assert_eq!(requeued, vec![winning; 7]);
        assert!(tree.get(winning).children.is_empty());
        // Leaf's own move has been taken back
        assert_eq!(scratch, board);

        // Still childless on the next visit
        let leaf = tree.select(&mut scratch, 2.0).unwrap();
        assert_eq!(tree.expand(leaf, &mut scratch).unwrap().len(), 7);
        assert!(tree.get(winning).children.is_empty());
        assert_eq!(tree.len(), 8);
    }

    #[test]
    fn test_expand_twice_is_invalid_state() {
        let board = Connect4Board::new();
        let (mut tree, _) = expanded(&board);
        let mut scratch = board.clone();

        let err = tree.expand(tree.root(), &mut scratch).unwrap_err();
        assert!(matches!(err, SearchError::InvalidState(_)));
    }

    #[test]
    fn test_select_child_first_max_wins_ties() {
        let board = Connect4Board::new();
        let (mut tree, children) = expanded(&board);

        // All unvisited: every score is 0, first child wins
        assert_eq!(tree.select_child(tree.root(), 2.0), Some(children[0]));

        // Equal stats on two children: earlier one wins
        tree.backpropagate(children[2], RolloutStats::new(3, 0, 1));
        tree.backpropagate(children[5], RolloutStats::new(3, 0, 1));
        assert_eq!(tree.select_child(tree.root(), 2.0), Some(children[2]));

        // Better win rate on the later one, compared without exploration
        tree.backpropagate(children[5], RolloutStats::new(4, 0, 0));
        assert_eq!(tree.select_child(tree.root(), 0.0), Some(children[5]));
    }

    #[test]
    fn test_select_child_prefers_visited_over_unvisited() {
        let board = Connect4Board::new();
        let (mut tree, children) = expanded(&board);

        // Even an all-loss child scores above zero once the exploration
        // bonus kicks in
        tree.backpropagate(children[6], RolloutStats::new(0, 0, 5));
        tree.backpropagate(children[1], RolloutStats::new(0, 0, 5));
        assert_eq!(tree.select_child(tree.root(), 2.0), Some(children[1]));

        // Without exploration the zero-win children tie with unvisited ones
        assert_eq!(tree.select_child(tree.root(), 0.0), Some(children[0]));
    }

    #[test]
    fn test_select_applies_path_moves() {
        let board = Connect4Board::new();
        let (mut tree, children) = expanded(&board);

        tree.backpropagate(children[3], RolloutStats::new(5, 0, 0));
        let mut scratch = board.clone();
        let leaf = tree.select(&mut scratch, 2.0).unwrap();

        assert_eq!(leaf, children[3]);
        assert_eq!(scratch, Connect4Board::from_moves(&[3]).unwrap());

        let grandchildren = tree.expand(leaf, &mut scratch).unwrap();
        assert_eq!(grandchildren.len(), 7);
        assert!(grandchildren
            .iter()
            .all(|&id| tree.get(id).player == Player::Yellow));
        assert_eq!(scratch, Connect4Board::from_moves(&[3]).unwrap());
    }

    #[test]
    fn test_backpropagate_swaps_perspective() {
        let mut tree = MctsTree::new();

        // Create a chain: root -> child -> grandchild
        let child_id = tree.add_child(tree.root(), 0);
        let grandchild_id = tree.add_child(child_id, 1);

        tree.backpropagate(grandchild_id, RolloutStats::new(3, 1, 2));

        let grandchild = tree.get(grandchild_id);
        assert_eq!((grandchild.wins, grandchild.ties, grandchild.visits), (3, 1, 6));

        let child = tree.get(child_id);
        assert_eq!((child.wins, child.ties, child.visits), (2, 1, 6));
        assert_eq!(child.losses(), 3);

        let root = tree.get(tree.root());
        assert_eq!((root.wins, root.ties, root.visits), (3, 1, 6));
    }

    #[test]
    fn test_commit_move_reroots_and_compacts() {
        let board = Connect4Board::new();
        let (mut tree, children) = expanded(&board);

        // Grow a second level under columns 0 and 2
        for &col in &[0usize, 2] {
            let mut scratch = Connect4Board::from_moves(&[col as u8]).unwrap();
            tree.expand(children[col], &mut scratch).unwrap();
        }
        tree.backpropagate(children[2], RolloutStats::new(2, 0, 1));
        assert_eq!(tree.len(), 1 + 7 + 7 + 7);

        let reclaimed = tree.commit_move(&board, 2).unwrap();

        assert_eq!(reclaimed, 1 + 7 + 7 - 1);
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.root(), NodeId(0));

        assert_eq!(tree.children_of(tree.root()).len(), 7);
        let root = tree.get(tree.root());
        assert!(root.is_root);
        assert!(root.parent.is_none());
        assert_eq!(root.column, 2);
        assert_eq!(root.player, Player::Red);
        assert_eq!(root.visits, 3);

        // Exactly one root, and every child points back at a live parent
        assert_eq!(tree.arena().iter().filter(|n| n.is_root).count(), 1);
        for &id in &root.children {
            let child = tree.get(id);
            assert_eq!(child.parent, tree.root());
            assert_eq!(child.player, Player::Yellow);
        }
    }

    #[test]
    fn test_commit_move_on_unexpanded_root() {
        let mut tree = MctsTree::new();
        let board = Connect4Board::new();

        let reclaimed = tree.commit_move(&board, 5).unwrap();

        assert_eq!(reclaimed, 7);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(tree.root()).column, 5);
        assert_eq!(tree.get(tree.root()).player, Player::Red);
    }

    #[test]
    fn test_commit_illegal_column() {
        let board = Connect4Board::from_moves(&[1, 1, 1, 1, 1, 1]).unwrap();
        let mut tree = MctsTree::new();

        assert!(matches!(
            tree.commit_move(&board, 1),
            Err(SearchError::IllegalMove { column: 1 })
        ));
        assert!(matches!(
            tree.commit_move(&board, 9),
            Err(SearchError::IllegalMove { column: 9 })
        ));
    }

    #[test]
    fn test_commit_on_finished_game() {
        let board = Connect4Board::from_moves(&[0, 0, 1, 1, 2, 2, 3]).unwrap();
        let mut tree = MctsTree::new();

        assert!(matches!(
            tree.commit_move(&board, 4),
            Err(SearchError::GameOver)
        ));
    }

    #[test]
    fn test_reset() {
        let board = Connect4Board::new();
        let (mut tree, children) = expanded(&board);
        tree.backpropagate(children[0], RolloutStats::new(1, 0, 0));

        tree.reset();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root_visits(), 0);
        assert_eq!(tree.get(tree.root()).player, MctsNode::ROOT_PLAYER);
    }

    #[test]
    fn test_root_win_rates_and_best_move() {
        let board = Connect4Board::new();
        let (mut tree, children) = expanded(&board);

        assert!(tree.root_win_rates().iter().all(|(_, r)| r.is_none()));
        // Nothing visited: first child
        assert_eq!(tree.best_move().map(|(c, _)| c), Some(0));

        tree.backpropagate(children[1], RolloutStats::new(1, 0, 3));
        tree.backpropagate(children[4], RolloutStats::new(3, 0, 1));
        tree.backpropagate(children[6], RolloutStats::new(6, 0, 2));

        let rates = tree.root_win_rates();
        assert_eq!(rates.len(), 7);
        assert_eq!(rates[0], (0, None));
        assert_eq!(rates[1], (1, Some(0.25)));

        // Columns 4 and 6 tie at 0.75, so 4 wins
        let (column, node) = tree.best_move().unwrap();
        assert_eq!(column, 4);
        assert_eq!(node.visits, 4);
    }

    #[test]
    fn test_tree_stats() {
        let board = Connect4Board::new();
        let (mut tree, children) = expanded(&board);
        let mut scratch = Connect4Board::from_moves(&[3]).unwrap();
        tree.expand(children[3], &mut scratch).unwrap();

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 15);
        assert_eq!(stats.max_depth, 2);
        assert_eq!(stats.root_visits, 0);
    }
}

//! MCTS tree node representation.
//!
//! Each node represents the position reached by dropping a piece into
//! `column` from the parent position. Statistics are kept from the point of
//! view of `player`, the side that made that move.

use engine_core::Player;

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

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// A node in the MCTS tree.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Column that led to this node from parent. Meaningless for a fresh root.
    pub column: u8,

    /// Children in legal-move order. Empty until the node is expanded.
    pub children: Vec<NodeId>,

    /// Rollouts won by `player`
    pub wins: u64,

    /// Rollouts that filled the board
    pub ties: u64,

    /// Every rollout counted here: wins + ties + losses
    pub visits: u64,

    /// Position is decided or drawn. Set once during expansion.
    pub terminal: bool,

    /// Represents the live position; selection does not replay its move
    pub is_root: bool,

    /// Player who made the move leading here
    pub player: Player,
}

impl MctsNode {
    /// Player fixed on a fresh root, so that its children are first-player moves.
    pub const ROOT_PLAYER: Player = Player::Yellow;

    /// Create a new root node.
    pub fn new_root() -> Self {
        Self {
            parent: NodeId::NONE,
            column: 0,
            children: Vec::new(),
            wins: 0,
            ties: 0,
            visits: 0,
            terminal: false,
            is_root: true,
            player: Self::ROOT_PLAYER,
        }
    }

    /// Create a new unexpanded child. Its player is always the parent's opponent.
    pub fn new_child(parent: NodeId, parent_player: Player, column: u8) -> Self {
        Self {
            parent,
            column,
            children: Vec::new(),
            wins: 0,
            ties: 0,
            visits: 0,
            terminal: false,
            is_root: false,
            player: parent_player.opponent(),
        }
    }

    /// Rollouts lost by `player`.
    #[inline]
    pub fn losses(&self) -> u64 {
        self.visits - self.wins - self.ties
    }

    /// Observed win rate. Returns 0.0 if never visited.
    #[inline]
    pub fn win_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins as f64 / self.visits as f64
        }
    }

    /// Upper-confidence score used by the parent to choose among children.
    ///
    /// `wins / visits + exploration * sqrt(ln(parent_visits) / visits)`
    ///
    /// An unvisited child scores 0 rather than infinity, so it is picked only
    /// when no visited sibling scores higher. With `parent_visits == 0` the
    /// logarithm is undefined and the exploration term is taken as 0.
    #[inline]
    pub fn ucb_score(&self, parent_visits: u64, exploration: f64) -> f64 {
        if self.visits == 0 {
            return 0.0;
        }
        let visits = self.visits as f64;
        let explore = if parent_visits == 0 {
            0.0
        } else {
            exploration * ((parent_visits as f64).ln() / visits).sqrt()
        };
        self.wins as f64 / visits + explore
    }

    /// Check if this node has been expanded (has children).
    #[inline]
    pub fn is_expanded(&self) -> bool {
        !self.children.is_empty()
    }
}

use std::collections::HashMap;

use chess_core::{Board, ChessMove};

use crate::error::{MctsError, Result};

/// Node ID in the arena-style tree
pub type NodeId = usize;

/// A move out of a node. Several edges may point at the same node when
/// positions transpose.
#[derive(Debug, Clone)]
pub struct Edge {
    pub mv: ChessMove,
    pub child: NodeId,
    /// Simulations that went through this edge
    pub visits: u32,
}

/// A single node in the MCTS tree
#[derive(Debug, Clone)]
pub struct MctsNode {
    pub board: Board,

    /// Transposition key of `board`
    pub key: String,

    /// Parent at first discovery (None for root). Backup follows the
    /// simulation path instead, since a transposed node has several parents.
    #[allow(dead_code)]
    pub parent: Option<NodeId>,

    /// Outgoing moves in generation order
    pub children: Vec<Edge>,

    pub visit_count: u32,

    /// Sum of backed-up values, from the perspective of the player who
    /// moved into this node
    pub total_value: f64,

    pub prior_probability: f64,

    pub is_terminal: bool,

    pub is_expanded: bool,

    /// Value for the side to move when the node is terminal: -1 checkmate,
    /// 0 stalemate
    pub terminal_value: Option<f64>,

    /// Priors of the legal moves from the node's last evaluation, consumed
    /// when the node is expanded
    pub pending_priors: Option<Vec<(ChessMove, f64)>>,
}

impl MctsNode {
    fn new(board: Board, parent: Option<NodeId>, prior: f64) -> Self {
        let terminal_value = if board.is_checkmate {
            Some(-1.0)
        } else if board.is_stalemate {
            Some(0.0)
        } else {
            None
        };
        Self {
            key: board.board_key(),
            board,
            parent,
            children: Vec::new(),
            visit_count: 0,
            total_value: 0.0,
            prior_probability: prior,
            is_terminal: terminal_value.is_some(),
            is_expanded: false,
            terminal_value,
            pending_priors: None,
        }
    }

    /// Create a new root node
    pub fn new_root(board: Board) -> Self {
        Self::new(board, None, 1.0)
    }

    /// Create a new child node
    pub fn new_child(board: Board, parent: NodeId, prior: f64) -> Self {
        Self::new(board, Some(parent), prior)
    }

    /// Get Q-value (average value)
    pub fn q_value(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.total_value / self.visit_count as f64
        }
    }
}

/// MCTS tree using arena allocation, with an index from transposition key
/// to node so a position reached by different move orders is stored once.
pub struct MctsTree {
    /// Arena of all nodes
    pub nodes: Vec<MctsNode>,

    /// Root node ID (usually 0)
    pub root_id: NodeId,

    index: HashMap<String, NodeId>,
}

impl MctsTree {
    /// Create a new empty tree
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root_id: 0,
            index: HashMap::new(),
        }
    }

    /// Initialize the tree with a root node, discarding everything else
    pub fn initialize_root(&mut self, board: Board) -> NodeId {
        self.clear();
        self.root_id = self.add_node(MctsNode::new_root(board));
        self.root_id
    }

    /// Add a new node and return its ID
    pub fn add_node(&mut self, node: MctsNode) -> NodeId {
        let id = self.nodes.len();
        self.index.insert(node.key.clone(), id);
        self.nodes.push(node);
        id
    }

    /// The node for `board`, creating it under `parent` with `prior` when
    /// the position has not been seen in this search.
    pub fn get_or_insert(&mut self, board: Board, parent: NodeId, prior: f64) -> NodeId {
        match self.index.get(&board.board_key()) {
            Some(&id) => id,
            None => self.add_node(MctsNode::new_child(board, parent, prior)),
        }
    }

    pub fn node(&self, id: NodeId) -> Result<&MctsNode> {
        self.nodes.get(id).ok_or(MctsError::InvalidNodeId(id))
    }

    /// Get the number of nodes in the tree
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node and release the arena's memory
    pub fn clear(&mut self) {
        self.nodes = Vec::new();
        self.index = HashMap::new();
        self.root_id = 0;
    }
}

impl Default for MctsTree {
    fn default() -> Self {
        Self::new()
    }
}

use chess_core::{Board, ChessMove, RulesEngine, StandardRules, POLICY_SIZE};
use rand::distributions::{Distribution, WeightedIndex};
use rand::thread_rng;
use tracing::debug;

use crate::backup::backup;
use crate::cancel::CancelToken;
use crate::config::MctsConfig;
use crate::dirichlet::add_dirichlet_noise_to_root;
use crate::error::{MctsError, Result};
use crate::evaluation::Evaluator;
use crate::expansion::{evaluate_leaf, expand};
use crate::search_result::SearchResult;
use crate::selection::{select_child, select_path};
use crate::tree::{MctsTree, NodeId};

/// Monte Carlo Tree Search over chess positions using the AlphaZero scheme
///
/// The tree lives for one `search` call: it is rebuilt from scratch on the
/// next search and released by `reset`.
pub struct Mcts<R: RulesEngine = StandardRules> {
    tree: MctsTree,
    rules: R,
    cancel: CancelToken,
}

impl Mcts<StandardRules> {
    /// Create a new MCTS instance
    pub fn new() -> Self {
        Self::with_rules(StandardRules)
    }
}

impl<R: RulesEngine> Mcts<R> {
    pub fn with_rules(rules: R) -> Self {
        Self {
            tree: MctsTree::new(),
            rules,
            cancel: CancelToken::new(),
        }
    }

    /// Share a stop flag with this search
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run MCTS search from a given board position
    ///
    /// Returns the chosen move, the visit-count policy and the root value.
    /// Fails on a checkmate or stalemate position, and with
    /// `MctsError::Cancelled` when the token is raised between simulations.
    pub fn search<E: Evaluator + ?Sized>(
        &mut self,
        board: &Board,
        evaluator: &E,
        config: &MctsConfig,
    ) -> Result<SearchResult> {
        // Check if position is already terminal
        if board.is_terminal() {
            return Err(MctsError::TerminalPosition);
        }

        // 1. Initialize and expand the root node
        let root_id = self.initialize_root(board, evaluator)?;

        // 2. Add Dirichlet noise if configured (for self-play)
        if config.add_dirichlet_noise {
            add_dirichlet_noise_to_root(&mut self.tree, root_id, config)?;
        }

        // 3. Run simulations
        let c_puct = config.c_puct as f64;
        for i in 0..config.num_simulations {
            if self.cancel.is_cancelled() {
                debug!(completed = i, "search cancelled");
                return Err(MctsError::Cancelled);
            }
            self.run_simulation(root_id, evaluator, c_puct);
        }

        // 4. Extract results
        self.create_search_result(root_id, config)
    }

    /// Initialize the tree with an expanded root node
    fn initialize_root<E: Evaluator + ?Sized>(
        &mut self,
        board: &Board,
        evaluator: &E,
    ) -> Result<NodeId> {
        let root_id = self.tree.initialize_root(board.clone());
        expand(&mut self.tree, root_id, &self.rules, evaluator);

        if self.tree.node(root_id)?.children.is_empty() {
            return Err(MctsError::NoLegalMoves);
        }
        Ok(root_id)
    }

    /// One selection / expansion / evaluation / backup pass.
    ///
    /// A leaf seen for the first time is evaluated as it stands. A leaf that
    /// has been visited before is expanded, and its most promising child is
    /// evaluated instead.
    fn run_simulation<E: Evaluator + ?Sized>(
        &mut self,
        root_id: NodeId,
        evaluator: &E,
        c_puct: f64,
    ) {
        let mut path = select_path(&self.tree, root_id, c_puct);
        let leaf_id = path[path.len() - 1];
        let leaf = &self.tree.nodes[leaf_id];

        let mut target = leaf_id;
        if !leaf.is_terminal && !leaf.is_expanded && leaf.visit_count > 0 {
            expand(&mut self.tree, leaf_id, &self.rules, evaluator);
            if let Some(edge) = select_child(&self.tree, leaf_id, c_puct) {
                let child = self.tree.nodes[leaf_id].children[edge].child;
                if !path.contains(&child) {
                    path.push(child);
                    target = child;
                }
            }
        }

        let value = evaluate_leaf(&mut self.tree, target, &self.rules, evaluator);
        backup(&mut self.tree, &path, value);
    }

    /// Create search result from root node statistics
    fn create_search_result(&self, root_id: NodeId, config: &MctsConfig) -> Result<SearchResult> {
        let root = self.tree.node(root_id)?;

        let move_visits: Vec<(ChessMove, u32)> =
            root.children.iter().map(|e| (e.mv, e.visits)).collect();
        if move_visits.is_empty() {
            return Err(MctsError::NoLegalMoves);
        }

        // Select best move based on temperature
        let best_move = move_visits[select_move(&move_visits, config.temperature)].0;

        // Create policy distribution (normalized visit counts)
        let total_visits: u32 = move_visits.iter().map(|(_, v)| v).sum();
        let mut policy_distribution = vec![0.0f32; POLICY_SIZE];
        if total_visits > 0 {
            for (mv, visits) in &move_visits {
                policy_distribution[mv.policy_index()] += *visits as f32 / total_visits as f32;
            }
        }

        // Root stats are kept for the opponent of the side to move
        let root_value = -root.q_value();

        Ok(SearchResult {
            best_move,
            policy_distribution,
            root_value,
            num_simulations_run: config.num_simulations,
            root_visit_counts: move_visits,
        })
    }

    /// Reset the tree (release all nodes)
    pub fn reset(&mut self) {
        self.tree.clear();
    }

    /// Get the number of nodes in the tree
    pub fn tree_size(&self) -> usize {
        self.tree.size()
    }
}

impl Default for Mcts<StandardRules> {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the move to play, given root visit counts
///
/// - temperature < 0.01: most visits, first one on ties
/// - otherwise: sample from softmax(ln(visits + 1) / temperature)
fn select_move(move_visits: &[(ChessMove, u32)], temperature: f32) -> usize {
    let argmax = || {
        let mut best = 0;
        for (i, (_, v)) in move_visits.iter().enumerate() {
            if *v > move_visits[best].1 {
                best = i;
            }
        }
        best
    };

    if temperature < 0.01 {
        return argmax();
    }

    let t = temperature as f64;
    let logits: Vec<f64> = move_visits
        .iter()
        .map(|(_, v)| (*v as f64 + 1.0).ln() / t)
        .collect();
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = logits.iter().map(|l| (l - max).exp()).collect();

    match WeightedIndex::new(&weights) {
        Ok(dist) => dist.sample(&mut thread_rng()),
        Err(_) => argmax(),
    }
}

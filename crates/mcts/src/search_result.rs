use chess_core::{ChessMove, Position};

/// Result of MCTS search
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Move chosen under the configured temperature
    pub best_move: ChessMove,

    /// Root visit distribution over the 4096 `from * 64 + to` indices
    pub policy_distribution: Vec<f32>,

    /// Mean backed-up value for the root's side to move
    pub root_value: f64,

    /// Number of simulations actually run
    pub num_simulations_run: u32,

    /// Visits per root move, in generation order
    pub root_visit_counts: Vec<(ChessMove, u32)>,
}

impl SearchResult {
    /// Get the visit count for the root move from `from` to `to`
    pub fn visit_count_for_move(&self, from: Position, to: Position) -> u32 {
        self.root_visit_counts
            .iter()
            .find(|(m, _)| m.from == from && m.to == to)
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }

    /// Get the total number of visits over root moves
    pub fn total_visits(&self) -> u32 {
        self.root_visit_counts.iter().map(|(_, v)| v).sum()
    }
}

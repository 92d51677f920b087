use chess_core::{Board, ChessMove, Color};

/// Result of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWin,
    BlackWin,
    Draw,
}

impl GameResult {
    /// Outcome for `color`: +1 win, -1 loss, 0 draw
    pub fn value_for(self, color: Color) -> f64 {
        match (self, color) {
            (GameResult::Draw, _) => 0.0,
            (GameResult::WhiteWin, Color::White) | (GameResult::BlackWin, Color::Black) => 1.0,
            _ => -1.0,
        }
    }

    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWin,
            Color::Black => GameResult::BlackWin,
        }
    }
}

/// Why a game stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Checkmate,
    Stalemate,
    /// The ply cap was reached
    MoveLimit,
    /// The session was stopped mid-game
    Cancelled,
    /// The search gave up with an error
    Failed,
}

/// Record of a single game
#[derive(Debug, Clone)]
pub struct GameRecord {
    /// Board before each move
    pub states: Vec<Board>,
    /// MCTS policy distribution (4096 elements) at each move
    pub policies: Vec<Vec<f32>>,
    /// Move actually played
    pub moves: Vec<ChessMove>,
    /// Final result of the game
    pub winner: GameResult,
    pub termination: Termination,
}

impl GameRecord {
    /// Create a new empty game record
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            policies: Vec::new(),
            moves: Vec::new(),
            winner: GameResult::Draw,
            termination: Termination::MoveLimit,
        }
    }

    pub fn finish(&mut self, winner: GameResult, termination: Termination) {
        self.winner = winner;
        self.termination = termination;
    }

    /// Add a move to the record
    pub fn add_move(&mut self, state: Board, policy: Vec<f32>, action: ChessMove) {
        self.states.push(state);
        self.policies.push(policy);
        self.moves.push(action);
    }

    /// Get the number of moves in this game
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Check if the record is empty
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn notation(&self) -> Vec<String> {
        self.moves.iter().map(ChessMove::notation).collect()
    }
}

impl Default for GameRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// What a session keeps about a finished game once its record is dropped
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub game_index: u32,
    pub winner: GameResult,
    pub termination: Termination,
    pub num_moves: usize,
    pub moves: Vec<String>,
}

impl GameSummary {
    pub fn from_record(game_index: u32, record: &GameRecord) -> Self {
        Self {
            game_index,
            winner: record.winner,
            termination: record.termination,
            num_moves: record.len(),
            moves: record.notation(),
        }
    }
}

/// Training example for the evaluator
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingExample {
    /// `Board::encode` of the position (14 * 8 * 8 elements)
    pub board_encoding: Vec<f32>,
    /// Root visit distribution (4096 elements)
    pub policy_target: Vec<f32>,
    /// Game outcome for the side to move (-1.0, 0.0 or 1.0)
    pub value_target: f64,
}

impl TrainingExample {
    /// Create a new training example
    pub fn new(board_encoding: Vec<f32>, policy_target: Vec<f32>, value_target: f64) -> Self {
        Self {
            board_encoding,
            policy_target,
            value_target,
        }
    }
}

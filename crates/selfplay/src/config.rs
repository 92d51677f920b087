use chess_mcts::MctsConfig;

/// Configuration for a self-play session
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Games to play per `run`
    pub num_games: u32,

    /// Games played at the same time, each on its own thread
    pub parallel_games: usize,

    /// Ply cap; a game reaching it is scored as a draw
    pub max_moves: u32,

    /// Move-selection temperature for the opening plies
    pub temperature: f32,

    /// Number of plies played at `temperature`
    pub temperature_decay_moves: u32,

    /// Temperature once the opening is over
    pub late_temperature: f32,

    /// Replay buffer capacity in training examples
    pub max_buffer_size: usize,

    /// Finished-game summaries kept around
    pub retained_games: usize,

    /// Search settings; its temperature is overridden per ply
    pub mcts: MctsConfig,
}

impl SelfPlayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_games(mut self, n: u32) -> Self {
        self.num_games = n;
        self
    }

    pub fn with_parallel_games(mut self, n: usize) -> Self {
        self.parallel_games = n.max(1);
        self
    }

    pub fn with_max_moves(mut self, n: u32) -> Self {
        self.max_moves = n;
        self
    }

    /// Set the opening temperature, the ply it lasts for and the temperature after it
    pub fn with_temperature_schedule(mut self, early: f32, decay_moves: u32, late: f32) -> Self {
        self.temperature = early;
        self.temperature_decay_moves = decay_moves;
        self.late_temperature = late;
        self
    }

    pub fn with_max_buffer_size(mut self, n: usize) -> Self {
        self.max_buffer_size = n;
        self
    }

    pub fn with_retained_games(mut self, n: usize) -> Self {
        self.retained_games = n;
        self
    }

    pub fn with_mcts(mut self, mcts: MctsConfig) -> Self {
        self.mcts = mcts;
        self
    }

    /// Temperature for the move played at `ply` (0-based)
    pub fn temperature_for_move(&self, ply: u32) -> f32 {
        if ply < self.temperature_decay_moves {
            self.temperature
        } else {
            self.late_temperature
        }
    }
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            num_games: 10,
            parallel_games: 1,
            max_moves: 500,
            temperature: 1.0,
            temperature_decay_moves: 10,
            late_temperature: 0.1,
            max_buffer_size: 50_000,
            retained_games: 50,
            mcts: MctsConfig::default(),
        }
    }
}

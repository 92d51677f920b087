//! Self-play system for AlphaZero-style reinforcement learning on chess
//!
//! This crate provides functionality for:
//! - Playing self-play games using MCTS through the game state machine
//! - Recording positions, visit policies and outcomes
//! - Converting games to training examples
//! - Running many games at once into a bounded replay buffer
//! - Saving training data to NPY files for Python/PyTorch
//!
//! # Example
//!
//! ```no_run
//! use chess_mcts::{MctsConfig, NoEvaluator};
//! use chess_selfplay::{game_to_training_examples, play_game, save_training_data, SelfPlayConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! // Configure search for self-play
//! let config = SelfPlayConfig::default().with_mcts(
//!     MctsConfig::default()
//!         .with_simulations(200)
//!         .with_dirichlet_noise(0.3, 0.25),
//! );
//!
//! // Play one game without a trained model
//! let record = play_game(&NoEvaluator, &config)?;
//! println!("Game finished with {} moves", record.len());
//!
//! // Convert to training examples
//! let examples = game_to_training_examples(&record);
//!
//! // Save to files
//! save_training_data(&examples, "selfplay_data")?;
//! # Ok(())
//! # }
//! ```

mod config;
mod data;
mod game;
mod session;
pub mod storage;

// Re-export public API
pub use config::SelfPlayConfig;
pub use data::{GameRecord, GameResult, GameSummary, Termination, TrainingExample};
pub use game::{game_to_training_examples, play_game, play_game_with_cancel};
pub use session::{SelfPlaySession, SelfPlayStats};
pub use storage::save_training_data;

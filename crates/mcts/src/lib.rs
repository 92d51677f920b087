//! AlphaZero-style Monte Carlo Tree Search for chess.
//!
//! The search is generic over a [`chess_core::RulesEngine`] and consults an
//! [`Evaluator`] for move priors and position values. Without a working
//! evaluator it falls back to uniform priors and a material estimate.
//!
//! ```
//! use chess_core::Board;
//! use chess_mcts::{Mcts, MctsConfig, NoEvaluator};
//!
//! let mut mcts = Mcts::new();
//! let config = MctsConfig::default().with_simulations(40).with_temperature(0.0);
//! let result = mcts.search(&Board::new(), &NoEvaluator, &config).unwrap();
//! assert_eq!(result.total_visits(), 40);
//! ```

// Module declarations
mod backup;
mod batching;
mod cancel;
mod config;
mod dirichlet;
mod error;
mod evaluation;
mod expansion;
mod mcts;
mod search_result;
mod selection;
mod tree;

// Public exports
pub use batching::BatchingEvaluator;
pub use cancel::CancelToken;
pub use config::MctsConfig;
pub use error::{EvaluatorError, MctsError, Result};
pub use evaluation::{legal_priors, material_value, Evaluator, NoEvaluator, Prediction};
pub use mcts::Mcts;
pub use search_result::SearchResult;

//! Chess rules and interactive game state.
//!
//! Boards are value snapshots: applying a move yields a new [`Board`] and
//! leaves the old one untouched, so a [`Game`] keeps its whole history and
//! search code can branch freely.
//!
//! ```
//! use chess_core::{Game, Position};
//!
//! let mut game = Game::new();
//! assert!(game.select_piece(Position::new(1, 4)));
//! assert!(game.move_piece(Position::new(3, 4)));
//! assert_eq!(game.board().move_history, vec!["e2-e4".to_string()]);
//! ```

// Module declarations
mod board;
mod chess_move;
mod error;
mod game;
pub mod heuristic;
pub mod movegen;
mod record;
pub mod rules;
mod types;

// Public exports
pub use board::{Board, CastlingFlags, Squares, ENCODING_LEN, ENCODING_PLANES};
pub use chess_move::{policy_index, ChessMove, POLICY_SIZE};
pub use error::{CoreError, Result};
pub use game::{Game, GameStatus, Selection, ValidationResult};
pub use record::{GameSnapshot, SavedGame};
pub use rules::{RulesEngine, StandardRules};
pub use types::{Color, Piece, PieceKind, Position};

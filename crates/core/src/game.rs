//! Interactive game state: selection, move entry, undo, replay, resignation
//! and the custom-position builder, all over an append-only history of
//! board snapshots.

use crate::board::Board;
use crate::movegen;
use crate::record::{GameSnapshot, SavedGame};
use crate::rules::{apply_move, build_move};
use crate::types::{Color, Piece, PieceKind, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    /// The builder is open and no game has been started from it yet
    NotStarted,
    InProgress,
    Checkmate { winner: Color },
    Stalemate,
    Resigned { winner: Color },
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        matches!(
            self,
            GameStatus::Checkmate { .. } | GameStatus::Stalemate | GameStatus::Resigned { .. }
        )
    }
}

/// The selected piece and the squares it may legally move to
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub piece: Piece,
    pub legal_moves: Vec<Position>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub reason: Option<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    /// Never empty; the last entry is the current board
    history: Vec<Board>,
    selection: Option<Selection>,
    replay_index: Option<usize>,
    /// Winner by resignation
    resigned: Option<Color>,
    /// Board under construction while the builder is open
    setup: Option<Board>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    /// Starts a game from an arbitrary position
    pub fn from_board(mut board: Board) -> Self {
        board.refresh_status();
        Self {
            history: vec![board],
            selection: None,
            replay_index: None,
            resigned: None,
            setup: None,
        }
    }

    /// The board being shown: the builder's board, the replayed snapshot,
    /// or the live position.
    pub fn board(&self) -> &Board {
        if let Some(setup) = &self.setup {
            return setup;
        }
        match self.replay_index {
            Some(index) => self.board_at_move(index),
            None => self.current_board(),
        }
    }

    /// The live position, regardless of replay or builder mode
    pub fn current_board(&self) -> &Board {
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[Board] {
        &self.history
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn is_replay_mode(&self) -> bool {
        self.replay_index.is_some()
    }

    pub fn replay_index(&self) -> Option<usize> {
        self.replay_index
    }

    pub fn is_builder_mode(&self) -> bool {
        self.setup.is_some()
    }

    pub fn status(&self) -> GameStatus {
        if self.setup.is_some() {
            return GameStatus::NotStarted;
        }
        if let Some(winner) = self.resigned {
            return GameStatus::Resigned { winner };
        }
        let board = self.current_board();
        if board.is_checkmate {
            GameStatus::Checkmate {
                winner: board.side_to_move.opposite(),
            }
        } else if board.is_stalemate {
            GameStatus::Stalemate
        } else {
            GameStatus::InProgress
        }
    }

    fn accepts_moves(&self) -> bool {
        self.setup.is_none() && self.replay_index.is_none() && !self.status().is_over()
    }

    /// Selects the side to move's piece on `pos`. Anything else clears the
    /// selection and returns false.
    pub fn select_piece(&mut self, pos: Position) -> bool {
        self.selection = None;
        if !self.accepts_moves() {
            return false;
        }
        let board = self.current_board();
        let Some(piece) = board.piece_at(pos) else {
            return false;
        };
        if piece.color != board.side_to_move {
            return false;
        }
        let legal_moves = movegen::legal_moves(&piece, board);
        self.selection = Some(Selection { piece, legal_moves });
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Moves the selected piece to `to`. A pawn reaching its last rank
    /// becomes a queen.
    pub fn move_piece(&mut self, to: Position) -> bool {
        self.play_selected(to, None)
    }

    /// Like `move_piece` but with an explicit promotion piece. Only queen,
    /// rook, bishop and knight are accepted.
    pub fn move_piece_with_promotion(&mut self, to: Position, kind: PieceKind) -> bool {
        if !kind.is_promotion_target() {
            self.selection = None;
            return false;
        }
        self.play_selected(to, Some(kind))
    }

    fn play_selected(&mut self, to: Position, promotion: Option<PieceKind>) -> bool {
        let Some(selection) = self.selection.take() else {
            return false;
        };
        if !self.accepts_moves() || !selection.legal_moves.contains(&to) {
            return false;
        }
        let board = self.current_board();
        let Some(mv) = build_move(board, selection.piece.position, to, promotion) else {
            return false;
        };
        let next = apply_move(board, &mv);
        self.history.push(next);
        true
    }

    /// Drops the latest snapshot. Also lifts a resignation.
    pub fn undo_move(&mut self) -> bool {
        if self.setup.is_some() || self.replay_index.is_some() || self.history.len() < 2 {
            return false;
        }
        self.history.pop();
        self.selection = None;
        self.resigned = None;
        true
    }

    /// Back to the standard starting position, leaving replay and builder.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The side to move gives up.
    pub fn resign(&mut self) -> bool {
        if !self.accepts_moves() {
            return false;
        }
        self.resigned = Some(self.current_board().side_to_move.opposite());
        self.selection = None;
        true
    }

    /// Views snapshot `index` (0 is the starting position) without
    /// altering the game.
    pub fn set_replay_state(&mut self, index: usize) -> bool {
        if self.setup.is_some() || index >= self.history.len() {
            return false;
        }
        self.replay_index = Some(index);
        self.selection = None;
        true
    }

    pub fn exit_replay(&mut self) {
        self.replay_index = None;
    }

    /// Snapshot `index` of the history; out-of-range indices give the
    /// current board.
    pub fn board_at_move(&self, index: usize) -> &Board {
        self.history
            .get(index)
            .unwrap_or_else(|| self.current_board())
    }

    pub fn current_game_state(&self) -> GameSnapshot {
        GameSnapshot {
            current: self.current_board().clone(),
            history: self.history.clone(),
        }
    }

    /// Replaces the whole game. The history must end at `current` and
    /// every board must be self-consistent; otherwise nothing changes.
    pub fn load_game_state(&mut self, current: Board, history: Vec<Board>) -> bool {
        let snapshot = GameSnapshot { current, history };
        if snapshot.validate().is_err() {
            return false;
        }
        *self = Self {
            history: snapshot.history,
            selection: None,
            replay_index: None,
            resigned: None,
            setup: None,
        };
        true
    }

    pub fn save(&self, name: &str) -> SavedGame {
        SavedGame::new(name, self.current_game_state())
    }

    pub fn load_saved(&mut self, saved: &SavedGame) -> bool {
        self.load_game_state(saved.snapshot.current.clone(), saved.snapshot.history.clone())
    }

    // Builder

    /// Opens the builder on an empty board.
    pub fn create_empty_board(&mut self) {
        self.setup = Some(Board::empty());
        self.selection = None;
        self.replay_index = None;
    }

    /// Puts an unmoved piece on `pos`. Placing a king removes that color's
    /// previous king.
    pub fn place_piece(&mut self, pos: Position, kind: PieceKind, color: Color) -> bool {
        let Some(board) = self.setup.as_mut() else {
            return false;
        };
        if !pos.is_valid() {
            return false;
        }
        if kind == PieceKind::King {
            if let Some(old) = board.king_position(color) {
                board.take(old);
            }
        }
        board.take(pos);
        board.put(Piece::new(kind, color, pos));
        true
    }

    pub fn remove_piece(&mut self, pos: Position) -> bool {
        match self.setup.as_mut() {
            Some(board) if pos.is_valid() => board.take(pos).is_some(),
            _ => false,
        }
    }

    pub fn set_current_player(&mut self, color: Color) -> bool {
        match self.setup.as_mut() {
            Some(board) => {
                board.side_to_move = color;
                true
            }
            None => false,
        }
    }

    /// A setup is playable when both kings are present and the side to
    /// move is not already in check.
    pub fn validate_custom_board(&self) -> ValidationResult {
        let Some(board) = &self.setup else {
            return ValidationResult::rejected("Builder is not open");
        };
        if board.white_king_pos.is_none() {
            return ValidationResult::rejected("White king is missing");
        }
        if board.black_king_pos.is_none() {
            return ValidationResult::rejected("Black king is missing");
        }
        if movegen::is_in_check(board, board.side_to_move) {
            let side = match board.side_to_move {
                Color::White => "White",
                Color::Black => "Black",
            };
            return ValidationResult::rejected(format!("{side} king is in check"));
        }
        ValidationResult::ok()
    }

    /// Starts play from the builder's board when it validates; the builder
    /// stays open otherwise.
    pub fn start_from_custom_setup(&mut self) -> ValidationResult {
        let validation = self.validate_custom_board();
        if !validation.valid {
            return validation;
        }
        if let Some(board) = self.setup.take() {
            *self = Self::from_board(board);
        }
        validation
    }
}

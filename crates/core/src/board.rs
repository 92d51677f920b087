use serde::{Deserialize, Serialize};

use crate::chess_move::ChessMove;
use crate::error::{CoreError, Result};
use crate::movegen;
use crate::types::{Color, Piece, PieceKind, Position};

/// 8×8 grid indexed `[row][col]`
pub type Squares = [[Option<Piece>; 8]; 8];

/// Number of feature planes produced by [`Board::encode`]
pub const ENCODING_PLANES: usize = 14;

/// Length of the flat evaluator input vector
pub const ENCODING_LEN: usize = ENCODING_PLANES * 64;

const BACK_RANK: [PieceKind; 8] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

/// Castling-rights flags. Each flag only ever goes from `false` to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CastlingFlags {
    pub white_king_moved: bool,
    pub black_king_moved: bool,
    pub white_kingside_rook_moved: bool,
    pub white_queenside_rook_moved: bool,
    pub black_kingside_rook_moved: bool,
    pub black_queenside_rook_moved: bool,
}

impl CastlingFlags {
    pub fn king_moved(&self, color: Color) -> bool {
        match color {
            Color::White => self.white_king_moved,
            Color::Black => self.black_king_moved,
        }
    }

    pub fn rook_moved(&self, color: Color, kingside: bool) -> bool {
        match (color, kingside) {
            (Color::White, true) => self.white_kingside_rook_moved,
            (Color::White, false) => self.white_queenside_rook_moved,
            (Color::Black, true) => self.black_kingside_rook_moved,
            (Color::Black, false) => self.black_queenside_rook_moved,
        }
    }

    /// Whether the flags still allow castling on that side
    pub fn can_castle(&self, color: Color, kingside: bool) -> bool {
        !self.king_moved(color) && !self.rook_moved(color, kingside)
    }

    pub fn mark_king_moved(&mut self, color: Color) {
        match color {
            Color::White => self.white_king_moved = true,
            Color::Black => self.black_king_moved = true,
        }
    }

    pub fn mark_rook_moved(&mut self, color: Color, kingside: bool) {
        match (color, kingside) {
            (Color::White, true) => self.white_kingside_rook_moved = true,
            (Color::White, false) => self.white_queenside_rook_moved = true,
            (Color::Black, true) => self.black_kingside_rook_moved = true,
            (Color::Black, false) => self.black_queenside_rook_moved = true,
        }
    }

    /// Marks the rook right tied to a corner square, if `pos` is one
    pub fn mark_corner(&mut self, pos: Position) {
        match (pos.row, pos.col) {
            (0, 0) => self.mark_rook_moved(Color::White, false),
            (0, 7) => self.mark_rook_moved(Color::White, true),
            (7, 0) => self.mark_rook_moved(Color::Black, false),
            (7, 7) => self.mark_rook_moved(Color::Black, true),
            _ => {}
        }
    }

    /// Available rights in FEN order (K, Q, k, q)
    fn rights(&self) -> [bool; 4] {
        [
            self.can_castle(Color::White, true),
            self.can_castle(Color::White, false),
            self.can_castle(Color::Black, true),
            self.can_castle(Color::Black, false),
        ]
    }
}

/// Snapshot of a game position plus the bookkeeping needed to continue
/// play from it. Boards stored in a game's history are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub squares: Squares,
    pub side_to_move: Color,
    /// `None` only while a king is missing during custom setup
    pub white_king_pos: Option<Position>,
    pub black_king_pos: Option<Position>,
    pub castling: CastlingFlags,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub is_stalemate: bool,
    pub last_move: Option<ChessMove>,
    /// White pieces that have been captured
    pub captured_white: Vec<Piece>,
    /// Black pieces that have been captured
    pub captured_black: Vec<Piece>,
    pub move_history: Vec<String>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Standard starting position, White to move
    pub fn new() -> Self {
        let mut board = Self::empty();
        for col in 0..8u8 {
            board.put(Piece::new(PieceKind::Pawn, Color::White, Position::new(1, col)));
            board.put(Piece::new(PieceKind::Pawn, Color::Black, Position::new(6, col)));
            let kind = BACK_RANK[col as usize];
            board.put(Piece::new(kind, Color::White, Position::new(0, col)));
            board.put(Piece::new(kind, Color::Black, Position::new(7, col)));
        }
        board
    }

    /// Board with no pieces, used for custom setups
    pub fn empty() -> Self {
        Self {
            squares: [[None; 8]; 8],
            side_to_move: Color::White,
            white_king_pos: None,
            black_king_pos: None,
            castling: CastlingFlags::default(),
            is_check: false,
            is_checkmate: false,
            is_stalemate: false,
            last_move: None,
            captured_white: Vec::new(),
            captured_black: Vec::new(),
            move_history: Vec::new(),
        }
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        if !pos.is_valid() {
            return None;
        }
        self.squares[pos.row as usize][pos.col as usize]
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        match color {
            Color::White => self.white_king_pos,
            Color::Black => self.black_king_pos,
        }
    }

    /// Writes a piece at its own position, keeping the king cache in sync.
    pub(crate) fn put(&mut self, piece: Piece) {
        let pos = piece.position;
        self.squares[pos.row as usize][pos.col as usize] = Some(piece);
        if piece.kind == PieceKind::King {
            self.set_king_position(piece.color, Some(pos));
        }
    }

    /// Clears a square, returning what stood there.
    pub(crate) fn take(&mut self, pos: Position) -> Option<Piece> {
        let taken = self.squares[pos.row as usize][pos.col as usize].take();
        if let Some(piece) = taken {
            if piece.kind == PieceKind::King && self.king_position(piece.color) == Some(pos) {
                self.set_king_position(piece.color, None);
            }
        }
        taken
    }

    fn set_king_position(&mut self, color: Color, pos: Option<Position>) {
        match color {
            Color::White => self.white_king_pos = pos,
            Color::Black => self.black_king_pos = pos,
        }
    }

    /// Checks a board that did not come out of move application, such as
    /// one read from a saved game: every piece sits on its own square and
    /// each king cache points at the only king of that color.
    pub fn check_consistency(&self) -> Result<()> {
        let mut kings: [Option<Position>; 2] = [None, None];
        for (row, cells) in self.squares.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let Some(piece) = cell else { continue };
                let square = Position::new(row as u8, col as u8);
                if piece.position != square {
                    return Err(CoreError::InconsistentRecord(format!(
                        "piece on {} claims to stand on ({}, {})",
                        square.algebraic(),
                        piece.position.row,
                        piece.position.col
                    )));
                }
                if piece.kind == PieceKind::King {
                    let slot = &mut kings[piece.color as usize];
                    if slot.replace(square).is_some() {
                        return Err(CoreError::InconsistentRecord(format!(
                            "{:?} has more than one king",
                            piece.color
                        )));
                    }
                }
            }
        }
        for color in [Color::White, Color::Black] {
            if self.king_position(color) != kings[color as usize] {
                return Err(CoreError::InconsistentRecord(format!(
                    "{color:?} king position does not match the board"
                )));
            }
        }
        if let Some(mv) = self.last_move {
            if !mv.from.is_valid() || !mv.to.is_valid() {
                return Err(CoreError::InconsistentRecord("last move leaves the board".into()));
            }
        }
        Ok(())
    }

    /// All pieces of one color, scanned row by row
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.squares
            .iter()
            .flat_map(|row| row.iter())
            .filter_map(move |sq| sq.filter(|p| p.color == color))
    }

    pub fn is_terminal(&self) -> bool {
        self.is_checkmate || self.is_stalemate
    }

    /// Recomputes check, checkmate and stalemate for the side to move.
    pub fn refresh_status(&mut self) {
        let color = self.side_to_move;
        self.is_check = movegen::is_in_check(self, color);
        let can_move = movegen::has_legal_move(self, color);
        self.is_checkmate = self.is_check && !can_move;
        self.is_stalemate = !self.is_check && !can_move;
    }

    /// White material minus Black material, in pawns
    pub fn material_balance(&self) -> i32 {
        self.squares
            .iter()
            .flat_map(|row| row.iter())
            .flatten()
            .map(|p| match p.color {
                Color::White => p.kind.value(),
                Color::Black => -p.kind.value(),
            })
            .sum()
    }

    /// Canonical key of pieces, side to move and castling flags. Positions
    /// reached by different move orders share a key.
    pub fn board_key(&self) -> String {
        let mut key = String::with_capacity(64 * 2 + 7);
        for sq in self.squares.iter().flat_map(|row| row.iter()) {
            match sq {
                Some(p) => {
                    key.push(match p.color {
                        Color::White => 'w',
                        Color::Black => 'b',
                    });
                    key.push(p.kind.letter());
                }
                None => key.push_str("--"),
            }
        }
        key.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });
        let c = &self.castling;
        for flag in [
            c.white_king_moved,
            c.black_king_moved,
            c.white_kingside_rook_moved,
            c.white_queenside_rook_moved,
            c.black_kingside_rook_moved,
            c.black_queenside_rook_moved,
        ] {
            key.push(if flag { '1' } else { '0' });
        }
        key
    }

    /// Square a pawn could capture onto en passant right now
    pub fn en_passant_target(&self) -> Option<Position> {
        let last = self.last_move?;
        if !last.is_double_pawn_push() {
            return None;
        }
        Some(Position::new((last.from.row + last.to.row) / 2, last.from.col))
    }

    /// FEN string of the position. Halfmove clock is always 0.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for row in (0..8).rev() {
            let mut empty = 0;
            for col in 0..8 {
                match self.squares[row][col] {
                    Some(piece) => {
                        if empty > 0 {
                            fen.push_str(&empty.to_string());
                            empty = 0;
                        }
                        fen.push(piece.symbol());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if row > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        let castling: String = self
            .castling
            .rights()
            .iter()
            .zip(['K', 'Q', 'k', 'q'])
            .filter(|(available, _)| **available)
            .map(|(_, c)| c)
            .collect();
        fen.push(' ');
        fen.push_str(if castling.is_empty() { "-" } else { &castling });

        fen.push(' ');
        match self.en_passant_target() {
            Some(target) => fen.push_str(&target.algebraic()),
            None => fen.push('-'),
        }

        let fullmove = self.move_history.len() / 2 + 1;
        fen.push_str(&format!(" 0 {fullmove}"));
        fen
    }

    /// Plane-major feature encoding for an evaluator: planes 0-5 hold White
    /// pawn..king, 6-11 Black, 12 is set when White is to move, 13 carries
    /// 0.25 per castling right still available.
    pub fn encode(&self) -> Vec<f32> {
        let mut planes = vec![0.0f32; ENCODING_LEN];
        for (row, cells) in self.squares.iter().enumerate() {
            for (col, sq) in cells.iter().enumerate() {
                if let Some(piece) = sq {
                    let color_offset = match piece.color {
                        Color::White => 0,
                        Color::Black => 6,
                    };
                    let plane = color_offset + piece.kind.plane();
                    planes[plane * 64 + row * 8 + col] = 1.0;
                }
            }
        }

        if self.side_to_move == Color::White {
            planes[12 * 64..13 * 64].fill(1.0);
        }

        let rights = self.castling.rights().iter().filter(|r| **r).count() as f32 * 0.25;
        planes[13 * 64..14 * 64].fill(rights);
        planes
    }
}

use serde::{Deserialize, Serialize};

use crate::types::{Piece, PieceKind, Position};

/// Size of the flattened from-square × to-square policy space
pub const POLICY_SIZE: usize = 4096;

/// Index of a (from, to) pair in the policy vector
pub fn policy_index(from: Position, to: Position) -> usize {
    from.row as usize * 512 + from.col as usize * 64 + to.row as usize * 8 + to.col as usize
}

/// Complete record of one ply. Immutable once built; this is the unit
/// kept in `Board::last_move`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChessMove {
    pub from: Position,
    pub to: Position,
    /// The piece as it stood before the move
    pub moving_piece: Piece,
    pub captured_piece: Option<Piece>,
    pub is_castling: bool,
    pub is_en_passant: bool,
    pub is_promotion: bool,
    pub promotion_kind: Option<PieceKind>,
}

impl ChessMove {
    pub fn policy_index(&self) -> usize {
        policy_index(self.from, self.to)
    }

    /// True when a pawn advanced two squares
    pub fn is_double_pawn_push(&self) -> bool {
        self.moving_piece.kind == PieceKind::Pawn && self.from.row.abs_diff(self.to.row) == 2
    }

    /// History notation, e.g. `Ng1-f3`, `e4xd5`, `e7-e8=Q`, `O-O`
    pub fn notation(&self) -> String {
        if self.is_castling {
            return if self.to.col > self.from.col {
                "O-O".to_string()
            } else {
                "O-O-O".to_string()
            };
        }
        let piece = match self.moving_piece.kind {
            PieceKind::Pawn => String::new(),
            kind => kind.letter().to_ascii_uppercase().to_string(),
        };
        let sep = if self.captured_piece.is_some() { 'x' } else { '-' };
        let promo = match self.promotion_kind {
            Some(kind) if self.is_promotion => format!("={}", kind.letter().to_ascii_uppercase()),
            _ => String::new(),
        };
        format!(
            "{piece}{}{sep}{}{promo}",
            self.from.algebraic(),
            self.to.algebraic()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Color;

    fn quiet(kind: PieceKind, from: Position, to: Position) -> ChessMove {
        ChessMove {
            from,
            to,
            moving_piece: Piece::new(kind, Color::White, from),
            captured_piece: None,
            is_castling: false,
            is_en_passant: false,
            is_promotion: false,
            promotion_kind: None,
        }
    }

    #[test]
    fn test_policy_index_layout() {
        assert_eq!(policy_index(Position::new(0, 0), Position::new(0, 0)), 0);
        assert_eq!(policy_index(Position::new(7, 7), Position::new(7, 7)), POLICY_SIZE - 1);
        // e2-e4
        assert_eq!(policy_index(Position::new(1, 4), Position::new(3, 4)), 512 + 256 + 24 + 4);
    }

    #[test]
    fn test_notation() {
        let knight = quiet(PieceKind::Knight, Position::new(0, 6), Position::new(2, 5));
        assert_eq!(knight.notation(), "Ng1-f3");

        let pawn = quiet(PieceKind::Pawn, Position::new(1, 4), Position::new(3, 4));
        assert_eq!(pawn.notation(), "e2-e4");
        assert!(pawn.is_double_pawn_push());

        let mut castle = quiet(PieceKind::King, Position::new(0, 4), Position::new(0, 6));
        castle.is_castling = true;
        assert_eq!(castle.notation(), "O-O");
    }
}

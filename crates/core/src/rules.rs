//! Pure move application and the narrow rules interface handed to search.

use crate::board::Board;
use crate::chess_move::ChessMove;
use crate::movegen;
use crate::types::{Color, PieceKind, Position};

/// What a search or driver needs from the rules: the legal moves of the
/// side to move, and the board that results from playing one of them.
pub trait RulesEngine {
    fn legal_moves(&self, board: &Board) -> Vec<ChessMove>;

    /// Returns a new board; `board` itself is left untouched.
    fn apply(&self, board: &Board, mv: &ChessMove) -> Board;
}

/// Standard chess rules (no repetition or fifty-move draws)
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl RulesEngine for StandardRules {
    fn legal_moves(&self, board: &Board) -> Vec<ChessMove> {
        if board.is_terminal() {
            return Vec::new();
        }
        movegen::all_legal_moves(board, board.side_to_move)
            .into_iter()
            .filter_map(|(from, to)| build_move(board, from, to, None))
            .collect()
    }

    fn apply(&self, board: &Board, mv: &ChessMove) -> Board {
        apply_move(board, mv)
    }
}

/// Builds the move record for relocating the piece on `from` to `to`.
/// Legality is not checked here. A pawn reaching its last rank promotes to
/// `promotion`, or to a queen when none is given.
pub fn build_move(
    board: &Board,
    from: Position,
    to: Position,
    promotion: Option<PieceKind>,
) -> Option<ChessMove> {
    let piece = board.piece_at(from)?;
    let is_pawn = piece.kind == PieceKind::Pawn;

    let is_castling = piece.kind == PieceKind::King && from.col.abs_diff(to.col) == 2;
    let is_en_passant = is_pawn && from.col != to.col && board.piece_at(to).is_none();
    let captured_piece = if is_en_passant {
        board.piece_at(Position::new(from.row, to.col))
    } else {
        board.piece_at(to)
    };
    let is_promotion = is_pawn && to.row == piece.color.promotion_rank();

    Some(ChessMove {
        from,
        to,
        moving_piece: piece,
        captured_piece,
        is_castling,
        is_en_passant,
        is_promotion,
        promotion_kind: is_promotion.then(|| promotion.unwrap_or(PieceKind::Queen)),
    })
}

/// Plays `mv` on a copy of `board`: relocates the piece, removes the captured
/// or en-passant pawn, moves the castling rook, swaps in the promoted piece,
/// updates castling flags, flips the side to move and re-derives
/// check/checkmate/stalemate for the new side to move.
pub fn apply_move(board: &Board, mv: &ChessMove) -> Board {
    let mut next = board.clone();
    let (from, to) = (mv.from, mv.to);

    next.take(from);
    if mv.is_en_passant {
        next.take(Position::new(from.row, to.col));
    } else {
        next.take(to);
    }

    let mut placed = mv.moving_piece.moved_to(to);
    if let Some(kind) = mv.promotion_kind.filter(|_| mv.is_promotion) {
        placed.kind = kind;
    }
    next.put(placed);

    if mv.is_castling {
        let rank = from.row;
        let (rook_from, rook_to) = if to.col > from.col { (7, 5) } else { (0, 3) };
        if let Some(rook) = next.take(Position::new(rank, rook_from)) {
            next.put(rook.moved_to(Position::new(rank, rook_to)));
        }
    }

    if let Some(captured) = mv.captured_piece {
        match captured.color {
            Color::White => next.captured_white.push(captured),
            Color::Black => next.captured_black.push(captured),
        }
    }

    if mv.moving_piece.kind == PieceKind::King {
        next.castling.mark_king_moved(mv.moving_piece.color);
    }
    // Anything leaving or landing on a corner means that corner's rook is gone.
    next.castling.mark_corner(from);
    next.castling.mark_corner(to);

    next.last_move = Some(*mv);
    next.move_history.push(mv.notation());
    next.side_to_move = next.side_to_move.opposite();
    next.refresh_status();
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Piece;

    #[test]
    fn test_apply_leaves_source_untouched() {
        let board = Board::new();
        let mv = build_move(&board, Position::new(1, 4), Position::new(3, 4), None).unwrap();
        let next = apply_move(&board, &mv);

        assert_eq!(board, Board::new());
        assert_eq!(next.side_to_move, Color::Black);
        assert!(next.piece_at(Position::new(1, 4)).is_none());
        assert!(next.piece_at(Position::new(3, 4)).unwrap().has_moved);
        assert_eq!(next.move_history, vec!["e2-e4".to_string()]);
        assert_eq!(next.en_passant_target(), Some(Position::new(2, 4)));
    }

    #[test]
    fn test_build_move_flags() {
        let mut board = Board::empty();
        board.put(Piece::new(PieceKind::King, Color::White, Position::new(0, 4)));
        board.put(Piece::new(PieceKind::Rook, Color::White, Position::new(0, 7)));
        board.put(Piece::new(PieceKind::Pawn, Color::White, Position::new(6, 0)));
        board.put(Piece::new(PieceKind::King, Color::Black, Position::new(7, 7)));

        let castle = build_move(&board, Position::new(0, 4), Position::new(0, 6), None).unwrap();
        assert!(castle.is_castling);

        let promo = build_move(&board, Position::new(6, 0), Position::new(7, 0), None).unwrap();
        assert!(promo.is_promotion);
        assert_eq!(promo.promotion_kind, Some(PieceKind::Queen));

        assert!(build_move(&board, Position::new(3, 3), Position::new(4, 3), None).is_none());
    }

    #[test]
    fn test_rook_capture_on_corner_revokes_right() {
        let mut board = Board::empty();
        board.put(Piece::new(PieceKind::King, Color::White, Position::new(0, 4)));
        board.put(Piece::new(PieceKind::King, Color::Black, Position::new(7, 4)));
        board.put(Piece::new(PieceKind::Rook, Color::Black, Position::new(7, 7)));
        board.put(Piece::new(PieceKind::Bishop, Color::White, Position::new(1, 1)));

        let mv = build_move(&board, Position::new(1, 1), Position::new(7, 7), None).unwrap();
        let next = apply_move(&board, &mv);
        assert!(next.castling.black_kingside_rook_moved);
        assert!(!next.castling.black_queenside_rook_moved);
        assert_eq!(next.captured_black.len(), 1);
    }

    #[test]
    fn test_standard_rules_start_moves() {
        let rules = StandardRules;
        let moves = rules.legal_moves(&Board::new());
        assert_eq!(moves.len(), 20);
        assert!(moves.iter().all(|m| m.moving_piece.color == Color::White));
    }
}

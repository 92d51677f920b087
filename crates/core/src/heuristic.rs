//! One-ply move picker used as a baseline opponent.

use crate::board::Board;
use crate::chess_move::ChessMove;
use crate::rules::RulesEngine;
use crate::types::PieceKind;

fn score(mv: &ChessMove) -> f64 {
    match mv.captured_piece {
        Some(captured) if captured.kind == PieceKind::King => 100.0,
        Some(captured) => captured.kind.value() as f64 * 10.0,
        None => {
            let row = (mv.to.row as f64 - 3.5).abs();
            let col = (mv.to.col as f64 - 3.5).abs();
            (3.0 - row - col).max(0.0)
        }
    }
}

/// Takes the most valuable piece on offer, otherwise heads for the centre.
/// Ties keep the earliest generated move.
pub fn best_move<R: RulesEngine>(board: &Board, rules: &R) -> Option<ChessMove> {
    let mut best: Option<(ChessMove, f64)> = None;
    for mv in rules.legal_moves(board) {
        let s = score(&mv);
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((mv, s));
        }
    }
    best.map(|(mv, _)| mv)
}

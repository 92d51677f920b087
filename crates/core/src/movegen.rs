//! Per-piece move generation and the legality filter.
//!
//! Everything here is a pure function of the board passed in. En-passant
//! availability is read from `Board::last_move` of that same snapshot.

use crate::board::{Board, Squares};
use crate::types::{Color, Piece, PieceKind, Position};

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

fn at(squares: &Squares, pos: Position) -> Option<Piece> {
    squares[pos.row as usize][pos.col as usize]
}

/// Pseudo-legal destinations for `piece`, ignoring whether the mover's own
/// king ends up attacked. With `include_special` the pawn en-passant capture
/// and king castling are added.
pub fn raw_moves(piece: &Piece, board: &Board, include_special: bool) -> Vec<Position> {
    let mut moves = basic_moves(piece, &board.squares);
    if include_special {
        match piece.kind {
            PieceKind::Pawn => {
                if let Some(target) = en_passant_destination(piece, board) {
                    moves.push(target);
                }
            }
            PieceKind::King => castling_destinations(piece, board, &mut moves),
            _ => {}
        }
    }
    moves
}

/// Movement pattern of a piece on a bare grid, without special moves
fn basic_moves(piece: &Piece, squares: &Squares) -> Vec<Position> {
    let mut moves = Vec::new();
    match piece.kind {
        PieceKind::Pawn => pawn_moves(piece, squares, &mut moves),
        PieceKind::Knight => step_moves(piece, squares, &KNIGHT_OFFSETS, &mut moves),
        PieceKind::King => step_moves(piece, squares, &KING_OFFSETS, &mut moves),
        PieceKind::Bishop => ray_moves(piece, squares, &BISHOP_DIRS, &mut moves),
        PieceKind::Rook => ray_moves(piece, squares, &ROOK_DIRS, &mut moves),
        PieceKind::Queen => {
            ray_moves(piece, squares, &ROOK_DIRS, &mut moves);
            ray_moves(piece, squares, &BISHOP_DIRS, &mut moves);
        }
    }
    moves
}

fn pawn_moves(piece: &Piece, squares: &Squares, moves: &mut Vec<Position>) {
    let dir = piece.color.pawn_direction();
    let from = piece.position;

    if let Some(one) = from.offset(dir, 0) {
        if at(squares, one).is_none() {
            moves.push(one);

            if !piece.has_moved && from.row == piece.color.pawn_start_rank() {
                if let Some(two) = from.offset(2 * dir, 0) {
                    if at(squares, two).is_none() {
                        moves.push(two);
                    }
                }
            }
        }
    }

    for d_col in [-1, 1] {
        if let Some(target) = from.offset(dir, d_col) {
            if at(squares, target).is_some_and(|p| p.color != piece.color) {
                moves.push(target);
            }
        }
    }
}

fn step_moves(piece: &Piece, squares: &Squares, offsets: &[(i8, i8)], moves: &mut Vec<Position>) {
    for &(d_row, d_col) in offsets {
        if let Some(target) = piece.position.offset(d_row, d_col) {
            if at(squares, target).map_or(true, |p| p.color != piece.color) {
                moves.push(target);
            }
        }
    }
}

fn ray_moves(piece: &Piece, squares: &Squares, dirs: &[(i8, i8)], moves: &mut Vec<Position>) {
    for &(d_row, d_col) in dirs {
        let mut current = piece.position;
        while let Some(next) = current.offset(d_row, d_col) {
            match at(squares, next) {
                None => moves.push(next),
                Some(other) => {
                    if other.color != piece.color {
                        moves.push(next);
                    }
                    break;
                }
            }
            current = next;
        }
    }
}

/// En-passant landing square, if the previous ply was an enemy pawn's
/// double advance ending beside this pawn.
fn en_passant_destination(piece: &Piece, board: &Board) -> Option<Position> {
    let last = board.last_move?;
    if !last.is_double_pawn_push() || last.moving_piece.color == piece.color {
        return None;
    }
    if last.to.row != piece.position.row || last.to.col.abs_diff(piece.position.col) != 1 {
        return None;
    }
    let target = Position::new(
        (piece.position.row as i8 + piece.color.pawn_direction()) as u8,
        last.to.col,
    );
    board.piece_at(target).is_none().then_some(target)
}

fn castling_destinations(king: &Piece, board: &Board, moves: &mut Vec<Position>) {
    let color = king.color;
    let rank = color.back_rank();
    if king.has_moved || king.position != Position::new(rank, 4) || board.castling.king_moved(color)
    {
        return;
    }

    let enemy = color.opposite();
    if is_square_attacked(king.position, enemy, &board.squares) {
        return;
    }

    // (kingside, rook column, squares that must be empty, squares the king crosses)
    let sides: [(bool, u8, &[u8], &[u8]); 2] = [
        (true, 7, &[5, 6], &[5, 6]),
        (false, 0, &[1, 2, 3], &[3, 2]),
    ];

    for (kingside, rook_col, between, transit) in sides {
        if board.castling.rook_moved(color, kingside) {
            continue;
        }
        let rook_ok = board
            .piece_at(Position::new(rank, rook_col))
            .is_some_and(|p| p.kind == PieceKind::Rook && p.color == color && !p.has_moved);
        if !rook_ok {
            continue;
        }
        if between
            .iter()
            .any(|&col| board.piece_at(Position::new(rank, col)).is_some())
        {
            continue;
        }
        if transit
            .iter()
            .any(|&col| is_square_attacked(Position::new(rank, col), enemy, &board.squares))
        {
            continue;
        }
        moves.push(Position::new(rank, if kingside { 6 } else { 2 }));
    }
}

/// Whether any piece of color `by` attacks `pos` on `squares`. Pawns attack
/// their forward diagonals whether or not the square is occupied.
pub fn is_square_attacked(pos: Position, by: Color, squares: &Squares) -> bool {
    let hits = |target: Option<Position>, kinds: &[PieceKind]| {
        target
            .and_then(|t| at(squares, t))
            .is_some_and(|p| p.color == by && kinds.contains(&p.kind))
    };

    if KNIGHT_OFFSETS
        .iter()
        .any(|&(dr, dc)| hits(pos.offset(dr, dc), &[PieceKind::Knight]))
    {
        return true;
    }

    if KING_OFFSETS
        .iter()
        .any(|&(dr, dc)| hits(pos.offset(dr, dc), &[PieceKind::King]))
    {
        return true;
    }

    // A pawn of `by` standing one row behind (from its own point of view)
    let pawn_row = -by.pawn_direction();
    if [-1, 1]
        .iter()
        .any(|&dc| hits(pos.offset(pawn_row, dc), &[PieceKind::Pawn]))
    {
        return true;
    }

    let slides = |dirs: &[(i8, i8)], kinds: &[PieceKind]| {
        dirs.iter().any(|&(dr, dc)| {
            let mut current = pos;
            while let Some(next) = current.offset(dr, dc) {
                if let Some(p) = at(squares, next) {
                    return p.color == by && kinds.contains(&p.kind);
                }
                current = next;
            }
            false
        })
    };

    slides(&ROOK_DIRS, &[PieceKind::Rook, PieceKind::Queen])
        || slides(&BISHOP_DIRS, &[PieceKind::Bishop, PieceKind::Queen])
}

pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king_position(color)
        .is_some_and(|king| is_square_attacked(king, color.opposite(), &board.squares))
}

/// Whether moving `piece` to `to` leaves its own king unattacked. Only the
/// relocation and an en-passant victim matter for the attack test.
fn leaves_king_safe(piece: &Piece, to: Position, board: &Board) -> bool {
    let from = piece.position;
    let mut squares = board.squares;
    squares[from.row as usize][from.col as usize] = None;
    if piece.kind == PieceKind::Pawn && from.col != to.col && at(&squares, to).is_none() {
        squares[from.row as usize][to.col as usize] = None;
    }
    squares[to.row as usize][to.col as usize] = Some(piece.moved_to(to));

    let king = if piece.kind == PieceKind::King {
        Some(to)
    } else {
        board.king_position(piece.color)
    };
    match king {
        Some(king) => !is_square_attacked(king, piece.color.opposite(), &squares),
        None => true,
    }
}

/// Legal destinations for `piece`: its raw moves (special moves included)
/// minus any that leave its own king attacked.
pub fn legal_moves(piece: &Piece, board: &Board) -> Vec<Position> {
    raw_moves(piece, board, true)
        .into_iter()
        .filter(|&to| leaves_king_safe(piece, to, board))
        .collect()
}

/// Every legal (from, to) pair for `color`, pieces scanned row by row
pub fn all_legal_moves(board: &Board, color: Color) -> Vec<(Position, Position)> {
    board
        .pieces(color)
        .flat_map(|piece| {
            legal_moves(&piece, board)
                .into_iter()
                .map(move |to| (piece.position, to))
        })
        .collect()
}

/// Like `all_legal_moves(..).is_empty()` but stops at the first legal move.
pub fn has_legal_move(board: &Board, color: Color) -> bool {
    board.pieces(color).any(|piece| {
        raw_moves(&piece, board, true)
            .into_iter()
            .any(|to| leaves_king_safe(&piece, to, board))
    })
}

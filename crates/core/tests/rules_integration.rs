use chess_core::rules::apply_move;
use chess_core::{
    movegen, Board, Color, Game, GameStatus, PieceKind, Position, RulesEngine, StandardRules,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn pos(row: u8, col: u8) -> Position {
    Position::new(row, col)
}

fn play(game: &mut Game, from: (u8, u8), to: (u8, u8)) -> bool {
    game.select_piece(pos(from.0, from.1)) && game.move_piece(pos(to.0, to.1))
}

fn custom_game(pieces: &[((u8, u8), PieceKind, Color)], to_move: Color) -> Game {
    let mut game = Game::new();
    game.create_empty_board();
    for &((row, col), kind, color) in pieces {
        assert!(game.place_piece(pos(row, col), kind, color));
    }
    game.set_current_player(to_move);
    let validation = game.start_from_custom_setup();
    assert!(validation.valid, "{:?}", validation.reason);
    game
}

#[test]
fn test_random_playouts_stay_legal() {
    let rules = StandardRules;
    for seed in 0..12 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();

        for _ in 0..150 {
            let moves = rules.legal_moves(&board);
            if moves.is_empty() {
                assert!(board.is_terminal());
                break;
            }
            let mover = board.side_to_move;
            for mv in &moves {
                assert_eq!(mv.moving_piece.color, mover);
                let next = apply_move(&board, mv);
                assert!(
                    !movegen::is_in_check(&next, mover),
                    "{} leaves the king attacked in {}",
                    mv.notation(),
                    board.to_fen()
                );
            }

            let before = board.clone();
            let mv = *moves.choose(&mut rng).unwrap();
            let next = rules.apply(&board, &mv);
            assert_eq!(board, before);

            assert_eq!(next.side_to_move, mover.opposite());
            assert!(!(next.is_checkmate && next.is_stalemate));
            assert!(!next.is_checkmate || next.is_check);
            assert!(next.white_king_pos.is_some() && next.black_king_pos.is_some());
            board = next;
        }
    }
}

#[test]
fn test_kingside_castling_moves_rook() {
    let mut game = custom_game(
        &[
            ((0, 4), PieceKind::King, Color::White),
            ((0, 7), PieceKind::Rook, Color::White),
            ((7, 4), PieceKind::King, Color::Black),
        ],
        Color::White,
    );
    let before = game.board().clone();

    assert!(play(&mut game, (0, 4), (0, 6)));
    let board = game.board();
    assert_eq!(board.piece_at(pos(0, 6)).map(|p| p.kind), Some(PieceKind::King));
    assert_eq!(board.piece_at(pos(0, 5)).map(|p| p.kind), Some(PieceKind::Rook));
    assert!(board.piece_at(pos(0, 7)).is_none());
    assert_eq!(board.move_history.last().map(String::as_str), Some("O-O"));

    assert!(game.undo_move());
    assert_eq!(*game.board(), before);
}

#[test]
fn test_queenside_castling_then_black_castles() {
    let mut game = custom_game(
        &[
            ((0, 4), PieceKind::King, Color::White),
            ((0, 0), PieceKind::Rook, Color::White),
            ((7, 4), PieceKind::King, Color::Black),
            ((7, 7), PieceKind::Rook, Color::Black),
        ],
        Color::White,
    );
    let start = game.board().clone();

    assert!(play(&mut game, (0, 4), (0, 2)));
    let board = game.board();
    assert_eq!(board.piece_at(pos(0, 2)).map(|p| p.kind), Some(PieceKind::King));
    assert_eq!(board.piece_at(pos(0, 3)).map(|p| p.kind), Some(PieceKind::Rook));
    assert!(board.piece_at(pos(0, 0)).is_none());
    assert!(board.piece_at(pos(0, 4)).is_none());
    assert_eq!(board.move_history.last().map(String::as_str), Some("O-O-O"));
    let after_white = board.clone();

    // The rook on d1 does not cover f8 or g8
    assert!(play(&mut game, (7, 4), (7, 6)));
    let board = game.board();
    assert_eq!(board.black_king_pos, Some(pos(7, 6)));
    assert_eq!(
        board.piece_at(pos(7, 5)).map(|p| (p.kind, p.color)),
        Some((PieceKind::Rook, Color::Black))
    );
    assert!(board.piece_at(pos(7, 7)).is_none());
    assert_eq!(board.to_fen().split(' ').nth(2), Some("-"));

    assert!(game.undo_move());
    assert_eq!(*game.board(), after_white);
    assert!(game.undo_move());
    assert_eq!(*game.board(), start);
}

#[test]
fn test_no_castling_after_king_moved() {
    let mut game = custom_game(
        &[
            ((0, 4), PieceKind::King, Color::White),
            ((0, 7), PieceKind::Rook, Color::White),
            ((7, 4), PieceKind::King, Color::Black),
        ],
        Color::White,
    );
    assert!(play(&mut game, (0, 4), (0, 3)));
    assert!(play(&mut game, (7, 4), (7, 3)));
    assert!(play(&mut game, (0, 3), (0, 4)));
    assert!(play(&mut game, (7, 3), (7, 4)));

    assert!(game.select_piece(pos(0, 4)));
    let targets = &game.selection().unwrap().legal_moves;
    assert!(!targets.contains(&pos(0, 6)));
    assert!(!game.move_piece(pos(0, 6)));
    assert_eq!(game.board().to_fen().split(' ').nth(2), Some("-"));
}

#[test]
fn test_en_passant_capture() {
    let mut game = Game::new();
    assert!(play(&mut game, (1, 3), (3, 3)));
    assert!(play(&mut game, (6, 0), (5, 0)));
    assert!(play(&mut game, (3, 3), (4, 3)));
    assert!(play(&mut game, (6, 4), (4, 4)));
    let before = game.board().clone();
    assert_eq!(before.en_passant_target(), Some(pos(5, 4)));

    assert!(play(&mut game, (4, 3), (5, 4)));
    let board = game.board();
    assert!(board.piece_at(pos(4, 4)).is_none());
    assert_eq!(board.captured_black.len(), 1);
    assert_eq!(board.captured_black[0].kind, PieceKind::Pawn);
    assert!(board.last_move.unwrap().is_en_passant);

    assert!(game.undo_move());
    assert_eq!(*game.board(), before);
}

#[test]
fn test_en_passant_expires() {
    let mut game = Game::new();
    assert!(play(&mut game, (1, 3), (3, 3)));
    assert!(play(&mut game, (6, 0), (5, 0)));
    assert!(play(&mut game, (3, 3), (4, 3)));
    assert!(play(&mut game, (6, 4), (4, 4)));
    assert!(play(&mut game, (1, 7), (2, 7)));
    assert!(play(&mut game, (5, 0), (4, 0)));

    assert!(!play(&mut game, (4, 3), (5, 4)));
    assert_eq!(game.history().len(), 7);
}

#[test]
fn test_underpromotion() {
    let mut game = custom_game(
        &[
            ((0, 4), PieceKind::King, Color::White),
            ((6, 0), PieceKind::Pawn, Color::White),
            ((7, 7), PieceKind::King, Color::Black),
        ],
        Color::White,
    );
    let before = game.board().clone();

    assert!(game.select_piece(pos(6, 0)));
    assert!(!game.move_piece_with_promotion(pos(7, 0), PieceKind::King));
    assert!(game.select_piece(pos(6, 0)));
    assert!(game.move_piece_with_promotion(pos(7, 0), PieceKind::Knight));

    let promoted = game.board().piece_at(pos(7, 0)).unwrap();
    assert_eq!(promoted.kind, PieceKind::Knight);
    assert_eq!(promoted.color, Color::White);
    assert_eq!(
        game.board().move_history.last().map(String::as_str),
        Some("a7-a8=N")
    );

    assert!(game.undo_move());
    assert_eq!(*game.board(), before);
}

#[test]
fn test_stalemate_detected() {
    let game = custom_game(
        &[
            ((0, 4), PieceKind::King, Color::White),
            ((5, 1), PieceKind::Queen, Color::White),
            ((7, 0), PieceKind::King, Color::Black),
        ],
        Color::Black,
    );
    assert_eq!(game.status(), GameStatus::Stalemate);
    assert!(StandardRules.legal_moves(game.board()).is_empty());
}

#[test]
fn test_saved_game_reloads() {
    let mut game = Game::new();
    assert!(play(&mut game, (1, 4), (3, 4)));
    assert!(play(&mut game, (6, 4), (4, 4)));

    let json = game.save("open game").to_json().unwrap();
    let saved = chess_core::SavedGame::from_json(&json).unwrap();

    let mut restored = Game::new();
    assert!(restored.load_saved(&saved));
    assert_eq!(restored.history(), game.history());
    assert_eq!(
        restored.board().to_fen(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
    );
}

use anyhow::Result;
use chess_core::{Game, GameStatus};
use chess_mcts::{CancelToken, Evaluator, Mcts, MctsError};
use tracing::{debug, info, warn};

use crate::config::SelfPlayConfig;
use crate::data::{GameRecord, GameResult, Termination, TrainingExample};

/// Play a single self-play game
///
/// # Arguments
/// * `evaluator` - Policy/value oracle for MCTS
/// * `config` - Session configuration (ply cap, temperature schedule, search)
///
/// # Returns
/// A complete game record with all states, policies, and the final result
pub fn play_game<E: Evaluator + ?Sized>(
    evaluator: &E,
    config: &SelfPlayConfig,
) -> Result<GameRecord> {
    play_game_with_cancel(evaluator, config, &CancelToken::new())
}

/// Like [`play_game`], but stops once `cancel` is raised. A stopped game
/// comes back finished as a draw with `Termination::Cancelled`.
pub fn play_game_with_cancel<E: Evaluator + ?Sized>(
    evaluator: &E,
    config: &SelfPlayConfig,
    cancel: &CancelToken,
) -> Result<GameRecord> {
    let mut game = Game::new();
    let mut mcts = Mcts::new().with_cancel_token(cancel.clone());
    let mut record = GameRecord::new();
    let mut ply: u32 = 0;

    info!(max_moves = config.max_moves, "game started");

    let (winner, termination) = loop {
        match game.status() {
            GameStatus::Checkmate { winner } => {
                break (GameResult::win_for(winner), Termination::Checkmate)
            }
            GameStatus::Stalemate => break (GameResult::Draw, Termination::Stalemate),
            _ => {}
        }
        if ply >= config.max_moves {
            warn!(ply, "move limit reached, scoring game as a draw");
            break (GameResult::Draw, Termination::MoveLimit);
        }
        if cancel.is_cancelled() {
            warn!(ply, "session stopped, scoring game as a draw");
            break (GameResult::Draw, Termination::Cancelled);
        }

        // Run MCTS search
        let search_config = config
            .mcts
            .clone()
            .with_temperature(config.temperature_for_move(ply));
        let result = match mcts.search(game.board(), evaluator, &search_config) {
            Ok(result) => result,
            Err(MctsError::Cancelled) => {
                warn!(ply, "session stopped, scoring game as a draw");
                break (GameResult::Draw, Termination::Cancelled);
            }
            Err(err) => return Err(err.into()),
        };

        // Record state, policy, and move
        let mv = result.best_move;
        record.add_move(game.board().clone(), result.policy_distribution, mv);

        // Apply the move through the game so its legality is checked again
        if !(game.select_piece(mv.from) && game.move_piece(mv.to)) {
            anyhow::bail!("Search produced an unplayable move {}", mv.notation());
        }

        // The tree is rebuilt for every move
        mcts.reset();
        ply += 1;

        if ply % 5 == 0 {
            debug!(ply, last = %mv.notation(), root_value = result.root_value, "game progress");
        }
    };

    mcts.reset();
    record.finish(winner, termination);
    info!(?winner, ?termination, moves = record.len(), "game finished");

    Ok(record)
}

/// Convert game record to training examples
///
/// Each position in the game is converted to a training example with:
/// - board_encoding: the position's feature planes
/// - policy_target: the MCTS visit distribution
/// - value_target: the game outcome for the side to move
pub fn game_to_training_examples(record: &GameRecord) -> Vec<TrainingExample> {
    record
        .states
        .iter()
        .zip(record.policies.iter())
        .map(|(state, policy)| {
            TrainingExample::new(
                state.encode(),
                policy.clone(),
                record.winner.value_for(state.side_to_move),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{Board, ENCODING_LEN, POLICY_SIZE};
    use chess_mcts::{MctsConfig, NoEvaluator};

    fn quick_config(max_moves: u32) -> SelfPlayConfig {
        SelfPlayConfig::default()
            .with_max_moves(max_moves)
            .with_mcts(MctsConfig::default().with_simulations(4))
    }

    #[test]
    fn test_ply_cap_scores_draw() {
        let record = play_game(&NoEvaluator, &quick_config(6)).unwrap();

        assert_eq!(record.len(), 6);
        assert_eq!(record.winner, GameResult::Draw);
        assert_eq!(record.termination, Termination::MoveLimit);
        assert_eq!(record.states[0], Board::new());
        assert!(record.policies.iter().all(|p| p.len() == POLICY_SIZE));
    }

    #[test]
    fn test_cancelled_game_is_a_draw() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let record = play_game_with_cancel(&NoEvaluator, &quick_config(50), &cancel).unwrap();

        assert!(record.is_empty());
        assert_eq!(record.winner, GameResult::Draw);
        assert_eq!(record.termination, Termination::Cancelled);
    }

    #[test]
    fn test_value_targets_follow_side_to_move() {
        let mut record = play_game(&NoEvaluator, &quick_config(4)).unwrap();
        record.finish(GameResult::WhiteWin, Termination::Checkmate);

        let examples = game_to_training_examples(&record);
        assert_eq!(examples.len(), 4);
        let values: Vec<f64> = examples.iter().map(|e| e.value_target).collect();
        assert_eq!(values, vec![1.0, -1.0, 1.0, -1.0]);
        assert!(examples.iter().all(|e| e.board_encoding.len() == ENCODING_LEN));
    }

    #[test]
    fn test_draw_values_are_zero() {
        let record = play_game(&NoEvaluator, &quick_config(3)).unwrap();
        let examples = game_to_training_examples(&record);
        assert!(examples.iter().all(|e| e.value_target == 0.0));
    }
}

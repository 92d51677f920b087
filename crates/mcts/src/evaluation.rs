use chess_core::{Board, ChessMove, Color, POLICY_SIZE};
use tracing::debug;

use crate::error::EvaluatorError;

/// Output of an evaluator for one position
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Probabilities over `from * 64 + to` move indices
    pub policy: Vec<f32>,
    /// Expected outcome in [-1, 1] for the side to move
    pub value: f64,
}

/// Policy/value oracle consulted by the search.
///
/// `predict_batch` defaults to one `predict` per input; implementations
/// backed by a model that benefits from batching should override it.
pub trait Evaluator {
    /// Feature vector handed to `predict`
    fn encode(&self, board: &Board) -> Vec<f32> {
        board.encode()
    }

    fn predict(&self, features: &[f32]) -> Result<Prediction, EvaluatorError>;

    fn predict_batch(&self, batch: &[Vec<f32>]) -> Result<Vec<Prediction>, EvaluatorError> {
        batch.iter().map(|features| self.predict(features)).collect()
    }
}

/// Stand-in when no model is loaded. Every prediction fails, so the search
/// runs on uniform priors and the material estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEvaluator;

impl Evaluator for NoEvaluator {
    fn predict(&self, _features: &[f32]) -> Result<Prediction, EvaluatorError> {
        Err(EvaluatorError::Unavailable)
    }
}

/// Runs the evaluator on `board`, returning `None` (and logging why) when
/// it fails or answers with a malformed policy.
pub fn evaluate_board<E: Evaluator + ?Sized>(board: &Board, evaluator: &E) -> Option<Prediction> {
    let features = evaluator.encode(board);
    let prediction = evaluator.predict(&features).and_then(|p| {
        if p.policy.len() == POLICY_SIZE {
            Ok(p)
        } else {
            Err(EvaluatorError::BadPolicyLength {
                expected: POLICY_SIZE,
                actual: p.policy.len(),
            })
        }
    });

    match prediction {
        Ok(p) => Some(p),
        Err(err) => {
            debug!(error = %err, "evaluator failed, using material fallback");
            None
        }
    }
}

/// `tanh(material / 10)` with material counted for the side to move
pub fn material_value(board: &Board) -> f64 {
    let balance = board.material_balance() as f64;
    let signed = match board.side_to_move {
        Color::White => balance,
        Color::Black => -balance,
    };
    (signed / 10.0).tanh()
}

/// Pairs each legal move with its share of the policy mass. Falls back to a
/// uniform prior when there is no policy or the legal moves carry no usable
/// mass.
pub fn legal_priors(policy: Option<&[f32]>, moves: &[ChessMove]) -> Vec<(ChessMove, f64)> {
    if moves.is_empty() {
        return Vec::new();
    }
    let uniform = 1.0 / moves.len() as f64;

    let Some(policy) = policy else {
        return moves.iter().map(|&mv| (mv, uniform)).collect();
    };

    let masses: Vec<f64> = moves
        .iter()
        .map(|mv| {
            let p = policy.get(mv.policy_index()).copied().unwrap_or(0.0) as f64;
            if p.is_finite() {
                p.max(0.0)
            } else {
                f64::NAN
            }
        })
        .collect();
    let total: f64 = masses.iter().sum();

    if !total.is_finite() || total <= 0.0 {
        return moves.iter().map(|&mv| (mv, uniform)).collect();
    }
    moves
        .iter()
        .zip(masses)
        .map(|(&mv, m)| (mv, m / total))
        .collect()
}

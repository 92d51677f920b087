use chess_core::RulesEngine;

use crate::evaluation::{evaluate_board, legal_priors, material_value, Evaluator};
use crate::tree::{Edge, MctsTree, NodeId};

/// Value of `node_id` for its side to move.
///
/// Terminal nodes answer from their cached result. Otherwise the evaluator
/// is consulted (material fallback when it fails) and, for a node that is
/// not expanded yet, the priors of its legal moves are kept for expansion.
pub fn evaluate_leaf<R, E>(tree: &mut MctsTree, node_id: NodeId, rules: &R, evaluator: &E) -> f64
where
    R: RulesEngine + ?Sized,
    E: Evaluator + ?Sized,
{
    let node = &tree.nodes[node_id];
    if let Some(value) = node.terminal_value {
        return value;
    }

    let prediction = evaluate_board(&node.board, evaluator);
    let value = match &prediction {
        Some(p) if p.value.is_finite() => p.value.clamp(-1.0, 1.0),
        _ => material_value(&node.board),
    };

    if !node.is_expanded {
        let moves = rules.legal_moves(&node.board);
        let priors = legal_priors(prediction.as_ref().map(|p| p.policy.as_slice()), &moves);
        tree.nodes[node_id].pending_priors = Some(priors);
    }
    value
}

/// Creates one edge per legal move of `node_id`. Children already in the
/// tree under another move order are reused as they are.
pub fn expand<R, E>(tree: &mut MctsTree, node_id: NodeId, rules: &R, evaluator: &E)
where
    R: RulesEngine + ?Sized,
    E: Evaluator + ?Sized,
{
    if tree.nodes[node_id].is_expanded || tree.nodes[node_id].is_terminal {
        return;
    }

    let priors = match tree.nodes[node_id].pending_priors.take() {
        Some(priors) => priors,
        None => {
            evaluate_leaf(tree, node_id, rules, evaluator);
            tree.nodes[node_id].pending_priors.take().unwrap_or_default()
        }
    };

    // Clone the board first to avoid borrow checker issues
    let board = tree.nodes[node_id].board.clone();
    let mut children = Vec::with_capacity(priors.len());
    for (mv, prior) in priors {
        let child_board = rules.apply(&board, &mv);
        let child = tree.get_or_insert(child_board, node_id, prior);
        children.push(Edge {
            mv,
            child,
            visits: 0,
        });
    }

    let node = &mut tree.nodes[node_id];
    node.children = children;
    node.is_expanded = true;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::NoEvaluator;
    use approx::assert_relative_eq;
    use chess_core::{Board, Game, StandardRules};

    #[test]
    fn test_expand_start_position() {
        let mut tree = MctsTree::new();
        let root = tree.initialize_root(Board::new());
        expand(&mut tree, root, &StandardRules, &NoEvaluator);

        let node = &tree.nodes[root];
        assert!(node.is_expanded);
        assert!(node.pending_priors.is_none());
        assert_eq!(node.children.len(), 20);
        assert_eq!(tree.size(), 21);
        for edge in &node.children {
            let child = &tree.nodes[edge.child];
            assert_relative_eq!(child.prior_probability, 0.05);
            assert_eq!(child.parent, Some(root));
        }
    }

    #[test]
    fn test_evaluate_leaf_keeps_priors_for_expansion() {
        let mut tree = MctsTree::new();
        let root = tree.initialize_root(Board::new());

        let value = evaluate_leaf(&mut tree, root, &StandardRules, &NoEvaluator);
        assert_eq!(value, 0.0);
        assert_eq!(tree.nodes[root].pending_priors.as_ref().map(Vec::len), Some(20));
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn test_terminal_leaf_is_not_expanded() {
        let mut game = Game::new();
        for (from, to) in [((1, 5), (2, 5)), ((6, 4), (4, 4)), ((1, 6), (3, 6)), ((7, 3), (3, 7))] {
            assert!(game.select_piece(chess_core::Position::new(from.0, from.1)));
            assert!(game.move_piece(chess_core::Position::new(to.0, to.1)));
        }

        let mut tree = MctsTree::new();
        let root = tree.initialize_root(game.board().clone());
        assert_eq!(evaluate_leaf(&mut tree, root, &StandardRules, &NoEvaluator), -1.0);

        expand(&mut tree, root, &StandardRules, &NoEvaluator);
        assert!(!tree.nodes[root].is_expanded);
        assert!(tree.nodes[root].children.is_empty());
    }
}

use rand::thread_rng;
use rand_distr::{Dirichlet, Distribution};

use crate::config::MctsConfig;
use crate::error::{MctsError, Result};
use crate::tree::{MctsTree, NodeId};

/// Add Dirichlet noise to root node priors for exploration
///
/// This is used during self-play to encourage exploration.
/// The noise is mixed with the original prior: P' = (1-ε)*P + ε*noise
///
/// Only applied to root node, not to other nodes in the tree.
pub fn add_dirichlet_noise_to_root(
    tree: &mut MctsTree,
    root_id: NodeId,
    config: &MctsConfig,
) -> Result<()> {
    let root = tree.node(root_id)?;

    if !root.is_expanded {
        return Err(MctsError::RootNotInitialized);
    }

    // A single move has nothing to be mixed with
    let n = root.children.len();
    if n < 2 {
        return Ok(());
    }

    let alpha_vec = vec![config.dirichlet_alpha as f64; n];
    let dirichlet =
        Dirichlet::new(&alpha_vec).map_err(|e| MctsError::DirichletError(e.to_string()))?;
    let noise: Vec<f64> = dirichlet.sample(&mut thread_rng());

    let eps = config.dirichlet_epsilon as f64;
    let children: Vec<NodeId> = root.children.iter().map(|e| e.child).collect();

    for (child_id, sample) in children.into_iter().zip(noise) {
        let child = &mut tree.nodes[child_id];
        child.prior_probability = (1.0 - eps) * child.prior_probability + eps * sample;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::NoEvaluator;
    use crate::expansion::expand;
    use approx::assert_relative_eq;
    use chess_core::{Board, StandardRules};

    fn expanded_root() -> MctsTree {
        let mut tree = MctsTree::new();
        let root = tree.initialize_root(Board::new());
        expand(&mut tree, root, &StandardRules, &NoEvaluator);
        tree
    }

    fn root_priors(tree: &MctsTree) -> Vec<f64> {
        tree.nodes[0]
            .children
            .iter()
            .map(|e| tree.nodes[e.child].prior_probability)
            .collect()
    }

    #[test]
    fn test_dirichlet_noise_changes_priors() {
        let mut tree = expanded_root();
        let original = root_priors(&tree);

        let config = MctsConfig::default().with_dirichlet_noise(0.3, 0.25);
        add_dirichlet_noise_to_root(&mut tree, 0, &config).unwrap();
        let noisy = root_priors(&tree);

        assert!(
            original
                .iter()
                .zip(noisy.iter())
                .any(|(o, n)| (o - n).abs() > 1e-9),
            "Priors should change after adding noise"
        );

        let sum: f64 = noisy.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        assert!(noisy.iter().all(|&p| p >= 0.75 * 0.05 - 1e-12));
    }

    #[test]
    fn test_dirichlet_noise_not_expanded() {
        let mut tree = MctsTree::new();
        tree.initialize_root(Board::new());

        let config = MctsConfig::default().with_dirichlet_noise(0.3, 0.25);
        let result = add_dirichlet_noise_to_root(&mut tree, 0, &config);
        assert!(matches!(result, Err(MctsError::RootNotInitialized)));
    }

    #[test]
    fn test_dirichlet_noise_missing_root() {
        let mut tree = MctsTree::new();
        let config = MctsConfig::default().with_dirichlet_noise(0.3, 0.25);
        let result = add_dirichlet_noise_to_root(&mut tree, 0, &config);
        assert!(matches!(result, Err(MctsError::InvalidNodeId(0))));
    }
}

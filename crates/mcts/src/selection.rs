use crate::tree::{MctsTree, NodeId};

/// Pick the child edge of `node_id` with the highest UCB score.
///
/// Unvisited children score +inf so every move is tried once. Ties go to
/// the earliest edge, which keeps greedy search deterministic. Returns
/// `None` for a node without children.
pub fn select_child(tree: &MctsTree, node_id: NodeId, c_puct: f64) -> Option<usize> {
    let node = &tree.nodes[node_id];
    let sqrt_parent = (node.visit_count as f64).sqrt();

    let mut best: Option<(usize, f64)> = None;
    for (i, edge) in node.children.iter().enumerate() {
        let score = ucb_value(tree, edge.child, sqrt_parent, c_puct);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((i, score));
        }
    }
    best.map(|(i, _)| i)
}

/// Walk from the root to a leaf, returning the visited nodes in order.
///
/// Descent continues through expanded, non-terminal nodes. It stops early
/// when the chosen child is already on the path, so a repeated position
/// ends the walk instead of looping.
pub fn select_path(tree: &MctsTree, root_id: NodeId, c_puct: f64) -> Vec<NodeId> {
    let mut path = vec![root_id];
    let mut current_id = root_id;

    loop {
        let node = &tree.nodes[current_id];

        // Stop at leaf or terminal
        if !node.is_expanded || node.is_terminal {
            return path;
        }

        let Some(edge) = select_child(tree, current_id, c_puct) else {
            return path;
        };
        let child = node.children[edge].child;
        if path.contains(&child) {
            return path;
        }
        path.push(child);
        current_id = child;
    }
}

/// UCB(s, a) = Q(s, a) + c_puct * P(s, a) * sqrt(N(s)) / (1 + N(s, a))
fn ucb_value(tree: &MctsTree, node_id: NodeId, sqrt_parent: f64, c_puct: f64) -> f64 {
    let node = &tree.nodes[node_id];
    if node.visit_count == 0 {
        return f64::INFINITY;
    }

    let q = node.q_value();
    let u = c_puct * node.prior_probability * sqrt_parent / (1.0 + node.visit_count as f64);

    q + u
}

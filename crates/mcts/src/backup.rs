use crate::tree::{MctsTree, NodeId};

/// Backup a leaf value along the simulation path.
///
/// `value` is for the side to move at the leaf. Each node stores values for
/// the player who moved into it, so the leaf receives `-value` and the sign
/// flips on every step towards the root. The edge between consecutive path
/// nodes counts the visit as well.
pub fn backup(tree: &mut MctsTree, path: &[NodeId], value: f64) {
    let mut current_value = -value;

    for (depth, &node_id) in path.iter().enumerate().rev() {
        let node = &mut tree.nodes[node_id];
        node.visit_count += 1;
        node.total_value += current_value;
        current_value = -current_value;

        if depth > 0 {
            let parent = &mut tree.nodes[path[depth - 1]];
            if let Some(edge) = parent.children.iter_mut().find(|e| e.child == node_id) {
                edge.visits += 1;
            }
        }
    }
}

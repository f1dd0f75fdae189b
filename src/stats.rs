use std::collections::HashMap;

/// Statistics for one fan-out class.
#[derive(Debug)]
pub struct NodeStats {
    pub width: usize,
    pub total_nodes: usize,
    pub total_children: usize,
    pub density: f64,
}

/// Structural statistics for a quiescent tree, plus the running count of
/// traversal restarts absorbed since the tree was created.
#[derive(Debug, Default)]
pub struct TreeStats {
    pub node_stats: HashMap<usize, NodeStats>,
    pub num_leaves: usize,
    pub num_inner_nodes: usize,
    pub total_density: f64,
    pub max_height: usize,
    pub restarts: u64,
}

pub(crate) fn record_inner_node(stats: &mut TreeStats, width: usize, num_children: usize) {
    stats
        .node_stats
        .entry(width)
        .and_modify(|e| {
            e.total_nodes += 1;
            e.total_children += num_children;
        })
        .or_insert(NodeStats {
            width,
            total_nodes: 1,
            total_children: num_children,
            density: 0.0,
        });
}

/// Shape counters for a tree. Binary backends count childless nodes as
/// leaves and hold one record per node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub size: usize,
    pub leaves: usize,
    pub inner_nodes: usize,
    pub height: usize,
    /// Maximum keys per node, 1 for binary trees.
    pub slots_per_node: usize,
}

impl TreeStats {
    pub fn new(slots_per_node: usize) -> Self {
        Self {
            slots_per_node,
            ..Default::default()
        }
    }

    pub fn nodes(&self) -> usize {
        self.inner_nodes + self.leaves
    }

    pub fn avgfill_leaves(&self) -> f64 {
        if self.leaves == 0 {
            return 0.0;
        }
        self.size as f64 / (self.leaves * self.slots_per_node) as f64
    }
}

#[cfg(test)]
#[test]
fn test_avgfill() {
    let mut stats = TreeStats::new(4);
    assert_eq!(stats.avgfill_leaves(), 0.0);
    stats.size = 6;
    stats.leaves = 2;
    stats.inner_nodes = 1;
    assert_eq!(stats.nodes(), 3);
    assert!((stats.avgfill_leaves() - 0.75).abs() < f64::EPSILON);
}

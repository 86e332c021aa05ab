//! Arena-backed paths
//!
//! Path nodes live in a flat arena with index-based parent references, since
//! a path's nodes are created and discarded wholesale every time its owner
//! retargets. The route is stored from the goal back toward (but excluding)
//! the start and consumed back-to-front: the last entry is the next step.

use crate::core::types::Cell;

/// Single node of a search result
#[derive(Debug, Clone, PartialEq)]
pub struct PathNode {
    pub cell: Cell,
    /// Accumulated cost from the start
    pub g: f32,
    /// Heuristic cost to the goal
    pub h: f32,
    /// Total cost (g + h)
    pub f: f32,
    /// Arena index of the parent node; `None` for the start node
    pub parent: Option<usize>,
}

impl PathNode {
    pub fn new(cell: Cell, parent: Option<usize>, g: f32, h: f32) -> Self {
        Self { cell, g, h, f: g + h, parent }
    }
}

/// Ordered route through the grid, exclusively owned by the agent that
/// requested it
#[derive(Debug, Clone, Default)]
pub struct Path {
    nodes: Vec<PathNode>,
    /// Arena indices from the goal back toward the start
    route: Vec<usize>,
}

impl Path {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_search(nodes: Vec<PathNode>, route: Vec<usize>) -> Self {
        Self { nodes, route }
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    pub fn len(&self) -> usize {
        self.route.len()
    }

    /// Route node by position, counting from the goal end.
    ///
    /// An out-of-bounds index is logged and treated as "no node".
    pub fn node(&self, index: usize) -> Option<&PathNode> {
        match self.route.get(index) {
            Some(&arena_idx) => self.nodes.get(arena_idx),
            None => {
                tracing::warn!(index, len = self.route.len(), "path node index out of bounds");
                None
            }
        }
    }

    /// The next node to walk toward, if any
    pub fn next_node(&self) -> Option<&PathNode> {
        self.route.last().map(|&i| &self.nodes[i])
    }

    /// Consumes the next node once the agent has reached it
    pub fn advance(&mut self) {
        self.route.pop();
    }

    /// Remaining cells in travel order (next step first)
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.route.iter().rev().map(|&i| self.nodes[i].cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_step_path() -> Path {
        // Arena: start excluded; route (3,0) -> (2,0) -> (1,0), goal-first.
        let nodes = vec![
            PathNode::new((1, 0), None, 1.0, 2.0),
            PathNode::new((2, 0), Some(0), 2.0, 1.0),
            PathNode::new((3, 0), Some(1), 3.0, 0.0),
        ];
        Path::from_search(nodes, vec![2, 1, 0])
    }

    #[test]
    fn test_consumed_back_to_front() {
        let mut path = three_step_path();
        assert_eq!(path.next_node().map(|n| n.cell), Some((1, 0)));
        path.advance();
        assert_eq!(path.next_node().map(|n| n.cell), Some((2, 0)));
        path.advance();
        assert_eq!(path.next_node().map(|n| n.cell), Some((3, 0)));
        path.advance();
        assert!(path.next_node().is_none());
        assert!(path.is_empty());
    }

    #[test]
    fn test_cells_in_travel_order() {
        let path = three_step_path();
        let cells: Vec<_> = path.cells().collect();
        assert_eq!(cells, vec![(1, 0), (2, 0), (3, 0)]);
    }

    #[test]
    fn test_out_of_bounds_node_is_none() {
        let path = three_step_path();
        assert!(path.node(0).is_some());
        assert!(path.node(99).is_none());
    }

    #[test]
    fn test_total_cost_is_sum() {
        let node = PathNode::new((0, 0), None, 4.0, 6.0);
        assert_eq!(node.f, 10.0);
    }
}

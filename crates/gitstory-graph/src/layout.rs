use gitstory_core::{CommitId, LayoutConfig, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Integer slot on the layout grid. Positions are derived from cells, so two
/// nodes collide exactly when their cells are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub column: i32,
    pub row: i32,
}

impl GridCell {
    pub const ORIGIN: GridCell = GridCell { column: 0, row: 0 };

    pub fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    pub fn right(self) -> Self {
        Self::new(self.column + 1, self.row)
    }

    pub fn below(self) -> Self {
        Self::new(self.column, self.row + 1)
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedNode {
    pub cell: GridCell,
    pub position: Vec2,
}

/// Positions assigned during one run. First placement wins and nothing is
/// ever moved or removed.
#[derive(Debug, Clone, Default)]
pub struct LayoutState {
    order: Vec<CommitId>,
    placed: HashMap<CommitId, PlacedNode>,
    occupied: HashSet<GridCell>,
}

impl LayoutState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &CommitId) -> Option<PlacedNode> {
        self.placed.get(id).copied()
    }

    pub fn is_occupied(&self, cell: GridCell) -> bool {
        self.occupied.contains(&cell)
    }

    /// Record a placement. Returns false, leaving the state untouched, if the
    /// commit already has a position or the cell is taken.
    pub fn record(&mut self, id: CommitId, node: PlacedNode) -> bool {
        if self.placed.contains_key(&id) || self.occupied.contains(&node.cell) {
            tracing::warn!("refusing to re-place {} at {}", id, node.cell);
            return false;
        }
        self.occupied.insert(node.cell);
        self.placed.insert(id.clone(), node);
        self.order.push(id);
        true
    }

    /// Placed nodes in the order they were drawn.
    pub fn iter(&self) -> impl Iterator<Item = (&CommitId, PlacedNode)> {
        self.order.iter().map(|id| (id, self.placed[id]))
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.iter().map(|(_, node)| node.position)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub cell: GridCell,
    pub position: Vec2,
    /// Occupied cells skipped before a free one was found.
    pub collisions: usize,
}

/// Assigns each new commit a free grid cell relative to the node drawn before it.
#[derive(Debug, Clone)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn position_of(&self, cell: GridCell) -> Vec2 {
        self.config.origin
            + Vec2::new(
                cell.column as f32 * self.config.horizontal_spacing,
                cell.row as f32 * self.config.vertical_spacing,
            )
    }

    /// Propose the cell right of `previous` (or the origin for the first
    /// node) and probe downward until the cell is free.
    pub fn place(&self, state: &LayoutState, previous: Option<GridCell>) -> Placement {
        let mut cell = previous.map_or(GridCell::ORIGIN, GridCell::right);
        let mut collisions = 0;
        while state.is_occupied(cell) {
            cell = cell.below();
            collisions += 1;
        }
        if collisions > 0 {
            tracing::debug!("placement probed {} occupied cells, settled on {}", collisions, cell);
        }
        Placement {
            cell,
            position: self.position_of(cell),
            collisions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(state: &mut LayoutState, engine: &LayoutEngine, id: &str, placement: Placement) {
        assert!(state.record(
            CommitId::new(id),
            PlacedNode {
                cell: placement.cell,
                position: engine.position_of(placement.cell),
            }
        ));
    }

    #[test]
    fn test_first_node_at_origin() {
        let engine = LayoutEngine::new(LayoutConfig::default());
        let placement = engine.place(&LayoutState::new(), None);
        assert_eq!(placement.cell, GridCell::ORIGIN);
        assert_eq!(placement.position, Vec2::ZERO);
        assert_eq!(placement.collisions, 0);
    }

    #[test]
    fn test_next_node_goes_right() {
        let engine = LayoutEngine::new(LayoutConfig::default());
        let mut state = LayoutState::new();
        let first = engine.place(&state, None);
        record(&mut state, &engine, "a", first);
        let second = engine.place(&state, Some(first.cell));
        assert_eq!(second.position, Vec2::new(2.5, 0.0));
    }

    #[test]
    fn test_collision_probes_downward() {
        let engine = LayoutEngine::new(LayoutConfig::default());
        let mut state = LayoutState::new();
        let root = engine.place(&state, None);
        record(&mut state, &engine, "root", root);
        let left = engine.place(&state, Some(root.cell));
        record(&mut state, &engine, "left", left);

        // A sibling of `left` proposes the same cell and has to move down.
        let right = engine.place(&state, Some(root.cell));
        assert_eq!(right.cell, GridCell::new(1, 1));
        assert_eq!(right.position, Vec2::new(2.5, 4.5));
        assert_eq!(right.collisions, 1);
    }

    #[test]
    fn test_record_never_reassigns() {
        let mut state = LayoutState::new();
        let node = PlacedNode {
            cell: GridCell::ORIGIN,
            position: Vec2::ZERO,
        };
        assert!(state.record(CommitId::new("a"), node));
        let moved = PlacedNode {
            cell: GridCell::new(3, 3),
            position: Vec2::new(7.5, 13.5),
        };
        assert!(!state.record(CommitId::new("a"), moved));
        assert!(!state.record(CommitId::new("b"), node));
        assert_eq!(state.get(&CommitId::new("a")), Some(node));
        assert_eq!(state.len(), 1);
    }

    proptest! {
        /// Any sequence of placements keeps every pair of nodes at least one
        /// spacing apart on some axis.
        #[test]
        fn prop_placements_never_overlap(parents in proptest::collection::vec(0usize..64, 1..40)) {
            let config = LayoutConfig::default();
            let engine = LayoutEngine::new(config.clone());
            let mut state = LayoutState::new();
            let mut cells: Vec<GridCell> = Vec::new();

            for (i, pick) in parents.iter().enumerate() {
                let previous = if cells.is_empty() { None } else { Some(cells[pick % cells.len()]) };
                let placement = engine.place(&state, previous);
                prop_assert!(!state.is_occupied(placement.cell));
                record(&mut state, &engine, &format!("c{i}"), placement);
                cells.push(placement.cell);
            }

            let positions: Vec<Vec2> = state.positions().collect();
            for (i, a) in positions.iter().enumerate() {
                for b in &positions[i + 1..] {
                    let dx = (a.x - b.x).abs();
                    let dy = (a.y - b.y).abs();
                    prop_assert!(
                        dx >= config.horizontal_spacing - 1e-3 || dy >= config.vertical_spacing - 1e-3,
                        "{:?} and {:?} overlap", a, b
                    );
                }
            }
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::models::Item;

/// The computed outcome of a move, before anything is persisted.
///
/// A plan carries the moved item with its new position already applied,
/// plus any neighbours the move had to displace. `neighbours` is either
/// empty (the common case) or exactly two items ordered `[before, after]`,
/// produced when the move landed between two adjacent positions and both
/// sides had to shift to open a gap.
///
/// Plans are inert: inspecting or dropping one changes nothing. Passing it
/// to [`PositioningService::commit`](crate::services::PositioningService::commit)
/// consumes the plan and performs the writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePlan {
    /// The item being moved, with its new position set
    pub target: Item,

    /// Displaced neighbours with their new positions set; empty or
    /// `[before, after]`
    pub neighbours: Vec<Item>,
}

impl MovePlan {
    /// Plan that touches only the moved item
    pub(crate) fn solo(target: Item) -> Self {
        Self {
            target,
            neighbours: Vec::new(),
        }
    }

    /// Plan that also repositions both adjacent neighbours
    pub(crate) fn with_neighbours(target: Item, before: Item, after: Item) -> Self {
        Self {
            target,
            neighbours: vec![before, after],
        }
    }

    /// Whether committing this plan will write more rows than the target
    pub fn has_neighbours(&self) -> bool {
        !self.neighbours.is_empty()
    }
}

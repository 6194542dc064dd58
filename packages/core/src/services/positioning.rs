//! Positioning Service - Scoped Ordering Operations
//!
//! This module provides the business logic for user-driven reordering:
//!
//! - Move operations (move_before, move_after, move_between, move_to_end)
//! - Read helpers for inspecting an item's surroundings
//! - Two-phase commit of computed placements
//!
//! # Two-Phase Moves
//!
//! Move operations never write. Each one reads neighbour positions through
//! the [`ItemStore`], computes new positions, and returns a [`MovePlan`]
//! holding the target (and, after a collision, its two displaced
//! neighbours) with new positions applied in memory. [`commit`] performs
//! the writes: the target first, then the neighbours, so a failed target
//! write leaves the store untouched.
//!
//! Callers that need atomicity across the plan's rows should run the
//! surrounding read-compute-commit sequence inside one store transaction;
//! this service itself takes no locks.
//!
//! [`commit`]: PositioningService::commit

use std::sync::Arc;

use crate::db::{position_between, ItemStore, START_POSITION};
use crate::models::Item;
use crate::services::error::PositioningError;
use crate::services::move_plan::MovePlan;

/// Service for computing and persisting item placements within a scope
///
/// # Examples
///
/// ```no_run
/// use worklist_core::db::{DatabaseService, ItemStore, TursoStore};
/// use worklist_core::models::Item;
/// use worklist_core::services::PositioningService;
/// use serde_json::json;
/// use std::path::PathBuf;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let db = Arc::new(DatabaseService::new(PathBuf::from("./worklist.db")).await?);
///     let store: Arc<dyn ItemStore> = Arc::new(TursoStore::new(db));
///     let service = PositioningService::new(store.clone());
///
///     let item = store
///         .create_item(Item::new("list-1", "First item", json!({})))
///         .await?;
///
///     let plan = service.move_to_end("list-1", &item).await?;
///     let placed = service.commit(plan).await?;
///     println!("Placed at {:?}", placed.position);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct PositioningService {
    /// Item store for neighbour queries and position writes
    store: Arc<dyn ItemStore>,
}

impl PositioningService {
    /// Create a new PositioningService on top of an item store
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    /// Get access to the underlying store
    ///
    /// Useful for callers that combine item CRUD with move operations.
    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    //
    // READ HELPERS
    //

    /// Get the highest position currently assigned within a scope
    pub async fn max_relative_position(
        &self,
        scope_key: &str,
    ) -> Result<Option<i64>, PositioningError> {
        self.store
            .max_position(scope_key)
            .await
            .map_err(|e| PositioningError::query_failed(e.to_string()))
    }

    /// Get the position of the item's nearest placed predecessor
    ///
    /// Returns `Ok(None)` when the item is unplaced or nothing sits below it.
    pub async fn prev_relative_position(
        &self,
        item: &Item,
    ) -> Result<Option<i64>, PositioningError> {
        let Some(position) = item.position else {
            return Ok(None);
        };

        self.store
            .position_before(&item.scope_key, position, &[])
            .await
            .map_err(|e| PositioningError::query_failed(e.to_string()))
    }

    /// Get the position of the item's nearest placed successor
    ///
    /// Returns `Ok(None)` when the item is unplaced or nothing sits above it.
    pub async fn next_relative_position(
        &self,
        item: &Item,
    ) -> Result<Option<i64>, PositioningError> {
        let Some(position) = item.position else {
            return Ok(None);
        };

        self.store
            .position_after(&item.scope_key, position, &[])
            .await
            .map_err(|e| PositioningError::query_failed(e.to_string()))
    }

    //
    // MOVE OPERATIONS
    // Each returns a MovePlan; nothing is persisted until commit().
    //

    /// Place the target after everything currently in the scope
    ///
    /// An empty scope assigns `START_POSITION`, leaving room on both sides;
    /// subsequent appends advance by `DISTANCE`.
    pub async fn move_to_end(
        &self,
        scope_key: &str,
        target: &Item,
    ) -> Result<MovePlan, PositioningError> {
        self.guard_move(scope_key, target, &[])?;

        let position = match self.max_relative_position(scope_key).await? {
            Some(max) => position_between(Some(max), None)?,
            None => START_POSITION,
        };

        let mut moved = target.clone();
        moved.set_position(position);

        tracing::debug!(
            "Appending {} to scope '{}' at position {}",
            moved.id,
            scope_key,
            position
        );

        Ok(MovePlan::solo(moved))
    }

    /// Place the target immediately before `after`
    pub async fn move_before(
        &self,
        scope_key: &str,
        target: &Item,
        after: &Item,
    ) -> Result<MovePlan, PositioningError> {
        self.guard_move(scope_key, target, &[after])?;

        let position = self
            .position_for_move_before(after, &[target.id.as_str()])
            .await?;

        let mut moved = target.clone();
        moved.set_position(position);

        Ok(MovePlan::solo(moved))
    }

    /// Place the target immediately after `before`
    pub async fn move_after(
        &self,
        scope_key: &str,
        target: &Item,
        before: &Item,
    ) -> Result<MovePlan, PositioningError> {
        self.guard_move(scope_key, target, &[before])?;

        let position = self
            .position_for_move_after(before, &[target.id.as_str()])
            .await?;

        let mut moved = target.clone();
        moved.set_position(position);

        Ok(MovePlan::solo(moved))
    }

    /// Place the target between two neighbours, displacing them if the gap
    /// between their positions is exhausted
    ///
    /// With one neighbour absent this delegates to [`Self::move_after`] /
    /// [`Self::move_before`]; with both absent it appends via
    /// [`Self::move_to_end`].
    ///
    /// When both neighbours are present but their positions are adjacent
    /// (gap of 1 or less), there is no integer slot between them. The
    /// target then takes the `before` neighbour's slot and both neighbours
    /// are pushed outward, each recomputed against its own next-nearest
    /// sibling. The returned plan carries all three items; the displacement
    /// goes exactly one neighbour deep on each side, so if a neighbour's
    /// own sibling is also 1 apart the move fails with an exhausted-gap
    /// error instead of cascading further.
    pub async fn move_between(
        &self,
        scope_key: &str,
        target: &Item,
        before: Option<&Item>,
        after: Option<&Item>,
    ) -> Result<MovePlan, PositioningError> {
        let (before, after) = match (before, after) {
            (None, None) => return self.move_to_end(scope_key, target).await,
            (Some(before), None) => return self.move_after(scope_key, target, before).await,
            (None, Some(after)) => return self.move_before(scope_key, target, after).await,
            (Some(before), Some(after)) => (before, after),
        };

        self.guard_move(scope_key, target, &[before, after])?;

        let pos_before = before
            .position
            .ok_or_else(|| PositioningError::missing_position(&before.id))?;
        let pos_after = after
            .position
            .ok_or_else(|| PositioningError::missing_position(&after.id))?;

        if (pos_after - pos_before).abs() <= 1 {
            // Collision: the target occupies the lower slot, and both
            // neighbours shift outward around it.
            let mut moved_target = target.clone();
            moved_target.set_position(pos_before);

            // All three rows carry stale positions until commit, so the
            // neighbour queries must skip them.
            let in_flight = [
                target.id.as_str(),
                before.id.as_str(),
                after.id.as_str(),
            ];

            let mut moved_before = before.clone();
            let position = self
                .position_for_move_before(&moved_target, &in_flight)
                .await?;
            moved_before.set_position(position);

            let mut moved_after = after.clone();
            let position = self
                .position_for_move_after(&moved_target, &in_flight)
                .await?;
            moved_after.set_position(position);

            tracing::debug!(
                "Collision at {}..{} in scope '{}': {} takes {}, displacing {} and {}",
                pos_before,
                pos_after,
                scope_key,
                target.id,
                pos_before,
                before.id,
                after.id
            );

            return Ok(MovePlan::with_neighbours(
                moved_target,
                moved_before,
                moved_after,
            ));
        }

        let position = position_between(Some(pos_before), Some(pos_after))?;
        let mut moved = target.clone();
        moved.set_position(position);

        Ok(MovePlan::solo(moved))
    }

    /// Persist a computed plan
    ///
    /// Writes the target's position first; displaced neighbours are written
    /// only once the target's write succeeded, in `[before, after]` order.
    ///
    /// Consuming the plan by value means a committed (or failed) plan
    /// cannot be replayed with stale positions.
    ///
    /// # Errors
    ///
    /// - [`PositioningError::TargetSaveFailed`]: the target write failed;
    ///   nothing was persisted and the move can simply be retried.
    /// - [`PositioningError::NeighbourSaveFailed`]: the target is already
    ///   durable but a neighbour write failed, so the scope's ordering may
    ///   be inconsistent until the caller retries the neighbour shift or
    ///   repairs it. Writes stop at the first failed neighbour.
    pub async fn commit(&self, plan: MovePlan) -> Result<Item, PositioningError> {
        let MovePlan { target, neighbours } = plan;

        // Refuse malformed plans before any write lands
        target.validate()?;
        let target_position = target
            .position
            .ok_or_else(|| PositioningError::missing_position(&target.id))?;

        let mut neighbour_writes = Vec::with_capacity(neighbours.len());
        for neighbour in &neighbours {
            neighbour.validate()?;
            let position = neighbour
                .position
                .ok_or_else(|| PositioningError::missing_position(&neighbour.id))?;
            neighbour_writes.push((neighbour.id.clone(), position));
        }

        // The target's write is the owning write; neighbours are only
        // attempted once it is durable.
        self.store
            .save_position(&target.id, target_position)
            .await
            .map_err(|e| PositioningError::target_save_failed(&target.id, e.to_string()))?;

        for (neighbour_id, position) in neighbour_writes {
            if let Err(e) = self.store.save_position(&neighbour_id, position).await {
                tracing::warn!(
                    "Neighbour {} failed to persist after target {}: {}",
                    neighbour_id,
                    target.id,
                    e
                );
                return Err(PositioningError::neighbour_save_failed(
                    neighbour_id,
                    &target.id,
                    e.to_string(),
                ));
            }
        }

        tracing::debug!(
            "Committed move of {} to position {}",
            target.id,
            target_position
        );

        Ok(target)
    }

    //
    // INTERNAL HELPERS
    //

    /// Validate the participants of a move before touching the store
    fn guard_move(
        &self,
        scope_key: &str,
        target: &Item,
        references: &[&Item],
    ) -> Result<(), PositioningError> {
        target.validate()?;

        if target.scope_key != scope_key {
            return Err(PositioningError::scope_mismatch(
                &target.id,
                &target.scope_key,
                scope_key,
            ));
        }

        for reference in references {
            if reference.id == target.id {
                return Err(PositioningError::circular_move(&target.id));
            }
            if reference.scope_key != scope_key {
                return Err(PositioningError::scope_mismatch(
                    &reference.id,
                    &reference.scope_key,
                    scope_key,
                ));
            }
        }

        Ok(())
    }

    /// Compute a position directly before `reference`
    ///
    /// The lower bound is the reference's nearest placed predecessor,
    /// skipping `ignoring` rows.
    async fn position_for_move_before(
        &self,
        reference: &Item,
        ignoring: &[&str],
    ) -> Result<i64, PositioningError> {
        let Some(ref_position) = reference.position else {
            return Err(PositioningError::missing_position(&reference.id));
        };

        let lower = self
            .store
            .position_before(&reference.scope_key, ref_position, ignoring)
            .await
            .map_err(|e| PositioningError::query_failed(e.to_string()))?;

        Ok(position_between(lower, Some(ref_position))?)
    }

    /// Compute a position directly after `reference`
    ///
    /// The upper bound is the reference's nearest placed successor,
    /// skipping `ignoring` rows.
    async fn position_for_move_after(
        &self,
        reference: &Item,
        ignoring: &[&str],
    ) -> Result<i64, PositioningError> {
        let Some(ref_position) = reference.position else {
            return Err(PositioningError::missing_position(&reference.id));
        };

        let upper = self
            .store
            .position_after(&reference.scope_key, ref_position, ignoring)
            .await
            .map_err(|e| PositioningError::query_failed(e.to_string()))?;

        Ok(position_between(Some(ref_position), upper)?)
    }
}

//! Service Layer Error Types
//!
//! This module defines error types for the positioning service, providing
//! detailed error handling for placement and persistence failures.

use crate::db::PositionError;
use crate::models::ValidationError;
use thiserror::Error;

/// Positioning operation errors
///
/// Provides high-level error types for all move and commit operations,
/// with detailed context and proper error chaining.
#[derive(Error, Debug)]
pub enum PositioningError {
    /// Validation failed for an item involved in the move
    #[error("Item validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Position arithmetic failed (exhausted gap or out-of-range bound)
    #[error("Position calculation failed: {0}")]
    Position(#[from] PositionError),

    /// An item belongs to a different scope than the move targets
    #[error("Item {item_id} belongs to scope '{item_scope}', expected '{expected_scope}'")]
    ScopeMismatch {
        item_id: String,
        item_scope: String,
        expected_scope: String,
    },

    /// An item was passed as its own reference point
    #[error("Item {id} cannot be moved relative to itself")]
    CircularMove { id: String },

    /// A reference item has no position to compute against
    #[error("Item {id} has no position assigned")]
    MissingPosition { id: String },

    /// Store query failed while reading neighbour positions
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Persisting the moved item itself failed; nothing was written
    #[error("Failed to save moved item {item_id}: {context}")]
    TargetSaveFailed { item_id: String, context: String },

    /// Persisting a displaced neighbour failed after the moved item was
    /// already written
    #[error("Failed to save neighbour {item_id} displaced by {target_id}: {context}")]
    NeighbourSaveFailed {
        item_id: String,
        target_id: String,
        context: String,
    },
}

impl PositioningError {
    /// Create a scope mismatch error
    pub fn scope_mismatch(
        item_id: impl Into<String>,
        item_scope: impl Into<String>,
        expected_scope: impl Into<String>,
    ) -> Self {
        Self::ScopeMismatch {
            item_id: item_id.into(),
            item_scope: item_scope.into(),
            expected_scope: expected_scope.into(),
        }
    }

    /// Create a circular move error
    pub fn circular_move(id: impl Into<String>) -> Self {
        Self::CircularMove { id: id.into() }
    }

    /// Create a missing position error
    pub fn missing_position(id: impl Into<String>) -> Self {
        Self::MissingPosition { id: id.into() }
    }

    /// Create a query failed error
    pub fn query_failed(msg: impl Into<String>) -> Self {
        Self::QueryFailed(msg.into())
    }

    /// Create a target save failed error
    pub fn target_save_failed(item_id: impl Into<String>, context: impl Into<String>) -> Self {
        Self::TargetSaveFailed {
            item_id: item_id.into(),
            context: context.into(),
        }
    }

    /// Create a neighbour save failed error
    pub fn neighbour_save_failed(
        item_id: impl Into<String>,
        target_id: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::NeighbourSaveFailed {
            item_id: item_id.into(),
            target_id: target_id.into(),
            context: context.into(),
        }
    }
}

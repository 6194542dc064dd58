//! Business Services
//!
//! This module contains the core business logic services:
//!
//! - `PositioningService` - Scoped ordering and two-phase move operations
//! - `MovePlan` - Computed placement awaiting commit
//!
//! Services coordinate between the database layer and application logic,
//! implementing business rules and orchestrating complex operations.

pub mod error;
pub mod move_plan;
pub mod positioning;

pub use error::PositioningError;
pub use move_plan::MovePlan;
pub use positioning::PositioningService;

//! Worklist Core Ordering Layer
//!
//! This crate provides scoped, user-controlled ordering of items backed by a
//! sparse integer position column, for the Worklist task manager.
//!
//! # Architecture
//!
//! - **Sparse positions**: Items carry an integer `position`; new placements
//!   land in the gaps so reordering rarely touches more than one row
//! - **Scoped ordering**: Every query and move is confined to one `scope_key`
//!   (one list); scopes never interact
//! - **Two-phase moves**: Move operations compute a [`MovePlan`] without
//!   writing; [`PositioningService::commit`] persists it
//! - **libsql/Turso**: Embedded SQLite-compatible database with sync capability
//!
//! # Modules
//!
//! - [`models`] - Data structures (Item, DeleteResult)
//! - [`services`] - Business services (PositioningService, MovePlan)
//! - [`db`] - Database layer with libsql integration and position arithmetic

pub mod models;
pub mod services;
pub mod db;

// Re-export commonly used types
pub use models::*;
pub use services::*;

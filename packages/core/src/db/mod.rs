//! Database Layer
//!
//! This module handles all database interactions using libsql/Turso:
//!
//! - Database initialization and connection management
//! - Item storage with a sparse integer `position` column per scope
//! - Position arithmetic for gap-based ordering
//!
//! # Architecture
//!
//! The layer splits into three pieces:
//!
//! - `DatabaseService` owns the connection and the raw SQL (`db_*` methods)
//! - `ItemStore` is the trait the service layer programs against
//! - `TursoStore` implements `ItemStore` by delegating to `DatabaseService`
//!
//! `relative_position` is pure arithmetic with no database dependency; it is
//! exposed here because its constants bound what the `position` column may
//! hold.

mod database;
mod error;
mod item_store;
pub mod relative_position;
mod turso_store;

pub use database::{DatabaseService, DbCreateItemParams};
pub use error::DatabaseError;
pub use item_store::ItemStore;
pub use relative_position::{
    position_between, PositionError, DISTANCE, MAX_POSITION, MIN_POSITION, START_POSITION,
};
pub use turso_store::TursoStore;

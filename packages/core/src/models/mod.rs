//! Data Models
//!
//! This module contains the core data structures for ordered worklists:
//!
//! - `Item` - A record ordered within its scope by a sparse position column
//! - `DeleteResult` - Outcome of a delete operation
//!
//! Items carry free-form data in a JSON `properties` field alongside the
//! ordering metadata, so callers can attach domain fields without schema
//! changes.

mod item;

pub use item::{DeleteResult, Item, ValidationError};

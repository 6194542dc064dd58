//! ItemStore Trait - Database Abstraction Layer
//!
//! This module defines the `ItemStore` trait that abstracts item persistence
//! for the ordering layer. The trait keeps PositioningService independent of
//! the concrete backend, so tests can wrap or replace the store (for example
//! to inject write failures) without touching business logic.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async to support both embedded and
//!    network backends
//! 2. **Ownership Semantics**: `create_item` takes ownership of the item to
//!    avoid unnecessary cloning (caller can clone if needed)
//! 3. **Error Handling**: Uses `anyhow::Result` for flexible error context
//!
//! # Examples
//!
//! ```rust,no_run
//! use worklist_core::db::{DatabaseService, ItemStore, TursoStore};
//! use worklist_core::models::Item;
//! use serde_json::json;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Create database service
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("worklist.db")).await?);
//!
//!     // Wrap in ItemStore trait
//!     let store: Arc<dyn ItemStore> = Arc::new(TursoStore::new(db));
//!
//!     // Use abstraction layer
//!     let item = Item::new("list-1", "My first item", json!({}));
//!     let created = store.create_item(item).await?;
//!     println!("Created item: {}", created.id);
//!
//!     Ok(())
//! }
//! ```

use crate::models::{DeleteResult, Item};
use anyhow::Result;
use async_trait::async_trait;

/// Abstraction layer for item persistence operations
///
/// Covers the CRUD surface plus the ordering queries PositioningService
/// needs to compute placements: the scope maximum and the nearest assigned
/// positions around a reference point.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage in async contexts
/// where futures may be moved between threads.
#[async_trait]
pub trait ItemStore: Send + Sync {
    //
    // CORE CRUD OPERATIONS
    //

    /// Create a new item in the database
    ///
    /// # Arguments
    ///
    /// * `item` - Item to create (ownership transferred to avoid cloning)
    ///
    /// # Returns
    ///
    /// Created item with any database-generated fields (timestamps)
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Item ID already exists (duplicate key)
    /// - Validation fails (empty id/scope, non-object properties,
    ///   out-of-range position)
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use worklist_core::db::ItemStore;
    /// # use worklist_core::models::Item;
    /// # use serde_json::json;
    /// # async fn example(store: &dyn ItemStore) -> anyhow::Result<()> {
    /// let item = Item::new("list-1", "Review backlog", json!({}));
    /// let created = store.create_item(item).await?;
    /// println!("Created item: {}", created.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn create_item(&self, item: Item) -> Result<Item>;

    /// Get item by ID
    ///
    /// # Returns
    ///
    /// - `Ok(Some(item))` if the item exists
    /// - `Ok(None)` if the item doesn't exist (not an error)
    /// - `Err(_)` if a database error occurs
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use worklist_core::db::ItemStore;
    /// # async fn example(store: &dyn ItemStore) -> anyhow::Result<()> {
    /// match store.get_item("item-123").await? {
    ///     Some(item) => println!("Found: {}", item.content),
    ///     None => println!("Item not found"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    async fn get_item(&self, id: &str) -> Result<Option<Item>>;

    /// Delete an item by ID
    ///
    /// Remaining siblings keep their positions; deletion only widens the gap
    /// available to future insertions.
    ///
    /// # Returns
    ///
    /// `DeleteResult` distinguishing a removed item from one that was
    /// never there. Deleting a missing item is not an error.
    async fn delete_item(&self, id: &str) -> Result<DeleteResult>;

    /// List all items in a scope in display order
    ///
    /// Placed items come first, ascending by position; unplaced items
    /// follow in creation order.
    async fn list_items(&self, scope_key: &str) -> Result<Vec<Item>>;

    //
    // ORDERING QUERIES
    //

    /// Get the highest position currently assigned within a scope
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the scope is empty or contains only unplaced items.
    async fn max_position(&self, scope_key: &str) -> Result<Option<i64>>;

    /// Get the nearest assigned position strictly below `position`
    ///
    /// # Arguments
    ///
    /// * `scope_key` - The scope to search within
    /// * `position` - Exclusive upper bound
    /// * `ignoring` - Item IDs whose rows are skipped; used for items that
    ///   are mid-move, whose stored positions are about to change
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use worklist_core::db::ItemStore;
    /// # async fn example(store: &dyn ItemStore) -> anyhow::Result<()> {
    /// // Nearest occupied slot below 3000, skipping the item being moved
    /// let below = store.position_before("list-1", 3000, &["item-9"]).await?;
    /// # Ok(())
    /// # }
    /// ```
    async fn position_before(
        &self,
        scope_key: &str,
        position: i64,
        ignoring: &[&str],
    ) -> Result<Option<i64>>;

    /// Get the nearest assigned position strictly above `position`
    ///
    /// Mirror image of [`Self::position_before`], same ignore semantics.
    async fn position_after(
        &self,
        scope_key: &str,
        position: i64,
        ignoring: &[&str],
    ) -> Result<Option<i64>>;

    /// Persist a new position for an item
    ///
    /// # Errors
    ///
    /// Returns an error if the item does not exist; position writes must
    /// never silently miss.
    async fn save_position(&self, item_id: &str, position: i64) -> Result<()>;
}

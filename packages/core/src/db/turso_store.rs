//! TursoStore - ItemStore Implementation for Turso/libsql Backend
//!
//! This module implements the `ItemStore` trait for the Turso (libsql)
//! database.
//!
//! # Design Principles
//!
//! 1. **Pure Delegation**: All methods delegate to DatabaseService
//! 2. **Row Conversion**: Handles libsql::Row to Item model conversion
//! 3. **No Ordering Logic**: Placement decisions live in PositioningService;
//!    this layer only reads and writes rows
//!
//! # Examples
//!
//! ```rust,no_run
//! use worklist_core::db::{DatabaseService, ItemStore, TursoStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Create database service
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/test.db")).await?);
//!
//!     // Wrap in ItemStore trait
//!     let store: Arc<dyn ItemStore> = Arc::new(TursoStore::new(db));
//!
//!     // Use abstraction layer
//!     let item = store.get_item("item-123").await?;
//!
//!     Ok(())
//! }
//! ```

use crate::db::item_store::ItemStore;
use crate::db::{DatabaseService, DbCreateItemParams};
use crate::models::{DeleteResult, Item};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::Row;
use serde_json::Value;
use std::sync::Arc;

/// TursoStore implements the ItemStore trait for the Turso/libsql backend
///
/// This is a thin wrapper around DatabaseService that exposes the ItemStore
/// trait abstraction to the service layer.
pub struct TursoStore {
    /// Underlying database service (extracted SQL operations)
    db: Arc<DatabaseService>,
}

impl TursoStore {
    /// Create a new TursoStore wrapper
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use worklist_core::db::{DatabaseService, TursoStore};
    /// # use std::path::PathBuf;
    /// # use std::sync::Arc;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let db = Arc::new(DatabaseService::new(PathBuf::from("./test.db")).await?);
    /// let store = TursoStore::new(db);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Parse timestamp from database - handles both SQLite and RFC3339 formats
    ///
    /// SQLite CURRENT_TIMESTAMP returns: "YYYY-MM-DD HH:MM:SS"
    /// Old data might use RFC3339: "YYYY-MM-DDTHH:MM:SSZ"
    fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
        // Try SQLite format first: "YYYY-MM-DD HH:MM:SS"
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Ok(naive.and_utc());
        }

        // Try RFC3339 format (for old data): "YYYY-MM-DDTHH:MM:SSZ"
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(dt.with_timezone(&Utc));
        }

        Err(anyhow::anyhow!(
            "Unable to parse timestamp '{}' as SQLite or RFC3339 format",
            s
        ))
    }

    /// Convert libsql::Row to Item model
    ///
    /// # Row Format
    ///
    /// Expected columns (in order):
    /// - id (TEXT)
    /// - scope_key (TEXT)
    /// - content (TEXT)
    /// - position (INTEGER, nullable)
    /// - properties (TEXT, JSON)
    /// - created_at (TEXT)
    /// - modified_at (TEXT)
    fn row_to_item(row: &Row) -> Result<Item> {
        let id: String = row.get(0).context("Failed to get id")?;
        let scope_key: String = row.get(1).context("Failed to get scope_key")?;
        let content: String = row.get(2).context("Failed to get content")?;
        let position: Option<i64> = row.get(3).context("Failed to get position")?;
        let properties_json: String = row.get(4).context("Failed to get properties")?;
        let created_at_str: String = row.get(5).context("Failed to get created_at")?;
        let modified_at_str: String = row.get(6).context("Failed to get modified_at")?;

        // Parse timestamps - handles both SQLite and RFC3339 formats
        let created_at =
            Self::parse_timestamp(&created_at_str).context("Failed to parse created_at")?;
        let modified_at =
            Self::parse_timestamp(&modified_at_str).context("Failed to parse modified_at")?;

        // Parse properties JSON
        let properties: Value =
            serde_json::from_str(&properties_json).context("Failed to parse properties JSON")?;

        Ok(Item {
            id,
            scope_key,
            content,
            position,
            properties,
            created_at,
            modified_at,
        })
    }
}

#[async_trait]
impl ItemStore for TursoStore {
    async fn create_item(&self, item: Item) -> Result<Item> {
        item.validate()
            .map_err(|e| anyhow::anyhow!("Invalid item: {}", e))?;

        // Serialize properties to JSON
        let properties_json =
            serde_json::to_string(&item.properties).context("Failed to serialize properties")?;

        // Delegate to DatabaseService
        let params = DbCreateItemParams {
            id: &item.id,
            scope_key: &item.scope_key,
            content: &item.content,
            position: item.position,
            properties: &properties_json,
        };

        self.db
            .db_create_item(params)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create item: {}", e))?;

        // Fetch and return the created item (picks up database timestamps)
        self.get_item(&item.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Item not found after creation"))
    }

    async fn get_item(&self, id: &str) -> Result<Option<Item>> {
        match self
            .db
            .db_get_item(id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get item: {}", e))?
        {
            Some(row) => Ok(Some(Self::row_to_item(&row)?)),
            None => Ok(None),
        }
    }

    async fn delete_item(&self, id: &str) -> Result<DeleteResult> {
        let rows_affected = self
            .db
            .db_delete_item(id)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to delete item: {}", e))?;

        Ok(DeleteResult {
            existed: rows_affected > 0,
        })
    }

    async fn list_items(&self, scope_key: &str) -> Result<Vec<Item>> {
        let mut rows = self
            .db
            .db_list_items(scope_key)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list items: {}", e))?;

        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to fetch row: {}", e))?
        {
            items.push(Self::row_to_item(&row)?);
        }

        Ok(items)
    }

    async fn max_position(&self, scope_key: &str) -> Result<Option<i64>> {
        self.db
            .db_max_position(scope_key)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get max position: {}", e))
    }

    async fn position_before(
        &self,
        scope_key: &str,
        position: i64,
        ignoring: &[&str],
    ) -> Result<Option<i64>> {
        self.db
            .db_position_before(scope_key, position, ignoring)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get position before: {}", e))
    }

    async fn position_after(
        &self,
        scope_key: &str,
        position: i64,
        ignoring: &[&str],
    ) -> Result<Option<i64>> {
        self.db
            .db_position_after(scope_key, position, ignoring)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get position after: {}", e))
    }

    async fn save_position(&self, item_id: &str, position: i64) -> Result<()> {
        let rows_affected = self
            .db
            .db_save_position(item_id, position)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to save position: {}", e))?;

        if rows_affected == 0 {
            anyhow::bail!("Item not found: {}", item_id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;
    use serde_json::json;
    use tempfile::TempDir;

    async fn create_test_store() -> Result<(TursoStore, TempDir)> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(DatabaseService::new(db_path).await?);
        Ok((TursoStore::new(db), temp_dir))
    }

    #[tokio::test]
    async fn test_create_and_get_item() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let item = Item::new("list-1", "Test content", json!({"priority": "high"}));

        let created = store.create_item(item.clone()).await?;
        assert_eq!(created.id, item.id);
        assert_eq!(created.scope_key, "list-1");
        assert_eq!(created.content, "Test content");
        assert_eq!(created.position, None);
        assert_eq!(created.properties, json!({"priority": "high"}));

        let fetched = store.get_item(&item.id).await?;
        assert!(fetched.is_some());
        assert_eq!(fetched.unwrap().id, item.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_item_returns_none() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        assert!(store.get_item("no-such-item").await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_item() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let item = Item::new("", "missing scope", json!({}));
        assert!(store.create_item(item).await.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_preserves_position() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let item = Item::new("list-1", "placed", json!({})).with_position(2500);
        let created = store.create_item(item).await?;
        assert_eq!(created.position, Some(2500));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_item() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let item = store
            .create_item(Item::new("list-1", "doomed", json!({})))
            .await?;

        let result = store.delete_item(&item.id).await?;
        assert!(result.existed);
        assert!(store.get_item(&item.id).await?.is_none());

        // Deleting again reports not-found rather than failing
        let result = store.delete_item(&item.id).await?;
        assert!(!result.existed);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_items_orders_by_position() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        store
            .create_item(Item::new("list-1", "third", json!({})).with_position(3000))
            .await?;
        store
            .create_item(Item::new("list-1", "first", json!({})).with_position(1000))
            .await?;
        store
            .create_item(Item::new("list-1", "unplaced", json!({})))
            .await?;
        store
            .create_item(Item::new("list-1", "second", json!({})).with_position(2000))
            .await?;

        // Items in another scope must not leak in
        store
            .create_item(Item::new("list-2", "other scope", json!({})).with_position(500))
            .await?;

        let items = store.list_items("list-1").await?;
        let contents: Vec<&str> = items.iter().map(|i| i.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "second", "third", "unplaced"]);

        Ok(())
    }

    #[tokio::test]
    async fn test_max_position() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        assert_eq!(store.max_position("list-1").await?, None);

        store
            .create_item(Item::new("list-1", "a", json!({})).with_position(1000))
            .await?;
        store
            .create_item(Item::new("list-1", "b", json!({})).with_position(4000))
            .await?;
        store
            .create_item(Item::new("list-1", "unplaced", json!({})))
            .await?;

        assert_eq!(store.max_position("list-1").await?, Some(4000));

        Ok(())
    }

    #[tokio::test]
    async fn test_position_before_and_after() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        store
            .create_item(Item::new("list-1", "a", json!({})).with_position(1000))
            .await?;
        store
            .create_item(Item::new("list-1", "b", json!({})).with_position(2000))
            .await?;
        store
            .create_item(Item::new("list-1", "c", json!({})).with_position(3000))
            .await?;

        assert_eq!(store.position_before("list-1", 2000, &[]).await?, Some(1000));
        assert_eq!(store.position_after("list-1", 2000, &[]).await?, Some(3000));

        // Nothing beyond the edges
        assert_eq!(store.position_before("list-1", 1000, &[]).await?, None);
        assert_eq!(store.position_after("list-1", 3000, &[]).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_position_queries_skip_ignored_items() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let a = store
            .create_item(Item::new("list-1", "a", json!({})).with_position(1000))
            .await?;
        let b = store
            .create_item(Item::new("list-1", "b", json!({})).with_position(2000))
            .await?;

        // With b ignored, the nearest position below 3000 falls back to a
        assert_eq!(
            store.position_before("list-1", 3000, &[&b.id]).await?,
            Some(1000)
        );

        // Ignoring both leaves nothing
        assert_eq!(
            store.position_before("list-1", 3000, &[&a.id, &b.id]).await?,
            None
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_save_position() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        let item = store
            .create_item(Item::new("list-1", "movable", json!({})))
            .await?;

        store.save_position(&item.id, 7500).await?;

        let fetched = store.get_item(&item.id).await?.unwrap();
        assert_eq!(fetched.position, Some(7500));

        Ok(())
    }

    #[tokio::test]
    async fn test_save_position_for_missing_item_fails() -> Result<()> {
        let (store, _temp_dir) = create_test_store().await?;

        assert!(store.save_position("no-such-item", 1000).await.is_err());

        Ok(())
    }
}

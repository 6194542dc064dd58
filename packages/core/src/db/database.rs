//! Database Connection Management
//!
//! This module provides the core database connection and initialization
//! functionality using libsql/Turso for item storage.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf for the database file
//! - **Fixed schema**: A single `items` table, created idempotently
//! - **WAL mode**: Write-Ahead Logging for better concurrency
//! - **Foreign keys**: Enabled for referential integrity
//!
//! # Database Connection Patterns
//!
//! **Always use `connect_with_timeout()` in async functions** to avoid SQLite
//! thread-safety violations when the Tokio runtime moves futures between
//! threads. The 5-second busy timeout allows concurrent operations to wait
//! and retry instead of failing immediately with `SQLITE_BUSY` errors.
//!
//! Use `connect()` only in single-threaded, synchronous contexts where the
//! connection will not be used across await points.

use crate::db::error::DatabaseError;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Database service for managing the libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use worklist_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_path = PathBuf::from("/path/to/worklist.db");
///     let db_service = DatabaseService::new(db_path).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database connection (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

/// Parameters for item insertion (avoids too-many-arguments lint)
pub struct DbCreateItemParams<'a> {
    pub id: &'a str,
    pub scope_key: &'a str,
    pub content: &'a str,
    pub position: Option<i64>,
    pub properties: &'a str,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Initialize the schema (CREATE TABLE IF NOT EXISTS)
    /// 4. Enable SQLite features (WAL mode, foreign keys)
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - The path points at an existing directory instead of a file
    /// - The parent directory cannot be created
    /// - The database connection fails
    /// - Schema initialization fails
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if db_path.is_dir() {
            return Err(DatabaseError::invalid_path(db_path));
        }

        // Check if the database file already exists (before we open it).
        // Only new databases get a WAL checkpoint after schema creation.
        let is_new_database = !db_path.exists();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        // Open database connection using Builder pattern
        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        // Initialize schema (only checkpoints if is_new_database = true)
        service.initialize_schema(is_new_database).await?;

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so we must use query() instead of
    /// execute(). This helper method encapsulates that pattern.
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// Creates the items table and its indexes using CREATE TABLE IF NOT
    /// EXISTS, ensuring idempotent initialization (safe to call multiple
    /// times).
    ///
    /// # Arguments
    ///
    /// * `is_new_database` - Whether this is a newly created database file.
    ///   If true, performs a WAL checkpoint to flush the schema to disk
    ///   (prevents race conditions in tests). If false, skips the checkpoint.
    ///
    /// # Schema
    ///
    /// - `items` table: one row per item, with a nullable `position` column
    ///   carrying the ordering slot within the item's scope
    /// - Indexes on `scope_key` and `(scope_key, position)` so neighbour
    ///   lookups and scope listings stay on an index
    async fn initialize_schema(&self, is_new_database: bool) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        // Enable WAL mode for better concurrency
        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        // Set busy timeout to 5 seconds (5000ms) so SQLite waits on locks
        // instead of failing immediately
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        // Enable foreign key constraints
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        // Create items table. position is nullable: items that were never
        // placed sort after all placed siblings.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                scope_key TEXT NOT NULL,
                content TEXT NOT NULL,
                position INTEGER,
                properties JSON NOT NULL DEFAULT '{}',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                modified_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to create items table: {}", e))
        })?;

        // Index on scope_key (scope listings)
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_items_scope ON items(scope_key)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create index 'idx_items_scope': {}",
                e
            ))
        })?;

        // Composite index on (scope_key, position) so the MAX/MIN neighbour
        // queries resolve without scanning the whole scope
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_items_scope_position
             ON items(scope_key, position)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create index 'idx_items_scope_position': {}",
                e
            ))
        })?;

        // Force WAL checkpoint only for newly created databases. This
        // prevents "no such table" errors when rapid open/close cycles in
        // tests leave schema writes sitting in the WAL.
        if is_new_database {
            self.execute_pragma(&conn, "PRAGMA wal_checkpoint(TRUNCATE)")
                .await?;
        }

        Ok(())
    }

    /// Get a synchronous connection to the database
    ///
    /// Only use this in synchronous, single-threaded contexts where the
    /// connection will not be held across `.await` points. In async
    /// functions, use `connect_with_timeout()` instead.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get an async connection with busy timeout configured
    ///
    /// This is the safe default for async code. The 5-second busy timeout
    /// makes concurrent operations wait and retry instead of failing
    /// immediately when the database is locked, which matters because the
    /// Tokio runtime can move futures between threads at `.await` points.
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        // The synchronous connect() call is safe here because it only
        // creates the connection handle; the actual SQLite operations
        // happen later under the busy timeout.
        let conn = self.connect()?;

        // Set busy timeout on this connection
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }

    //
    // ITEM STORE OPERATIONS
    // These methods contain the SQL logic wrapped by the ItemStore trait
    // implementation.
    //

    /// Insert an item into the database
    ///
    /// # Arguments
    ///
    /// * `params` - Item creation parameters (see DbCreateItemParams)
    ///
    /// # Notes
    ///
    /// - `position` may be NULL for items that have not been placed yet
    /// - created_at and modified_at are set automatically by the database
    pub async fn db_create_item(
        &self,
        params: DbCreateItemParams<'_>,
    ) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO items (id, scope_key, content, position, properties)
             VALUES (?, ?, ?, ?, ?)",
            (
                params.id,
                params.scope_key,
                params.content,
                params.position,
                params.properties,
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to insert item: {}", e)))?;

        Ok(())
    }

    /// Retrieve a single item by ID from the database
    ///
    /// # Returns
    ///
    /// * `Ok(Some(row))` - Item found, returns the libsql Row
    /// * `Ok(None)` - Item not found in database
    /// * `Err(DatabaseError)` - Query execution failed
    pub async fn db_get_item(&self, id: &str) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(
                "SELECT id, scope_key, content, position, properties, created_at, modified_at
                 FROM items WHERE id = ?",
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare get_item query: {}", e))
            })?;

        let mut rows = stmt.query([id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get_item query: {}", e))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// Delete an item from the database
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 = item didn't exist, 1 = item deleted)
    ///
    /// # Notes
    ///
    /// Positions of the remaining siblings are left untouched; the gap the
    /// deleted item occupied simply widens the space available to future
    /// insertions.
    pub async fn db_delete_item(&self, id: &str) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute("DELETE FROM items WHERE id = ?", [id])
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to delete item: {}", e)))?;

        Ok(rows_affected)
    }

    /// List all items in a scope in display order
    ///
    /// Placed items come first, ascending by position; items that were
    /// never placed follow in creation order.
    ///
    /// # Returns
    ///
    /// Rows iterator from the database query (caller converts rows to items)
    pub async fn db_list_items(&self, scope_key: &str) -> Result<libsql::Rows, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(
                "SELECT id, scope_key, content, position, properties, created_at, modified_at
                 FROM items WHERE scope_key = ?
                 ORDER BY (position IS NULL), position, created_at",
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare list_items query: {}", e))
            })?;

        stmt.query([scope_key]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute list_items query: {}", e))
        })
    }

    /// Get the highest position currently assigned within a scope
    ///
    /// # Returns
    ///
    /// * `Ok(Some(position))` - At least one placed item exists in the scope
    /// * `Ok(None)` - The scope is empty or contains only unplaced items
    pub async fn db_max_position(&self, scope_key: &str) -> Result<Option<i64>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare("SELECT MAX(position) FROM items WHERE scope_key = ?")
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare max_position query: {}", e))
            })?;

        let mut rows = stmt.query([scope_key]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute max_position query: {}", e))
        })?;

        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            Some(row) => row
                .get::<Option<i64>>(0)
                .map_err(|e| DatabaseError::sql_execution(e.to_string())),
            None => Ok(None),
        }
    }

    /// Get the nearest assigned position below `position` within a scope
    ///
    /// # Arguments
    ///
    /// * `scope_key` - The scope to search within
    /// * `position` - Exclusive upper bound
    /// * `ignoring` - Item IDs whose rows are skipped. Used to exclude rows
    ///   that are mid-move, since their stored position no longer reflects
    ///   where they are headed.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(position))` - A placed item exists strictly below the bound
    /// * `Ok(None)` - Nothing is placed below the bound
    pub async fn db_position_before(
        &self,
        scope_key: &str,
        position: i64,
        ignoring: &[&str],
    ) -> Result<Option<i64>, DatabaseError> {
        self.db_adjacent_position("MAX", "<", scope_key, position, ignoring)
            .await
    }

    /// Get the nearest assigned position above `position` within a scope
    ///
    /// Mirror image of [`Self::db_position_before`], same ignore semantics.
    pub async fn db_position_after(
        &self,
        scope_key: &str,
        position: i64,
        ignoring: &[&str],
    ) -> Result<Option<i64>, DatabaseError> {
        self.db_adjacent_position("MIN", ">", scope_key, position, ignoring)
            .await
    }

    /// Shared SQL for the two neighbour-position queries
    ///
    /// `aggregate` and `comparison` are fixed string pairs ("MAX"/"<" or
    /// "MIN"/">"), never user input.
    async fn db_adjacent_position(
        &self,
        aggregate: &str,
        comparison: &str,
        scope_key: &str,
        position: i64,
        ignoring: &[&str],
    ) -> Result<Option<i64>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut sql = format!(
            "SELECT {}(position) FROM items WHERE scope_key = ? AND position {} ?",
            aggregate, comparison
        );
        let mut params: Vec<libsql::Value> = vec![
            libsql::Value::Text(scope_key.to_string()),
            libsql::Value::Integer(position),
        ];
        for id in ignoring {
            sql.push_str(" AND id != ?");
            params.push(libsql::Value::Text((*id).to_string()));
        }

        let mut stmt = conn.prepare(&sql).await.map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to prepare adjacent_position query: {}",
                e
            ))
        })?;

        let mut rows = stmt.query(params).await.map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to execute adjacent_position query: {}",
                e
            ))
        })?;

        match rows
            .next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))?
        {
            Some(row) => row
                .get::<Option<i64>>(0)
                .map_err(|e| DatabaseError::sql_execution(e.to_string())),
            None => Ok(None),
        }
    }

    /// Persist a new position for an item
    ///
    /// # Returns
    ///
    /// Number of rows affected (0 = item didn't exist, 1 = position saved)
    pub async fn db_save_position(&self, id: &str, position: i64) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let rows_affected = conn
            .execute(
                "UPDATE items SET position = ?, modified_at = CURRENT_TIMESTAMP WHERE id = ?",
                (position, id),
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to save item position: {}", e))
            })?;

        Ok(rows_affected)
    }
}

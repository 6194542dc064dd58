use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::db::{MAX_POSITION, MIN_POSITION};

/// A record that can be ordered relative to its siblings.
///
/// Ordering is carried by the sparse `position` column: records sharing a
/// `scope_key` sort ascending by `position`, and records that were never
/// placed keep `None` until a move assigns them a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    /// Grouping key; ordering is only meaningful within one scope
    pub scope_key: String,
    pub content: String,
    /// Sparse ordering slot, `None` until the item is placed
    pub position: Option<i64>,
    pub properties: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl Item {
    /// Create a new unplaced item with a generated UUID.
    pub fn new(
        scope_key: impl Into<String>,
        content: impl Into<String>,
        properties: serde_json::Value,
    ) -> Self {
        Self::new_with_id(Uuid::new_v4().to_string(), scope_key, content, properties)
    }

    /// Create a new unplaced item with a caller-supplied id.
    pub fn new_with_id(
        id: impl Into<String>,
        scope_key: impl Into<String>,
        content: impl Into<String>,
        properties: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            scope_key: scope_key.into(),
            content: content.into(),
            position: None,
            properties,
            created_at: now,
            modified_at: now,
        }
    }

    /// Builder-style placement, used when the caller already knows the slot.
    pub fn with_position(mut self, position: i64) -> Self {
        self.position = Some(position);
        self
    }

    /// Update content and bump the modification timestamp.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.modified_at = Utc::now();
    }

    /// Update properties and bump the modification timestamp.
    pub fn set_properties(&mut self, properties: serde_json::Value) {
        self.properties = properties;
        self.modified_at = Utc::now();
    }

    /// Move the item to a new ordering slot and bump the modification
    /// timestamp.
    pub fn set_position(&mut self, position: i64) {
        self.position = Some(position);
        self.modified_at = Utc::now();
    }

    /// Validate the item's fields before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }
        if self.scope_key.is_empty() {
            return Err(ValidationError::MissingField("scope_key".to_string()));
        }
        if !self.properties.is_object() {
            return Err(ValidationError::InvalidProperties(
                "properties must be a JSON object".to_string(),
            ));
        }
        if let Some(position) = self.position {
            if !(MIN_POSITION..=MAX_POSITION).contains(&position) {
                return Err(ValidationError::InvalidPosition(format!(
                    "position {} is outside [{}, {}]",
                    position, MIN_POSITION, MAX_POSITION
                )));
            }
        }
        Ok(())
    }
}

/// Validation errors for item fields
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Invalid properties: {0}")]
    InvalidProperties(String),
}

/// Outcome of a delete, distinguishing "removed" from "was never there".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub existed: bool,
}

impl DeleteResult {
    pub fn existed() -> Self {
        Self { existed: true }
    }

    pub fn not_found() -> Self {
        Self { existed: false }
    }
}

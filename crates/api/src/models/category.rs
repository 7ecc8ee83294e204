//! Product category model.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use orchard_core::CategoryId;

/// A product category.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// URL-safe identifier, unique.
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

//! Parent-teacher liaison book (cahier de liaison).
//!
//! Staff write entries for a child; the child's parents read them and
//! acknowledge with a signature timestamp.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LiaisonEntry {
    pub id: Uuid,
    pub school_id: Uuid,
    pub child_id: Uuid,
    pub author_id: Option<Uuid>,
    pub title: Option<String>,
    pub message: String,
    /// Set once, when a parent first acknowledges the entry
    pub acknowledged_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub const LIAISON_COLUMNS: &str = "id, school_id, child_id, author_id, title, message, acknowledged_at, created_at, updated_at";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateLiaisonEntryDto {
    pub child_id: Uuid,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub message: String,
}

//! Child (enfant) data models and DTOs.
//!
//! Children are tenant-scoped records linked to parent and teacher
//! accounts through the `parent_children` and `teacher_children` join
//! tables; every join row carries the school id as well.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Child {
    pub id: Uuid,
    pub school_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: chrono::NaiveDate,
    pub sex: Option<String>,
    pub class_name: Option<String>,
    pub enrollment_status: String,
    pub school_year: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub const CHILD_COLUMNS: &str = "id, school_id, first_name, last_name, birth_date, sex, class_name, enrollment_status, school_year, created_at, updated_at";

/// Account summary used for a child's linked parents and teachers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LinkedAccount {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A child with its linked parent and teacher accounts.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChildDetails {
    #[serde(flatten)]
    pub child: Child,
    pub parents: Vec<LinkedAccount>,
    pub teachers: Vec<LinkedAccount>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateChildDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub birth_date: chrono::NaiveDate,
    pub sex: Option<String>,
    pub class_name: Option<String>,
    /// Defaults to "enrolled"
    pub enrollment_status: Option<String>,
    pub school_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateChildDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub sex: Option<String>,
    pub class_name: Option<String>,
    pub enrollment_status: Option<String>,
    pub school_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LinkParentDto {
    pub parent_id: Uuid,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LinkTeacherDto {
    pub teacher_id: Uuid,
}

/// Query parameters for filtering children.
#[derive(Debug, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct ChildFilterParams {
    /// Substring match over first and last name
    pub search: Option<String>,
    pub class_name: Option<String>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedChildrenResponse {
    pub data: Vec<Child>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

//! School (tenant) data models and DTOs.
//!
//! A school is the root of all data isolation: every account, child and
//! school-life record belongs to exactly one school. Schools are soft
//! deleted; `code` and `email` stay unique among non-deleted rows.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A school (tenant) record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct School {
    pub id: Uuid,
    pub code: String,
    pub email: String,
    pub name: String,
    pub address: Option<String>,
    pub commune: Option<String>,
    pub phone: Option<String>,
    pub school_year: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Columns selected for every `School` projection.
pub const SCHOOL_COLUMNS: &str = "id, code, email, name, address, commune, phone, school_year, is_active, is_deleted, created_at, updated_at";

/// Summary projection returned alongside authentication responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SchoolInfo {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub school_year: String,
}

impl From<&School> for SchoolInfo {
    fn from(school: &School) -> Self {
        Self {
            id: school.id,
            code: school.code.clone(),
            name: school.name.clone(),
            school_year: school.school_year.clone(),
        }
    }
}

/// School codes are uppercase alphanumerics and underscores.
pub fn validate_school_code(code: &str) -> Result<(), ValidationError> {
    let valid = !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("school_code")
            .with_message("School code must contain only uppercase letters, digits or underscores".into()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateSchoolDto {
    #[validate(custom(function = validate_school_code))]
    pub code: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub address: Option<String>,
    pub commune: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub school_year: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSchoolDto {
    #[validate(custom(function = validate_school_code))]
    pub code: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub commune: Option<String>,
    pub phone: Option<String>,
    pub school_year: Option<String>,
}

/// Whitelisted sort columns for the school listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SchoolSortBy {
    Name,
    Code,
    Commune,
}

impl SchoolSortBy {
    pub fn column(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Code => "code",
            Self::Commune => "commune",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Query parameters for filtering schools.
#[derive(Debug, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct SchoolFilterParams {
    /// Substring match over name and code
    pub search: Option<String>,
    pub sort_by: Option<SchoolSortBy>,
    pub sort_order: Option<SortOrder>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedSchoolsResponse {
    pub data: Vec<School>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_school_code_accepts_uppercase_alphanumerics_and_underscore() {
        assert!(validate_school_code("DEMO").is_ok());
        assert!(validate_school_code("ECOLE_2025").is_ok());
        assert!(validate_school_code("A1").is_ok());
    }

    #[test]
    fn test_school_code_rejects_lowercase_and_symbols() {
        assert!(validate_school_code("demo").is_err());
        assert!(validate_school_code("DEMO-1").is_err());
        assert!(validate_school_code("DEMO ").is_err());
        assert!(validate_school_code("").is_err());
    }

    #[test]
    fn test_sort_columns_are_whitelisted() {
        assert_eq!(SchoolSortBy::Name.column(), "name");
        assert_eq!(SchoolSortBy::Code.column(), "code");
        assert_eq!(SchoolSortBy::Commune.column(), "commune");
        assert_eq!(SortOrder::Asc.keyword(), "ASC");
        assert_eq!(SortOrder::Desc.keyword(), "DESC");
    }

    #[test]
    fn test_sort_params_deserialize_lowercase() {
        let filters: SchoolFilterParams =
            serde_json::from_str(r#"{"search":"dem","sort_by":"commune","sort_order":"desc"}"#)
                .unwrap();
        assert_eq!(filters.sort_by, Some(SchoolSortBy::Commune));
        assert_eq!(filters.sort_order, Some(SortOrder::Desc));
    }
}

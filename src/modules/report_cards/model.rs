use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A report card (bulletin) for a child, one per school year and period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReportCard {
    pub id: Uuid,
    pub school_id: Uuid,
    pub child_id: Uuid,
    pub school_year: String,
    pub period: String,
    pub overall_average: Option<f64>,
    pub teacher_comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub const REPORT_CARD_COLUMNS: &str = "id, school_id, child_id, school_year, period, overall_average, teacher_comment, created_at, updated_at";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReportCardDto {
    pub child_id: Uuid,
    #[validate(length(min = 1, max = 20))]
    pub school_year: String,
    /// Grading period label, e.g. "Trimestre 1"
    #[validate(length(min = 1, max = 50))]
    pub period: String,
    #[validate(range(min = 0.0, max = 20.0))]
    pub overall_average: Option<f64>,
    pub teacher_comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateReportCardDto {
    #[validate(range(min = 0.0, max = 20.0))]
    pub overall_average: Option<f64>,
    pub teacher_comment: Option<String>,
}

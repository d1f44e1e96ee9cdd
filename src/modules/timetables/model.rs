use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// One slot of a class timetable. Weekday is 1 (Monday) through 7.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimetableEntry {
    pub id: Uuid,
    pub school_id: Uuid,
    pub class_name: String,
    pub weekday: i16,
    pub starts_at: chrono::NaiveTime,
    pub ends_at: chrono::NaiveTime,
    pub subject: String,
    pub teacher_id: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub const TIMETABLE_COLUMNS: &str = "id, school_id, class_name, weekday, starts_at, ends_at, subject, teacher_id, created_at, updated_at";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTimetableEntryDto {
    #[validate(length(min = 1, max = 50))]
    pub class_name: String,
    #[validate(range(min = 1, max = 7))]
    pub weekday: i16,
    pub starts_at: chrono::NaiveTime,
    pub ends_at: chrono::NaiveTime,
    #[validate(length(min = 1, max = 100))]
    pub subject: String,
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateTimetableEntryDto {
    #[validate(length(min = 1, max = 50))]
    pub class_name: Option<String>,
    #[validate(range(min = 1, max = 7))]
    pub weekday: Option<i16>,
    pub starts_at: Option<chrono::NaiveTime>,
    pub ends_at: Option<chrono::NaiveTime>,
    #[validate(length(min = 1, max = 100))]
    pub subject: Option<String>,
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct TimetableFilterParams {
    pub class_name: Option<String>,
    pub weekday: Option<i16>,
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A canteen menu, one per school and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CanteenMenu {
    pub id: Uuid,
    pub school_id: Uuid,
    pub menu_date: chrono::NaiveDate,
    pub starter: Option<String>,
    pub main_course: String,
    pub dessert: Option<String>,
    pub snack: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub const CANTEEN_MENU_COLUMNS: &str =
    "id, school_id, menu_date, starter, main_course, dessert, snack, created_at, updated_at";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCanteenMenuDto {
    pub menu_date: chrono::NaiveDate,
    pub starter: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub main_course: String,
    pub dessert: Option<String>,
    pub snack: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCanteenMenuDto {
    pub starter: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub main_course: Option<String>,
    pub dessert: Option<String>,
    pub snack: Option<String>,
}

/// Date range for menu listings; both bounds inclusive.
#[derive(Debug, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct MenuRangeParams {
    pub from: Option<chrono::NaiveDate>,
    pub to: Option<chrono::NaiveDate>,
}

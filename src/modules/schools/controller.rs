use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::modules::auth::model::ErrorResponse;
use crate::modules::schools::model::{
    CreateSchoolDto, PaginatedSchoolsResponse, School, SchoolFilterParams, UpdateSchoolDto,
};
use crate::modules::schools::service::SchoolService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

/// Create a new school (tenant)
#[utoipa::path(
    post,
    path = "/api/schools",
    request_body = CreateSchoolDto,
    responses(
        (status = 201, description = "School created successfully", body = School),
        (status = 409, description = "School code or email already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schools"
)]
#[instrument(skip(state, dto))]
pub async fn create_school(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateSchoolDto>,
) -> Result<(StatusCode, Json<School>), AppError> {
    let school = SchoolService::create_school(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(school)))
}

/// List schools with pagination, search and sorting
#[utoipa::path(
    get,
    path = "/api/schools",
    params(SchoolFilterParams),
    responses(
        (status = 200, description = "List of schools", body = PaginatedSchoolsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schools"
)]
#[instrument(skip(state))]
pub async fn get_all_schools(
    State(state): State<AppState>,
    Query(filters): Query<SchoolFilterParams>,
) -> Result<Json<PaginatedSchoolsResponse>, AppError> {
    let response = SchoolService::get_all_schools(&state.db, filters).await?;
    Ok(Json(response))
}

/// Get a school by id
#[utoipa::path(
    get,
    path = "/api/schools/{id}",
    params(("id" = Uuid, Path, description = "School ID")),
    responses(
        (status = 200, description = "School details", body = School),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schools"
)]
#[instrument(skip(state))]
pub async fn get_school(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<School>, AppError> {
    let school = SchoolService::get_school_by_id(&state.db, id).await?;
    Ok(Json(school))
}

/// Update a school
#[utoipa::path(
    put,
    path = "/api/schools/{id}",
    params(("id" = Uuid, Path, description = "School ID")),
    request_body = UpdateSchoolDto,
    responses(
        (status = 200, description = "School updated successfully", body = School),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 409, description = "School code or email already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schools"
)]
#[instrument(skip(state, dto))]
pub async fn update_school(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateSchoolDto>,
) -> Result<Json<School>, AppError> {
    let school = SchoolService::update_school(&state.db, id, dto).await?;
    Ok(Json(school))
}

/// Soft-delete a school
#[utoipa::path(
    delete,
    path = "/api/schools/{id}",
    params(("id" = Uuid, Path, description = "School ID")),
    responses(
        (status = 200, description = "School deleted successfully"),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schools"
)]
#[instrument(skip(state))]
pub async fn delete_school(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    SchoolService::delete_school(&state.db, id).await?;
    Ok(Json(json!({"message": "School deleted successfully"})))
}

/// Toggle a school's active status
#[utoipa::path(
    post,
    path = "/api/schools/{id}/toggle-status",
    params(("id" = Uuid, Path, description = "School ID")),
    responses(
        (status = 200, description = "School status toggled", body = School),
        (status = 404, description = "School not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Schools"
)]
#[instrument(skip(state))]
pub async fn toggle_school_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<School>, AppError> {
    let school = SchoolService::toggle_school_status(&state.db, id).await?;
    Ok(Json(school))
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::middleware::tenant::TenantContext;
use crate::modules::auth::model::ErrorResponse;
use crate::modules::timetables::model::{
    CreateTimetableEntryDto, TimetableEntry, TimetableFilterParams, UpdateTimetableEntryDto,
};
use crate::modules::timetables::service::TimetableService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const WRITER_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin];

/// Create a timetable entry
#[utoipa::path(
    post,
    path = "/api/timetables",
    request_body = CreateTimetableEntryDto,
    responses(
        (status = 201, description = "Timetable entry created", body = TimetableEntry),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetables"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    ValidatedJson(dto): ValidatedJson<CreateTimetableEntryDto>,
) -> Result<(StatusCode, Json<TimetableEntry>), AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let entry = TimetableService::create_entry(&state.db, tenant.school_id, dto).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// List timetable entries, optionally filtered by class or weekday
#[utoipa::path(
    get,
    path = "/api/timetables",
    params(TimetableFilterParams),
    responses(
        (status = 200, description = "Timetable entries", body = [TimetableEntry]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetables"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_entries(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Query(filters): Query<TimetableFilterParams>,
) -> Result<Json<Vec<TimetableEntry>>, AppError> {
    let entries = TimetableService::get_entries(&state.db, tenant.school_id, filters).await?;
    Ok(Json(entries))
}

/// Get a timetable entry by id
#[utoipa::path(
    get,
    path = "/api/timetables/{id}",
    params(("id" = Uuid, Path, description = "Timetable entry ID")),
    responses(
        (status = 200, description = "Timetable entry details", body = TimetableEntry),
        (status = 404, description = "Timetable entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetables"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_entry(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<TimetableEntry>, AppError> {
    let entry = TimetableService::get_entry(&state.db, tenant.school_id, id).await?;
    Ok(Json(entry))
}

/// Update a timetable entry
#[utoipa::path(
    put,
    path = "/api/timetables/{id}",
    params(("id" = Uuid, Path, description = "Timetable entry ID")),
    request_body = UpdateTimetableEntryDto,
    responses(
        (status = 200, description = "Timetable entry updated", body = TimetableEntry),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Timetable entry not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetables"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateTimetableEntryDto>,
) -> Result<Json<TimetableEntry>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let entry = TimetableService::update_entry(&state.db, tenant.school_id, id, dto).await?;
    Ok(Json(entry))
}

/// Delete a timetable entry
#[utoipa::path(
    delete,
    path = "/api/timetables/{id}",
    params(("id" = Uuid, Path, description = "Timetable entry ID")),
    responses(
        (status = 200, description = "Timetable entry deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Timetable entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Timetables"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    TimetableService::delete_entry(&state.db, tenant.school_id, id).await?;
    Ok(Json(json!({"message": "Timetable entry deleted successfully"})))
}

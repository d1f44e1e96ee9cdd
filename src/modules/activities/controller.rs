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
use crate::modules::activities::model::{
    Activity, ActivityFilterParams, CreateActivityDto, PaginatedActivitiesResponse,
    UpdateActivityDto,
};
use crate::modules::activities::service::ActivityService;
use crate::modules::auth::model::ErrorResponse;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const WRITER_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin, UserRole::Teacher];

/// Create an activity
#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = CreateActivityDto,
    responses(
        (status = 201, description = "Activity created", body = Activity),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    ValidatedJson(dto): ValidatedJson<CreateActivityDto>,
) -> Result<(StatusCode, Json<Activity>), AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let activity = ActivityService::create_activity(&state.db, tenant.school_id, dto).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// List activities of the resolved school
#[utoipa::path(
    get,
    path = "/api/activities",
    params(ActivityFilterParams),
    responses(
        (status = 200, description = "List of activities", body = PaginatedActivitiesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_activities(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Query(filters): Query<ActivityFilterParams>,
) -> Result<Json<PaginatedActivitiesResponse>, AppError> {
    let response = ActivityService::get_activities(&state.db, tenant.school_id, filters).await?;
    Ok(Json(response))
}

/// Get an activity by id
#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity details", body = Activity),
        (status = 404, description = "Activity not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_activity(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Activity>, AppError> {
    let activity = ActivityService::get_activity(&state.db, tenant.school_id, id).await?;
    Ok(Json(activity))
}

/// Update an activity
#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    request_body = UpdateActivityDto,
    responses(
        (status = 200, description = "Activity updated", body = Activity),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateActivityDto>,
) -> Result<Json<Activity>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let activity = ActivityService::update_activity(&state.db, tenant.school_id, id, dto).await?;
    Ok(Json(activity))
}

/// Delete an activity
#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    params(("id" = Uuid, Path, description = "Activity ID")),
    responses(
        (status = 200, description = "Activity deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Activity not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Activities"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_activity(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    ActivityService::delete_activity(&state.db, tenant.school_id, id).await?;
    Ok(Json(json!({"message": "Activity deleted successfully"})))
}

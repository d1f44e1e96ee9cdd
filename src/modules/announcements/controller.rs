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
use crate::modules::announcements::model::{
    Announcement, AnnouncementFilterParams, CreateAnnouncementDto,
    PaginatedAnnouncementsResponse, UpdateAnnouncementDto,
};
use crate::modules::announcements::service::AnnouncementService;
use crate::modules::auth::model::ErrorResponse;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const WRITER_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin];

/// Publish an announcement
#[utoipa::path(
    post,
    path = "/api/announcements",
    request_body = CreateAnnouncementDto,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    ValidatedJson(dto): ValidatedJson<CreateAnnouncementDto>,
) -> Result<(StatusCode, Json<Announcement>), AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let announcement = AnnouncementService::create_announcement(
        &state.db,
        tenant.school_id,
        auth_user.user_id()?,
        dto,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// List announcements of the resolved school
#[utoipa::path(
    get,
    path = "/api/announcements",
    params(AnnouncementFilterParams),
    responses(
        (status = 200, description = "List of announcements", body = PaginatedAnnouncementsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_announcements(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Query(filters): Query<AnnouncementFilterParams>,
) -> Result<Json<PaginatedAnnouncementsResponse>, AppError> {
    let response =
        AnnouncementService::get_announcements(&state.db, tenant.school_id, filters).await?;
    Ok(Json(response))
}

/// Get an announcement by id
#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement details", body = Announcement),
        (status = 404, description = "Announcement not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_announcement(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<Announcement>, AppError> {
    let announcement =
        AnnouncementService::get_announcement(&state.db, tenant.school_id, id).await?;
    Ok(Json(announcement))
}

/// Update an announcement
#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementDto,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateAnnouncementDto>,
) -> Result<Json<Announcement>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let announcement =
        AnnouncementService::update_announcement(&state.db, tenant.school_id, id, dto).await?;
    Ok(Json(announcement))
}

/// Delete an announcement
#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    params(("id" = Uuid, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Announcements"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_announcement(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    AnnouncementService::delete_announcement(&state.db, tenant.school_id, id).await?;
    Ok(Json(json!({"message": "Announcement deleted successfully"})))
}

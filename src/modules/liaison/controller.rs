use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::middleware::tenant::TenantContext;
use crate::modules::auth::model::ErrorResponse;
use crate::modules::liaison::model::{CreateLiaisonEntryDto, LiaisonEntry};
use crate::modules::liaison::service::LiaisonService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const STAFF_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin, UserRole::Teacher];

/// Write a liaison entry for a child
#[utoipa::path(
    post,
    path = "/api/liaison",
    request_body = CreateLiaisonEntryDto,
    responses(
        (status = 201, description = "Liaison entry created", body = LiaisonEntry),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Child not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Liaison book"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    ValidatedJson(dto): ValidatedJson<CreateLiaisonEntryDto>,
) -> Result<(StatusCode, Json<LiaisonEntry>), AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    let entry =
        LiaisonService::create_entry(&state.db, tenant.school_id, auth_user.user_id()?, dto)
            .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// List a child's liaison entries
///
/// Staff can read any child of the school; parents only their own
/// children.
#[utoipa::path(
    get,
    path = "/api/liaison/child/{child_id}",
    params(("child_id" = Uuid, Path, description = "Child ID")),
    responses(
        (status = 200, description = "Liaison entries for the child", body = [LiaisonEntry]),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Liaison book"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_entries_for_child(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(child_id): Path<Uuid>,
) -> Result<Json<Vec<LiaisonEntry>>, AppError> {
    if check_any_role(&auth_user, STAFF_ROLES).is_err()
        && !LiaisonService::is_parent_of(
            &state.db,
            tenant.school_id,
            child_id,
            auth_user.user_id()?,
        )
        .await?
    {
        return Err(AppError::Forbidden(
            "Access denied. Not linked to this child".to_string(),
        ));
    }

    let entries =
        LiaisonService::get_entries_for_child(&state.db, tenant.school_id, child_id).await?;
    Ok(Json(entries))
}

/// Get a liaison entry by id
#[utoipa::path(
    get,
    path = "/api/liaison/{id}",
    params(("id" = Uuid, Path, description = "Liaison entry ID")),
    responses(
        (status = 200, description = "Liaison entry details", body = LiaisonEntry),
        (status = 404, description = "Liaison entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Liaison book"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_entry(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<LiaisonEntry>, AppError> {
    let entry = LiaisonService::get_entry(&state.db, tenant.school_id, id).await?;
    Ok(Json(entry))
}

/// Acknowledge a liaison entry (parent signature)
#[utoipa::path(
    post,
    path = "/api/liaison/{id}/acknowledge",
    params(("id" = Uuid, Path, description = "Liaison entry ID")),
    responses(
        (status = 200, description = "Liaison entry acknowledged", body = LiaisonEntry),
        (status = 403, description = "Only a linked parent can acknowledge", body = ErrorResponse),
        (status = 404, description = "Liaison entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Liaison book"
)]
#[instrument(skip(state, auth_user))]
pub async fn acknowledge_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<LiaisonEntry>, AppError> {
    let entry =
        LiaisonService::acknowledge_entry(&state.db, tenant.school_id, id, auth_user.user_id()?)
            .await?;
    Ok(Json(entry))
}

/// Delete a liaison entry
#[utoipa::path(
    delete,
    path = "/api/liaison/{id}",
    params(("id" = Uuid, Path, description = "Liaison entry ID")),
    responses(
        (status = 200, description = "Liaison entry deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Liaison entry not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Liaison book"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    LiaisonService::delete_entry(&state.db, tenant.school_id, id).await?;
    Ok(Json(json!({"message": "Liaison entry deleted successfully"})))
}

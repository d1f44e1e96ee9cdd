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
use crate::modules::children::model::{
    Child, ChildDetails, ChildFilterParams, CreateChildDto, LinkParentDto, LinkTeacherDto,
    PaginatedChildrenResponse, UpdateChildDto,
};
use crate::modules::children::service::ChildService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const ADMIN_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin];
const STAFF_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin, UserRole::Teacher];

/// Create a child record
#[utoipa::path(
    post,
    path = "/api/children",
    request_body = CreateChildDto,
    responses(
        (status = 201, description = "Child created successfully", body = Child),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_child(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    ValidatedJson(dto): ValidatedJson<CreateChildDto>,
) -> Result<(StatusCode, Json<Child>), AppError> {
    check_any_role(&auth_user, ADMIN_ROLES)?;
    let child = ChildService::create_child(&state.db, tenant.school_id, dto).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

/// List children of the resolved school
#[utoipa::path(
    get,
    path = "/api/children",
    params(ChildFilterParams),
    responses(
        (status = 200, description = "List of children", body = PaginatedChildrenResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_children(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Query(filters): Query<ChildFilterParams>,
) -> Result<Json<PaginatedChildrenResponse>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    let response = ChildService::get_children(&state.db, tenant.school_id, filters).await?;
    Ok(Json(response))
}

/// List the authenticated parent's children
#[utoipa::path(
    get,
    path = "/api/children/mine",
    responses(
        (status = 200, description = "Children linked to the caller", body = [Child]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_children(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
) -> Result<Json<Vec<Child>>, AppError> {
    let children =
        ChildService::get_children_for_parent(&state.db, tenant.school_id, auth_user.user_id()?)
            .await?;
    Ok(Json(children))
}

/// Get a child with linked parents and teachers
#[utoipa::path(
    get,
    path = "/api/children/{id}",
    params(("id" = Uuid, Path, description = "Child ID")),
    responses(
        (status = 200, description = "Child details", body = ChildDetails),
        (status = 404, description = "Child not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_child(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ChildDetails>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    let details = ChildService::get_child(&state.db, tenant.school_id, id).await?;
    Ok(Json(details))
}

/// Update a child record
#[utoipa::path(
    put,
    path = "/api/children/{id}",
    params(("id" = Uuid, Path, description = "Child ID")),
    request_body = UpdateChildDto,
    responses(
        (status = 200, description = "Child updated successfully", body = Child),
        (status = 404, description = "Child not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_child(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateChildDto>,
) -> Result<Json<Child>, AppError> {
    check_any_role(&auth_user, ADMIN_ROLES)?;
    let child = ChildService::update_child(&state.db, tenant.school_id, id, dto).await?;
    Ok(Json(child))
}

/// Delete a child record
#[utoipa::path(
    delete,
    path = "/api/children/{id}",
    params(("id" = Uuid, Path, description = "Child ID")),
    responses(
        (status = 200, description = "Child deleted successfully"),
        (status = 404, description = "Child not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_child(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, ADMIN_ROLES)?;
    ChildService::delete_child(&state.db, tenant.school_id, id).await?;
    Ok(Json(json!({"message": "Child deleted successfully"})))
}

/// Link a parent account to a child
#[utoipa::path(
    post,
    path = "/api/children/{id}/parents",
    params(("id" = Uuid, Path, description = "Child ID")),
    request_body = LinkParentDto,
    responses(
        (status = 200, description = "Parent linked", body = ChildDetails),
        (status = 400, description = "Account is not a parent in this school, or already linked", body = ErrorResponse),
        (status = 404, description = "Child not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn link_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(dto): Json<LinkParentDto>,
) -> Result<Json<ChildDetails>, AppError> {
    check_any_role(&auth_user, ADMIN_ROLES)?;
    let details =
        ChildService::link_parent(&state.db, tenant.school_id, id, dto.parent_id).await?;
    Ok(Json(details))
}

/// Unlink a parent account from a child
#[utoipa::path(
    delete,
    path = "/api/children/{id}/parents/{parent_id}",
    params(
        ("id" = Uuid, Path, description = "Child ID"),
        ("parent_id" = Uuid, Path, description = "Parent account ID")
    ),
    responses(
        (status = 200, description = "Parent unlinked"),
        (status = 404, description = "Link not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user))]
pub async fn unlink_parent(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path((id, parent_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, ADMIN_ROLES)?;
    ChildService::unlink_parent(&state.db, tenant.school_id, id, parent_id).await?;
    Ok(Json(json!({"message": "Parent unlinked successfully"})))
}

/// Link a teacher account to a child
#[utoipa::path(
    post,
    path = "/api/children/{id}/teachers",
    params(("id" = Uuid, Path, description = "Child ID")),
    request_body = LinkTeacherDto,
    responses(
        (status = 200, description = "Teacher linked", body = ChildDetails),
        (status = 400, description = "Account is not a teacher in this school, or already linked", body = ErrorResponse),
        (status = 404, description = "Child not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn link_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    Json(dto): Json<LinkTeacherDto>,
) -> Result<Json<ChildDetails>, AppError> {
    check_any_role(&auth_user, ADMIN_ROLES)?;
    let details =
        ChildService::link_teacher(&state.db, tenant.school_id, id, dto.teacher_id).await?;
    Ok(Json(details))
}

/// Unlink a teacher account from a child
#[utoipa::path(
    delete,
    path = "/api/children/{id}/teachers/{teacher_id}",
    params(
        ("id" = Uuid, Path, description = "Child ID"),
        ("teacher_id" = Uuid, Path, description = "Teacher account ID")
    ),
    responses(
        (status = 200, description = "Teacher unlinked"),
        (status = 404, description = "Link not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Children"
)]
#[instrument(skip(state, auth_user))]
pub async fn unlink_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path((id, teacher_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, ADMIN_ROLES)?;
    ChildService::unlink_teacher(&state.db, tenant.school_id, id, teacher_id).await?;
    Ok(Json(json!({"message": "Teacher unlinked successfully"})))
}

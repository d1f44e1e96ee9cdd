use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::tenant::TenantContext;
use crate::modules::auth::model::ErrorResponse;
use crate::modules::users::model::{
    AssignRoleDto, CreateUserDto, PaginatedUsersResponse, UpdateUserDto, UserFilterParams,
    UserResponse, UserRole,
};
use crate::modules::users::service::UserService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationParams;
use crate::validator::ValidatedJson;

/// SuperAdmins may act on another school by passing an explicit school_id
/// filter; everyone else stays scoped to their resolved tenant.
fn effective_school_id(
    auth_user: &AuthUser,
    tenant: &TenantContext,
    requested: Option<Uuid>,
) -> Uuid {
    match requested {
        Some(id) if auth_user.has_role(UserRole::SuperAdmin.as_str()) => id,
        _ => tenant.school_id,
    }
}

/// Create an account in the resolved school
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 409, description = "An account with this email already exists for this school", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn create_user(
    State(state): State<AppState>,
    tenant: TenantContext,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = UserService::create_user(&state.db, tenant.school_id, dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// List accounts of the resolved school
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserFilterParams),
    responses(
        (status = 200, description = "List of users", body = PaginatedUsersResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Query(filters): Query<UserFilterParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let school_id = effective_school_id(&auth_user, &tenant, filters.school_id);
    let response = UserService::get_users(&state.db, school_id, filters).await?;
    Ok(Json(response))
}

/// List accounts holding a role
#[utoipa::path(
    get,
    path = "/api/users/by-role/{role}",
    params(
        ("role" = String, Path, description = "Role name (case-sensitive)"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "List of users with the role", body = PaginatedUsersResponse),
        (status = 422, description = "Unknown role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_users_by_role(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(role): Path<String>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedUsersResponse>, AppError> {
    let response =
        UserService::get_users_by_role(&state.db, tenant.school_id, &role, pagination).await?;
    Ok(Json(response))
}

/// Get an account by id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::get_user(&state.db, tenant.school_id, id).await?;
    Ok(Json(user))
}

/// Update an account
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "User updated successfully", body = UserResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn update_user(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::update_user(&state.db, tenant.school_id, id, dto).await?;
    Ok(Json(user))
}

/// Delete an account
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted successfully"),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    UserService::delete_user(&state.db, tenant.school_id, id).await?;
    Ok(Json(json!({"message": "User deleted successfully"})))
}

/// Assign a role to an account
#[utoipa::path(
    post,
    path = "/api/users/{id}/roles",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AssignRoleDto,
    responses(
        (status = 200, description = "Role assigned", body = UserResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Unknown role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state, dto))]
pub async fn assign_role(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<AssignRoleDto>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::assign_role(&state.db, tenant.school_id, id, &dto.role).await?;
    Ok(Json(user))
}

/// Remove a role from an account
#[utoipa::path(
    delete,
    path = "/api/users/{id}/roles/{role}",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ("role" = String, Path, description = "Role name (case-sensitive)")
    ),
    responses(
        (status = 200, description = "Role removed", body = UserResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 422, description = "Unknown role", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
#[instrument(skip(state))]
pub async fn remove_role(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path((id, role)): Path<(Uuid, String)>,
) -> Result<Json<UserResponse>, AppError> {
    let user = UserService::remove_role(&state.db, tenant.school_id, id, &role).await?;
    Ok(Json(user))
}

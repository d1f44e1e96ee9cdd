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
use crate::modules::canteen::model::{
    CanteenMenu, CreateCanteenMenuDto, MenuRangeParams, UpdateCanteenMenuDto,
};
use crate::modules::canteen::service::CanteenService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const WRITER_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin];

/// Create a canteen menu for a day
#[utoipa::path(
    post,
    path = "/api/canteen/menus",
    request_body = CreateCanteenMenuDto,
    responses(
        (status = 201, description = "Menu created", body = CanteenMenu),
        (status = 400, description = "A menu already exists for this date", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Canteen"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_menu(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    ValidatedJson(dto): ValidatedJson<CreateCanteenMenuDto>,
) -> Result<(StatusCode, Json<CanteenMenu>), AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let menu = CanteenService::create_menu(&state.db, tenant.school_id, dto).await?;
    Ok((StatusCode::CREATED, Json(menu)))
}

/// List menus of the resolved school, optionally by date range
#[utoipa::path(
    get,
    path = "/api/canteen/menus",
    params(MenuRangeParams),
    responses(
        (status = 200, description = "Menus in the range", body = [CanteenMenu]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Canteen"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_menus(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Query(range): Query<MenuRangeParams>,
) -> Result<Json<Vec<CanteenMenu>>, AppError> {
    let menus = CanteenService::get_menus(&state.db, tenant.school_id, range).await?;
    Ok(Json(menus))
}

/// Get a menu by id
#[utoipa::path(
    get,
    path = "/api/canteen/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu ID")),
    responses(
        (status = 200, description = "Menu details", body = CanteenMenu),
        (status = 404, description = "Menu not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Canteen"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_menu(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<CanteenMenu>, AppError> {
    let menu = CanteenService::get_menu(&state.db, tenant.school_id, id).await?;
    Ok(Json(menu))
}

/// Update a menu
#[utoipa::path(
    put,
    path = "/api/canteen/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu ID")),
    request_body = UpdateCanteenMenuDto,
    responses(
        (status = 200, description = "Menu updated", body = CanteenMenu),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Menu not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Canteen"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_menu(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateCanteenMenuDto>,
) -> Result<Json<CanteenMenu>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let menu = CanteenService::update_menu(&state.db, tenant.school_id, id, dto).await?;
    Ok(Json(menu))
}

/// Delete a menu
#[utoipa::path(
    delete,
    path = "/api/canteen/menus/{id}",
    params(("id" = Uuid, Path, description = "Menu ID")),
    responses(
        (status = 200, description = "Menu deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Menu not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Canteen"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_menu(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    CanteenService::delete_menu(&state.db, tenant.school_id, id).await?;
    Ok(Json(json!({"message": "Menu deleted successfully"})))
}

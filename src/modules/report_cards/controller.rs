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
use crate::modules::report_cards::model::{
    CreateReportCardDto, ReportCard, UpdateReportCardDto,
};
use crate::modules::report_cards::service::ReportCardService;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::validator::ValidatedJson;

const WRITER_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin, UserRole::Teacher];

/// Create a report card for a child
#[utoipa::path(
    post,
    path = "/api/report-cards",
    request_body = CreateReportCardDto,
    responses(
        (status = 201, description = "Report card created", body = ReportCard),
        (status = 400, description = "A report card already exists for this child, year and period", body = ErrorResponse),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Child not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Report cards"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_report_card(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    ValidatedJson(dto): ValidatedJson<CreateReportCardDto>,
) -> Result<(StatusCode, Json<ReportCard>), AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let report_card =
        ReportCardService::create_report_card(&state.db, tenant.school_id, dto).await?;
    Ok((StatusCode::CREATED, Json(report_card)))
}

/// List a child's report cards
#[utoipa::path(
    get,
    path = "/api/report-cards/child/{child_id}",
    params(("child_id" = Uuid, Path, description = "Child ID")),
    responses(
        (status = 200, description = "Report cards for the child", body = [ReportCard]),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Report cards"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_report_cards_for_child(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Path(child_id): Path<Uuid>,
) -> Result<Json<Vec<ReportCard>>, AppError> {
    let report_cards =
        ReportCardService::get_report_cards_for_child(&state.db, tenant.school_id, child_id)
            .await?;
    Ok(Json(report_cards))
}

/// Get a report card by id
#[utoipa::path(
    get,
    path = "/api/report-cards/{id}",
    params(("id" = Uuid, Path, description = "Report card ID")),
    responses(
        (status = 200, description = "Report card details", body = ReportCard),
        (status = 404, description = "Report card not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Report cards"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_report_card(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportCard>, AppError> {
    let report_card = ReportCardService::get_report_card(&state.db, tenant.school_id, id).await?;
    Ok(Json(report_card))
}

/// Update a report card
#[utoipa::path(
    put,
    path = "/api/report-cards/{id}",
    params(("id" = Uuid, Path, description = "Report card ID")),
    request_body = UpdateReportCardDto,
    responses(
        (status = 200, description = "Report card updated", body = ReportCard),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Report card not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Report cards"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_report_card(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateReportCardDto>,
) -> Result<Json<ReportCard>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    let report_card =
        ReportCardService::update_report_card(&state.db, tenant.school_id, id, dto).await?;
    Ok(Json(report_card))
}

/// Delete a report card
#[utoipa::path(
    delete,
    path = "/api/report-cards/{id}",
    params(("id" = Uuid, Path, description = "Report card ID")),
    responses(
        (status = 200, description = "Report card deleted"),
        (status = 403, description = "Forbidden", body = ErrorResponse),
        (status = 404, description = "Report card not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Report cards"
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_report_card(
    State(state): State<AppState>,
    auth_user: AuthUser,
    tenant: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    check_any_role(&auth_user, WRITER_ROLES)?;
    ReportCardService::delete_report_card(&state.db, tenant.school_id, id).await?;
    Ok(Json(json!({"message": "Report card deleted successfully"})))
}

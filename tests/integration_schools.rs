//! School directory and tenant-resolution integration tests.
//!
//! These run against a real migrated database; set `DATABASE_URL` and run
//! `cargo test -- --ignored`.

mod common;

use axum::extract::FromRequestParts;
use axum::http::Request;
use common::{create_test_school, generate_unique_code, generate_unique_email, setup_pool,
    test_jwt_config};
use scolaris::config::cors::CorsConfig;
use scolaris::config::rate_limit::RateLimitConfig;
use scolaris::middleware::tenant::{TENANT_HEADER, TenantContext};
use scolaris::modules::schools::model::{
    CreateSchoolDto, SchoolFilterParams, SchoolSortBy, SortOrder, UpdateSchoolDto,
};
use scolaris::modules::schools::service::SchoolService;
use scolaris::state::AppState;
use scolaris::utils::errors::AppError;
use scolaris::utils::pagination::PaginationParams;

async fn test_state() -> AppState {
    AppState {
        db: setup_pool().await,
        jwt_config: test_jwt_config(),
        cors_config: CorsConfig {
            allowed_origins: vec![],
        },
        rate_limit_config: RateLimitConfig::default(),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_duplicate_school_code_rejected() {
    let pool = setup_pool().await;
    let code = generate_unique_code();
    create_test_school(&pool, &code).await;

    let result = SchoolService::create_school(
        &pool,
        CreateSchoolDto {
            code: code.clone(),
            email: generate_unique_email(),
            name: "Another School".to_string(),
            address: None,
            commune: None,
            phone: None,
            school_year: None,
        },
    )
    .await;

    assert!(matches!(result, Err(AppError::DuplicateTenant(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_duplicate_school_email_rejected() {
    let pool = setup_pool().await;
    let school = create_test_school(&pool, &generate_unique_code()).await;

    let result = SchoolService::create_school(
        &pool,
        CreateSchoolDto {
            code: generate_unique_code(),
            email: school.email.clone(),
            name: "Another School".to_string(),
            address: None,
            commune: None,
            phone: None,
            school_year: None,
        },
    )
    .await;

    assert!(matches!(result, Err(AppError::DuplicateTenant(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_soft_deleted_school_frees_its_code_and_disappears_from_lookups() {
    let pool = setup_pool().await;
    let code = generate_unique_code();
    let school = create_test_school(&pool, &code).await;

    SchoolService::delete_school(&pool, school.id).await.unwrap();

    assert!(
        SchoolService::find_active_by_code(&pool, &code)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        SchoolService::find_active_by_id(&pool, school.id)
            .await
            .unwrap()
            .is_none()
    );

    // The row is retained but the partial unique index frees the code.
    let recreated = create_test_school(&pool, &code).await;
    assert_ne!(recreated.id, school.id);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_find_active_by_code_ignores_empty_code() {
    let pool = setup_pool().await;

    assert!(
        SchoolService::find_active_by_code(&pool, "")
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        SchoolService::find_active_by_code(&pool, "   ")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_toggle_status_flips_backing_field() {
    let pool = setup_pool().await;
    let school = create_test_school(&pool, &generate_unique_code()).await;
    assert!(school.is_active);

    let toggled = SchoolService::toggle_school_status(&pool, school.id)
        .await
        .unwrap();
    assert!(!toggled.is_active);

    let toggled_back = SchoolService::toggle_school_status(&pool, school.id)
        .await
        .unwrap();
    assert!(toggled_back.is_active);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_update_school_rejects_taken_code() {
    let pool = setup_pool().await;
    let school1 = create_test_school(&pool, &generate_unique_code()).await;
    let school2 = create_test_school(&pool, &generate_unique_code()).await;

    let result = SchoolService::update_school(
        &pool,
        school2.id,
        UpdateSchoolDto {
            code: Some(school1.code.clone()),
            email: None,
            name: None,
            address: None,
            commune: None,
            phone: None,
            school_year: None,
        },
    )
    .await;

    assert!(matches!(result, Err(AppError::DuplicateTenant(_))));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_school_search_and_sort() {
    let pool = setup_pool().await;
    let code = generate_unique_code();
    create_test_school(&pool, &code).await;

    let response = SchoolService::get_all_schools(
        &pool,
        SchoolFilterParams {
            search: Some(code.clone()),
            sort_by: Some(SchoolSortBy::Code),
            sort_order: Some(SortOrder::Desc),
            pagination: PaginationParams::default(),
        },
    )
    .await
    .unwrap();

    assert_eq!(response.data.len(), 1);
    assert_eq!(response.data[0].code, code);
    assert_eq!(response.meta.total, 1);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_tenant_resolves_from_header_without_token() {
    let state = test_state().await;
    let code = generate_unique_code();
    let school = create_test_school(&state.db, &code).await;

    let request = Request::builder()
        .uri("/api/children")
        .header(TENANT_HEADER, &code)
        .body(())
        .unwrap();
    let (mut parts, _) = request.into_parts();

    let ctx = TenantContext::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(ctx.school_id, school.id);
    assert_eq!(ctx.school_code, code);

    // Second extraction within the same request reuses the cached context.
    let cached = TenantContext::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert_eq!(cached.school_id, school.id);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_tenant_resolution_fails_without_claim_or_header() {
    let state = test_state().await;

    let request = Request::builder().uri("/api/children").body(()).unwrap();
    let (mut parts, _) = request.into_parts();

    let result = TenantContext::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AppError::TenantNotFound)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_tenant_resolution_ignores_unknown_header_code() {
    let state = test_state().await;

    let request = Request::builder()
        .uri("/api/children")
        .header(TENANT_HEADER, "NO_SUCH_SCHOOL")
        .body(())
        .unwrap();
    let (mut parts, _) = request.into_parts();

    let result = TenantContext::from_request_parts(&mut parts, &state).await;
    assert!(matches!(result, Err(AppError::TenantNotFound)));
}

//! Account lifecycle integration tests.
//!
//! These run against a real migrated database; set `DATABASE_URL` and run
//! `cargo test -- --ignored`.

mod common;

use common::{
    create_test_school, generate_unique_code, generate_unique_email, register_request,
    setup_pool, tenant_context, test_jwt_config,
};
use scolaris::middleware::tenant::TenantContext;
use scolaris::modules::auth::model::{LoginRequest, RefreshTokenRequest};
use scolaris::modules::auth::service::AuthService;
use scolaris::utils::errors::AppError;
use scolaris::utils::jwt::verify_token;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_register_embeds_tenant_code_claim() {
    let pool = setup_pool().await;
    let jwt_config = test_jwt_config();
    let school = create_test_school(&pool, &generate_unique_code()).await;
    let tenant = tenant_context(&school);

    let response = AuthService::register(
        &pool,
        &tenant,
        register_request(&generate_unique_email(), "Abcdef1", "Admin"),
        &jwt_config,
    )
    .await
    .unwrap();

    let claims = verify_token(&response.access_token, &jwt_config).unwrap();
    assert_eq!(claims.school_code, school.code);
    assert_eq!(claims.school_id, school.id.to_string());
    assert_eq!(claims.roles, vec!["Admin".to_string()]);
    assert_eq!(response.school.code, school.code);
    assert_eq!(response.user.roles, vec!["Admin".to_string()]);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_same_email_allowed_across_tenants_but_not_within() {
    let pool = setup_pool().await;
    let jwt_config = test_jwt_config();
    let school1 = create_test_school(&pool, &generate_unique_code()).await;
    let school2 = create_test_school(&pool, &generate_unique_code()).await;
    let email = generate_unique_email();

    AuthService::register(
        &pool,
        &tenant_context(&school1),
        register_request(&email, "Abcdef1", "Parent"),
        &jwt_config,
    )
    .await
    .unwrap();

    // Same email in a different school: allowed.
    AuthService::register(
        &pool,
        &tenant_context(&school2),
        register_request(&email, "Abcdef1", "Parent"),
        &jwt_config,
    )
    .await
    .unwrap();

    // Same (tenant, email) pair: rejected.
    let result = AuthService::register(
        &pool,
        &tenant_context(&school1),
        register_request(&email, "Abcdef1", "Parent"),
        &jwt_config,
    )
    .await;

    assert!(matches!(result, Err(AppError::DuplicateAccount)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_register_rejects_unknown_tenant() {
    let pool = setup_pool().await;
    let jwt_config = test_jwt_config();
    let tenant = TenantContext {
        school_id: Uuid::new_v4(),
        school_code: "GHOST".to_string(),
    };

    let result = AuthService::register(
        &pool,
        &tenant,
        register_request(&generate_unique_email(), "Abcdef1", "Parent"),
        &jwt_config,
    )
    .await;

    assert!(matches!(result, Err(AppError::TenantNotFound)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_register_rejects_weak_password_with_details() {
    let pool = setup_pool().await;
    let jwt_config = test_jwt_config();
    let school = create_test_school(&pool, &generate_unique_code()).await;

    let result = AuthService::register(
        &pool,
        &tenant_context(&school),
        register_request(&generate_unique_email(), "abc", "Parent"),
        &jwt_config,
    )
    .await;

    match result {
        Err(AppError::Validation(details)) => assert_eq!(details.len(), 3),
        other => panic!("expected validation failure, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_login_wrong_password_and_missing_account_are_indistinguishable() {
    let pool = setup_pool().await;
    let jwt_config = test_jwt_config();
    let school = create_test_school(&pool, &generate_unique_code()).await;
    let tenant = tenant_context(&school);
    let email = generate_unique_email();

    AuthService::register(
        &pool,
        &tenant,
        register_request(&email, "Abcdef1", "Parent"),
        &jwt_config,
    )
    .await
    .unwrap();

    let wrong_password = AuthService::login(
        &pool,
        &tenant,
        LoginRequest {
            email: email.clone(),
            password: "Wrong999".to_string(),
        },
        &jwt_config,
    )
    .await
    .unwrap_err();

    let missing_account = AuthService::login(
        &pool,
        &tenant,
        LoginRequest {
            email: generate_unique_email(),
            password: "Abcdef1".to_string(),
        },
        &jwt_config,
    )
    .await
    .unwrap_err();

    assert_eq!(wrong_password.to_string(), missing_account.to_string());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_fifth_failure_locks_account_even_for_correct_password() {
    let pool = setup_pool().await;
    let jwt_config = test_jwt_config();
    let school = create_test_school(&pool, &generate_unique_code()).await;
    let tenant = tenant_context(&school);
    let email = generate_unique_email();

    AuthService::register(
        &pool,
        &tenant,
        register_request(&email, "Abcdef1", "Parent"),
        &jwt_config,
    )
    .await
    .unwrap();

    for _ in 0..5 {
        let result = AuthService::login(
            &pool,
            &tenant,
            LoginRequest {
                email: email.clone(),
                password: "Wrong999".to_string(),
            },
            &jwt_config,
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }

    // 6th attempt, correct password, still inside the lockout window.
    let result = AuthService::login(
        &pool,
        &tenant,
        LoginRequest {
            email: email.clone(),
            password: "Abcdef1".to_string(),
        },
        &jwt_config,
    )
    .await;

    assert!(matches!(result, Err(AppError::AccountLocked)));

    // After the window elapses, the correct password works again.
    sqlx::query("UPDATE users SET locked_until = NOW() - INTERVAL '1 second' WHERE email = $1")
        .bind(&email)
        .execute(&pool)
        .await
        .unwrap();

    let result = AuthService::login(
        &pool,
        &tenant,
        LoginRequest {
            email: email.clone(),
            password: "Abcdef1".to_string(),
        },
        &jwt_config,
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_refresh_mints_new_pair_from_old_access_token() {
    let pool = setup_pool().await;
    let jwt_config = test_jwt_config();
    let school = create_test_school(&pool, &generate_unique_code()).await;
    let tenant = tenant_context(&school);

    let registered = AuthService::register(
        &pool,
        &tenant,
        register_request(&generate_unique_email(), "Abcdef1", "Teacher"),
        &jwt_config,
    )
    .await
    .unwrap();

    let refreshed = AuthService::refresh_token(
        &pool,
        RefreshTokenRequest {
            access_token: registered.access_token.clone(),
            refresh_token: registered.refresh_token.clone(),
        },
        &jwt_config,
    )
    .await
    .unwrap();

    assert_ne!(refreshed.access_token, registered.access_token);
    assert_ne!(refreshed.refresh_token, registered.refresh_token);

    let claims = verify_token(&refreshed.access_token, &jwt_config).unwrap();
    assert_eq!(claims.school_code, school.code);
    assert_eq!(claims.sub, registered.user.id.to_string());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_refresh_rejects_tampered_access_token() {
    let pool = setup_pool().await;
    let jwt_config = test_jwt_config();

    let result = AuthService::refresh_token(
        &pool,
        RefreshTokenRequest {
            access_token: "not.a.token".to_string(),
            refresh_token: "anything".to_string(),
        },
        &jwt_config,
    )
    .await;

    assert!(matches!(result, Err(AppError::InvalidToken)));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a migrated database"]
async fn test_logout_is_idempotent_and_rotates_security_stamp() {
    let pool = setup_pool().await;
    let jwt_config = test_jwt_config();
    let school = create_test_school(&pool, &generate_unique_code()).await;
    let tenant = tenant_context(&school);

    let registered = AuthService::register(
        &pool,
        &tenant,
        register_request(&generate_unique_email(), "Abcdef1", "Parent"),
        &jwt_config,
    )
    .await
    .unwrap();
    let user_id = registered.user.id;

    let stamp_before = sqlx::query_scalar::<_, Uuid>(
        "SELECT security_stamp FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    AuthService::logout(&pool, user_id).await.unwrap();

    let stamp_after_first = sqlx::query_scalar::<_, Uuid>(
        "SELECT security_stamp FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_ne!(stamp_before, stamp_after_first);

    // Second logout succeeds and bumps the stamp again.
    AuthService::logout(&pool, user_id).await.unwrap();

    let stamp_after_second = sqlx::query_scalar::<_, Uuid>(
        "SELECT security_stamp FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert_ne!(stamp_after_first, stamp_after_second);
}

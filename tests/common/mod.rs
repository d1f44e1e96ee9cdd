#![allow(dead_code)]

use sqlx::PgPool;
use uuid::Uuid;

use scolaris::config::jwt::JwtConfig;
use scolaris::middleware::tenant::TenantContext;
use scolaris::modules::auth::model::RegisterRequest;
use scolaris::modules::schools::model::{CreateSchoolDto, School};
use scolaris::modules::schools::service::SchoolService;

/// Connects to the integration database. Integration tests are `#[ignore]`d
/// by default and expect `DATABASE_URL` to point at a migrated database.
pub async fn setup_pool() -> PgPool {
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

    PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database")
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test_secret_key_for_testing_purposes".to_string(),
        issuer: "scolaris".to_string(),
        audience: "scolaris-api".to_string(),
        access_token_expiry: 3600,
    }
}

pub fn generate_unique_code() -> String {
    format!(
        "T{}",
        Uuid::new_v4().simple().to_string()[..10].to_uppercase()
    )
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}

pub async fn create_test_school(pool: &PgPool, code: &str) -> School {
    SchoolService::create_school(
        pool,
        CreateSchoolDto {
            code: code.to_string(),
            email: generate_unique_email(),
            name: format!("Test School {}", code),
            address: Some("1 rue des Écoles".to_string()),
            commune: Some("Paris".to_string()),
            phone: None,
            school_year: Some("2025-2026".to_string()),
        },
    )
    .await
    .expect("Failed to create test school")
}

pub fn tenant_context(school: &School) -> TenantContext {
    TenantContext {
        school_id: school.id,
        school_code: school.code.clone(),
    }
}

pub fn register_request(email: &str, password: &str, role: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
        first_name: "Jean".to_string(),
        last_name: "Dupont".to_string(),
        role: role.to_string(),
        phone: None,
        address: None,
        birth_date: None,
        sex: None,
    }
}

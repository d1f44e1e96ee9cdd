//! Request-scoped tenant resolution.
//!
//! Every tenant-scoped operation starts by resolving the active school from
//! the request. Resolution order, first match wins:
//!
//! 1. the `school_code` claim of a validated bearer token,
//! 2. the `school_id` claim of the same token,
//! 3. the `X-School-Code` request header.
//!
//! Each candidate is checked against the school directory, which ignores
//! empty, unknown and soft-deleted codes. The resolved context is stored in
//! the request's extensions so later extractions within the same request
//! reuse it; it is never shared across requests, since concurrent requests
//! may belong to different schools.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::debug;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::Claims;
use crate::modules::schools::model::School;
use crate::modules::schools::service::SchoolService;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Header carrying a school code when no token claim is available.
pub const TENANT_HEADER: &str = "X-School-Code";

/// The resolved tenant of the current request.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub school_id: Uuid,
    pub school_code: String,
}

impl TenantContext {
    fn from_school(school: &School) -> Self {
        Self {
            school_id: school.id,
            school_code: school.code.clone(),
        }
    }
}

impl FromRequestParts<AppState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(ctx) = parts.extensions.get::<TenantContext>() {
            return Ok(ctx.clone());
        }

        let school = resolve_school(parts, state).await?;
        let ctx = TenantContext::from_school(&school);

        debug!(
            school.id = %ctx.school_id,
            school.code = %ctx.school_code,
            "Tenant resolved for request"
        );

        parts.extensions.insert(ctx.clone());
        Ok(ctx)
    }
}

async fn resolve_school(parts: &Parts, state: &AppState) -> Result<School, AppError> {
    // 1-2. Claims of a validated bearer token. An invalid or expired token
    // is not a claim source; resolution falls through to the header.
    if let Some(claims) = bearer_claims(parts, &state.jwt_config) {
        if let Some(school) =
            SchoolService::find_active_by_code(&state.db, &claims.school_code).await?
        {
            return Ok(school);
        }

        if let Ok(school_id) = Uuid::parse_str(&claims.school_id)
            && let Some(school) = SchoolService::find_active_by_id(&state.db, school_id).await?
        {
            return Ok(school);
        }
    }

    // 3. Explicit header.
    if let Some(code) = header_school_code(parts)
        && let Some(school) = SchoolService::find_active_by_code(&state.db, code).await?
    {
        return Ok(school);
    }

    Err(AppError::TenantNotFound)
}

/// Claims of the request's bearer token, if present and valid.
fn bearer_claims(parts: &Parts, jwt_config: &JwtConfig) -> Option<Claims> {
    let auth_header = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?;
    verify_token(token, jwt_config).ok()
}

fn header_school_code(parts: &Parts) -> Option<&str> {
    parts.headers.get(TENANT_HEADER)?.to_str().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::users::model::User;
    use crate::utils::jwt::create_access_token;
    use axum::http::Request;

    fn test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test_secret_key_for_testing_purposes".to_string(),
            issuer: "scolaris".to_string(),
            audience: "scolaris-api".to_string(),
            access_token_expiry: 3600,
        }
    }

    fn test_user(school_id: Uuid) -> User {
        User {
            id: Uuid::new_v4(),
            school_id,
            email: "a@b.com".to_string(),
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            phone: None,
            address: None,
            birth_date: None,
            sex: None,
            failed_login_attempts: 0,
            locked_until: None,
            security_stamp: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_bearer_claims_from_valid_token() {
        let config = test_jwt_config();
        let school_id = Uuid::new_v4();
        let user = test_user(school_id);
        let token = create_access_token(&user, None, &["Parent".to_string()], &config).unwrap();

        let parts = parts_with_headers(&[("Authorization", &format!("Bearer {}", token))]);
        let claims = bearer_claims(&parts, &config).unwrap();

        assert_eq!(claims.school_id, school_id.to_string());
        assert_eq!(claims.school_code, "");
    }

    #[test]
    fn test_bearer_claims_rejects_tampered_token() {
        let config = test_jwt_config();
        let user = test_user(Uuid::new_v4());
        let token = create_access_token(&user, None, &[], &config).unwrap();

        let other = JwtConfig {
            secret: "a_completely_different_secret".to_string(),
            ..test_jwt_config()
        };
        let parts = parts_with_headers(&[("Authorization", &format!("Bearer {}", token))]);

        assert!(bearer_claims(&parts, &other).is_none());
    }

    #[test]
    fn test_bearer_claims_absent_without_header() {
        let parts = parts_with_headers(&[]);
        assert!(bearer_claims(&parts, &test_jwt_config()).is_none());
    }

    #[test]
    fn test_bearer_claims_requires_bearer_scheme() {
        let parts = parts_with_headers(&[("Authorization", "Basic abc123")]);
        assert!(bearer_claims(&parts, &test_jwt_config()).is_none());
    }

    #[test]
    fn test_header_school_code_extraction() {
        let parts = parts_with_headers(&[(TENANT_HEADER, "DEMO")]);
        assert_eq!(header_school_code(&parts), Some("DEMO"));

        let parts = parts_with_headers(&[]);
        assert_eq!(header_school_code(&parts), None);
    }
}

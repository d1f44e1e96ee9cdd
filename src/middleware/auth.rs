use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::modules::auth::model::Claims;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::jwt::verify_token;

/// Extractor that validates the bearer token and exposes the authenticated
/// account's claims, including its tenant (`school_id`/`school_code`) and
/// role names.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Get the account ID from the subject claim
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::Unauthorized("Invalid user ID in token".to_string()))
    }

    /// Get the account's school ID from the tenant claim
    pub fn school_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.school_id)
            .map_err(|_| AppError::Unauthorized("Invalid school ID in token".to_string()))
    }

    pub fn school_code(&self) -> &str {
        &self.0.school_code
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    /// Check if the account carries a role, by exact (case-sensitive) name
    pub fn has_role(&self, role: &str) -> bool {
        self.0.roles.iter().any(|r| r == role)
    }

    /// Check if the account carries any of the given roles
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthorized("Invalid authorization header format".to_string())
        })?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_claims(roles: Vec<String>) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            name: "Jean Dupont".to_string(),
            school_id: Uuid::new_v4().to_string(),
            school_code: "DEMO".to_string(),
            user_nom: "Dupont".to_string(),
            user_prenom: "Jean".to_string(),
            roles,
            jti: Uuid::new_v4().to_string(),
            iss: "scolaris".to_string(),
            aud: "scolaris-api".to_string(),
            iat: 1234567890,
            exp: 9999999999,
        }
    }

    #[test]
    fn test_has_role_is_case_sensitive() {
        let auth_user = AuthUser(create_test_claims(vec!["Admin".to_string()]));

        assert!(auth_user.has_role("Admin"));
        assert!(!auth_user.has_role("admin"));
        assert!(!auth_user.has_role("SuperAdmin"));
    }

    #[test]
    fn test_has_any_role() {
        let auth_user = AuthUser(create_test_claims(vec!["Teacher".to_string()]));

        assert!(auth_user.has_any_role(&["Admin", "Teacher"]));
        assert!(!auth_user.has_any_role(&["Admin", "SuperAdmin"]));
    }

    #[test]
    fn test_user_id_parses_subject_claim() {
        let claims = create_test_claims(vec![]);
        let expected = Uuid::parse_str(&claims.sub).unwrap();
        let auth_user = AuthUser(claims);

        assert_eq!(auth_user.user_id().unwrap(), expected);
    }

    #[test]
    fn test_school_id_rejects_garbage_claim() {
        let mut claims = create_test_claims(vec![]);
        claims.school_id = "not-a-uuid".to_string();
        let auth_user = AuthUser(claims);

        assert!(auth_user.school_id().is_err());
    }
}

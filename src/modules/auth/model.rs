use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::modules::schools::model::SchoolInfo;
use crate::modules::users::model::UserResponse;

/// Access token claims.
///
/// Tokens are self-contained: subject, tenant (`school_id`/`school_code`),
/// display names and role names travel in the claim set so tenant-scoped
/// authorization needs no extra lookup. `jti` is a fresh random id per
/// token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// Account ID (subject claim)
    pub sub: String,
    pub email: String,
    /// Display name ("prenom nom")
    pub name: String,
    /// Owning school ID, as a string
    pub school_id: String,
    /// Owning school code; empty when the school relation was not loaded
    pub school_code: String,
    pub user_nom: String,
    pub user_prenom: String,
    /// One entry per assigned role name
    #[serde(default)]
    pub roles: Vec<String>,
    /// Unique token identifier
    pub jti: String,
    pub iss: String,
    pub aud: String,
    /// Issued-at timestamp (Unix)
    pub iat: usize,
    /// Expiration timestamp (Unix)
    pub exp: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1))]
    pub confirm_password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    /// Role name to assign (SuperAdmin, Admin, Teacher or Parent)
    #[validate(length(min = 1))]
    pub role: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub sex: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    /// The expired access token
    #[validate(length(min = 1))]
    pub access_token: String,
    /// The opaque refresh token issued with it
    #[validate(length(min = 1))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub sex: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 1))]
    pub new_password: String,
    #[validate(length(min = 1))]
    pub confirm_password: String,
}

/// Token pair plus account and school projections, returned by register
/// and login.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserResponse,
    pub school: SchoolInfo,
}

/// Fresh token pair returned by the refresh operation.
#[derive(Debug, Serialize, ToSchema)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_roundtrip_preserves_tenant_claims() {
        let claims = Claims {
            sub: "user-id-123".to_string(),
            email: "test@example.com".to_string(),
            name: "Jean Dupont".to_string(),
            school_id: "school-id-456".to_string(),
            school_code: "DEMO".to_string(),
            user_nom: "Dupont".to_string(),
            user_prenom: "Jean".to_string(),
            roles: vec!["Admin".to_string()],
            jti: "jti-789".to_string(),
            iss: "scolaris".to_string(),
            aud: "scolaris-api".to_string(),
            iat: 1234567800,
            exp: 1234567890,
        };

        let serialized = serde_json::to_string(&claims).unwrap();
        assert!(serialized.contains(r#""school_code":"DEMO""#));
        assert!(serialized.contains(r#""user_nom":"Dupont""#));
        assert!(serialized.contains(r#""user_prenom":"Jean""#));

        let parsed: Claims = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed.school_id, "school-id-456");
        assert_eq!(parsed.roles, vec!["Admin".to_string()]);
    }

    #[test]
    fn test_claims_roles_default_to_empty() {
        let json = r#"{"sub":"u","email":"a@b.com","name":"A B","school_id":"s","school_code":"","user_nom":"B","user_prenom":"A","jti":"j","iss":"i","aud":"a","iat":1,"exp":2}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert!(claims.roles.is_empty());
    }
}

use chrono::Utc;
use data_encoding::BASE64;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::modules::auth::model::Claims;
use crate::modules::schools::model::School;
use crate::modules::users::model::User;
use crate::utils::errors::AppError;

/// Number of random bytes in an opaque refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 64;

/// Builds and signs an access token for an account.
///
/// The claim set carries the subject id, email, display name, tenant id and
/// code, first/last name, one role entry per assigned role, and a fresh
/// random `jti`. `school_code` is the empty string when the school relation
/// is not loaded.
pub fn create_access_token(
    user: &User,
    school: Option<&School>,
    roles: &[String],
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now().timestamp();
    let exp = now + jwt_config.access_token_expiry;

    let claims = Claims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        name: format!("{} {}", user.first_name, user.last_name),
        school_id: user.school_id.to_string(),
        school_code: school.map(|s| s.code.clone()).unwrap_or_default(),
        user_nom: user.last_name.clone(),
        user_prenom: user.first_name.clone(),
        roles: roles.to_vec(),
        jti: Uuid::new_v4().to_string(),
        iss: jwt_config.issuer.clone(),
        aud: jwt_config.audience.clone(),
        iat: now as usize,
        exp: exp as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create token: {}", e)))
}

/// Returns an opaque refresh token: 64 bytes from the OS CSPRNG,
/// base64-encoded. No server-side record is kept.
pub fn create_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    BASE64.encode(&bytes)
}

fn base_validation(jwt_config: &JwtConfig) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&jwt_config.issuer]);
    validation.set_audience(&[&jwt_config.audience]);
    validation
}

/// Full validation: signature (HS256 only), issuer, audience, expiry.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &base_validation(jwt_config),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
}

/// Validation for the refresh flow: identical to [`verify_token`] except
/// that the expiry check is skipped, so an expired access token still
/// yields its claims as long as signature, issuer and audience hold.
pub fn decode_expired_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = base_validation(jwt_config);
    validation.validate_exp = false;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_token_is_opaque_base64_of_64_bytes() {
        let token = create_refresh_token();
        let bytes = BASE64.decode(token.as_bytes()).unwrap();
        assert_eq!(bytes.len(), REFRESH_TOKEN_BYTES);
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        assert_ne!(create_refresh_token(), create_refresh_token());
    }
}

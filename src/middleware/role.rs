//! Role-based authorization middleware.
//!
//! Two approaches are provided, matching how routes are guarded:
//! 1. Layer-based middleware (`require_super_admin`, `require_admin`,
//!    `require_teacher`) applied to whole sub-routers.
//! 2. `check_any_role` for manual checks inside handlers.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::middleware::auth::AuthUser;
use crate::modules::users::model::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Middleware that requires the authenticated account to carry one of the
/// allowed roles.
pub async fn require_roles(
    State(state): State<AppState>,
    req: Request,
    next: Next,
    allowed_roles: Vec<UserRole>,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await?;

    if !allowed_roles
        .iter()
        .any(|role| auth_user.has_role(role.as_str()))
    {
        return Err(AppError::Forbidden(format!(
            "Access denied. Required roles: {:?}",
            allowed_roles
        )));
    }

    let req = Request::from_parts(parts, body);
    Ok(next.run(req).await)
}

pub async fn require_super_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    match require_roles(State(state), req, next, vec![UserRole::SuperAdmin]).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_admin(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![UserRole::SuperAdmin, UserRole::Admin],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

pub async fn require_teacher(State(state): State<AppState>, req: Request, next: Next) -> Response {
    match require_roles(
        State(state),
        req,
        next,
        vec![UserRole::SuperAdmin, UserRole::Admin, UserRole::Teacher],
    )
    .await
    {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

/// Handler-side role check for routes that mix role requirements.
pub fn check_any_role(auth_user: &AuthUser, allowed_roles: &[UserRole]) -> Result<(), AppError> {
    if !allowed_roles
        .iter()
        .any(|role| auth_user.has_role(role.as_str()))
    {
        return Err(AppError::Forbidden(format!(
            "Access denied. Required roles: {:?}",
            allowed_roles
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::auth::model::Claims;
    use uuid::Uuid;

    fn auth_user_with_roles(roles: &[&str]) -> AuthUser {
        AuthUser(Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            name: "Test User".to_string(),
            school_id: Uuid::new_v4().to_string(),
            school_code: "DEMO".to_string(),
            user_nom: "User".to_string(),
            user_prenom: "Test".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            jti: Uuid::new_v4().to_string(),
            iss: "scolaris".to_string(),
            aud: "scolaris-api".to_string(),
            iat: 1234567890,
            exp: 9999999999,
        })
    }

    #[test]
    fn test_check_any_role_allows_matching_role() {
        let user = auth_user_with_roles(&["Teacher"]);
        assert!(check_any_role(&user, &[UserRole::Admin, UserRole::Teacher]).is_ok());
    }

    #[test]
    fn test_check_any_role_rejects_missing_role() {
        let user = auth_user_with_roles(&["Parent"]);
        let err = check_any_role(&user, &[UserRole::Admin]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_check_any_role_rejects_wrong_case() {
        let user = auth_user_with_roles(&["admin"]);
        assert!(check_any_role(&user, &[UserRole::Admin]).is_err());
    }

    #[test]
    fn test_multiple_roles_per_account() {
        let user = auth_user_with_roles(&["Teacher", "Admin"]);
        assert!(check_any_role(&user, &[UserRole::SuperAdmin, UserRole::Admin]).is_ok());
    }
}

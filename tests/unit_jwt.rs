use uuid::Uuid;

use scolaris::config::jwt::JwtConfig;
use scolaris::modules::schools::model::School;
use scolaris::modules::users::model::User;
use scolaris::utils::errors::AppError;
use scolaris::utils::jwt::{
    create_access_token, create_refresh_token, decode_expired_token, verify_token,
};

fn get_test_jwt_config() -> JwtConfig {
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
        email: "jean.dupont@example.com".to_string(),
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

fn test_school(id: Uuid, code: &str) -> School {
    School {
        id,
        code: code.to_string(),
        email: "demo@x.io".to_string(),
        name: "Demo School".to_string(),
        address: None,
        commune: None,
        phone: None,
        school_year: "2025-2026".to_string(),
        is_active: true,
        is_deleted: false,
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
    }
}

#[test]
fn test_token_roundtrip_recovers_identity_and_tenant_claims() {
    let jwt_config = get_test_jwt_config();
    let school_id = Uuid::new_v4();
    let user = test_user(school_id);
    let school = test_school(school_id, "DEMO");
    let roles = vec!["Admin".to_string()];

    let token = create_access_token(&user, Some(&school), &roles, &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.email, user.email);
    assert_eq!(claims.school_id, school_id.to_string());
    assert_eq!(claims.school_code, "DEMO");
    assert_eq!(claims.user_nom, "Dupont");
    assert_eq!(claims.user_prenom, "Jean");
    assert_eq!(claims.name, "Jean Dupont");
    assert_eq!(claims.roles, roles);
    assert!(!claims.jti.is_empty());
}

#[test]
fn test_token_without_school_relation_has_empty_code_claim() {
    let jwt_config = get_test_jwt_config();
    let user = test_user(Uuid::new_v4());

    let token = create_access_token(&user, None, &[], &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.school_code, "");
    assert_eq!(claims.school_id, user.school_id.to_string());
}

#[test]
fn test_expired_token_fails_verification_but_refresh_decode_succeeds() {
    // Issue an already-expired token, the exact input of the refresh flow.
    let expired_config = JwtConfig {
        access_token_expiry: -120,
        ..get_test_jwt_config()
    };
    let jwt_config = get_test_jwt_config();
    let school_id = Uuid::new_v4();
    let user = test_user(school_id);
    let school = test_school(school_id, "DEMO");

    let token =
        create_access_token(&user, Some(&school), &["Parent".to_string()], &expired_config)
            .unwrap();

    assert!(verify_token(&token, &jwt_config).is_err());

    let claims = decode_expired_token(&token, &jwt_config).unwrap();
    assert_eq!(claims.sub, user.id.to_string());
    assert_eq!(claims.school_id, school_id.to_string());
    assert_eq!(claims.school_code, "DEMO");
}

#[test]
fn test_decode_expired_token_rejects_wrong_secret() {
    let jwt_config = get_test_jwt_config();
    let user = test_user(Uuid::new_v4());
    let token = create_access_token(&user, None, &[], &jwt_config).unwrap();

    let wrong_config = JwtConfig {
        secret: "a_completely_different_secret".to_string(),
        ..get_test_jwt_config()
    };

    let result = decode_expired_token(&token, &wrong_config);
    assert!(matches!(result, Err(AppError::InvalidToken)));
}

#[test]
fn test_decode_expired_token_rejects_wrong_issuer() {
    let jwt_config = get_test_jwt_config();
    let user = test_user(Uuid::new_v4());
    let token = create_access_token(&user, None, &[], &jwt_config).unwrap();

    let wrong_issuer = JwtConfig {
        issuer: "someone-else".to_string(),
        ..get_test_jwt_config()
    };

    assert!(decode_expired_token(&token, &wrong_issuer).is_err());
}

#[test]
fn test_decode_expired_token_rejects_wrong_audience() {
    let jwt_config = get_test_jwt_config();
    let user = test_user(Uuid::new_v4());
    let token = create_access_token(&user, None, &[], &jwt_config).unwrap();

    let wrong_audience = JwtConfig {
        audience: "other-api".to_string(),
        ..get_test_jwt_config()
    };

    assert!(decode_expired_token(&token, &wrong_audience).is_err());
}

#[test]
fn test_verify_token_malformed_inputs() {
    let jwt_config = get_test_jwt_config();
    let malformed_tokens = vec![
        "",
        "not.enough",
        "too.many.parts.here.extra",
        "!!!.invalid.chars",
        "header.payload.",
    ];

    for token in malformed_tokens {
        assert!(verify_token(token, &jwt_config).is_err());
        assert!(decode_expired_token(token, &jwt_config).is_err());
    }
}

#[test]
fn test_token_expiry_matches_configured_lifetime() {
    let jwt_config = get_test_jwt_config();
    let user = test_user(Uuid::new_v4());

    let token = create_access_token(&user, None, &[], &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(
        claims.exp - claims.iat,
        jwt_config.access_token_expiry as usize
    );
}

#[test]
fn test_each_token_gets_a_fresh_jti() {
    let jwt_config = get_test_jwt_config();
    let user = test_user(Uuid::new_v4());

    let token1 = create_access_token(&user, None, &[], &jwt_config).unwrap();
    let token2 = create_access_token(&user, None, &[], &jwt_config).unwrap();

    let claims1 = verify_token(&token1, &jwt_config).unwrap();
    let claims2 = verify_token(&token2, &jwt_config).unwrap();

    assert_ne!(claims1.jti, claims2.jti);
}

#[test]
fn test_one_role_claim_entry_per_assigned_role() {
    let jwt_config = get_test_jwt_config();
    let user = test_user(Uuid::new_v4());
    let roles = vec!["Admin".to_string(), "Teacher".to_string()];

    let token = create_access_token(&user, None, &roles, &jwt_config).unwrap();
    let claims = verify_token(&token, &jwt_config).unwrap();

    assert_eq!(claims.roles, roles);
}

#[test]
fn test_refresh_token_is_64_random_bytes_base64() {
    let token = create_refresh_token();
    let decoded = data_encoding::BASE64.decode(token.as_bytes()).unwrap();

    assert_eq!(decoded.len(), 64);
    assert_ne!(token, create_refresh_token());
}

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::utils::errors::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 6;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to verify password: {}", e)))
}

/// Checks the account password policy: at least 6 characters, one digit,
/// one lowercase and one uppercase letter. Non-alphanumerics are allowed
/// but not required. Returns one message per violated rule.
pub fn validate_password_policy(password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain at least one digit".to_string());
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push("Password must contain at least one uppercase letter".to_string());
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_accepts_minimal_valid_password() {
        assert!(validate_password_policy("Abcde1").is_empty());
        assert!(validate_password_policy("Abcdef1").is_empty());
    }

    #[test]
    fn test_policy_does_not_require_special_characters() {
        assert!(validate_password_policy("Passw0rd").is_empty());
    }

    #[test]
    fn test_policy_rejects_short_password() {
        let errors = validate_password_policy("Ab1");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("at least 6 characters"));
    }

    #[test]
    fn test_policy_rejects_missing_digit() {
        let errors = validate_password_policy("Abcdefg");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("digit"));
    }

    #[test]
    fn test_policy_rejects_missing_lowercase() {
        let errors = validate_password_policy("ABCDEF1");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("lowercase"));
    }

    #[test]
    fn test_policy_rejects_missing_uppercase() {
        let errors = validate_password_policy("abcdef1");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("uppercase"));
    }

    #[test]
    fn test_policy_lists_every_violated_rule() {
        let errors = validate_password_policy("");
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("Abcdef1").unwrap();
        assert_ne!(hash, "Abcdef1");
        assert!(verify_password("Abcdef1", &hash).unwrap());
        assert!(!verify_password("abcdef1", &hash).unwrap());
    }
}

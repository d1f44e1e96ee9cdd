use scolaris::utils::password::{hash_password, validate_password_policy, verify_password};

#[test]
fn test_hash_password_produces_distinct_salted_hashes() {
    let hash1 = hash_password("Abcdef1").unwrap();
    let hash2 = hash_password("Abcdef1").unwrap();

    assert_ne!(hash1, hash2);
    assert!(verify_password("Abcdef1", &hash1).unwrap());
    assert!(verify_password("Abcdef1", &hash2).unwrap());
}

#[test]
fn test_verify_password_rejects_wrong_password() {
    let hash = hash_password("Abcdef1").unwrap();

    assert!(!verify_password("Abcdef2", &hash).unwrap());
    assert!(!verify_password("abcdef1", &hash).unwrap());
    assert!(!verify_password("", &hash).unwrap());
}

#[test]
fn test_policy_accepts_registration_scenario_password() {
    // "Abcdef1": 7 chars, digit, lowercase, uppercase.
    assert!(validate_password_policy("Abcdef1").is_empty());
}

#[test]
fn test_policy_boundary_exactly_six_characters() {
    assert!(validate_password_policy("Abcde1").is_empty());
    assert_eq!(validate_password_policy("Abcd1").len(), 1);
}

#[test]
fn test_policy_violations_are_cumulative() {
    // "abc": too short, no digit, no uppercase.
    let errors = validate_password_policy("abc");
    assert_eq!(errors.len(), 3);

    // "abcdefg": no digit, no uppercase.
    let errors = validate_password_policy("abcdefg");
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_policy_does_not_require_non_alphanumerics() {
    assert!(validate_password_policy("Password1").is_empty());
    assert!(validate_password_policy("P@ssword1").is_empty());
}

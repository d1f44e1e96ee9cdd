//! Account data models and DTOs.
//!
//! An account belongs to exactly one school; the `(school_id, email)` pair
//! is unique and the school reference never changes after creation. Roles
//! are assigned through the `user_roles` join table against the four
//! system-defined roles.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::utils::serde::deserialize_optional_uuid;

/// Well-known system role IDs (must match the seed migration).
pub mod system_roles {
    use uuid::Uuid;
    pub const SUPER_ADMIN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000001);
    pub const ADMIN: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000002);
    pub const TEACHER: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000003);
    pub const PARENT: Uuid = Uuid::from_u128(0x00000000_0000_0000_0000_000000000004);
}

/// The four system roles. Names are a case-sensitive external contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Teacher,
    Parent,
}

impl UserRole {
    pub const ALL: [UserRole; 4] = [
        UserRole::SuperAdmin,
        UserRole::Admin,
        UserRole::Teacher,
        UserRole::Parent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::Admin => "Admin",
            Self::Teacher => "Teacher",
            Self::Parent => "Parent",
        }
    }

    /// Case-sensitive lookup by role name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SuperAdmin" => Some(Self::SuperAdmin),
            "Admin" => Some(Self::Admin),
            "Teacher" => Some(Self::Teacher),
            "Parent" => Some(Self::Parent),
            _ => None,
        }
    }

    pub fn role_id(&self) -> Uuid {
        match self {
            Self::SuperAdmin => system_roles::SUPER_ADMIN,
            Self::Admin => system_roles::ADMIN,
            Self::Teacher => system_roles::TEACHER,
            Self::Parent => system_roles::PARENT,
        }
    }
}

/// An account row, without the password hash.
///
/// Lockout counters and the security stamp are server-side state; they are
/// carried here for service logic but not exposed through API projections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub school_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub sex: Option<String>,
    #[serde(skip_serializing, default)]
    pub failed_login_attempts: i32,
    #[serde(skip_serializing, default)]
    pub locked_until: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(skip_serializing, default)]
    pub security_stamp: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Columns selected for every `User` projection.
pub const USER_COLUMNS: &str = "id, school_id, email, first_name, last_name, phone, address, birth_date, sex, failed_login_attempts, locked_until, security_stamp, created_at, updated_at";

/// Account projection returned by the API, with resolved role names.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub school_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub sex: Option<String>,
    pub roles: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserResponse {
    pub fn from_user(user: User, roles: Vec<String>) -> Self {
        Self {
            id: user.id,
            school_id: user.school_id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            phone: user.phone,
            address: user.address,
            birth_date: user.birth_date,
            sex: user.sex,
            roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// DTO for admin-side account creation within the resolved school.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUserDto {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub sex: Option<String>,
    /// Role names to assign. Unknown names are rejected.
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<chrono::NaiveDate>,
    pub sex: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AssignRoleDto {
    #[validate(length(min = 1))]
    pub role: String,
}

/// Query parameters for filtering accounts.
#[derive(Debug, Clone, Deserialize, ToSchema, utoipa::IntoParams)]
pub struct UserFilterParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    /// Filter by role name
    pub role: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub school_id: Option<Uuid>,
    #[serde(flatten)]
    pub pagination: crate::utils::pagination::PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub data: Vec<UserResponse>,
    pub meta: crate::utils::pagination::PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_are_case_sensitive() {
        assert_eq!(UserRole::from_name("Admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_name("admin"), None);
        assert_eq!(UserRole::from_name("SUPERADMIN"), None);
        assert_eq!(UserRole::from_name("SuperAdmin"), Some(UserRole::SuperAdmin));
        assert_eq!(UserRole::from_name("Teacher"), Some(UserRole::Teacher));
        assert_eq!(UserRole::from_name("Parent"), Some(UserRole::Parent));
        assert_eq!(UserRole::from_name(""), None);
    }

    #[test]
    fn test_role_round_trip() {
        for role in UserRole::ALL {
            assert_eq!(UserRole::from_name(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_role_ids_match_seed_migration() {
        assert_eq!(UserRole::SuperAdmin.role_id(), system_roles::SUPER_ADMIN);
        assert_eq!(UserRole::Parent.role_id(), system_roles::PARENT);
    }

    #[test]
    fn test_user_serialization_hides_lockout_state() {
        let user = User {
            id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            first_name: "Jean".to_string(),
            last_name: "Dupont".to_string(),
            phone: None,
            address: None,
            birth_date: None,
            sex: None,
            failed_login_attempts: 3,
            locked_until: None,
            security_stamp: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("failed_login_attempts"));
        assert!(!json.contains("security_stamp"));
        assert!(json.contains("Dupont"));
    }
}

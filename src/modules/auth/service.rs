use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::jwt::JwtConfig;
use crate::middleware::tenant::TenantContext;
use crate::modules::auth::model::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RefreshResponse, RefreshTokenRequest,
    RegisterRequest, UpdateProfileRequest,
};
use crate::modules::schools::model::{School, SchoolInfo};
use crate::modules::schools::service::SchoolService;
use crate::modules::users::model::{USER_COLUMNS, User, UserResponse, UserRole};
use crate::utils::errors::AppError;
use crate::utils::jwt::{create_access_token, create_refresh_token, decode_expired_token};
use crate::utils::password::{hash_password, validate_password_policy, verify_password};

/// Lockout policy: 5 consecutive failures lock the account for 5 minutes.
pub const MAX_FAILED_LOGIN_ATTEMPTS: i32 = 5;
pub const LOCKOUT_DURATION_MINUTES: i64 = 5;

/// Account row including the password hash; never leaves the service layer.
#[derive(Debug, sqlx::FromRow)]
struct UserAuthRow {
    id: Uuid,
    school_id: Uuid,
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    address: Option<String>,
    birth_date: Option<chrono::NaiveDate>,
    sex: Option<String>,
    failed_login_attempts: i32,
    locked_until: Option<DateTime<Utc>>,
    security_stamp: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const USER_AUTH_COLUMNS: &str = "id, school_id, email, password, first_name, last_name, phone, address, birth_date, sex, failed_login_attempts, locked_until, security_stamp, created_at, updated_at";

impl UserAuthRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            school_id: self.school_id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            address: self.address,
            birth_date: self.birth_date,
            sex: self.sex,
            failed_login_attempts: self.failed_login_attempts,
            locked_until: self.locked_until,
            security_stamp: self.security_stamp,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    fn is_locked(&self) -> bool {
        self.locked_until.is_some_and(|until| until > Utc::now())
    }
}

pub struct AuthService;

impl AuthService {
    /// Registers a new account in the resolved school.
    ///
    /// Email is auto-confirmed (no verification flow) and exactly the
    /// requested role is assigned. Returns a fresh token pair plus the
    /// account and school projections.
    #[instrument(skip(db, dto, jwt_config), fields(school.id = %tenant.school_id, user.email = %dto.email))]
    pub async fn register(
        db: &PgPool,
        tenant: &TenantContext,
        dto: RegisterRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let school = SchoolService::find_active_by_id(db, tenant.school_id)
            .await?
            .ok_or(AppError::TenantNotFound)?;

        let role = UserRole::from_name(&dto.role)
            .ok_or_else(|| AppError::validation(format!("Unknown role: {}", dto.role)))?;

        let mut policy_errors = validate_password_policy(&dto.password);
        if dto.password != dto.confirm_password {
            policy_errors.push("Password confirmation does not match".to_string());
        }
        if !policy_errors.is_empty() {
            return Err(AppError::Validation(policy_errors));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE school_id = $1 AND email = $2)",
        )
        .bind(school.id)
        .bind(&dto.email)
        .fetch_one(db)
        .await?;

        if exists {
            warn!(user.email = %dto.email, "Registration attempted with existing email");
            return Err(AppError::DuplicateAccount);
        }

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (school_id, email, password, first_name, last_name, phone, address, birth_date, sex)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {USER_COLUMNS}",
        ))
        .bind(school.id)
        .bind(&dto.email)
        .bind(&hashed_password)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.phone)
        .bind(&dto.address)
        .bind(dto.birth_date)
        .bind(&dto.sex)
        .fetch_one(db)
        .await
        .map_err(|e| {
            // The (school_id, email) constraint closes the pre-check race.
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::DuplicateAccount;
            }
            AppError::from(e)
        })?;

        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(user.id)
            .bind(role.role_id())
            .execute(db)
            .await?;

        info!(
            user.id = %user.id,
            school.code = %school.code,
            role = %role.as_str(),
            "Account registered"
        );

        let roles = vec![role.as_str().to_string()];
        Self::build_auth_response(user, school, roles, jwt_config)
    }

    /// Authenticates an account within the resolved school.
    ///
    /// A missing account and a wrong password return the same error, so
    /// callers cannot enumerate accounts. The lockout check runs before the
    /// bcrypt comparison.
    #[instrument(skip(db, dto, jwt_config), fields(school.id = %tenant.school_id, user.email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        tenant: &TenantContext,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let school = SchoolService::find_active_by_id(db, tenant.school_id)
            .await?
            .ok_or(AppError::TenantNotFound)?;

        let row = sqlx::query_as::<_, UserAuthRow>(&format!(
            "SELECT {USER_AUTH_COLUMNS} FROM users WHERE school_id = $1 AND email = $2",
        ))
        .bind(school.id)
        .bind(&dto.email)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        if row.is_locked() {
            warn!(user.id = %row.id, "Login attempt on locked account");
            return Err(AppError::AccountLocked);
        }

        if !verify_password(&dto.password, &row.password)? {
            Self::record_failed_attempt(db, row.id, row.failed_login_attempts).await?;
            return Err(AppError::InvalidCredentials);
        }

        Self::reset_lockout(db, row.id).await?;

        let roles = Self::get_role_names(db, row.id).await?;
        let user = row.into_user();

        info!(user.id = %user.id, school.code = %school.code, "Login successful");

        Self::build_auth_response(user, school, roles, jwt_config)
    }

    /// Mints a new token pair from an expired access token.
    ///
    /// Only the expired token's signature, issuer, audience and algorithm
    /// are re-validated; identity is re-derived from its claims. The
    /// previous pair is not invalidated (stateless contract).
    #[instrument(skip(db, dto, jwt_config))]
    pub async fn refresh_token(
        db: &PgPool,
        dto: RefreshTokenRequest,
        jwt_config: &JwtConfig,
    ) -> Result<RefreshResponse, AppError> {
        if dto.refresh_token.trim().is_empty() {
            return Err(AppError::InvalidToken);
        }

        let claims = decode_expired_token(&dto.access_token, jwt_config)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)?;

        let row = sqlx::query_as::<_, UserAuthRow>(&format!(
            "SELECT {USER_AUTH_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::AccountNotFound)?;

        if row.is_locked() {
            return Err(AppError::AccountLocked);
        }

        let school = SchoolService::find_active_by_id(db, row.school_id).await?;
        let roles = Self::get_role_names(db, row.id).await?;
        let user = row.into_user();

        let access_token = create_access_token(&user, school.as_ref(), &roles, jwt_config)?;
        let refresh_token = create_refresh_token();

        debug!(user.id = %user.id, "Token pair refreshed");

        Ok(RefreshResponse {
            access_token,
            refresh_token,
        })
    }

    /// Rotates the account's security stamp.
    ///
    /// Best-effort invalidation signal: already-issued access tokens stay
    /// valid until natural expiry since validation does not consult the
    /// stamp. Idempotent — each call just bumps the stamp again.
    #[instrument(skip(db))]
    pub async fn logout(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET security_stamp = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(Uuid::new_v4())
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::AccountNotFound);
        }

        info!(user.id = %user_id, "Security stamp rotated on logout");

        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn get_profile(db: &PgPool, user_id: Uuid) -> Result<UserResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::AccountNotFound)?;

        let roles = Self::get_role_names(db, user_id).await?;

        Ok(UserResponse::from_user(user, roles))
    }

    #[instrument(skip(db, dto))]
    pub async fn update_profile(
        db: &PgPool,
        user_id: Uuid,
        dto: UpdateProfileRequest,
    ) -> Result<UserResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                birth_date = COALESCE($6, birth_date),
                sex = COALESCE($7, sex),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}",
        ))
        .bind(user_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.phone)
        .bind(&dto.address)
        .bind(dto.birth_date)
        .bind(&dto.sex)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::AccountNotFound)?;

        let roles = Self::get_role_names(db, user_id).await?;

        info!(user.id = %user_id, "Profile updated");

        Ok(UserResponse::from_user(user, roles))
    }

    /// Changes the account password after verifying the current one, and
    /// rotates the security stamp.
    #[instrument(skip(db, dto))]
    pub async fn change_password(
        db: &PgPool,
        user_id: Uuid,
        dto: ChangePasswordRequest,
    ) -> Result<(), AppError> {
        let mut policy_errors = validate_password_policy(&dto.new_password);
        if dto.new_password != dto.confirm_password {
            policy_errors.push("Password confirmation does not match".to_string());
        }
        if !policy_errors.is_empty() {
            return Err(AppError::Validation(policy_errors));
        }

        let current_hash =
            sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await?
                .ok_or(AppError::AccountNotFound)?;

        if !verify_password(&dto.current_password, &current_hash)? {
            warn!(user.id = %user_id, "Password change attempted with wrong current password");
            return Err(AppError::InvalidCredentials);
        }

        let hashed = hash_password(&dto.new_password)?;

        sqlx::query(
            "UPDATE users SET password = $2, security_stamp = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(&hashed)
        .bind(Uuid::new_v4())
        .execute(db)
        .await?;

        info!(user.id = %user_id, "Password changed");

        Ok(())
    }

    /// Deletes the account row; join rows cascade.
    #[instrument(skip(db))]
    pub async fn delete_account(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::AccountNotFound);
        }

        info!(user.id = %user_id, "Account deleted");

        Ok(())
    }

    pub async fn get_role_names(db: &PgPool, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let roles = sqlx::query_scalar::<_, String>(
            "SELECT r.name FROM roles r
             INNER JOIN user_roles ur ON ur.role_id = r.id
             WHERE ur.user_id = $1
             ORDER BY r.name",
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(roles)
    }

    async fn record_failed_attempt(
        db: &PgPool,
        user_id: Uuid,
        previous_failures: i32,
    ) -> Result<(), AppError> {
        let failures = previous_failures + 1;

        if failures >= MAX_FAILED_LOGIN_ATTEMPTS {
            let locked_until = Utc::now() + Duration::minutes(LOCKOUT_DURATION_MINUTES);

            sqlx::query(
                "UPDATE users SET failed_login_attempts = 0, locked_until = $2, updated_at = NOW()
                 WHERE id = $1",
            )
            .bind(user_id)
            .bind(locked_until)
            .execute(db)
            .await?;

            warn!(
                user.id = %user_id,
                locked_until = %locked_until,
                "Account locked after repeated failed logins"
            );
        } else {
            sqlx::query(
                "UPDATE users SET failed_login_attempts = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(user_id)
            .bind(failures)
            .execute(db)
            .await?;
        }

        Ok(())
    }

    async fn reset_lockout(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET failed_login_attempts = 0, locked_until = NULL, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(user_id)
        .execute(db)
        .await?;

        Ok(())
    }

    fn build_auth_response(
        user: User,
        school: School,
        roles: Vec<String>,
        jwt_config: &JwtConfig,
    ) -> Result<AuthResponse, AppError> {
        let access_token = create_access_token(&user, Some(&school), &roles, jwt_config)?;
        let refresh_token = create_refresh_token();

        Ok(AuthResponse {
            access_token,
            refresh_token,
            school: SchoolInfo::from(&school),
            user: UserResponse::from_user(user, roles),
        })
    }
}

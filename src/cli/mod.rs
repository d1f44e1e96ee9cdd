//! Bootstrap commands that bypass the HTTP API.
//!
//! SuperAdmin accounts cannot be created through registration alone in a
//! fresh deployment (there is no school yet), so the first school and its
//! SuperAdmin are provisioned from the command line.

use sqlx::PgPool;
use uuid::Uuid;

use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;
use crate::utils::password::{hash_password, validate_password_policy};

/// Creates a SuperAdmin account in an existing school, identified by its
/// code. Fails if the school is unknown or the email is already taken
/// there.
pub async fn create_super_admin(
    db: &PgPool,
    school_code: &str,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<Uuid> {
    let policy_errors = validate_password_policy(password);
    if !policy_errors.is_empty() {
        anyhow::bail!("Password policy violated: {}", policy_errors.join(", "));
    }

    let school_id = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM schools WHERE code = $1 AND is_deleted = FALSE",
    )
    .bind(school_code)
    .fetch_optional(db)
    .await?
    .ok_or_else(|| anyhow::anyhow!("No school with code {}", school_code))?;

    let hashed = hash_password(password).map_err(|e: AppError| anyhow::anyhow!(e.to_string()))?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (school_id, email, password, first_name, last_name)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id",
    )
    .bind(school_id)
    .bind(email)
    .bind(&hashed)
    .bind(first_name)
    .bind(last_name)
    .fetch_one(db)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e
            && db_err.is_unique_violation()
        {
            return anyhow::anyhow!("An account with this email already exists in this school");
        }
        anyhow::Error::from(e)
    })?;

    sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(UserRole::SuperAdmin.role_id())
        .execute(db)
        .await?;

    Ok(user_id)
}

use std::collections::HashMap;

use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::modules::users::model::{
    CreateUserDto, PaginatedUsersResponse, USER_COLUMNS, UpdateUserDto, User, UserFilterParams,
    UserResponse, UserRole,
};
use crate::utils::errors::AppError;
use crate::utils::pagination::{PaginationMeta, PaginationParams};
use crate::utils::password::{hash_password, validate_password_policy};

pub struct UserService;

impl UserService {
    /// Admin-side account creation within a school. Unlike registration it
    /// can assign several roles (or none) and returns no tokens.
    #[instrument(skip(db, dto), fields(school.id = %school_id, user.email = %dto.email, db.operation = "INSERT", db.table = "users"))]
    pub async fn create_user(
        db: &PgPool,
        school_id: Uuid,
        dto: CreateUserDto,
    ) -> Result<UserResponse, AppError> {
        let mut roles = Vec::with_capacity(dto.roles.len());
        for name in &dto.roles {
            let role = UserRole::from_name(name)
                .ok_or_else(|| AppError::validation(format!("Unknown role: {}", name)))?;
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        let policy_errors = validate_password_policy(&dto.password);
        if !policy_errors.is_empty() {
            return Err(AppError::Validation(policy_errors));
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE school_id = $1 AND email = $2)",
        )
        .bind(school_id)
        .bind(&dto.email)
        .fetch_one(db)
        .await?;

        if exists {
            warn!(user.email = %dto.email, "User creation attempted with existing email");
            return Err(AppError::DuplicateAccount);
        }

        let hashed_password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (school_id, email, password, first_name, last_name, phone, address, birth_date, sex)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {USER_COLUMNS}",
        ))
        .bind(school_id)
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
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::DuplicateAccount;
            }
            error!(error = %e, user.email = %dto.email, "Database error creating user");
            AppError::from(e)
        })?;

        for role in &roles {
            sqlx::query(
                "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(user.id)
            .bind(role.role_id())
            .execute(db)
            .await?;
        }

        info!(user.id = %user.id, school.id = %school_id, "User created");

        let role_names = roles.iter().map(|r| r.as_str().to_string()).collect();
        Ok(UserResponse::from_user(user, role_names))
    }

    #[instrument(skip(db, filters), fields(school.id = %school_id, db.operation = "SELECT", db.table = "users"))]
    pub async fn get_users(
        db: &PgPool,
        school_id: Uuid,
        filters: UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE school_id = $1");
        let mut params = Vec::new();

        if let Some(first_name) = &filters.first_name {
            params.push(format!("%{}%", first_name));
            where_clause.push_str(&format!(" AND first_name ILIKE ${}", params.len() + 1));
        }

        if let Some(last_name) = &filters.last_name {
            params.push(format!("%{}%", last_name));
            where_clause.push_str(&format!(" AND last_name ILIKE ${}", params.len() + 1));
        }

        if let Some(email) = &filters.email {
            params.push(format!("%{}%", email));
            where_clause.push_str(&format!(" AND email ILIKE ${}", params.len() + 1));
        }

        if let Some(role) = &filters.role {
            // Role names are whitelisted before reaching the query.
            let role = UserRole::from_name(role)
                .ok_or_else(|| AppError::validation(format!("Unknown role: {}", role)))?;
            params.push(role.as_str().to_string());
            where_clause.push_str(&format!(
                " AND EXISTS (SELECT 1 FROM user_roles ur INNER JOIN roles r ON r.id = ur.role_id
                  WHERE ur.user_id = users.id AND r.name = ${})",
                params.len() + 1
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM users{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(school_id);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await.map_err(|e| {
            error!(school.id = %school_id, error = %e, "Database error counting users");
            AppError::from(e)
        })?;

        let data_query = format!(
            "SELECT {USER_COLUMNS} FROM users{where_clause} ORDER BY created_at DESC LIMIT {limit} OFFSET {offset}",
        );
        let mut data_sql = sqlx::query_as::<_, User>(&data_query).bind(school_id);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let users = data_sql.fetch_all(db).await.map_err(|e| {
            error!(school.id = %school_id, error = %e, "Database error fetching users");
            AppError::from(e)
        })?;

        let roles_by_user = Self::get_role_names_bulk(db, &users).await?;

        let has_more = offset + limit < total;

        debug!(
            school.id = %school_id,
            total = %total,
            returned = %users.len(),
            "Users fetched successfully"
        );

        let data = users
            .into_iter()
            .map(|user| {
                let roles = roles_by_user.get(&user.id).cloned().unwrap_or_default();
                UserResponse::from_user(user, roles)
            })
            .collect();

        Ok(PaginatedUsersResponse {
            data,
            meta: PaginationMeta {
                total,
                limit,
                offset: Some(offset),
                page: None,
                has_more,
            },
        })
    }

    /// Named list-by-role operation; delegates to the filtered listing.
    pub async fn get_users_by_role(
        db: &PgPool,
        school_id: Uuid,
        role: &str,
        pagination: PaginationParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let filters = UserFilterParams {
            first_name: None,
            last_name: None,
            email: None,
            role: Some(role.to_string()),
            school_id: None,
            pagination,
        };

        Self::get_users(db, school_id, filters).await
    }

    #[instrument(skip(db), fields(school.id = %school_id, user.id = %user_id, db.operation = "SELECT", db.table = "users"))]
    pub async fn get_user(
        db: &PgPool,
        school_id: Uuid,
        user_id: Uuid,
    ) -> Result<UserResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND school_id = $2",
        ))
        .bind(user_id)
        .bind(school_id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::AccountNotFound)?;

        let roles = Self::get_role_names(db, user_id).await?;

        Ok(UserResponse::from_user(user, roles))
    }

    #[instrument(skip(db, dto), fields(school.id = %school_id, user.id = %user_id, db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_user(
        db: &PgPool,
        school_id: Uuid,
        user_id: Uuid,
        dto: UpdateUserDto,
    ) -> Result<UserResponse, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                phone = COALESCE($5, phone),
                address = COALESCE($6, address),
                birth_date = COALESCE($7, birth_date),
                sex = COALESCE($8, sex),
                updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {USER_COLUMNS}",
        ))
        .bind(user_id)
        .bind(school_id)
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

        info!(user.id = %user_id, "User updated");

        Ok(UserResponse::from_user(user, roles))
    }

    #[instrument(skip(db), fields(school.id = %school_id, user.id = %user_id, db.operation = "DELETE", db.table = "users"))]
    pub async fn delete_user(db: &PgPool, school_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND school_id = $2")
            .bind(user_id)
            .bind(school_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::AccountNotFound);
        }

        info!(user.id = %user_id, "User deleted");

        Ok(())
    }

    /// Adds a role to an account. Idempotent: assigning an already-held
    /// role succeeds.
    #[instrument(skip(db), fields(school.id = %school_id, user.id = %user_id))]
    pub async fn assign_role(
        db: &PgPool,
        school_id: Uuid,
        user_id: Uuid,
        role_name: &str,
    ) -> Result<UserResponse, AppError> {
        let role = UserRole::from_name(role_name)
            .ok_or_else(|| AppError::validation(format!("Unknown role: {}", role_name)))?;

        // The target must belong to the resolved school.
        let _ = Self::get_user(db, school_id, user_id).await?;

        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role.role_id())
        .execute(db)
        .await?;

        info!(user.id = %user_id, role = %role.as_str(), "Role assigned");

        Self::get_user(db, school_id, user_id).await
    }

    #[instrument(skip(db), fields(school.id = %school_id, user.id = %user_id))]
    pub async fn remove_role(
        db: &PgPool,
        school_id: Uuid,
        user_id: Uuid,
        role_name: &str,
    ) -> Result<UserResponse, AppError> {
        let role = UserRole::from_name(role_name)
            .ok_or_else(|| AppError::validation(format!("Unknown role: {}", role_name)))?;

        let _ = Self::get_user(db, school_id, user_id).await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role.role_id())
            .execute(db)
            .await?;

        info!(user.id = %user_id, role = %role.as_str(), "Role removed");

        Self::get_user(db, school_id, user_id).await
    }

    async fn get_role_names(db: &PgPool, user_id: Uuid) -> Result<Vec<String>, AppError> {
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

    async fn get_role_names_bulk(
        db: &PgPool,
        users: &[User],
    ) -> Result<HashMap<Uuid, Vec<String>>, AppError> {
        if users.is_empty() {
            return Ok(HashMap::new());
        }

        let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();

        let rows = sqlx::query_as::<_, (Uuid, String)>(
            "SELECT ur.user_id, r.name FROM user_roles ur
             INNER JOIN roles r ON r.id = ur.role_id
             WHERE ur.user_id = ANY($1)
             ORDER BY r.name",
        )
        .bind(&ids)
        .fetch_all(db)
        .await?;

        let mut by_user: HashMap<Uuid, Vec<String>> = HashMap::new();
        for (user_id, name) in rows {
            by_user.entry(user_id).or_default().push(name);
        }

        Ok(by_user)
    }
}

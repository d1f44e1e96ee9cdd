use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::modules::children::model::{
    CHILD_COLUMNS, Child, ChildDetails, ChildFilterParams, CreateChildDto, LinkedAccount,
    PaginatedChildrenResponse, UpdateChildDto,
};
use crate::modules::users::model::UserRole;
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

pub struct ChildService;

impl ChildService {
    #[instrument(skip(db, dto), fields(school.id = %school_id, db.operation = "INSERT", db.table = "children"))]
    pub async fn create_child(
        db: &PgPool,
        school_id: Uuid,
        dto: CreateChildDto,
    ) -> Result<Child, AppError> {
        let child = sqlx::query_as::<_, Child>(&format!(
            "INSERT INTO children (school_id, first_name, last_name, birth_date, sex, class_name, enrollment_status, school_year)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {CHILD_COLUMNS}",
        ))
        .bind(school_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(dto.birth_date)
        .bind(&dto.sex)
        .bind(&dto.class_name)
        .bind(dto.enrollment_status.as_deref().unwrap_or("enrolled"))
        .bind(dto.school_year.as_deref().unwrap_or(""))
        .fetch_one(db)
        .await
        .map_err(|e| {
            error!(error = %e, school.id = %school_id, "Database error creating child");
            AppError::from(e)
        })?;

        info!(child.id = %child.id, school.id = %school_id, "Child created");

        Ok(child)
    }

    #[instrument(skip(db, filters), fields(school.id = %school_id, db.operation = "SELECT", db.table = "children"))]
    pub async fn get_children(
        db: &PgPool,
        school_id: Uuid,
        filters: ChildFilterParams,
    ) -> Result<PaginatedChildrenResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE school_id = $1");
        let mut params = Vec::new();

        if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(format!("%{}%", search));
            where_clause.push_str(&format!(
                " AND (first_name ILIKE ${n} OR last_name ILIKE ${n})",
                n = params.len() + 1
            ));
        }

        if let Some(class_name) = &filters.class_name {
            params.push(class_name.clone());
            where_clause.push_str(&format!(" AND class_name = ${}", params.len() + 1));
        }

        let count_query = format!("SELECT COUNT(*) FROM children{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(school_id);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {CHILD_COLUMNS} FROM children{where_clause} ORDER BY last_name, first_name LIMIT {limit} OFFSET {offset}",
        );
        let mut data_sql = sqlx::query_as::<_, Child>(&data_query).bind(school_id);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let children = data_sql.fetch_all(db).await?;

        let has_more = offset + limit < total;

        debug!(total = %total, returned = %children.len(), "Children fetched");

        Ok(PaginatedChildrenResponse {
            data: children,
            meta: PaginationMeta {
                total,
                limit,
                offset: Some(offset),
                page: None,
                has_more,
            },
        })
    }

    #[instrument(skip(db), fields(school.id = %school_id, child.id = %child_id, db.operation = "SELECT", db.table = "children"))]
    pub async fn get_child(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
    ) -> Result<ChildDetails, AppError> {
        let child = Self::get_child_row(db, school_id, child_id).await?;

        let parents = sqlx::query_as::<_, LinkedAccount>(
            "SELECT u.id, u.first_name, u.last_name, u.email
             FROM users u INNER JOIN parent_children pc ON pc.parent_id = u.id
             WHERE pc.child_id = $1 AND pc.school_id = $2
             ORDER BY u.last_name, u.first_name",
        )
        .bind(child_id)
        .bind(school_id)
        .fetch_all(db)
        .await?;

        let teachers = sqlx::query_as::<_, LinkedAccount>(
            "SELECT u.id, u.first_name, u.last_name, u.email
             FROM users u INNER JOIN teacher_children tc ON tc.teacher_id = u.id
             WHERE tc.child_id = $1 AND tc.school_id = $2
             ORDER BY u.last_name, u.first_name",
        )
        .bind(child_id)
        .bind(school_id)
        .fetch_all(db)
        .await?;

        Ok(ChildDetails {
            child,
            parents,
            teachers,
        })
    }

    #[instrument(skip(db, dto), fields(school.id = %school_id, child.id = %child_id, db.operation = "UPDATE", db.table = "children"))]
    pub async fn update_child(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
        dto: UpdateChildDto,
    ) -> Result<Child, AppError> {
        let child = sqlx::query_as::<_, Child>(&format!(
            "UPDATE children SET
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                birth_date = COALESCE($5, birth_date),
                sex = COALESCE($6, sex),
                class_name = COALESCE($7, class_name),
                enrollment_status = COALESCE($8, enrollment_status),
                school_year = COALESCE($9, school_year),
                updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {CHILD_COLUMNS}",
        ))
        .bind(child_id)
        .bind(school_id)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(dto.birth_date)
        .bind(&dto.sex)
        .bind(&dto.class_name)
        .bind(&dto.enrollment_status)
        .bind(&dto.school_year)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Child not found".to_string()))?;

        info!(child.id = %child_id, "Child updated");

        Ok(child)
    }

    #[instrument(skip(db), fields(school.id = %school_id, child.id = %child_id, db.operation = "DELETE", db.table = "children"))]
    pub async fn delete_child(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM children WHERE id = $1 AND school_id = $2")
            .bind(child_id)
            .bind(school_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Child not found".to_string()));
        }

        info!(child.id = %child_id, "Child deleted");

        Ok(())
    }

    /// Links a parent account to a child. The account must belong to the
    /// same school and carry the Parent role.
    #[instrument(skip(db), fields(school.id = %school_id, child.id = %child_id, parent.id = %parent_id))]
    pub async fn link_parent(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
        parent_id: Uuid,
    ) -> Result<ChildDetails, AppError> {
        let _ = Self::get_child_row(db, school_id, child_id).await?;
        Self::ensure_account_has_role(db, school_id, parent_id, UserRole::Parent).await?;

        sqlx::query(
            "INSERT INTO parent_children (school_id, child_id, parent_id) VALUES ($1, $2, $3)",
        )
        .bind(school_id)
        .bind(child_id)
        .bind(parent_id)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::BadRequest("Parent is already linked to this child".to_string());
            }
            AppError::from(e)
        })?;

        info!(child.id = %child_id, parent.id = %parent_id, "Parent linked to child");

        Self::get_child(db, school_id, child_id).await
    }

    #[instrument(skip(db), fields(school.id = %school_id, child.id = %child_id, parent.id = %parent_id))]
    pub async fn unlink_parent(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
        parent_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM parent_children WHERE school_id = $1 AND child_id = $2 AND parent_id = $3",
        )
        .bind(school_id)
        .bind(child_id)
        .bind(parent_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Link not found".to_string()));
        }

        info!(child.id = %child_id, parent.id = %parent_id, "Parent unlinked from child");

        Ok(())
    }

    /// Links a teacher account to a child, under the same school/role rules
    /// as [`Self::link_parent`].
    #[instrument(skip(db), fields(school.id = %school_id, child.id = %child_id, teacher.id = %teacher_id))]
    pub async fn link_teacher(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<ChildDetails, AppError> {
        let _ = Self::get_child_row(db, school_id, child_id).await?;
        Self::ensure_account_has_role(db, school_id, teacher_id, UserRole::Teacher).await?;

        sqlx::query(
            "INSERT INTO teacher_children (school_id, child_id, teacher_id) VALUES ($1, $2, $3)",
        )
        .bind(school_id)
        .bind(child_id)
        .bind(teacher_id)
        .execute(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::BadRequest("Teacher is already linked to this child".to_string());
            }
            AppError::from(e)
        })?;

        info!(child.id = %child_id, teacher.id = %teacher_id, "Teacher linked to child");

        Self::get_child(db, school_id, child_id).await
    }

    #[instrument(skip(db), fields(school.id = %school_id, child.id = %child_id, teacher.id = %teacher_id))]
    pub async fn unlink_teacher(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
        teacher_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM teacher_children WHERE school_id = $1 AND child_id = $2 AND teacher_id = $3",
        )
        .bind(school_id)
        .bind(child_id)
        .bind(teacher_id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Link not found".to_string()));
        }

        info!(child.id = %child_id, teacher.id = %teacher_id, "Teacher unlinked from child");

        Ok(())
    }

    /// Children linked to a parent account, for the "my children" listing.
    #[instrument(skip(db), fields(school.id = %school_id, parent.id = %parent_id, db.operation = "SELECT", db.table = "children"))]
    pub async fn get_children_for_parent(
        db: &PgPool,
        school_id: Uuid,
        parent_id: Uuid,
    ) -> Result<Vec<Child>, AppError> {
        let children = sqlx::query_as::<_, Child>(
            "SELECT c.id, c.school_id, c.first_name, c.last_name, c.birth_date, c.sex, c.class_name, c.enrollment_status, c.school_year, c.created_at, c.updated_at
             FROM children c INNER JOIN parent_children pc ON pc.child_id = c.id
             WHERE pc.parent_id = $1 AND pc.school_id = $2
             ORDER BY c.last_name, c.first_name",
        )
        .bind(parent_id)
        .bind(school_id)
        .fetch_all(db)
        .await?;

        Ok(children)
    }

    async fn get_child_row(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
    ) -> Result<Child, AppError> {
        sqlx::query_as::<_, Child>(&format!(
            "SELECT {CHILD_COLUMNS} FROM children WHERE id = $1 AND school_id = $2",
        ))
        .bind(child_id)
        .bind(school_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Child not found".to_string()))
    }

    async fn ensure_account_has_role(
        db: &PgPool,
        school_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<(), AppError> {
        let holds_role = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM users u
                INNER JOIN user_roles ur ON ur.user_id = u.id
                WHERE u.id = $1 AND u.school_id = $2 AND ur.role_id = $3
             )",
        )
        .bind(user_id)
        .bind(school_id)
        .bind(role.role_id())
        .fetch_one(db)
        .await?;

        if !holds_role {
            warn!(
                user.id = %user_id,
                role = %role.as_str(),
                "Attempted to link an account without the required role"
            );
            return Err(AppError::BadRequest(format!(
                "Account is not a {} in this school",
                role.as_str()
            )));
        }

        Ok(())
    }
}

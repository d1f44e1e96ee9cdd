use sqlx::PgPool;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::modules::schools::model::{
    CreateSchoolDto, PaginatedSchoolsResponse, SCHOOL_COLUMNS, School, SchoolFilterParams,
    SchoolSortBy, SortOrder, UpdateSchoolDto,
};
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

pub struct SchoolService;

impl SchoolService {
    #[instrument(skip(db, dto), fields(school.code = %dto.code, db.operation = "INSERT", db.table = "schools"))]
    pub async fn create_school(db: &PgPool, dto: CreateSchoolDto) -> Result<School, AppError> {
        debug!(school.code = %dto.code, school.name = %dto.name, "Creating new school");

        Self::ensure_code_available(db, &dto.code, None).await?;
        Self::ensure_email_available(db, &dto.email, None).await?;

        let school = sqlx::query_as::<_, School>(&format!(
            "INSERT INTO schools (code, email, name, address, commune, phone, school_year)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {SCHOOL_COLUMNS}",
        ))
        .bind(&dto.code)
        .bind(&dto.email)
        .bind(&dto.name)
        .bind(&dto.address)
        .bind(&dto.commune)
        .bind(&dto.phone)
        .bind(dto.school_year.as_deref().unwrap_or(""))
        .fetch_one(db)
        .await
        .map_err(|e| {
            // Last line of defense: the partial unique indexes catch the
            // benign race between the pre-check and the insert.
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                warn!(school.code = %dto.code, "Concurrent school creation hit unique constraint");
                return AppError::DuplicateTenant(
                    "School code or email already in use".to_string(),
                );
            }
            error!(error = %e, school.code = %dto.code, "Database error creating school");
            AppError::from(e)
        })?;

        info!(
            school.id = %school.id,
            school.code = %school.code,
            "School created successfully"
        );

        Ok(school)
    }

    #[instrument(skip(db, filters), fields(db.operation = "SELECT", db.table = "schools"))]
    pub async fn get_all_schools(
        db: &PgPool,
        filters: SchoolFilterParams,
    ) -> Result<PaginatedSchoolsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE is_deleted = FALSE");
        let mut params = Vec::new();

        if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(format!("%{}%", search));
            where_clause.push_str(&format!(
                " AND (name ILIKE ${n} OR code ILIKE ${n})",
                n = params.len()
            ));
        }

        let count_query = format!("SELECT COUNT(*) FROM schools{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await.map_err(|e| {
            error!(error = %e, "Database error counting schools");
            AppError::from(e)
        })?;

        // Sort column and direction come from a whitelist, never from raw input.
        let sort_column = filters.sort_by.unwrap_or(SchoolSortBy::Name).column();
        let sort_dir = filters.sort_order.unwrap_or(SortOrder::Asc).keyword();

        let data_query = format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools{where_clause} ORDER BY {sort_column} {sort_dir} LIMIT {limit} OFFSET {offset}",
        );
        let mut data_sql = sqlx::query_as::<_, School>(&data_query);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let schools = data_sql.fetch_all(db).await.map_err(|e| {
            error!(error = %e, "Database error fetching schools");
            AppError::from(e)
        })?;

        let has_more = offset + limit < total;

        debug!(
            total = %total,
            returned = %schools.len(),
            "Schools fetched successfully"
        );

        Ok(PaginatedSchoolsResponse {
            data: schools,
            meta: PaginationMeta {
                total,
                limit,
                offset: Some(offset),
                page: None,
                has_more,
            },
        })
    }

    #[instrument(skip(db), fields(school.id = %school_id, db.operation = "SELECT", db.table = "schools"))]
    pub async fn get_school_by_id(db: &PgPool, school_id: Uuid) -> Result<School, AppError> {
        Self::find_active_by_id(db, school_id)
            .await?
            .ok_or(AppError::TenantNotFound)
    }

    #[instrument(skip(db, dto), fields(school.id = %school_id, db.operation = "UPDATE", db.table = "schools"))]
    pub async fn update_school(
        db: &PgPool,
        school_id: Uuid,
        dto: UpdateSchoolDto,
    ) -> Result<School, AppError> {
        let existing = Self::get_school_by_id(db, school_id).await?;

        if let Some(code) = &dto.code
            && code != &existing.code
        {
            Self::ensure_code_available(db, code, Some(school_id)).await?;
        }
        if let Some(email) = &dto.email
            && email != &existing.email
        {
            Self::ensure_email_available(db, email, Some(school_id)).await?;
        }

        let school = sqlx::query_as::<_, School>(&format!(
            "UPDATE schools SET
                code = COALESCE($2, code),
                email = COALESCE($3, email),
                name = COALESCE($4, name),
                address = COALESCE($5, address),
                commune = COALESCE($6, commune),
                phone = COALESCE($7, phone),
                school_year = COALESCE($8, school_year),
                updated_at = NOW()
             WHERE id = $1 AND is_deleted = FALSE
             RETURNING {SCHOOL_COLUMNS}",
        ))
        .bind(school_id)
        .bind(&dto.code)
        .bind(&dto.email)
        .bind(&dto.name)
        .bind(&dto.address)
        .bind(&dto.commune)
        .bind(&dto.phone)
        .bind(&dto.school_year)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::DuplicateTenant(
                    "School code or email already in use".to_string(),
                );
            }
            error!(school.id = %school_id, error = %e, "Database error updating school");
            AppError::from(e)
        })?
        .ok_or(AppError::TenantNotFound)?;

        info!(school.id = %school_id, "School updated successfully");

        Ok(school)
    }

    /// Soft delete: the row is retained, flagged, and excluded from every
    /// directory lookup and uniqueness check from then on.
    #[instrument(skip(db), fields(school.id = %school_id, db.operation = "UPDATE", db.table = "schools"))]
    pub async fn delete_school(db: &PgPool, school_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE schools SET is_deleted = TRUE, updated_at = NOW()
             WHERE id = $1 AND is_deleted = FALSE",
        )
        .bind(school_id)
        .execute(db)
        .await
        .map_err(|e| {
            error!(school.id = %school_id, error = %e, "Database error deleting school");
            AppError::from(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::TenantNotFound);
        }

        info!(school.id = %school_id, "School soft-deleted successfully");

        Ok(())
    }

    #[instrument(skip(db), fields(school.id = %school_id, db.operation = "UPDATE", db.table = "schools"))]
    pub async fn toggle_school_status(db: &PgPool, school_id: Uuid) -> Result<School, AppError> {
        let school = sqlx::query_as::<_, School>(&format!(
            "UPDATE schools SET is_active = NOT is_active, updated_at = NOW()
             WHERE id = $1 AND is_deleted = FALSE
             RETURNING {SCHOOL_COLUMNS}",
        ))
        .bind(school_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(school.id = %school_id, error = %e, "Database error toggling school status");
            AppError::from(e)
        })?
        .ok_or(AppError::TenantNotFound)?;

        info!(
            school.id = %school_id,
            school.is_active = %school.is_active,
            "School status toggled"
        );

        Ok(school)
    }

    /// Directory lookup for the tenant resolver. Returns `None` for an
    /// empty, unknown or soft-deleted code.
    pub async fn find_active_by_code(db: &PgPool, code: &str) -> Result<Option<School>, AppError> {
        if code.trim().is_empty() {
            return Ok(None);
        }

        let school = sqlx::query_as::<_, School>(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools WHERE code = $1 AND is_deleted = FALSE",
        ))
        .bind(code)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(school.code = %code, error = %e, "Database error resolving school by code");
            AppError::from(e)
        })?;

        Ok(school)
    }

    /// Directory lookup by id, excluding soft-deleted schools.
    pub async fn find_active_by_id(
        db: &PgPool,
        school_id: Uuid,
    ) -> Result<Option<School>, AppError> {
        let school = sqlx::query_as::<_, School>(&format!(
            "SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1 AND is_deleted = FALSE",
        ))
        .bind(school_id)
        .fetch_optional(db)
        .await
        .map_err(|e| {
            error!(school.id = %school_id, error = %e, "Database error resolving school by id");
            AppError::from(e)
        })?;

        Ok(school)
    }

    async fn ensure_code_available(
        db: &PgPool,
        code: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM schools
                WHERE code = $1 AND is_deleted = FALSE AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_one(db)
        .await?;

        if taken {
            warn!(school.code = %code, "Attempted to reuse an existing school code");
            return Err(AppError::DuplicateTenant(
                "School code already in use".to_string(),
            ));
        }

        Ok(())
    }

    async fn ensure_email_available(
        db: &PgPool,
        email: &str,
        exclude_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM schools
                WHERE email = $1 AND is_deleted = FALSE AND ($2::uuid IS NULL OR id <> $2)
             )",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(db)
        .await?;

        if taken {
            warn!(school.email = %email, "Attempted to reuse an existing school email");
            return Err(AppError::DuplicateTenant(
                "School email already in use".to_string(),
            ));
        }

        Ok(())
    }
}

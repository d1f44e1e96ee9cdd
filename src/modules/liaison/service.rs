use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::liaison::model::{CreateLiaisonEntryDto, LIAISON_COLUMNS, LiaisonEntry};
use crate::utils::errors::AppError;

pub struct LiaisonService;

impl LiaisonService {
    #[instrument(skip(db, dto), fields(school.id = %school_id, child.id = %dto.child_id))]
    pub async fn create_entry(
        db: &PgPool,
        school_id: Uuid,
        author_id: Uuid,
        dto: CreateLiaisonEntryDto,
    ) -> Result<LiaisonEntry, AppError> {
        let child_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM children WHERE id = $1 AND school_id = $2)",
        )
        .bind(dto.child_id)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        if !child_exists {
            return Err(AppError::NotFound("Child not found".to_string()));
        }

        let entry = sqlx::query_as::<_, LiaisonEntry>(&format!(
            "INSERT INTO liaison_entries (school_id, child_id, author_id, title, message)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {LIAISON_COLUMNS}",
        ))
        .bind(school_id)
        .bind(dto.child_id)
        .bind(author_id)
        .bind(&dto.title)
        .bind(&dto.message)
        .fetch_one(db)
        .await?;

        info!(entry.id = %entry.id, "Liaison entry created");

        Ok(entry)
    }

    #[instrument(skip(db), fields(school.id = %school_id, child.id = %child_id))]
    pub async fn get_entries_for_child(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
    ) -> Result<Vec<LiaisonEntry>, AppError> {
        let entries = sqlx::query_as::<_, LiaisonEntry>(&format!(
            "SELECT {LIAISON_COLUMNS} FROM liaison_entries
             WHERE child_id = $1 AND school_id = $2
             ORDER BY created_at DESC",
        ))
        .bind(child_id)
        .bind(school_id)
        .fetch_all(db)
        .await?;

        Ok(entries)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn get_entry(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
    ) -> Result<LiaisonEntry, AppError> {
        sqlx::query_as::<_, LiaisonEntry>(&format!(
            "SELECT {LIAISON_COLUMNS} FROM liaison_entries WHERE id = $1 AND school_id = $2",
        ))
        .bind(id)
        .bind(school_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Liaison entry not found".to_string()))
    }

    /// Parent signature. Idempotent: the first acknowledgement timestamp is
    /// kept on repeated calls.
    #[instrument(skip(db), fields(school.id = %school_id, user.id = %parent_id))]
    pub async fn acknowledge_entry(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
        parent_id: Uuid,
    ) -> Result<LiaisonEntry, AppError> {
        let entry = Self::get_entry(db, school_id, id).await?;

        if !Self::is_parent_of(db, school_id, entry.child_id, parent_id).await? {
            return Err(AppError::Forbidden(
                "Only a linked parent can acknowledge a liaison entry".to_string(),
            ));
        }

        let entry = sqlx::query_as::<_, LiaisonEntry>(&format!(
            "UPDATE liaison_entries
             SET acknowledged_at = COALESCE(acknowledged_at, NOW()), updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {LIAISON_COLUMNS}",
        ))
        .bind(id)
        .bind(school_id)
        .fetch_one(db)
        .await?;

        info!(entry.id = %id, "Liaison entry acknowledged");

        Ok(entry)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn delete_entry(db: &PgPool, school_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM liaison_entries WHERE id = $1 AND school_id = $2")
            .bind(id)
            .bind(school_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Liaison entry not found".to_string()));
        }

        info!(entry.id = %id, "Liaison entry deleted");

        Ok(())
    }

    pub async fn is_parent_of(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError> {
        let linked = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM parent_children
                WHERE school_id = $1 AND child_id = $2 AND parent_id = $3
             )",
        )
        .bind(school_id)
        .bind(child_id)
        .bind(user_id)
        .fetch_one(db)
        .await?;

        Ok(linked)
    }
}

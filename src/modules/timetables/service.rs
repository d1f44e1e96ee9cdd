use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::timetables::model::{
    CreateTimetableEntryDto, TIMETABLE_COLUMNS, TimetableEntry, TimetableFilterParams,
    UpdateTimetableEntryDto,
};
use crate::utils::errors::AppError;

pub struct TimetableService;

impl TimetableService {
    #[instrument(skip(db, dto), fields(school.id = %school_id, class = %dto.class_name))]
    pub async fn create_entry(
        db: &PgPool,
        school_id: Uuid,
        dto: CreateTimetableEntryDto,
    ) -> Result<TimetableEntry, AppError> {
        if dto.ends_at <= dto.starts_at {
            return Err(AppError::validation("Timetable slot must end after it starts"));
        }

        let entry = sqlx::query_as::<_, TimetableEntry>(&format!(
            "INSERT INTO timetable_entries (school_id, class_name, weekday, starts_at, ends_at, subject, teacher_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {TIMETABLE_COLUMNS}",
        ))
        .bind(school_id)
        .bind(&dto.class_name)
        .bind(dto.weekday)
        .bind(dto.starts_at)
        .bind(dto.ends_at)
        .bind(&dto.subject)
        .bind(dto.teacher_id)
        .fetch_one(db)
        .await?;

        info!(entry.id = %entry.id, "Timetable entry created");

        Ok(entry)
    }

    #[instrument(skip(db, filters), fields(school.id = %school_id))]
    pub async fn get_entries(
        db: &PgPool,
        school_id: Uuid,
        filters: TimetableFilterParams,
    ) -> Result<Vec<TimetableEntry>, AppError> {
        let entries = sqlx::query_as::<_, TimetableEntry>(&format!(
            "SELECT {TIMETABLE_COLUMNS} FROM timetable_entries
             WHERE school_id = $1
               AND ($2::text IS NULL OR class_name = $2)
               AND ($3::smallint IS NULL OR weekday = $3)
             ORDER BY class_name, weekday, starts_at",
        ))
        .bind(school_id)
        .bind(&filters.class_name)
        .bind(filters.weekday)
        .fetch_all(db)
        .await?;

        Ok(entries)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn get_entry(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
    ) -> Result<TimetableEntry, AppError> {
        sqlx::query_as::<_, TimetableEntry>(&format!(
            "SELECT {TIMETABLE_COLUMNS} FROM timetable_entries WHERE id = $1 AND school_id = $2",
        ))
        .bind(id)
        .bind(school_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Timetable entry not found".to_string()))
    }

    #[instrument(skip(db, dto), fields(school.id = %school_id))]
    pub async fn update_entry(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
        dto: UpdateTimetableEntryDto,
    ) -> Result<TimetableEntry, AppError> {
        let existing = Self::get_entry(db, school_id, id).await?;

        let starts_at = dto.starts_at.unwrap_or(existing.starts_at);
        let ends_at = dto.ends_at.unwrap_or(existing.ends_at);
        if ends_at <= starts_at {
            return Err(AppError::validation("Timetable slot must end after it starts"));
        }

        let entry = sqlx::query_as::<_, TimetableEntry>(&format!(
            "UPDATE timetable_entries SET
                class_name = COALESCE($3, class_name),
                weekday = COALESCE($4, weekday),
                starts_at = COALESCE($5, starts_at),
                ends_at = COALESCE($6, ends_at),
                subject = COALESCE($7, subject),
                teacher_id = COALESCE($8, teacher_id),
                updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {TIMETABLE_COLUMNS}",
        ))
        .bind(id)
        .bind(school_id)
        .bind(&dto.class_name)
        .bind(dto.weekday)
        .bind(dto.starts_at)
        .bind(dto.ends_at)
        .bind(&dto.subject)
        .bind(dto.teacher_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Timetable entry not found".to_string()))?;

        info!(entry.id = %id, "Timetable entry updated");

        Ok(entry)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn delete_entry(db: &PgPool, school_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM timetable_entries WHERE id = $1 AND school_id = $2")
            .bind(id)
            .bind(school_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Timetable entry not found".to_string()));
        }

        info!(entry.id = %id, "Timetable entry deleted");

        Ok(())
    }
}

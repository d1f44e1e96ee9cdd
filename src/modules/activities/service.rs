use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::activities::model::{
    ACTIVITY_COLUMNS, Activity, ActivityFilterParams, CreateActivityDto,
    PaginatedActivitiesResponse, UpdateActivityDto,
};
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

pub struct ActivityService;

impl ActivityService {
    #[instrument(skip(db, dto), fields(school.id = %school_id))]
    pub async fn create_activity(
        db: &PgPool,
        school_id: Uuid,
        dto: CreateActivityDto,
    ) -> Result<Activity, AppError> {
        if let Some(ends_at) = dto.ends_at
            && ends_at <= dto.starts_at
        {
            return Err(AppError::validation("Activity must end after it starts"));
        }

        let activity = sqlx::query_as::<_, Activity>(&format!(
            "INSERT INTO activities (school_id, title, description, location, starts_at, ends_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {ACTIVITY_COLUMNS}",
        ))
        .bind(school_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.location)
        .bind(dto.starts_at)
        .bind(dto.ends_at)
        .fetch_one(db)
        .await?;

        info!(activity.id = %activity.id, "Activity created");

        Ok(activity)
    }

    #[instrument(skip(db, filters), fields(school.id = %school_id))]
    pub async fn get_activities(
        db: &PgPool,
        school_id: Uuid,
        filters: ActivityFilterParams,
    ) -> Result<PaginatedActivitiesResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let where_clause = " WHERE school_id = $1
              AND ($2::timestamptz IS NULL OR starts_at >= $2)
              AND ($3::timestamptz IS NULL OR starts_at < $3)";

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM activities{where_clause}"
        ))
        .bind(school_id)
        .bind(filters.from)
        .bind(filters.to)
        .fetch_one(db)
        .await?;

        let activities = sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities{where_clause} ORDER BY starts_at LIMIT {limit} OFFSET {offset}",
        ))
        .bind(school_id)
        .bind(filters.from)
        .bind(filters.to)
        .fetch_all(db)
        .await?;

        let has_more = offset + limit < total;

        Ok(PaginatedActivitiesResponse {
            data: activities,
            meta: PaginationMeta {
                total,
                limit,
                offset: Some(offset),
                page: None,
                has_more,
            },
        })
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn get_activity(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
    ) -> Result<Activity, AppError> {
        sqlx::query_as::<_, Activity>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1 AND school_id = $2",
        ))
        .bind(id)
        .bind(school_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))
    }

    #[instrument(skip(db, dto), fields(school.id = %school_id))]
    pub async fn update_activity(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
        dto: UpdateActivityDto,
    ) -> Result<Activity, AppError> {
        let existing = Self::get_activity(db, school_id, id).await?;

        let starts_at = dto.starts_at.unwrap_or(existing.starts_at);
        if let Some(ends_at) = dto.ends_at.or(existing.ends_at)
            && ends_at <= starts_at
        {
            return Err(AppError::validation("Activity must end after it starts"));
        }

        let activity = sqlx::query_as::<_, Activity>(&format!(
            "UPDATE activities SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                location = COALESCE($5, location),
                starts_at = COALESCE($6, starts_at),
                ends_at = COALESCE($7, ends_at),
                updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {ACTIVITY_COLUMNS}",
        ))
        .bind(id)
        .bind(school_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.location)
        .bind(dto.starts_at)
        .bind(dto.ends_at)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;

        info!(activity.id = %id, "Activity updated");

        Ok(activity)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn delete_activity(db: &PgPool, school_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE id = $1 AND school_id = $2")
            .bind(id)
            .bind(school_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Activity not found".to_string()));
        }

        info!(activity.id = %id, "Activity deleted");

        Ok(())
    }
}

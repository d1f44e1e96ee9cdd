use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::announcements::model::{
    ANNOUNCEMENT_COLUMNS, Announcement, AnnouncementFilterParams, CreateAnnouncementDto,
    PaginatedAnnouncementsResponse, UpdateAnnouncementDto,
};
use crate::utils::errors::AppError;
use crate::utils::pagination::PaginationMeta;

pub struct AnnouncementService;

impl AnnouncementService {
    #[instrument(skip(db, dto), fields(school.id = %school_id))]
    pub async fn create_announcement(
        db: &PgPool,
        school_id: Uuid,
        author_id: Uuid,
        dto: CreateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        let announcement = sqlx::query_as::<_, Announcement>(&format!(
            "INSERT INTO announcements (school_id, author_id, title, body, published)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ANNOUNCEMENT_COLUMNS}",
        ))
        .bind(school_id)
        .bind(author_id)
        .bind(&dto.title)
        .bind(&dto.body)
        .bind(dto.published.unwrap_or(true))
        .fetch_one(db)
        .await?;

        info!(announcement.id = %announcement.id, "Announcement created");

        Ok(announcement)
    }

    #[instrument(skip(db, filters), fields(school.id = %school_id))]
    pub async fn get_announcements(
        db: &PgPool,
        school_id: Uuid,
        filters: AnnouncementFilterParams,
    ) -> Result<PaginatedAnnouncementsResponse, AppError> {
        let limit = filters.pagination.limit();
        let offset = filters.pagination.offset();

        let mut where_clause = String::from(" WHERE school_id = $1");
        let mut params = Vec::new();

        if let Some(search) = filters.search.as_deref().filter(|s| !s.is_empty()) {
            params.push(format!("%{}%", search));
            where_clause.push_str(&format!(" AND title ILIKE ${}", params.len() + 1));
        }

        let count_query = format!("SELECT COUNT(*) FROM announcements{where_clause}");
        let mut count_sql = sqlx::query_scalar::<_, i64>(&count_query).bind(school_id);
        for param in &params {
            count_sql = count_sql.bind(param);
        }
        let total = count_sql.fetch_one(db).await?;

        let data_query = format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements{where_clause} ORDER BY created_at DESC LIMIT {limit} OFFSET {offset}",
        );
        let mut data_sql = sqlx::query_as::<_, Announcement>(&data_query).bind(school_id);
        for param in params {
            data_sql = data_sql.bind(param);
        }
        let announcements = data_sql.fetch_all(db).await?;

        let has_more = offset + limit < total;

        Ok(PaginatedAnnouncementsResponse {
            data: announcements,
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
    pub async fn get_announcement(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
    ) -> Result<Announcement, AppError> {
        sqlx::query_as::<_, Announcement>(&format!(
            "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = $1 AND school_id = $2",
        ))
        .bind(id)
        .bind(school_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
    }

    #[instrument(skip(db, dto), fields(school.id = %school_id))]
    pub async fn update_announcement(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
        dto: UpdateAnnouncementDto,
    ) -> Result<Announcement, AppError> {
        let announcement = sqlx::query_as::<_, Announcement>(&format!(
            "UPDATE announcements SET
                title = COALESCE($3, title),
                body = COALESCE($4, body),
                published = COALESCE($5, published),
                updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {ANNOUNCEMENT_COLUMNS}",
        ))
        .bind(id)
        .bind(school_id)
        .bind(&dto.title)
        .bind(&dto.body)
        .bind(dto.published)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        info!(announcement.id = %id, "Announcement updated");

        Ok(announcement)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn delete_announcement(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1 AND school_id = $2")
            .bind(id)
            .bind(school_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }

        info!(announcement.id = %id, "Announcement deleted");

        Ok(())
    }
}

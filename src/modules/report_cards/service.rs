use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::report_cards::model::{
    CreateReportCardDto, REPORT_CARD_COLUMNS, ReportCard, UpdateReportCardDto,
};
use crate::utils::errors::AppError;

pub struct ReportCardService;

impl ReportCardService {
    #[instrument(skip(db, dto), fields(school.id = %school_id, child.id = %dto.child_id))]
    pub async fn create_report_card(
        db: &PgPool,
        school_id: Uuid,
        dto: CreateReportCardDto,
    ) -> Result<ReportCard, AppError> {
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

        let report_card = sqlx::query_as::<_, ReportCard>(&format!(
            "INSERT INTO report_cards (school_id, child_id, school_year, period, overall_average, teacher_comment)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {REPORT_CARD_COLUMNS}",
        ))
        .bind(school_id)
        .bind(dto.child_id)
        .bind(&dto.school_year)
        .bind(&dto.period)
        .bind(dto.overall_average)
        .bind(&dto.teacher_comment)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::BadRequest(
                    "A report card already exists for this child, year and period".to_string(),
                );
            }
            AppError::from(e)
        })?;

        info!(report_card.id = %report_card.id, "Report card created");

        Ok(report_card)
    }

    #[instrument(skip(db), fields(school.id = %school_id, child.id = %child_id))]
    pub async fn get_report_cards_for_child(
        db: &PgPool,
        school_id: Uuid,
        child_id: Uuid,
    ) -> Result<Vec<ReportCard>, AppError> {
        let report_cards = sqlx::query_as::<_, ReportCard>(&format!(
            "SELECT {REPORT_CARD_COLUMNS} FROM report_cards
             WHERE child_id = $1 AND school_id = $2
             ORDER BY school_year DESC, period",
        ))
        .bind(child_id)
        .bind(school_id)
        .fetch_all(db)
        .await?;

        Ok(report_cards)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn get_report_card(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
    ) -> Result<ReportCard, AppError> {
        sqlx::query_as::<_, ReportCard>(&format!(
            "SELECT {REPORT_CARD_COLUMNS} FROM report_cards WHERE id = $1 AND school_id = $2",
        ))
        .bind(id)
        .bind(school_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Report card not found".to_string()))
    }

    #[instrument(skip(db, dto), fields(school.id = %school_id))]
    pub async fn update_report_card(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
        dto: UpdateReportCardDto,
    ) -> Result<ReportCard, AppError> {
        let report_card = sqlx::query_as::<_, ReportCard>(&format!(
            "UPDATE report_cards SET
                overall_average = COALESCE($3, overall_average),
                teacher_comment = COALESCE($4, teacher_comment),
                updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {REPORT_CARD_COLUMNS}",
        ))
        .bind(id)
        .bind(school_id)
        .bind(dto.overall_average)
        .bind(&dto.teacher_comment)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Report card not found".to_string()))?;

        info!(report_card.id = %id, "Report card updated");

        Ok(report_card)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn delete_report_card(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM report_cards WHERE id = $1 AND school_id = $2")
            .bind(id)
            .bind(school_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Report card not found".to_string()));
        }

        info!(report_card.id = %id, "Report card deleted");

        Ok(())
    }
}

use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::canteen::model::{
    CANTEEN_MENU_COLUMNS, CanteenMenu, CreateCanteenMenuDto, MenuRangeParams,
    UpdateCanteenMenuDto,
};
use crate::utils::errors::AppError;

pub struct CanteenService;

impl CanteenService {
    #[instrument(skip(db, dto), fields(school.id = %school_id, menu.date = %dto.menu_date))]
    pub async fn create_menu(
        db: &PgPool,
        school_id: Uuid,
        dto: CreateCanteenMenuDto,
    ) -> Result<CanteenMenu, AppError> {
        let menu = sqlx::query_as::<_, CanteenMenu>(&format!(
            "INSERT INTO canteen_menus (school_id, menu_date, starter, main_course, dessert, snack)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {CANTEEN_MENU_COLUMNS}",
        ))
        .bind(school_id)
        .bind(dto.menu_date)
        .bind(&dto.starter)
        .bind(&dto.main_course)
        .bind(&dto.dessert)
        .bind(&dto.snack)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e
                && db_err.is_unique_violation()
            {
                return AppError::BadRequest("A menu already exists for this date".to_string());
            }
            AppError::from(e)
        })?;

        info!(menu.id = %menu.id, "Canteen menu created");

        Ok(menu)
    }

    #[instrument(skip(db, range), fields(school.id = %school_id))]
    pub async fn get_menus(
        db: &PgPool,
        school_id: Uuid,
        range: MenuRangeParams,
    ) -> Result<Vec<CanteenMenu>, AppError> {
        let menus = sqlx::query_as::<_, CanteenMenu>(&format!(
            "SELECT {CANTEEN_MENU_COLUMNS} FROM canteen_menus
             WHERE school_id = $1
               AND ($2::date IS NULL OR menu_date >= $2)
               AND ($3::date IS NULL OR menu_date <= $3)
             ORDER BY menu_date",
        ))
        .bind(school_id)
        .bind(range.from)
        .bind(range.to)
        .fetch_all(db)
        .await?;

        Ok(menus)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn get_menu(db: &PgPool, school_id: Uuid, id: Uuid) -> Result<CanteenMenu, AppError> {
        sqlx::query_as::<_, CanteenMenu>(&format!(
            "SELECT {CANTEEN_MENU_COLUMNS} FROM canteen_menus WHERE id = $1 AND school_id = $2",
        ))
        .bind(id)
        .bind(school_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu not found".to_string()))
    }

    #[instrument(skip(db, dto), fields(school.id = %school_id))]
    pub async fn update_menu(
        db: &PgPool,
        school_id: Uuid,
        id: Uuid,
        dto: UpdateCanteenMenuDto,
    ) -> Result<CanteenMenu, AppError> {
        let menu = sqlx::query_as::<_, CanteenMenu>(&format!(
            "UPDATE canteen_menus SET
                starter = COALESCE($3, starter),
                main_course = COALESCE($4, main_course),
                dessert = COALESCE($5, dessert),
                snack = COALESCE($6, snack),
                updated_at = NOW()
             WHERE id = $1 AND school_id = $2
             RETURNING {CANTEEN_MENU_COLUMNS}",
        ))
        .bind(id)
        .bind(school_id)
        .bind(&dto.starter)
        .bind(&dto.main_course)
        .bind(&dto.dessert)
        .bind(&dto.snack)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu not found".to_string()))?;

        info!(menu.id = %id, "Canteen menu updated");

        Ok(menu)
    }

    #[instrument(skip(db), fields(school.id = %school_id))]
    pub async fn delete_menu(db: &PgPool, school_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM canteen_menus WHERE id = $1 AND school_id = $2")
            .bind(id)
            .bind(school_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Menu not found".to_string()));
        }

        info!(menu.id = %id, "Canteen menu deleted");

        Ok(())
    }
}

//! Repositorio de drivers (perfiles operacionales)
//!
//! Los métodos claim_vehicle/release_vehicle son updates condicionales
//! atómicos: la atomicidad del UPDATE ... WHERE del store es lo que
//! cierra la carrera check-then-act de las asignaciones.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::utils::errors::AppError;

#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Driver>, AppError>;

    async fn find_all(&self) -> Result<Vec<Driver>, AppError>;

    /// Lookup por el link explícito a la identidad de login
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Driver>, AppError>;

    /// Lookup por nombre completo. Fallback legacy del cascade delete,
    /// para perfiles creados antes de que existiera el link por id.
    async fn find_by_name(&self, name: &str) -> Result<Option<Driver>, AppError>;

    async fn license_number_exists(&self, license_number: &str) -> Result<bool, AppError>;

    async fn create(&self, driver: &Driver) -> Result<(), AppError>;

    /// Persiste los campos de perfil (nombre, licencia, disponibilidad).
    /// No toca assigned_vehicle_id: eso es del coordinador.
    async fn update_profile(&self, driver: &Driver) -> Result<(), AppError>;

    /// Devuelve false si el driver no existía
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Reclama el lado driver de una asignación. Solo escribe si el
    /// driver existe y no tiene vehículo; devuelve si escribió.
    async fn claim_vehicle(&self, driver_id: Uuid, vehicle_id: Uuid) -> Result<bool, AppError>;

    /// Suelta el lado driver; devuelve si había algo que soltar
    async fn release_vehicle(&self, driver_id: Uuid) -> Result<bool, AppError>;

    /// Drivers con vehículo asignado, para el sweep de reconciliación
    async fn find_assigned(&self) -> Result<Vec<Driver>, AppError>;

    async fn count_grouped_by_availability(&self) -> Result<Vec<(bool, i64)>, AppError>;

    async fn count_grouped_by_license_type(&self) -> Result<Vec<(String, i64)>, AppError>;

    /// (asignados, libres)
    async fn count_assignment_split(&self) -> Result<(i64, i64), AppError>;
}

pub struct PgDriverRepository {
    pool: PgPool,
}

impl PgDriverRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverRepository for PgDriverRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    async fn find_all(&self) -> Result<Vec<Driver>, AppError> {
        let drivers =
            sqlx::query_as::<_, Driver>("SELECT * FROM drivers ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(drivers)
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>("SELECT * FROM drivers WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(driver)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Driver>, AppError> {
        let driver = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE name = $1 ORDER BY created_at LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(driver)
    }

    async fn license_number_exists(&self, license_number: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM drivers WHERE license_number = $1)")
                .bind(license_number)
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    async fn create(&self, driver: &Driver) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO drivers
                (id, name, license_number, license_type, available,
                 assigned_vehicle_id, user_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(driver.id)
        .bind(&driver.name)
        .bind(&driver.license_number)
        .bind(driver.license_type)
        .bind(driver.available)
        .bind(driver.assigned_vehicle_id)
        .bind(driver.user_id)
        .bind(driver.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_profile(&self, driver: &Driver) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE drivers
            SET name = $2, license_number = $3, license_type = $4, available = $5
            WHERE id = $1
            "#,
        )
        .bind(driver.id)
        .bind(&driver.name)
        .bind(&driver.license_number)
        .bind(driver.license_type)
        .bind(driver.available)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn claim_vehicle(&self, driver_id: Uuid, vehicle_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE drivers SET assigned_vehicle_id = $2 WHERE id = $1 AND assigned_vehicle_id IS NULL",
        )
        .bind(driver_id)
        .bind(vehicle_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_vehicle(&self, driver_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE drivers SET assigned_vehicle_id = NULL WHERE id = $1 AND assigned_vehicle_id IS NOT NULL",
        )
        .bind(driver_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_assigned(&self) -> Result<Vec<Driver>, AppError> {
        let drivers = sqlx::query_as::<_, Driver>(
            "SELECT * FROM drivers WHERE assigned_vehicle_id IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(drivers)
    }

    async fn count_grouped_by_availability(&self) -> Result<Vec<(bool, i64)>, AppError> {
        let rows: Vec<(bool, i64)> =
            sqlx::query_as("SELECT available, COUNT(*) FROM drivers GROUP BY available")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows)
    }

    async fn count_grouped_by_license_type(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT license_type::text, COUNT(*) FROM drivers GROUP BY license_type",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_assignment_split(&self) -> Result<(i64, i64), AppError> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE assigned_vehicle_id IS NOT NULL),
                COUNT(*) FILTER (WHERE assigned_vehicle_id IS NULL)
            FROM drivers
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}

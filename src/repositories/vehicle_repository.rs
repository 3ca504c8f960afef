//! Repositorio de vehículos
//!
//! Espejo del repositorio de drivers para el otro lado del invariante:
//! claim_driver/release_driver son los updates condicionales atómicos.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::vehicle::Vehicle;
use crate::utils::errors::AppError;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError>;

    async fn find_all(&self) -> Result<Vec<Vehicle>, AppError>;

    async fn number_exists(&self, number: &str) -> Result<bool, AppError>;

    async fn create(&self, vehicle: &Vehicle) -> Result<(), AppError>;

    /// Persiste matrícula, tipo y estado. No toca assigned_driver_id.
    async fn update_profile(&self, vehicle: &Vehicle) -> Result<(), AppError>;

    /// Devuelve false si el vehículo no existía
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Reclama el lado vehicle de una asignación; solo escribe si el
    /// vehículo existe y está libre. Devuelve si escribió.
    async fn claim_driver(&self, vehicle_id: Uuid, driver_id: Uuid) -> Result<bool, AppError>;

    /// Suelta el lado vehicle; devuelve si había algo que soltar
    async fn release_driver(&self, vehicle_id: Uuid) -> Result<bool, AppError>;

    /// Vehículos con driver asignado, para el sweep de reconciliación
    async fn find_assigned(&self) -> Result<Vec<Vehicle>, AppError>;

    async fn count_grouped_by_status(&self) -> Result<Vec<(String, i64)>, AppError>;

    async fn count_grouped_by_type(&self) -> Result<Vec<(String, i64)>, AppError>;

    /// (asignados, libres)
    async fn count_assignment_split(&self) -> Result<(i64, i64), AppError>;
}

pub struct PgVehicleRepository {
    pool: PgPool,
}

impl PgVehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleRepository for PgVehicleRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    async fn find_all(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles =
            sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(vehicles)
    }

    async fn number_exists(&self, number: &str) -> Result<bool, AppError> {
        let result: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM vehicles WHERE number = $1)")
                .bind(number.to_uppercase())
                .fetch_one(&self.pool)
                .await?;

        Ok(result.0)
    }

    async fn create(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO vehicles
                (id, number, vehicle_type, status, assigned_driver_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.number)
        .bind(vehicle.vehicle_type)
        .bind(vehicle.status)
        .bind(vehicle.assigned_driver_id)
        .bind(vehicle.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_profile(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE vehicles
            SET number = $2, vehicle_type = $3, status = $4
            WHERE id = $1
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.number)
        .bind(vehicle.vehicle_type)
        .bind(vehicle.status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn claim_driver(&self, vehicle_id: Uuid, driver_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE vehicles SET assigned_driver_id = $2 WHERE id = $1 AND assigned_driver_id IS NULL",
        )
        .bind(vehicle_id)
        .bind(driver_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn release_driver(&self, vehicle_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE vehicles SET assigned_driver_id = NULL WHERE id = $1 AND assigned_driver_id IS NOT NULL",
        )
        .bind(vehicle_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_assigned(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT * FROM vehicles WHERE assigned_driver_id IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(vehicles)
    }

    async fn count_grouped_by_status(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status::text, COUNT(*) FROM vehicles GROUP BY status")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows)
    }

    async fn count_grouped_by_type(&self) -> Result<Vec<(String, i64)>, AppError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT vehicle_type::text, COUNT(*) FROM vehicles GROUP BY vehicle_type",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn count_assignment_split(&self) -> Result<(i64, i64), AppError> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE assigned_driver_id IS NOT NULL),
                COUNT(*) FILTER (WHERE assigned_driver_id IS NULL)
            FROM vehicles
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}

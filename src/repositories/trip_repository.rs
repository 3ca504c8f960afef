//! Repositorio de trips

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::trip::Trip;
use crate::utils::errors::AppError;

#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Trip>, AppError>;

    async fn find_all(&self) -> Result<Vec<Trip>, AppError>;

    async fn create(&self, trip: &Trip) -> Result<(), AppError>;

    /// Persiste todos los campos mutables del trip, incluida la
    /// asignación de driver (los trips no tienen invariante bidireccional)
    async fn update(&self, trip: &Trip) -> Result<(), AppError>;

    /// Devuelve false si el trip no existía
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

pub struct PgTripRepository {
    pool: PgPool,
}

impl PgTripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripRepository for PgTripRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Trip>, AppError> {
        let trip = sqlx::query_as::<_, Trip>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(trip)
    }

    async fn find_all(&self) -> Result<Vec<Trip>, AppError> {
        let trips = sqlx::query_as::<_, Trip>("SELECT * FROM trips ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(trips)
    }

    async fn create(&self, trip: &Trip) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO trips
                (id, departure, destination, date, departure_time, arrival_time,
                 created_by, assigned_driver_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(trip.id)
        .bind(&trip.departure)
        .bind(&trip.destination)
        .bind(trip.date)
        .bind(&trip.departure_time)
        .bind(&trip.arrival_time)
        .bind(trip.created_by)
        .bind(trip.assigned_driver_id)
        .bind(trip.status)
        .bind(trip.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, trip: &Trip) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE trips
            SET departure = $2, destination = $3, date = $4, departure_time = $5,
                arrival_time = $6, assigned_driver_id = $7, status = $8
            WHERE id = $1
            "#,
        )
        .bind(trip.id)
        .bind(&trip.departure)
        .bind(&trip.destination)
        .bind(trip.date)
        .bind(&trip.departure_time)
        .bind(&trip.arrival_time)
        .bind(trip.assigned_driver_id)
        .bind(trip.status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }
}

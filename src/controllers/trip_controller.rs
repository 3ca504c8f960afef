//! Controller de trips
//!
//! Los trips referencian drivers pero no participan del invariante
//! bidireccional driver↔vehículo: asignar un trip chequea la
//! disponibilidad del driver pero nunca la modifica.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::models::trip::{
    AssignTripRequest, CreateTripRequest, Trip, TripResponse, TripStatus, UpdateTripRequest,
};
use crate::repositories::{
    DriverRepository, PgDriverRepository, PgTripRepository, TripRepository,
};
use crate::utils::errors::AppError;
use crate::utils::validation::validate_time;

pub struct TripController {
    trips: Arc<dyn TripRepository>,
    drivers: Arc<dyn DriverRepository>,
}

impl TripController {
    pub fn new(trips: Arc<dyn TripRepository>, drivers: Arc<dyn DriverRepository>) -> Self {
        Self { trips, drivers }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgTripRepository::new(pool.clone())),
            Arc::new(PgDriverRepository::new(pool)),
        )
    }

    pub async fn create(
        &self,
        created_by: Uuid,
        request: CreateTripRequest,
    ) -> Result<TripResponse, AppError> {
        request.validate()?;
        validate_time(&request.departure_time)?;
        validate_time(&request.arrival_time)?;

        let trip = Trip {
            id: Uuid::new_v4(),
            departure: request.departure.trim().to_string(),
            destination: request.destination.trim().to_string(),
            date: request.date,
            departure_time: request.departure_time,
            arrival_time: request.arrival_time,
            created_by,
            assigned_driver_id: None,
            status: TripStatus::Unassigned,
            created_at: Utc::now(),
        };

        self.trips.create(&trip).await?;
        log::info!("Trip creado: {} → {} ({})", trip.departure, trip.destination, trip.id);

        Ok(TripResponse::from(trip))
    }

    pub async fn list(&self) -> Result<Vec<TripResponse>, AppError> {
        let trips = self.trips.find_all().await?;
        Ok(trips.into_iter().map(TripResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<TripResponse, AppError> {
        let trip = self
            .trips
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip no encontrado".to_string()))?;
        Ok(TripResponse::from(trip))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTripRequest,
    ) -> Result<TripResponse, AppError> {
        request.validate()?;

        let mut trip = self
            .trips
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip no encontrado".to_string()))?;

        if let Some(departure) = request.departure {
            trip.departure = departure.trim().to_string();
        }
        if let Some(destination) = request.destination {
            trip.destination = destination.trim().to_string();
        }
        if let Some(date) = request.date {
            trip.date = date;
        }
        if let Some(departure_time) = request.departure_time {
            validate_time(&departure_time)?;
            trip.departure_time = departure_time;
        }
        if let Some(arrival_time) = request.arrival_time {
            validate_time(&arrival_time)?;
            trip.arrival_time = arrival_time;
        }
        if let Some(status) = request.status {
            // status=assigned exige un driver; el driver solo se toca
            // por los endpoints de asignación
            if status == TripStatus::Assigned && trip.assigned_driver_id.is_none() {
                return Err(AppError::Conflict(
                    "El trip no tiene driver asignado".to_string(),
                ));
            }
            trip.status = status;
        }

        self.trips.update(&trip).await?;
        Ok(TripResponse::from(trip))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let deleted = self.trips.delete(id).await?;
        if !deleted {
            return Err(AppError::NotFound("Trip no encontrado".to_string()));
        }
        Ok(())
    }

    /// Asignar un driver a un trip. Exige que el driver esté disponible
    /// pero NO lo marca como no disponible: la disponibilidad es un
    /// atributo del perfil, no un lock de trips.
    pub async fn assign_driver(
        &self,
        trip_id: Uuid,
        request: AssignTripRequest,
    ) -> Result<TripResponse, AppError> {
        let mut trip = self
            .trips
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip no encontrado".to_string()))?;

        let driver = self
            .drivers
            .find_by_id(request.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;

        if !driver.available {
            return Err(AppError::Conflict(
                "El driver no está disponible".to_string(),
            ));
        }

        trip.assigned_driver_id = Some(driver.id);
        trip.status = TripStatus::Assigned;
        self.trips.update(&trip).await?;

        Ok(TripResponse::from(trip))
    }

    pub async fn unassign_driver(&self, trip_id: Uuid) -> Result<TripResponse, AppError> {
        let mut trip = self
            .trips
            .find_by_id(trip_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Trip no encontrado".to_string()))?;

        if trip.assigned_driver_id.is_none() {
            return Err(AppError::BadRequest(
                "El trip no tiene driver asignado".to_string(),
            ));
        }

        trip.assigned_driver_id = None;
        trip.status = TripStatus::Unassigned;
        self.trips.update(&trip).await?;

        Ok(TripResponse::from(trip))
    }
}

//! Modelo de Trip
//!
//! Un trip es un viaje programado. El creador queda registrado desde el
//! contexto de credenciales; la asignación a un driver es opcional.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// Estado del trip - mapea al ENUM trip_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "trip_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TripStatus {
    Unassigned,
    Assigned,
    #[sqlx(rename = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,
    Completed,
}

/// Trip principal - mapea exactamente a la tabla trips
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trip {
    pub id: Uuid,
    pub departure: String,
    pub destination: String,
    pub date: NaiveDate,
    /// Horas en formato HH:MM, validadas en la creación
    pub departure_time: String,
    pub arrival_time: String,
    pub created_by: Uuid,
    pub assigned_driver_id: Option<Uuid>,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
}

/// Request para crear un nuevo trip
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    #[validate(length(min = 2, max = 100))]
    pub departure: String,

    #[validate(length(min = 2, max = 100))]
    pub destination: String,

    pub date: NaiveDate,

    pub departure_time: String,

    pub arrival_time: String,
}

/// Request para actualizar un trip existente.
/// La asignación de driver no se toca por aquí: tiene endpoints propios.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTripRequest {
    #[validate(length(min = 2, max = 100))]
    pub departure: Option<String>,

    #[validate(length(min = 2, max = 100))]
    pub destination: Option<String>,

    pub date: Option<NaiveDate>,

    pub departure_time: Option<String>,

    pub arrival_time: Option<String>,

    pub status: Option<TripStatus>,
}

/// Request para asignar un driver a un trip
#[derive(Debug, Deserialize)]
pub struct AssignTripRequest {
    pub driver_id: Uuid,
}

/// Response de trip para la API
#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: Uuid,
    pub departure: String,
    pub destination: String,
    pub date: NaiveDate,
    pub departure_time: String,
    pub arrival_time: String,
    pub created_by: Uuid,
    pub assigned_driver_id: Option<Uuid>,
    pub status: TripStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            departure: trip.departure,
            destination: trip.destination,
            date: trip.date,
            departure_time: trip.departure_time,
            arrival_time: trip.arrival_time,
            created_by: trip.created_by,
            assigned_driver_id: trip.assigned_driver_id,
            status: trip.status,
            created_at: trip.created_at,
        }
    }
}

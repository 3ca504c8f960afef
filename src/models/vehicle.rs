//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y sus variantes para CRUD
//! operations. Mapea exactamente a la tabla vehicles del schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// Tipo de vehículo - mapea al ENUM vehicle_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_type")]
pub enum VehicleType {
    Car,
    Bike,
    Truck,
    Van,
}

/// Estado del vehículo - mapea al ENUM vehicle_status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "vehicle_status")]
pub enum VehicleStatus {
    Available,
    #[sqlx(rename = "In-Use")]
    #[serde(rename = "In-Use")]
    InUse,
    Maintenance,
    Inactive,
}

/// Vehicle principal - mapea exactamente a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    /// Matrícula, siempre en mayúsculas
    pub number: String,
    pub vehicle_type: VehicleType,
    pub status: VehicleStatus,
    /// Lado vehicle del invariante bidireccional driver<->vehicle.
    /// Solo el coordinador de asignación escribe este campo.
    pub assigned_driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request para crear un nuevo vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 2, max = 20))]
    pub number: String,

    pub vehicle_type: VehicleType,

    pub status: Option<VehicleStatus>,
}

/// Request para actualizar un vehículo existente.
/// No expone assigned_driver_id (ver coordinador de asignación).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 2, max = 20))]
    pub number: Option<String>,

    pub vehicle_type: Option<VehicleType>,

    pub status: Option<VehicleStatus>,
}

/// Response de vehículo para la API
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub number: String,
    pub vehicle_type: VehicleType,
    pub status: VehicleStatus,
    pub assigned_driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            number: vehicle.number,
            vehicle_type: vehicle.vehicle_type,
            status: vehicle.status,
            assigned_driver_id: vehicle.assigned_driver_id,
            created_at: vehicle.created_at,
        }
    }
}

//! Modelo de Driver (perfil operacional)
//!
//! Un driver es un conductor físico, independiente de si puede hacer
//! login o no. El link opcional a su identidad de login vive en user_id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

/// Tipo de licencia - mapea al ENUM license_type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "license_type")]
pub enum LicenseType {
    Motorcycle,
    #[sqlx(rename = "LTV")]
    #[serde(rename = "LTV")]
    Ltv,
    #[sqlx(rename = "HTV")]
    #[serde(rename = "HTV")]
    Htv,
    #[sqlx(rename = "PSV")]
    #[serde(rename = "PSV")]
    Psv,
}

/// Driver principal - mapea exactamente a la tabla drivers
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub license_number: String,
    pub license_type: LicenseType,
    pub available: bool,
    /// Lado driver del invariante bidireccional driver<->vehicle.
    /// Solo el coordinador de asignación escribe este campo.
    pub assigned_vehicle_id: Option<Uuid>,
    /// Link a la identidad de login; null si el driver no tiene login
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Request para crear un driver, con login opcional.
/// Email y password van juntos o no van: uno sin el otro es error.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(length(min = 3, max = 30))]
    pub license_number: String,

    pub license_type: LicenseType,

    pub available: Option<bool>,

    pub email: Option<String>,

    #[validate(length(min = 6, max = 100))]
    pub password: Option<String>,
}

/// Request para actualizar un driver existente.
/// No expone assigned_vehicle_id: las asignaciones pasan únicamente
/// por el coordinador, nunca por updates genéricos.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,

    #[validate(length(min = 3, max = 30))]
    pub license_number: Option<String>,

    pub license_type: Option<LicenseType>,

    pub available: Option<bool>,
}

/// Request para asignar un vehículo a un driver
#[derive(Debug, Deserialize)]
pub struct AssignVehicleRequest {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
}

/// Response de driver para la API
#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub id: Uuid,
    pub name: String,
    pub license_number: String,
    pub license_type: LicenseType,
    pub available: bool,
    pub assigned_vehicle_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            name: driver.name,
            license_number: driver.license_number,
            license_type: driver.license_type,
            available: driver.available,
            assigned_vehicle_id: driver.assigned_vehicle_id,
            user_id: driver.user_id,
            created_at: driver.created_at,
        }
    }
}

/// Response de creación: el perfil y, si se pidió login, la identidad creada
#[derive(Debug, Serialize)]
pub struct CreateDriverResponse {
    pub driver: DriverResponse,
    pub user: Option<crate::models::user::UserResponse>,
}

/// Resultado del sweep de reconciliación de asignaciones
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub drivers_repaired: u64,
    pub vehicles_repaired: u64,
}

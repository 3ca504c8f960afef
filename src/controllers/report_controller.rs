//! Controller de reportes
//!
//! Conteos agregados sobre la flota: los GROUP BY viven en los
//! repositorios, aquí solo se les da forma de respuesta.

use std::sync::Arc;

use serde_json::{json, Value};
use sqlx::PgPool;

use crate::repositories::{
    DriverRepository, PgDriverRepository, PgUserRepository, PgVehicleRepository, UserRepository,
    VehicleRepository,
};
use crate::utils::errors::AppError;

pub struct ReportController {
    users: Arc<dyn UserRepository>,
    drivers: Arc<dyn DriverRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl ReportController {
    pub fn new(
        users: Arc<dyn UserRepository>,
        drivers: Arc<dyn DriverRepository>,
        vehicles: Arc<dyn VehicleRepository>,
    ) -> Self {
        Self {
            users,
            drivers,
            vehicles,
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgDriverRepository::new(pool.clone())),
            Arc::new(PgVehicleRepository::new(pool)),
        )
    }

    /// Conteo de identidades por rol.
    pub async fn users_report(&self) -> Result<Value, AppError> {
        let by_role = self.users.count_grouped_by_role().await?;
        let total: i64 = by_role.iter().map(|(_, count)| count).sum();

        Ok(json!({
            "total": total,
            "by_role": counts_to_object(by_role),
        }))
    }

    /// Disponibilidad, tipos de licencia y estado de asignación de drivers.
    pub async fn drivers_report(&self) -> Result<Value, AppError> {
        let by_availability = self.drivers.count_grouped_by_availability().await?;
        let by_license_type = self.drivers.count_grouped_by_license_type().await?;
        let (assigned, unassigned) = self.drivers.count_assignment_split().await?;

        let available: i64 = by_availability
            .iter()
            .filter(|(available, _)| *available)
            .map(|(_, count)| count)
            .sum();
        let unavailable: i64 = by_availability
            .iter()
            .filter(|(available, _)| !available)
            .map(|(_, count)| count)
            .sum();

        Ok(json!({
            "total": assigned + unassigned,
            "available": available,
            "unavailable": unavailable,
            "by_license_type": counts_to_object(by_license_type),
            "assigned": assigned,
            "unassigned": unassigned,
        }))
    }

    /// Estados, tipos y estado de asignación de la flota.
    pub async fn vehicles_report(&self) -> Result<Value, AppError> {
        let by_status = self.vehicles.count_grouped_by_status().await?;
        let by_type = self.vehicles.count_grouped_by_type().await?;
        let (assigned, unassigned) = self.vehicles.count_assignment_split().await?;

        Ok(json!({
            "total": assigned + unassigned,
            "by_status": counts_to_object(by_status),
            "by_type": counts_to_object(by_type),
            "assigned": assigned,
            "unassigned": unassigned,
        }))
    }
}

fn counts_to_object(counts: Vec<(String, i64)>) -> Value {
    let map: serde_json::Map<String, Value> = counts
        .into_iter()
        .map(|(key, count)| (key, json!(count)))
        .collect();
    Value::Object(map)
}

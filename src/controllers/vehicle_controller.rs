//! Controller de vehículos
//!
//! CRUD de la flota. El número de vehículo se normaliza a mayúsculas
//! en toda escritura; la asignación de driver nunca se muta por aquí.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::models::vehicle::{
    CreateVehicleRequest, UpdateVehicleRequest, Vehicle, VehicleResponse, VehicleStatus,
};
use crate::repositories::{
    DriverRepository, PgDriverRepository, PgVehicleRepository, VehicleRepository,
};
use crate::services::assignment::AssignmentCoordinator;
use crate::utils::errors::AppError;

pub struct VehicleController {
    vehicles: Arc<dyn VehicleRepository>,
    assignment: AssignmentCoordinator,
}

impl VehicleController {
    pub fn new(vehicles: Arc<dyn VehicleRepository>, assignment: AssignmentCoordinator) -> Self {
        Self {
            vehicles,
            assignment,
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let drivers: Arc<dyn DriverRepository> = Arc::new(PgDriverRepository::new(pool.clone()));
        let vehicles: Arc<dyn VehicleRepository> = Arc::new(PgVehicleRepository::new(pool));
        let assignment = AssignmentCoordinator::new(drivers, vehicles.clone());
        Self::new(vehicles, assignment)
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> Result<VehicleResponse, AppError> {
        request.validate()?;

        let number = request.number.trim().to_uppercase();
        if self.vehicles.number_exists(&number).await? {
            return Err(AppError::Conflict(
                "El número de vehículo ya existe".to_string(),
            ));
        }

        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            number,
            vehicle_type: request.vehicle_type,
            status: request.status.unwrap_or(VehicleStatus::Available),
            assigned_driver_id: None,
            created_at: Utc::now(),
        };

        self.vehicles.create(&vehicle).await?;
        log::info!("Vehículo creado: {} ({})", vehicle.number, vehicle.id);

        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn list(&self) -> Result<Vec<VehicleResponse>, AppError> {
        let vehicles = self.vehicles.find_all().await?;
        Ok(vehicles.into_iter().map(VehicleResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<VehicleResponse, AppError> {
        let vehicle = self
            .vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;
        Ok(VehicleResponse::from(vehicle))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<VehicleResponse, AppError> {
        request.validate()?;

        let mut vehicle = self
            .vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        if let Some(number) = request.number {
            let number = number.trim().to_uppercase();
            if number != vehicle.number && self.vehicles.number_exists(&number).await? {
                return Err(AppError::Conflict(
                    "El número de vehículo ya existe".to_string(),
                ));
            }
            vehicle.number = number;
        }
        if let Some(vehicle_type) = request.vehicle_type {
            vehicle.vehicle_type = vehicle_type;
        }
        if let Some(status) = request.status {
            vehicle.status = status;
        }

        self.vehicles.update_profile(&vehicle).await?;
        Ok(VehicleResponse::from(vehicle))
    }

    /// Baja de un vehículo. Si tiene driver asignado, la asignación se
    /// deshace primero para no dejar al driver apuntando a un id muerto.
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let vehicle = self
            .vehicles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        if let Some(driver_id) = vehicle.assigned_driver_id {
            self.assignment.unassign(driver_id).await?;
        }

        self.vehicles.delete(vehicle.id).await?;
        log::info!("Vehículo {} eliminado", vehicle.id);
        Ok(())
    }
}

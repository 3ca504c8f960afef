//! Controller de drivers
//!
//! CRUD de perfiles de driver más las operaciones de asignación de
//! vehículos. El alta con credenciales y el borrado en cascada pasan
//! por LinkageManager; assign/unassign/reconcile por el coordinador.

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::models::driver::{
    AssignVehicleRequest, CreateDriverRequest, CreateDriverResponse, DriverResponse,
    ReconciliationReport, UpdateDriverRequest,
};
use crate::models::user::UserResponse;
use crate::repositories::{
    DriverRepository, PgDriverRepository, PgUserRepository, PgVehicleRepository,
};
use crate::services::assignment::AssignmentCoordinator;
use crate::services::linkage::LinkageManager;
use crate::utils::errors::AppError;

pub struct DriverController {
    drivers: Arc<dyn DriverRepository>,
    linkage: LinkageManager,
    assignment: AssignmentCoordinator,
}

impl DriverController {
    pub fn new(
        drivers: Arc<dyn DriverRepository>,
        linkage: LinkageManager,
        assignment: AssignmentCoordinator,
    ) -> Self {
        Self {
            drivers,
            linkage,
            assignment,
        }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let users = Arc::new(PgUserRepository::new(pool.clone()));
        let drivers: Arc<dyn DriverRepository> = Arc::new(PgDriverRepository::new(pool.clone()));
        let vehicles = Arc::new(PgVehicleRepository::new(pool));
        let assignment = AssignmentCoordinator::new(drivers.clone(), vehicles);
        let linkage = LinkageManager::new(users, drivers.clone(), assignment.clone());
        Self::new(drivers, linkage, assignment)
    }

    pub async fn create(
        &self,
        request: CreateDriverRequest,
    ) -> Result<CreateDriverResponse, AppError> {
        request.validate()?;

        let (driver, user) = self.linkage.create_driver_with_optional_login(request).await?;
        log::info!("Driver creado: {} ({})", driver.name, driver.id);

        Ok(CreateDriverResponse {
            driver: DriverResponse::from(driver),
            user: user.map(UserResponse::from),
        })
    }

    pub async fn list(&self) -> Result<Vec<DriverResponse>, AppError> {
        let drivers = self.drivers.find_all().await?;
        Ok(drivers.into_iter().map(DriverResponse::from).collect())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<DriverResponse, AppError> {
        let driver = self
            .drivers
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;
        Ok(DriverResponse::from(driver))
    }

    /// Update de los campos de perfil. La asignación de vehículo no se
    /// toca por aquí: solo existe vía assign/unassign.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateDriverRequest,
    ) -> Result<DriverResponse, AppError> {
        request.validate()?;

        let mut driver = self
            .drivers
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;

        if let Some(license_number) = request.license_number {
            if license_number != driver.license_number
                && self.drivers.license_number_exists(&license_number).await?
            {
                return Err(AppError::Conflict(
                    "El número de licencia ya existe".to_string(),
                ));
            }
            driver.license_number = license_number;
        }
        if let Some(name) = request.name {
            driver.name = name.trim().to_string();
        }
        if let Some(license_type) = request.license_type {
            driver.license_type = license_type;
        }
        if let Some(available) = request.available {
            driver.available = available;
        }

        self.drivers.update_profile(&driver).await?;
        Ok(DriverResponse::from(driver))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.linkage.delete_profile(id).await?;
        log::info!("Driver {} eliminado", id);
        Ok(())
    }

    pub async fn assign_vehicle(
        &self,
        request: AssignVehicleRequest,
    ) -> Result<DriverResponse, AppError> {
        self.assignment
            .assign(request.driver_id, request.vehicle_id)
            .await?;

        let driver = self
            .drivers
            .find_by_id(request.driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;
        Ok(DriverResponse::from(driver))
    }

    pub async fn unassign_vehicle(&self, driver_id: Uuid) -> Result<DriverResponse, AppError> {
        self.assignment.unassign(driver_id).await?;

        let driver = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;
        Ok(DriverResponse::from(driver))
    }

    /// Perfil propio de una identidad driver logueada.
    pub async fn my_profile(&self, user_id: Uuid) -> Result<DriverResponse, AppError> {
        let driver = self.linkage.find_profile_for_identity(user_id).await?;
        Ok(DriverResponse::from(driver))
    }

    pub async fn reconcile(&self) -> Result<ReconciliationReport, AppError> {
        self.assignment.reconcile().await
    }
}

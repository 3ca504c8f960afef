//! Coordinador de asignación driver<->vehicle
//!
//! Único punto del sistema que escribe assigned_vehicle_id y
//! assigned_driver_id. El invariante: un driver tiene a lo sumo un
//! vehículo y un vehículo a lo sumo un driver, y ambos lados se apuntan
//! mutuamente.
//!
//! No hay transacción multi-registro. La carrera check-then-act se
//! cierra con los updates condicionales del repositorio (claim_* solo
//! escribe sobre un lado libre): de dos assigns concurrentes sobre el
//! mismo vehículo gana exactamente uno y el otro observa Conflict. Si
//! el write de compensación del perdedor falla, queda un lado colgado
//! que repara el sweep de reconciliación.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::driver::ReconciliationReport;
use crate::repositories::{DriverRepository, VehicleRepository};
use crate::utils::errors::AppError;

#[derive(Clone)]
pub struct AssignmentCoordinator {
    drivers: Arc<dyn DriverRepository>,
    vehicles: Arc<dyn VehicleRepository>,
}

impl AssignmentCoordinator {
    pub fn new(drivers: Arc<dyn DriverRepository>, vehicles: Arc<dyn VehicleRepository>) -> Self {
        Self { drivers, vehicles }
    }

    /// Asignar un vehículo a un driver.
    ///
    /// Precondiciones: ambos existen y ambos lados están libres. Un lado
    /// ya asignado es Conflict, nunca se sobreescribe en silencio.
    pub async fn assign(&self, driver_id: Uuid, vehicle_id: Uuid) -> Result<(), AppError> {
        let driver = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;

        let vehicle = self
            .vehicles
            .find_by_id(vehicle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vehículo no encontrado".to_string()))?;

        if driver.assigned_vehicle_id.is_some() {
            return Err(AppError::Conflict(
                "El driver ya tiene un vehículo asignado".to_string(),
            ));
        }
        if vehicle.assigned_driver_id.is_some() {
            return Err(AppError::Conflict(
                "El vehículo ya está asignado a otro driver".to_string(),
            ));
        }

        // Lado driver primero. El claim es condicional: si otro assign
        // ganó el driver entre el check y aquí, no escribe.
        if !self.drivers.claim_vehicle(driver_id, vehicle_id).await? {
            return Err(AppError::Conflict(
                "El driver ya tiene un vehículo asignado".to_string(),
            ));
        }

        // Lado vehicle. Si otro assign ganó el vehículo, compensamos el
        // lado driver que acabamos de escribir y reportamos Conflict.
        if !self.vehicles.claim_driver(vehicle_id, driver_id).await? {
            if let Err(e) = self.drivers.release_vehicle(driver_id).await {
                log::error!(
                    "Compensación fallida tras perder el vehículo {}: driver {} queda colgado hasta el próximo sweep ({})",
                    vehicle_id,
                    driver_id,
                    e
                );
                return Err(AppError::Internal(
                    "Asignación parcialmente aplicada; se requiere reconciliación".to_string(),
                ));
            }
            return Err(AppError::Conflict(
                "El vehículo ya está asignado a otro driver".to_string(),
            ));
        }

        log::info!("Vehículo {} asignado al driver {}", vehicle_id, driver_id);
        Ok(())
    }

    /// Quitar la asignación de un driver.
    ///
    /// Tolera que el vehículo referenciado ya no exista (pudo borrarse
    /// fuera de banda): en ese caso solo se limpia el lado driver.
    pub async fn unassign(&self, driver_id: Uuid) -> Result<(), AppError> {
        let driver = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;

        let vehicle_id = driver.assigned_vehicle_id.ok_or_else(|| {
            AppError::BadRequest("El driver no tiene vehículo asignado".to_string())
        })?;

        self.drivers.release_vehicle(driver_id).await?;

        // no-op si el vehículo ya no existe o ya estaba libre
        self.vehicles.release_driver(vehicle_id).await?;

        log::info!("Vehículo {} desasignado del driver {}", vehicle_id, driver_id);
        Ok(())
    }

    /// Sweep de reconciliación: repara back-references divergentes en
    /// ambas direcciones limpiando el lado obsoleto. Pensado como
    /// operación de mantenimiento, no como parte del camino caliente.
    pub async fn reconcile(&self) -> Result<ReconciliationReport, AppError> {
        let mut report = ReconciliationReport::default();

        for driver in self.drivers.find_assigned().await? {
            let vehicle_id = match driver.assigned_vehicle_id {
                Some(id) => id,
                None => continue,
            };

            let points_back = match self.vehicles.find_by_id(vehicle_id).await? {
                Some(vehicle) => vehicle.assigned_driver_id == Some(driver.id),
                None => false,
            };

            if !points_back && self.drivers.release_vehicle(driver.id).await? {
                log::warn!(
                    "Reconciliación: limpiado lado driver obsoleto {} -> {}",
                    driver.id,
                    vehicle_id
                );
                report.drivers_repaired += 1;
            }
        }

        for vehicle in self.vehicles.find_assigned().await? {
            let driver_id = match vehicle.assigned_driver_id {
                Some(id) => id,
                None => continue,
            };

            let points_back = match self.drivers.find_by_id(driver_id).await? {
                Some(driver) => driver.assigned_vehicle_id == Some(vehicle.id),
                None => false,
            };

            if !points_back && self.vehicles.release_driver(vehicle.id).await? {
                log::warn!(
                    "Reconciliación: limpiado lado vehicle obsoleto {} -> {}",
                    vehicle.id,
                    driver_id
                );
                report.vehicles_repaired += 1;
            }
        }

        Ok(report)
    }
}

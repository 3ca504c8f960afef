//! Fakes en memoria de los repositorios, solo para tests.
//!
//! Mantienen la misma semántica de update condicional que las
//! implementaciones Postgres: claim_* solo escribe si el lado está
//! libre, y la decisión se toma bajo el lock del mapa. Eso permite
//! testear el coordinador de asignación, incluida la carrera de dos
//! assigns concurrentes sobre el mismo vehículo.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::trip::Trip;
use crate::models::user::{Role, User};
use crate::models::vehicle::Vehicle;
use crate::repositories::{DriverRepository, TripRepository, UserRepository, VehicleRepository};
use crate::utils::errors::AppError;

/// Etiqueta serde de un enum unitario, igual a la etiqueta del tipo
/// ENUM en Postgres (los renames de serde y sqlx coinciden).
fn enum_label<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::String(label)) => label,
        _ => String::new(),
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    pub users: Arc<Mutex<HashMap<Uuid, User>>>,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.to_lowercase();
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_roles(&self, roles: &[Role]) -> Result<Vec<User>, AppError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .filter(|u| roles.contains(&u.role))
            .cloned()
            .collect())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.find_by_email(email).await?.is_some())
    }

    async fn admin_exists(&self) -> Result<bool, AppError> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .any(|u| u.role == Role::Admin))
    }

    async fn create(&self, user: &User) -> Result<(), AppError> {
        self.users.lock().await.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.users.lock().await.remove(&id).is_some())
    }

    async fn count_grouped_by_role(&self) -> Result<Vec<(String, i64)>, AppError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for user in self.users.lock().await.values() {
            *counts.entry(user.role.to_string()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}

#[derive(Default)]
pub struct MemoryDriverRepository {
    pub drivers: Arc<Mutex<HashMap<Uuid, Driver>>>,
}

#[async_trait]
impl DriverRepository for MemoryDriverRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Driver>, AppError> {
        Ok(self.drivers.lock().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Driver>, AppError> {
        Ok(self.drivers.lock().await.values().cloned().collect())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Driver>, AppError> {
        Ok(self
            .drivers
            .lock()
            .await
            .values()
            .find(|d| d.user_id == Some(user_id))
            .cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Driver>, AppError> {
        Ok(self
            .drivers
            .lock()
            .await
            .values()
            .find(|d| d.name == name)
            .cloned())
    }

    async fn license_number_exists(&self, license_number: &str) -> Result<bool, AppError> {
        Ok(self
            .drivers
            .lock()
            .await
            .values()
            .any(|d| d.license_number == license_number))
    }

    async fn create(&self, driver: &Driver) -> Result<(), AppError> {
        self.drivers.lock().await.insert(driver.id, driver.clone());
        Ok(())
    }

    async fn update_profile(&self, driver: &Driver) -> Result<(), AppError> {
        if let Some(existing) = self.drivers.lock().await.get_mut(&driver.id) {
            existing.name = driver.name.clone();
            existing.license_number = driver.license_number.clone();
            existing.license_type = driver.license_type;
            existing.available = driver.available;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.drivers.lock().await.remove(&id).is_some())
    }

    async fn claim_vehicle(&self, driver_id: Uuid, vehicle_id: Uuid) -> Result<bool, AppError> {
        let mut drivers = self.drivers.lock().await;
        match drivers.get_mut(&driver_id) {
            Some(d) if d.assigned_vehicle_id.is_none() => {
                d.assigned_vehicle_id = Some(vehicle_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_vehicle(&self, driver_id: Uuid) -> Result<bool, AppError> {
        let mut drivers = self.drivers.lock().await;
        match drivers.get_mut(&driver_id) {
            Some(d) if d.assigned_vehicle_id.is_some() => {
                d.assigned_vehicle_id = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_assigned(&self) -> Result<Vec<Driver>, AppError> {
        Ok(self
            .drivers
            .lock()
            .await
            .values()
            .filter(|d| d.assigned_vehicle_id.is_some())
            .cloned()
            .collect())
    }

    async fn count_grouped_by_availability(&self) -> Result<Vec<(bool, i64)>, AppError> {
        let mut counts: HashMap<bool, i64> = HashMap::new();
        for driver in self.drivers.lock().await.values() {
            *counts.entry(driver.available).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn count_grouped_by_license_type(&self) -> Result<Vec<(String, i64)>, AppError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for driver in self.drivers.lock().await.values() {
            *counts.entry(enum_label(&driver.license_type)).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn count_assignment_split(&self) -> Result<(i64, i64), AppError> {
        let drivers = self.drivers.lock().await;
        let assigned = drivers
            .values()
            .filter(|d| d.assigned_vehicle_id.is_some())
            .count() as i64;
        Ok((assigned, drivers.len() as i64 - assigned))
    }
}

#[derive(Default)]
pub struct MemoryVehicleRepository {
    pub vehicles: Arc<Mutex<HashMap<Uuid, Vehicle>>>,
}

#[async_trait]
impl VehicleRepository for MemoryVehicleRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        Ok(self.vehicles.lock().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Vehicle>, AppError> {
        Ok(self.vehicles.lock().await.values().cloned().collect())
    }

    async fn number_exists(&self, number: &str) -> Result<bool, AppError> {
        let number = number.to_uppercase();
        Ok(self
            .vehicles
            .lock()
            .await
            .values()
            .any(|v| v.number == number))
    }

    async fn create(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        self.vehicles
            .lock()
            .await
            .insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn update_profile(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        if let Some(existing) = self.vehicles.lock().await.get_mut(&vehicle.id) {
            existing.number = vehicle.number.clone();
            existing.vehicle_type = vehicle.vehicle_type;
            existing.status = vehicle.status;
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.vehicles.lock().await.remove(&id).is_some())
    }

    async fn claim_driver(&self, vehicle_id: Uuid, driver_id: Uuid) -> Result<bool, AppError> {
        let mut vehicles = self.vehicles.lock().await;
        match vehicles.get_mut(&vehicle_id) {
            Some(v) if v.assigned_driver_id.is_none() => {
                v.assigned_driver_id = Some(driver_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn release_driver(&self, vehicle_id: Uuid) -> Result<bool, AppError> {
        let mut vehicles = self.vehicles.lock().await;
        match vehicles.get_mut(&vehicle_id) {
            Some(v) if v.assigned_driver_id.is_some() => {
                v.assigned_driver_id = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_assigned(&self) -> Result<Vec<Vehicle>, AppError> {
        Ok(self
            .vehicles
            .lock()
            .await
            .values()
            .filter(|v| v.assigned_driver_id.is_some())
            .cloned()
            .collect())
    }

    async fn count_grouped_by_status(&self) -> Result<Vec<(String, i64)>, AppError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for vehicle in self.vehicles.lock().await.values() {
            *counts.entry(enum_label(&vehicle.status)).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn count_grouped_by_type(&self) -> Result<Vec<(String, i64)>, AppError> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for vehicle in self.vehicles.lock().await.values() {
            *counts.entry(enum_label(&vehicle.vehicle_type)).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }

    async fn count_assignment_split(&self) -> Result<(i64, i64), AppError> {
        let vehicles = self.vehicles.lock().await;
        let assigned = vehicles
            .values()
            .filter(|v| v.assigned_driver_id.is_some())
            .count() as i64;
        Ok((assigned, vehicles.len() as i64 - assigned))
    }
}

#[derive(Default)]
pub struct MemoryTripRepository {
    pub trips: Arc<Mutex<HashMap<Uuid, Trip>>>,
}

#[async_trait]
impl TripRepository for MemoryTripRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Trip>, AppError> {
        Ok(self.trips.lock().await.get(&id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Trip>, AppError> {
        Ok(self.trips.lock().await.values().cloned().collect())
    }

    async fn create(&self, trip: &Trip) -> Result<(), AppError> {
        self.trips.lock().await.insert(trip.id, trip.clone());
        Ok(())
    }

    async fn update(&self, trip: &Trip) -> Result<(), AppError> {
        self.trips.lock().await.insert(trip.id, trip.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.trips.lock().await.remove(&id).is_some())
    }
}

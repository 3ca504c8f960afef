//! Repositorios de persistencia
//!
//! Cada entidad tiene un trait de repositorio y su implementación sobre
//! PostgreSQL. Los traits son la frontera con el colaborador de
//! persistencia y permiten testear los servicios con fakes en memoria.

pub mod driver_repository;
pub mod trip_repository;
pub mod user_repository;
pub mod vehicle_repository;

#[cfg(test)]
pub mod memory;

pub use driver_repository::{DriverRepository, PgDriverRepository};
pub use trip_repository::{PgTripRepository, TripRepository};
pub use user_repository::{PgUserRepository, UserRepository};
pub use vehicle_repository::{PgVehicleRepository, VehicleRepository};

//! Controllers del sistema
//!
//! Orquestación de negocio por entidad: autorizan primero, validan y
//! después tocan persistencia.

pub mod auth_controller;
pub mod driver_controller;
pub mod report_controller;
pub mod trip_controller;
pub mod vehicle_controller;

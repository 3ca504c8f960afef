//! Rutas HTTP del sistema
//!
//! Cada entidad tiene su router; los handlers son finos y delegan en
//! los controllers. Los gates por rol se evalúan aquí, antes de
//! cualquier lookup.

pub mod auth_routes;
pub mod driver_routes;
pub mod report_routes;
pub mod trip_routes;
pub mod vehicle_routes;

pub use auth_routes::create_auth_router;
pub use driver_routes::create_driver_router;
pub use report_routes::create_report_router;
pub use trip_routes::create_trip_router;
pub use vehicle_routes::create_vehicle_router;

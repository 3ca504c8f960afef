//! Servicios del sistema
//!
//! Aquí vive la lógica que cruza entidades: la política de roles, el
//! coordinador de asignación driver<->vehicle y el manager de linkage
//! entre identidades y perfiles de driver.

pub mod assignment;
pub mod linkage;
pub mod role_policy;

//! Linkage entre identidades de login y perfiles de driver
//!
//! Un driver puede existir sin login. Si se crea con login, las dos
//! escrituras (identidad + perfil) salen de la misma request y el
//! perfil guarda el user_id: el link por id es siempre el mecanismo
//! primario. El match por nombre reconstruido sobrevive únicamente como
//! fallback legacy dentro del cascade delete, para perfiles anteriores
//! al link; es frágil (renombres, nombres duplicados) y no se extiende
//! a ningún otro camino.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::driver::{CreateDriverRequest, Driver};
use crate::models::user::{Role, User};
use crate::repositories::{DriverRepository, UserRepository};
use crate::services::assignment::AssignmentCoordinator;
use crate::utils::errors::AppError;
use crate::utils::validation::{validate_email, validate_not_empty};

pub struct LinkageManager {
    users: Arc<dyn UserRepository>,
    drivers: Arc<dyn DriverRepository>,
    assignment: AssignmentCoordinator,
}

impl LinkageManager {
    pub fn new(
        users: Arc<dyn UserRepository>,
        drivers: Arc<dyn DriverRepository>,
        assignment: AssignmentCoordinator,
    ) -> Self {
        Self {
            users,
            drivers,
            assignment,
        }
    }

    /// Crear un perfil de driver, opcionalmente junto con su identidad
    /// de login. Email y password van juntos o no van.
    pub async fn create_driver_with_optional_login(
        &self,
        request: CreateDriverRequest,
    ) -> Result<(Driver, Option<User>), AppError> {
        validate_not_empty("name", &request.name)?;
        validate_not_empty("license_number", &request.license_number)?;

        if self
            .drivers
            .license_number_exists(&request.license_number)
            .await?
        {
            return Err(AppError::Conflict(
                "El número de licencia ya existe".to_string(),
            ));
        }

        let user = match (&request.email, &request.password) {
            (Some(email), Some(password)) => {
                Some(self.create_login_identity(&request.name, email, password).await?)
            }
            (None, None) => None,
            _ => {
                return Err(AppError::BadRequest(
                    "Email y password deben proporcionarse juntos".to_string(),
                ));
            }
        };

        let driver = Driver {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            license_number: request.license_number,
            license_type: request.license_type,
            available: request.available.unwrap_or(true),
            assigned_vehicle_id: None,
            user_id: user.as_ref().map(|u| u.id),
            created_at: Utc::now(),
        };

        self.drivers.create(&driver).await?;

        Ok((driver, user))
    }

    async fn create_login_identity(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        validate_email(email)?;

        // la unicidad se chequea antes de crear, con error propio,
        // distinguible de cualquier otro fallo de validación
        if self.users.email_exists(email).await? {
            return Err(AppError::Conflict("El email ya existe".to_string()));
        }

        let (first_name, last_name) = split_full_name(full_name);

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Error hasheando password: {}", e)))?;

        let user = User {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            email: email.to_lowercase(),
            password_hash,
            role: Role::Driver,
            created_at: Utc::now(),
        };

        self.users.create(&user).await?;

        Ok(user)
    }

    /// Cascade delete: al borrar una identidad con rol driver se borra
    /// también su perfil. Identidades admin/manager no tocan perfiles.
    ///
    /// Si el perfil tiene vehículo asignado, la baja pasa por el
    /// coordinador para no dejar la back-reference del vehículo colgada.
    pub async fn cascade_delete_on_identity_removal(&self, user: &User) -> Result<(), AppError> {
        if user.role != Role::Driver {
            return Ok(());
        }

        let profile = match self.drivers.find_by_user_id(user.id).await? {
            Some(profile) => Some(profile),
            // fallback legacy: perfiles creados antes del link por id
            None => self.drivers.find_by_name(&user.full_name()).await?,
        };

        let profile = match profile {
            Some(profile) => profile,
            None => return Ok(()),
        };

        if profile.assigned_vehicle_id.is_some() {
            self.assignment.unassign(profile.id).await?;
        }

        self.drivers.delete(profile.id).await?;
        log::info!(
            "Perfil de driver {} eliminado en cascada con la identidad {}",
            profile.id,
            user.id
        );

        Ok(())
    }

    /// Perfil de driver de una identidad logueada. Solo por link id:
    /// aquí no hay reconstrucción por nombre.
    pub async fn find_profile_for_identity(&self, user_id: Uuid) -> Result<Driver, AppError> {
        self.drivers
            .find_by_user_id(user_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No hay perfil de driver para este usuario".to_string())
            })
    }

    /// Baja directa de un perfil (endpoint DELETE de drivers): también
    /// pasa por el coordinador si hay vehículo asignado.
    pub async fn delete_profile(&self, driver_id: Uuid) -> Result<(), AppError> {
        let profile = self
            .drivers
            .find_by_id(driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver no encontrado".to_string()))?;

        if profile.assigned_vehicle_id.is_some() {
            self.assignment.unassign(profile.id).await?;
        }

        self.drivers.delete(profile.id).await?;
        Ok(())
    }
}

/// Partir un nombre completo en (first, last) por el primer espacio.
/// Sin resto, el apellido queda en un placeholder.
fn split_full_name(full_name: &str) -> (String, String) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (trimmed.to_string(), "Driver".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::driver::LicenseType;
    use crate::models::vehicle::{Vehicle, VehicleStatus, VehicleType};
    use crate::repositories::memory::{
        MemoryDriverRepository, MemoryUserRepository, MemoryVehicleRepository,
    };
    use crate::repositories::VehicleRepository;

    struct Fixture {
        users: Arc<MemoryUserRepository>,
        drivers: Arc<MemoryDriverRepository>,
        vehicles: Arc<MemoryVehicleRepository>,
        linkage: LinkageManager,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserRepository::default());
        let drivers = Arc::new(MemoryDriverRepository::default());
        let vehicles = Arc::new(MemoryVehicleRepository::default());
        let assignment = AssignmentCoordinator::new(drivers.clone(), vehicles.clone());
        let linkage = LinkageManager::new(users.clone(), drivers.clone(), assignment);
        Fixture {
            users,
            drivers,
            vehicles,
            linkage,
        }
    }

    fn request(name: &str, email: Option<&str>, password: Option<&str>) -> CreateDriverRequest {
        CreateDriverRequest {
            name: name.to_string(),
            license_number: format!("LIC-{}", Uuid::new_v4()),
            license_type: LicenseType::Htv,
            available: None,
            email: email.map(str::to_string),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn creates_profile_with_linked_identity() {
        let fx = fixture();

        let (driver, user) = fx
            .linkage
            .create_driver_with_optional_login(request(
                "Juan Pérez García",
                Some("d1@x.com"),
                Some("secret1"),
            ))
            .await
            .unwrap();

        let user = user.expect("debió crearse la identidad");
        assert_eq!(user.role, Role::Driver);
        assert_eq!(user.first_name, "Juan");
        assert_eq!(user.last_name, "Pérez García");
        assert_eq!(user.email, "d1@x.com");
        assert_eq!(driver.user_id, Some(user.id));
        assert!(bcrypt::verify("secret1", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn single_token_name_gets_placeholder_last_name() {
        let fx = fixture();

        let (_, user) = fx
            .linkage
            .create_driver_with_optional_login(request("Cher", Some("c@x.com"), Some("secret1")))
            .await
            .unwrap();

        let user = user.unwrap();
        assert_eq!(user.first_name, "Cher");
        assert_eq!(user.last_name, "Driver");
    }

    #[tokio::test]
    async fn creates_profile_without_login_when_no_credentials() {
        let fx = fixture();

        let (driver, user) = fx
            .linkage
            .create_driver_with_optional_login(request("Ana Ruiz", None, None))
            .await
            .unwrap();

        assert!(user.is_none());
        assert_eq!(driver.user_id, None);
        assert!(fx.users.find_by_roles(&Role::ALL).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn email_without_password_is_a_validation_error() {
        let fx = fixture();

        assert!(matches!(
            fx.linkage
                .create_driver_with_optional_login(request("Ana Ruiz", Some("a@x.com"), None))
                .await,
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            fx.linkage
                .create_driver_with_optional_login(request("Ana Ruiz", None, Some("secret1")))
                .await,
            Err(AppError::BadRequest(_))
        ));

        // nada quedó persistido a medias
        assert!(fx.drivers.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_is_conflict_distinct_from_validation() {
        let fx = fixture();

        fx.linkage
            .create_driver_with_optional_login(request(
                "Ana Ruiz",
                Some("d1@x.com"),
                Some("secret1"),
            ))
            .await
            .unwrap();

        let err = fx
            .linkage
            .create_driver_with_optional_login(request(
                "Otra Persona",
                Some("D1@X.COM"),
                Some("secret2"),
            ))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_license_number_is_conflict() {
        let fx = fixture();
        let mut req = request("Ana Ruiz", None, None);
        req.license_number = "LIC-1".to_string();
        fx.linkage
            .create_driver_with_optional_login(req)
            .await
            .unwrap();

        let mut req = request("Luis Soto", None, None);
        req.license_number = "LIC-1".to_string();
        assert!(matches!(
            fx.linkage.create_driver_with_optional_login(req).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn cascade_delete_removes_linked_profile() {
        let fx = fixture();
        let (driver, user) = fx
            .linkage
            .create_driver_with_optional_login(request(
                "Ana Ruiz",
                Some("a@x.com"),
                Some("secret1"),
            ))
            .await
            .unwrap();
        let user = user.unwrap();

        fx.linkage
            .cascade_delete_on_identity_removal(&user)
            .await
            .unwrap();

        assert!(fx.drivers.find_by_id(driver.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cascade_delete_falls_back_to_name_for_legacy_profiles() {
        let fx = fixture();

        // perfil legacy: sin user_id
        let (driver, _) = fx
            .linkage
            .create_driver_with_optional_login(request("Ana Ruiz", None, None))
            .await
            .unwrap();

        let user = User {
            id: Uuid::new_v4(),
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "hash".to_string(),
            role: Role::Driver,
            created_at: Utc::now(),
        };

        fx.linkage
            .cascade_delete_on_identity_removal(&user)
            .await
            .unwrap();

        assert!(fx.drivers.find_by_id(driver.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn cascade_delete_ignores_non_driver_identities() {
        let fx = fixture();
        let (driver, _) = fx
            .linkage
            .create_driver_with_optional_login(request("Ana Ruiz", None, None))
            .await
            .unwrap();

        for role in [Role::Admin, Role::Manager] {
            let user = User {
                id: Uuid::new_v4(),
                first_name: "Ana".to_string(),
                last_name: "Ruiz".to_string(),
                email: format!("{}@x.com", role),
                password_hash: "hash".to_string(),
                role,
                created_at: Utc::now(),
            };
            fx.linkage
                .cascade_delete_on_identity_removal(&user)
                .await
                .unwrap();
        }

        // el perfil homónimo sigue ahí
        assert!(fx.drivers.find_by_id(driver.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cascade_delete_unassigns_vehicle_first() {
        let fx = fixture();
        let (driver, user) = fx
            .linkage
            .create_driver_with_optional_login(request(
                "Ana Ruiz",
                Some("a@x.com"),
                Some("secret1"),
            ))
            .await
            .unwrap();

        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            number: "ABC-123".to_string(),
            vehicle_type: VehicleType::Truck,
            status: VehicleStatus::Available,
            assigned_driver_id: None,
            created_at: Utc::now(),
        };
        fx.vehicles.create(&vehicle).await.unwrap();

        let assignment = AssignmentCoordinator::new(fx.drivers.clone(), fx.vehicles.clone());
        assignment.assign(driver.id, vehicle.id).await.unwrap();

        fx.linkage
            .cascade_delete_on_identity_removal(&user.unwrap())
            .await
            .unwrap();

        let vehicle = fx.vehicles.find_by_id(vehicle.id).await.unwrap().unwrap();
        assert_eq!(vehicle.assigned_driver_id, None, "no debe quedar puntero colgado");
    }

    #[tokio::test]
    async fn delete_profile_clears_vehicle_back_reference() {
        let fx = fixture();
        let (driver, _) = fx
            .linkage
            .create_driver_with_optional_login(request("Ana Ruiz", None, None))
            .await
            .unwrap();

        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            number: "ABC-123".to_string(),
            vehicle_type: VehicleType::Car,
            status: VehicleStatus::Available,
            assigned_driver_id: None,
            created_at: Utc::now(),
        };
        fx.vehicles.create(&vehicle).await.unwrap();

        let assignment = AssignmentCoordinator::new(fx.drivers.clone(), fx.vehicles.clone());
        assignment.assign(driver.id, vehicle.id).await.unwrap();

        fx.linkage.delete_profile(driver.id).await.unwrap();

        assert!(fx.drivers.find_by_id(driver.id).await.unwrap().is_none());
        let vehicle = fx.vehicles.find_by_id(vehicle.id).await.unwrap().unwrap();
        assert_eq!(vehicle.assigned_driver_id, None);
    }

    #[tokio::test]
    async fn my_profile_lookup_uses_link_id_only() {
        let fx = fixture();
        let (driver, user) = fx
            .linkage
            .create_driver_with_optional_login(request(
                "Ana Ruiz",
                Some("a@x.com"),
                Some("secret1"),
            ))
            .await
            .unwrap();
        let user = user.unwrap();

        let found = fx.linkage.find_profile_for_identity(user.id).await.unwrap();
        assert_eq!(found.id, driver.id);

        // identidad homónima sin link: no hay reconstrucción por nombre
        let other = Uuid::new_v4();
        assert!(matches!(
            fx.linkage.find_profile_for_identity(other).await,
            Err(AppError::NotFound(_))
        ));
    }
}

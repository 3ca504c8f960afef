//! Controller de autenticación y gestión de identidades
//!
//! Registro, login y administración de cuentas. Las reglas de quién
//! puede ver/crear/borrar a quién viven en RolePolicy; aquí solo se
//! orquestan contra el estado persistido.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::middleware::AuthenticatedUser;
use crate::models::user::{AuthResponse, LoginRequest, RegisterRequest, Role, User, UserResponse};
use crate::repositories::{
    PgDriverRepository, PgUserRepository, PgVehicleRepository, UserRepository,
};
use crate::services::assignment::AssignmentCoordinator;
use crate::services::linkage::LinkageManager;
use crate::services::role_policy::RolePolicy;
use crate::utils::errors::AppError;
use crate::utils::jwt::{generate_token, JwtConfig};
use crate::utils::validation::validate_email;

pub struct AuthController {
    users: Arc<dyn UserRepository>,
    linkage: LinkageManager,
}

impl AuthController {
    pub fn new(users: Arc<dyn UserRepository>, linkage: LinkageManager) -> Self {
        Self { users, linkage }
    }

    pub fn from_pool(pool: PgPool) -> Self {
        let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
        let drivers = Arc::new(PgDriverRepository::new(pool.clone()));
        let vehicles = Arc::new(PgVehicleRepository::new(pool));
        let assignment = AssignmentCoordinator::new(drivers.clone(), vehicles);
        let linkage = LinkageManager::new(users.clone(), drivers, assignment);
        Self::new(users, linkage)
    }

    /// Registro de una nueva identidad. El caller puede ser anónimo
    /// (self-signup) o una identidad autenticada creando cuentas.
    pub async fn register(
        &self,
        caller: Option<Role>,
        policy: &RolePolicy,
        jwt: &JwtConfig,
        request: RegisterRequest,
    ) -> Result<AuthResponse, AppError> {
        request.validate()?;
        validate_email(&request.email)?;

        let requested = request.role.unwrap_or(Role::Driver);
        let admin_exists = self.users.admin_exists().await?;
        policy.can_register(caller, requested, admin_exists)?;

        if self.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict("El email ya existe".to_string()));
        }

        let password_hash = bcrypt::hash(&request.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Error hasheando password: {}", e)))?;

        let user = User {
            id: Uuid::new_v4(),
            first_name: request.first_name.trim().to_string(),
            last_name: request.last_name.trim().to_string(),
            email: request.email.to_lowercase(),
            password_hash,
            role: requested,
            created_at: Utc::now(),
        };

        self.users.create(&user).await?;
        log::info!("Usuario registrado: {} ({})", user.email, user.role);

        let token = generate_token(&user, jwt)?;
        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }

    /// Login con email y password. El mismo 401 para email desconocido
    /// y password incorrecta, sin distinguir cuál falló.
    pub async fn login(
        &self,
        jwt: &JwtConfig,
        request: LoginRequest,
    ) -> Result<AuthResponse, AppError> {
        request.validate()?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Credenciales inválidas".to_string()))?;

        let valid = bcrypt::verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Error verificando password: {}", e)))?;
        if !valid {
            return Err(AppError::Unauthorized("Credenciales inválidas".to_string()));
        }

        let token = generate_token(&user, jwt)?;
        Ok(AuthResponse {
            user: UserResponse::from(user),
            token,
        })
    }

    /// Listado de identidades filtrado por lo que el rol del caller
    /// tiene derecho a ver.
    pub async fn list_users(
        &self,
        caller: &AuthenticatedUser,
        policy: &RolePolicy,
    ) -> Result<Vec<UserResponse>, AppError> {
        let visible = policy.visible_roles(caller.role).ok_or_else(|| {
            AppError::Forbidden("No tienes permiso para listar usuarios".to_string())
        })?;

        let users = self.users.find_by_roles(visible).await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Borrado de una identidad con cascade sobre su perfil de driver.
    ///
    /// El gate por rol del caller va primero; la autorización contra el
    /// rol del target se evalúa antes de devolver cualquier 404.
    pub async fn delete_user(
        &self,
        caller: &AuthenticatedUser,
        policy: &RolePolicy,
        id: Uuid,
    ) -> Result<(), AppError> {
        // un rol sin derechos de borrado recibe 403 sin lookup
        if policy.managed_roles(caller.role).is_empty() {
            return Err(AppError::Forbidden(
                "No tienes permiso para eliminar usuarios".to_string(),
            ));
        }

        let target = self
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

        if !policy.can_delete_identity(caller.role, target.role) {
            return Err(AppError::Forbidden(
                "No tienes permiso para eliminar este usuario".to_string(),
            ));
        }

        self.linkage.cascade_delete_on_identity_removal(&target).await?;
        self.users.delete(target.id).await?;
        log::info!("Usuario {} eliminado por {}", target.id, caller.user_id);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::memory::{
        MemoryDriverRepository, MemoryUserRepository, MemoryVehicleRepository,
    };
    use crate::repositories::DriverRepository;

    struct Fixture {
        users: Arc<MemoryUserRepository>,
        drivers: Arc<MemoryDriverRepository>,
        controller: AuthController,
        policy: RolePolicy,
        jwt: JwtConfig,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MemoryUserRepository::default());
        let drivers = Arc::new(MemoryDriverRepository::default());
        let vehicles = Arc::new(MemoryVehicleRepository::default());
        let assignment = AssignmentCoordinator::new(drivers.clone(), vehicles);
        let linkage = LinkageManager::new(users.clone(), drivers.clone(), assignment);
        Fixture {
            users: users.clone(),
            drivers,
            controller: AuthController::new(users, linkage),
            policy: RolePolicy::new(false),
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                expiration: 3600,
            },
        }
    }

    fn register_request(email: &str, role: Option<Role>) -> RegisterRequest {
        RegisterRequest {
            first_name: "Ana".to_string(),
            last_name: "Ruiz".to_string(),
            email: email.to_string(),
            password: "secret1".to_string(),
            role,
        }
    }

    async fn auth_for(fx: &Fixture, role: Role) -> AuthenticatedUser {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Caller".to_string(),
            last_name: "Test".to_string(),
            email: format!("{}-{}@x.com", role, Uuid::new_v4()),
            password_hash: "hash".to_string(),
            role,
            created_at: Utc::now(),
        };
        fx.users.create(&user).await.unwrap();
        AuthenticatedUser {
            user_id: user.id,
            role,
        }
    }

    #[tokio::test]
    async fn register_and_login_round_trip() {
        let fx = fixture();

        let registered = fx
            .controller
            .register(None, &fx.policy, &fx.jwt, register_request("A@X.com", None))
            .await
            .unwrap();
        assert_eq!(registered.user.role, Role::Driver);
        assert_eq!(registered.user.email, "a@x.com");

        let logged_in = fx
            .controller
            .login(
                &fx.jwt,
                LoginRequest {
                    email: "a@x.com".to_string(),
                    password: "secret1".to_string(),
                },
            )
            .await
            .unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let fx = fixture();
        fx.controller
            .register(None, &fx.policy, &fx.jwt, register_request("a@x.com", None))
            .await
            .unwrap();

        let err = fx
            .controller
            .login(
                &fx.jwt,
                LoginRequest {
                    email: "a@x.com".to_string(),
                    password: "wrong-pass".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn duplicate_email_registration_is_conflict() {
        let fx = fixture();
        fx.controller
            .register(None, &fx.policy, &fx.jwt, register_request("a@x.com", None))
            .await
            .unwrap();

        let err = fx
            .controller
            .register(None, &fx.policy, &fx.jwt, register_request("A@x.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn second_admin_is_rejected_in_single_admin_mode() {
        let fx = fixture();
        let admin = auth_for(&fx, Role::Admin).await;

        let err = fx
            .controller
            .register(
                Some(admin.role),
                &fx.policy,
                &fx.jwt,
                register_request("a2@x.com", Some(Role::Admin)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // con el flag multi-admin el mismo registro pasa
        let multi = RolePolicy::new(true);
        fx.controller
            .register(
                Some(admin.role),
                &multi,
                &fx.jwt,
                register_request("a2@x.com", Some(Role::Admin)),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn manager_cannot_register_an_admin() {
        let fx = fixture();
        let err = fx
            .controller
            .register(
                Some(Role::Manager),
                &fx.policy,
                &fx.jwt,
                register_request("a@x.com", Some(Role::Admin)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn listing_is_scoped_by_caller_role() {
        let fx = fixture();
        let admin = auth_for(&fx, Role::Admin).await;
        let manager = auth_for(&fx, Role::Manager).await;
        let driver = auth_for(&fx, Role::Driver).await;

        let seen_by_admin = fx.controller.list_users(&admin, &fx.policy).await.unwrap();
        assert_eq!(seen_by_admin.len(), 3);

        let seen_by_manager = fx
            .controller
            .list_users(&manager, &fx.policy)
            .await
            .unwrap();
        assert!(seen_by_manager.iter().all(|u| u.role == Role::Driver));
        assert_eq!(seen_by_manager.len(), 1);

        assert!(matches!(
            fx.controller.list_users(&driver, &fx.policy).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn manager_deleting_admin_is_forbidden_not_not_found() {
        let fx = fixture();
        let admin = auth_for(&fx, Role::Admin).await;
        let manager = auth_for(&fx, Role::Manager).await;

        let err = fx
            .controller
            .delete_user(&manager, &fx.policy, admin.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        // el admin sigue intacto
        assert!(fx.users.find_by_id(admin.user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn driver_gets_forbidden_even_for_missing_targets() {
        let fx = fixture();
        let driver = auth_for(&fx, Role::Driver).await;

        let err = fx
            .controller
            .delete_user(&driver, &fx.policy, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn deleting_a_driver_identity_cascades_to_its_profile() {
        let fx = fixture();
        let admin = auth_for(&fx, Role::Admin).await;

        let registered = fx
            .controller
            .register(None, &fx.policy, &fx.jwt, register_request("d@x.com", None))
            .await
            .unwrap();

        let profile = crate::models::driver::Driver {
            id: Uuid::new_v4(),
            name: "Ana Ruiz".to_string(),
            license_number: "LIC-1".to_string(),
            license_type: crate::models::driver::LicenseType::Ltv,
            available: true,
            assigned_vehicle_id: None,
            user_id: Some(registered.user.id),
            created_at: Utc::now(),
        };
        fx.drivers.create(&profile).await.unwrap();

        fx.controller
            .delete_user(&admin, &fx.policy, registered.user.id)
            .await
            .unwrap();

        assert!(fx.users.find_by_id(registered.user.id).await.unwrap().is_none());
        assert!(fx.drivers.find_by_id(profile.id).await.unwrap().is_none());
    }
}

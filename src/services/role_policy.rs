//! Política de roles
//!
//! Jerarquía fija de tres niveles: admin > manager > driver. Es una
//! tabla estática evaluada por llamada, sin estado mutable; la única
//! configuración es si se permiten múltiples admins.
//!
//! Toda denegación se expresa como Forbidden, nunca como NotFound:
//! los callers distinguen siempre "no puedes" de "no existe".

use crate::models::user::Role;
use crate::utils::errors::AppError;

/// Política de acceso basada en la jerarquía de roles
#[derive(Debug, Clone, Copy)]
pub struct RolePolicy {
    allow_multiple_admins: bool,
}

impl RolePolicy {
    pub fn new(allow_multiple_admins: bool) -> Self {
        Self {
            allow_multiple_admins,
        }
    }

    /// Roles que un rol puede administrar (hacia abajo en la jerarquía).
    /// Un driver no administra a nadie, incluido él mismo.
    pub fn managed_roles(&self, role: Role) -> &'static [Role] {
        match role {
            Role::Admin => &[Role::Admin, Role::Manager, Role::Driver],
            Role::Manager => &[Role::Driver],
            Role::Driver => &[],
        }
    }

    /// Un caller accede a una operación declarada para `required` si su
    /// propio rol está en el set, o si alguno de los roles que administra
    /// lo está (un manager entra a un endpoint declarado para drivers).
    pub fn can_access(&self, caller: Role, required: &[Role]) -> bool {
        required.contains(&caller)
            || self
                .managed_roles(caller)
                .iter()
                .any(|managed| required.contains(managed))
    }

    /// ¿Puede el caller administrar a un usuario con el rol target?
    pub fn can_manage(&self, caller: Role, target: Role) -> bool {
        self.managed_roles(caller).contains(&target)
    }

    /// Roles visibles en el listado de usuarios: admin ve todo,
    /// manager solo drivers, driver no lista a nadie.
    pub fn visible_roles(&self, caller: Role) -> Option<&'static [Role]> {
        match caller {
            Role::Admin => Some(&Role::ALL),
            Role::Manager => Some(&[Role::Driver]),
            Role::Driver => None,
        }
    }

    /// Borrado de identidades: admin borra a cualquiera, manager solo
    /// a drivers, el resto queda prohibido.
    pub fn can_delete_identity(&self, caller: Role, target: Role) -> bool {
        self.can_manage(caller, target)
    }

    /// Política de registro de nuevas identidades.
    ///
    /// - Crear un admin exige que el caller ya sea admin y, si el
    ///   sistema es de admin único, que todavía no exista ninguno.
    /// - Un driver no puede crear identidades por esta vía.
    /// - Registro anónimo (self-signup) de managers/drivers permitido.
    pub fn can_register(
        &self,
        caller: Option<Role>,
        requested: Role,
        admin_exists: bool,
    ) -> Result<(), AppError> {
        if caller == Some(Role::Driver) {
            return Err(AppError::Forbidden(
                "Los drivers no pueden registrar usuarios".to_string(),
            ));
        }

        if requested == Role::Admin {
            if caller != Some(Role::Admin) {
                return Err(AppError::Forbidden(
                    "Solo un admin puede crear otro admin".to_string(),
                ));
            }
            if !self.allow_multiple_admins && admin_exists {
                return Err(AppError::Conflict(
                    "Ya existe un admin en el sistema".to_string(),
                ));
            }
        }

        Ok(())
    }
}

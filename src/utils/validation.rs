//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos que
//! no pasan por los derives de validator (campos opcionales que se
//! validan condicionalmente, horas de trips, etc).

use chrono::NaiveTime;
use lazy_static::lazy_static;
use regex::Regex;

use crate::utils::errors::AppError;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}))$"#)
            .unwrap();
}

/// Validar formato de email
pub fn validate_email(value: &str) -> Result<(), AppError> {
    if EMAIL_RE.is_match(value) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "'{}' no es un email válido",
            value
        )))
    }
}

/// Validar una hora en formato HH:MM
pub fn validate_time(value: &str) -> Result<(), AppError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| {
            AppError::BadRequest(format!("'{}' no es una hora válida (formato HH:MM)", value))
        })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("'{}' es requerido", field)));
    }
    Ok(())
}

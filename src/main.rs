mod config;
mod controllers;
mod database;
mod middleware;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod utils;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use config::EnvironmentConfig;
use middleware::cors_middleware;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::default();

    // Configurar logging
    let log_level = if config.is_development() {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("🚚 Fleet Operations - Backend de gestión de flota");
    info!("=================================================");

    // Inicializar base de datos
    let pool = match database::create_pool(None).await {
        Ok(pool) => {
            info!("✅ PostgreSQL conectado exitosamente");
            pool
        }
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let addr: SocketAddr = config.server_addr().parse()?;
    let app_state = AppState::new(pool, config);

    let app = Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api/auth", routes::create_auth_router(app_state.clone()))
        .nest("/api/drivers", routes::create_driver_router(app_state.clone()))
        .nest("/api/vehicles", routes::create_vehicle_router(app_state.clone()))
        .nest("/api/trips", routes::create_trip_router(app_state.clone()))
        .nest("/api/reports", routes::create_report_router(app_state))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(cors_middleware());

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🔐 Auth:");
    info!("   POST /api/auth/register - Registrar identidad");
    info!("   POST /api/auth/login - Login");
    info!("   GET  /api/auth/users - Listar usuarios (según rol)");
    info!("   DELETE /api/auth/users/:id - Eliminar usuario");
    info!("🧑‍✈️ Drivers:");
    info!("   POST /api/drivers - Crear driver (login opcional)");
    info!("   GET  /api/drivers - Listar drivers");
    info!("   GET  /api/drivers/me - Perfil propio");
    info!("   POST /api/drivers/assign - Asignar vehículo");
    info!("   PUT  /api/drivers/unassign/:id - Desasignar vehículo");
    info!("   POST /api/drivers/reconcile - Reparar asignaciones");
    info!("🚗 Vehicles:");
    info!("   POST /api/vehicles - Crear vehículo");
    info!("   GET  /api/vehicles - Listar vehículos");
    info!("🗺  Trips:");
    info!("   POST /api/trips - Crear trip");
    info!("   PUT  /api/trips/:id/assign - Asignar driver");
    info!("📊 Reports:");
    info!("   GET  /api/reports/users | /drivers | /vehicles");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Endpoint de health check
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}

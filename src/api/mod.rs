//! REST surface over the detector and the inspection store.
//!
//! Thin CRUD glue: handlers validate, delegate, and shape JSON. All domain
//! logic lives in `detection` and `core::db`.

pub mod error;
pub mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::core::db::InspectionDb;
use crate::detection::Detector;
use crate::validators::MAX_FILE_SIZE;

/// Shared per-request context. Cloned freely; the pool and detector config
/// are the only state behind it.
#[derive(Clone)]
pub struct AppState {
    pub db: InspectionDb,
    pub detector: Detector,
    pub upload_dir: PathBuf,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/upload", post(handlers::upload_inspection))
        .route("/api/inspections", get(handlers::get_inspections))
        .route(
            "/api/inspections/:id",
            get(handlers::get_inspection).delete(handlers::delete_inspection),
        )
        .route("/api/stats", get(handlers::get_statistics))
        .route("/api/export/csv", get(handlers::export_csv))
        .route("/uploads/:filename", get(handlers::serve_upload))
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 64 * 1024))
        .with_state(state)
}

pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

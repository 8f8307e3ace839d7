use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::interlink::{SatelliteInfo, TleCatalog};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub satellites: Vec<SatelliteInfo>,
    pub satellite_count: usize,
}

fn catalog(state: &AppState) -> ApiResult<&Arc<RwLock<TleCatalog>>> {
    state
        .catalog
        .as_ref()
        .ok_or_else(|| {
            ApiError::CatalogUnavailable("satellite catalog not configured".into())
        })
}

fn listing(catalog: &TleCatalog) -> CatalogResponse {
    CatalogResponse {
        satellite_count: catalog.len(),
        satellites: catalog
            .satellites()
            .into_iter()
            .map(|e| e.info.clone())
            .collect(),
    }
}

#[utoipa::path(
    get,
    path = "/api/satellites",
    tag = "catalog",
    responses(
        (status = 200, description = "Loaded satellites", body = CatalogResponse),
        (status = 503, description = "Catalog not configured", body = ErrorResponse)
    )
)]
pub async fn list_satellites(State(state): State<AppState>) -> ApiResult<Json<CatalogResponse>> {
    let catalog = catalog(&state)?.read().await;
    Ok(Json(listing(&catalog)))
}

#[utoipa::path(
    post,
    path = "/api/satellites/reload",
    tag = "catalog",
    responses(
        (status = 200, description = "Catalog reloaded", body = CatalogResponse),
        (status = 503, description = "Catalog unavailable", body = ErrorResponse)
    )
)]
pub async fn reload_satellites(
    State(state): State<AppState>,
) -> ApiResult<Json<CatalogResponse>> {
    let mut catalog = catalog(&state)?.write().await;
    catalog.load_all()?;

    Ok(Json(listing(&catalog)))
}

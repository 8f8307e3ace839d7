use axum::{extract::State, response::IntoResponse};

use crate::web::state::AppState;

use super::templates::IndexTemplate;

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let satellites = match &state.catalog {
        Some(catalog) => catalog
            .read()
            .await
            .satellites()
            .into_iter()
            .map(|e| e.info.clone())
            .collect(),
        None => Vec::new(),
    };

    IndexTemplate {
        default_step_seconds: state.config.scan.step.num_seconds(),
        default_max_range_km: state.config.scan.max_range_km,
        satellites,
    }
}

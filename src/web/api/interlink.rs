use axum::{extract::State, Json};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::interlink::{
    distance, is_occluded, parse_utc_instant, scan_best_effort, InterlinkError,
    OrbitStateProvider, OrbitalElements, Position, PropagationContext, ScanConfig, Sgp4Provider,
    WindowRecord,
};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::state::AppState;

/// Two satellites, each given inline as TLE lines or by catalog NORAD id,
/// and the time range to scan.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InterlinkRequest {
    #[serde(default)]
    pub sat1_name: Option<String>,
    #[serde(default)]
    pub sat1_tle1: Option<String>,
    #[serde(default)]
    pub sat1_tle2: Option<String>,
    #[serde(default)]
    pub sat1_norad_id: Option<u64>,
    #[serde(default)]
    pub sat2_name: Option<String>,
    #[serde(default)]
    pub sat2_tle1: Option<String>,
    #[serde(default)]
    pub sat2_tle2: Option<String>,
    #[serde(default)]
    pub sat2_norad_id: Option<u64>,
    /// ISO-8601; assumed UTC when no offset is given
    pub start_date: String,
    /// ISO-8601; assumed UTC when no offset is given
    pub end_date: String,
    #[serde(default)]
    pub step_seconds: Option<i64>,
    #[serde(default)]
    pub max_range_km: Option<f64>,
}

struct SatelliteSource<'a> {
    fallback_name: &'static str,
    name: Option<&'a str>,
    tle1: Option<&'a str>,
    tle2: Option<&'a str>,
    norad_id: Option<u64>,
}

impl InterlinkRequest {
    fn sat1(&self) -> SatelliteSource<'_> {
        SatelliteSource {
            fallback_name: "Satellite 1",
            name: self.sat1_name.as_deref(),
            tle1: self.sat1_tle1.as_deref(),
            tle2: self.sat1_tle2.as_deref(),
            norad_id: self.sat1_norad_id,
        }
    }

    fn sat2(&self) -> SatelliteSource<'_> {
        SatelliteSource {
            fallback_name: "Satellite 2",
            name: self.sat2_name.as_deref(),
            tle1: self.sat2_tle1.as_deref(),
            tle2: self.sat2_tle2.as_deref(),
            norad_id: self.sat2_norad_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InterlinkWindow {
    pub timestamp: DateTime<Utc>,
    pub sat1_pos: Position,
    pub sat2_pos: Position,
    /// Straight-line separation in km
    pub distance: f64,
    pub can_communicate: bool,
}

impl From<WindowRecord> for InterlinkWindow {
    fn from(record: WindowRecord) -> Self {
        InterlinkWindow {
            timestamp: record.timestamp,
            sat1_pos: record.position_a,
            sat2_pos: record.position_b,
            distance: record.distance_km,
            can_communicate: record.viable,
        }
    }
}

/// Where both satellites are at `start_date`, whether or not they can link.
#[derive(Debug, Serialize, ToSchema)]
pub struct InitialPositions {
    pub sat1: Position,
    pub sat2: Position,
    pub distance_km: f64,
    pub occluded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InterlinkResponse {
    pub success: bool,
    pub sat1_name: String,
    pub sat2_name: String,
    pub interlink_windows: Vec<InterlinkWindow>,
    pub initial_positions: InitialPositions,
    pub total_windows: usize,
    pub samples_evaluated: u64,
}

#[utoipa::path(
    post,
    path = "/api/calculate-interlink",
    tag = "interlink",
    request_body = InterlinkRequest,
    responses(
        (status = 200, description = "Interlink windows", body = InterlinkResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown catalog satellite", body = ErrorResponse),
        (status = 422, description = "Propagation failed during the scan", body = ErrorResponse),
        (status = 503, description = "Catalog not configured", body = ErrorResponse)
    )
)]
pub async fn calculate_interlink(
    State(state): State<AppState>,
    Json(request): Json<InterlinkRequest>,
) -> ApiResult<Json<InterlinkResponse>> {
    let defaults = &state.config.scan;

    let start = parse_utc_instant(&request.start_date)?;
    let end = parse_utc_instant(&request.end_date)?;
    let step = match request.step_seconds {
        Some(seconds) => Duration::try_seconds(seconds).ok_or_else(|| {
            ApiError::Validation(format!("step of {} seconds is out of range", seconds))
        })?,
        None => defaults.step,
    };
    let config = ScanConfig::new(
        start,
        end,
        step,
        request.max_range_km.unwrap_or(defaults.max_range_km),
    )?
    .with_earth_radius_km(defaults.earth_radius_km)?;

    let samples = config.sample_count();
    if samples > defaults.max_samples {
        return Err(ApiError::Validation(format!(
            "scan needs {} samples, limit is {}; widen the step or narrow the range",
            samples, defaults.max_samples
        )));
    }

    let (elements_a, sat1_name) = resolve_satellite(&state, request.sat1()).await?;
    let (elements_b, sat2_name) = resolve_satellite(&state, request.sat2()).await?;
    let context = state.config.propagation.context();

    let scan_task = move || run_scan(&elements_a, &elements_b, &config, context);
    let report = tokio::task::spawn_blocking(scan_task)
        .await
        .map_err(|e| ApiError::Internal(format!("scan task failed: {}", e)))??;

    log::debug!(
        "{} / {}: {} windows in {} samples",
        sat1_name,
        sat2_name,
        report.records.len(),
        report.samples_evaluated
    );

    Ok(Json(InterlinkResponse {
        success: true,
        sat1_name,
        sat2_name,
        total_windows: report.records.len(),
        interlink_windows: report.records.into_iter().map(Into::into).collect(),
        initial_positions: report.initial,
        samples_evaluated: report.samples_evaluated,
    }))
}

struct ScanReport {
    records: Vec<WindowRecord>,
    samples_evaluated: u64,
    initial: InitialPositions,
}

fn run_scan(
    elements_a: &OrbitalElements,
    elements_b: &OrbitalElements,
    config: &ScanConfig,
    context: PropagationContext,
) -> Result<ScanReport, InterlinkError> {
    let provider_a = Sgp4Provider::new(elements_a, context)?;
    let provider_b = Sgp4Provider::new(elements_b, context)?;

    let sat1 = provider_a.position_at(config.start())?;
    let sat2 = provider_b.position_at(config.start())?;
    let initial = InitialPositions {
        sat1,
        sat2,
        distance_km: distance(sat1.vector(), sat2.vector()),
        occluded: is_occluded(sat1.vector(), sat2.vector(), config.earth_radius_km()),
    };

    let outcome = scan_best_effort(&provider_a, &provider_b, config);
    let samples_evaluated = outcome.samples_evaluated;

    Ok(ScanReport {
        records: outcome.into_result()?,
        samples_evaluated,
        initial,
    })
}

async fn resolve_satellite(
    state: &AppState,
    source: SatelliteSource<'_>,
) -> ApiResult<(OrbitalElements, String)> {
    match (source.tle1, source.tle2, source.norad_id) {
        (Some(line1), Some(line2), _) => {
            let name = source.name.unwrap_or(source.fallback_name).to_string();
            let elements = OrbitalElements::from_tle(Some(name), line1, line2)?;
            let name = elements.name().to_string();
            Ok((elements, name))
        }
        (_, _, Some(norad_id)) => {
            let catalog = state.catalog.as_ref().ok_or_else(|| {
                ApiError::CatalogUnavailable("satellite catalog not configured".into())
            })?;
            let catalog = catalog.read().await;
            let entry = catalog.get(norad_id).ok_or(ApiError::NotFound(norad_id))?;
            let name = source.name.unwrap_or(&entry.info.name).to_string();
            Ok((entry.elements.clone(), name))
        }
        _ => Err(ApiError::Validation(format!(
            "{}: provide both TLE lines or a catalog NORAD id",
            source.fallback_name
        ))),
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateTleRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub tle_line1: String,
    pub tle_line2: String,
    /// Instant to test-propagate to; defaults to the element set epoch
    #[serde(default)]
    pub at: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateTleResponse {
    pub success: bool,
    pub message: String,
    pub name: String,
    pub norad_id: u64,
    pub epoch: DateTime<Utc>,
    pub position: Position,
}

#[utoipa::path(
    post,
    path = "/api/validate-tle",
    tag = "interlink",
    request_body = ValidateTleRequest,
    responses(
        (status = 200, description = "TLE is valid", body = ValidateTleResponse),
        (status = 400, description = "TLE or `at` is malformed", body = ErrorResponse),
        (status = 422, description = "TLE cannot be propagated", body = ErrorResponse)
    )
)]
pub async fn validate_tle(
    State(state): State<AppState>,
    Json(request): Json<ValidateTleRequest>,
) -> ApiResult<Json<ValidateTleResponse>> {
    let elements =
        OrbitalElements::from_tle(request.name.clone(), &request.tle_line1, &request.tle_line2)?;
    let at = match request.at.as_deref() {
        Some(s) => requested_instant(s)?,
        None => elements.epoch(),
    };

    let provider = Sgp4Provider::new(&elements, state.config.propagation.context())?;
    let position = provider.position_at(at)?;

    Ok(Json(ValidateTleResponse {
        success: true,
        message: "TLE is valid".to_string(),
        name: elements.name().to_string(),
        norad_id: elements.norad_id(),
        epoch: elements.epoch(),
        position,
    }))
}

fn requested_instant(s: &str) -> ApiResult<DateTime<Utc>> {
    let invalid = || ApiError::Validation(format!("invalid timestamp '{}'", s));
    parse_utc_instant(s).map_err(|_| invalid())
}

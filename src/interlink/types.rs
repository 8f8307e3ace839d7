use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::interlink::error::InterlinkError;
use crate::interlink::geometry::{Vector3, EARTH_RADIUS_KM};

pub const DEFAULT_STEP: Duration = Duration::seconds(300);
pub const DEFAULT_MAX_RANGE_KM: f64 = 1000.0;

/// Latitude/longitude/altitude over the WGS-84 ellipsoid. Display only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Geodetic {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Earth-centred inertial position at one instant, in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Position {
    pub x_km: f64,
    pub y_km: f64,
    pub z_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geodetic: Option<Geodetic>,
}

impl Position {
    pub fn inertial(v: Vector3) -> Self {
        Self {
            x_km: v[0],
            y_km: v[1],
            z_km: v[2],
            geodetic: None,
        }
    }

    pub fn with_geodetic(self, geodetic: Geodetic) -> Self {
        Self {
            geodetic: Some(geodetic),
            ..self
        }
    }

    pub fn vector(&self) -> Vector3 {
        [self.x_km, self.y_km, self.z_km]
    }
}

/// Time range, cadence and link limits for one scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    step: Duration,
    max_range_km: f64,
    earth_radius_km: f64,
}

impl ScanConfig {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
        max_range_km: f64,
    ) -> Result<Self, InterlinkError> {
        if end < start {
            return Err(InterlinkError::InvalidScanConfig(format!(
                "end {} is before start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        if step <= Duration::zero() {
            return Err(InterlinkError::InvalidScanConfig(
                "step must be positive".into(),
            ));
        }
        if !(max_range_km.is_finite() && max_range_km > 0.0) {
            return Err(InterlinkError::InvalidScanConfig(format!(
                "max range must be a positive distance, got {} km",
                max_range_km
            )));
        }

        Ok(Self {
            start,
            end,
            step,
            max_range_km,
            earth_radius_km: EARTH_RADIUS_KM,
        })
    }

    /// 300 s cadence, 1000 km range.
    pub fn with_defaults(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InterlinkError> {
        Self::new(start, end, DEFAULT_STEP, DEFAULT_MAX_RANGE_KM)
    }

    pub fn with_earth_radius_km(self, earth_radius_km: f64) -> Result<Self, InterlinkError> {
        if !(earth_radius_km.is_finite() && earth_radius_km > 0.0) {
            return Err(InterlinkError::InvalidScanConfig(format!(
                "earth radius must be positive, got {} km",
                earth_radius_km
            )));
        }
        Ok(Self {
            earth_radius_km,
            ..self
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn max_range_km(&self) -> f64 {
        self.max_range_km
    }

    pub fn earth_radius_km(&self) -> f64 {
        self.earth_radius_km
    }

    /// Number of instants the scan evaluates, end boundary included.
    pub fn sample_count(&self) -> u64 {
        let span = (self.end - self.start).to_std().unwrap_or_default();
        let step = self.step.to_std().unwrap_or_default();
        let count = span.as_nanos() / step.as_nanos().max(1) + 1;
        u64::try_from(count).unwrap_or(u64::MAX)
    }
}

/// A sampled instant with unobstructed, in-range line of sight.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct WindowRecord {
    pub timestamp: DateTime<Utc>,
    pub position_a: Position,
    pub position_b: Position,
    pub distance_km: f64,
    pub viable: bool,
}

/// Result of a scan that keeps whatever it found before a failure.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub records: Vec<WindowRecord>,
    pub samples_evaluated: u64,
    pub failure: Option<InterlinkError>,
}

impl ScanOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_result(self) -> Result<Vec<WindowRecord>, InterlinkError> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn defaults_are_five_minutes_and_one_thousand_km() {
        let config = ScanConfig::with_defaults(t0(), t0() + Duration::hours(1)).unwrap();
        assert_eq!(config.step(), Duration::seconds(300));
        assert_eq!(config.max_range_km(), 1000.0);
        assert_eq!(config.earth_radius_km(), EARTH_RADIUS_KM);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = ScanConfig::with_defaults(t0(), t0() - Duration::seconds(1)).unwrap_err();
        assert!(matches!(err, InterlinkError::InvalidScanConfig(_)));
    }

    #[test]
    fn non_positive_step_is_rejected() {
        for step in [Duration::zero(), Duration::seconds(-60)] {
            let err = ScanConfig::new(t0(), t0(), step, 1000.0).unwrap_err();
            assert!(matches!(err, InterlinkError::InvalidScanConfig(_)));
        }
    }

    #[test]
    fn non_positive_or_nan_range_is_rejected() {
        for range in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = ScanConfig::new(t0(), t0(), DEFAULT_STEP, range).unwrap_err();
            assert!(matches!(err, InterlinkError::InvalidScanConfig(_)));
        }
    }

    #[test]
    fn earth_radius_override_is_validated() {
        let config = ScanConfig::with_defaults(t0(), t0()).unwrap();
        let custom = config.clone().with_earth_radius_km(6371.0).unwrap();
        assert_eq!(custom.earth_radius_km(), 6371.0);
        assert!(config.with_earth_radius_km(0.0).is_err());
    }

    #[test]
    fn sample_count_includes_both_ends() {
        let single = ScanConfig::with_defaults(t0(), t0()).unwrap();
        assert_eq!(single.sample_count(), 1);

        let hour = ScanConfig::with_defaults(t0(), t0() + Duration::hours(1)).unwrap();
        assert_eq!(hour.sample_count(), 13);

        let ragged = ScanConfig::with_defaults(t0(), t0() + Duration::seconds(700)).unwrap();
        assert_eq!(ragged.sample_count(), 3);
    }

    #[test]
    fn failed_outcome_is_not_a_success() {
        let outcome = ScanOutcome {
            records: Vec::new(),
            samples_evaluated: 2,
            failure: Some(InterlinkError::propagation(t0(), "diverged")),
        };
        assert!(!outcome.is_complete());
        assert!(outcome.into_result().is_err());
    }
}

use chrono::{DateTime, Utc};

use crate::interlink::error::InterlinkError;
use crate::interlink::geometry::{distance, is_occluded};
use crate::interlink::provider::OrbitStateProvider;
use crate::interlink::types::{Position, ScanConfig, ScanOutcome, WindowRecord};

/// Link decision for a single instant: the separation in km when the sight
/// line clears Earth and is within `max_range_km`, otherwise `None`.
pub fn evaluate_sample(
    position_a: &Position,
    position_b: &Position,
    max_range_km: f64,
    earth_radius_km: f64,
) -> Option<f64> {
    let (a, b) = (position_a.vector(), position_b.vector());
    if is_occluded(a, b, earth_radius_km) {
        return None;
    }

    let separation = distance(a, b);
    (separation <= max_range_km).then_some(separation)
}

/// Find every sampled instant in `config` at which the two satellites can
/// talk to each other. Fails on the first position query that fails.
pub fn scan(
    provider_a: &dyn OrbitStateProvider,
    provider_b: &dyn OrbitStateProvider,
    config: &ScanConfig,
) -> Result<Vec<WindowRecord>, InterlinkError> {
    scan_best_effort(provider_a, provider_b, config).into_result()
}

/// Like [`scan`], but hands back the records found before a failure along
/// with the failure itself.
pub fn scan_best_effort(
    provider_a: &dyn OrbitStateProvider,
    provider_b: &dyn OrbitStateProvider,
    config: &ScanConfig,
) -> ScanOutcome {
    let mut records = Vec::new();
    let mut samples_evaluated = 0;
    let mut cursor = config.start();

    while cursor <= config.end() {
        let positions = provider_a
            .position_at(cursor)
            .and_then(|a| provider_b.position_at(cursor).map(|b| (a, b)));

        let (position_a, position_b) = match positions {
            Ok(pair) => pair,
            Err(e) => {
                let failure = at_sample(e, cursor);
                log::warn!(
                    "Scan stopped after {} samples: {}",
                    samples_evaluated,
                    failure
                );
                return ScanOutcome {
                    records,
                    samples_evaluated,
                    failure: Some(failure),
                };
            }
        };
        samples_evaluated += 1;

        if let Some(distance_km) = evaluate_sample(
            &position_a,
            &position_b,
            config.max_range_km(),
            config.earth_radius_km(),
        ) {
            records.push(WindowRecord {
                timestamp: cursor,
                position_a,
                position_b,
                distance_km,
                viable: true,
            });
        }

        match cursor.checked_add_signed(config.step()) {
            Some(next) => cursor = next,
            None => break,
        }
    }

    log::debug!(
        "Scanned {} samples from {} to {}: {} windows",
        samples_evaluated,
        config.start(),
        config.end(),
        records.len()
    );

    ScanOutcome {
        records,
        samples_evaluated,
        failure: None,
    }
}

// Whatever the provider reported, the caller sees a propagation failure
// pinned to the sample that triggered it.
fn at_sample(err: InterlinkError, timestamp: DateTime<Utc>) -> InterlinkError {
    match err {
        InterlinkError::Propagation { message, .. } => {
            InterlinkError::Propagation { timestamp, message }
        }
        other => InterlinkError::propagation(timestamp, other.to_string()),
    }
}

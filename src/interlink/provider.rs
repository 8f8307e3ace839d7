use chrono::{DateTime, Utc};
use serde::Deserialize;
use sgp4::{Constants, Elements};

use crate::interlink::elements::OrbitalElements;
use crate::interlink::error::InterlinkError;
use crate::interlink::geometry::{ecef_to_geodetic, teme_to_ecef_position};
use crate::interlink::types::Position;

/// Anything that can say where a satellite is at a given instant.
///
/// Implementations must be deterministic: the same instant always yields the
/// same inertial position (km, Earth-centred).
pub trait OrbitStateProvider {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Position, InterlinkError>;
}

/// Closures act as providers, which covers tabulated ephemerides and stubs.
impl<F> OrbitStateProvider for F
where
    F: Fn(DateTime<Utc>) -> Result<Position, InterlinkError>,
{
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Position, InterlinkError> {
        self(timestamp)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiderealModel {
    #[default]
    Iau,
    Afspc,
}

/// Reference-time settings shared by providers built for one request.
/// Only the display-only geodetic form depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationContext {
    pub sidereal: SiderealModel,
    pub geodetic: bool,
}

impl Default for PropagationContext {
    fn default() -> Self {
        Self {
            sidereal: SiderealModel::Iau,
            geodetic: true,
        }
    }
}

impl PropagationContext {
    pub fn inertial_only() -> Self {
        Self {
            geodetic: false,
            ..Self::default()
        }
    }

    /// Greenwich sidereal angle in radians.
    pub fn sidereal_angle(&self, timestamp: DateTime<Utc>) -> f64 {
        let epoch = sgp4::julian_years_since_j2000(&timestamp.naive_utc());
        match self.sidereal {
            SiderealModel::Iau => sgp4::iau_epoch_to_sidereal_time(epoch),
            SiderealModel::Afspc => sgp4::afspc_epoch_to_sidereal_time(epoch),
        }
    }
}

pub struct Sgp4Provider {
    name: String,
    elements: Elements,
    constants: Constants,
    context: PropagationContext,
}

impl Sgp4Provider {
    pub fn new(
        elements: &OrbitalElements,
        context: PropagationContext,
    ) -> Result<Self, InterlinkError> {
        let constants = Constants::from_elements(elements.sgp4_elements())
            .map_err(|e| InterlinkError::InvalidOrbitalElements(e.to_string()))?;

        Ok(Self {
            name: elements.name().to_string(),
            elements: elements.sgp4_elements().clone(),
            constants,
            context,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl OrbitStateProvider for Sgp4Provider {
    fn position_at(&self, timestamp: DateTime<Utc>) -> Result<Position, InterlinkError> {
        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| InterlinkError::propagation(timestamp, e.to_string()))?;

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| InterlinkError::propagation(timestamp, e.to_string()))?;

        if !prediction.position.iter().all(|c| c.is_finite()) {
            return Err(InterlinkError::propagation(
                timestamp,
                format!("{}: non-finite position", self.name),
            ));
        }

        let position = Position::inertial(prediction.position);
        if !self.context.geodetic {
            return Ok(position);
        }

        let ecef = teme_to_ecef_position(
            prediction.position,
            self.context.sidereal_angle(timestamp),
        );
        Ok(position.with_geodetic(ecef_to_geodetic(ecef)))
    }
}

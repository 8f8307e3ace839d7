mod catalog;
mod elements;
mod error;
mod geometry;
mod provider;
mod scanner;
mod time;
mod types;

pub use catalog::{SatelliteInfo, TleCatalog};
pub use elements::OrbitalElements;
pub use error::{CatalogError, InterlinkError};
pub use geometry::{distance, is_occluded, EARTH_RADIUS_KM};
pub use provider::{OrbitStateProvider, PropagationContext, SiderealModel, Sgp4Provider};
pub use scanner::{scan, scan_best_effort};
pub use time::parse_utc_instant;
pub use types::{Geodetic, Position, ScanConfig, WindowRecord, DEFAULT_MAX_RANGE_KM, DEFAULT_STEP};

#[cfg(test)]
pub(crate) use elements::fixtures as tle_fixtures;

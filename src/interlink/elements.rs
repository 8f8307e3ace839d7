use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::interlink::error::InterlinkError;

/// A validated two-line element set with a display name.
#[derive(Debug, Clone)]
pub struct OrbitalElements {
    name: String,
    elements: Elements,
}

impl OrbitalElements {
    pub fn from_tle(
        name: Option<String>,
        line1: &str,
        line2: &str,
    ) -> Result<Self, InterlinkError> {
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());

        let elements = Elements::from_tle(
            name.clone(),
            line1.trim().as_bytes(),
            line2.trim().as_bytes(),
        )
        .map_err(|e| InterlinkError::InvalidOrbitalElements(e.to_string()))?;

        if !(0.0..1.0).contains(&elements.eccentricity) {
            return Err(InterlinkError::InvalidOrbitalElements(format!(
                "eccentricity {} outside [0, 1)",
                elements.eccentricity
            )));
        }
        if !(elements.mean_motion > 0.0) {
            return Err(InterlinkError::InvalidOrbitalElements(format!(
                "mean motion {} rev/day is not positive",
                elements.mean_motion
            )));
        }

        // Catch sets that parse but cannot be initialised for SGP4.
        Constants::from_elements(&elements)
            .map_err(|e| InterlinkError::InvalidOrbitalElements(e.to_string()))?;

        let name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));
        Ok(Self { name, elements })
    }

    /// Accepts two lines, or three with a leading name line. Blank lines
    /// and surrounding whitespace are ignored.
    pub fn from_tle_text(text: &str) -> Result<Self, InterlinkError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
            .collect();

        match lines.as_slice() {
            [line1, line2] => Self::from_tle(None, line1, line2),
            [name, line1, line2] => Self::from_tle(Some(name.to_string()), line1, line2),
            _ => Err(InterlinkError::InvalidOrbitalElements(format!(
                "expected 2 or 3 TLE lines, found {}",
                lines.len()
            ))),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn norad_id(&self) -> u64 {
        self.elements.norad_id
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    pub fn inclination_deg(&self) -> f64 {
        self.elements.inclination
    }

    pub fn eccentricity(&self) -> f64 {
        self.elements.eccentricity
    }

    pub fn mean_motion_rev_per_day(&self) -> f64 {
        self.elements.mean_motion
    }

    pub fn sgp4_elements(&self) -> &Elements {
        &self.elements
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_named_element_set() {
        let elements =
            OrbitalElements::from_tle(Some(ISS_NAME.to_string()), ISS_LINE1, ISS_LINE2).unwrap();

        assert_eq!(elements.name(), ISS_NAME);
        assert_eq!(elements.norad_id(), 25544);
        assert!((elements.inclination_deg() - 51.6461).abs() < 1e-9);
        assert!((elements.eccentricity() - 0.0001413).abs() < 1e-12);
        assert!(elements.mean_motion_rev_per_day() > 15.0);

        let epoch = elements.epoch();
        assert_eq!((epoch.year(), epoch.ordinal()), (2020, 194));
        assert_eq!(epoch.hour(), 21);
    }

    #[test]
    fn unnamed_set_falls_back_to_norad_id() {
        let elements = OrbitalElements::from_tle(None, TRAILER_LINE1, TRAILER_LINE2).unwrap();
        assert_eq!(elements.name(), "NORAD 90001");

        let blank = OrbitalElements::from_tle(Some("  ".into()), ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(blank.name(), "NORAD 25544");
    }

    #[test]
    fn text_with_two_or_three_lines() {
        let two = format!("\n{}\n{}\n", ISS_LINE1, ISS_LINE2);
        assert_eq!(
            OrbitalElements::from_tle_text(&two).unwrap().name(),
            "NORAD 25544"
        );

        let three = format!("{}\n{}\n{}", ISS_NAME, ISS_LINE1, ISS_LINE2);
        assert_eq!(
            OrbitalElements::from_tle_text(&three).unwrap().name(),
            ISS_NAME
        );
    }

    #[test]
    fn wrong_line_count_is_rejected() {
        let err = OrbitalElements::from_tle_text(ISS_LINE1).unwrap_err();
        assert!(matches!(err, InterlinkError::InvalidOrbitalElements(_)));
    }

    #[test]
    fn garbage_lines_are_rejected() {
        let err = OrbitalElements::from_tle(None, "1 hello", "2 world").unwrap_err();
        assert!(matches!(err, InterlinkError::InvalidOrbitalElements(_)));
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut line2 = ISS_LINE2.to_string();
        line2.replace_range(68..69, "0");
        let err = OrbitalElements::from_tle(None, ISS_LINE1, &line2).unwrap_err();
        assert!(matches!(err, InterlinkError::InvalidOrbitalElements(_)));
    }
}

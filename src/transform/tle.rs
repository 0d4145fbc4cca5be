//! Reading mean orbital elements out of two-line element sets.
//!
//! Field decoding and checksums are the `sgp4` crate's; this module adds the
//! catalog walk with per-entry failures and the altitude derived from mean
//! motion.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{EARTH_MU_KM3_S2, EARTH_RADIUS_KM, SECONDS_PER_DAY};
use crate::errors::TractError;

/// Raw element set as it appears in a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwoLineElement {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// Mean elements decoded from a [`TwoLineElement`]. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanElements {
    pub norad_id: u64,
    pub epoch: DateTime<Utc>,
    pub inclination: f64,
    pub raan: f64,
    pub eccentricity: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
    /// Revolutions per day.
    pub mean_motion: f64,
}

impl MeanElements {
    pub fn parse(line1: &str, line2: &str) -> Result<Self, TractError> {
        MeanElements::try_from(&decode(None, line1, line2)?)
    }

    /// Kepler's third law from the mean motion, in km.
    pub fn semi_major_axis_km(&self) -> f64 {
        let n = self.mean_motion * 2.0 * std::f64::consts::PI / SECONDS_PER_DAY;
        (EARTH_MU_KM3_S2 / n.powi(2)).cbrt()
    }

    /// Semi-major axis above the spherical Earth radius.
    pub fn mean_altitude_km(&self) -> f64 {
        self.semi_major_axis_km() - EARTH_RADIUS_KM
    }
}

impl TryFrom<&sgp4::Elements> for MeanElements {
    type Error = TractError;

    fn try_from(elements: &sgp4::Elements) -> Result<Self, Self::Error> {
        if !(elements.mean_motion > 0.0) {
            return Err(TractError::TleParse(format!(
                "non-positive mean motion {} for {}",
                elements.mean_motion, elements.norad_id
            )));
        }
        if !(0.0..=180.0).contains(&elements.inclination) {
            return Err(TractError::TleParse(format!(
                "inclination {} out of range for {}",
                elements.inclination, elements.norad_id
            )));
        }

        Ok(MeanElements {
            norad_id: elements.norad_id,
            epoch: Utc.from_utc_datetime(&elements.datetime),
            inclination: elements.inclination,
            raan: elements.right_ascension,
            eccentricity: elements.eccentricity,
            argument_of_perigee: elements.argument_of_perigee,
            mean_anomaly: elements.mean_anomaly,
            mean_motion: elements.mean_motion,
        })
    }
}

impl TwoLineElement {
    pub fn new(name: impl Into<String>, line1: impl Into<String>, line2: impl Into<String>) -> Self {
        TwoLineElement {
            name: name.into(),
            line1: line1.into(),
            line2: line2.into(),
        }
    }

    /// Element set in the form the SGP4 propagator consumes.
    pub fn sgp4_elements(&self) -> Result<sgp4::Elements, TractError> {
        decode(Some(self.name.clone()), &self.line1, &self.line2)
    }

    pub fn elements(&self) -> Result<MeanElements, TractError> {
        MeanElements::try_from(&self.sgp4_elements()?)
    }
}

fn decode(name: Option<String>, line1: &str, line2: &str) -> Result<sgp4::Elements, TractError> {
    sgp4::Elements::from_tle(
        name,
        line1.trim_end().as_bytes(),
        line2.trim_end().as_bytes(),
    )
    .map_err(|e| TractError::TleParse(e.to_string()))
}

/// Result of reading a catalog: good entries plus the lines that could not be used.
#[derive(Debug, Default)]
pub struct CatalogParse {
    pub entries: Vec<TwoLineElement>,
    /// (1-based line number, reason)
    pub failures: Vec<(usize, String)>,
}

/// Read a name/line1/line2 catalog. Name lines are optional; an entry without
/// one is named after its catalog number. Broken entries are recorded and skipped.
pub fn parse_catalog(text: &str) -> CatalogParse {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end()))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    let mut parse = CatalogParse::default();
    let mut i = 0;
    while i < lines.len() {
        let (line_no, line) = lines[i];
        let (name, first) = if line.starts_with("1 ") {
            (None, i)
        } else {
            (Some(line.trim().to_string()), i + 1)
        };

        let (Some(&(_, line1)), Some(&(_, line2))) = (lines.get(first), lines.get(first + 1))
        else {
            parse
                .failures
                .push((line_no, "truncated entry".to_string()));
            break;
        };

        match MeanElements::parse(line1, line2) {
            Ok(elements) => {
                let name = name.unwrap_or_else(|| elements.norad_id.to_string());
                parse.entries.push(TwoLineElement::new(name, line1, line2));
                i = first + 2;
            }
            Err(e) => {
                parse.failures.push((line_no, e.to_string()));
                i += 1;
            }
        }
    }

    parse
}

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ALTITUDE_BOUNDARY_TOLERANCE_KM, EXCELLENT_ACCURACY_PERCENT, EXCELLENT_COVERAGE_PERCENT,
    GOOD_ACCURACY_PERCENT, GOOD_COVERAGE_PERCENT, INCLINATION_BOUNDARY_TOLERANCE_DEG,
    LEO_ALTITUDE_MAX_KM, LEO_ALTITUDE_MIN_KM, RAAN_BOUNDARY_TOLERANCE_DEG,
};
use crate::grid::tract::{Tract, TractBounds};
use crate::matching::matcher::MatchResult;
use crate::satellite::state::ParameterPoint;

// Coverage

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub tract_count: usize,
    pub altitude_span: (f64, f64),
    pub inclination_span: (f64, f64),
    pub raan_span: (f64, f64),
    pub altitude_bins: usize,
    pub inclination_bins: usize,
    pub raan_bins: usize,
    /// Tracts present relative to the full product of distinct bins.
    pub completeness_percent: f64,
}

impl CoverageSummary {
    pub fn expected_tracts(&self) -> usize {
        self.altitude_bins * self.inclination_bins * self.raan_bins
    }
}

pub fn coverage(tracts: &[Tract]) -> CoverageSummary {
    if tracts.is_empty() {
        return CoverageSummary::default();
    }

    let axis = |lo: fn(&Tract) -> f64, hi: fn(&Tract) -> f64| {
        let span = tracts.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), t| {
            (min.min(lo(t)), max.max(hi(t)))
        });
        let mut bins: Vec<(u64, u64)> = tracts
            .iter()
            .map(|t| (lo(t).to_bits(), hi(t).to_bits()))
            .collect();
        bins.sort_unstable();
        bins.dedup();
        (span, bins.len())
    };

    let (altitude_span, altitude_bins) = axis(|t| t.alt_min, |t| t.alt_max);
    let (inclination_span, inclination_bins) = axis(|t| t.inc_min, |t| t.inc_max);
    let (raan_span, raan_bins) = axis(|t| t.raan_min, |t| t.raan_max);

    let mut summary = CoverageSummary {
        tract_count: tracts.len(),
        altitude_span,
        inclination_span,
        raan_span,
        altitude_bins,
        inclination_bins,
        raan_bins,
        completeness_percent: 0.0,
    };
    summary.completeness_percent =
        summary.tract_count as f64 / summary.expected_tracts() as f64 * 100.0;
    summary
}

// Distribution

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AltitudeBand {
    VeryLow,
    Low,
    Medium,
    High,
}

impl AltitudeBand {
    /// `None` outside the LEO altitude domain.
    pub fn of(altitude: f64) -> Option<Self> {
        if !(LEO_ALTITUDE_MIN_KM..=LEO_ALTITUDE_MAX_KM).contains(&altitude) {
            None
        } else if altitude < 400.0 {
            Some(AltitudeBand::VeryLow)
        } else if altitude < 600.0 {
            Some(AltitudeBand::Low)
        } else if altitude < 1000.0 {
            Some(AltitudeBand::Medium)
        } else {
            Some(AltitudeBand::High)
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AltitudeBand::VeryLow => "200-400 km",
            AltitudeBand::Low => "400-600 km",
            AltitudeBand::Medium => "600-1000 km",
            AltitudeBand::High => "1000-2000 km",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InclinationBand {
    Equatorial,
    MidLatitude,
    HighLatitude,
    Retrograde,
}

impl InclinationBand {
    pub fn of(inclination: f64) -> Self {
        if inclination < 30.0 {
            InclinationBand::Equatorial
        } else if inclination < 60.0 {
            InclinationBand::MidLatitude
        } else if inclination < 90.0 {
            InclinationBand::HighLatitude
        } else {
            InclinationBand::Retrograde
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InclinationBand::Equatorial => "0-30°",
            InclinationBand::MidLatitude => "30-60°",
            InclinationBand::HighLatitude => "60-90°",
            InclinationBand::Retrograde => "90+°",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution {
    pub cells: BTreeMap<(AltitudeBand, InclinationBand), usize>,
    pub out_of_domain: usize,
}

impl Distribution {
    pub fn total(&self) -> usize {
        self.cells.values().sum()
    }
}

pub fn distribution(points: &[ParameterPoint]) -> Distribution {
    let mut dist = Distribution::default();
    for point in points {
        match AltitudeBand::of(point.altitude) {
            Some(band) => {
                *dist
                    .cells
                    .entry((band, InclinationBand::of(point.inclination)))
                    .or_insert(0) += 1
            }
            None => dist.out_of_domain += 1,
        }
    }
    dist
}

// Boundaries

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BoundaryKind {
    Altitude,
    Inclination,
    Raan,
    Interior,
}

impl BoundaryKind {
    /// Altitude proximity wins over inclination, inclination over RAAN.
    pub fn classify(bounds: &TractBounds, point: &ParameterPoint, raan: f64) -> Self {
        let near = |value: f64, min: f64, max: f64, tolerance: f64| {
            (value - min).abs() < tolerance || (value - max).abs() < tolerance
        };

        if near(
            point.altitude,
            bounds.alt_min,
            bounds.alt_max,
            ALTITUDE_BOUNDARY_TOLERANCE_KM,
        ) {
            BoundaryKind::Altitude
        } else if near(
            point.inclination,
            bounds.inc_min,
            bounds.inc_max,
            INCLINATION_BOUNDARY_TOLERANCE_DEG,
        ) {
            BoundaryKind::Inclination
        } else if near(raan, bounds.raan_min, bounds.raan_max, RAAN_BOUNDARY_TOLERANCE_DEG) {
            BoundaryKind::Raan
        } else {
            BoundaryKind::Interior
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BoundaryKind::Altitude => "altitude boundary",
            BoundaryKind::Inclination => "inclination boundary",
            BoundaryKind::Raan => "RAAN boundary",
            BoundaryKind::Interior => "interior",
        };
        write!(f, "{}", name)
    }
}

/// Attribute matches counted by how close the satellite sits to a tract edge.
pub fn boundary_analysis(results: &[MatchResult], tracts: &[Tract]) -> BTreeMap<BoundaryKind, usize> {
    let by_id: HashMap<&str, TractBounds> = tracts
        .iter()
        .map(|t| (t.id.as_str(), t.bounds()))
        .collect();

    let mut counts = BTreeMap::new();
    for result in results {
        for id in &result.attribute_matches {
            let Some(bounds) = by_id.get(id.as_str()) else {
                continue;
            };
            let Some(raan) = bounds.contains(&result.point) else {
                continue;
            };
            let kind = BoundaryKind::classify(bounds, &result.point, raan);
            *counts.entry(kind).or_insert(0) += 1;
        }
    }
    counts
}

// Assessment

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assessment {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Assessment {
    pub fn of(match_accuracy_percent: f64, coverage_percent: f64) -> Self {
        if match_accuracy_percent >= EXCELLENT_ACCURACY_PERCENT
            && coverage_percent >= EXCELLENT_COVERAGE_PERCENT
        {
            Assessment::Excellent
        } else if match_accuracy_percent >= GOOD_ACCURACY_PERCENT
            && coverage_percent >= GOOD_COVERAGE_PERCENT
        {
            Assessment::Good
        } else {
            Assessment::NeedsImprovement
        }
    }
}

impl fmt::Display for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Assessment::Excellent => "EXCELLENT",
            Assessment::Good => "GOOD",
            Assessment::NeedsImprovement => "NEEDS IMPROVEMENT",
        };
        write!(f, "{}", text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::generator::generate_tracts;
    use crate::grid::tract::OrbitZone;
    use crate::matching::matcher::TractMatcher;
    use crate::satellite::state::PointSource;
    use approx::assert_abs_diff_eq;

    fn point(altitude: f64, inclination: f64, raan: f64) -> ParameterPoint {
        ParameterPoint {
            altitude,
            inclination,
            raan,
        }
    }

    #[test]
    fn test_coverage_of_full_grid_section() {
        let tracts = generate_tracts(OrbitZone::Leo, (400.0, 500.0), 50.0, 5.0, 5.0)
            .unwrap()
            .tracts;
        let summary = coverage(&tracts);

        assert_eq!(summary.tract_count, 2 * 36 * 72);
        assert_eq!(summary.altitude_bins, 2);
        assert_eq!(summary.inclination_bins, 36);
        assert_eq!(summary.raan_bins, 72);
        assert_eq!(summary.altitude_span, (400.0, 500.0));
        assert_eq!(summary.raan_span, (0.0, 360.0));
        assert_abs_diff_eq!(summary.completeness_percent, 100.0, epsilon = 1e-9);

        let partial = coverage(&tracts[..tracts.len() / 2]);
        assert!(partial.completeness_percent < 100.0);
    }

    #[test]
    fn test_coverage_of_nothing() {
        let summary = coverage(&[]);
        assert_eq!(summary.tract_count, 0);
        assert_eq!(summary.completeness_percent, 0.0);
    }

    #[test]
    fn test_distribution_bands() {
        let dist = distribution(&[
            point(350.0, 10.0, 0.0),
            point(550.0, 53.0, 0.0),
            point(550.0, 53.0, 10.0),
            point(800.0, 97.0, 0.0),
            point(1500.0, 63.0, 0.0),
            point(100.0, 50.0, 0.0),
            point(2500.0, 50.0, 0.0),
        ]);

        assert_eq!(dist.total(), 5);
        assert_eq!(dist.out_of_domain, 2);
        assert_eq!(
            dist.cells[&(AltitudeBand::Low, InclinationBand::MidLatitude)],
            2
        );
        assert_eq!(
            dist.cells[&(AltitudeBand::Medium, InclinationBand::Retrograde)],
            1
        );
        assert_eq!(
            dist.cells[&(AltitudeBand::High, InclinationBand::HighLatitude)],
            1
        );
    }

    #[test]
    fn test_boundary_priority() {
        let tracts = generate_tracts(OrbitZone::Leo, (400.0, 450.0), 50.0, 5.0, 5.0)
            .unwrap()
            .tracts;
        let matcher = TractMatcher::new(&tracts, &[]);

        let cases = [
            (point(400.5, 45.2, 90.1), BoundaryKind::Altitude),
            (point(425.0, 45.2, 90.1), BoundaryKind::Inclination),
            (point(425.0, 47.0, 94.8), BoundaryKind::Raan),
            (point(425.0, 47.0, 92.5), BoundaryKind::Interior),
        ];
        for (p, expected) in cases {
            let result = matcher.match_point("SAT", p, PointSource::Elements);
            let counts = boundary_analysis(&[result], &tracts);
            assert_eq!(counts.len(), 1, "{:?}", p);
            assert_eq!(counts[&expected], 1, "{:?}", p);
        }
    }

    #[test]
    fn test_boundary_on_wrapped_raan() {
        let tracts = generate_tracts(OrbitZone::Leo, (400.0, 450.0), 50.0, 5.0, 5.0)
            .unwrap()
            .tracts;
        let matcher = TractMatcher::new(&tracts, &[]);
        let result = matcher.match_point("SAT", point(425.0, 47.0, -0.2), PointSource::Elements);
        let counts = boundary_analysis(&[result], &tracts);
        assert_eq!(counts[&BoundaryKind::Raan], 1);
    }

    #[test]
    fn test_assessment_thresholds() {
        assert_eq!(Assessment::of(96.0, 100.0), Assessment::Excellent);
        assert_eq!(Assessment::of(95.0, 90.0), Assessment::Excellent);
        assert_eq!(Assessment::of(96.0, 85.0), Assessment::Good);
        assert_eq!(Assessment::of(85.0, 80.0), Assessment::Good);
        assert_eq!(Assessment::of(84.9, 100.0), Assessment::NeedsImprovement);
        assert_eq!(Assessment::of(100.0, 50.0), Assessment::NeedsImprovement);
    }
}

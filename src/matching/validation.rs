use rayon::prelude::*;

use crate::errors::TractError;
use crate::geometry::shell::VolumetricShell;
use crate::grid::tract::Tract;
use crate::matching::matcher::{MatchResult, TractMatcher};
use crate::satellite::state::SatelliteState;

/// A satellite the two containment tests disagree on.
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub satellite_id: String,
    pub name: String,
    pub attribute_only: Vec<String>,
    pub geometric_only: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ConsistencyReport {
    /// Satellites with a usable parameter point.
    pub evaluated: usize,
    /// Non-empty and both tests agree.
    pub matches: usize,
    pub mismatches: Vec<Mismatch>,
    /// Outside every tract under both tests.
    pub unmatched: Vec<String>,
    /// No parameter point could be derived.
    pub unresolved: Vec<String>,
    /// `matches / evaluated`, 0 when nothing was evaluated.
    pub match_accuracy_percent: f64,
    pub results: Vec<MatchResult>,
}

enum Verdict {
    Matched(MatchResult),
    Mismatched(Mismatch, MatchResult),
    Unmatched(MatchResult),
    Unresolved(String),
}

/// Run both containment tests for every satellite and reconcile them.
///
/// Satellites are evaluated on a dedicated pool of at most `workers` threads,
/// never more threads than satellites.
pub fn validate_consistency(
    satellites: &[SatelliteState],
    tracts: &[Tract],
    shells: &[VolumetricShell],
    workers: usize,
) -> Result<ConsistencyReport, TractError> {
    let threads = workers.min(satellites.len()).max(1);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .map_err(|e| TractError::Config(format!("worker pool: {}", e)))?;

    let matcher = TractMatcher::new(tracts, shells);
    let verdicts: Vec<Verdict> = pool.install(|| {
        satellites
            .par_iter()
            .map(|state| evaluate(&matcher, state))
            .collect()
    });

    let mut report = ConsistencyReport::default();
    for verdict in verdicts {
        match verdict {
            Verdict::Matched(result) => {
                report.matches += 1;
                report.results.push(result);
            }
            Verdict::Mismatched(mismatch, result) => {
                log::debug!(
                    "Mismatch for {} ({}): attribute-only {:?}, geometric-only {:?}",
                    mismatch.name,
                    mismatch.satellite_id,
                    mismatch.attribute_only,
                    mismatch.geometric_only
                );
                report.mismatches.push(mismatch);
                report.results.push(result);
            }
            Verdict::Unmatched(result) => {
                report.unmatched.push(result.satellite_id.clone());
                report.results.push(result);
            }
            Verdict::Unresolved(id) => {
                log::warn!("Satellite {} has no usable orbital parameters", id);
                report.unresolved.push(id);
            }
        }
    }

    report.evaluated = report.results.len();
    report.match_accuracy_percent = if report.evaluated == 0 {
        0.0
    } else {
        report.matches as f64 / report.evaluated as f64 * 100.0
    };

    log::info!(
        "Validated {} satellites on {} workers: {} matches, {} mismatches, {} unmatched, {} unresolved ({:.1}%)",
        satellites.len(),
        threads,
        report.matches,
        report.mismatches.len(),
        report.unmatched.len(),
        report.unresolved.len(),
        report.match_accuracy_percent
    );
    Ok(report)
}

fn evaluate(matcher: &TractMatcher<'_>, state: &SatelliteState) -> Verdict {
    let result = match matcher.match_state(state) {
        Ok(result) => result,
        Err(_) => return Verdict::Unresolved(state.id.clone()),
    };

    if result.is_empty() {
        Verdict::Unmatched(result)
    } else if result.is_consistent() {
        Verdict::Matched(result)
    } else {
        let mismatch = Mismatch {
            satellite_id: state.id.clone(),
            name: state.name.clone(),
            attribute_only: result.attribute_only(),
            geometric_only: result.geometric_only(),
        };
        Verdict::Mismatched(mismatch, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::shell::build_shells;
    use crate::grid::tract::{OrbitZone, TractBounds};
    use crate::satellite::state::OrbitalElements;
    use approx::assert_abs_diff_eq;
    use chrono::Utc;

    fn tracts() -> Vec<Tract> {
        [(90.0, 95.0), (95.0, 100.0)]
            .iter()
            .map(|&(raan_min, raan_max)| {
                Tract::new(
                    OrbitZone::Leo,
                    TractBounds {
                        alt_min: 400.0,
                        alt_max: 450.0,
                        inc_min: 45.0,
                        inc_max: 50.0,
                        raan_min,
                        raan_max,
                    },
                    1.0,
                    Utc::now(),
                )
            })
            .collect()
    }

    fn satellite(id: &str, altitude: f64, raan: f64) -> SatelliteState {
        SatelliteState::from_elements(
            id,
            format!("SAT {}", id),
            Utc::now(),
            OrbitalElements {
                inclination: 47.0,
                raan,
                altitude,
            },
        )
    }

    #[test]
    fn test_report_categories() {
        let tracts = tracts();
        let shells = build_shells(&tracts).shells;

        let mut unresolved = satellite("4", 425.0, 92.0);
        unresolved.elements = None;
        let satellites = vec![
            satellite("1", 425.0, 92.0),
            satellite("2", 425.0, 95.0),
            satellite("3", 2500.0, 92.0),
            unresolved,
        ];

        let report = validate_consistency(&satellites, &tracts, &shells, 4).unwrap();
        assert_eq!(report.evaluated, 3);
        assert_eq!(report.matches, 1);
        assert_eq!(report.mismatches.len(), 1);
        assert_eq!(report.mismatches[0].satellite_id, "2");
        assert_eq!(report.mismatches[0].attribute_only.len(), 2);
        assert_eq!(report.unmatched, vec!["3".to_string()]);
        assert_eq!(report.unresolved, vec!["4".to_string()]);
        assert_abs_diff_eq!(report.match_accuracy_percent, 100.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let report = validate_consistency(&[], &tracts(), &[], 8).unwrap();
        assert_eq!(report.evaluated, 0);
        assert_eq!(report.match_accuracy_percent, 0.0);
    }

    #[test]
    fn test_result_independent_of_worker_count() {
        let tracts = tracts();
        let shells = build_shells(&tracts).shells;
        let satellites: Vec<SatelliteState> = (0..40)
            .map(|i| satellite(&i.to_string(), 425.0, 90.0 + i as f64 * 0.25))
            .collect();

        let single = validate_consistency(&satellites, &tracts, &shells, 1).unwrap();
        let many = validate_consistency(&satellites, &tracts, &shells, 16).unwrap();
        assert_eq!(single.matches, many.matches);
        assert_eq!(single.mismatches, many.mismatches);
        assert_eq!(single.unmatched, many.unmatched);
    }
}

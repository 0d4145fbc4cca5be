use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::matching::validation::ConsistencyReport;
use crate::regeneration::{CleanupReport, RegenerationReport};
use crate::reporting::analysis::{Assessment, BoundaryKind, CoverageSummary, Distribution};

/// Collects what a run produced and renders it as log lines.
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    regeneration: Option<RegenerationReport>,
    cleanup: Option<CleanupReport>,
    validation: Option<ConsistencyReport>,
    coverage: Option<CoverageSummary>,
    distribution: Option<Distribution>,
    boundaries: BTreeMap<BoundaryKind, usize>,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    pub fn new() -> Self {
        RunSummary {
            started_at: Utc::now(),
            regeneration: None,
            cleanup: None,
            validation: None,
            coverage: None,
            distribution: None,
            boundaries: BTreeMap::new(),
        }
    }

    fn format_count(count: usize) -> String {
        let digits = count.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(c);
        }
        out
    }

    fn format_duration(elapsed_seconds: f64) -> String {
        if elapsed_seconds >= 3600.0 {
            let hours = (elapsed_seconds / 3600.0).floor();
            let minutes = ((elapsed_seconds % 3600.0) / 60.0).floor();
            let seconds = elapsed_seconds % 60.0;
            format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
        } else if elapsed_seconds >= 60.0 {
            let minutes = (elapsed_seconds / 60.0).floor();
            let seconds = elapsed_seconds % 60.0;
            format!("{:.0}m {:.2}s", minutes, seconds)
        } else {
            format!("{:.2}s", elapsed_seconds)
        }
    }

    pub fn record_regeneration(&mut self, report: RegenerationReport) {
        self.regeneration = Some(report);
    }

    pub fn record_cleanup(&mut self, report: CleanupReport) {
        self.cleanup = Some(report);
    }

    pub fn record_validation(&mut self, report: ConsistencyReport) {
        self.validation = Some(report);
    }

    pub fn record_coverage(&mut self, summary: CoverageSummary) {
        self.coverage = Some(summary);
    }

    pub fn record_distribution(&mut self, distribution: Distribution) {
        self.distribution = Some(distribution);
    }

    pub fn record_boundaries(&mut self, counts: BTreeMap<BoundaryKind, usize>) {
        self.boundaries = counts;
    }

    /// Needs both a validation run and a coverage summary.
    pub fn assessment(&self) -> Option<Assessment> {
        let validation = self.validation.as_ref()?;
        let coverage = self.coverage.as_ref()?;
        Some(Assessment::of(
            validation.match_accuracy_percent,
            coverage.completeness_percent,
        ))
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(r) = &self.regeneration {
            lines.push(format!("--- Regeneration ({}) ---", r.zone));
            lines.push(format!(
                "Tracts inserted: {} (skipped {})",
                Self::format_count(r.tracts_inserted),
                r.tracts_skipped
            ));
            lines.push(format!(
                "Shells inserted: {} (polar {})",
                Self::format_count(r.shells_inserted),
                Self::format_count(r.polar_skipped)
            ));
            for (category, count) in &r.shell_failures {
                lines.push(format!("Shell failures [{}]: {}", category, count));
            }
            if r.tracts_replaced > 0 {
                lines.push(format!(
                    "Replaced previous generation: {} tracts, {} shells",
                    Self::format_count(r.tracts_replaced),
                    Self::format_count(r.shells_replaced)
                ));
            }
        }

        if let Some(c) = &self.cleanup {
            lines.push("--- Cleanup ---".to_string());
            if let Some(kept) = c.kept {
                lines.push(format!("Kept zone: {}", kept));
            }
            lines.push(format!(
                "Removed: {} tracts, {} shells",
                Self::format_count(c.tracts_removed()),
                Self::format_count(c.shells_removed())
            ));
        }

        if let Some(c) = &self.coverage {
            lines.push("--- Coverage ---".to_string());
            lines.push(format!("Tracts: {}", Self::format_count(c.tract_count)));
            lines.push(format!(
                "Altitude: {:.0} - {:.0} km",
                c.altitude_span.0, c.altitude_span.1
            ));
            lines.push(format!(
                "Inclination: {:.0} - {:.0}°",
                c.inclination_span.0, c.inclination_span.1
            ));
            lines.push(format!("RAAN: {:.0} - {:.0}°", c.raan_span.0, c.raan_span.1));
            lines.push(format!(
                "Resolution: {} alt × {} inc × {} raan bins",
                c.altitude_bins, c.inclination_bins, c.raan_bins
            ));
            lines.push(format!(
                "Completeness: {:.1}% ({} / {})",
                c.completeness_percent,
                Self::format_count(c.tract_count),
                Self::format_count(c.expected_tracts())
            ));
        }

        if let Some(d) = &self.distribution {
            lines.push("--- Distribution ---".to_string());
            for ((altitude, inclination), count) in &d.cells {
                lines.push(format!(
                    "{} / {}: {}",
                    altitude.label(),
                    inclination.label(),
                    count
                ));
            }
            if d.out_of_domain > 0 {
                lines.push(format!("Outside LEO domain: {}", d.out_of_domain));
            }
        }

        if let Some(v) = &self.validation {
            lines.push("--- Validation ---".to_string());
            lines.push(format!("Evaluated: {}", Self::format_count(v.evaluated)));
            lines.push(format!("Consistent matches: {}", Self::format_count(v.matches)));
            lines.push(format!("Mismatches: {}", v.mismatches.len()));
            lines.push(format!("Unmatched: {}", v.unmatched.len()));
            lines.push(format!("Unresolved: {}", v.unresolved.len()));
            lines.push(format!("Match accuracy: {:.1}%", v.match_accuracy_percent));
        }

        if !self.boundaries.is_empty() {
            lines.push("--- Boundary analysis ---".to_string());
            for (kind, count) in &self.boundaries {
                lines.push(format!("{}: {}", kind, count));
            }
        }

        if let Some(assessment) = self.assessment() {
            lines.push(format!("Assessment: {}", assessment));
        }

        let elapsed = (Utc::now() - self.started_at).num_milliseconds() as f64 / 1000.0;
        lines.push(format!("Elapsed: {}", Self::format_duration(elapsed)));
        lines
    }

    pub fn display_data(&self) {
        for line in self.lines() {
            log::info!("{}", line);
        }
    }
}

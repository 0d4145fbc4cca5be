use std::collections::BTreeSet;

use crate::errors::TractError;
use crate::geometry::shell::VolumetricShell;
use crate::grid::tract::Tract;
use crate::satellite::state::{ParameterPoint, PointSource, SatelliteState};
use crate::utils::vector2d::Vector2D;

/// Containment answer for one satellite.
///
/// Attribute matches use inclusive bounds, so a point on an edge shared by two
/// tracts is reported in both. Nothing here breaks that tie; callers that need
/// a single owner can use [`MatchResult::lowest_tract_id`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub satellite_id: String,
    pub point: ParameterPoint,
    pub source: PointSource,
    pub attribute_matches: BTreeSet<String>,
    pub geometric_matches: BTreeSet<String>,
}

impl MatchResult {
    /// Tracts containing the satellite by the attribute-range test.
    pub fn tract_ids(&self) -> &BTreeSet<String> {
        &self.attribute_matches
    }

    pub fn is_empty(&self) -> bool {
        self.attribute_matches.is_empty() && self.geometric_matches.is_empty()
    }

    /// Both tests agree on the exact set of tracts.
    pub fn is_consistent(&self) -> bool {
        self.attribute_matches == self.geometric_matches
    }

    pub fn attribute_only(&self) -> Vec<String> {
        self.attribute_matches
            .difference(&self.geometric_matches)
            .cloned()
            .collect()
    }

    pub fn geometric_only(&self) -> Vec<String> {
        self.geometric_matches
            .difference(&self.attribute_matches)
            .cloned()
            .collect()
    }

    pub fn lowest_tract_id(&self) -> Option<&str> {
        self.attribute_matches.iter().next().map(String::as_str)
    }
}

/// Read-only view over a zone's tracts and shells.
pub struct TractMatcher<'a> {
    tracts: &'a [Tract],
    shells: &'a [VolumetricShell],
}

impl<'a> TractMatcher<'a> {
    pub fn new(tracts: &'a [Tract], shells: &'a [VolumetricShell]) -> Self {
        TractMatcher { tracts, shells }
    }

    pub fn attribute_matches(&self, point: &ParameterPoint) -> BTreeSet<String> {
        self.tracts
            .iter()
            .filter(|tract| tract.bounds().contains(point).is_some())
            .map(|tract| tract.id.clone())
            .collect()
    }

    /// Shells are pre-filtered on their own stored bounds, then the point is
    /// tested against the polygon using whichever wrapped RAAN fell inside.
    pub fn geometric_matches(&self, point: &ParameterPoint) -> BTreeSet<String> {
        self.shells
            .iter()
            .filter(|shell| shell.geometry.is_valid)
            .filter(|shell| {
                shell.bounds().contains(point).is_some_and(|raan| {
                    shell
                        .geometry
                        .polygon
                        .contains(Vector2D::new(raan, point.inclination))
                })
            })
            .map(|shell| shell.tract_id.clone())
            .collect()
    }

    pub fn match_point(
        &self,
        satellite_id: &str,
        point: ParameterPoint,
        source: PointSource,
    ) -> MatchResult {
        MatchResult {
            satellite_id: satellite_id.to_string(),
            point,
            source,
            attribute_matches: self.attribute_matches(&point),
            geometric_matches: self.geometric_matches(&point),
        }
    }

    pub fn match_state(&self, state: &SatelliteState) -> Result<MatchResult, TractError> {
        let (point, source) = state
            .parameter_point()
            .ok_or_else(|| TractError::UnresolvedState(state.id.clone()))?;
        Ok(self.match_point(&state.id, point, source))
    }
}

/// Match one satellite against a tract/shell collection. An empty result means
/// the satellite is outside every tract.
pub fn match_tracts(
    state: &SatelliteState,
    tracts: &[Tract],
    shells: &[VolumetricShell],
) -> Result<MatchResult, TractError> {
    TractMatcher::new(tracts, shells).match_state(state)
}

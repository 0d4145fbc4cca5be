use std::collections::HashSet;

use approx::assert_abs_diff_eq;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use orbital_tracts::{
    boundary_analysis, build_shells, coverage, elements_to_geodetic, match_tracts,
    parse_catalog, propagate_catalog, regenerate_zone, retain_zone, validate_consistency,
    Assessment, BoundaryKind, GridConfig, JsonStore, MemoryStore, OrbitZone, OrbitalElements,
    PointSource, SatelliteState, Sgp4Propagator, Tract, TractError, TractGridGenerator,
    TractStore, VolumetricShell, EARTH_RADIUS_KM,
};

const REFERENCE_TRACT: &str = "LEO-A400-I45-RAAN90_95";

// Helper function to build the default LEO zone in memory
fn default_leo_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    regenerate_zone(&mut store, &GridConfig::default()).expect("LEO regeneration");
    store
}

fn satellite(id: &str, altitude: f64, inclination: f64, raan: f64) -> SatelliteState {
    SatelliteState::from_elements(
        id,
        format!("SAT {}", id),
        Utc::now(),
        OrbitalElements {
            inclination,
            raan,
            altitude,
        },
    )
}

fn zone_rows(store: &MemoryStore, zone: OrbitZone) -> (Vec<Tract>, Vec<VolumetricShell>) {
    (
        store.load_tracts(zone).unwrap(),
        store.load_shells(zone).unwrap(),
    )
}

#[test]
fn test_full_leo_regeneration() {
    let mut store = MemoryStore::new();
    let report = regenerate_zone(&mut store, &GridConfig::default()).unwrap();

    println!(
        "LEO: {} tracts, {} shells, {} polar",
        report.tracts_inserted, report.shells_inserted, report.polar_skipped
    );
    assert_eq!(report.tracts_inserted, 36 * 36 * 72);
    assert_eq!(report.tracts_skipped, 0);
    assert_eq!(report.polar_skipped, 36 * 2 * 72);
    assert_eq!(report.shells_inserted, 36 * 34 * 72);
    assert_eq!(report.shell_failures_total(), 0);

    let (tracts, shells) = zone_rows(&store, OrbitZone::Leo);
    assert!(tracts.iter().all(|t| !t.is_degenerate()));

    let ids: HashSet<&str> = tracts.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), tracts.len());
    assert!(shells.iter().all(|s| ids.contains(s.tract_id.as_str())));
    assert!(shells.iter().all(|s| s.inc_min < 170.0));

    let reference = shells
        .iter()
        .find(|s| s.tract_id == REFERENCE_TRACT)
        .expect("reference shell");
    assert_abs_diff_eq!(reference.volume_estimate, 1_250_000.0, epsilon = 1e-6);
}

#[test]
fn test_regeneration_is_deterministic() {
    let generator = TractGridGenerator::new(GridConfig::default()).unwrap();
    let first: Vec<String> = generator.generate().tracts.into_iter().map(|t| t.id).collect();
    let second: Vec<String> = generator.generate().tracts.into_iter().map(|t| t.id).collect();
    assert_eq!(first, second);

    let summary = coverage(&generator.generate().tracts);
    assert_eq!(summary.altitude_bins, 36);
    assert_eq!(summary.inclination_bins, 36);
    assert_eq!(summary.raan_bins, 72);
    assert_eq!(summary.altitude_span, (200.0, 2000.0));
    assert_abs_diff_eq!(summary.completeness_percent, 100.0, epsilon = 1e-9);
}

#[test]
fn test_reference_scenarios_on_default_grid() {
    let store = default_leo_store();
    let (tracts, shells) = zone_rows(&store, OrbitZone::Leo);

    let inside = match_tracts(&satellite("1", 425.0, 47.0, 92.0), &tracts, &shells).unwrap();
    assert_eq!(inside.tract_ids().len(), 1);
    assert!(inside.tract_ids().contains(REFERENCE_TRACT));
    assert!(inside.is_consistent());

    let reference: Vec<Tract> = tracts
        .iter()
        .filter(|t| t.id == REFERENCE_TRACT)
        .cloned()
        .collect();
    let reference_shells = build_shells(&reference).shells;
    let higher = match_tracts(
        &satellite("2", 1000.0, 47.0, 92.0),
        &reference,
        &reference_shells,
    )
    .unwrap();
    assert!(higher.is_empty());

    for altitude in [150.0, 2500.0] {
        let outside =
            match_tracts(&satellite("3", altitude, 47.0, 92.0), &tracts, &shells).unwrap();
        assert!(outside.is_empty(), "altitude {}", altitude);
    }

    for raan in [359.5, -0.5] {
        let wrapped = match_tracts(&satellite("4", 425.0, 47.0, raan), &tracts, &shells).unwrap();
        assert_eq!(wrapped.tract_ids().len(), 1);
        assert!(wrapped.tract_ids().contains("LEO-A400-I45-RAAN355_360"));
        assert!(wrapped.is_consistent());
    }

    let edge = match_tracts(&satellite("5", 450.0, 47.0, 92.0), &tracts, &shells).unwrap();
    assert!(edge.tract_ids().contains(REFERENCE_TRACT));
    assert!(edge.tract_ids().contains("LEO-A450-I45-RAAN90_95"));
}

#[test]
fn test_validation_with_random_interior_points() {
    let config = GridConfig {
        altitude_range: (400.0, 600.0),
        ..GridConfig::default()
    };
    let mut store = MemoryStore::new();
    regenerate_zone(&mut store, &config).unwrap();
    let (tracts, shells) = zone_rows(&store, OrbitZone::Leo);

    let mut rng = StdRng::seed_from_u64(7);
    let satellites: Vec<SatelliteState> = (0..200)
        .map(|i| {
            let alt_bin = rng.gen_range(0..4) as f64;
            let inc_bin = rng.gen_range(0..34) as f64;
            let raan_bin = rng.gen_range(0..72) as f64;
            satellite(
                &i.to_string(),
                400.0 + 50.0 * (alt_bin + rng.gen_range(0.1..0.9)),
                5.0 * (inc_bin + rng.gen_range(0.1..0.9)),
                5.0 * (raan_bin + rng.gen_range(0.1..0.9)),
            )
        })
        .collect();

    let report = validate_consistency(&satellites, &tracts, &shells, config.workers).unwrap();
    assert_eq!(report.evaluated, 200);
    assert_eq!(report.matches, 200);
    assert!(report.mismatches.is_empty());
    assert_abs_diff_eq!(report.match_accuracy_percent, 100.0, epsilon = 1e-9);
    assert!(report.results.iter().all(|r| r.tract_ids().len() == 1));

    let boundaries = boundary_analysis(&report.results, &tracts);
    assert_eq!(boundaries.values().sum::<usize>(), 200);
    assert!(!boundaries.contains_key(&BoundaryKind::Altitude));

    let summary = coverage(&tracts);
    assert_eq!(
        Assessment::of(report.match_accuracy_percent, summary.completeness_percent),
        Assessment::Excellent
    );
}

#[test]
fn test_edge_satellites_lower_accuracy() {
    let store = default_leo_store();
    let (tracts, shells) = zone_rows(&store, OrbitZone::Leo);

    let satellites = vec![
        satellite("interior", 425.0, 47.0, 92.0),
        satellite("inc-edge", 425.0, 50.0, 92.0),
        satellite("raan-edge", 425.0, 47.0, 95.0),
        satellite("polar", 425.0, 172.0, 92.0),
    ];
    let report = validate_consistency(&satellites, &tracts, &shells, 2).unwrap();
    assert_eq!(report.matches, 1);
    assert_eq!(report.mismatches.len(), 3);
    assert_abs_diff_eq!(report.match_accuracy_percent, 25.0, epsilon = 1e-9);
}

#[test]
fn test_json_store_regeneration_and_cleanup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracts.json");

    let leo = GridConfig {
        altitude_range: (400.0, 500.0),
        ..GridConfig::for_zone(OrbitZone::Leo)
    };
    let meo = GridConfig {
        altitude_range: (2000.0, 2100.0),
        ..GridConfig::for_zone(OrbitZone::Meo)
    };

    {
        let mut store = JsonStore::open(&path).unwrap();
        regenerate_zone(&mut store, &leo).unwrap();
        regenerate_zone(&mut store, &meo).unwrap();
    }

    let mut store = JsonStore::open(&path).unwrap();
    assert_eq!(
        store.zones().unwrap(),
        vec![OrbitZone::Leo, OrbitZone::Meo]
    );
    let tracts = store.load_tracts(OrbitZone::Leo).unwrap();
    let shells = store.load_shells(OrbitZone::Leo).unwrap();
    assert_eq!(tracts.len(), 2 * 36 * 72);
    assert_eq!(shells.len(), 2 * 34 * 72);

    let result = match_tracts(&satellite("1", 425.0, 47.0, 92.0), &tracts, &shells).unwrap();
    assert!(result.tract_ids().contains(REFERENCE_TRACT));
    assert!(result.is_consistent());

    let cleanup = retain_zone(&mut store, OrbitZone::Leo).unwrap();
    assert_eq!(cleanup.tracts_removed(), 2 * 36 * 72);

    let reopened = JsonStore::open(&path).unwrap();
    assert_eq!(reopened.zones().unwrap(), vec![OrbitZone::Leo]);
}

#[test]
fn test_invalid_config_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grid.json");
    std::fs::write(&path, r#"{"raan_bin_width": -5.0}"#).unwrap();

    assert!(matches!(
        GridConfig::from_json_file(&path),
        Err(TractError::Config(_))
    ));
}

#[test]
fn test_geodetic_round_trip() {
    let radius = EARTH_RADIUS_KM + 400.0;
    let fix = elements_to_geodetic(radius, 0.0, 0.0, 0.0, 0.0).unwrap();
    assert_abs_diff_eq!(fix.latitude, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(fix.longitude, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(fix.altitude, 400.0, epsilon = 1e-9);

    // a quarter orbit up an inclined plane reaches the inclination in latitude
    let peak = elements_to_geodetic(radius, 51.6, 0.0, 0.0, 90.0).unwrap();
    assert_abs_diff_eq!(peak.latitude, 51.6, epsilon = 1e-9);
    assert_abs_diff_eq!(peak.longitude, 90.0, epsilon = 1e-9);

    assert!(matches!(
        elements_to_geodetic(radius, 90.0, 0.0, 90.0, 0.0),
        Err(TractError::CoordinateSingularity { .. })
    ));
}

#[test]
fn test_propagated_catalog_matches_leo_tracts() {
    let text = "ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537
";
    let catalog = parse_catalog(text);
    assert!(catalog.failures.is_empty());
    let epoch = catalog.entries[0].elements().unwrap().epoch + chrono::Duration::minutes(30);

    let store = default_leo_store();
    let (tracts, shells) = zone_rows(&store, OrbitZone::Leo);

    for source in [PointSource::Elements, PointSource::LongitudeProxy] {
        let batch = propagate_catalog(&Sgp4Propagator, &catalog.entries, epoch, source);
        assert_eq!(batch.states.len(), 1);

        let result = match_tracts(&batch.states[0], &tracts, &shells).unwrap();
        assert_eq!(result.source, source);
        assert!(!result.attribute_matches.is_empty());
        assert!(result.point.inclination > 51.0 && result.point.inclination < 52.3);
    }
}

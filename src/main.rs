use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use orbital_tracts::*;

#[derive(Parser)]
#[command(name = "orbital_tracts", about = "Partition orbital space into tracts and match satellites to them")]
struct Cli {
    /// JSON store holding tracts and shells
    #[arg(long, global = true, default_value = "out/tracts.json")]
    store: PathBuf,
    /// Grid configuration file; defaults are used when absent
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the zone from the configuration
    #[arg(long, global = true)]
    zone: Option<OrbitZone>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the zone's tracts and shells with a fresh grid
    Generate,
    /// Match a satellite catalog against the stored zone
    Validate(ValidateArgs),
    /// Delete every zone except the selected one
    Cleanup,
}

#[derive(Args)]
struct ValidateArgs {
    /// Three-line TLE catalog
    #[arg(long)]
    tle: Option<PathBuf>,
    /// Number of random satellites when no catalog is given
    #[arg(long, default_value_t = 1000)]
    synthetic: usize,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Propagate the catalog with SGP4 and match on the propagated fix
    #[arg(long, requires = "tle")]
    propagate: bool,
    /// Propagation epoch (RFC 3339); defaults to now
    #[arg(long, requires = "propagate")]
    epoch: Option<DateTime<Utc>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut file = match &cli.config {
        Some(path) => GridConfigFile::read(path)?,
        None => GridConfigFile::default(),
    };
    // a range set in the file wins over the zone's default
    if cli.zone.is_some() {
        file.zone = cli.zone;
    }
    let config = file.into_config()?;

    if let Some(parent) = cli.store.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut store = JsonStore::open(&cli.store)?;
    let mut summary = RunSummary::new();

    match cli.command {
        Command::Generate => {
            let report = regenerate_zone(&mut store, &config)?;
            summary.record_regeneration(report);
            summary.record_coverage(coverage(&store.load_tracts(config.zone)?));
        }
        Command::Validate(args) => {
            let tracts = store.load_tracts(config.zone)?;
            let shells = store.load_shells(config.zone)?;
            if tracts.is_empty() {
                log::warn!("No {} tracts in {}; run generate first", config.zone, cli.store.display());
            }

            let satellites = match &args.tle {
                Some(path) if args.propagate => {
                    propagate_file(path, args.epoch.unwrap_or_else(Utc::now))?
                }
                Some(path) => load_catalog(path)?,
                None => synthetic_catalog(&config, args.synthetic, args.seed),
            };

            let report = validate_consistency(&satellites, &tracts, &shells, config.workers)?;
            let points: Vec<ParameterPoint> = report.results.iter().map(|r| r.point).collect();
            summary.record_distribution(distribution(&points));
            summary.record_boundaries(boundary_analysis(&report.results, &tracts));
            summary.record_coverage(coverage(&tracts));
            summary.record_validation(report);
        }
        Command::Cleanup => {
            let report = retain_zone(&mut store, config.zone)?;
            summary.record_cleanup(report);
        }
    }

    summary.display_data();
    Ok(())
}

fn read_catalog(path: &Path) -> Result<Vec<TwoLineElement>, TractError> {
    let text = std::fs::read_to_string(path)?;
    let catalog = parse_catalog(&text);
    for (line, reason) in &catalog.failures {
        log::warn!("Skipping catalog entry at line {}: {}", line, reason);
    }
    Ok(catalog.entries)
}

fn propagate_file(path: &Path, epoch: DateTime<Utc>) -> Result<Vec<SatelliteState>, TractError> {
    let catalog = read_catalog(path)?;
    let batch = propagate_catalog(&Sgp4Propagator, &catalog, epoch, PointSource::LongitudeProxy);
    log::info!(
        "Propagated {} of {} satellites from {} to {}",
        batch.states.len(),
        catalog.len(),
        path.display(),
        epoch
    );
    Ok(batch.states)
}

fn load_catalog(path: &Path) -> Result<Vec<SatelliteState>, TractError> {
    let catalog = read_catalog(path)?;
    let mut satellites = Vec::with_capacity(catalog.len());
    for tle in &catalog {
        match SatelliteState::from_tle(tle) {
            Ok(state) => satellites.push(state),
            Err(e) => log::warn!("Skipping {}: {}", tle.name, e),
        }
    }
    log::info!("Loaded {} satellites from {}", satellites.len(), path.display());
    Ok(satellites)
}

fn synthetic_catalog(config: &GridConfig, count: usize, seed: u64) -> Vec<SatelliteState> {
    let mut rng = StdRng::seed_from_u64(seed);
    let epoch = Utc::now();
    let (alt_min, alt_max) = config.altitude_range;
    let (inc_min, inc_max) = config.inclination_range;
    let (raan_min, raan_max) = config.raan_range;

    (0..count)
        .map(|i| {
            SatelliteState::from_elements(
                format!("SYN-{:05}", i),
                format!("SYNTHETIC {}", i),
                epoch,
                OrbitalElements {
                    altitude: rng.gen_range(alt_min..alt_max),
                    inclination: rng.gen_range(inc_min..inc_max),
                    raan: rng.gen_range(raan_min..raan_max),
                },
            )
        })
        .collect()
}

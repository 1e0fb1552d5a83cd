//! Génération des trajets et simulation SUMO

use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::config::Config;
use crate::error::PipelineError;
use crate::network::ensure_output;
use crate::tools::{ToolInvocation, ToolRunner, ToolSuite};

/// `python randomTrips.py -n <net> -b <begin> -e <end> -p <period> -o <trips>`
///
/// La période répartit `trip_count` départs sur l'horizon de simulation.
pub fn trips_invocation(
    suite: &ToolSuite,
    config: &Config,
    network: &Path,
    trips: &Path,
) -> ToolInvocation {
    ToolInvocation::new("randomTrips", &suite.python)
        .arg(&suite.random_trips)
        .opt("-n", network)
        .opt("-b", config.begin.to_string())
        .opt("-e", config.end.to_string())
        .opt("-p", config.trip_period().to_string())
        .opt("-o", trips)
}

/// `sumo -n <net> -r <trips> --fcd-output <trace> --begin <begin> --end <end>`
pub fn simulation_invocation(
    suite: &ToolSuite,
    config: &Config,
    network: &Path,
    trips: &Path,
    trace: &Path,
) -> ToolInvocation {
    ToolInvocation::new("sumo", &suite.sumo)
        .opt("-n", network)
        .opt("-r", trips)
        .opt("--fcd-output", trace)
        .opt("--begin", config.begin.to_string())
        .opt("--end", config.end.to_string())
}

/// Génère les trajets aléatoires sur le réseau final
pub fn generate_trips(
    runner: &dyn ToolRunner,
    suite: &ToolSuite,
    config: &Config,
    network: &Path,
    trips: &Path,
) -> Result<(), PipelineError> {
    let started_at = Instant::now();
    runner.run(&trips_invocation(suite, config, network, trips))?;
    ensure_output(trips, "randomTrips")?;
    info!(
        trip_count = config.trip_count,
        elapsed = ?started_at.elapsed(),
        "Generated random trips"
    );
    Ok(())
}

/// Lance la simulation et produit la trace FCD brute
pub fn simulate(
    runner: &dyn ToolRunner,
    suite: &ToolSuite,
    config: &Config,
    network: &Path,
    trips: &Path,
    trace: &Path,
) -> Result<(), PipelineError> {
    let started_at = Instant::now();
    runner.run(&simulation_invocation(suite, config, network, trips, trace))?;
    info!(
        begin = config.begin,
        end = config.end,
        elapsed = ?started_at.elapsed(),
        "Simulation finished"
    );
    Ok(())
}

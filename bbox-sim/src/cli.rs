//! Définition et implémentation des commandes CLI
//!
//! - `serve` : service HTTP (commande par défaut)
//! - `run` : une simulation locale, trace JSON écrite sur disque
//! - `convert-trace` : conversion FCD XML → JSON seule

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use crate::bbox::BoundingBox;
use crate::config::{Config, ProjectionMode, Retention};
use crate::pipeline::{Pipeline, SimulationOutcome};
use crate::report::SimulationReport;
use crate::request::{InfraType, LatLon, RoadProposal, SimulationRequest};
use crate::{server, trace};

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP service (POST /simulate, GET /health)
    Serve {
        /// Listen address (défaut : env BBOX_SIM_BIND / 127.0.0.1:5001)
        #[arg(long)]
        bind: Option<SocketAddr>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Run a single simulation and write the vehicle trace as JSON
    Run {
        /// Bounding box as lon1,lat1,lon2,lat2
        #[arg(long, allow_hyphen_values = true)]
        bbox: BoundingBox,

        /// Start of the proposed road as lat,lon
        #[arg(long, requires = "to", allow_hyphen_values = true)]
        from: Option<LatLon>,

        /// End of the proposed road as lat,lon
        #[arg(long, requires = "from", allow_hyphen_values = true)]
        to: Option<LatLon>,

        /// Infrastructure type: road, flyover, tunnel
        #[arg(long, default_value = "road")]
        infra_type: InfraType,

        /// Output JSON file
        #[arg(short, long, default_value = "trace.json")]
        output: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Convert an FCD trace (XML) to per-vehicle JSON
    ConvertTrace {
        /// Input FCD XML file
        #[arg(long = "in", default_value = "data/trace.xml")]
        input: PathBuf,

        /// Output JSON file
        #[arg(long = "out", default_value = "data/trace.json")]
        output: PathBuf,
    },
}

/// Surcharges de configuration communes
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON config file (défaut : variables d'environnement)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// SUMO installation root (défaut : env SUMO_HOME)
    #[arg(long)]
    pub sumo_home: Option<PathBuf>,

    /// Root directory for per-request artifacts
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Projection backend: auto, lite, off
    #[arg(long)]
    pub projection: Option<ProjectionMode>,

    /// Artifact retention: keep, discard, archive
    #[arg(long)]
    pub retention: Option<Retention>,
}

impl ConfigArgs {
    /// Configuration effective : arguments > fichier > environnement
    pub fn load(&self) -> Result<Config> {
        let mut config = Config::resolve(self.config.as_deref())?;
        if let Some(ref sumo_home) = self.sumo_home {
            config.sumo_home = Some(sumo_home.clone());
        }
        if let Some(ref data_dir) = self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(projection) = self.projection {
            config.projection = projection;
        }
        if let Some(retention) = self.retention {
            config.retention = retention;
        }
        Ok(config)
    }
}

/// Exécute la commande serve
pub async fn cmd_serve(args: &ConfigArgs, bind: Option<SocketAddr>) -> Result<()> {
    let mut config = args.load()?;
    if let Some(bind) = bind {
        config.bind = bind;
    }
    prepare_data_dir(&config)?;

    if config.sumo_home.is_none() {
        warn!("SUMO_HOME not set: /simulate will answer 400 until it is configured");
    }

    let bind = config.bind;
    // Le client HTTP bloquant se construit hors du runtime async
    let pipeline = tokio::task::spawn_blocking(move || Pipeline::from_config(config))
        .await
        .context("Pipeline initialisation aborted")??;

    server::serve(pipeline, bind).await
}

/// Exécute la commande run
pub async fn cmd_run(
    args: &ConfigArgs,
    bbox: BoundingBox,
    road: Option<RoadProposal>,
    output: &Path,
) -> Result<()> {
    let config = args.load()?;
    prepare_data_dir(&config)?;

    let request = SimulationRequest { bbox, road };
    let result = tokio::task::spawn_blocking(move || {
        let pipeline = Pipeline::from_config(config)?;
        Ok::<_, anyhow::Error>(pipeline.run(&request))
    })
    .await
    .context("Simulation task aborted")??;

    match result {
        Ok(SimulationOutcome::Success(trace)) => {
            trace.write_json(output)?;
            let report = SimulationReport::from_outcome(SimulationOutcome::Success(trace));
            println!("{}", report.summary());
            println!("Trace written to {}", output.display());
            Ok(())
        }
        Ok(outcome) => {
            println!("{}", SimulationReport::from_outcome(outcome).summary());
            Ok(())
        }
        Err(e) => {
            let report = SimulationReport::from_error(&e);
            if let Some(ref trace) = report.trace {
                eprintln!("{}", trace);
            }
            Err(anyhow::Error::new(e).context("Simulation failed"))
        }
    }
}

/// Exécute la commande convert-trace
pub fn cmd_convert_trace(input: &Path, output: &Path) -> Result<()> {
    let trace = trace::convert_file(input, output)?;
    info!(
        vehicles = trace.vehicle_count(),
        samples = trace.sample_count(),
        "Converted trace"
    );
    println!(
        "Converted {} -> {} ({} vehicles)",
        input.display(),
        output.display(),
        trace.vehicle_count()
    );
    Ok(())
}

/// Assemble la proposition de route depuis les arguments
pub fn road_from_args(
    from: Option<LatLon>,
    to: Option<LatLon>,
    infra_type: InfraType,
) -> Option<RoadProposal> {
    Some(RoadProposal {
        from: from?,
        to: to?,
        infra_type,
    })
}

fn prepare_data_dir(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir).context(format!(
        "Failed to create data directory {}",
        config.data_dir.display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_road_from_args() {
        let from: LatLon = "52.511,13.371".parse().unwrap();
        let to: LatLon = "52.519,13.389".parse().unwrap();

        let road = road_from_args(Some(from), Some(to), InfraType::Tunnel).unwrap();
        assert_eq!(road.from, from);
        assert_eq!(road.infra_type, InfraType::Tunnel);
        assert!(road_from_args(Some(from), None, InfraType::Road).is_none());
        assert!(road_from_args(None, None, InfraType::Road).is_none());
    }

    #[test]
    fn test_config_args_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"sumo_home": "/opt/sumo", "retention": "archive"}"#).unwrap();

        let args = ConfigArgs {
            config: Some(path),
            sumo_home: Some("/usr/share/sumo".into()),
            data_dir: Some(dir.path().join("runs")),
            projection: Some(ProjectionMode::Off),
            retention: None,
        };
        let config = args.load().unwrap();

        assert_eq!(config.sumo_home, Some(PathBuf::from("/usr/share/sumo")));
        assert_eq!(config.data_dir, dir.path().join("runs"));
        assert_eq!(config.projection, ProjectionMode::Off);
        assert_eq!(config.retention, Retention::Archive);
    }

    #[test]
    fn test_convert_trace_command() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("trace.xml");
        let output = dir.path().join("trace.json");
        std::fs::write(
            &input,
            r#"<fcd-export><timestep time="0"><vehicle id="v1" x="13.4" y="52.5"/></timestep></fcd-export>"#,
        )
        .unwrap();

        cmd_convert_trace(&input, &output).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(json["vehicles"]["v1"][0]["lat"], 52.5);
    }
}

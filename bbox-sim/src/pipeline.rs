//! Orchestration d'une requête de simulation
//!
//! Étapes séquentielles, chacune bloquante :
//! téléchargement → réseau → injection (optionnelle) → trajets → simulation
//! → conversion. La première erreur interrompt la requête et laisse le
//! répertoire de travail en place pour diagnostic.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::{error, info, info_span, warn};

use crate::config::Config;
use crate::error::PipelineError;
use crate::fetch::{ExtractSource, OverpassClient};
use crate::inject;
use crate::network;
use crate::projection::Projector;
use crate::request::SimulationRequest;
use crate::tools::{ProcessRunner, ToolRunner, ToolSuite};
use crate::trace::{self, VehicleTrace};
use crate::traffic;
use crate::workspace::RequestWorkspace;

/// Résultat d'une requête dont la simulation a tourné
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationOutcome {
    /// Trace convertie
    Success(VehicleTrace),
    /// Simulation terminée mais trace non convertible (raison)
    Warning(String),
}

/// Pipeline configuré, partagé entre requêtes
#[derive(Clone)]
pub struct Pipeline {
    config: Config,
    runner: Arc<dyn ToolRunner>,
    source: Arc<dyn ExtractSource>,
    projector: Projector,
}

impl Pipeline {
    pub fn new(
        config: Config,
        runner: Arc<dyn ToolRunner>,
        source: Arc<dyn ExtractSource>,
        projector: Projector,
    ) -> Self {
        Self {
            config,
            runner,
            source,
            projector,
        }
    }

    /// Pipeline réel : processus SUMO, Overpass, projection selon la configuration
    pub fn from_config(config: Config) -> Result<Self> {
        let source = OverpassClient::new(config.overpass_url.clone(), config.fetch_timeout())?;
        let projector = Projector::detect(config.projection);
        info!(projector = projector.describe(), "Projection backend selected");

        Ok(Self::new(
            config,
            Arc::new(ProcessRunner),
            Arc::new(source),
            projector,
        ))
    }

    /// Exécute une requête validée de bout en bout
    pub fn run(&self, request: &SimulationRequest) -> Result<SimulationOutcome, PipelineError> {
        // Précondition vérifiée avant tout effet de bord
        let suite = ToolSuite::require(self.config.sumo_home.as_deref(), &self.config.python)?;
        let workspace = RequestWorkspace::create(&self.config.data_dir)?;

        let span = info_span!("simulate", request_id = %workspace.id());
        let _guard = span.enter();
        let started_at = Instant::now();
        info!(
            bbox = %request.bbox,
            road = request.road.is_some(),
            dir = %workspace.dir().display(),
            "Starting simulation request"
        );

        let outcome = match self.run_stages(&suite, &workspace, request) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    dir = %workspace.dir().display(),
                    "Simulation request failed, artifacts kept: {}",
                    e
                );
                return Err(e);
            }
        };

        info!(elapsed = ?started_at.elapsed(), "Simulation request finished");

        if let Err(e) = workspace.finish(self.config.retention) {
            warn!("Failed to apply retention policy: {:#}", e);
        }
        Ok(outcome)
    }

    fn run_stages(
        &self,
        suite: &ToolSuite,
        workspace: &RequestWorkspace,
        request: &SimulationRequest,
    ) -> Result<SimulationOutcome, PipelineError> {
        let runner = self.runner.as_ref();

        let extract = self.source.fetch(&request.bbox)?;
        std::fs::write(workspace.osm_extract(), &extract)?;

        network::build_network(
            runner,
            suite,
            &workspace.osm_extract(),
            &workspace.base_network(),
        )?;

        match &request.road {
            Some(road) => {
                inject::inject(
                    runner,
                    suite,
                    &self.projector,
                    workspace,
                    road,
                    &request.bbox,
                )?;
            }
            None => {
                std::fs::rename(workspace.base_network(), workspace.final_network())?;
                info!("No road proposed, base network is final");
            }
        }

        traffic::generate_trips(
            runner,
            suite,
            &self.config,
            &workspace.final_network(),
            &workspace.trips(),
        )?;
        traffic::simulate(
            runner,
            suite,
            &self.config,
            &workspace.final_network(),
            &workspace.trips(),
            &workspace.raw_trace(),
        )?;

        match trace::convert_file(&workspace.raw_trace(), &workspace.trace_json()) {
            Ok(trace) => {
                info!(
                    vehicles = trace.vehicle_count(),
                    samples = trace.sample_count(),
                    "Converted FCD trace"
                );
                Ok(SimulationOutcome::Success(trace))
            }
            Err(e) => {
                warn!("Trace conversion failed: {:#}", e);
                Ok(SimulationOutcome::Warning(format!("{:#}", e)))
            }
        }
    }
}

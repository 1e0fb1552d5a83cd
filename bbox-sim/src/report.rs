//! Enveloppe de réponse d'une requête de simulation
//!
//! ```json
//! {"status": "success", "message": "Simulation generated.", "data": {"vehicles": {...}}}
//! {"status": "warning", "message": "Simulation ran but JSON conversion failed: ..."}
//! {"status": "error", "message": "...", "trace": "..."}
//! ```

use serde::Serialize;

use crate::error::PipelineError;
use crate::pipeline::SimulationOutcome;
use crate::trace::VehicleTrace;

/// Statut global de la requête
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Trace convertie et renvoyée
    Success,
    /// Simulation terminée, conversion échouée
    Warning,
    /// Requête interrompue
    Error,
}

/// Réponse de `/simulate`
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub status: ReportStatus,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<VehicleTrace>,

    /// Diagnostic complet, uniquement pour les erreurs inattendues
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,

    /// Code HTTP de la réponse
    #[serde(skip)]
    pub http_status: u16,
}

impl SimulationReport {
    /// Rapport d'une simulation terminée
    pub fn from_outcome(outcome: SimulationOutcome) -> Self {
        match outcome {
            SimulationOutcome::Success(trace) => Self {
                status: ReportStatus::Success,
                message: "Simulation generated.".to_string(),
                data: Some(trace),
                trace: None,
                http_status: 200,
            },
            SimulationOutcome::Warning(reason) => Self {
                status: ReportStatus::Warning,
                message: format!("Simulation ran but JSON conversion failed: {}", reason),
                data: None,
                trace: None,
                http_status: 200,
            },
        }
    }

    /// Rapport d'erreur ; les erreurs hors taxonomie portent leur trace
    pub fn from_error(error: &PipelineError) -> Self {
        let trace = match error {
            PipelineError::Unexpected(inner) => Some(format!("{:?}", inner)),
            other if other.is_unexpected() => Some(error_chain(other)),
            _ => None,
        };

        Self {
            status: ReportStatus::Error,
            message: error.to_string(),
            data: None,
            trace,
            http_status: error.http_status(),
        }
    }

    /// Rapport d'une tâche interrompue par un panic
    pub fn from_panic(detail: String) -> Self {
        Self {
            status: ReportStatus::Error,
            message: "Simulation task panicked".to_string(),
            data: None,
            trace: Some(detail),
            http_status: 500,
        }
    }

    /// Rapport d'un résultat de pipeline
    pub fn from_result(result: Result<SimulationOutcome, PipelineError>) -> Self {
        match result {
            Ok(outcome) => Self::from_outcome(outcome),
            Err(e) => Self::from_error(&e),
        }
    }

    /// Affichage compact pour la ligne de commande
    pub fn summary(&self) -> String {
        match &self.data {
            Some(trace) => format!(
                "{:?}: {} ({} vehicles, {} samples)",
                self.status,
                self.message,
                trace.vehicle_count(),
                trace.sample_count()
            ),
            None => format!("{:?}: {}", self.status, self.message),
        }
    }
}

/// Message et causes successives
fn error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    let mut depth = 0;
    while let Some(cause) = source {
        if depth == 0 {
            out.push_str("\n\nCaused by:");
        }
        out.push_str(&format!("\n    {}: {}", depth, cause));
        depth += 1;
        source = cause.source();
    }
    out
}

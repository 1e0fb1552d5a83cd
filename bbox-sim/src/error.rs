//! Taxonomie d'erreurs du pipeline de simulation

use thiserror::Error;

/// Erreurs pouvant interrompre une requête de simulation
///
/// Le repli de projection et l'échec de conversion de trace ne sont pas
/// des erreurs : le premier est journalisé, le second devient
/// `SimulationOutcome::Warning`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Entrée mal formée ou champ requis manquant (corrigeable par l'utilisateur)
    #[error("{0}")]
    InvalidInput(String),

    /// Suite d'outils externe non configurée
    #[error("{0}")]
    PreconditionMissing(String),

    /// Service de données cartographiques injoignable ou en erreur
    #[error("Failed to download OSM data: {0}")]
    UpstreamFetch(String),

    /// Un outil externe s'est terminé avec un code non nul
    #[error("{tool} failed ({})", describe_status(.status))]
    ExternalTool {
        tool: &'static str,
        status: Option<i32>,
    },

    /// Erreur d'I/O sur les artefacts de la requête
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Artefact SUMO illisible ou impossible à écrire
    #[error("SUMO XML error: {0}")]
    Xml(#[from] sumo_xml::SumoXmlError),

    /// Toute autre erreur inattendue
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated without exit status".to_string(),
    }
}

impl PipelineError {
    /// Crée une erreur d'entrée invalide
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Code HTTP associé
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput(_) | Self::PreconditionMissing(_) => 400,
            Self::UpstreamFetch(_)
            | Self::ExternalTool { .. }
            | Self::Io(_)
            | Self::Xml(_)
            | Self::Unexpected(_) => 500,
        }
    }

    /// Erreur hors taxonomie : la réponse porte une trace de diagnostic
    pub fn is_unexpected(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Xml(_) | Self::Unexpected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(PipelineError::invalid_input("bbox is required").http_status(), 400);
        assert_eq!(
            PipelineError::PreconditionMissing("SUMO_HOME not set".into()).http_status(),
            400
        );
        assert_eq!(PipelineError::UpstreamFetch("timeout".into()).http_status(), 500);
        assert_eq!(
            PipelineError::ExternalTool {
                tool: "netconvert",
                status: Some(1)
            }
            .http_status(),
            500
        );
        assert_eq!(
            PipelineError::Unexpected(anyhow::anyhow!("boom")).http_status(),
            500
        );
    }

    #[test]
    fn test_external_tool_message() {
        let err = PipelineError::ExternalTool {
            tool: "netconvert",
            status: Some(1),
        };
        assert_eq!(err.to_string(), "netconvert failed (exit status 1)");

        let err = PipelineError::ExternalTool {
            tool: "sumo",
            status: None,
        };
        assert_eq!(err.to_string(), "sumo failed (terminated without exit status)");
    }

    #[test]
    fn test_unexpected_flag() {
        assert!(PipelineError::Unexpected(anyhow::anyhow!("boom")).is_unexpected());
        assert!(!PipelineError::invalid_input("x").is_unexpected());
    }
}

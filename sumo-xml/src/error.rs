//! Types d'erreurs pour le crate sumo-xml

use thiserror::Error;

/// Erreurs pouvant survenir lors de la lecture/écriture des fichiers SUMO
#[derive(Debug, Error)]
pub enum SumoXmlError {
    /// Erreur d'I/O lors de la lecture ou de l'écriture
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Contenu non UTF-8
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(String),

    /// Erreur de parsing d'un document
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// Attribut numérique illisible
    #[error("Invalid number for attribute '{attribute}' on <{element}>: {value}")]
    InvalidNumber {
        element: String,
        attribute: String,
        value: String,
    },
}

impl SumoXmlError {
    /// Crée une erreur de parsing avec contexte
    pub fn parse_error(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de nombre invalide
    pub fn invalid_number(
        element: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidNumber {
            element: element.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

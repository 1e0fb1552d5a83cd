//! # sumo-xml
//!
//! Lecture et écriture des fichiers XML échangés avec la suite SUMO.
//!
//! ## Features
//!
//! - Scanner de balises sans allocation basé sur `memchr`
//! - Validation UTF-8 SIMD avec `simdutf8`, nombres via `fast-float`
//! - Métadonnées de projection d'un réseau (`<location>`)
//! - Traces FCD (`<timestep>` / `<vehicle>`)
//! - Fichiers plain XML de noeuds et d'arêtes pour netconvert
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::path::Path;
//!
//! let location = sumo_xml::read_location(Path::new("base.net.xml"))?;
//! if let Some(proj) = location.and_then(|l| l.proj_parameter) {
//!     println!("Projection: {}", proj);
//! }
//!
//! for step in sumo_xml::read_fcd(Path::new("trace.xml"))? {
//!     println!("t={} : {} véhicules", step.time, step.vehicles.len());
//! }
//! ```

pub mod attr;
pub mod error;
pub mod fcd;
pub mod net;
pub mod plain;

pub use error::SumoXmlError;
pub use fcd::{Timestep, VehicleRecord};
pub use net::Location;
pub use plain::{PlainEdge, PlainNode};

use std::path::Path;

/// Lit l'élément `<location>` d'un fichier réseau
pub fn read_location(path: &Path) -> Result<Option<Location>, SumoXmlError> {
    let data = std::fs::read(path)?;
    net::parse_location(&data).map_err(|e| with_file(e, path))
}

/// Lit une trace FCD depuis un fichier
pub fn read_fcd(path: &Path) -> Result<Vec<Timestep>, SumoXmlError> {
    let data = std::fs::read(path)?;
    fcd::parse(&data).map_err(|e| with_file(e, path))
}

/// Remplace le nom logique du document par le chemin réel
fn with_file(error: SumoXmlError, path: &Path) -> SumoXmlError {
    match error {
        SumoXmlError::ParseError { reason, .. } => SumoXmlError::ParseError {
            file: path.display().to_string(),
            reason,
        },
        SumoXmlError::InvalidUtf8(_) => SumoXmlError::InvalidUtf8(path.display().to_string()),
        other => other,
    }
}

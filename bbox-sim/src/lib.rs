//! # bbox-sim
//!
//! Transforme une emprise géographique en trace de véhicules jouable, en
//! orchestrant la suite SUMO, avec injection optionnelle d'une route proposée.
//!
//! ## Features
//!
//! - Extraction OSM via Overpass, réseau netconvert, trajets randomTrips, simulation sumo
//! - Injection de route (route, pont, tunnel) projetée dans le système du réseau
//! - Projection PROJ (feature `reproject`) ou légère en Rust pur
//! - Répertoire de travail isolé par requête, conservé, supprimé ou archivé
//! - Service HTTP et CLI
//!
//! ## Usage CLI
//!
//! ```bash
//! # Service HTTP sur 127.0.0.1:5001
//! SUMO_HOME=/usr/share/sumo bbox-sim serve
//!
//! # Simulation locale avec un pont proposé
//! bbox-sim run --bbox 13.37,52.51,13.39,52.52 \
//!     --from 52.511,13.371 --to 52.519,13.389 --infra-type flyover --output trace.json
//!
//! # Conversion seule d'une trace FCD
//! bbox-sim convert-trace --in data/trace.xml --out data/trace.json
//! ```

pub mod bbox;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod inject;
pub mod network;
pub mod pipeline;
pub mod projection;
pub mod report;
pub mod reproject_lite;
pub mod request;
pub mod server;
pub mod tools;
pub mod trace;
pub mod traffic;
pub mod workspace;

#[cfg(feature = "reproject")]
pub mod reproject;

pub use bbox::BoundingBox;
pub use config::Config;
pub use error::PipelineError;
pub use pipeline::{Pipeline, SimulationOutcome};
pub use report::{ReportStatus, SimulationReport};
pub use request::{InfraType, RoadProposal, SimulationRequest};
pub use trace::VehicleTrace;

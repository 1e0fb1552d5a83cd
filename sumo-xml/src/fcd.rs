//! Parser pour les traces FCD (floating car data) de SUMO
//!
//! Format :
//!
//! ```xml
//! <fcd-export>
//!     <timestep time="0.00">
//!         <vehicle id="veh0" x="13.40" y="52.50" angle="90.00" speed="0.00"/>
//!     </timestep>
//! </fcd-export>
//! ```

use crate::attr::{tags, StartTag, Tag};
use crate::SumoXmlError;

/// Un pas de temps avec les positions de véhicules
#[derive(Debug, Clone, PartialEq)]
pub struct Timestep {
    /// Temps de simulation (secondes)
    pub time: f64,

    /// Enregistrements dans l'ordre du document
    pub vehicles: Vec<VehicleRecord>,
}

/// Position d'un véhicule ; chaque champ peut manquer dans le document
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub id: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl VehicleRecord {
    /// Retourne (id, x, y) si l'enregistrement est complet
    pub fn complete(&self) -> Option<(&str, f64, f64)> {
        Some((self.id.as_deref()?, self.x?, self.y?))
    }
}

/// Parse une trace FCD complète
///
/// Les enregistrements hors `<timestep>` et les éléments autres que
/// `<vehicle>` (piétons, conteneurs) sont ignorés.
pub fn parse(data: &[u8]) -> Result<Vec<Timestep>, SumoXmlError> {
    let text = simdutf8::basic::from_utf8(data)
        .map_err(|_| SumoXmlError::InvalidUtf8("fcd".into()))?;

    let mut timesteps: Vec<Timestep> = Vec::new();
    let mut open = false;

    let mut scanner = tags(text);
    for tag in scanner.by_ref() {
        match tag {
            Tag::Start(start) if start.name == "timestep" => {
                let time = parse_number(&start, "time")?.unwrap_or(0.0);
                timesteps.push(Timestep {
                    time,
                    vehicles: Vec::new(),
                });
                open = !start.self_closing;
            }
            Tag::End("timestep") => open = false,
            Tag::Start(start) if start.name == "vehicle" && open => {
                let record = VehicleRecord {
                    id: start.attr("id").map(|id| id.into_owned()),
                    x: parse_number(&start, "x")?,
                    y: parse_number(&start, "y")?,
                };
                if let Some(current) = timesteps.last_mut() {
                    current.vehicles.push(record);
                }
            }
            _ => {}
        }
    }

    if scanner.truncated() {
        return Err(SumoXmlError::parse_error("fcd", "document ends inside a tag"));
    }

    tracing::debug!(timesteps = timesteps.len(), "Parsed FCD trace");

    Ok(timesteps)
}

/// Lit un attribut numérique optionnel
fn parse_number(tag: &StartTag<'_>, attribute: &str) -> Result<Option<f64>, SumoXmlError> {
    let Some(raw) = tag.attr(attribute) else {
        return Ok(None);
    };
    fast_float::parse::<f64, _>(raw.trim())
        .map(Some)
        .map_err(|_| SumoXmlError::invalid_number(tag.name, attribute, raw.as_ref()))
}

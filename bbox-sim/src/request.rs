//! Requête de simulation : emprise + proposition de route optionnelle

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bbox::BoundingBox;
use crate::error::PipelineError;

/// Type d'infrastructure injectée
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InfraType {
    /// Route simple (défaut)
    #[default]
    Road,
    /// Pont / passage supérieur
    Flyover,
    /// Tunnel
    Tunnel,
}

impl InfraType {
    /// Valeur exacte attendue ; inconnue, absente ou mal cassée : `Road`
    pub fn from_lenient(value: Option<&str>) -> Self {
        match value {
            Some("flyover") => Self::Flyover,
            Some("tunnel") => Self::Tunnel,
            _ => Self::Road,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Road => "road",
            Self::Flyover => "flyover",
            Self::Tunnel => "tunnel",
        }
    }
}

impl FromStr for InfraType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "road" => Ok(Self::Road),
            "flyover" => Ok(Self::Flyover),
            "tunnel" => Ok(Self::Tunnel),
            _ => Err(format!(
                "Invalid infrastructure type: {}. Use: road, flyover, tunnel",
                s
            )),
        }
    }
}

impl fmt::Display for InfraType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point géographique en degrés
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl FromStr for LatLon {
    type Err = PipelineError;

    /// Parse `lat,lon`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PipelineError::invalid_input(format!("Invalid point '{}'. Expected lat,lon", s));
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
        if !lat.is_finite() || !lon.is_finite() {
            return Err(invalid());
        }
        Ok(Self { lat, lon })
    }
}

/// Segment proposé par l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoadProposal {
    pub from: LatLon,
    pub to: LatLon,
    pub infra_type: InfraType,
}

/// Requête validée
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    pub bbox: BoundingBox,
    pub road: Option<RoadProposal>,
}

impl SimulationRequest {
    /// Valide le corps JSON d'une requête `/simulate`
    ///
    /// ```json
    /// {"bbox": [lon1, lat1, lon2, lat2],
    ///  "new_road": {"from": [lat, lon], "to": [lat, lon]},
    ///  "infra_type": "road"}
    /// ```
    pub fn from_json(body: &Value) -> Result<Self, PipelineError> {
        let bbox = match body.get("bbox") {
            None => return Err(PipelineError::invalid_input("bbox is required")),
            Some(value) if is_blank(value) => {
                return Err(PipelineError::invalid_input("bbox is required"));
            }
            Some(Value::Array(items)) => {
                let values = items
                    .iter()
                    .map(coerce_number)
                    .collect::<Option<Vec<f64>>>()
                    .ok_or_else(|| {
                        PipelineError::invalid_input(
                            "Invalid bbox format. Expected [lon1, lat1, lon2, lat2]",
                        )
                    })?;
                BoundingBox::normalize(&values)?
            }
            Some(_) => {
                return Err(PipelineError::invalid_input(
                    "Invalid bbox format. Expected [lon1, lat1, lon2, lat2]",
                ));
            }
        };

        let infra_type = InfraType::from_lenient(body.get("infra_type").and_then(Value::as_str));

        let road = match body.get("new_road") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(Value::Object(map)) => Some(RoadProposal {
                from: parse_point(map.get("from"), "from")?,
                to: parse_point(map.get("to"), "to")?,
                infra_type,
            }),
            Some(_) => {
                return Err(PipelineError::invalid_input(
                    "Invalid new_road format. Expected {\"from\": [lat, lon], \"to\": [lat, lon]}",
                ));
            }
        };

        Ok(Self { bbox, road })
    }
}

/// Valeur vide au sens JSON lâche : `null`, `[]`, `{}`, `""`, `false`, `0`
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Nombre JSON ou chaîne numérique
fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn parse_point(value: Option<&Value>, field: &str) -> Result<LatLon, PipelineError> {
    let invalid =
        || PipelineError::invalid_input(format!("Invalid new_road.{}. Expected [lat, lon]", field));

    let Some(Value::Array(items)) = value else {
        return Err(invalid());
    };
    let [lat, lon] = items.as_slice() else {
        return Err(invalid());
    };

    Ok(LatLon {
        lat: coerce_number(lat).ok_or_else(invalid)?,
        lon: coerce_number(lon).ok_or_else(invalid)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_request() {
        let req = SimulationRequest::from_json(&json!({"bbox": [13.39, 52.52, 13.37, 52.51]})).unwrap();
        assert_eq!(req.bbox, BoundingBox::from_corners(13.37, 52.51, 13.39, 52.52));
        assert!(req.road.is_none());
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let req =
            SimulationRequest::from_json(&json!({"bbox": ["13.37", "52.51", 13.39, "52.52"]})).unwrap();
        assert_eq!(req.bbox.east, 13.39);
    }

    #[test]
    fn test_missing_bbox() {
        let err = SimulationRequest::from_json(&json!({})).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(ref m) if m == "bbox is required"));
        for body in [
            json!({"bbox": null}),
            json!({"bbox": []}),
            json!({"bbox": ""}),
            json!({"bbox": {}}),
        ] {
            let err = SimulationRequest::from_json(&body).unwrap_err();
            assert!(
                matches!(err, PipelineError::InvalidInput(ref m) if m == "bbox is required"),
                "{}",
                body
            );
        }
    }

    #[test]
    fn test_malformed_bbox() {
        for body in [
            json!({"bbox": [1, 2, 3]}),
            json!({"bbox": [1, 2, 3, "north"]}),
            json!({"bbox": [1, 2, 3, true]}),
            json!({"bbox": "1,2,3,4"}),
            json!({"bbox": [1, 2, 3, 4, 5]}),
        ] {
            let err = SimulationRequest::from_json(&body).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidInput(_)), "{}", body);
            assert_eq!(err.http_status(), 400);
        }
    }

    #[test]
    fn test_road_proposal() {
        let req = SimulationRequest::from_json(&json!({
            "bbox": [13.37, 52.51, 13.39, 52.52],
            "new_road": {"from": [52.511, 13.371], "to": [52.519, 13.389]},
            "infra_type": "flyover"
        }))
        .unwrap();

        let road = req.road.unwrap();
        assert_eq!(road.from, LatLon { lat: 52.511, lon: 13.371 });
        assert_eq!(road.to, LatLon { lat: 52.519, lon: 13.389 });
        assert_eq!(road.infra_type, InfraType::Flyover);
    }

    #[test]
    fn test_unknown_infra_type_defaults_to_road() {
        let req = SimulationRequest::from_json(&json!({
            "bbox": [0, 0, 1, 1],
            "new_road": {"from": [0.1, 0.1], "to": [0.2, 0.2]},
            "infra_type": "bridge"
        }))
        .unwrap();
        assert_eq!(req.road.unwrap().infra_type, InfraType::Road);
    }

    #[test]
    fn test_infra_type_is_case_sensitive_in_body() {
        for value in ["Flyover", "TUNNEL", " tunnel"] {
            let req = SimulationRequest::from_json(&json!({
                "bbox": [0, 0, 1, 1],
                "new_road": {"from": [0.1, 0.1], "to": [0.2, 0.2]},
                "infra_type": value
            }))
            .unwrap();
            assert_eq!(req.road.unwrap().infra_type, InfraType::Road, "{}", value);
        }
        assert_eq!(InfraType::from_lenient(Some("flyover")), InfraType::Flyover);
        assert_eq!(InfraType::from_lenient(Some("tunnel")), InfraType::Tunnel);
    }

    #[test]
    fn test_empty_new_road_is_absent() {
        let req = SimulationRequest::from_json(&json!({"bbox": [0, 0, 1, 1], "new_road": {}})).unwrap();
        assert!(req.road.is_none());
    }

    #[test]
    fn test_malformed_new_road() {
        for road in [
            json!({"from": [52.5]}),
            json!({"from": [52.5, 13.4]}),
            json!({"from": [52.5, 13.4], "to": "52.6,13.5"}),
            json!([52.5, 13.4]),
        ] {
            let body = json!({"bbox": [0, 0, 1, 1], "new_road": road});
            assert!(matches!(
                SimulationRequest::from_json(&body),
                Err(PipelineError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_infra_type_from_str() {
        assert_eq!("Tunnel".parse::<InfraType>().unwrap(), InfraType::Tunnel);
        assert!("viaduct".parse::<InfraType>().is_err());
        assert_eq!(InfraType::from_lenient(None), InfraType::Road);
    }

    #[test]
    fn test_latlon_from_str() {
        let p: LatLon = "52.5, 13.4".parse().unwrap();
        assert_eq!(p, LatLon { lat: 52.5, lon: 13.4 });
        assert!("52.5".parse::<LatLon>().is_err());
        assert!("north,13.4".parse::<LatLon>().is_err());
    }
}

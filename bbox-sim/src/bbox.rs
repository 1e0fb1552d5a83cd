//! Normalisation de l'emprise géographique

use std::fmt;
use std::str::FromStr;

use geo::{Coord, Intersects, Rect};
use serde::Serialize;

use crate::error::PipelineError;

const INVALID_FORMAT: &str = "Invalid bbox format. Expected [lon1, lat1, lon2, lat2]";

/// Emprise canonique en degrés (west ≤ east, south ≤ north)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    /// Construit l'emprise depuis deux coins quelconques (lon, lat)
    pub fn from_corners(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Self {
        Self {
            west: lon1.min(lon2),
            south: lat1.min(lat2),
            east: lon1.max(lon2),
            north: lat1.max(lat2),
        }
    }

    /// Normalise `[lon1, lat1, lon2, lat2]`
    pub fn normalize(values: &[f64]) -> Result<Self, PipelineError> {
        let &[lon1, lat1, lon2, lat2] = values else {
            return Err(PipelineError::invalid_input(INVALID_FORMAT));
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PipelineError::invalid_input(INVALID_FORMAT));
        }
        Ok(Self::from_corners(lon1, lat1, lon2, lat2))
    }

    /// Paramètre `bbox=` attendu par l'API Overpass (west,south,east,north)
    pub fn to_query_param(&self) -> String {
        format!("{},{},{},{}", self.west, self.south, self.east, self.north)
    }

    /// Rectangle `geo` équivalent (x = lon, y = lat)
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.west,
                y: self.south,
            },
            Coord {
                x: self.east,
                y: self.north,
            },
        )
    }

    /// Le point (lon, lat) est-il dans l'emprise (bords inclus) ?
    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.to_rect().intersects(&Coord { x: lon, y: lat })
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_query_param())
    }
}

/// Parse `lon1,lat1,lon2,lat2` (ligne de commande)
impl FromStr for BoundingBox {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<f64> = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| PipelineError::invalid_input(INVALID_FORMAT))?;
        Self::normalize(&values)
    }
}

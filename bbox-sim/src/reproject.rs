//! Projection de points avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject`.

use anyhow::{Context, Result};
use proj::Proj;

/// Transformation WGS84 géographique → définition proj4 du réseau
pub struct Reprojector {
    proj: Proj,
    target: String,
}

impl Reprojector {
    /// Crée la transformation `EPSG:4326 → definition`
    pub fn new(definition: &str) -> Result<Self> {
        let proj = Proj::new_known_crs("EPSG:4326", definition, None).context(format!(
            "Failed to create projection from EPSG:4326 to {}",
            definition
        ))?;

        Ok(Self {
            proj,
            target: definition.to_string(),
        })
    }

    /// Transforme un point (lon, lat) en degrés
    pub fn transform_point(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let (x, y) = self
            .proj
            .convert((lon, lat))
            .context(format!("Failed to project ({}, {}) to {}", lon, lat, self.target))?;

        if !x.is_finite() || !y.is_finite() {
            anyhow::bail!("Projection of ({}, {}) is not finite", lon, lat);
        }
        Ok((x, y))
    }
}

//! Projection légère en Rust pur (sans dépendances externes)
//!
//! Couvre les définitions proj4 que netconvert écrit dans `projParameter` :
//! - `+proj=utm +zone=N [+south]` (zone choisie automatiquement, cas courant)
//! - `+proj=tmerc` (lon_0, lat_0, k, x_0, y_0)
//! - `+proj=merc` sphérique (`+a=6378137 +b=6378137`, Web Mercator) ou WGS84
//! - `+proj=longlat` / `latlong` (pas de projection)
//!
//! Source toujours WGS84 géographique (lon, lat en degrés).

mod ellipsoid;
mod mercator;
mod utm;

use std::collections::HashMap;

use anyhow::{bail, Context, Result};

pub use ellipsoid::WGS84;
pub use mercator::Mercator;
pub use utm::TransverseMercator;

/// Point en coordonnées géographiques (radians)
#[derive(Debug, Clone, Copy)]
pub struct Geographic {
    /// Longitude en radians
    pub lon: f64,
    /// Latitude en radians
    pub lat: f64,
}

impl Geographic {
    /// Crée depuis des degrés
    pub fn from_degrees(lon_deg: f64, lat_deg: f64) -> Self {
        Self {
            lon: lon_deg.to_radians(),
            lat: lat_deg.to_radians(),
        }
    }
}

/// Définition proj4 interprétée
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjDefinition {
    /// Géographique, identité
    LongLat,
    TransverseMercator(TransverseMercator),
    Mercator(Mercator),
}

impl ProjDefinition {
    /// Parse une chaîne proj4 (`+proj=utm +zone=33 +ellps=WGS84 +units=m +no_defs`)
    pub fn parse(definition: &str) -> Result<Self> {
        let params = Proj4Params::parse(definition)?;

        if let Some(ellps) = params.value("ellps").or_else(|| params.value("datum")) {
            if !ellipsoid::is_wgs84_compatible(ellps) {
                bail!("Ellipsoïde non supporté: {}", ellps);
            }
        }
        if let Some(units) = params.value("units") {
            if units != "m" {
                bail!("Unité non supportée: {}", units);
            }
        }

        let proj = params
            .value("proj")
            .context("Paramètre +proj absent de la définition")?;

        match proj {
            "longlat" | "latlong" | "lonlat" | "latlon" => Ok(Self::LongLat),
            "utm" => {
                let zone: u32 = params
                    .value("zone")
                    .context("Paramètre +zone absent pour +proj=utm")?
                    .parse()
                    .context("Paramètre +zone invalide")?;
                Ok(Self::TransverseMercator(TransverseMercator::utm(
                    zone,
                    params.flag("south"),
                )?))
            }
            "tmerc" => Ok(Self::TransverseMercator(TransverseMercator {
                lon0: params.f64_or("lon_0", 0.0)?.to_radians(),
                lat0: params.f64_or("lat_0", 0.0)?.to_radians(),
                k0: params.scale_factor()?,
                x0: params.f64_or("x_0", 0.0)?,
                y0: params.f64_or("y_0", 0.0)?,
            })),
            "merc" | "webmerc" => {
                let spherical = proj == "webmerc" || params.is_spherical()?;
                let radius = params.f64_or("a", WGS84::A)?;
                if (radius - WGS84::A).abs() > 1e-3 {
                    bail!("Rayon de sphère non supporté: {}", radius);
                }
                let k0 = match params.value("lat_ts") {
                    Some(_) => Mercator::scale_from_lat_ts(
                        params.f64_or("lat_ts", 0.0)?.to_radians(),
                        spherical,
                    ),
                    None => params.scale_factor()?,
                };
                Ok(Self::Mercator(Mercator {
                    lon0: params.f64_or("lon_0", 0.0)?.to_radians(),
                    k0,
                    x0: params.f64_or("x_0", 0.0)?,
                    y0: params.f64_or("y_0", 0.0)?,
                    spherical,
                }))
            }
            other => bail!(
                "Projection +proj={} non supportée. Supportées (reproject_lite): utm, tmerc, merc, longlat.\n\
                 Pour d'autres projections, compilez avec: cargo build --features reproject",
                other
            ),
        }
    }
}

/// Paramètres `+clé=valeur` / `+drapeau` d'une chaîne proj4
struct Proj4Params<'a> {
    entries: HashMap<&'a str, Option<&'a str>>,
}

impl<'a> Proj4Params<'a> {
    fn parse(definition: &'a str) -> Result<Self> {
        let mut entries = HashMap::new();
        for token in definition.split_whitespace() {
            let Some(token) = token.strip_prefix('+') else {
                bail!("Jeton proj4 invalide: {}", token);
            };
            match token.split_once('=') {
                Some((key, value)) => entries.insert(key, Some(value)),
                None => entries.insert(token, None),
            };
        }
        if entries.is_empty() {
            bail!("Définition de projection vide");
        }
        Ok(Self { entries })
    }

    fn value(&self, key: &str) -> Option<&'a str> {
        self.entries.get(key).copied().flatten()
    }

    fn flag(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn f64_or(&self, key: &str, default: f64) -> Result<f64> {
        match self.value(key) {
            Some(v) => v
                .parse()
                .with_context(|| format!("Paramètre +{}={} invalide", key, v)),
            None => Ok(default),
        }
    }

    fn scale_factor(&self) -> Result<f64> {
        match self.value("k_0") {
            Some(_) => self.f64_or("k_0", 1.0),
            None => self.f64_or("k", 1.0),
        }
    }

    /// `+a` et `+b` égaux, ou `+R`
    fn is_spherical(&self) -> Result<bool> {
        if self.flag("R") {
            return Ok(true);
        }
        match (self.value("a"), self.value("b")) {
            (Some(_), Some(_)) => Ok(self.f64_or("a", 0.0)? == self.f64_or("b", 0.0)?),
            _ => Ok(false),
        }
    }
}

/// Projection légère WGS84 → système local du réseau
#[derive(Debug, Clone, Copy)]
pub struct ReprojectorLite {
    definition: ProjDefinition,
}

impl ReprojectorLite {
    /// Crée un projecteur depuis une définition proj4
    pub fn new(definition: &str) -> Result<Self> {
        Ok(Self {
            definition: ProjDefinition::parse(definition)?,
        })
    }

    /// Transforme un point (lon, lat) en degrés vers (x, y)
    pub fn transform_point(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        if !lon.is_finite() || !(-90.0..=90.0).contains(&lat) {
            bail!("Coordonnées hors domaine: lon={}, lat={}", lon, lat);
        }

        let geo = Geographic::from_degrees(lon, lat);
        let (x, y) = match &self.definition {
            ProjDefinition::LongLat => (lon, lat),
            ProjDefinition::TransverseMercator(tm) => tm.forward(geo),
            ProjDefinition::Mercator(merc) => merc.forward(geo),
        };

        if !x.is_finite() || !y.is_finite() {
            bail!("Projection non définie pour lon={}, lat={}", lon, lat);
        }
        Ok((x, y))
    }
}

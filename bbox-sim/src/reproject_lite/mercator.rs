//! Projection Mercator
//!
//! Deux variantes : sphérique (Web Mercator, EPSG:3857, `+a=+b`) et
//! ellipsoïdale WGS84 (`+proj=merc +ellps=WGS84`).

use super::ellipsoid::WGS84;
use super::Geographic;
use std::f64::consts::FRAC_PI_4;

/// Latitude limite du Web Mercator
const WEB_MERCATOR_MAX_LAT: f64 = 85.06;

/// Paramètres d'une projection Mercator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mercator {
    /// Méridien central (radians)
    pub lon0: f64,
    /// Facteur d'échelle
    pub k0: f64,
    pub x0: f64,
    pub y0: f64,
    /// Modèle sphérique de rayon `A`
    pub spherical: bool,
}

impl Mercator {
    /// Web Mercator (EPSG:3857)
    pub fn web() -> Self {
        Self {
            lon0: 0.0,
            k0: 1.0,
            x0: 0.0,
            y0: 0.0,
            spherical: true,
        }
    }

    /// Facteur d'échelle déduit d'une latitude de vraie échelle (`+lat_ts`)
    pub fn scale_from_lat_ts(lat_ts: f64, spherical: bool) -> f64 {
        if spherical {
            lat_ts.cos()
        } else {
            lat_ts.cos() / (1.0 - WGS84::E2 * lat_ts.sin().powi(2)).sqrt()
        }
    }

    /// Coordonnées géographiques → (x, y) en mètres
    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let r = WGS84::A * self.k0;
        let x = r * (geo.lon - self.lon0) + self.x0;

        let y = if self.spherical {
            // Limiter la latitude pour éviter l'infini
            let lat = geo.lat.clamp(
                -WEB_MERCATOR_MAX_LAT.to_radians(),
                WEB_MERCATOR_MAX_LAT.to_radians(),
            );
            r * (FRAC_PI_4 + lat / 2.0).tan().ln()
        } else {
            let e = WGS84::E;
            let es = e * geo.lat.sin();
            r * ((FRAC_PI_4 + geo.lat / 2.0).tan() * ((1.0 - es) / (1.0 + es)).powf(e / 2.0)).ln()
        };

        (x, y + self.y0)
    }
}

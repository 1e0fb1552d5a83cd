//! Projection Transverse Mercator (UTM et `+proj=tmerc`)
//!
//! Séries de Snyder sur l'ellipsoïde WGS84, précision sub-métrique dans
//! une zone UTM.

use super::ellipsoid::WGS84;
use super::Geographic;
use anyhow::{bail, Result};

/// Paramètres d'une Transverse Mercator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransverseMercator {
    /// Méridien central (radians)
    pub lon0: f64,
    /// Latitude d'origine (radians)
    pub lat0: f64,
    /// Facteur d'échelle
    pub k0: f64,
    /// False easting
    pub x0: f64,
    /// False northing
    pub y0: f64,
}

impl TransverseMercator {
    /// Zone UTM (1..=60), hémisphère sud si `south`
    pub fn utm(zone: u32, south: bool) -> Result<Self> {
        if !(1..=60).contains(&zone) {
            bail!("Zone UTM invalide: {}", zone);
        }
        Ok(Self {
            lon0: ((zone as f64 - 1.0) * 6.0 - 180.0 + 3.0).to_radians(),
            lat0: 0.0,
            k0: 0.9996,
            x0: 500000.0,
            y0: if south { 10000000.0 } else { 0.0 },
        })
    }

    /// Coordonnées géographiques WGS84 → (x, y) en mètres
    pub fn forward(&self, geo: Geographic) -> (f64, f64) {
        let a = WGS84::A;
        let e2 = WGS84::E2;
        let ep2 = WGS84::EP2;

        let phi = geo.lat;
        let sin_phi = phi.sin();
        let cos_phi = phi.cos();
        let tan_phi = phi.tan();

        let n = a / (1.0 - e2 * sin_phi.powi(2)).sqrt();
        let t = tan_phi.powi(2);
        let c = ep2 * cos_phi.powi(2);
        let big_a = cos_phi * (geo.lon - self.lon0);

        let m = meridian_arc(phi);
        let m0 = meridian_arc(self.lat0);

        let x = self.k0
            * n
            * (big_a
                + (1.0 - t + c) * big_a.powi(3) / 6.0
                + (5.0 - 18.0 * t + t.powi(2) + 72.0 * c - 58.0 * ep2) * big_a.powi(5) / 120.0)
            + self.x0;

        let y = self.k0
            * (m - m0
                + n * tan_phi
                    * (big_a.powi(2) / 2.0
                        + (5.0 - t + 9.0 * c + 4.0 * c.powi(2)) * big_a.powi(4) / 24.0
                        + (61.0 - 58.0 * t + t.powi(2) + 600.0 * c - 330.0 * ep2)
                            * big_a.powi(6)
                            / 720.0))
            + self.y0;

        (x, y)
    }
}

/// Longueur de l'arc de méridien depuis l'équateur
fn meridian_arc(phi: f64) -> f64 {
    let e2 = WGS84::E2;
    WGS84::A
        * ((1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0) * phi
            - (3.0 * e2 / 8.0 + 3.0 * e2.powi(2) / 32.0 + 45.0 * e2.powi(3) / 1024.0)
                * (2.0 * phi).sin()
            + (15.0 * e2.powi(2) / 256.0 + 45.0 * e2.powi(3) / 1024.0) * (4.0 * phi).sin()
            - (35.0 * e2.powi(3) / 3072.0) * (6.0 * phi).sin())
}

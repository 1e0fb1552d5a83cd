//! Définitions des ellipsoïdes

/// Ellipsoïde WGS84
pub struct WGS84;

impl WGS84 {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub const A: f64 = 6378137.0;

    /// Aplatissement
    pub const F: f64 = 1.0 / 298.257223563;

    /// Première excentricité au carré
    pub const E2: f64 = 2.0 * Self::F - Self::F * Self::F;

    /// Première excentricité
    pub const E: f64 = 0.0818191908426215; // sqrt(E2)

    /// Deuxième excentricité au carré
    pub const EP2: f64 = Self::E2 / (1.0 - Self::E2);
}

/// Accepté comme WGS84 : GRS80 en diffère de moins de 0.1 mm
pub fn is_wgs84_compatible(name: &str) -> bool {
    matches!(name.to_ascii_uppercase().as_str(), "WGS84" | "GRS80")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eccentricity_consistent() {
        assert!((WGS84::E * WGS84::E - WGS84::E2).abs() < 1e-15);
    }

    #[test]
    fn test_compatible_names() {
        assert!(is_wgs84_compatible("WGS84"));
        assert!(is_wgs84_compatible("grs80"));
        assert!(!is_wgs84_compatible("intl"));
    }
}

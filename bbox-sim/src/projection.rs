//! Projection des points injectés : capacité choisie au démarrage
//!
//! Trois backends : PROJ (feature `reproject`), implémentation légère en Rust
//! pur, ou coordonnées brutes. Toute erreur de projection dégrade vers les
//! coordonnées brutes (lon, lat) sans interrompre la requête.

use anyhow::Result;
use tracing::warn;

use crate::config::ProjectionMode;
use crate::reproject_lite::ReprojectorLite;

/// Point dans le système plan du réseau
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
}

/// Backend de projection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projector {
    /// Reprojection via PROJ (si feature activée)
    #[cfg(feature = "reproject")]
    Proj,
    /// Projection légère (pure Rust)
    Lite,
    /// Pas de projection : (x, y) = (lon, lat)
    PassThrough,
}

impl Projector {
    /// Sélectionne le backend selon la configuration et les features compilées
    pub fn detect(mode: ProjectionMode) -> Self {
        match mode {
            ProjectionMode::Off => Self::PassThrough,
            ProjectionMode::Lite => Self::Lite,
            #[cfg(feature = "reproject")]
            ProjectionMode::Auto => Self::Proj,
            #[cfg(not(feature = "reproject"))]
            ProjectionMode::Auto => Self::Lite,
        }
    }

    /// Retourne une description du backend utilisé
    pub fn describe(&self) -> &'static str {
        match self {
            #[cfg(feature = "reproject")]
            Self::Proj => "proj (PROJ library)",
            Self::Lite => "reproject_lite (pure Rust)",
            Self::PassThrough => "pass-through (raw lon/lat)",
        }
    }

    /// Transforme des points (lon, lat) vers le système décrit par `descriptor`
    ///
    /// Échoue si la définition n'est pas supportée ou si un point n'est pas
    /// projetable ; `project_or_raw` gère le repli.
    pub fn project(&self, descriptor: &str, points: &[(f64, f64)]) -> Result<Vec<ProjectedPoint>> {
        match self {
            #[cfg(feature = "reproject")]
            Self::Proj => {
                let reproj = crate::reproject::Reprojector::new(descriptor)?;
                points
                    .iter()
                    .map(|&(lon, lat)| {
                        let (x, y) = reproj.transform_point(lon, lat)?;
                        Ok(ProjectedPoint { x, y })
                    })
                    .collect()
            }
            Self::Lite => {
                let reproj = ReprojectorLite::new(descriptor)?;
                points
                    .iter()
                    .map(|&(lon, lat)| {
                        let (x, y) = reproj.transform_point(lon, lat)?;
                        Ok(ProjectedPoint { x, y })
                    })
                    .collect()
            }
            Self::PassThrough => Ok(raw(points)),
        }
    }

    /// Projette, ou retombe sur les coordonnées brutes avec un avertissement
    ///
    /// Retourne aussi si la projection a réellement eu lieu.
    pub fn project_or_raw(
        &self,
        descriptor: Option<&str>,
        points: &[(f64, f64)],
    ) -> (Vec<ProjectedPoint>, bool) {
        if matches!(self, Self::PassThrough) {
            return (raw(points), false);
        }

        let Some(descriptor) = descriptor else {
            warn!(
                backend = self.describe(),
                "Network has no projection descriptor, using raw lon/lat"
            );
            return (raw(points), false);
        };

        match self.project(descriptor, points) {
            Ok(projected) => (projected, true),
            Err(e) => {
                warn!(
                    backend = self.describe(),
                    descriptor,
                    "Projection failed, using raw lon/lat: {:#}",
                    e
                );
                (raw(points), false)
            }
        }
    }
}

fn raw(points: &[(f64, f64)]) -> Vec<ProjectedPoint> {
    points
        .iter()
        .map(|&(lon, lat)| ProjectedPoint { x: lon, y: lat })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTM33: &str = "+proj=utm +zone=33 +ellps=WGS84 +datum=WGS84 +units=m +no_defs";

    #[test]
    fn test_detect() {
        assert_eq!(Projector::detect(ProjectionMode::Off), Projector::PassThrough);
        assert_eq!(Projector::detect(ProjectionMode::Lite), Projector::Lite);
        #[cfg(not(feature = "reproject"))]
        assert_eq!(Projector::detect(ProjectionMode::Auto), Projector::Lite);
    }

    #[test]
    fn test_pass_through_keeps_raw_coordinates() {
        let (points, projected) =
            Projector::PassThrough.project_or_raw(Some(UTM33), &[(13.371, 52.511)]);
        assert!(!projected);
        assert_eq!(points, vec![ProjectedPoint { x: 13.371, y: 52.511 }]);
    }

    #[test]
    fn test_lite_projects_both_points() {
        let (points, projected) =
            Projector::Lite.project_or_raw(Some(UTM33), &[(13.37, 52.51), (13.39, 52.52)]);
        assert!(projected);
        assert_eq!(points.len(), 2);
        assert!((points[0].x - 389379.6).abs() < 1.0);
        assert!(points[1].x > points[0].x);
        assert!(points[1].y > points[0].y);
    }

    #[test]
    fn test_missing_descriptor_falls_back() {
        let (points, projected) = Projector::Lite.project_or_raw(None, &[(13.4, 52.5)]);
        assert!(!projected);
        assert_eq!(points[0], ProjectedPoint { x: 13.4, y: 52.5 });
    }

    #[test]
    fn test_unsupported_descriptor_falls_back() {
        let (points, projected) =
            Projector::Lite.project_or_raw(Some("+proj=lcc +lat_1=49"), &[(2.35, 48.85)]);
        assert!(!projected);
        assert_eq!(points[0], ProjectedPoint { x: 2.35, y: 48.85 });
        assert!(Projector::Lite.project("+proj=lcc +lat_1=49", &[(2.35, 48.85)]).is_err());
    }
}

//! Configuration du service
//!
//! Ordre de priorité : arguments CLI > fichier JSON > variables d'environnement
//! (`.env` compris) > valeurs par défaut.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

/// Choix du backend de projection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    /// PROJ si compilé, sinon implémentation légère
    #[default]
    Auto,
    /// Implémentation légère (pure Rust)
    Lite,
    /// Coordonnées géographiques brutes
    Off,
}

impl FromStr for ProjectionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "lite" => Ok(Self::Lite),
            "off" | "none" | "false" => Ok(Self::Off),
            _ => Err(format!("Invalid projection mode: {}. Use: auto, lite, off", s)),
        }
    }
}

/// Devenir du répertoire d'une requête terminée
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Retention {
    /// Conserver le répertoire (défaut)
    #[default]
    Keep,
    /// Supprimer le répertoire
    Discard,
    /// Archiver en .tar.bz2 puis supprimer
    Archive,
}

impl FromStr for Retention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "discard" | "delete" => Ok(Self::Discard),
            "archive" => Ok(Self::Archive),
            _ => Err(format!("Invalid retention: {}. Use: keep, discard, archive", s)),
        }
    }
}

/// Configuration principale
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Racine de l'installation SUMO (bin/netconvert, bin/sumo, tools/randomTrips.py)
    pub sumo_home: Option<PathBuf>,

    /// Interpréteur Python pour randomTrips.py
    pub python: String,

    /// Répertoire racine des artefacts de requêtes
    pub data_dir: PathBuf,

    /// Endpoint Overpass `map`
    pub overpass_url: String,

    /// Timeout du téléchargement OSM (secondes)
    pub fetch_timeout_secs: u64,

    /// Nombre de trajets aléatoires générés
    pub trip_count: u32,

    /// Début de la simulation (secondes)
    pub begin: u32,

    /// Fin de la simulation (secondes, exclue)
    pub end: u32,

    /// Backend de projection pour l'injection de routes
    pub projection: ProjectionMode,

    /// Devenir des artefacts après une requête aboutie
    pub retention: Retention,

    /// Adresse d'écoute HTTP
    pub bind: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sumo_home: None,
            python: "python3".into(),
            data_dir: PathBuf::from("data"),
            overpass_url: "https://overpass-api.de/api/map".into(),
            fetch_timeout_secs: 60,
            trip_count: 100,
            begin: 0,
            end: 100,
            projection: ProjectionMode::Auto,
            retention: Retention::Keep,
            bind: SocketAddr::from(([127, 0, 0, 1], 5001)),
        }
    }
}

impl Config {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            sumo_home: std::env::var_os("SUMO_HOME")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            python: std::env::var("BBOX_SIM_PYTHON").unwrap_or(defaults.python),
            data_dir: std::env::var_os("BBOX_SIM_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            overpass_url: std::env::var("BBOX_SIM_OVERPASS_URL").unwrap_or(defaults.overpass_url),
            fetch_timeout_secs: env_parse("BBOX_SIM_FETCH_TIMEOUT")
                .unwrap_or(defaults.fetch_timeout_secs),
            trip_count: env_parse("BBOX_SIM_TRIP_COUNT").unwrap_or(defaults.trip_count),
            begin: env_parse("BBOX_SIM_BEGIN").unwrap_or(defaults.begin),
            end: env_parse("BBOX_SIM_END").unwrap_or(defaults.end),
            projection: env_parse("BBOX_SIM_PROJECTION").unwrap_or(defaults.projection),
            retention: env_parse("BBOX_SIM_RETENTION").unwrap_or(defaults.retention),
            bind: env_parse("BBOX_SIM_BIND").unwrap_or(defaults.bind),
        }
    }

    /// Charge une configuration depuis un fichier JSON
    ///
    /// Les champs absents prennent leur valeur par défaut, et `sumo_home`
    /// absent du fichier reste celui de l'environnement.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let mut config: Self =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;
        if config.sumo_home.is_none() {
            config.sumo_home = Self::from_env().sumo_home;
        }
        config.validate()?;
        Ok(config)
    }

    /// Environnement, ou fichier si fourni
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::from_env(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Vérifie la cohérence des paramètres de simulation
    pub fn validate(&self) -> Result<()> {
        if self.end <= self.begin {
            anyhow::bail!(
                "Simulation end ({}) must be greater than begin ({})",
                self.end,
                self.begin
            );
        }
        if self.trip_count == 0 {
            anyhow::bail!("trip_count must be at least 1");
        }
        if self.fetch_timeout_secs == 0 {
            anyhow::bail!("fetch_timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Timeout du téléchargement
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Période entre deux départs pour obtenir `trip_count` trajets sur l'horizon
    pub fn trip_period(&self) -> f64 {
        f64::from(self.end - self.begin) / f64::from(self.trip_count)
    }
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_run() {
        let config = Config::default();
        assert_eq!(config.trip_count, 100);
        assert_eq!((config.begin, config.end), (0, 100));
        assert_eq!(config.trip_period(), 1.0);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(60));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"sumo_home": "/opt/sumo", "trip_count": 50, "retention": "archive", "projection": "off"}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.sumo_home, Some(PathBuf::from("/opt/sumo")));
        assert_eq!(config.trip_count, 50);
        assert_eq!(config.trip_period(), 2.0);
        assert_eq!(config.retention, Retention::Archive);
        assert_eq!(config.projection, ProjectionMode::Off);
        assert_eq!(config.end, 100);
    }

    #[test]
    fn test_invalid_horizon_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"begin": 100, "end": 100}"#).unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(Config::load(Path::new("/nonexistent/config.json")).is_err());
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("LITE".parse::<ProjectionMode>().unwrap(), ProjectionMode::Lite);
        assert_eq!("none".parse::<ProjectionMode>().unwrap(), ProjectionMode::Off);
        assert!("proj4".parse::<ProjectionMode>().is_err());
        assert_eq!("discard".parse::<Retention>().unwrap(), Retention::Discard);
        assert!("forever".parse::<Retention>().is_err());
    }
}

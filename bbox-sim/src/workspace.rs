//! Répertoire de travail isolé par requête
//!
//! Chaque requête possède `data_dir/<uuid>/` ; aucun artefact n'est partagé
//! entre requêtes.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bzip2::write::BzEncoder;
use bzip2::Compression;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Retention;

/// Contexte de stockage d'une requête
#[derive(Debug)]
pub struct RequestWorkspace {
    id: Uuid,
    root: PathBuf,
    dir: PathBuf,
}

impl RequestWorkspace {
    /// Crée `data_dir/<uuid>/`
    pub fn create(data_dir: &Path) -> std::io::Result<Self> {
        let id = Uuid::new_v4();
        let dir = data_dir.join(id.to_string());
        std::fs::create_dir_all(&dir)?;
        debug!(request_id = %id, dir = %dir.display(), "Created request workspace");
        Ok(Self {
            id,
            root: data_dir.to_path_buf(),
            dir,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Extrait OSM brut
    pub fn osm_extract(&self) -> PathBuf {
        self.dir.join("map.osm")
    }

    /// Réseau issu de la première conversion
    pub fn base_network(&self) -> PathBuf {
        self.dir.join("base.net.xml")
    }

    pub fn custom_nodes(&self) -> PathBuf {
        self.dir.join("custom.nod.xml")
    }

    pub fn custom_edges(&self) -> PathBuf {
        self.dir.join("custom.edg.xml")
    }

    /// Réseau simulé
    pub fn final_network(&self) -> PathBuf {
        self.dir.join("final.net.xml")
    }

    pub fn trips(&self) -> PathBuf {
        self.dir.join("trips.xml")
    }

    /// Trace FCD brute
    pub fn raw_trace(&self) -> PathBuf {
        self.dir.join("trace.xml")
    }

    /// Trace convertie en JSON
    pub fn trace_json(&self) -> PathBuf {
        self.dir.join("trace.json")
    }

    /// Applique la politique de conservation ; retourne l'archive créée le cas échéant
    pub fn finish(self, retention: Retention) -> Result<Option<PathBuf>> {
        match retention {
            Retention::Keep => Ok(None),
            Retention::Discard => {
                std::fs::remove_dir_all(&self.dir)
                    .with_context(|| format!("Failed to remove {}", self.dir.display()))?;
                debug!(request_id = %self.id, "Discarded request workspace");
                Ok(None)
            }
            Retention::Archive => {
                let archive = self.archive()?;
                std::fs::remove_dir_all(&self.dir)
                    .with_context(|| format!("Failed to remove {}", self.dir.display()))?;
                info!(request_id = %self.id, archive = %archive.display(), "Archived request workspace");
                Ok(Some(archive))
            }
        }
    }

    /// Écrit `data_dir/<uuid>.tar.bz2`
    fn archive(&self) -> Result<PathBuf> {
        let path = self.root.join(format!("{}.tar.bz2", self.id));
        let file = File::create(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;

        let encoder = BzEncoder::new(file, Compression::best());
        let mut builder = tar::Builder::new(encoder);
        builder
            .append_dir_all(self.id.to_string(), &self.dir)
            .context("Failed to archive request workspace")?;
        builder.into_inner()?.finish()?;

        Ok(path)
    }
}

//! Conversion de la trace FCD en trajectoires JSON par véhicule
//!
//! ```json
//! {"vehicles": {"v1": [{"time": 0.0, "lat": 52.5, "lon": 13.4}, ...]}}
//! ```
//!
//! `x` est interprété comme longitude et `y` comme latitude.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sumo_xml::Timestep;
use tracing::debug;

/// Échantillon de position d'un véhicule
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    pub time: f64,
    pub lat: f64,
    pub lon: f64,
}

/// Trajectoires par identifiant de véhicule, échantillons par temps croissant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleTrace {
    pub vehicles: BTreeMap<String, Vec<TraceSample>>,
}

impl VehicleTrace {
    /// Regroupe les enregistrements complets par véhicule, dans l'ordre du document
    pub fn from_timesteps(timesteps: &[Timestep]) -> Self {
        let mut vehicles: BTreeMap<String, Vec<TraceSample>> = BTreeMap::new();
        let mut skipped = 0usize;

        for step in timesteps {
            for record in &step.vehicles {
                let Some((id, x, y)) = record.complete() else {
                    skipped += 1;
                    continue;
                };
                vehicles.entry(id.to_string()).or_default().push(TraceSample {
                    time: step.time,
                    lat: y,
                    lon: x,
                });
            }
        }

        if skipped > 0 {
            debug!(skipped, "Skipped incomplete vehicle records");
        }

        Self { vehicles }
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    pub fn sample_count(&self) -> usize {
        self.vehicles.values().map(Vec::len).sum()
    }

    /// Écrit la trace en JSON
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).context(format!("Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).context("Failed to serialize vehicle trace")?;
        writer.flush()?;
        Ok(())
    }
}

/// Convertit un fichier FCD en fichier JSON
pub fn convert_file(input: &Path, output: &Path) -> Result<VehicleTrace> {
    let timesteps = sumo_xml::read_fcd(input)
        .context(format!("Failed to read FCD trace {}", input.display()))?;
    let trace = VehicleTrace::from_timesteps(&timesteps);
    trace.write_json(output)?;
    Ok(trace)
}

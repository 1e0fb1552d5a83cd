//! Construction du réseau routier depuis l'extrait OSM

use std::path::Path;
use std::time::Instant;

use tracing::info;

use crate::error::PipelineError;
use crate::tools::{ToolInvocation, ToolRunner, ToolSuite};

/// `netconvert --osm-files <osm> -o <base> --geometry.remove --ramps.guess`
pub fn build_invocation(suite: &ToolSuite, osm: &Path, base: &Path) -> ToolInvocation {
    ToolInvocation::new("netconvert", &suite.netconvert)
        .opt("--osm-files", osm)
        .opt("-o", base)
        .arg("--geometry.remove")
        .arg("--ramps.guess")
}

/// Convertit l'extrait en réseau ; la projection est choisie par netconvert
pub fn build_network(
    runner: &dyn ToolRunner,
    suite: &ToolSuite,
    osm: &Path,
    base: &Path,
) -> Result<(), PipelineError> {
    let started_at = Instant::now();
    runner.run(&build_invocation(suite, osm, base))?;
    ensure_output(base, "netconvert")?;
    info!(elapsed = ?started_at.elapsed(), network = %base.display(), "Built base network");
    Ok(())
}

/// Un outil terminé avec succès doit avoir produit son artefact
pub(crate) fn ensure_output(path: &Path, tool: &str) -> Result<(), PipelineError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::Unexpected(anyhow::anyhow!(
            "{} exited successfully but did not produce {}",
            tool,
            path.display()
        )))
    }
}

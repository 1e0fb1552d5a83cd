//! Injection d'un segment routier proposé dans le réseau de base
//!
//! 1. Lecture de la projection du réseau (`<location projParameter>`)
//! 2. Projection des deux extrémités puis décalage par le `netOffset` du réseau,
//!    repli sur (lon, lat) brut si impossible
//! 3. Écriture des fichiers plain XML `start`/`end` + `new_hwy`
//! 4. Fusion par netconvert avec tolérance aux erreurs de connexion
//!
//! Les coordonnées brutes du repli ne sont jamais décalées.

pub mod policy;

use std::path::Path;
use std::time::Instant;

use sumo_xml::{Location, PlainEdge, PlainNode};
use tracing::{debug, info, warn};

use crate::bbox::BoundingBox;
use crate::error::PipelineError;
use crate::network::ensure_output;
use crate::projection::Projector;
use crate::request::RoadProposal;
use crate::tools::{ToolInvocation, ToolRunner, ToolSuite};
use crate::workspace::RequestWorkspace;

pub use policy::edge_attributes;

/// Identifiant du noeud de départ
pub const START_NODE: &str = "start";
/// Identifiant du noeud d'arrivée
pub const END_NODE: &str = "end";
/// Identifiant de l'arête injectée
pub const EDGE_ID: &str = "new_hwy";

/// Noeuds et arête synthétisés pour une proposition
#[derive(Debug, Clone, PartialEq)]
pub struct Injection {
    pub nodes: [PlainNode; 2],
    pub edge: PlainEdge,
    /// Les coordonnées sont-elles dans la projection du réseau ?
    pub projected: bool,
}

/// Métadonnées `<location>` du réseau, `None` si absentes ou illisibles
pub fn network_location(network: &Path) -> Option<Location> {
    match sumo_xml::read_location(network) {
        Ok(location) => location,
        Err(e) => {
            warn!(network = %network.display(), "Cannot read network location: {}", e);
            None
        }
    }
}

/// Construit les noeuds et l'arête de la proposition
///
/// Les points projetés sont ramenés dans le repère du réseau (`netOffset`).
pub fn synthesize(road: &RoadProposal, location: Option<&Location>, projector: &Projector) -> Injection {
    let endpoints = [(road.from.lon, road.from.lat), (road.to.lon, road.to.lat)];
    let descriptor = location.and_then(|l| l.proj_parameter.as_deref());
    let (points, projected) = projector.project_or_raw(descriptor, &endpoints);

    let (dx, dy) = match location {
        Some(l) if projected => l.net_offset,
        _ => (0.0, 0.0),
    };

    let node = |id: &str, index: usize| {
        let (x, y) = points
            .get(index)
            .map(|p| (p.x + dx, p.y + dy))
            .unwrap_or(endpoints[index]);
        PlainNode {
            id: id.to_string(),
            x,
            y,
        }
    };

    Injection {
        nodes: [node(START_NODE, 0), node(END_NODE, 1)],
        edge: PlainEdge {
            id: EDGE_ID.to_string(),
            from: START_NODE.to_string(),
            to: END_NODE.to_string(),
            attributes: edge_attributes(road.infra_type),
        },
        projected,
    }
}

/// `netconvert --sumo-net-file <base> -n <nod> -e <edg> -o <final> --ignore-errors`
pub fn merge_invocation(
    suite: &ToolSuite,
    base: &Path,
    nodes: &Path,
    edges: &Path,
    output: &Path,
) -> ToolInvocation {
    ToolInvocation::new("netconvert", &suite.netconvert)
        .opt("--sumo-net-file", base)
        .opt("-n", nodes)
        .opt("-e", edges)
        .opt("-o", output)
        .arg("--ignore-errors")
}

/// Injecte la proposition et produit le réseau final
pub fn inject(
    runner: &dyn ToolRunner,
    suite: &ToolSuite,
    projector: &Projector,
    workspace: &RequestWorkspace,
    road: &RoadProposal,
    bbox: &BoundingBox,
) -> Result<Injection, PipelineError> {
    let started_at = Instant::now();

    for (label, point) in [("from", road.from), ("to", road.to)] {
        if !bbox.contains(point.lon, point.lat) {
            warn!(
                endpoint = label,
                lat = point.lat,
                lon = point.lon,
                "Road endpoint lies outside the requested bbox"
            );
        }
    }

    let base = workspace.base_network();
    let location = network_location(&base);
    debug!(
        descriptor = ?location.as_ref().and_then(|l| l.proj_parameter.as_deref()),
        net_offset = ?location.as_ref().map(|l| l.net_offset),
        "Network projection"
    );

    let injection = synthesize(road, location.as_ref(), projector);
    sumo_xml::plain::write_nodes(&workspace.custom_nodes(), &injection.nodes)?;
    sumo_xml::plain::write_edges(&workspace.custom_edges(), std::slice::from_ref(&injection.edge))?;

    let output = workspace.final_network();
    runner.run(&merge_invocation(
        suite,
        &base,
        &workspace.custom_nodes(),
        &workspace.custom_edges(),
        &output,
    ))?;
    ensure_output(&output, "netconvert")?;

    info!(
        infra_type = %road.infra_type,
        projected = injection.projected,
        elapsed = ?started_at.elapsed(),
        "Injected proposed road"
    );
    Ok(injection)
}

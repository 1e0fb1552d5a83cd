//! Écriture des fichiers « plain XML » (.nod.xml / .edg.xml) lus par netconvert

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::attr::escape_attr;
use crate::SumoXmlError;

/// Noeud en coordonnées du réseau
#[derive(Debug, Clone, PartialEq)]
pub struct PlainNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Arête avec attributs libres (numLanes, speed, type, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct PlainEdge {
    pub id: String,
    pub from: String,
    pub to: String,
    pub attributes: Vec<(String, String)>,
}

/// Écrit un fichier de noeuds
pub fn write_nodes(path: &Path, nodes: &[PlainNode]) -> Result<(), SumoXmlError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_nodes_to(&mut writer, nodes)?;
    writer.flush()?;
    Ok(())
}

/// Écrit un fichier d'arêtes
pub fn write_edges(path: &Path, edges: &[PlainEdge]) -> Result<(), SumoXmlError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_edges_to(&mut writer, edges)?;
    writer.flush()?;
    Ok(())
}

/// Sérialise des noeuds vers un writer
pub fn write_nodes_to<W: Write>(writer: &mut W, nodes: &[PlainNode]) -> std::io::Result<()> {
    writeln!(writer, "<nodes>")?;
    for node in nodes {
        // `{}` sur f64 : représentation la plus courte qui relit la même valeur
        writeln!(
            writer,
            r#"    <node id="{}" x="{}" y="{}"/>"#,
            escape_attr(&node.id),
            node.x,
            node.y
        )?;
    }
    writeln!(writer, "</nodes>")
}

/// Sérialise des arêtes vers un writer
pub fn write_edges_to<W: Write>(writer: &mut W, edges: &[PlainEdge]) -> std::io::Result<()> {
    writeln!(writer, "<edges>")?;
    for edge in edges {
        write!(
            writer,
            r#"    <edge id="{}" from="{}" to="{}""#,
            escape_attr(&edge.id),
            escape_attr(&edge.from),
            escape_attr(&edge.to)
        )?;
        for (key, value) in &edge.attributes {
            write!(writer, r#" {}="{}""#, key, escape_attr(value))?;
        }
        writeln!(writer, "/>")?;
    }
    writeln!(writer, "</edges>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::{tags, Tag};

    #[test]
    fn test_write_nodes() {
        let mut out = Vec::new();
        write_nodes_to(
            &mut out,
            &[
                PlainNode {
                    id: "start".into(),
                    x: 389_012.5,
                    y: 5_819_001.25,
                },
                PlainNode {
                    id: "end".into(),
                    x: 13.41,
                    y: 52.51,
                },
            ],
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("<nodes>\n"));
        assert!(text.contains(r#"<node id="start" x="389012.5" y="5819001.25"/>"#));
        assert!(text.contains(r#"<node id="end" x="13.41" y="52.51"/>"#));
        assert!(text.trim_end().ends_with("</nodes>"));
    }

    #[test]
    fn test_write_edges_reads_back() {
        let mut out = Vec::new();
        write_edges_to(
            &mut out,
            &[PlainEdge {
                id: "new_hwy".into(),
                from: "start".into(),
                to: "end".into(),
                attributes: vec![
                    ("numLanes".into(), "3".into()),
                    ("name".into(), "A \"quoted\" & name".into()),
                ],
            }],
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        let edge = tags(&text)
            .find_map(|t| match t {
                Tag::Start(s) if s.name == "edge" => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(edge.attr("from").as_deref(), Some("start"));
        assert_eq!(edge.attr("numLanes").as_deref(), Some("3"));
        assert_eq!(edge.attr("name").as_deref(), Some("A \"quoted\" & name"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.nod.xml");
        write_nodes(
            &path,
            &[PlainNode {
                id: "start".into(),
                x: 1.0,
                y: 2.0,
            }],
        )
        .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains(r#"x="1" y="2""#));
    }
}

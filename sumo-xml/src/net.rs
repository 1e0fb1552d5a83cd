//! Lecture des métadonnées `<location>` d'un réseau SUMO (.net.xml)
//!
//! Seul l'élément `location` est interprété ; le reste du réseau est opaque.

use crate::attr::{tags, Tag};
use crate::SumoXmlError;

/// Valeur de `projParameter` signifiant « pas de projection »
const UNPROJECTED: &str = "!";

/// Métadonnées de localisation d'un réseau
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    /// Décalage appliqué aux coordonnées projetées
    pub net_offset: (f64, f64),

    /// Définition PROJ brute (`+proj=utm +zone=33 ...`), `None` si non projeté
    pub proj_parameter: Option<String>,
}

/// Extrait l'élément `<location>` d'un document réseau
///
/// Retourne `Ok(None)` si le document n'en contient pas.
pub fn parse_location(data: &[u8]) -> Result<Option<Location>, SumoXmlError> {
    let text = simdutf8::basic::from_utf8(data)
        .map_err(|_| SumoXmlError::InvalidUtf8("net".into()))?;

    for tag in tags(text) {
        let Tag::Start(start) = tag else {
            continue;
        };
        if start.name != "location" {
            continue;
        }

        let net_offset = match start.attr("netOffset") {
            Some(raw) => parse_pair(&raw).ok_or_else(|| {
                SumoXmlError::invalid_number("location", "netOffset", raw.as_ref())
            })?,
            None => (0.0, 0.0),
        };

        let proj_parameter = start
            .attr("projParameter")
            .map(|raw| raw.trim().to_string())
            .filter(|p| !p.is_empty() && p != UNPROJECTED);

        return Ok(Some(Location {
            net_offset,
            proj_parameter,
        }));
    }

    Ok(None)
}

/// Parse `x,y`
fn parse_pair(raw: &str) -> Option<(f64, f64)> {
    let (x, y) = raw.split_once(',')?;
    Some((
        fast_float::parse(x.trim()).ok()?,
        fast_float::parse(y.trim()).ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECTED: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<net version="1.20" junctionCornerDetail="5" limitTurnSpeed="5.50">
    <location netOffset="-389283.02,-5819708.48" convBoundary="0.00,0.00,1520.44,1317.16" origBoundary="13.370000,52.510000,13.390000,52.520000" projParameter="+proj=utm +zone=33 +ellps=WGS84 +datum=WGS84 +units=m +no_defs"/>
    <edge id=":J0_0" function="internal"/>
</net>"#;

    #[test]
    fn test_parse_projected_location() {
        let loc = parse_location(PROJECTED).unwrap().unwrap();
        assert_eq!(loc.net_offset, (-389283.02, -5819708.48));
        assert_eq!(
            loc.proj_parameter.as_deref(),
            Some("+proj=utm +zone=33 +ellps=WGS84 +datum=WGS84 +units=m +no_defs")
        );
    }

    #[test]
    fn test_parse_unprojected_location() {
        let doc = br#"<net><location netOffset="0.00,0.00" convBoundary="13.37,52.51,13.39,52.52" origBoundary="-10000000000.00,-10000000000.00,10000000000.00,10000000000.00" projParameter="!"/></net>"#;
        let loc = parse_location(doc).unwrap().unwrap();
        assert!(loc.proj_parameter.is_none());
        assert_eq!(loc.net_offset, (0.0, 0.0));
    }

    #[test]
    fn test_missing_location() {
        let doc = br#"<net version="1.20"><edge id="e0"/></net>"#;
        assert!(parse_location(doc).unwrap().is_none());
    }

    #[test]
    fn test_invalid_net_offset() {
        let doc = br#"<net><location netOffset="abc" projParameter="!"/></net>"#;
        assert!(matches!(
            parse_location(doc),
            Err(SumoXmlError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        let doc = b"<net><location projParameter=\"\xff\"/></net>";
        assert!(matches!(
            parse_location(doc),
            Err(SumoXmlError::InvalidUtf8(_))
        ));
    }
}

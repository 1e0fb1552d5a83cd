//! Attributs de l'arête injectée selon le type d'infrastructure

use crate::request::InfraType;

/// Attributs communs : autoroute 3 voies à 120 km/h
const BASE_ATTRIBUTES: [(&str, &str); 3] = [
    ("numLanes", "3"),
    ("speed", "33.33"),
    ("type", "highway.motorway"),
];

/// Attributs `(nom, valeur)` dans l'ordre d'écriture
pub fn edge_attributes(infra_type: InfraType) -> Vec<(String, String)> {
    let extra: &[(&str, &str)] = match infra_type {
        InfraType::Road => &[],
        InfraType::Flyover => &[
            ("priority", "20"),
            ("shape", ""),
            ("spreadType", "center"),
            ("name", "Proposed Flyover"),
        ],
        InfraType::Tunnel => &[("name", "Proposed Tunnel")],
    };

    BASE_ATTRIBUTES
        .iter()
        .chain(extra)
        .map(|&(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_road_is_exactly_base() {
        let attrs = edge_attributes(InfraType::Road);
        assert_eq!(attrs.len(), 3);
        assert_eq!(get(&attrs, "numLanes"), Some("3"));
        assert_eq!(get(&attrs, "speed"), Some("33.33"));
        assert_eq!(get(&attrs, "type"), Some("highway.motorway"));
        assert_eq!(get(&attrs, "name"), None);
    }

    #[test]
    fn test_flyover_has_priority_and_name() {
        let attrs = edge_attributes(InfraType::Flyover);
        assert_eq!(get(&attrs, "type"), Some("highway.motorway"));
        assert_eq!(get(&attrs, "priority"), Some("20"));
        assert_eq!(get(&attrs, "spreadType"), Some("center"));
        assert_eq!(get(&attrs, "name"), Some("Proposed Flyover"));
    }

    #[test]
    fn test_tunnel_has_name_only() {
        let attrs = edge_attributes(InfraType::Tunnel);
        assert_eq!(attrs.len(), 4);
        assert_eq!(get(&attrs, "name"), Some("Proposed Tunnel"));
        assert_eq!(get(&attrs, "priority"), None);
    }

    #[test]
    fn test_unknown_type_yields_road() {
        let lenient = InfraType::from_lenient(Some("viaduct"));
        assert_eq!(edge_attributes(lenient), edge_attributes(InfraType::Road));
        assert_eq!(edge_attributes(InfraType::from_lenient(None)), edge_attributes(InfraType::Road));
    }

    #[test]
    fn test_deterministic() {
        for t in [InfraType::Road, InfraType::Flyover, InfraType::Tunnel] {
            assert_eq!(edge_attributes(t), edge_attributes(t));
        }
    }
}

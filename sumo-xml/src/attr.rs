//! Scanner de balises XML minimal
//!
//! Les documents produits par SUMO sont plats et réguliers : on n'a besoin
//! que des balises ouvrantes et de leurs attributs. Le scanner saute les
//! commentaires, les instructions de traitement, les DOCTYPE et les CDATA.

use std::borrow::Cow;

use memchr::{memchr, memmem};

/// Balise rencontrée dans le document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag<'a> {
    /// Balise ouvrante (ou auto-fermante)
    Start(StartTag<'a>),
    /// Balise fermante `</name>`
    End(&'a str),
}

/// Balise ouvrante avec ses attributs bruts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartTag<'a> {
    /// Nom de l'élément
    pub name: &'a str,
    /// `<name ... />`
    pub self_closing: bool,
    raw_attrs: &'a str,
}

impl<'a> StartTag<'a> {
    /// Valeur décodée d'un attribut
    pub fn attr(&self, name: &str) -> Option<Cow<'a, str>> {
        self.attributes()
            .find(|(key, _)| *key == name)
            .map(|(_, raw)| decode_entities(raw))
    }

    /// Itère sur les paires (nom, valeur brute)
    pub fn attributes(&self) -> Attributes<'a> {
        Attributes {
            rest: self.raw_attrs,
        }
    }
}

/// Itérateur sur les attributs d'une balise
pub struct Attributes<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Attributes<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.trim_start();
        let eq = rest.find('=')?;
        let key = rest[..eq].trim();

        let after = rest[eq + 1..].trim_start();
        let quote = after.chars().next()?;
        if quote != '"' && quote != '\'' {
            self.rest = "";
            return None;
        }

        let value_start = &after[1..];
        let Some(end) = value_start.find(quote) else {
            self.rest = "";
            return None;
        };

        self.rest = &value_start[end + 1..];
        Some((key, &value_start[..end]))
    }
}

/// Itérateur de balises sur un document
pub struct Tags<'a> {
    text: &'a str,
    pos: usize,
    truncated: bool,
}

/// Crée un itérateur de balises
pub fn tags(text: &str) -> Tags<'_> {
    Tags {
        text,
        pos: 0,
        truncated: false,
    }
}

impl<'a> Tags<'a> {
    /// Le document s'est terminé au milieu d'une balise
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Saute jusqu'après `terminator` ; marque le document tronqué sinon
    fn skip_past(&mut self, from: usize, terminator: &[u8]) -> bool {
        let bytes = self.text.as_bytes();
        match memmem::find(&bytes[from..], terminator) {
            Some(offset) => {
                self.pos = from + offset + terminator.len();
                true
            }
            None => {
                self.pos = bytes.len();
                self.truncated = true;
                false
            }
        }
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let text = self.text;
        let bytes = text.as_bytes();

        loop {
            if self.pos >= bytes.len() {
                return None;
            }
            let start = self.pos + memchr(b'<', &bytes[self.pos..])?;
            let rest = &bytes[start..];

            if rest.starts_with(b"<!--") {
                if !self.skip_past(start + 4, b"-->") {
                    return None;
                }
                continue;
            }
            if rest.starts_with(b"<![CDATA[") {
                if !self.skip_past(start + 9, b"]]>") {
                    return None;
                }
                continue;
            }
            if rest.starts_with(b"<?") {
                if !self.skip_past(start + 2, b"?>") {
                    return None;
                }
                continue;
            }
            if rest.starts_with(b"<!") {
                if !self.skip_past(start + 2, b">") {
                    return None;
                }
                continue;
            }

            // Fin de balise : premier '>' hors guillemets
            let mut quote: Option<u8> = None;
            let mut end = None;
            for (i, &b) in bytes[start + 1..].iter().enumerate() {
                match quote {
                    Some(q) if b == q => quote = None,
                    Some(_) => {}
                    None if b == b'"' || b == b'\'' => quote = Some(b),
                    None if b == b'>' => {
                        end = Some(start + 1 + i);
                        break;
                    }
                    None => {}
                }
            }

            let Some(end) = end else {
                self.pos = bytes.len();
                self.truncated = true;
                return None;
            };
            self.pos = end + 1;

            let inner = &text[start + 1..end];
            if let Some(name) = inner.strip_prefix('/') {
                return Some(Tag::End(name.trim()));
            }

            let (inner, self_closing) = match inner.trim_end().strip_suffix('/') {
                Some(stripped) => (stripped, true),
                None => (inner, false),
            };

            let name_end = inner
                .find(|c: char| c.is_ascii_whitespace())
                .unwrap_or(inner.len());

            return Some(Tag::Start(StartTag {
                name: &inner[..name_end],
                self_closing,
                raw_attrs: &inner[name_end..],
            }));
        }
    }
}

/// Décode les entités XML d'une valeur d'attribut
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];

        let decoded = candidate.find(';').and_then(|semi| {
            let entity = &candidate[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .and_then(|hex| u32::from_str_radix(hex, 16).ok())
                    .or_else(|| entity.strip_prefix('#').and_then(|dec| dec.parse().ok()))
                    .and_then(char::from_u32),
            };
            ch.map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                // Entité inconnue : conservée telle quelle
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Échappe une valeur pour l'écrire dans un attribut entre guillemets doubles
pub fn escape_attr(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_tags(text: &str) -> Vec<StartTag<'_>> {
        tags(text)
            .filter_map(|t| match t {
                Tag::Start(s) => Some(s),
                Tag::End(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_skips_prolog_and_comments() {
        let doc = r#"<?xml version="1.0"?>
<!-- generated on 2024 -->
<!DOCTYPE net>
<net version="1.20"><location netOffset="0,0"/></net>"#;
        let found = start_tags(doc);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "net");
        assert_eq!(found[1].name, "location");
        assert!(found[1].self_closing);
    }

    #[test]
    fn test_comment_containing_tags() {
        let doc = "<a/><!-- <b x=\"1\"/> --><c/>";
        let names: Vec<_> = start_tags(doc).iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn test_attribute_with_gt_inside_quotes() {
        let doc = r#"<edge id="a>b" from='x'/>"#;
        let found = start_tags(doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].attr("id").as_deref(), Some("a>b"));
        assert_eq!(found[0].attr("from").as_deref(), Some("x"));
    }

    #[test]
    fn test_end_tags() {
        let all: Vec<_> = tags("<timestep time=\"1\"></timestep>").collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1], Tag::End("timestep"));
    }

    #[test]
    fn test_truncated_document() {
        let mut it = tags("<a/><vehicle id=\"v0\" x=\"1");
        assert!(it.next().is_some());
        assert!(it.next().is_none());
        assert!(it.truncated());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("plain"), "plain");
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;x&gt; &quot;q&quot;"), "<x> \"q\"");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("&unknown; &"), "&unknown; &");
    }

    #[test]
    fn test_escape_attr() {
        assert_eq!(escape_attr("Proposed Flyover"), "Proposed Flyover");
        assert_eq!(escape_attr("a<b & \"c\""), "a&lt;b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_missing_attribute() {
        let found = start_tags(r#"<vehicle id="v0"/>"#);
        assert!(found[0].attr("x").is_none());
    }
}

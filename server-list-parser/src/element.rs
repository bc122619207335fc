//! Element classification and attribute extraction.
//!
//! The feed stores almost everything in attributes:
//! ```xml
//! <continent code="EU">
//!   <country code="DE">
//!     <server name="Example" ip="203.0.113.7" port="64738"/>
//!   </country>
//! </continent>
//! ```
//! The real service also publishes a flat variant where every `<server>`
//! carries its own `continent_code` and `country_code`.

use quick_xml::events::BytesStart;

/// Structural role of an element in the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// Document root (`<list>` or `<servers>`)
    Root,
    Continent,
    Country,
    Server,
    /// Anything else; kept on the scope stack but otherwise ignored
    Unknown,
}

impl ElementKind {
    /// Classify an element by its local (namespace-free) name.
    pub fn from_name(name: &[u8]) -> Self {
        match name {
            b"list" | b"servers" => ElementKind::Root,
            b"continent" => ElementKind::Continent,
            b"country" => ElementKind::Country,
            b"server" => ElementKind::Server,
            _ => ElementKind::Unknown,
        }
    }

    pub fn of(start: &BytesStart<'_>) -> Self {
        Self::from_name(start.local_name().as_ref())
    }
}

/// Attributes of a single element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the attributes of a start tag.
    ///
    /// Attributes that fail to decode are skipped so that one bad value does
    /// not void the entry; the entry may still be rejected later if a
    /// required attribute ends up missing.
    pub fn from_start(start: &BytesStart<'_>) -> Self {
        let mut pairs = Vec::new();

        for attr in start.attributes() {
            let attr = match attr {
                Ok(attr) => attr,
                Err(e) => {
                    tracing::debug!("Skipping undecodable attribute: {}", e);
                    continue;
                }
            };

            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            match attr.unescape_value() {
                Ok(value) => pairs.push((key, value.into_owned())),
                Err(e) => tracing::debug!("Skipping attribute `{}`: {}", key, e),
            }
        }

        Self { pairs }
    }

    /// Add an attribute; later duplicates lose to earlier ones on lookup.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Value of `key`, trimmed; blank values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// First present value among `keys`.
    pub fn get_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Code of a continent or country element: `code`, falling back to `name`.
    pub fn code(&self) -> Option<&str> {
        self.get_any(&["code", "name"])
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

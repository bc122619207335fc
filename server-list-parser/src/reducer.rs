//! Folds element open/close events into continent and country buckets.
//!
//! The reducer keeps its own scope stack, so all parse context lives in one
//! value owned by a single parse. It never fails: entries that cannot be
//! placed are dropped and counted.

use std::collections::HashMap;

use serde::Serialize;

use crate::element::{Attributes, ElementKind};
use crate::error::MalformedEntry;
use crate::record::ServerRecord;

/// Country codes seen under one continent, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContinentBucket {
    pub code: String,
    pub country_codes: Vec<String>,
}

/// Servers advertised for one country, in feed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryBucket {
    pub code: String,
    pub servers: Vec<ServerRecord>,
}

/// Result of a complete parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    /// Continents in first-seen order
    pub continents: Vec<ContinentBucket>,
    pub countries: HashMap<String, CountryBucket>,
    /// Entries that were dropped as malformed or misplaced
    pub dropped_entries: usize,
}

impl ParsedFeed {
    pub fn country(&self, code: &str) -> Option<&CountryBucket> {
        self.countries.get(code)
    }

    pub fn continent(&self, code: &str) -> Option<&ContinentBucket> {
        self.continents.iter().find(|c| c.code == code)
    }

    /// Total number of servers across all countries.
    pub fn server_count(&self) -> usize {
        self.countries.values().map(|c| c.servers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.continents.is_empty()
    }
}

#[derive(Debug, Clone)]
enum Scope {
    Continent(String),
    Country { continent: String, country: String },
    /// A dropped subtree; everything beneath it is dropped too
    Ignored,
    Other,
}

/// Incremental reducer driven by [`crate::reader`].
#[derive(Debug, Default)]
pub struct FeedReducer {
    stack: Vec<Scope>,
    continents: Vec<ContinentBucket>,
    continent_index: HashMap<String, usize>,
    countries: HashMap<String, CountryBucket>,
    country_owner: HashMap<String, String>,
    dropped: usize,
}

impl FeedReducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle an element start. Every `open` must be paired with a `close`,
    /// including for self-closing elements.
    pub fn open(&mut self, kind: ElementKind, attrs: &Attributes) {
        if self.in_ignored_subtree() {
            if kind == ElementKind::Server {
                self.dropped += 1;
            }
            self.stack.push(Scope::Ignored);
            return;
        }

        let scope = match kind {
            ElementKind::Root | ElementKind::Unknown => Scope::Other,
            ElementKind::Continent => self.open_continent(attrs),
            ElementKind::Country => self.open_country(attrs),
            ElementKind::Server => {
                self.add_server(attrs);
                Scope::Other
            }
        };
        self.stack.push(scope);
    }

    /// Handle an element end.
    pub fn close(&mut self) {
        self.stack.pop();
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn finish(self) -> ParsedFeed {
        ParsedFeed {
            continents: self.continents,
            countries: self.countries,
            dropped_entries: self.dropped,
        }
    }

    fn open_continent(&mut self, attrs: &Attributes) -> Scope {
        match attrs.code() {
            Some(code) => {
                self.ensure_continent(code);
                Scope::Continent(code.to_string())
            }
            None => {
                tracing::debug!("Dropping continent without a code");
                self.dropped += 1;
                Scope::Ignored
            }
        }
    }

    fn open_country(&mut self, attrs: &Attributes) -> Scope {
        let Some(continent) = self.current_continent().map(str::to_string) else {
            tracing::debug!("Dropping country outside of any continent");
            self.dropped += 1;
            return Scope::Ignored;
        };
        let Some(country) = attrs.code() else {
            tracing::debug!("Dropping country without a code under {}", continent);
            self.dropped += 1;
            return Scope::Ignored;
        };

        let continent = self.register_country(&continent, country);
        Scope::Country {
            continent,
            country: country.to_string(),
        }
    }

    fn add_server(&mut self, attrs: &Attributes) {
        match self.place_server(attrs) {
            Ok(record) => {
                if let Some(bucket) = self.countries.get_mut(&record.country_code) {
                    bucket.servers.push(record);
                }
            }
            Err(reason) => {
                tracing::debug!(
                    "Dropping server entry {:?}: {}",
                    attrs.get("name").unwrap_or("<unnamed>"),
                    reason
                );
                self.dropped += 1;
            }
        }
    }

    fn place_server(&mut self, attrs: &Attributes) -> Result<ServerRecord, MalformedEntry> {
        let (continent, country) = match self.current_country() {
            Some((continent, country)) => (continent.to_string(), country.to_string()),
            None => {
                let country = attrs
                    .get("country_code")
                    .ok_or(MalformedEntry::NoCountry)?
                    .to_string();
                let continent = self
                    .current_continent()
                    .or_else(|| attrs.get("continent_code"))
                    .ok_or(MalformedEntry::NoContinent)?
                    .to_string();
                (continent, country)
            }
        };

        let record = ServerRecord::from_attributes(attrs, &continent, &country)?;
        let owner = self.register_country(&continent, &country);
        Ok(ServerRecord {
            continent_code: owner,
            ..record
        })
    }

    fn ensure_continent(&mut self, code: &str) -> usize {
        if let Some(&index) = self.continent_index.get(code) {
            return index;
        }
        let index = self.continents.len();
        self.continents.push(ContinentBucket {
            code: code.to_string(),
            country_codes: Vec::new(),
        });
        self.continent_index.insert(code.to_string(), index);
        index
    }

    /// Attach `country` to `continent` unless it already belongs somewhere.
    /// Returns the continent that owns the country.
    fn register_country(&mut self, continent: &str, country: &str) -> String {
        if let Some(owner) = self.country_owner.get(country) {
            if owner != continent {
                tracing::warn!(
                    "Country {} listed under {} and {}; keeping it under {}",
                    country,
                    owner,
                    continent,
                    owner
                );
            }
            return owner.clone();
        }

        let index = self.ensure_continent(continent);
        self.continents[index].country_codes.push(country.to_string());
        self.country_owner
            .insert(country.to_string(), continent.to_string());
        self.countries
            .entry(country.to_string())
            .or_insert_with(|| CountryBucket {
                code: country.to_string(),
                servers: Vec::new(),
            });
        continent.to_string()
    }

    fn in_ignored_subtree(&self) -> bool {
        self.stack.iter().any(|s| matches!(s, Scope::Ignored))
    }

    fn current_continent(&self) -> Option<&str> {
        self.stack.iter().rev().find_map(|scope| match scope {
            Scope::Continent(code) => Some(code.as_str()),
            Scope::Country { continent, .. } => Some(continent.as_str()),
            _ => None,
        })
    }

    fn current_country(&self) -> Option<(&str, &str)> {
        self.stack.iter().rev().find_map(|scope| match scope {
            Scope::Country { continent, country } => Some((continent.as_str(), country.as_str())),
            _ => None,
        })
    }
}

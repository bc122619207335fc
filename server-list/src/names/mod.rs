//! Static code → display name lookups.
//!
//! The tables are bundled with the crate and never fetched. Lookups are
//! case-insensitive; an unknown code is displayed as-is.

mod data;

use std::borrow::Cow;
use std::collections::HashMap;

/// Continent and country name tables, built once and then read-only.
#[derive(Debug, Clone)]
pub struct NameTables {
    continents: HashMap<&'static str, &'static str>,
    countries: HashMap<&'static str, &'static str>,
}

impl NameTables {
    /// Tables built from the bundled dataset.
    pub fn bundled() -> Self {
        Self {
            continents: data::CONTINENTS.iter().copied().collect(),
            countries: data::COUNTRIES.iter().copied().collect(),
        }
    }

    /// Display name for a continent code, or the code itself if unknown.
    pub fn continent_name<'a>(&self, code: &'a str) -> Cow<'a, str> {
        lookup(&self.continents, code)
    }

    /// Display name for a country code, or the code itself if unknown.
    pub fn country_name<'a>(&self, code: &'a str) -> Cow<'a, str> {
        lookup(&self.countries, code)
    }

    pub fn continent_count(&self) -> usize {
        self.continents.len()
    }

    pub fn country_count(&self) -> usize {
        self.countries.len()
    }
}

impl Default for NameTables {
    fn default() -> Self {
        Self::bundled()
    }
}

fn lookup<'a>(table: &HashMap<&'static str, &'static str>, code: &'a str) -> Cow<'a, str> {
    let trimmed = code.trim();
    if let Some(name) = table.get(trimmed) {
        return Cow::Borrowed(*name);
    }
    match table.get(trimmed.to_ascii_uppercase().as_str()) {
        Some(name) => Cow::Borrowed(*name),
        None => Cow::Borrowed(code),
    }
}

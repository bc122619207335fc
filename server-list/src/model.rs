//! Flattened, index-addressable view of a parsed feed.
//!
//! A model is built once from a [`ParsedFeed`] after a successful load and
//! never mutated afterwards; a new load produces a new model.

use serde::Serialize;
use server_list_parser::{ParsedFeed, ServerRecord};

use crate::error::IndexError;
use crate::names::NameTables;

/// Position of a country row: continent section, then row within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct IndexPath {
    pub continent: usize,
    pub country: usize,
}

impl IndexPath {
    pub fn new(continent: usize, country: usize) -> Self {
        Self { continent, country }
    }
}

/// One country row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountryEntry {
    pub code: String,
    /// Display name, or the raw code when the code is unknown
    pub name: String,
    pub servers: Vec<ServerRecord>,
}

impl CountryEntry {
    pub fn server_count(&self) -> usize {
        self.servers.len()
    }
}

/// One continent section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContinentEntry {
    pub code: String,
    pub name: String,
    pub countries: Vec<CountryEntry>,
}

impl ContinentEntry {
    pub fn server_count(&self) -> usize {
        self.countries.iter().map(CountryEntry::server_count).sum()
    }
}

/// Continents in first-seen order, each with its countries in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerListModel {
    continents: Vec<ContinentEntry>,
}

impl ServerListModel {
    /// Flatten `feed`, resolving display names through `names`.
    pub fn build(mut feed: ParsedFeed, names: &NameTables) -> Self {
        let continents = feed
            .continents
            .into_iter()
            .map(|continent| {
                let countries = continent
                    .country_codes
                    .into_iter()
                    .map(|code| {
                        let servers = feed
                            .countries
                            .remove(&code)
                            .map(|bucket| bucket.servers)
                            .unwrap_or_default();
                        CountryEntry {
                            name: names.country_name(&code).into_owned(),
                            code,
                            servers,
                        }
                    })
                    .collect();

                ContinentEntry {
                    name: names.continent_name(&continent.code).into_owned(),
                    code: continent.code,
                    countries,
                }
            })
            .collect();

        Self { continents }
    }

    pub fn continents(&self) -> &[ContinentEntry] {
        &self.continents
    }

    pub fn number_of_continents(&self) -> usize {
        self.continents.len()
    }

    pub fn continent(&self, index: usize) -> Result<&ContinentEntry, IndexError> {
        self.continents.get(index).ok_or(IndexError::Continent {
            index,
            count: self.continents.len(),
        })
    }

    pub fn continent_name_at_index(&self, index: usize) -> Result<&str, IndexError> {
        self.continent(index).map(|c| c.name.as_str())
    }

    pub fn number_of_countries_at_continent_index(&self, index: usize) -> Result<usize, IndexError> {
        self.continent(index).map(|c| c.countries.len())
    }

    pub fn country_at_index_path(&self, path: IndexPath) -> Result<&CountryEntry, IndexError> {
        let continent = self.continent(path.continent)?;
        continent
            .countries
            .get(path.country)
            .ok_or(IndexError::Country {
                continent: path.continent,
                index: path.country,
                count: continent.countries.len(),
            })
    }

    /// Total number of servers in the model.
    pub fn server_count(&self) -> usize {
        self.continents.iter().map(ContinentEntry::server_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.continents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use server_list_parser::parse_str;

    const SCENARIO: &str = r#"<list>
  <continent code="EU">
    <country code="DE">
      <server name="a" ip="192.0.2.1"/>
      <server name="b" ip="192.0.2.2"/>
    </country>
    <country code="FR">
      <server name="c" ip="192.0.2.3"/>
    </country>
  </continent>
  <continent code="NA">
    <country code="US">
      <server name="d" ip="198.51.100.1"/>
      <server name="e" ip="198.51.100.2"/>
      <server name="f" ip="198.51.100.3"/>
    </country>
  </continent>
</list>"#;

    fn scenario_model() -> ServerListModel {
        ServerListModel::build(parse_str(SCENARIO).unwrap(), &NameTables::bundled())
    }

    #[test]
    fn test_scenario_counts() {
        let model = scenario_model();

        assert_eq!(model.number_of_continents(), 2);
        assert_eq!(model.number_of_countries_at_continent_index(0), Ok(2));
        assert_eq!(model.number_of_countries_at_continent_index(1), Ok(1));
        assert_eq!(
            model.country_at_index_path(IndexPath::new(0, 0)).unwrap().server_count(),
            2
        );
        assert_eq!(
            model.country_at_index_path(IndexPath::new(1, 0)).unwrap().server_count(),
            3
        );
        assert_eq!(model.server_count(), 6);
    }

    #[test]
    fn test_names_resolved() {
        let model = scenario_model();

        assert_eq!(model.continent_name_at_index(0), Ok("Europe"));
        assert_eq!(model.continent_name_at_index(1), Ok("North America"));

        let fr = model.country_at_index_path(IndexPath::new(0, 1)).unwrap();
        assert_eq!(fr.code, "FR");
        assert_eq!(fr.name, "France");
    }

    #[test]
    fn test_unknown_country_keeps_code() {
        let xml = r#"<list><continent code="EU"><country code="XK"/></continent></list>"#;
        let model = ServerListModel::build(parse_str(xml).unwrap(), &NameTables::bundled());

        let entry = model.country_at_index_path(IndexPath::new(0, 0)).unwrap();
        assert_eq!(entry.name, "XK");
        assert_eq!(entry.server_count(), 0);
    }

    #[test]
    fn test_out_of_range() {
        let model = scenario_model();

        assert_eq!(
            model.continent_name_at_index(2),
            Err(IndexError::Continent { index: 2, count: 2 })
        );
        assert_eq!(
            model.continent_name_at_index(usize::MAX),
            Err(IndexError::Continent { index: usize::MAX, count: 2 })
        );
        assert_eq!(
            model.country_at_index_path(IndexPath::new(0, 2)),
            Err(IndexError::Country { continent: 0, index: 2, count: 2 })
        );
        assert_eq!(
            model.country_at_index_path(IndexPath::new(5, 0)),
            Err(IndexError::Continent { index: 5, count: 2 })
        );
    }

    #[test]
    fn test_empty_model() {
        let model = ServerListModel::default();
        assert!(model.is_empty());
        assert_eq!(model.number_of_continents(), 0);
        assert!(model.continent_name_at_index(0).is_err());
        assert!(model.number_of_countries_at_continent_index(0).is_err());
    }
}

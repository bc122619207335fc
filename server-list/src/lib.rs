//! Public voice-chat server list
//!
//! Fetches the public server list, parses it while it streams in, and
//! exposes it as a two-level model (continents → countries → servers) that a
//! list or table UI can address by index.
//!
//! # Quick Start
//!
//! ```no_run
//! use server_list::{IndexPath, PublicServerList};
//!
//! let list = PublicServerList::new();
//! list.load_blocking()?;
//!
//! for continent in 0..list.number_of_continents() {
//!     println!("{}", list.continent_name_at_index(continent)?);
//!     for country in 0..list.number_of_countries_at_continent_index(continent)? {
//!         let entry = list.country_at_index_path(IndexPath::new(continent, country))?;
//!         println!("  {} ({} servers)", entry.name, entry.server_count());
//!     }
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Delegate-based loading
//!
//! [`PublicServerList::load`] runs on a background thread and reports to a
//! [`ServerListDelegate`] exactly once per load. See [`ChannelDelegate`] for
//! a channel-based adapter.

mod config;
mod delegate;
mod error;
mod fetch;
mod loader;
pub mod logging;
pub mod model;
pub mod names;

pub use config::{LoaderConfig, DEFAULT_URL};
pub use delegate::{ChannelDelegate, LoadEvent, ServerListDelegate};
pub use error::{ConfigError, IndexError, LoadError};
pub use loader::{LoadPhase, PublicServerList};
pub use model::{ContinentEntry, CountryEntry, IndexPath, ServerListModel};
pub use names::NameTables;

pub use server_list_parser as parser;
pub use server_list_parser::{ParseError, ServerRecord};

//! # server-list-parser
//!
//! Streaming parser for the public voice-chat server list feed. The feed is
//! read event by event and reduced into continent buckets (ordered country
//! codes) and country buckets (ordered servers).
//!
//! ## Usage
//!
//! ```rust
//! use server_list_parser::parse_str;
//!
//! let xml = r#"<list>
//!   <continent code="EU">
//!     <country code="DE">
//!       <server name="Berlin" ip="192.0.2.10" port="64738"/>
//!     </country>
//!   </continent>
//! </list>"#;
//!
//! let feed = parse_str(xml).unwrap();
//! assert_eq!(feed.continents[0].country_codes, vec!["DE"]);
//! assert_eq!(feed.country("DE").unwrap().servers[0].name, "Berlin");
//! ```
//!
//! Entries that cannot be placed (a server with no country, a country with
//! no continent, a server with a bad port) are dropped and counted rather
//! than failing the whole document.

pub mod element;
pub mod error;
pub mod reader;
pub mod record;
pub mod reducer;

pub use element::{Attributes, ElementKind};
pub use error::{MalformedEntry, ParseError, ParseResult};
pub use reader::{parse_feed, parse_feed_with, parse_str};
pub use record::{ServerRecord, DEFAULT_PORT};
pub use reducer::{ContinentBucket, CountryBucket, FeedReducer, ParsedFeed};

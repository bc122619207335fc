//! HTTP retrieval of the feed.
//!
//! The response body is handed to the streaming parser as it arrives rather
//! than being collected first.

use std::io::BufReader;

use server_list_parser::{parse_feed_with, ParsedFeed};

use crate::config::LoaderConfig;
use crate::error::LoadError;

/// Blocking HTTP client configured from a [`LoaderConfig`].
#[derive(Debug, Clone)]
pub(crate) struct FeedFetcher {
    client: reqwest::blocking::Client,
    url: String,
}

impl FeedFetcher {
    pub(crate) fn new(config: &LoaderConfig) -> Result<Self, LoadError> {
        config.validate()?;

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| LoadError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// GET the feed and parse it, polling `keep_going` between parse events.
    pub(crate) fn fetch<F>(&self, keep_going: F) -> Result<ParsedFeed, LoadError>
    where
        F: FnMut() -> bool,
    {
        tracing::debug!("Fetching server list from {}", self.url);

        let response = self.client.get(&self.url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::HttpStatus(status.as_u16()));
        }

        let feed = parse_feed_with(BufReader::new(response), keep_going)?;
        Ok(feed)
    }
}

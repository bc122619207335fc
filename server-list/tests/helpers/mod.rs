//! Test helpers for loader integration tests

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use server_list::{LoadError, LoaderConfig, PublicServerList, ServerListDelegate};

pub const LIST_PATH: &str = "/list2.cgi";

/// Load an XML fixture from the fixtures directory
pub fn load_fixture(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/fixtures");
    path.push(filename);

    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", filename, e))
}

/// Loader pointed at a mock server
pub fn loader_for(server: &mockito::ServerGuard) -> PublicServerList {
    PublicServerList::with_config(
        LoaderConfig::new()
            .with_url(format!("{}{}", server.url(), LIST_PATH))
            .with_timeout(Duration::from_secs(5)),
    )
}

/// Delegate that records every callback it receives
#[derive(Debug, Default)]
pub struct RecordingDelegate {
    pub loaded: AtomicUsize,
    pub failed: AtomicUsize,
    pub errors: Mutex<Vec<LoadError>>,
    /// Continent count observed from inside the success callback
    pub continents_seen: Mutex<Option<usize>>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn loaded(&self) -> usize {
        self.loaded.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.loaded() + self.failed()
    }

    pub fn last_error(&self) -> Option<LoadError> {
        self.errors.lock().unwrap().last().cloned()
    }
}

impl ServerListDelegate for RecordingDelegate {
    fn server_list_did_load(&self, list: &PublicServerList) {
        *self.continents_seen.lock().unwrap() = Some(list.number_of_continents());
        self.loaded.fetch_add(1, Ordering::SeqCst);
    }

    fn server_list_failed_loading(&self, error: &LoadError) {
        self.errors.lock().unwrap().push(error.clone());
        self.failed.fetch_add(1, Ordering::SeqCst);
    }
}

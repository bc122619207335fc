//! The loader: one fetch at a time, an atomic model swap on success, and a
//! single callback per load.

use std::fmt;
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};

use parking_lot::{Mutex, RwLock};

use crate::config::LoaderConfig;
use crate::delegate::ServerListDelegate;
use crate::error::{IndexError, LoadError};
use crate::fetch::FeedFetcher;
use crate::model::{CountryEntry, IndexPath, ServerListModel};
use crate::names::NameTables;

/// Where the loader is in its lifecycle.
///
/// `Idle → Loading → {Loaded, Failed}`; a new load moves back to `Loading`
/// from either terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug)]
struct LoadState {
    phase: LoadPhase,
    /// Phase to restore if the in-flight load is cancelled
    phase_before_load: LoadPhase,
    /// Last successfully committed model
    model: Option<Arc<ServerListModel>>,
    /// Identifies the current load; completions from older loads are discarded
    generation: u64,
}

struct Inner {
    config: LoaderConfig,
    names: NameTables,
    state: RwLock<LoadState>,
    delegate: RwLock<Option<Weak<dyn ServerListDelegate>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

/// Fetches the public server list and exposes it as continents → countries.
///
/// Cloning is cheap and every clone refers to the same loader.
///
/// Accessors always answer from the last successfully loaded model, so a
/// failed or in-flight reload never exposes partial data. Before the first
/// successful load the model is empty and every index is out of range.
#[derive(Clone)]
pub struct PublicServerList {
    inner: Arc<Inner>,
}

impl PublicServerList {
    /// Loader for the compiled-in endpoint.
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    /// Loader with a custom configuration. The configuration is validated
    /// when a load starts; an invalid one fails that load.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                names: NameTables::bundled(),
                state: RwLock::new(LoadState {
                    phase: LoadPhase::Idle,
                    phase_before_load: LoadPhase::Idle,
                    model: None,
                    generation: 0,
                }),
                delegate: RwLock::new(None),
                worker: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.inner.config
    }

    pub fn names(&self) -> &NameTables {
        &self.inner.names
    }

    /// Register the observer, replacing any previous one.
    ///
    /// Only a weak reference is kept, so the caller must keep its own `Arc`
    /// alive for as long as it wants callbacks. Passing a temporary such as
    /// `set_delegate(Arc::new(observer))` registers an observer that is
    /// already gone, and every later result is dropped on the floor (a
    /// warning is logged when that happens). A load already in flight
    /// reports to whichever observer is registered when it finishes.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use server_list::{ChannelDelegate, PublicServerList};
    ///
    /// let list = PublicServerList::new();
    /// let (delegate, _events) = ChannelDelegate::new();
    /// let delegate = Arc::new(delegate);
    /// list.set_delegate(delegate.clone());
    /// assert!(list.delegate().is_some());
    ///
    /// drop(delegate);
    /// assert!(list.delegate().is_none());
    /// ```
    pub fn set_delegate(&self, delegate: Arc<dyn ServerListDelegate>) {
        if Arc::strong_count(&delegate) == 1 {
            tracing::warn!(
                "Delegate has no other owner; it is dropped now and will receive no callbacks"
            );
        }
        *self.inner.delegate.write() = Some(Arc::downgrade(&delegate));
    }

    /// Unregister the observer. Loads still run and commit their model.
    pub fn clear_delegate(&self) {
        *self.inner.delegate.write() = None;
    }

    /// The registered observer, if it is still alive.
    pub fn delegate(&self) -> Option<Arc<dyn ServerListDelegate>> {
        self.inner.delegate.read().as_ref().and_then(Weak::upgrade)
    }

    /// Start loading on a background thread.
    ///
    /// Ignored (with a warning) while another load is in flight. The result
    /// is reported through the delegate on the worker thread.
    pub fn load(&self) {
        let Some(generation) = self.begin_load() else {
            tracing::warn!("Ignoring load request: a load is already in progress");
            return;
        };

        let list = self.clone();
        let spawned = thread::Builder::new()
            .name("server-list-loader".to_string())
            .spawn(move || {
                let outcome = list.run(generation);
                let _ = list.complete(generation, outcome);
            });

        match spawned {
            Ok(handle) => {
                // A previous, already-cancelled worker is left to finish on its own
                *self.inner.worker.lock() = Some(handle);
            }
            Err(e) => {
                let _ = self.complete(generation, Err(LoadError::Spawn(e.to_string())));
            }
        }
    }

    /// Load on the calling thread.
    ///
    /// The delegate is notified as with [`load`](Self::load), on this thread.
    /// Returns [`LoadError::AlreadyLoading`] without notifying anyone if a
    /// load is already in flight.
    pub fn load_blocking(&self) -> Result<(), LoadError> {
        let generation = self.begin_load().ok_or(LoadError::AlreadyLoading)?;
        let outcome = self.run(generation);
        self.complete(generation, outcome)
    }

    /// Abort the in-flight load, if any.
    ///
    /// Reading and parsing stop at the next parse event, the pending
    /// callback is suppressed, and the phase returns to what it was before
    /// the load started. Returns whether a load was cancelled.
    pub fn cancel(&self) -> bool {
        let mut state = self.inner.state.write();
        if state.phase != LoadPhase::Loading {
            return false;
        }
        state.generation += 1;
        state.phase = state.phase_before_load;
        tracing::debug!("Cancelled server list load");
        true
    }

    /// Wait for the background worker started by [`load`](Self::load).
    ///
    /// Returns immediately when called from the worker itself (for example
    /// inside a delegate callback) or when no worker is running.
    pub fn wait(&self) {
        let handle = {
            let mut worker = self.inner.worker.lock();
            let on_worker = worker
                .as_ref()
                .is_some_and(|handle| handle.thread().id() == thread::current().id());
            if on_worker {
                return;
            }
            worker.take()
        };

        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("Server list worker panicked");
            }
        }
    }

    pub fn phase(&self) -> LoadPhase {
        self.inner.state.read().phase
    }

    /// True once a load has finished successfully; false before that, while
    /// a load is in flight, and after a failed load.
    pub fn load_completed(&self) -> bool {
        self.phase() == LoadPhase::Loaded
    }

    /// Snapshot of the last successfully loaded model.
    pub fn model(&self) -> Option<Arc<ServerListModel>> {
        self.inner.state.read().model.clone()
    }

    pub fn number_of_continents(&self) -> usize {
        self.inner
            .state
            .read()
            .model
            .as_ref()
            .map_or(0, |model| model.number_of_continents())
    }

    pub fn continent_name_at_index(&self, index: usize) -> Result<String, IndexError> {
        self.with_model(|model| model.continent_name_at_index(index).map(str::to_string))
    }

    pub fn number_of_countries_at_continent_index(&self, index: usize) -> Result<usize, IndexError> {
        self.with_model(|model| model.number_of_countries_at_continent_index(index))
    }

    pub fn country_at_index_path(&self, path: IndexPath) -> Result<CountryEntry, IndexError> {
        self.with_model(|model| model.country_at_index_path(path).cloned())
    }

    fn with_model<T>(
        &self,
        f: impl FnOnce(&ServerListModel) -> Result<T, IndexError>,
    ) -> Result<T, IndexError> {
        let empty = ServerListModel::default();
        let state = self.inner.state.read();
        f(state.model.as_deref().unwrap_or(&empty))
    }

    /// Move to `Loading` and return the new generation, unless already loading.
    fn begin_load(&self) -> Option<u64> {
        let mut state = self.inner.state.write();
        if state.phase == LoadPhase::Loading {
            return None;
        }
        state.phase_before_load = state.phase;
        state.phase = LoadPhase::Loading;
        state.generation += 1;
        tracing::debug!("Starting server list load #{}", state.generation);
        Some(state.generation)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.state.read().generation == generation
    }

    /// Fetch, parse and flatten. Touches no shared state besides the
    /// generation check.
    fn run(&self, generation: u64) -> Result<Arc<ServerListModel>, LoadError> {
        let fetcher = FeedFetcher::new(&self.inner.config)?;
        let feed = fetcher.fetch(|| self.is_current(generation))?;
        if feed.dropped_entries > 0 {
            tracing::warn!("Dropped {} malformed server list entries", feed.dropped_entries);
        }
        Ok(Arc::new(ServerListModel::build(feed, &self.inner.names)))
    }

    /// Commit the outcome of load `generation` and notify the delegate.
    fn complete(
        &self,
        generation: u64,
        outcome: Result<Arc<ServerListModel>, LoadError>,
    ) -> Result<(), LoadError> {
        {
            let mut state = self.inner.state.write();
            if state.generation != generation || state.phase != LoadPhase::Loading {
                tracing::debug!("Discarding result of superseded load #{}", generation);
                return Err(LoadError::Cancelled);
            }

            match &outcome {
                Ok(model) => {
                    tracing::info!(
                        "Loaded server list: {} continents, {} servers",
                        model.number_of_continents(),
                        model.server_count()
                    );
                    state.model = Some(Arc::clone(model));
                    state.phase = LoadPhase::Loaded;
                }
                Err(e) => {
                    tracing::warn!("Failed to load server list: {}", e);
                    state.phase = LoadPhase::Failed;
                }
            }
        }

        let delegate = self.delegate();
        match (&outcome, delegate) {
            (Ok(_), Some(delegate)) => delegate.server_list_did_load(self),
            (Err(e), Some(delegate)) => delegate.server_list_failed_loading(e),
            (_, None) => tracing::debug!("No delegate registered for load #{}", generation),
        }

        outcome.map(|_| ())
    }
}

impl Default for PublicServerList {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PublicServerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicServerList")
            .field("url", &self.inner.config.url)
            .field("phase", &self.phase())
            .field("continents", &self.number_of_continents())
            .finish()
    }
}

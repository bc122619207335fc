//! Completion notifications.
//!
//! Callbacks run on the thread that finished the load: the loader's worker
//! thread for [`PublicServerList::load`], the calling thread for
//! [`PublicServerList::load_blocking`]. UI code must hop to its own thread.

use std::sync::mpsc;
use std::sync::Mutex;

use crate::error::LoadError;
use crate::PublicServerList;

/// Observer notified once per load, with exactly one of the two callbacks.
pub trait ServerListDelegate: Send + Sync {
    /// The list finished loading; the model is readable through `list`.
    fn server_list_did_load(&self, list: &PublicServerList);

    /// The load failed; any previously loaded model is still in place.
    fn server_list_failed_loading(&self, error: &LoadError);
}

/// Outcome forwarded by [`ChannelDelegate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    Loaded,
    Failed(LoadError),
}

/// Forwards callbacks into a `std::sync::mpsc` channel.
///
/// ```no_run
/// use std::sync::Arc;
/// use server_list::{ChannelDelegate, LoadEvent, PublicServerList};
///
/// let (delegate, events) = ChannelDelegate::new();
/// let delegate = Arc::new(delegate);
/// let list = PublicServerList::new();
/// list.set_delegate(delegate.clone());
/// list.load();
///
/// match events.recv().unwrap() {
///     LoadEvent::Loaded => println!("{} continents", list.number_of_continents()),
///     LoadEvent::Failed(e) => eprintln!("load failed: {}", e),
/// }
/// ```
#[derive(Debug)]
pub struct ChannelDelegate {
    sender: Mutex<mpsc::Sender<LoadEvent>>,
}

impl ChannelDelegate {
    pub fn new() -> (Self, mpsc::Receiver<LoadEvent>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender: Mutex::new(sender),
            },
            receiver,
        )
    }

    fn send(&self, event: LoadEvent) {
        let Ok(sender) = self.sender.lock() else {
            return;
        };
        if sender.send(event).is_err() {
            tracing::debug!("Load event receiver dropped");
        }
    }
}

impl ServerListDelegate for ChannelDelegate {
    fn server_list_did_load(&self, _list: &PublicServerList) {
        self.send(LoadEvent::Loaded);
    }

    fn server_list_failed_loading(&self, error: &LoadError) {
        self.send(LoadEvent::Failed(error.clone()));
    }
}

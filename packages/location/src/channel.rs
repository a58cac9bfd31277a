//! In-process location provider driven by explicit pushes.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    Coordinates, LocationProvider, PositionListener, ProviderError, WatchId, WatchOptions,
};

/// A [`LocationProvider`] whose readings are supplied by the host.
///
/// Every [`push`](Self::push) or [`fail`](Self::fail) is delivered
/// synchronously, in call order, to every open watch.
#[derive(Default)]
pub struct ChannelProvider {
    watches: Mutex<BTreeMap<WatchId, Arc<dyn PositionListener>>>,
    next_id: AtomicU64,
    cleared: AtomicUsize,
    unsupported: bool,
}

impl ChannelProvider {
    /// Creates a provider with no open watches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that refuses every watch with
    /// [`ProviderError::Unsupported`].
    #[must_use]
    pub fn unsupported() -> Self {
        Self {
            unsupported: true,
            ..Self::default()
        }
    }

    /// Delivers a reading to every open watch.
    pub fn push(&self, coordinates: Coordinates) {
        for listener in self.listeners() {
            listener.on_position(coordinates);
        }
    }

    /// Delivers an error to every open watch.
    pub fn fail(&self, error: ProviderError) {
        for listener in self.listeners() {
            listener.on_error(error.clone());
        }
    }

    /// Number of watches currently open.
    #[must_use]
    pub fn active_watches(&self) -> usize {
        self.watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of watches that have been cleared so far.
    #[must_use]
    pub fn cleared_count(&self) -> usize {
        self.cleared.load(Ordering::Acquire)
    }

    // Listeners are cloned out so callbacks run without the lock held.
    fn listeners(&self) -> Vec<Arc<dyn PositionListener>> {
        self.watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }
}

impl LocationProvider for ChannelProvider {
    fn watch(
        &self,
        options: WatchOptions,
        listener: Arc<dyn PositionListener>,
    ) -> Result<WatchId, ProviderError> {
        if self.unsupported {
            return Err(ProviderError::Unsupported);
        }
        let id = WatchId(self.next_id.fetch_add(1, Ordering::Relaxed));
        log::debug!("Opening {id} with {options:?}");
        self.watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, listener);
        Ok(id)
    }

    fn clear_watch(&self, id: WatchId) {
        let removed = self
            .watches
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        if removed.is_some() {
            self.cleared.fetch_add(1, Ordering::AcqRel);
        } else {
            log::warn!("clear_watch called for unknown {id}");
        }
    }
}

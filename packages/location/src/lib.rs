#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Live position tracking.
//!
//! The device location provider is a push source: once a watch is opened it
//! calls back with either a reading or an error until the watch is cleared.
//! [`tracker::PositionTracker`] owns exactly one such watch and keeps only
//! the most recent reading. The watch is released exactly once on teardown.
//!
//! [`channel::ChannelProvider`] is an in-process provider whose readings are
//! pushed by the host.

pub mod channel;
pub mod tracker;

use std::sync::Arc;

pub use sos_map_location_models::{Coordinates, Position, ProviderError, WatchId, WatchOptions};
pub use tracker::{PositionTracker, Subscription};

/// Receives callbacks from an open provider watch.
///
/// Callbacks for one watch are delivered in the order the provider produced
/// them and never concurrently with each other.
pub trait PositionListener: Send + Sync {
    /// A new reading is available.
    fn on_position(&self, coordinates: Coordinates);

    /// A reading failed. The watch stays open.
    fn on_error(&self, error: ProviderError);
}

/// A device location provider.
pub trait LocationProvider: Send + Sync {
    /// Opens a continuous watch delivering readings to `listener`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unsupported`] if the device has no location
    /// capability, or another [`ProviderError`] if the watch cannot be
    /// opened.
    fn watch(
        &self,
        options: WatchOptions,
        listener: Arc<dyn PositionListener>,
    ) -> Result<WatchId, ProviderError>;

    /// Closes a watch. No callbacks for `id` are delivered afterwards.
    fn clear_watch(&self, id: WatchId);
}

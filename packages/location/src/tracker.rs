//! Latest-position state driven by a single provider watch.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::{
    Coordinates, LocationProvider, Position, PositionListener, ProviderError, WatchId,
    WatchOptions,
};

/// Source of timestamps for applied readings.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Shared state written by provider callbacks.
struct TrackerState {
    latest: watch::Sender<Option<Position>>,
    active: AtomicBool,
    clock: Clock,
}

impl PositionListener for TrackerState {
    fn on_position(&self, coordinates: Coordinates) {
        if !self.active.load(Ordering::Acquire) {
            log::debug!("Dropping reading delivered after teardown");
            return;
        }
        if !coordinates.is_valid() {
            log::warn!("Ignoring out-of-range reading {coordinates}");
            return;
        }

        let now = (self.clock)();
        self.latest.send_modify(|latest| {
            // observed_at must never move backwards, even if the wall clock does.
            let observed_at = match latest {
                Some(prev) if prev.observed_at > now => prev.observed_at,
                _ => now,
            };
            *latest = Some(Position {
                coordinates,
                observed_at,
            });
        });
        log::trace!("Position updated to {coordinates}");
    }

    fn on_error(&self, error: ProviderError) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        log::warn!("Error getting location: {error}");
    }
}

/// Owned handle to an open provider watch.
///
/// Dropping the handle unsubscribes.
pub struct Subscription {
    provider: Arc<dyn LocationProvider>,
    id: WatchId,
    state: Arc<TrackerState>,
    released: AtomicBool,
}

impl Subscription {
    /// The provider watch this handle owns.
    #[must_use]
    pub const fn id(&self) -> WatchId {
        self.id
    }

    /// Returns `true` once the watch has been released.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Releases the provider watch.
    ///
    /// Only the first call does anything; it returns `true`. Later calls
    /// return `false`.
    pub fn unsubscribe(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.state.active.store(false, Ordering::Release);
        self.provider.clear_watch(self.id);
        log::info!("Released location {}", self.id);
        true
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

/// Tracks the device's most recent position.
///
/// Holds no history: each reading replaces the previous one. Provider
/// errors are logged and leave the last known position in place.
pub struct PositionTracker {
    state: Arc<TrackerState>,
    subscription: Subscription,
}

impl PositionTracker {
    /// Opens a watch on `provider` and starts tracking.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the watch cannot be opened.
    pub fn start(
        provider: Arc<dyn LocationProvider>,
        options: WatchOptions,
    ) -> Result<Self, ProviderError> {
        Self::start_with_clock(provider, options, Arc::new(Utc::now))
    }

    /// Like [`Self::start`], stamping readings with `clock` instead of the
    /// system clock.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the watch cannot be opened.
    pub fn start_with_clock(
        provider: Arc<dyn LocationProvider>,
        options: WatchOptions,
        clock: Clock,
    ) -> Result<Self, ProviderError> {
        let (latest, _) = watch::channel(None);
        let state = Arc::new(TrackerState {
            latest,
            active: AtomicBool::new(true),
            clock,
        });

        let listener: Arc<dyn PositionListener> = state.clone();
        let id = provider.watch(options, listener)?;
        log::info!("Opened location {id} (high_accuracy={})", options.high_accuracy);

        Ok(Self {
            subscription: Subscription {
                provider,
                id,
                state: state.clone(),
                released: AtomicBool::new(false),
            },
            state,
        })
    }

    /// The latest known position, or `None` if no reading has arrived yet.
    #[must_use]
    pub fn latest(&self) -> Option<Position> {
        *self.state.latest.borrow()
    }

    /// Returns a receiver that is notified on every applied reading.
    #[must_use]
    pub fn updates(&self) -> watch::Receiver<Option<Position>> {
        self.state.latest.subscribe()
    }

    /// The underlying subscription handle.
    #[must_use]
    pub const fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Releases the provider watch. Idempotent.
    pub fn unsubscribe(&self) -> bool {
        self.subscription.unsubscribe()
    }
}

impl std::fmt::Debug for PositionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionTracker")
            .field("latest", &self.latest())
            .field("subscription", &self.subscription)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::TimeDelta;

    use super::*;
    use crate::channel::ChannelProvider;

    fn fixed_clock(times: Vec<DateTime<Utc>>) -> Clock {
        let times = Mutex::new(times.into_iter());
        Arc::new(move || {
            times
                .lock()
                .unwrap()
                .next()
                .expect("clock called more often than expected")
        })
    }

    #[test]
    fn unknown_until_first_reading() {
        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start(provider.clone(), WatchOptions::default()).unwrap();

        assert!(tracker.latest().is_none());

        provider.push(Coordinates::new(28.5, 77.2));
        let pos = tracker.latest().unwrap();
        assert_eq!(pos.coordinates, Coordinates::new(28.5, 77.2));
    }

    #[test]
    fn reading_replaces_previous() {
        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start(provider.clone(), WatchOptions::default()).unwrap();

        provider.push(Coordinates::new(1.0, 1.0));
        provider.push(Coordinates::new(2.0, 2.0));

        assert_eq!(
            tracker.latest().unwrap().coordinates,
            Coordinates::new(2.0, 2.0)
        );
    }

    #[test]
    fn error_keeps_last_known_position() {
        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start(provider.clone(), WatchOptions::default()).unwrap();

        provider.push(Coordinates::new(3.0, 4.0));
        provider.fail(ProviderError::Timeout);

        assert_eq!(
            tracker.latest().unwrap().coordinates,
            Coordinates::new(3.0, 4.0)
        );
    }

    #[test]
    fn permission_denied_stays_unknown() {
        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start(provider.clone(), WatchOptions::default()).unwrap();

        provider.fail(ProviderError::PermissionDenied);
        provider.fail(ProviderError::PermissionDenied);

        assert!(tracker.latest().is_none());
    }

    #[test]
    fn observed_at_never_moves_backwards() {
        let t0 = DateTime::<Utc>::UNIX_EPOCH + TimeDelta::seconds(100);
        let earlier = t0 - TimeDelta::seconds(30);
        let later = t0 + TimeDelta::seconds(5);

        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start_with_clock(
            provider.clone(),
            WatchOptions::default(),
            fixed_clock(vec![t0, earlier, later]),
        )
        .unwrap();

        provider.push(Coordinates::new(1.0, 1.0));
        assert_eq!(tracker.latest().unwrap().observed_at, t0);

        provider.push(Coordinates::new(1.5, 1.5));
        let pos = tracker.latest().unwrap();
        assert_eq!(pos.observed_at, t0);
        assert_eq!(pos.coordinates, Coordinates::new(1.5, 1.5));

        provider.push(Coordinates::new(2.0, 2.0));
        assert_eq!(tracker.latest().unwrap().observed_at, later);
    }

    #[test]
    fn invalid_reading_is_ignored() {
        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start(provider.clone(), WatchOptions::default()).unwrap();

        provider.push(Coordinates::new(10.0, 10.0));
        provider.push(Coordinates::new(f64::NAN, 10.0));

        assert_eq!(
            tracker.latest().unwrap().coordinates,
            Coordinates::new(10.0, 10.0)
        );
    }

    #[test]
    fn unsubscribe_is_idempotent_and_clears_once() {
        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start(provider.clone(), WatchOptions::default()).unwrap();
        assert_eq!(provider.active_watches(), 1);

        assert!(tracker.unsubscribe());
        assert!(!tracker.unsubscribe());
        assert!(tracker.subscription().is_released());

        assert_eq!(provider.active_watches(), 0);
        assert_eq!(provider.cleared_count(), 1);

        drop(tracker);
        assert_eq!(provider.cleared_count(), 1);
    }

    #[test]
    fn drop_releases_watch() {
        let provider = Arc::new(ChannelProvider::new());
        {
            let _tracker =
                PositionTracker::start(provider.clone(), WatchOptions::default()).unwrap();
            assert_eq!(provider.active_watches(), 1);
        }
        assert_eq!(provider.active_watches(), 0);
        assert_eq!(provider.cleared_count(), 1);
    }

    #[test]
    fn late_callback_does_not_mutate_state() {
        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start(provider.clone(), WatchOptions::default()).unwrap();

        provider.push(Coordinates::new(5.0, 5.0));
        let listener: Arc<dyn PositionListener> = tracker.state.clone();
        tracker.unsubscribe();

        listener.on_position(Coordinates::new(6.0, 6.0));
        assert_eq!(
            tracker.latest().unwrap().coordinates,
            Coordinates::new(5.0, 5.0)
        );
    }

    #[test]
    fn unsupported_provider_fails_to_start() {
        let provider = Arc::new(ChannelProvider::unsupported());
        let err = PositionTracker::start(provider, WatchOptions::default()).unwrap_err();
        assert_eq!(err, ProviderError::Unsupported);
    }

    #[tokio::test]
    async fn updates_receiver_sees_new_readings() {
        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start(provider.clone(), WatchOptions::default()).unwrap();
        let mut rx = tracker.updates();

        provider.push(Coordinates::new(7.0, 8.0));
        rx.changed().await.unwrap();

        let seen = *rx.borrow_and_update();
        assert_eq!(seen.unwrap().coordinates, Coordinates::new(7.0, 8.0));
    }
}

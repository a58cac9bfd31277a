#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Position and location provider types.
//!
//! A [`Position`] is a single successful reading from the device location
//! provider, stamped with the time it was observed. Readings are pushed by
//! the provider and never synthesised: the absence of a reading is modelled
//! by the caller as `None`, never as a placeholder coordinate.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A WGS84 coordinate pair in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns `true` if both components are finite and within the valid
    /// latitude/longitude ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Latitude rounded to 6 decimal places.
    #[must_use]
    pub fn lat_fixed(&self) -> String {
        format!("{:.6}", self.lat)
    }

    /// Longitude rounded to 6 decimal places.
    #[must_use]
    pub fn lng_fixed(&self) -> String {
        format!("{:.6}", self.lng)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// The latest known position of the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    /// Where the device was.
    pub coordinates: Coordinates,
    /// When the reading was applied.
    pub observed_at: DateTime<Utc>,
}

/// Options passed to the provider when opening a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchOptions {
    /// Request the most accurate fix the device can produce.
    pub high_accuracy: bool,
    /// Maximum time the provider may take to produce a reading.
    pub timeout: Duration,
    /// Maximum age of a cached reading the provider may return.
    pub maximum_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(5000),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Opaque handle identifying an open provider watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatchId(pub u64);

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// A failed location read reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The user refused (or has not yet granted) location access.
    #[error("location permission denied")]
    PermissionDenied,

    /// The device could not determine its position.
    #[error("position unavailable")]
    PositionUnavailable,

    /// No reading was produced within the configured timeout.
    #[error("timed out waiting for a position")]
    Timeout,

    /// The device has no location provider at all.
    #[error("geolocation is not supported on this device")]
    Unsupported,

    /// Any other provider failure.
    #[error("location provider error: {message}")]
    Other {
        /// Description of the failure.
        message: String,
    },
}

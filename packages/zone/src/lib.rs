#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Risk-zone classification and map overlay.
//!
//! The crime-density dataset is loaded once into a [`dataset::ZoneDataset`]
//! and never mutated. [`classify`] turns each zone into marker
//! specifications; [`overlay::ZoneOverlay`] owns the set of zone markers
//! currently shown on a [`surface::MapSurface`] and replaces that set
//! wholesale whenever the danger-only filter changes.

pub mod classify;
pub mod dataset;
pub mod geojson_surface;
pub mod overlay;
pub mod surface;

pub use classify::{classify, popup_text, render, visible_zones};
pub use dataset::ZoneDataset;
pub use sos_map_zone_models::{
    CrimeZone, DangerTier, MapView, MarkerColor, MarkerSpec, MarkerStyle,
};

use thiserror::Error;

/// Errors from loading a zone dataset.
#[derive(Debug, Error)]
pub enum ZoneError {
    /// Reading the dataset file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset is not valid JSON or has the wrong shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record parsed but is unusable.
    #[error("Invalid zone at index {index}: {message}")]
    InvalidZone {
        /// Position of the record in the dataset.
        index: usize,
        /// What is wrong with it.
        message: String,
    },
}

//! Marker bookkeeping for the zone overlay and the live position marker.

use std::sync::Arc;

use sos_map_location_models::Coordinates;
use sos_map_zone_models::{MarkerSpec, MarkerStyle};

use crate::dataset::ZoneDataset;
use crate::surface::{MapSurface, MarkerHandle};
use crate::{classify, render, visible_zones};

/// The crime-zone layer of the map.
///
/// Tracks which zone markers are on the surface. Every redraw removes all
/// of them before adding the new set, so no marker survives a filter
/// change.
#[derive(Debug)]
pub struct ZoneOverlay {
    dataset: Arc<ZoneDataset>,
    danger_only: bool,
    displayed: Vec<MarkerHandle>,
}

impl ZoneOverlay {
    /// Creates an overlay with nothing drawn and the filter off.
    #[must_use]
    pub const fn new(dataset: Arc<ZoneDataset>) -> Self {
        Self {
            dataset,
            danger_only: false,
            displayed: Vec::new(),
        }
    }

    /// Whether only high-danger zones are shown.
    #[must_use]
    pub const fn danger_only(&self) -> bool {
        self.danger_only
    }

    /// Handles of the zone markers currently on the surface, in draw order.
    #[must_use]
    pub fn displayed(&self) -> &[MarkerHandle] {
        &self.displayed
    }

    /// The marker specs the current filter selects, in dataset order.
    #[must_use]
    pub fn markers(&self) -> Vec<MarkerSpec> {
        visible_zones(self.dataset.zones(), self.danger_only)
            .into_iter()
            .map(|zone| render(zone, classify(zone)))
            .collect()
    }

    /// Sets the filter and redraws. Returns the number of markers drawn.
    pub fn set_filter(&mut self, surface: &mut dyn MapSurface, danger_only: bool) -> usize {
        self.danger_only = danger_only;
        self.redraw(surface)
    }

    /// Flips the filter and redraws. Returns the new filter value.
    pub fn toggle(&mut self, surface: &mut dyn MapSurface) -> bool {
        self.set_filter(surface, !self.danger_only);
        self.danger_only
    }

    /// Removes every displayed zone marker and draws the current selection.
    /// Returns the number of markers drawn.
    pub fn redraw(&mut self, surface: &mut dyn MapSurface) -> usize {
        self.clear(surface);

        let markers = self.markers();
        self.displayed = markers.iter().map(|m| surface.add_marker(m)).collect();

        log::debug!(
            "Drew {} zone markers (danger_only={})",
            self.displayed.len(),
            self.danger_only
        );
        self.displayed.len()
    }

    /// Removes every displayed zone marker.
    pub fn clear(&mut self, surface: &mut dyn MapSurface) {
        for handle in self.displayed.drain(..) {
            surface.remove_marker(handle);
        }
    }
}

/// Popup text of the live position marker.
pub const LIVE_MARKER_POPUP: &str = "You are here";

/// The marker that follows the device's position.
///
/// Nothing is drawn until the first reading; after that each reading moves
/// the marker and pans the map to it.
#[derive(Debug, Default)]
pub struct LiveMarker {
    handle: Option<MarkerHandle>,
}

impl LiveMarker {
    /// Creates a live marker with nothing drawn.
    #[must_use]
    pub const fn new() -> Self {
        Self { handle: None }
    }

    /// The marker handle, once the first reading has been drawn.
    #[must_use]
    pub const fn handle(&self) -> Option<MarkerHandle> {
        self.handle
    }

    /// Moves the marker to `position` and pans the map there.
    pub fn update(&mut self, surface: &mut dyn MapSurface, position: Coordinates) {
        match self.handle {
            Some(handle) => surface.move_marker(handle, position),
            None => {
                self.handle = Some(surface.add_marker(&MarkerSpec {
                    position,
                    style: MarkerStyle::Pin,
                    popup_text: Some(LIVE_MARKER_POPUP.to_string()),
                }));
            }
        }
        surface.pan_to(position);
    }

    /// Removes the marker from the surface.
    pub fn remove(&mut self, surface: &mut dyn MapSurface) {
        if let Some(handle) = self.handle.take() {
            surface.remove_marker(handle);
        }
    }
}

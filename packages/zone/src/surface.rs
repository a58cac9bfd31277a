//! The display surface zone and position markers are drawn on.

use sos_map_location_models::Coordinates;
use sos_map_zone_models::MarkerSpec;

/// Identifies a marker previously added to a [`MapSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

/// A map that can show markers.
///
/// Implementations wrap a tile renderer (or, for export, a plain feature
/// list). Construction plays the role of creating the map at an initial
/// [`MapView`](sos_map_zone_models::MapView).
pub trait MapSurface {
    /// Draws a marker and returns its handle.
    fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerHandle;

    /// Removes a marker. Unknown handles are ignored.
    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Moves an existing marker.
    fn move_marker(&mut self, handle: MarkerHandle, position: Coordinates);

    /// Re-centers the viewport.
    fn pan_to(&mut self, position: Coordinates);
}

//! A [`MapSurface`] that records markers as `GeoJSON` features.
//!
//! Used to export the overlay for inspection in any `GeoJSON` viewer when
//! no tile renderer is attached.

use std::collections::BTreeMap;

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use sos_map_location_models::Coordinates;
use sos_map_zone_models::{MapView, MarkerSpec, MarkerStyle};

use crate::surface::{MapSurface, MarkerHandle};

/// In-memory map surface backed by a marker table.
#[derive(Debug, Clone)]
pub struct GeoJsonSurface {
    view: MapView,
    next_handle: u64,
    markers: BTreeMap<MarkerHandle, MarkerSpec>,
}

impl GeoJsonSurface {
    /// Creates an empty surface centered on `view`.
    #[must_use]
    pub const fn new(view: MapView) -> Self {
        Self {
            view,
            next_handle: 0,
            markers: BTreeMap::new(),
        }
    }

    /// The current viewport.
    #[must_use]
    pub const fn view(&self) -> MapView {
        self.view
    }

    /// Markers on the surface, in the order they were added.
    pub fn markers(&self) -> impl Iterator<Item = (MarkerHandle, &MarkerSpec)> {
        self.markers.iter().map(|(handle, spec)| (*handle, spec))
    }

    /// Number of markers on the surface.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Returns `true` if nothing is drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Builds a `FeatureCollection` with one point feature per marker.
    ///
    /// The viewport is stored as the `center` and `zoom` foreign members.
    #[must_use]
    pub fn feature_collection(&self) -> FeatureCollection {
        let features = self
            .markers
            .iter()
            .map(|(handle, spec)| marker_feature(*handle, spec))
            .collect();

        let mut foreign_members = JsonObject::new();
        foreign_members.insert(
            "center".to_string(),
            JsonValue::from(vec![self.view.center.lng, self.view.center.lat]),
        );
        foreign_members.insert("zoom".to_string(), JsonValue::from(self.view.zoom));

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        }
    }

    /// Serializes the surface as pretty-printed `GeoJSON`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_geojson_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.feature_collection())
    }
}

fn marker_feature(handle: MarkerHandle, spec: &MarkerSpec) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("handle".to_string(), JsonValue::from(handle.0));

    match spec.style {
        MarkerStyle::Circle {
            color,
            radius,
            fill_opacity,
        } => {
            properties.insert("kind".to_string(), JsonValue::from("circle"));
            properties.insert("color".to_string(), JsonValue::from(color.to_string()));
            properties.insert("radius".to_string(), JsonValue::from(radius));
            properties.insert("fillOpacity".to_string(), JsonValue::from(fill_opacity));
        }
        MarkerStyle::Pin => {
            properties.insert("kind".to_string(), JsonValue::from("pin"));
        }
    }

    if let Some(popup) = &spec.popup_text {
        properties.insert("popup".to_string(), JsonValue::from(popup.as_str()));
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            spec.position.lng,
            spec.position.lat,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

impl MapSurface for GeoJsonSurface {
    fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.markers.insert(handle, marker.clone());
        handle
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        if self.markers.remove(&handle).is_none() {
            log::debug!("remove_marker: unknown handle {}", handle.0);
        }
    }

    fn move_marker(&mut self, handle: MarkerHandle, position: Coordinates) {
        if let Some(marker) = self.markers.get_mut(&handle) {
            marker.position = position;
        }
    }

    fn pan_to(&mut self, position: Coordinates) {
        self.view.center = position;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ZoneDataset;
    use crate::overlay::{LiveMarker, ZoneOverlay};

    #[test]
    fn exports_zone_circles() {
        let dataset = Arc::new(
            ZoneDataset::from_json_str(
                r#"[{"nm_pol": "SAKET", "lat": 28.5245, "long": 77.2066, "totalcrime": 620}]"#,
            )
            .unwrap(),
        );
        let mut surface = GeoJsonSurface::new(MapView::default());
        ZoneOverlay::new(dataset).redraw(&mut surface);

        let json: serde_json::Value =
            serde_json::from_str(&surface.to_geojson_string().unwrap()).unwrap();

        assert_eq!(json["type"], "FeatureCollection");
        let feature = &json["features"][0];
        assert_eq!(feature["geometry"]["coordinates"][0], 77.2066);
        assert_eq!(feature["geometry"]["coordinates"][1], 28.5245);
        assert_eq!(feature["properties"]["kind"], "circle");
        assert_eq!(feature["properties"]["color"], "red");
        assert_eq!(feature["properties"]["radius"], 12);
        assert_eq!(
            feature["properties"]["popup"],
            "<b>SAKET</b><br/>Total Crimes: 620"
        );
        assert_eq!(json["zoom"], 13);
    }

    #[test]
    fn pan_moves_center() {
        let mut surface = GeoJsonSurface::new(MapView::default());
        let mut live = LiveMarker::new();

        live.update(&mut surface, Coordinates::new(12.0, 77.0));

        assert_eq!(surface.view().center, Coordinates::new(12.0, 77.0));
        assert_eq!(surface.len(), 1);
        let fc = surface.feature_collection();
        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["kind"], "pin");
    }

    #[test]
    fn removed_markers_are_not_exported() {
        let mut surface = GeoJsonSurface::new(MapView::default());
        let handle = surface.add_marker(&MarkerSpec {
            position: Coordinates::new(1.0, 2.0),
            style: MarkerStyle::Pin,
            popup_text: None,
        });
        surface.remove_marker(handle);

        assert!(surface.is_empty());
        assert!(surface.feature_collection().features.is_empty());
    }
}

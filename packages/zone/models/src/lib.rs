#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Crime zone records, danger tiers, and map marker types.
//!
//! A [`CrimeZone`] is one row of the static crime-density dataset: a police
//! station jurisdiction with its total recorded crime count. Its
//! [`DangerTier`] is a pure function of that count.

use serde::{Deserialize, Serialize};
use sos_map_location_models::Coordinates;
use strum_macros::{AsRefStr, Display, EnumString};

/// Counts above this are [`DangerTier::Medium`] (or higher).
pub const MEDIUM_THRESHOLD: u64 = 200;

/// Counts above this are [`DangerTier::High`].
pub const HIGH_THRESHOLD: u64 = 500;

/// One zone of the crime-density dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeZone {
    /// Police station / zone name.
    #[serde(rename = "nm_pol")]
    pub name: String,
    /// Latitude of the zone marker.
    pub lat: f64,
    /// Longitude of the zone marker.
    #[serde(rename = "long")]
    pub lng: f64,
    /// Total recorded crimes in the zone.
    #[serde(rename = "totalcrime")]
    pub total_crime_count: u64,
}

impl CrimeZone {
    /// The zone's marker position.
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Danger level of a zone.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DangerTier {
    /// At most [`MEDIUM_THRESHOLD`] crimes.
    Low,
    /// More than [`MEDIUM_THRESHOLD`], at most [`HIGH_THRESHOLD`].
    Medium,
    /// More than [`HIGH_THRESHOLD`] crimes.
    High,
}

impl DangerTier {
    /// Classifies a total crime count.
    #[must_use]
    pub const fn for_count(total_crime_count: u64) -> Self {
        if total_crime_count > HIGH_THRESHOLD {
            Self::High
        } else if total_crime_count > MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// The marker color used for this tier.
    #[must_use]
    pub const fn color(self) -> MarkerColor {
        match self {
            Self::High => MarkerColor::Red,
            Self::Medium => MarkerColor::Orange,
            Self::Low => MarkerColor::Green,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High]
    }
}

/// Named marker colors understood by the map surface.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MarkerColor {
    /// High danger.
    Red,
    /// Medium danger.
    Orange,
    /// Low danger.
    Green,
}

/// How a marker is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MarkerStyle {
    /// A filled circle of fixed screen radius.
    Circle {
        /// Stroke and fill color.
        color: MarkerColor,
        /// Radius in pixels.
        radius: u32,
        /// Fill opacity, 0.0-1.0.
        fill_opacity: f64,
    },
    /// The default location pin.
    Pin,
}

/// Everything a map surface needs to draw one marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSpec {
    /// Where the marker goes.
    pub position: Coordinates,
    /// How it is drawn.
    pub style: MarkerStyle,
    /// Popup HTML shown when the marker is selected.
    pub popup_text: Option<String>,
}

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    /// Map center.
    pub center: Coordinates,
    /// Tile zoom level.
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: Coordinates::new(28.53632, 77.2492),
            zoom: 13,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries() {
        assert_eq!(DangerTier::for_count(0), DangerTier::Low);
        assert_eq!(DangerTier::for_count(200), DangerTier::Low);
        assert_eq!(DangerTier::for_count(201), DangerTier::Medium);
        assert_eq!(DangerTier::for_count(500), DangerTier::Medium);
        assert_eq!(DangerTier::for_count(501), DangerTier::High);
    }

    #[test]
    fn tier_colors() {
        assert_eq!(DangerTier::High.color(), MarkerColor::Red);
        assert_eq!(DangerTier::Medium.color(), MarkerColor::Orange);
        assert_eq!(DangerTier::Low.color(), MarkerColor::Green);
        assert_eq!(MarkerColor::Orange.to_string(), "orange");
    }

    #[test]
    fn tiers_are_ordered_by_danger() {
        let tiers = DangerTier::all();
        for window in tiers.windows(2) {
            assert!(window[0] < window[1]);
        }
    }

    #[test]
    fn deserializes_dataset_record() {
        let json = serde_json::json!({
            "nm_pol": "HAUZ KHAS",
            "lat": 28.5494,
            "long": 77.2001,
            "totalcrime": 612
        });
        let zone: CrimeZone = serde_json::from_value(json).unwrap();
        assert_eq!(zone.name, "HAUZ KHAS");
        assert!((zone.lng - 77.2001).abs() < 1e-9);
        assert_eq!(zone.total_crime_count, 612);
    }

    #[test]
    fn negative_count_is_rejected() {
        let json = serde_json::json!({
            "nm_pol": "X",
            "lat": 0.0,
            "long": 0.0,
            "totalcrime": -1
        });
        assert!(serde_json::from_value::<CrimeZone>(json).is_err());
    }

    #[test]
    fn default_map_view() {
        let view = MapView::default();
        assert_eq!(view.zoom, 13);
        assert_eq!(view.center, Coordinates::new(28.53632, 77.2492));
    }
}

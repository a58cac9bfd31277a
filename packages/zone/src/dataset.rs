//! Loading the static crime-density dataset.
//!
//! The bundled dataset is embedded at compile time. Alternate datasets use
//! the same JSON shape: an array of
//! `{ "nm_pol": string, "lat": number, "long": number, "totalcrime": integer }`.

use std::path::Path;

use sos_map_zone_models::{CrimeZone, DangerTier};

use crate::{ZoneError, classify};

const BUNDLED_ZONES: &str = include_str!("../data/crime_zones.json");

/// An immutable, ordered list of crime zones.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneDataset {
    zones: Vec<CrimeZone>,
}

impl ZoneDataset {
    /// Loads the dataset embedded in the binary.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError`] if the embedded JSON is malformed.
    pub fn bundled() -> Result<Self, ZoneError> {
        let dataset = Self::from_json_str(BUNDLED_ZONES)?;
        log::info!("Loaded {} bundled crime zones", dataset.len());
        Ok(dataset)
    }

    /// Parses a dataset from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Json`] if the text is not a valid zone array, or
    /// [`ZoneError::InvalidZone`] if any record has non-finite coordinates.
    pub fn from_json_str(json: &str) -> Result<Self, ZoneError> {
        let zones: Vec<CrimeZone> = serde_json::from_str(json)?;
        Self::new(zones)
    }

    /// Reads and parses a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::Io`] if the file cannot be read, or any error
    /// from [`Self::from_json_str`].
    pub fn from_path(path: &Path) -> Result<Self, ZoneError> {
        let json = std::fs::read_to_string(path)?;
        let dataset = Self::from_json_str(&json)?;
        log::info!("Loaded {} crime zones from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Wraps already-parsed zones.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidZone`] if any zone has non-finite
    /// coordinates.
    pub fn new(zones: Vec<CrimeZone>) -> Result<Self, ZoneError> {
        for (index, zone) in zones.iter().enumerate() {
            if !zone.lat.is_finite() || !zone.lng.is_finite() {
                return Err(ZoneError::InvalidZone {
                    index,
                    message: format!("non-finite coordinates for {}", zone.name),
                });
            }
        }
        Ok(Self { zones })
    }

    /// All zones in dataset order.
    #[must_use]
    pub fn zones(&self) -> &[CrimeZone] {
        &self.zones
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Returns `true` if the dataset has no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Number of zones in `tier`.
    #[must_use]
    pub fn count_in_tier(&self, tier: DangerTier) -> usize {
        self.zones.iter().filter(|z| classify(z) == tier).count()
    }
}

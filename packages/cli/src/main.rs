#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Command-line personal safety client.
//!
//! `sos_map zones` classifies the crime-density dataset, `sos_map send`
//! raises a one-shot SOS alert for a given location, and running without a
//! subcommand opens an interactive session that keeps a live position,
//! an emergency contact list, and the risk-zone overlay together.
//!
//! Alerts are delivered through `EmailJS`; see
//! [`sos_map_alert::emailjs::EmailJsConfig::from_env`] for the variables
//! it reads.

mod interactive;
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use sos_map_alert::emailjs::{EmailJsConfig, EmailJsTransport};
use sos_map_alert::{AlertDispatcher, DispatchStatus};
use sos_map_contacts::{ContactDraft, ContactRegistry};
use sos_map_location::channel::ChannelProvider;
use sos_map_location::{Coordinates, PositionTracker, WatchOptions};
use sos_map_zone::geojson_surface::GeoJsonSurface;
use sos_map_zone::overlay::ZoneOverlay;
use sos_map_zone::{MapView, ZoneDataset};

#[derive(Parser)]
#[command(
    name = "sos_map",
    about = "Live location, emergency contacts, SOS alerts, and crime risk zones"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the crime-density dataset by danger tier
    Zones {
        /// Only show high-danger zones
        #[arg(long)]
        danger_only: bool,

        /// Zone dataset JSON (defaults to the bundled dataset)
        #[arg(long)]
        zones: Option<PathBuf>,

        /// Write the zone overlay as `GeoJSON` to this file instead of
        /// printing a table
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Send an SOS alert for a location to up to four contacts
    Send {
        /// Latitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Longitude in degrees
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,

        /// Contact as "name,phone,email" (repeatable)
        #[arg(long = "contact", required = true)]
        contacts: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let cli = Cli::parse();

    match cli.command {
        None => interactive::run().await,
        Some(Commands::Zones {
            danger_only,
            zones,
            output,
        }) => run_zones(danger_only, zones, output),
        Some(Commands::Send { lat, lng, contacts }) => run_send(lat, lng, &contacts).await,
    }
}

/// Loads the dataset at `path`, or the bundled one.
fn load_dataset(path: Option<PathBuf>) -> Result<ZoneDataset, sos_map_zone::ZoneError> {
    match path {
        Some(path) => ZoneDataset::from_path(&path),
        None => ZoneDataset::bundled(),
    }
}

fn run_zones(
    danger_only: bool,
    zones: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = Arc::new(load_dataset(zones)?);

    let Some(output) = output else {
        report::print_zone_table(dataset.zones(), danger_only);
        return Ok(());
    };

    let mut surface = GeoJsonSurface::new(MapView::default());
    let mut overlay = ZoneOverlay::new(dataset);
    let drawn = overlay.set_filter(&mut surface, danger_only);

    std::fs::write(&output, surface.to_geojson_string()?)?;
    println!("Wrote {drawn} zone marker(s) to {}", output.display());
    Ok(())
}

async fn run_send(
    lat: f64,
    lng: f64,
    contact_args: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let coordinates = Coordinates::new(lat, lng);
    if !coordinates.is_valid() {
        return Err(format!(
            "invalid coordinates {lat}, {lng}: latitude must be within -90..=90 \
             and longitude within -180..=180"
        )
        .into());
    }

    let mut registry = ContactRegistry::new();
    for arg in contact_args {
        let draft = parse_contact(arg)?;
        registry.add(&draft)?;
    }

    let config = EmailJsConfig::from_env()?;
    let dispatcher = AlertDispatcher::new(Arc::new(EmailJsTransport::new(config)));

    let provider = Arc::new(ChannelProvider::new());
    let tracker = PositionTracker::start(provider.clone(), WatchOptions::default())?;
    provider.push(coordinates);

    let result = dispatcher.dispatch(tracker.latest(), registry.list()).await;
    tracker.unsubscribe();

    let report = result?;
    report::print_dispatch_report(&report);

    match report.status() {
        DispatchStatus::AllSucceeded => Ok(()),
        status => Err(format!("alert not delivered to every contact ({status})").into()),
    }
}

/// Parses a `name,phone,email` contact argument.
///
/// Fields are split on the first two commas, so the email may not contain
/// a comma but nothing else is restricted here; the registry validates
/// the draft.
fn parse_contact(arg: &str) -> Result<ContactDraft, String> {
    let mut parts = arg.splitn(3, ',');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(phone), Some(email)) => Ok(ContactDraft::new(name, phone, email)),
        _ => Err(format!(
            "invalid contact {arg:?}: expected \"name,phone,email\""
        )),
    }
}

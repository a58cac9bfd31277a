//! Menu-driven safety session.
//!
//! Holds one position watch, the contact registry, and the zone overlay
//! for the life of the session. Location readings are entered by hand and
//! flow through the tracker exactly as device readings would.

use std::sync::Arc;

use chrono::Local;
use dialoguer::{Confirm, Input, Select};
use sos_map_alert::emailjs::{EmailJsConfig, EmailJsTransport};
use sos_map_alert::{AlertDispatcher, DispatchError, format_local_time};
use sos_map_contacts::{ContactField, ContactRegistry, MAX_CONTACTS};
use sos_map_location::channel::ChannelProvider;
use sos_map_location::{Coordinates, Position, PositionTracker, ProviderError, WatchOptions};
use sos_map_zone::geojson_surface::GeoJsonSurface;
use sos_map_zone::overlay::{LiveMarker, ZoneOverlay};
use sos_map_zone::{MapView, ZoneDataset};
use tokio::sync::watch;

use crate::report;

/// Default file the map overlay is exported to.
const DEFAULT_EXPORT_PATH: &str = "sos_map.geojson";

/// Top-level actions in the session menu.
enum SessionAction {
    Status,
    SendAlert,
    EnterLocation,
    LocationError,
    ListContacts,
    AddContact,
    RemoveContact,
    ToggleDangerZones,
    ExportMap,
    Quit,
}

impl SessionAction {
    const ALL: &[Self] = &[
        Self::Status,
        Self::SendAlert,
        Self::EnterLocation,
        Self::LocationError,
        Self::ListContacts,
        Self::AddContact,
        Self::RemoveContact,
        Self::ToggleDangerZones,
        Self::ExportMap,
        Self::Quit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Status => "Show status",
            Self::SendAlert => "SEND SOS ALERT",
            Self::EnterLocation => "Enter a location reading",
            Self::LocationError => "Report a location failure",
            Self::ListContacts => "List emergency contacts",
            Self::AddContact => "Add emergency contact",
            Self::RemoveContact => "Remove emergency contact",
            Self::ToggleDangerZones => "Toggle danger-zones-only filter",
            Self::ExportMap => "Export map (GeoJSON)",
            Self::Quit => "Quit",
        }
    }
}

struct Session {
    provider: Arc<ChannelProvider>,
    tracker: PositionTracker,
    updates: watch::Receiver<Option<Position>>,
    registry: ContactRegistry,
    surface: GeoJsonSurface,
    overlay: ZoneOverlay,
    live: LiveMarker,
    dispatcher: Option<AlertDispatcher>,
}

/// Runs the interactive session until the user quits.
///
/// # Errors
///
/// Returns an error if the zone dataset cannot be loaded, the location
/// watch cannot be opened, or a prompt fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::open()?;

    println!("SOS Map");
    println!();

    let labels: Vec<&str> = SessionAction::ALL
        .iter()
        .map(SessionAction::label)
        .collect();

    loop {
        session.apply_updates();

        let idx = Select::new()
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(0)
            .interact()?;

        match SessionAction::ALL[idx] {
            SessionAction::Status => session.print_status(),
            SessionAction::SendAlert => session.send_alert().await,
            SessionAction::EnterLocation => session.enter_location()?,
            SessionAction::LocationError => session.report_location_error()?,
            SessionAction::ListContacts => session.list_contacts(),
            SessionAction::AddContact => session.add_contact()?,
            SessionAction::RemoveContact => session.remove_contact()?,
            SessionAction::ToggleDangerZones => session.toggle_danger_zones(),
            SessionAction::ExportMap => session.export_map()?,
            SessionAction::Quit => break,
        }
        println!();
    }

    session.close();
    Ok(())
}

impl Session {
    fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let dataset = Arc::new(ZoneDataset::bundled()?);

        let provider = Arc::new(ChannelProvider::new());
        let tracker = PositionTracker::start(provider.clone(), WatchOptions::default())?;
        let updates = tracker.updates();

        let mut surface = GeoJsonSurface::new(MapView::default());
        let mut overlay = ZoneOverlay::new(dataset);
        overlay.redraw(&mut surface);

        let dispatcher = match EmailJsConfig::from_env() {
            Ok(config) => Some(AlertDispatcher::new(Arc::new(EmailJsTransport::new(
                config,
            )))),
            Err(e) => {
                log::warn!("Alerts disabled: {e}");
                None
            }
        };

        Ok(Self {
            provider,
            tracker,
            updates,
            registry: ContactRegistry::new(),
            surface,
            overlay,
            live: LiveMarker::new(),
            dispatcher,
        })
    }

    /// Moves the live marker to the tracker's latest position, if it has
    /// changed since the last call.
    fn apply_updates(&mut self) {
        if !self.updates.has_changed().unwrap_or(false) {
            return;
        }
        let latest = *self.updates.borrow_and_update();
        if let Some(position) = latest {
            self.live.update(&mut self.surface, position.coordinates);
        }
    }

    fn print_status(&self) {
        println!();
        println!("Time:      {}", format_local_time(&Local::now()));
        match self.tracker.latest() {
            Some(position) => {
                println!("Latitude:  {}", position.coordinates.lat_fixed());
                println!("Longitude: {}", position.coordinates.lng_fixed());
            }
            None => println!("Location:  Loading..."),
        }
        println!("Contacts:  {}/{MAX_CONTACTS}", self.registry.len());
        println!(
            "Zones:     {} shown ({})",
            self.overlay.displayed().len(),
            if self.overlay.danger_only() {
                "danger zones only"
            } else {
                "all zones"
            }
        );
        if self.dispatcher.is_none() {
            println!("Alerts:    disabled (EmailJS is not configured)");
        }
    }

    async fn send_alert(&self) {
        if !AlertDispatcher::can_dispatch(self.registry.list()) {
            println!("Add at least one emergency contact first.");
            return;
        }
        let Some(dispatcher) = &self.dispatcher else {
            println!(
                "Alerts are disabled: set EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID, \
                 and EMAILJS_PUBLIC_KEY."
            );
            return;
        };

        match dispatcher
            .dispatch(self.tracker.latest(), self.registry.list())
            .await
        {
            Ok(report) => report::print_dispatch_report(&report),
            Err(DispatchError::PositionUnavailable) => {
                println!("Location is still loading. Please wait a moment.");
            }
        }
    }

    fn enter_location(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let lat: f64 = Input::new().with_prompt("Latitude").interact_text()?;
        let lng: f64 = Input::new().with_prompt("Longitude").interact_text()?;

        let coordinates = Coordinates::new(lat, lng);
        if !coordinates.is_valid() {
            println!("Ignoring out-of-range reading {coordinates}.");
        }
        self.provider.push(coordinates);
        self.apply_updates();
        Ok(())
    }

    fn report_location_error(&self) -> Result<(), Box<dyn std::error::Error>> {
        let errors = [
            ProviderError::PermissionDenied,
            ProviderError::PositionUnavailable,
            ProviderError::Timeout,
        ];
        let labels: Vec<String> = errors.iter().map(ToString::to_string).collect();

        let idx = Select::new()
            .with_prompt("Failure")
            .items(&labels)
            .default(0)
            .interact()?;

        self.provider.fail(errors[idx].clone());
        Ok(())
    }

    fn list_contacts(&self) {
        if self.registry.is_empty() {
            println!("No emergency contacts saved.");
            return;
        }

        println!();
        println!("{:<4} {:<24} {:<20} EMAIL", "#", "NAME", "PHONE");
        println!("{}", "-".repeat(80));
        for (i, contact) in self.registry.list().iter().enumerate() {
            println!(
                "{:<4} {:<24} {:<20} {}",
                i + 1,
                contact.name(),
                contact.phone(),
                contact.email()
            );
        }
        println!("\n{}/{MAX_CONTACTS} contact(s)", self.registry.len());
    }

    /// Prompts for each field of the pending draft and submits it.
    ///
    /// A rejected draft keeps its values so the next attempt starts from
    /// them.
    fn add_contact(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.registry.can_add() {
            println!("At most {MAX_CONTACTS} emergency contacts can be saved.");
            return Ok(());
        }

        for field in ContactField::all() {
            let value: String = Input::new()
                .with_prompt(field.to_string())
                .with_initial_text(self.registry.draft().get(*field))
                .allow_empty(true)
                .interact_text()?;
            self.registry.draft_mut().set(*field, value);
        }

        match self.registry.submit_draft() {
            Ok(contact) => println!("Added {}.", contact.name()),
            Err(reason) => {
                println!("Not added: {reason}.");
                let keep = Confirm::new()
                    .with_prompt("Keep what you entered for next time?")
                    .default(true)
                    .interact()?;
                if !keep {
                    self.registry.discard_draft();
                }
            }
        }
        Ok(())
    }

    fn remove_contact(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.registry.is_empty() {
            println!("No emergency contacts saved.");
            return Ok(());
        }

        let mut labels: Vec<String> = self
            .registry
            .list()
            .iter()
            .map(|c| format!("{} <{}>", c.name(), c.email()))
            .collect();
        labels.push("Cancel".to_string());

        let idx = Select::new()
            .with_prompt("Remove which contact?")
            .items(&labels)
            .default(0)
            .interact()?;

        let Some(contact) = self.registry.list().get(idx) else {
            return Ok(());
        };
        let (id, name) = (contact.id(), contact.name().to_string());

        if self.registry.remove(id) {
            println!("Removed {name}.");
        }
        Ok(())
    }

    fn toggle_danger_zones(&mut self) {
        let danger_only = self.overlay.toggle(&mut self.surface);
        println!(
            "Showing {} {}.",
            self.overlay.displayed().len(),
            if danger_only {
                "danger zone(s)"
            } else {
                "zone(s)"
            }
        );
    }

    fn export_map(&self) -> Result<(), Box<dyn std::error::Error>> {
        let path: String = Input::new()
            .with_prompt("Output file")
            .default(DEFAULT_EXPORT_PATH.to_string())
            .interact_text()?;

        std::fs::write(&path, self.surface.to_geojson_string()?)?;
        println!("Wrote {} marker(s) to {path}", self.surface.len());
        Ok(())
    }

    fn close(mut self) {
        self.live.remove(&mut self.surface);
        self.overlay.clear(&mut self.surface);
        self.tracker.unsubscribe();
        log::info!(
            "Session closed ({} watch(es) cleared)",
            self.provider.cleared_count()
        );
    }
}

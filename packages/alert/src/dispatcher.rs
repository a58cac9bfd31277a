//! Sequential, per-recipient-isolated alert fan-out.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};
use sos_map_alert_models::{AlertPayload, DeliveryOutcome, DispatchReport, DispatchStatus};
use sos_map_contacts_models::Contact;
use sos_map_location_models::Position;

use crate::{DispatchError, EmailTransport, format_local_time};

/// Source of the local time stamped on each alert.
pub type LocalClock = Arc<dyn Fn() -> DateTime<FixedOffset> + Send + Sync>;

/// Sends an SOS alert to every contact.
///
/// No retries are attempted; re-dispatching is up to the caller.
pub struct AlertDispatcher {
    transport: Arc<dyn EmailTransport>,
    clock: LocalClock,
}

impl AlertDispatcher {
    /// Creates a dispatcher stamping alerts with the system's local time.
    #[must_use]
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self::with_clock(transport, Arc::new(|| Local::now().fixed_offset()))
    }

    /// Creates a dispatcher stamping alerts with `clock`.
    #[must_use]
    pub fn with_clock(transport: Arc<dyn EmailTransport>, clock: LocalClock) -> Self {
        Self { transport, clock }
    }

    /// Whether a dispatch to `contacts` would notify anyone.
    #[must_use]
    pub const fn can_dispatch(contacts: &[Contact]) -> bool {
        !contacts.is_empty()
    }

    /// Sends one alert per contact, in order, and reports every outcome.
    ///
    /// The payload is built once from `position` before the first send, so
    /// readings that arrive mid-dispatch do not affect it. Each send is
    /// awaited before the next begins. A failed send is logged and
    /// recorded; the loop always continues.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::PositionUnavailable`] without attempting
    /// any send if `position` is `None`.
    pub async fn dispatch(
        &self,
        position: Option<Position>,
        contacts: &[Contact],
    ) -> Result<DispatchReport, DispatchError> {
        let Some(position) = position else {
            log::warn!("SOS requested before any location reading; not sending");
            return Err(DispatchError::PositionUnavailable);
        };

        let timestamp = format_local_time(&(self.clock)());
        let payload = AlertPayload::new(position.coordinates, contacts, timestamp);

        if contacts.is_empty() {
            log::info!("SOS requested with no contacts; nothing to send");
            return Ok(DispatchReport {
                payload,
                outcomes: Vec::new(),
            });
        }

        log::info!(
            "Sending SOS for {} to {} contact(s)",
            position.coordinates,
            contacts.len()
        );

        let mut outcomes = Vec::with_capacity(contacts.len());
        for contact in contacts {
            let params = payload.for_recipient(contact);
            match self.transport.send(&params).await {
                Ok(()) => {
                    log::debug!("Alert delivered to contact {}", contact.id());
                    outcomes.push(DeliveryOutcome::delivered(contact));
                }
                Err(e) => {
                    log::error!("Error sending alert to contact {}: {e}", contact.id());
                    outcomes.push(DeliveryOutcome::failed(contact, e.to_string()));
                }
            }
        }

        let report = DispatchReport { payload, outcomes };
        match report.status() {
            DispatchStatus::AllSucceeded => {
                log::info!("SOS alert sent to all {} contact(s)", report.outcomes.len());
            }
            status => log::warn!(
                "SOS dispatch finished with {status}: {}/{} delivered",
                report.succeeded_count(),
                report.outcomes.len()
            ),
        }

        Ok(report)
    }
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertDispatcher").finish_non_exhaustive()
    }
}

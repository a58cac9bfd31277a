#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Alert payload and dispatch outcome types.
//!
//! An [`AlertPayload`] is built once per dispatch from a position snapshot
//! and the full contact list. Each recipient gets the same payload plus
//! their own name and address as [`TemplateParams`]. A [`DispatchReport`]
//! records one [`DeliveryOutcome`] per contact in send order.

use serde::{Deserialize, Serialize};
use sos_map_contacts_models::{Contact, ContactId};
use sos_map_location_models::Coordinates;
use strum_macros::{AsRefStr, Display};

/// Fields shared by every message of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    /// Latitude rounded to 6 decimal places.
    pub latitude: String,
    /// Longitude rounded to 6 decimal places.
    pub longitude: String,
    /// Map link to the position.
    pub map_url: String,
    /// Local time-of-day the alert was raised.
    pub timestamp: String,
    /// Every recipient's email, comma separated, in contact order.
    pub all_recipient_emails: String,
}

impl AlertPayload {
    /// Builds the payload for `coordinates` addressed to `contacts`.
    #[must_use]
    pub fn new(coordinates: Coordinates, contacts: &[Contact], timestamp: String) -> Self {
        let latitude = coordinates.lat_fixed();
        let longitude = coordinates.lng_fixed();
        let map_url = map_url(&latitude, &longitude);
        let all_recipient_emails = contacts
            .iter()
            .map(Contact::email)
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            latitude,
            longitude,
            map_url,
            timestamp,
            all_recipient_emails,
        }
    }

    /// The message parameters for one recipient.
    #[must_use]
    pub fn for_recipient(&self, contact: &Contact) -> TemplateParams {
        TemplateParams {
            user_name: contact.name().to_string(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
            timestamp: self.timestamp.clone(),
            location_url: self.map_url.clone(),
            contact_emails: self.all_recipient_emails.clone(),
            to_email: contact.email().to_string(),
        }
    }
}

/// Builds a Google Maps link for a rounded coordinate pair.
#[must_use]
pub fn map_url(latitude: &str, longitude: &str) -> String {
    format!("https://maps.google.com/?q={latitude},{longitude}")
}

/// The template variables sent with one alert email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateParams {
    /// Name of the addressed contact.
    pub user_name: String,
    /// Latitude rounded to 6 decimal places.
    pub latitude: String,
    /// Longitude rounded to 6 decimal places.
    pub longitude: String,
    /// Local time-of-day the alert was raised.
    pub timestamp: String,
    /// Map link to the position.
    pub location_url: String,
    /// Every recipient's email, comma separated.
    pub contact_emails: String,
    /// Address this message is delivered to.
    pub to_email: String,
}

/// Result of the send attempt for one contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryOutcome {
    /// The contact the message was addressed to.
    pub contact_id: ContactId,
    /// The address used.
    pub email: String,
    /// Whether the transport accepted the message.
    pub succeeded: bool,
    /// Transport error text when `succeeded` is false.
    pub error_detail: Option<String>,
}

impl DeliveryOutcome {
    /// A successful delivery to `contact`.
    #[must_use]
    pub fn delivered(contact: &Contact) -> Self {
        Self {
            contact_id: contact.id(),
            email: contact.email().to_string(),
            succeeded: true,
            error_detail: None,
        }
    }

    /// A failed delivery to `contact`.
    #[must_use]
    pub fn failed(contact: &Contact, error_detail: String) -> Self {
        Self {
            contact_id: contact.id(),
            email: contact.email().to_string(),
            succeeded: false,
            error_detail: Some(error_detail),
        }
    }
}

/// Aggregate outcome of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchStatus {
    /// There was nobody to notify.
    NoRecipients,
    /// Every contact was notified.
    AllSucceeded,
    /// Some, but not all, deliveries failed.
    PartialFailure,
    /// Every delivery failed.
    TotalFailure,
}

/// Everything that happened during one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    /// The payload every message was built from.
    pub payload: AlertPayload,
    /// One outcome per contact, in send order.
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    /// Summarizes the outcomes.
    #[must_use]
    pub fn status(&self) -> DispatchStatus {
        let failed = self.failed().count();
        if self.outcomes.is_empty() {
            DispatchStatus::NoRecipients
        } else if failed == 0 {
            DispatchStatus::AllSucceeded
        } else if failed == self.outcomes.len() {
            DispatchStatus::TotalFailure
        } else {
            DispatchStatus::PartialFailure
        }
    }

    /// Outcomes that failed, in send order.
    pub fn failed(&self) -> impl Iterator<Item = &DeliveryOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded)
    }

    /// Number of successful deliveries.
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded).count()
    }
}

#[cfg(test)]
mod tests {
    use sos_map_contacts_models::{ContactDraft, ContactId};

    use super::*;

    fn contact(name: &str, email: &str) -> Contact {
        Contact::from_draft(
            ContactId::generate(),
            &ContactDraft::new(name, "100", email),
        )
    }

    fn payload(contacts: &[Contact]) -> AlertPayload {
        AlertPayload::new(
            Coordinates::new(12.345_678, 77.123_456),
            contacts,
            "9:15:00 PM".to_string(),
        )
    }

    #[test]
    fn shared_fields_are_identical_for_every_recipient() {
        let a = contact("A", "a@x.com");
        let b = contact("B", "b@x.com");
        let contacts = vec![a.clone(), b.clone()];
        let payload = payload(&contacts);

        assert_eq!(payload.map_url, "https://maps.google.com/?q=12.345678,77.123456");
        assert_eq!(payload.all_recipient_emails, "a@x.com, b@x.com");

        let pa = payload.for_recipient(&a);
        let pb = payload.for_recipient(&b);
        assert_eq!(pa.contact_emails, "a@x.com, b@x.com");
        assert_eq!(pa.contact_emails, pb.contact_emails);
        assert_eq!(pa.location_url, pb.location_url);
        assert_eq!(pa.to_email, "a@x.com");
        assert_eq!(pb.user_name, "B");
    }

    #[test]
    fn coordinates_are_rounded() {
        let c = contact("A", "a@x.com");
        let payload = AlertPayload::new(
            Coordinates::new(28.536_321_9, -0.000_000_4),
            std::slice::from_ref(&c),
            String::new(),
        );
        assert_eq!(payload.latitude, "28.536322");
        assert_eq!(payload.longitude, "-0.000000");
        assert_eq!(
            payload.map_url,
            "https://maps.google.com/?q=28.536322,-0.000000"
        );
    }

    #[test]
    fn template_params_use_template_field_names() {
        let c = contact("A", "a@x.com");
        let params = payload(std::slice::from_ref(&c)).for_recipient(&c);
        let json = serde_json::to_value(&params).unwrap();

        for key in [
            "user_name",
            "latitude",
            "longitude",
            "timestamp",
            "location_url",
            "contact_emails",
            "to_email",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn status_distinguishes_partial_and_total_failure() {
        let a = contact("A", "a@x.com");
        let b = contact("B", "b@x.com");
        let contacts = vec![a.clone(), b.clone()];
        let mut report = DispatchReport {
            payload: payload(&contacts),
            outcomes: vec![],
        };
        assert_eq!(report.status(), DispatchStatus::NoRecipients);

        report.outcomes = vec![DeliveryOutcome::delivered(&a), DeliveryOutcome::delivered(&b)];
        assert_eq!(report.status(), DispatchStatus::AllSucceeded);

        report.outcomes[1] = DeliveryOutcome::failed(&b, "boom".to_string());
        assert_eq!(report.status(), DispatchStatus::PartialFailure);
        assert_eq!(report.succeeded_count(), 1);
        assert_eq!(report.failed().next().unwrap().contact_id, b.id());

        report.outcomes[0] = DeliveryOutcome::failed(&a, "boom".to_string());
        assert_eq!(report.status(), DispatchStatus::TotalFailure);
    }
}

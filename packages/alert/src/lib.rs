#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! SOS alert fan-out.
//!
//! [`dispatcher::AlertDispatcher`] sends one message per emergency contact
//! through an [`EmailTransport`], one at a time and in contact order. A
//! failed send is recorded and logged; it never stops the remaining sends.
//! The caller gets back every per-contact outcome and can tell complete,
//! partial, and total failure apart.
//!
//! [`emailjs::EmailJsTransport`] delivers through the `EmailJS` REST API,
//! configured from the environment.

pub mod dispatcher;
pub mod emailjs;

pub use dispatcher::AlertDispatcher;
pub use sos_map_alert_models::{
    AlertPayload, DeliveryOutcome, DispatchReport, DispatchStatus, TemplateParams,
};

use chrono::{DateTime, TimeZone};
use thiserror::Error;

/// Errors that abort a dispatch before any message is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No position reading has arrived yet.
    #[error("location is still loading, please wait a moment")]
    PositionUnavailable,
}

/// Errors from delivering a single message.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The email service answered with a non-success status.
    #[error("email service rejected the message (HTTP {status}): {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The transport is missing configuration.
    #[error("Configuration error: {message}")]
    Config {
        /// What is missing or invalid.
        message: String,
    },
}

/// Delivers one alert message to one recipient.
#[async_trait::async_trait]
pub trait EmailTransport: Send + Sync {
    /// Sends `params` to `params.to_email`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the message was not accepted.
    async fn send(&self, params: &TemplateParams) -> Result<(), TransportError>;
}

/// Formats a time-of-day the way the alert and status line show it,
/// e.g. `3:04:05 PM`.
#[must_use]
pub fn format_local_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%-I:%M:%S %p").to_string()
}

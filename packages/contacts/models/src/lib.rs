#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Emergency contact types.
//!
//! A [`Contact`] is created from a fully filled-in [`ContactDraft`] and is
//! never edited afterwards; it can only be removed by its [`ContactId`].

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;
use uuid::Uuid;

/// Maximum number of contacts a registry may hold.
pub const MAX_CONTACTS: usize = 4;

/// Opaque, immutable contact identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(Uuid);

impl ContactId {
    /// Generates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for ContactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for ContactId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// A registered emergency contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    id: ContactId,
    name: String,
    phone: String,
    email: String,
}

impl Contact {
    /// Builds a contact from a draft that has already passed
    /// [`ContactDraft::validate`]. Surrounding whitespace is trimmed.
    #[must_use]
    pub fn from_draft(id: ContactId, draft: &ContactDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            email: draft.email.trim().to_string(),
        }
    }

    /// The contact's identifier.
    #[must_use]
    pub const fn id(&self) -> ContactId {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Phone number, as entered.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Email address alerts are sent to.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

/// One of the three required contact fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ContactField {
    /// Display name.
    Name,
    /// Phone number.
    Phone,
    /// Email address.
    Email,
}

impl ContactField {
    /// Returns all variants in form order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Name, Self::Phone, Self::Email]
    }
}

/// A contact being filled in, not yet registered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
}

impl ContactDraft {
    /// Creates a draft with all three fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, phone: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    /// Returns the current value of `field`.
    #[must_use]
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Phone => &self.phone,
            ContactField::Email => &self.email,
        }
    }

    /// Overwrites `field` with `value`.
    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Phone => &mut self.phone,
            ContactField::Email => &mut self.email,
        };
        *slot = value.into();
    }

    /// Checks that every field is non-empty after trimming.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::MissingField`] naming the first empty field.
    pub fn validate(&self) -> Result<(), RejectReason> {
        ContactField::all()
            .iter()
            .find(|field| self.get(**field).trim().is_empty())
            .map_or(Ok(()), |field| {
                Err(RejectReason::MissingField { field: *field })
            })
    }
}

/// Why a contact could not be added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    /// A required field is empty.
    #[error("contact {field} is required")]
    MissingField {
        /// The empty field.
        field: ContactField,
    },

    /// The registry is already full.
    #[error("at most {max} emergency contacts can be saved")]
    CapacityReached {
        /// The registry's capacity.
        max: usize,
    },
}

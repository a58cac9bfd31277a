#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! In-memory registry of emergency contacts.
//!
//! The registry is ordered by insertion and bounded at [`MAX_CONTACTS`].
//! Contacts are only added once every field is filled in and are never
//! edited in place. Nothing is persisted beyond the life of the registry.

pub use sos_map_contacts_models::{
    Contact, ContactDraft, ContactField, ContactId, MAX_CONTACTS, RejectReason,
};

/// Ordered, bounded collection of [`Contact`]s plus the pending draft the
/// user is filling in.
#[derive(Debug, Default)]
pub struct ContactRegistry {
    contacts: Vec<Contact>,
    draft: ContactDraft,
}

impl ContactRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `draft` and appends a new contact with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`RejectReason::CapacityReached`] if the registry is full,
    /// or [`RejectReason::MissingField`] if any field is empty. The registry
    /// is unchanged on error.
    pub fn add(&mut self, draft: &ContactDraft) -> Result<&Contact, RejectReason> {
        if !self.can_add() {
            return Err(RejectReason::CapacityReached { max: MAX_CONTACTS });
        }
        draft.validate()?;

        let id = self.fresh_id();
        self.contacts.push(Contact::from_draft(id, draft));
        log::info!("Added contact {id} ({} of {MAX_CONTACTS})", self.contacts.len());

        Ok(&self.contacts[self.contacts.len() - 1])
    }

    /// Removes the contact with `id`. Returns `false` if there was none.
    pub fn remove(&mut self, id: ContactId) -> bool {
        let Some(idx) = self.contacts.iter().position(|c| c.id() == id) else {
            log::debug!("No contact {id} to remove");
            return false;
        };
        self.contacts.remove(idx);
        log::info!("Removed contact {id}");
        true
    }

    /// Contacts in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Contact] {
        &self.contacts
    }

    /// Looks up a contact by id.
    #[must_use]
    pub fn get(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id() == id)
    }

    /// Number of registered contacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// Returns `true` if no contacts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Returns `true` while there is room for another contact.
    #[must_use]
    pub fn can_add(&self) -> bool {
        self.contacts.len() < MAX_CONTACTS
    }

    /// The pending draft.
    #[must_use]
    pub const fn draft(&self) -> &ContactDraft {
        &self.draft
    }

    /// Mutable access to the pending draft, for field-by-field entry.
    pub const fn draft_mut(&mut self) -> &mut ContactDraft {
        &mut self.draft
    }

    /// Adds the pending draft. On success the draft is cleared; on
    /// rejection it is left as-is so the user can correct it.
    ///
    /// # Errors
    ///
    /// See [`Self::add`].
    pub fn submit_draft(&mut self) -> Result<&Contact, RejectReason> {
        let draft = std::mem::take(&mut self.draft);
        if let Err(reason) = self.add(&draft) {
            self.draft = draft;
            return Err(reason);
        }
        Ok(&self.contacts[self.contacts.len() - 1])
    }

    /// Clears the pending draft without adding it.
    pub fn discard_draft(&mut self) {
        self.draft = ContactDraft::default();
    }

    fn fresh_id(&self) -> ContactId {
        loop {
            let id = ContactId::generate();
            if self.get(id).is_none() {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(n: usize) -> ContactDraft {
        ContactDraft::new(
            format!("Contact {n}"),
            format!("+91 90000 0000{n}"),
            format!("c{n}@example.com"),
        )
    }

    #[test]
    fn add_appends_in_order() {
        let mut registry = ContactRegistry::new();
        registry.add(&draft(1)).unwrap();
        registry.add(&draft(2)).unwrap();

        let names: Vec<&str> = registry.list().iter().map(Contact::name).collect();
        assert_eq!(names, vec!["Contact 1", "Contact 2"]);
    }

    #[test]
    fn fifth_valid_add_is_rejected() {
        let mut registry = ContactRegistry::new();
        for n in 1..=MAX_CONTACTS {
            assert!(registry.add(&draft(n)).is_ok(), "add #{n} should succeed");
        }
        assert!(!registry.can_add());

        let err = registry.add(&draft(5)).unwrap_err();
        assert_eq!(err, RejectReason::CapacityReached { max: MAX_CONTACTS });
        assert_eq!(registry.len(), MAX_CONTACTS);
    }

    #[test]
    fn incomplete_draft_is_rejected_without_state_change() {
        let mut registry = ContactRegistry::new();
        registry.add(&draft(1)).unwrap();

        let incomplete = ContactDraft::new("Only name", "", "x@example.com");
        let err = registry.add(&incomplete).unwrap_err();

        assert_eq!(
            err,
            RejectReason::MissingField {
                field: ContactField::Phone
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let mut registry = ContactRegistry::new();
        for n in 1..=MAX_CONTACTS {
            registry.add(&draft(n)).unwrap();
        }
        let mut ids: Vec<ContactId> = registry.list().iter().map(Contact::id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), MAX_CONTACTS);
    }

    #[test]
    fn remove_twice_reports_not_found() {
        let mut registry = ContactRegistry::new();
        let id = registry.add(&draft(1)).unwrap().id();
        registry.add(&draft(2)).unwrap();

        assert!(registry.remove(id));
        assert_eq!(registry.len(), 1);

        assert!(!registry.remove(id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn remove_preserves_order_of_rest() {
        let mut registry = ContactRegistry::new();
        registry.add(&draft(1)).unwrap();
        let middle = registry.add(&draft(2)).unwrap().id();
        registry.add(&draft(3)).unwrap();

        registry.remove(middle);

        let names: Vec<&str> = registry.list().iter().map(Contact::name).collect();
        assert_eq!(names, vec!["Contact 1", "Contact 3"]);
    }

    #[test]
    fn removal_frees_capacity() {
        let mut registry = ContactRegistry::new();
        let first = registry.add(&draft(1)).unwrap().id();
        for n in 2..=MAX_CONTACTS {
            registry.add(&draft(n)).unwrap();
        }
        assert!(registry.add(&draft(9)).is_err());

        registry.remove(first);
        assert!(registry.add(&draft(9)).is_ok());
    }

    #[test]
    fn submit_draft_clears_on_success() {
        let mut registry = ContactRegistry::new();
        registry.draft_mut().set(ContactField::Name, "Asha");
        registry.draft_mut().set(ContactField::Phone, "123");
        registry.draft_mut().set(ContactField::Email, "asha@example.com");

        let contact = registry.submit_draft().unwrap().clone();
        assert_eq!(contact.email(), "asha@example.com");
        assert_eq!(registry.draft(), &ContactDraft::default());
    }

    #[test]
    fn submit_draft_keeps_draft_on_rejection() {
        let mut registry = ContactRegistry::new();
        registry.draft_mut().set(ContactField::Name, "Asha");

        assert!(registry.submit_draft().is_err());
        assert_eq!(registry.draft().name, "Asha");
        assert!(registry.is_empty());

        registry.discard_draft();
        assert_eq!(registry.draft(), &ContactDraft::default());
    }
}

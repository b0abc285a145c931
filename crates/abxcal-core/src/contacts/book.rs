//! Keyed record store for contacts and antibiotics.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{
    Antibiotic, AntibioticDirectory, Contact, ContactDirectory, InjectionType, LocationType,
    RecurrenceUnit,
};
use crate::error::Result;
use crate::storage::{KeyValueStore, ANTIBIOTICS_KEY, CONTACTS_KEY};

/// Fields of a contact before an id is assigned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub location_type: LocationType,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub injection_type: InjectionType,
    #[serde(default)]
    pub antibiotic: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub antibiotic_recurrence_value: Option<u32>,
    #[serde(default)]
    pub antibiotic_recurrence_unit: Option<RecurrenceUnit>,
}

/// Field-wise contact update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactPatch {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub location_type: Option<LocationType>,
    pub address: Option<String>,
    pub injection_type: Option<InjectionType>,
    pub antibiotic: Option<String>,
    pub color: Option<String>,
    pub is_archived: Option<bool>,
    pub antibiotic_recurrence_value: Option<u32>,
    pub antibiotic_recurrence_unit: Option<RecurrenceUnit>,
}

/// In-memory contact and antibiotic records, persisted through a
/// [`KeyValueStore`].
#[derive(Debug, Clone, Default)]
pub struct ContactBook {
    contacts: IndexMap<String, Contact>,
    antibiotics: IndexMap<String, Antibiotic>,
}

impl ContactBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load contacts and antibiotics, starting empty for anything missing or
    /// unreadable.
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        let contacts: Vec<Contact> = store.load_or(CONTACTS_KEY, Vec::new());
        let antibiotics: Vec<Antibiotic> = store.load_or(ANTIBIOTICS_KEY, Vec::new());
        Self {
            contacts: contacts.into_iter().map(|c| (c.id.clone(), c)).collect(),
            antibiotics: antibiotics.into_iter().map(|a| (a.name.clone(), a)).collect(),
        }
    }

    /// Persist both collections.
    ///
    /// # Errors
    /// Returns an error if either write fails.
    pub fn save<S: KeyValueStore>(&self, store: &mut S) -> Result<()> {
        let contacts: Vec<&Contact> = self.contacts.values().collect();
        let antibiotics: Vec<&Antibiotic> = self.antibiotics.values().collect();
        store.save_json(CONTACTS_KEY, &contacts)?;
        store.save_json(ANTIBIOTICS_KEY, &antibiotics)?;
        Ok(())
    }

    /// Add a contact and return its new id.
    pub fn add_contact(&mut self, new: NewContact) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let contact = Contact {
            id: id.clone(),
            name: new.name,
            full_name: new.full_name,
            email: new.email,
            phone_number: new.phone_number,
            birth_date: new.birth_date,
            location_type: new.location_type,
            address: new.address,
            injection_type: new.injection_type,
            antibiotic: new.antibiotic,
            color: new.color,
            is_archived: false,
            antibiotic_recurrence_value: new.antibiotic_recurrence_value,
            antibiotic_recurrence_unit: new.antibiotic_recurrence_unit,
        };
        tracing::info!(contact_id = %id, "contact added");
        self.contacts.insert(id.clone(), contact);
        id
    }

    /// Merge `patch` into the contact. Returns `false` for an unknown id.
    pub fn update_contact(&mut self, id: &str, patch: ContactPatch) -> bool {
        let Some(contact) = self.contacts.get_mut(id) else {
            return false;
        };

        if let Some(name) = patch.name {
            contact.name = name;
        }
        if let Some(full_name) = patch.full_name {
            contact.full_name = Some(full_name);
        }
        if let Some(email) = patch.email {
            contact.email = Some(email);
        }
        if let Some(phone_number) = patch.phone_number {
            contact.phone_number = Some(phone_number);
        }
        if let Some(birth_date) = patch.birth_date {
            contact.birth_date = Some(birth_date);
        }
        if let Some(location_type) = patch.location_type {
            contact.location_type = location_type;
        }
        if let Some(address) = patch.address {
            contact.address = Some(address);
        }
        if let Some(injection_type) = patch.injection_type {
            contact.injection_type = injection_type;
        }
        if let Some(antibiotic) = patch.antibiotic {
            contact.antibiotic = antibiotic;
        }
        if let Some(color) = patch.color {
            contact.color = color;
        }
        if let Some(is_archived) = patch.is_archived {
            contact.is_archived = is_archived;
        }
        if let Some(value) = patch.antibiotic_recurrence_value {
            contact.antibiotic_recurrence_value = Some(value);
        }
        if let Some(unit) = patch.antibiotic_recurrence_unit {
            contact.antibiotic_recurrence_unit = Some(unit);
        }
        true
    }

    /// Stop recurrence for a contact. Returns `false` for an unknown id.
    pub fn clear_recurrence(&mut self, id: &str) -> bool {
        match self.contacts.get_mut(id) {
            Some(contact) => {
                contact.antibiotic_recurrence_value = None;
                contact.antibiotic_recurrence_unit = None;
                true
            }
            None => false,
        }
    }

    pub fn delete_contact(&mut self, id: &str) -> Option<Contact> {
        self.contacts.shift_remove(id)
    }

    /// Contacts in insertion order, archived ones only when asked for.
    pub fn contacts(&self, include_archived: bool) -> Vec<&Contact> {
        self.contacts
            .values()
            .filter(|c| include_archived || !c.is_archived)
            .collect()
    }

    /// Insert or replace an antibiotic by name.
    pub fn upsert_antibiotic(&mut self, antibiotic: Antibiotic) {
        self.antibiotics.insert(antibiotic.name.clone(), antibiotic);
    }

    pub fn remove_antibiotic(&mut self, name: &str) -> Option<Antibiotic> {
        self.antibiotics.shift_remove(name)
    }

    pub fn antibiotics(&self) -> Vec<&Antibiotic> {
        self.antibiotics.values().collect()
    }
}

impl ContactDirectory for ContactBook {
    fn contact(&self, id: &str) -> Option<&Contact> {
        self.contacts.get(id)
    }
}

impl AntibioticDirectory for ContactBook {
    fn antibiotic(&self, name: &str) -> Option<&Antibiotic> {
        self.antibiotics.get(name)
    }
}

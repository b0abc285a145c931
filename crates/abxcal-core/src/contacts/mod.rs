//! Contacts and antibiotics referenced by appointments.
//!
//! The event engine only needs two lookups from this module: a contact by
//! id (for its recurrence rule and antibiotic) and an antibiotic by name
//! (for its infusion duration). Both are expressed as traits so callers can
//! plug in any keyed record store; [`ContactBook`] is the bundled one.

mod book;

pub use book::{ContactBook, ContactPatch, NewContact};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Spacing unit of a recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceUnit {
    Day,
    #[default]
    Week,
}

impl RecurrenceUnit {
    /// Number of calendar days one unit spans.
    pub fn days(self) -> i64 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
        }
    }
}

impl std::str::FromStr for RecurrenceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "days" | "d" => Ok(Self::Day),
            "week" | "weeks" | "w" => Ok(Self::Week),
            other => Err(format!("unknown recurrence unit: {other}")),
        }
    }
}

/// Interval between two successive appointments of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub value: u32,
    pub unit: RecurrenceUnit,
}

impl RecurrenceRule {
    pub fn new(value: u32, unit: RecurrenceUnit) -> Self {
        Self { value, unit }
    }

    /// Total spacing in days.
    pub fn days(&self) -> i64 {
        i64::from(self.value) * self.unit.days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    #[default]
    Home,
    Clinic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InjectionType {
    #[default]
    Intravenous,
    Subcutaneous,
}

impl std::str::FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "clinic" => Ok(Self::Clinic),
            other => Err(format!("unknown location type: {other}")),
        }
    }
}

impl std::str::FromStr for InjectionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "intravenous" | "iv" => Ok(Self::Intravenous),
            "subcutaneous" | "sc" => Ok(Self::Subcutaneous),
            other => Err(format!("unknown injection type: {other}")),
        }
    }
}

/// A patient receiving antibiotic treatment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub location_type: LocationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub injection_type: InjectionType,
    /// Name of the antibiotic, resolved through an [`AntibioticDirectory`].
    #[serde(default)]
    pub antibiotic: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antibiotic_recurrence_value: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub antibiotic_recurrence_unit: Option<RecurrenceUnit>,
}

impl Contact {
    /// Recurrence rule of this contact, if any.
    ///
    /// A missing or zero value means the contact is not recurring. A value
    /// without a unit counts in weeks.
    pub fn recurrence(&self) -> Option<RecurrenceRule> {
        match self.antibiotic_recurrence_value {
            Some(value) if value > 0 => Some(RecurrenceRule::new(
                value,
                self.antibiotic_recurrence_unit.unwrap_or_default(),
            )),
            _ => None,
        }
    }
}

/// An antibiotic and how long one administration takes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Antibiotic {
    pub name: String,
    /// Duration of one administration in hours.
    pub duration: f64,
}

/// Lookup of contacts by id.
pub trait ContactDirectory {
    fn contact(&self, id: &str) -> Option<&Contact>;
}

/// Lookup of antibiotics by name.
pub trait AntibioticDirectory {
    fn antibiotic(&self, name: &str) -> Option<&Antibiotic>;
}

/// Everything the ghost projector needs to resolve a contact.
pub trait Directory: ContactDirectory + AntibioticDirectory {
    /// Duration in hours of the antibiotic given to `contact_id`, if known.
    fn treatment_hours(&self, contact_id: &str) -> Option<f64> {
        let contact = self.contact(contact_id)?;
        if contact.antibiotic.is_empty() {
            return None;
        }
        self.antibiotic(&contact.antibiotic)
            .map(|a| a.duration)
            .filter(|hours| hours.is_finite() && *hours > 0.0)
    }
}

impl<T: ContactDirectory + AntibioticDirectory> Directory for T {}

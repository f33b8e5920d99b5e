//! Domain models that mirror the SQLite schema and get passed to both
//! front-ends. These stay light-weight data holders: validation lives in the
//! store and formatting lives in the adapters. Dates on every type here are
//! already in display form (`DD-MM-YYYY`); the storage form never leaves the
//! `db` module.

use std::fmt;

/// Status given to a booking when it is first created.
pub const DEFAULT_BOOKING_STATUS: &str = "scheduled";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A walk-in appointment: a name, a slot and optionally the barber taking it.
pub struct Appointment {
    /// Primary key assigned by SQLite. Edit and delete flows hand it back to
    /// the store.
    pub id: i64,
    pub customer_name: String,
    /// Display-form date.
    pub date: String,
    /// Free-text `HH:MM` slot.
    pub time: String,
    /// `None` means nobody has been assigned yet.
    pub barber_name: Option<String>,
}

impl Appointment {
    /// Barber name or a placeholder for unassigned slots.
    pub fn barber_label(&self) -> &str {
        self.barber_name.as_deref().unwrap_or("Unassigned")
    }
}

impl fmt::Display for Appointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} on {} at {} ({})",
            self.id,
            self.customer_name,
            self.date,
            self.time,
            self.barber_label()
        )
    }
}

/// Replacement values for an appointment. Each field is optional and only the
/// supplied ones are written; blank strings count as "not supplied" so a form
/// left empty never wipes a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentPatch {
    pub customer_name: Option<String>,
    /// Display-form date, revalidated before anything is written.
    pub date: Option<String>,
    pub time: Option<String>,
    pub barber_name: Option<String>,
}

impl AppointmentPatch {
    /// Build a patch from raw text inputs, dropping the blank ones.
    pub fn from_inputs(customer_name: &str, date: &str, time: &str, barber_name: &str) -> Self {
        Self {
            customer_name: non_blank(customer_name),
            date: non_blank(date),
            time: non_blank(time),
            barber_name: non_blank(barber_name),
        }
        .normalized()
    }

    /// Trim every supplied field and forget the ones that end up empty.
    pub fn normalized(self) -> Self {
        Self {
            customer_name: self.customer_name.as_deref().and_then(non_blank),
            date: self.date.as_deref().and_then(non_blank),
            time: self.time.as_deref().and_then(non_blank),
            barber_name: self.barber_name.as_deref().and_then(non_blank),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.barber_name.is_none()
    }
}

/// Trimmed copy of `value`, or `None` when nothing is left.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Result of an update that reached a decision without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
    /// The patch carried nothing to write; storage was not touched.
    NoFields,
}

/// Result of a delete that reached a decision without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A registered customer. The password hash stays inside the store.
pub struct Customer {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Input for registering a customer. `password` is the clear-text secret and
/// is hashed before it reaches the database.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Barber {
    pub id: i64,
    pub full_name: String,
    pub specialty: String,
}

impl fmt::Display for Barber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.specialty.trim().is_empty() {
            write!(f, "{}", self.full_name)
        } else {
            write!(f, "{} ({})", self.full_name, self.specialty)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub duration_minutes: i64,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}, {} min)",
            self.name, self.price, self.duration_minutes
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A booking row as stored: ids only.
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub barber_id: i64,
    pub service_id: i64,
    pub date: String,
    pub time: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq)]
/// A booking joined with the names and prices it references, ready to show.
pub struct BookingDetail {
    pub id: i64,
    pub customer: String,
    pub barber: String,
    pub service: String,
    pub price: f64,
    pub duration_minutes: i64,
    pub date: String,
    pub time: String,
    pub status: String,
}

impl fmt::Display for BookingDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} with {} - {} ({:.2}, {} min) on {} at {} [{}]",
            self.id,
            self.customer,
            self.barber,
            self.service,
            self.price,
            self.duration_minutes,
            self.date,
            self.time,
            self.status
        )
    }
}

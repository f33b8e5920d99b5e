use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::dates;
use crate::error::{BookingError, BookingResult};
use crate::models::{non_blank, Appointment, AppointmentPatch, DeleteOutcome, UpdateOutcome};

use super::connection::Store;

const SELECT_APPOINTMENT: &str = "SELECT id, customer_name, date, time, barber_name FROM appointments";

impl Store {
    /// Book a walk-in appointment and return it with its new id. Every input
    /// is checked before the database is opened, so a bad date never leaves a
    /// half-written row behind.
    pub fn add_appointment(
        &self,
        customer_name: &str,
        date: &str,
        time: &str,
        barber_name: Option<&str>,
    ) -> BookingResult<Appointment> {
        let stored_date = dates::to_storage(date).inspect_err(|err| warn!(%err, "rejected appointment"))?;
        let customer_name = non_blank(customer_name).ok_or(BookingError::MissingField("Customer name"))?;
        let time = non_blank(time).ok_or(BookingError::MissingField("Time"))?;
        let barber_name = barber_name.and_then(non_blank);

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO appointments (customer_name, date, time, barber_name) VALUES (?1, ?2, ?3, ?4)",
            params![customer_name, stored_date, time, barber_name],
        )?;

        let id = conn.last_insert_rowid();
        info!(id, date = %stored_date, %time, "appointment added");

        Ok(Appointment {
            id,
            customer_name,
            date: display_date(stored_date),
            time,
            barber_name,
        })
    }

    /// Every appointment, earliest slot first.
    pub fn list_appointments(&self) -> BookingResult<Vec<Appointment>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{SELECT_APPOINTMENT} ORDER BY date ASC, time ASC, id ASC"))?;
        let appointments = stmt
            .query_map([], appointment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = appointments.len(), "listed appointments");
        Ok(appointments)
    }

    /// Appointments on one display-form date, ordered by time.
    pub fn list_appointments_on(&self, date: &str) -> BookingResult<Vec<Appointment>> {
        let stored_date = dates::to_storage(date)?;

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_APPOINTMENT} WHERE date = ?1 ORDER BY time ASC, id ASC"
        ))?;
        let appointments = stmt
            .query_map([&stored_date], appointment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(date = %stored_date, count = appointments.len(), "listed appointments for date");
        Ok(appointments)
    }

    /// Appointments whose customer name contains `text`. Matching follows
    /// SQLite's `LIKE`, which ignores ASCII case; wildcard characters typed
    /// by the user are matched literally.
    pub fn search_appointments(&self, text: &str) -> BookingResult<Vec<Appointment>> {
        let pattern = format!("%{}%", escape_like(text.trim()));

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "{SELECT_APPOINTMENT} WHERE customer_name LIKE ?1 ESCAPE '\\' ORDER BY date ASC, time ASC, id ASC"
        ))?;
        let appointments = stmt
            .query_map([&pattern], appointment_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(query = text, count = appointments.len(), "searched appointments");
        Ok(appointments)
    }

    pub fn find_appointment(&self, id: i64) -> BookingResult<Option<Appointment>> {
        let conn = self.connect()?;
        let appointment = conn
            .query_row(
                &format!("{SELECT_APPOINTMENT} WHERE id = ?1"),
                [id],
                appointment_from_row,
            )
            .optional()?;
        Ok(appointment)
    }

    /// Free-form lookup used by the search boxes: a whole number finds the
    /// appointment with that id, anything else searches customer names.
    pub fn lookup_appointments(&self, query: &str) -> BookingResult<Vec<Appointment>> {
        match query.trim().parse::<i64>() {
            Ok(id) => Ok(self.find_appointment(id)?.into_iter().collect()),
            Err(_) => self.search_appointments(query),
        }
    }

    /// Apply the supplied patch fields to one appointment. An empty patch is
    /// answered with `NoFields` before any connection is opened; an invalid
    /// date fails the whole update.
    pub fn update_appointment(
        &self,
        id: i64,
        patch: AppointmentPatch,
    ) -> BookingResult<UpdateOutcome> {
        let patch = patch.normalized();
        if patch.is_empty() {
            debug!(id, "update skipped, nothing to change");
            return Ok(UpdateOutcome::NoFields);
        }

        let stored_date = patch
            .date
            .as_deref()
            .map(dates::to_storage)
            .transpose()
            .inspect_err(|err| warn!(id, %err, "rejected appointment update"))?;

        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE appointments SET
                customer_name = COALESCE(?1, customer_name),
                date = COALESCE(?2, date),
                time = COALESCE(?3, time),
                barber_name = COALESCE(?4, barber_name)
             WHERE id = ?5",
            params![patch.customer_name, stored_date, patch.time, patch.barber_name, id],
        )?;

        if updated == 0 {
            info!(id, "update found no appointment");
            Ok(UpdateOutcome::NotFound)
        } else {
            info!(id, "appointment updated");
            Ok(UpdateOutcome::Updated)
        }
    }

    pub fn delete_appointment(&self, id: i64) -> BookingResult<DeleteOutcome> {
        let conn = self.connect()?;
        let deleted = conn.execute("DELETE FROM appointments WHERE id = ?1", params![id])?;

        if deleted == 0 {
            info!(id, "delete found no appointment");
            Ok(DeleteOutcome::NotFound)
        } else {
            info!(id, "appointment deleted");
            Ok(DeleteOutcome::Deleted)
        }
    }
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    Ok(Appointment {
        id: row.get(0)?,
        customer_name: row.get(1)?,
        date: display_date(row.get(2)?),
        time: row.get(3)?,
        barber_name: row.get(4)?,
    })
}

/// Display form of a stored date. Rows written by other tools may hold text
/// that is not a storage date; those are shown as-is instead of failing the
/// whole listing.
pub(crate) fn display_date(stored: String) -> String {
    match dates::from_storage(&stored) {
        Ok(display) => display,
        Err(_) => {
            warn!(date = %stored, "stored date is not in storage layout");
            stored
        }
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

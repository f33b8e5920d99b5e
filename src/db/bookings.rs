use rusqlite::params;
use tracing::{debug, info, warn};

use crate::dates;
use crate::error::{BookingError, BookingResult};
use crate::models::{
    non_blank, Booking, BookingDetail, DeleteOutcome, UpdateOutcome, DEFAULT_BOOKING_STATUS,
};

use super::appointments::display_date;
use super::connection::{violated_constraint, Constraint, Store};

impl Store {
    /// Book a registered customer with a barber for a service. Ids that do not
    /// exist are caught by the foreign keys and reported as
    /// `MissingReference`.
    pub fn create_booking(
        &self,
        customer_id: i64,
        barber_id: i64,
        service_id: i64,
        date: &str,
        time: &str,
    ) -> BookingResult<Booking> {
        let stored_date = dates::to_storage(date).inspect_err(|err| warn!(%err, "rejected booking"))?;
        let time = non_blank(time).ok_or(BookingError::MissingField("Time"))?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO bookings (customer_id, barber_id, service_id, date, time, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                customer_id,
                barber_id,
                service_id,
                stored_date,
                time,
                DEFAULT_BOOKING_STATUS
            ],
        )
        .map_err(|err| {
            if violated_constraint(&err) == Some(Constraint::ForeignKey) {
                warn!(customer_id, barber_id, service_id, "booking references missing rows");
                BookingError::MissingReference
            } else {
                err.into()
            }
        })?;

        let id = conn.last_insert_rowid();
        info!(id, customer_id, barber_id, service_id, date = %stored_date, "booking created");
        Ok(Booking {
            id,
            customer_id,
            barber_id,
            service_id,
            date: display_date(stored_date),
            time,
            status: DEFAULT_BOOKING_STATUS.to_string(),
        })
    }

    /// Every booking joined with its customer, barber and service, earliest
    /// slot first.
    pub fn list_bookings(&self) -> BookingResult<Vec<BookingDetail>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT b.id, c.username, br.full_name, s.name, s.price, s.duration_minutes,
                    b.date, b.time, b.status
             FROM bookings b
             INNER JOIN customers c ON c.id = b.customer_id
             INNER JOIN barbers br ON br.id = b.barber_id
             INNER JOIN services s ON s.id = b.service_id
             ORDER BY b.date ASC, b.time ASC, b.id ASC",
        )?;

        let bookings = stmt
            .query_map([], |row| {
                Ok(BookingDetail {
                    id: row.get(0)?,
                    customer: row.get(1)?,
                    barber: row.get(2)?,
                    service: row.get(3)?,
                    price: row.get(4)?,
                    duration_minutes: row.get(5)?,
                    date: display_date(row.get(6)?),
                    time: row.get(7)?,
                    status: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(count = bookings.len(), "listed bookings");
        Ok(bookings)
    }

    /// Replace a booking's status text. A blank status is `NoFields`.
    pub fn set_booking_status(&self, id: i64, status: &str) -> BookingResult<UpdateOutcome> {
        let Some(status) = non_blank(status) else {
            return Ok(UpdateOutcome::NoFields);
        };

        let conn = self.connect()?;
        let updated = conn.execute(
            "UPDATE bookings SET status = ?1 WHERE id = ?2",
            params![status, id],
        )?;

        if updated == 0 {
            Ok(UpdateOutcome::NotFound)
        } else {
            info!(id, %status, "booking status changed");
            Ok(UpdateOutcome::Updated)
        }
    }

    pub fn delete_booking(&self, id: i64) -> BookingResult<DeleteOutcome> {
        let conn = self.connect()?;
        let deleted = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;

        if deleted == 0 {
            Ok(DeleteOutcome::NotFound)
        } else {
            info!(id, "booking deleted");
            Ok(DeleteOutcome::Deleted)
        }
    }
}

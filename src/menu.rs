//! Numbered command menu over stdin/stdout. The adapter only collects input
//! and prints outcomes; every decision is made by `Store`. It is generic over
//! the reader and writer so a session can be scripted in tests.

use std::fmt::Display;
use std::io::{BufRead, Write};

use anyhow::Result;

use crate::dates::DISPLAY_LAYOUT;
use crate::db::Store;
use crate::error::{BookingError, BookingResult};
use crate::models::{AppointmentPatch, DeleteOutcome, NewCustomer, UpdateOutcome};

const MENU: &[(&str, &str)] = &[
    ("1", "Add appointment"),
    ("2", "List all appointments"),
    ("3", "List appointments by date"),
    ("4", "Search appointments"),
    ("5", "Update appointment"),
    ("6", "Delete appointment"),
    ("7", "Register customer"),
    ("8", "Add barber"),
    ("9", "Add service"),
    ("10", "Create booking"),
    ("11", "List bookings"),
    ("0", "Quit"),
];

/// Run the menu until the user picks `0` or input runs out.
pub fn run_menu<R: BufRead, W: Write>(store: &Store, input: R, output: W) -> Result<()> {
    Menu {
        store,
        input,
        output,
        finished: false,
    }
    .run()
}

struct Menu<'a, R, W> {
    store: &'a Store,
    input: R,
    output: W,
    finished: bool,
}

impl<R: BufRead, W: Write> Menu<'_, R, W> {
    fn run(&mut self) -> Result<()> {
        while !self.finished {
            writeln!(self.output, "\n--- Barber Booking ---")?;
            for (key, label) in MENU {
                writeln!(self.output, "{key}. {label}")?;
            }

            let choice = self.ask("Choose an option: ")?;
            if self.finished {
                break;
            }

            match choice.as_str() {
                "1" => self.add_appointment()?,
                "2" => self.list_all()?,
                "3" => self.list_by_date()?,
                "4" => self.search()?,
                "5" => self.update_appointment()?,
                "6" => self.delete_appointment()?,
                "7" => self.add_customer()?,
                "8" => self.add_barber()?,
                "9" => self.add_service()?,
                "10" => self.create_booking()?,
                "11" => self.list_bookings()?,
                "0" => break,
                _ => writeln!(self.output, "Unknown option, try again.")?,
            }
        }

        writeln!(self.output, "Goodbye.")?;
        self.output.flush()?;
        Ok(())
    }

    /// Print `label`, read one line and return it trimmed. End of input marks
    /// the session finished and yields an empty answer.
    fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.finished = true;
        }
        Ok(line.trim().to_string())
    }

    /// Ask for a number; a non-numeric answer is reported and yields `None`.
    fn ask_number<T: std::str::FromStr>(&mut self, label: &str, what: &str) -> Result<Option<T>> {
        let answer = self.ask(label)?;
        match answer.parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                if !self.finished {
                    writeln!(self.output, "Invalid {what}. Please enter a number.")?;
                }
                Ok(None)
            }
        }
    }

    /// Print either the success line or the error text of a store call.
    fn report<T, F>(&mut self, result: BookingResult<T>, describe: F) -> Result<()>
    where
        F: FnOnce(T) -> String,
    {
        match result {
            Ok(value) => writeln!(self.output, "{}", describe(value))?,
            Err(err) => self.report_error(err)?,
        }
        Ok(())
    }

    fn report_error(&mut self, err: BookingError) -> Result<()> {
        writeln!(self.output, "Error: {err}")?;
        Ok(())
    }

    fn print_rows<T: Display>(&mut self, heading: &str, rows: &[T], empty: &str) -> Result<()> {
        if rows.is_empty() {
            writeln!(self.output, "{empty}")?;
            return Ok(());
        }
        writeln!(self.output, "\n--- {heading} ---")?;
        for row in rows {
            writeln!(self.output, "{row}")?;
        }
        Ok(())
    }

    fn add_appointment(&mut self) -> Result<()> {
        let name = self.ask("Customer name: ")?;
        let date = self.ask(&format!("Date ({DISPLAY_LAYOUT}): "))?;
        let time = self.ask("Time (HH:MM): ")?;
        let barber = self.ask("Barber (optional): ")?;
        if self.finished {
            return Ok(());
        }

        let result = self.store.add_appointment(&name, &date, &time, Some(barber.as_str()));
        self.report(result, |appointment| {
            format!(
                "Appointment #{} booked for {} on {} at {}.",
                appointment.id, appointment.customer_name, appointment.date, appointment.time
            )
        })
    }

    fn list_all(&mut self) -> Result<()> {
        match self.store.list_appointments() {
            Ok(rows) => self.print_rows("All appointments", &rows, "No appointments yet."),
            Err(err) => self.report_error(err),
        }
    }

    fn list_by_date(&mut self) -> Result<()> {
        let date = self.ask(&format!("Date ({DISPLAY_LAYOUT}): "))?;
        if self.finished {
            return Ok(());
        }
        match self.store.list_appointments_on(&date) {
            Ok(rows) => self.print_rows(
                &format!("Appointments on {date}"),
                &rows,
                &format!("No appointments on {date}."),
            ),
            Err(err) => self.report_error(err),
        }
    }

    fn search(&mut self) -> Result<()> {
        let query = self.ask("Customer name or appointment id: ")?;
        if self.finished {
            return Ok(());
        }
        if query.is_empty() {
            writeln!(self.output, "Enter something to search for.")?;
            return Ok(());
        }
        match self.store.lookup_appointments(&query) {
            Ok(rows) => self.print_rows("Matches", &rows, "No appointments found."),
            Err(err) => self.report_error(err),
        }
    }

    fn update_appointment(&mut self) -> Result<()> {
        let Some(id) = self.ask_number::<i64>("Appointment id to update: ", "id")? else {
            return Ok(());
        };
        let name = self.ask("New customer name (blank keeps it): ")?;
        let date = self.ask(&format!("New date {DISPLAY_LAYOUT} (blank keeps it): "))?;
        let time = self.ask("New time (blank keeps it): ")?;
        let barber = self.ask("New barber (blank keeps it): ")?;
        if self.finished {
            return Ok(());
        }

        let patch = AppointmentPatch::from_inputs(&name, &date, &time, &barber);
        let result = self.store.update_appointment(id, patch);
        self.report(result, |outcome| match outcome {
            UpdateOutcome::Updated => format!("Appointment #{id} updated."),
            UpdateOutcome::NotFound => format!("Appointment #{id} not found."),
            UpdateOutcome::NoFields => "Nothing to update.".to_string(),
        })
    }

    fn delete_appointment(&mut self) -> Result<()> {
        let Some(id) = self.ask_number::<i64>("Appointment id to delete: ", "id")? else {
            return Ok(());
        };
        let result = self.store.delete_appointment(id);
        self.report(result, |outcome| match outcome {
            DeleteOutcome::Deleted => format!("Appointment #{id} deleted."),
            DeleteOutcome::NotFound => format!("Appointment #{id} not found."),
        })
    }

    fn add_customer(&mut self) -> Result<()> {
        let username = self.ask("Username: ")?;
        let password = self.ask("Password: ")?;
        let email = self.ask("Email (optional): ")?;
        let phone = self.ask("Phone (optional): ")?;
        if self.finished {
            return Ok(());
        }

        let new = NewCustomer {
            username,
            password,
            email: Some(email),
            phone: Some(phone),
        };
        let result = self.store.add_customer(&new);
        self.report(result, |customer| {
            format!("Customer '{}' registered (#{}).", customer.username, customer.id)
        })
    }

    fn add_barber(&mut self) -> Result<()> {
        let name = self.ask("Full name: ")?;
        let specialty = self.ask("Specialty: ")?;
        if self.finished {
            return Ok(());
        }
        let result = self.store.add_barber(&name, &specialty);
        self.report(result, |barber| format!("Barber {barber} added (#{}).", barber.id))
    }

    fn add_service(&mut self) -> Result<()> {
        let name = self.ask("Service name: ")?;
        let Some(price) = self.ask_number::<f64>("Price: ", "price")? else {
            return Ok(());
        };
        let Some(duration) = self.ask_number::<i64>("Duration in minutes: ", "duration")? else {
            return Ok(());
        };
        let result = self.store.add_service(&name, price, duration);
        self.report(result, |service| format!("Service {service} added (#{}).", service.id))
    }

    fn create_booking(&mut self) -> Result<()> {
        let store = self.store;
        let choices = store.list_customers().and_then(|customers| {
            Ok((customers, store.list_barbers()?, store.list_services()?))
        });
        let (customers, barbers, services) = match choices {
            Ok(choices) => choices,
            Err(err) => return self.report_error(err),
        };

        writeln!(self.output, "Customers:")?;
        for customer in &customers {
            writeln!(self.output, "  {}. {}", customer.id, customer.username)?;
        }
        writeln!(self.output, "Barbers:")?;
        for barber in &barbers {
            writeln!(self.output, "  {}. {barber}", barber.id)?;
        }
        writeln!(self.output, "Services:")?;
        for service in &services {
            writeln!(self.output, "  {}. {service}", service.id)?;
        }

        let Some(customer_id) = self.ask_number::<i64>("Customer id: ", "id")? else {
            return Ok(());
        };
        let Some(barber_id) = self.ask_number::<i64>("Barber id: ", "id")? else {
            return Ok(());
        };
        let Some(service_id) = self.ask_number::<i64>("Service id: ", "id")? else {
            return Ok(());
        };
        let date = self.ask(&format!("Date ({DISPLAY_LAYOUT}): "))?;
        let time = self.ask("Time (HH:MM): ")?;
        if self.finished {
            return Ok(());
        }

        let result = self
            .store
            .create_booking(customer_id, barber_id, service_id, &date, &time);
        self.report(result, |booking| {
            format!(
                "Booking #{} created for {} at {}.",
                booking.id, booking.date, booking.time
            )
        })
    }

    fn list_bookings(&mut self) -> Result<()> {
        match self.store.list_bookings() {
            Ok(rows) => self.print_rows("All bookings", &rows, "No bookings yet."),
            Err(err) => self.report_error(err),
        }
    }
}

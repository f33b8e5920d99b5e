use rusqlite::{params, OptionalExtension};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password};
use crate::error::{BookingError, BookingResult};
use crate::models::{non_blank, Barber, Customer, NewCustomer, Service};

use super::connection::{violated_constraint, Constraint, Store};

impl Store {
    /// Register a customer. The password is hashed here; a username that is
    /// already taken comes back as `Duplicate` and the existing row is left
    /// alone.
    pub fn add_customer(&self, new: &NewCustomer) -> BookingResult<Customer> {
        let username = non_blank(&new.username).ok_or(BookingError::MissingField("Username"))?;
        if new.password.is_empty() {
            return Err(BookingError::MissingField("Password"));
        }
        let email = new.email.as_deref().and_then(non_blank);
        let phone = new.phone.as_deref().and_then(non_blank);
        let password_hash = hash_password(&new.password)?;

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO customers (username, password_hash, email, phone) VALUES (?1, ?2, ?3, ?4)",
            params![username, password_hash, email, phone],
        )
        .map_err(|err| map_duplicate(err, "Customer", &username))?;

        let id = conn.last_insert_rowid();
        info!(id, %username, "customer added");
        Ok(Customer {
            id,
            username,
            email,
            phone,
        })
    }

    /// Look a customer up by username and check the password against the
    /// stored hash. Unknown usernames and wrong passwords both yield `None`.
    pub fn verify_customer(&self, username: &str, password: &str) -> BookingResult<Option<Customer>> {
        let conn = self.connect()?;
        let found = conn
            .query_row(
                "SELECT id, username, email, phone, password_hash FROM customers WHERE username = ?1",
                [username.trim()],
                |row| {
                    Ok((
                        Customer {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            email: row.get(2)?,
                            phone: row.get(3)?,
                        },
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?;

        Ok(found.and_then(|(customer, hash)| {
            if verify_password(password, &hash) {
                Some(customer)
            } else {
                warn!(username = %customer.username, "password check failed");
                None
            }
        }))
    }

    pub fn list_customers(&self) -> BookingResult<Vec<Customer>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, username, email, phone FROM customers ORDER BY username COLLATE NOCASE",
        )?;
        let customers = stmt
            .query_map([], |row| {
                Ok(Customer {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(customers)
    }

    pub fn add_barber(&self, full_name: &str, specialty: &str) -> BookingResult<Barber> {
        let full_name = non_blank(full_name).ok_or(BookingError::MissingField("Barber name"))?;
        let specialty = specialty.trim().to_string();

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO barbers (full_name, specialty) VALUES (?1, ?2)",
            params![full_name, specialty],
        )?;

        let id = conn.last_insert_rowid();
        info!(id, %full_name, "barber added");
        Ok(Barber {
            id,
            full_name,
            specialty,
        })
    }

    pub fn list_barbers(&self) -> BookingResult<Vec<Barber>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT id, full_name, specialty FROM barbers ORDER BY full_name COLLATE NOCASE")?;
        let barbers = stmt
            .query_map([], |row| {
                Ok(Barber {
                    id: row.get(0)?,
                    full_name: row.get(1)?,
                    specialty: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(barbers)
    }

    /// Add a service to the price list. Names are unique; a second service
    /// with the same name is refused and the first keeps its price.
    pub fn add_service(&self, name: &str, price: f64, duration_minutes: i64) -> BookingResult<Service> {
        let name = non_blank(name).ok_or(BookingError::MissingField("Service name"))?;
        if !(price.is_finite() && price > 0.0) {
            return Err(BookingError::NotPositive("Price"));
        }
        if duration_minutes <= 0 {
            return Err(BookingError::NotPositive("Duration"));
        }

        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO services (name, price, duration_minutes) VALUES (?1, ?2, ?3)",
            params![name, price, duration_minutes],
        )
        .map_err(|err| map_duplicate(err, "Service", &name))?;

        let id = conn.last_insert_rowid();
        info!(id, %name, "service added");
        Ok(Service {
            id,
            name,
            price,
            duration_minutes,
        })
    }

    pub fn list_services(&self) -> BookingResult<Vec<Service>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, price, duration_minutes FROM services ORDER BY name COLLATE NOCASE",
        )?;
        let services = stmt
            .query_map([], |row| {
                Ok(Service {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    price: row.get(2)?,
                    duration_minutes: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(services)
    }
}

/// Turn a UNIQUE violation into a named duplicate; anything else passes
/// through untouched.
fn map_duplicate(err: rusqlite::Error, entity: &'static str, value: &str) -> BookingError {
    if violated_constraint(&err) == Some(Constraint::Unique) {
        warn!(entity, value, "duplicate rejected");
        BookingError::Duplicate {
            entity,
            value: value.to_string(),
        }
    } else {
        err.into()
    }
}

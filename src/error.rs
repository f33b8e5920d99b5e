//! Error type shared by the storage layer and both front-ends. Variants map to
//! the outcomes a caller has to tell apart (bad input, clashing keys, dangling
//! references) while everything else collapses into `Storage`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    /// The text did not match the expected date layout or named a day that
    /// does not exist on the calendar.
    #[error("Invalid date '{input}'. Use the {expected} format.")]
    InvalidDate {
        input: String,
        expected: &'static str,
    },

    #[error("{0} is required.")]
    MissingField(&'static str),

    #[error("{0} must be greater than zero.")]
    NotPositive(&'static str),

    /// A UNIQUE constraint rejected the row. `entity` names the table in
    /// human terms and `value` echoes the clashing key.
    #[error("{entity} '{value}' already exists.")]
    Duplicate { entity: &'static str, value: String },

    #[error("Booking refers to a customer, barber or service that does not exist.")]
    MissingReference,

    #[error("failed to hash password: {0}")]
    PasswordHash(String),

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error("failed to prepare data directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl From<argon2::password_hash::Error> for BookingError {
    fn from(err: argon2::password_hash::Error) -> Self {
        BookingError::PasswordHash(err.to_string())
    }
}

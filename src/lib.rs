//! Appointment book for a barber shop, backed by a single SQLite file.
//!
//! `Store` is the only thing that touches the database. The two front-ends,
//! the numbered `menu` and the ratatui `ui`, collect input and print whatever
//! the store decides.
pub mod auth;
pub mod config;
pub mod dates;
pub mod db;
pub mod error;
pub mod logging;
pub mod menu;
pub mod models;
pub mod ui;

pub use config::{Config, Frontend};
pub use db::Store;
pub use error::{BookingError, BookingResult};
pub use menu::run_menu;
pub use models::{
    Appointment, AppointmentPatch, Barber, Booking, BookingDetail, Customer, DeleteOutcome,
    NewCustomer, Service, UpdateOutcome,
};
pub use ui::{run_app, App};

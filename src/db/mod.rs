//! Persistence layer split across logical submodules. `Store` is the one
//! component both front-ends talk to; each submodule adds its own `impl Store`
//! block.

mod appointments;
mod bookings;
mod connection;
mod shop;

pub use connection::Store;

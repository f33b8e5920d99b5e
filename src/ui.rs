//! Full-screen terminal front-end built on ratatui. `App` holds the state and
//! turns key presses into store calls; `run_app` owns the terminal.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;

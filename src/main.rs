//! Binary entry point: resolve the config, start logging, make sure the
//! schema exists, then hand the store to the chosen front-end.
use std::io;

use anyhow::Context;
use barber_booking::{logging, run_app, run_menu, App, Config, Frontend, Store};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    if config.frontend == Frontend::Help {
        println!("{}", barber_booking::config::USAGE);
        return Ok(());
    }

    logging::init(&config.log_path)?;
    info!(db = %config.db_path.display(), frontend = ?config.frontend, "starting");

    let store = Store::new(&config);
    store
        .ensure_schema()
        .with_context(|| format!("failed to prepare {}", config.db_path.display()))?;

    match config.frontend {
        Frontend::Menu => {
            let stdin = io::stdin();
            run_menu(&store, stdin.lock(), io::stdout().lock())
        }
        _ => {
            let mut app = App::new(store)?;
            run_app(&mut app)
        }
    }
}

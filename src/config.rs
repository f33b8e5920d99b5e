use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".barber-booking";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "appointments.sqlite";
/// Log file written next to the database.
const LOG_FILE_NAME: &str = "barber-booking.log";
/// Environment variable that overrides the default database location.
pub const DB_ENV_VAR: &str = "BARBER_BOOKING_DB";

pub const USAGE: &str = "\
Usage: barber-booking [tui|menu] [--db PATH]

  tui        full-screen terminal interface (default)
  menu       numbered command menu on stdin/stdout
  --db PATH  SQLite file to use (else $BARBER_BOOKING_DB, else ~/.barber-booking/appointments.sqlite)
  -h, --help show this message";

/// Which adapter drives the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    Tui,
    Menu,
    Help,
}

/// Everything the binary needs to know before it touches the database. Built
/// once in `main` and handed to the store, so nothing reads a hidden global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
    pub frontend: Frontend,
}

impl Config {
    /// Config pointing at an explicit database file, used by tests and by
    /// anything embedding the store.
    pub fn with_db_path(path: impl Into<PathBuf>) -> Self {
        let db_path = path.into();
        Self {
            log_path: log_path_for(&db_path),
            db_path,
            frontend: Frontend::Tui,
        }
    }

    /// Resolve the config from process arguments and the environment.
    pub fn from_env() -> Result<Self> {
        Self::resolve(
            std::env::args().skip(1),
            std::env::var(DB_ENV_VAR).ok(),
        )
    }

    /// Flag beats environment beats home-directory default.
    pub fn resolve<I>(args: I, env_db: Option<String>) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut frontend = Frontend::Tui;
        let mut flag_db: Option<PathBuf> = None;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "tui" => frontend = Frontend::Tui,
                "menu" => frontend = Frontend::Menu,
                "-h" | "--help" => frontend = Frontend::Help,
                "--db" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--db expects a path"))?;
                    flag_db = Some(PathBuf::from(value));
                }
                other => {
                    if let Some(value) = other.strip_prefix("--db=") {
                        flag_db = Some(PathBuf::from(value));
                    } else {
                        bail!("unrecognised argument '{other}'\n\n{USAGE}");
                    }
                }
            }
        }

        let db_path = match flag_db {
            Some(path) => path,
            None => match env_db.filter(|value| !value.trim().is_empty()) {
                Some(value) => PathBuf::from(value),
                None => default_db_path()?,
            },
        };

        let mut config = Self::with_db_path(db_path);
        config.frontend = frontend;
        Ok(config)
    }
}

/// Resolve the absolute path to the SQLite database inside the user's home.
fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

fn log_path_for(db_path: &Path) -> PathBuf {
    db_path.with_file_name(LOG_FILE_NAME)
}

use crate::cli::{actions::Action, commands, dispatch, telemetry};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Map verbosity count to tracing level
const fn get_verbosity_level(verbosity: u8) -> Option<tracing::Level> {
    match verbosity {
        0 => None,
        1 => Some(tracing::Level::WARN),
        2 => Some(tracing::Level::INFO),
        3 => Some(tracing::Level::DEBUG),
        _ => Some(tracing::Level::TRACE),
    }
}

/// Accept a loaded or missing `.env`, reject one that cannot be read or parsed.
fn check_env_file(loaded: Result<PathBuf, dotenvy::Error>) -> Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err).context("Failed to load .env file"),
    }
}

/// Parse arguments, set up logging and return the action to run.
///
/// A `.env` file in the working directory is loaded first; variables already
/// present in the environment win.
///
/// # Errors
///
/// Returns an error if `.env` is malformed, or if telemetry initialization or
/// action dispatch fails
pub fn start() -> Result<Action> {
    check_env_file(dotenvy::dotenv())?;

    let matches = commands::new().get_matches();

    let verbosity_level = get_verbosity_level(
        matches
            .get_one::<u8>(commands::logging::ARG_VERBOSITY)
            .copied()
            .unwrap_or(0),
    );

    telemetry::init(verbosity_level)?;

    dispatch::handler(&matches)
}

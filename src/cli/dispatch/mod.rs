use crate::{
    cli::{
        actions::{server::Args, Action},
        commands::{supabase, ARG_PORT},
    },
    supabase::ServiceCredentials,
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::time::Duration;

/// Build the action from parsed arguments.
/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let base_url = matches
        .get_one::<String>(supabase::ARG_URL)
        .cloned()
        .context("missing required argument: --supabase-url")?;
    let anon_key = matches
        .get_one::<String>(supabase::ARG_ANON_KEY)
        .cloned()
        .context("missing required argument: --supabase-anon-key")?;
    let service_role_key = matches
        .get_one::<String>(supabase::ARG_SERVICE_ROLE_KEY)
        .cloned()
        .context("missing required argument: --supabase-service-role-key")?;

    let backend_timeout = matches
        .get_one::<u64>(supabase::ARG_BACKEND_TIMEOUT)
        .copied()
        .map(Duration::from_secs);

    Ok(Action::Server(Args {
        port,
        credentials: ServiceCredentials::new(
            base_url,
            SecretString::from(anon_key),
            SecretString::from(service_role_key),
        ),
        backend_timeout,
    }))
}

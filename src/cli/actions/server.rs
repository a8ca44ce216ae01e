use crate::{
    api,
    cli::telemetry,
    supabase::{Clients, ServiceCredentials},
};
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use std::{fmt::Write, time::Duration};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub credentials: ServiceCredentials,
    pub backend_timeout: Option<Duration>,
}

/// Build both Supabase handles and serve the API.
/// # Errors
/// Returns an error if a client cannot be built or the server fails.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let clients = Clients::new(&args.credentials, args.backend_timeout)
        .context("Could not build Supabase clients")?;

    let result = api::new(args.port, clients).await;

    telemetry::shutdown_tracer();

    result
}

fn log_startup_args(args: &Args) {
    let entries = startup_entries(args);
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);

    let mut message = format!(
        "{} {} ({})\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ = write!(message, "\n  {key}:{padding} {value}");
    }

    info!("{message}");
}

// keys are only reported as set/unset
fn startup_entries(args: &Args) -> Vec<(&'static str, String)> {
    let set = |secret: &secrecy::SecretString| {
        if secret.expose_secret().is_empty() {
            "unset".to_string()
        } else {
            "set".to_string()
        }
    };

    vec![
        ("listen", format!("[::]:{}", args.port)),
        ("supabase_url", args.credentials.base_url.clone()),
        ("anon_key", set(&args.credentials.anon_key)),
        ("service_role_key", set(&args.credentials.service_role_key)),
        (
            "backend_timeout",
            args.backend_timeout
                .map_or_else(|| "none".to_string(), |t| format!("{}s", t.as_secs())),
        ),
    ]
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}

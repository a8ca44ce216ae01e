use clap::{value_parser, Arg, Command};

pub const ARG_URL: &str = "supabase-url";
pub const ARG_ANON_KEY: &str = "supabase-anon-key";
pub const ARG_SERVICE_ROLE_KEY: &str = "supabase-service-role-key";
pub const ARG_BACKEND_TIMEOUT: &str = "backend-timeout";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_URL)
                .long(ARG_URL)
                .help("Supabase project URL, example: https://<project>.supabase.co")
                .env("PUBLIC_SUPABASE_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_ANON_KEY)
                .long(ARG_ANON_KEY)
                .help("Supabase anonymous (public) API key")
                .env("PUBLIC_SUPABASE_ANON_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_SERVICE_ROLE_KEY)
                .long(ARG_SERVICE_ROLE_KEY)
                .help("Supabase service-role API key, grants admin access to users")
                .env("SUPABASE_SERVICE_ROLE_KEY")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_BACKEND_TIMEOUT)
                .long(ARG_BACKEND_TIMEOUT)
                .help("Timeout in seconds for each Supabase request (default: none)")
                .env("FAREWELL_BACKEND_TIMEOUT")
                .value_parser(value_parser!(u64).range(1..)),
        )
}

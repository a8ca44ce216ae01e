use secrecy::SecretString;

/// Supabase project settings read once at startup.
///
/// `anon_key` may be shipped to browsers, `service_role_key` must stay inside
/// the server process. `Debug` prints both redacted.
#[derive(Debug, Clone)]
pub struct ServiceCredentials {
    pub base_url: String,
    pub anon_key: SecretString,
    pub service_role_key: SecretString,
}

impl ServiceCredentials {
    #[must_use]
    pub fn new(base_url: String, anon_key: SecretString, service_role_key: SecretString) -> Self {
        Self {
            base_url,
            anon_key,
            service_role_key,
        }
    }
}

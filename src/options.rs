use std::{path::PathBuf, time::Duration};

/// Client secrets file looked up in the working directory
pub const DEFAULT_CREDENTIALS_FILE: &str = "client_secret.json";

/// Redirect URI used when the client secrets file registers none. It
/// has to be added to the OAuth client in Google Cloud Console.
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080/callback";

/// Google Ads API scope
pub const ADWORDS_SCOPE: &str = "https://www.googleapis.com/auth/adwords";

/// How long `--listen` waits for the browser redirect
pub const DEFAULT_LISTEN_TIMEOUT_SECS: u64 = 300;

/// Options of one token acquisition run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowOptions {
    /// Path to the OAuth client secrets file
    pub credentials_file: PathBuf,
    /// OAuth scope to request
    pub scope: String,
    /// Fallback redirect URI
    pub default_redirect_uri: String,
    /// Local development mode: accept plain `http` redirect URIs
    pub insecure_transport: bool,
    /// Capture the redirect with a loopback server instead of reading it
    /// from standard input
    pub listen: bool,
    pub listen_timeout: Duration,
}

impl FlowOptions {
    pub fn scopes(&self) -> Vec<String> {
        vec![self.scope.clone()]
    }
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            scope: ADWORDS_SCOPE.to_string(),
            default_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            insecure_transport: true,
            listen: false,
            listen_timeout: Duration::from_secs(DEFAULT_LISTEN_TIMEOUT_SECS),
        }
    }
}

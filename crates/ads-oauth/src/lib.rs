//! OAuth 2.0 authorization code flow against Google's authorization
//! server, tuned for obtaining offline (refresh) tokens for the
//! Google Ads API.

mod callback;
mod client_secrets;
mod error;
mod flow;

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

pub use callback::wait_for_redirect;
pub use client_secrets::{ClientSecrets, ClientType};
pub use error::{Error, Result};
pub use flow::{AuthorizationFlow, parse_redirect_response};

/// Authorization endpoint used when the client secrets file has none
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

/// Token endpoint used when the client secrets file has none
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth 2.0 token information
#[derive(Debug, Clone)]
pub struct OAuthToken {
    /// Access token for API requests
    pub access_token: String,
    /// Refresh token for getting new access tokens
    pub refresh_token: String,
    /// Token type (usually "Bearer")
    pub token_type: String,
    /// Expiry time as Unix timestamp (seconds since epoch), when the
    /// server reported one
    pub expires_at: Option<u64>,
}

/// OAuth configuration
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Authorization endpoint
    pub auth_uri: String,
    /// Token endpoint
    pub token_uri: String,
    /// Redirect URI for OAuth callback
    pub redirect_uri: String,
    /// OAuth scope(s)
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    /// Create OAuth configuration from loaded client secrets
    pub fn new(client: &ClientSecrets, redirect_uri: impl Into<String>, scopes: Vec<String>) -> Self {
        Self {
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
            auth_uri: client.auth_uri.clone(),
            token_uri: client.token_uri.clone(),
            redirect_uri: redirect_uri.into(),
            scopes,
        }
    }
}

/// Extra parameters of the authorization request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationParams {
    /// `access_type=offline`, makes the server issue a refresh token
    pub offline_access: bool,
    pub include_granted_scopes: bool,
    /// `prompt=consent`, so that a refresh token is issued again on
    /// repeated authorizations
    pub force_consent: bool,
}

impl AuthorizationParams {
    /// Offline access with forced consent, the combination that
    /// reliably yields a refresh token.
    pub fn offline_consent() -> Self {
        Self {
            offline_access: true,
            include_granted_scopes: true,
            force_consent: true,
        }
    }
}

/// Authorization URL together with the secrets needed to complete
/// the exchange
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
    pub verifier: String,
}

/// Generate PKCE verifier and challenge
pub fn generate_pkce() -> (String, String) {
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use sha2::{Digest, Sha256};

    // RFC 7636 allows 43 to 128 characters
    let verifier = random_alphanumeric(64);

    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hasher.finalize());

    (verifier, challenge)
}

/// Generate an anti-forgery `state` value
pub fn generate_state() -> String {
    random_alphanumeric(30)
}

fn random_alphanumeric(len: usize) -> String {
    use rand::Rng;
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Generate authorization URL
pub fn generate_auth_url(config: &OAuthConfig, params: &AuthorizationParams) -> AuthorizationRequest {
    let (verifier, challenge) = generate_pkce();
    let state = generate_state();

    let separator = if config.auth_uri.contains('?') { '&' } else { '?' };
    let mut url = format!(
        "{}{}\
        client_id={}&\
        redirect_uri={}&\
        response_type=code&\
        scope={}&\
        state={}&\
        code_challenge={}&\
        code_challenge_method=S256&\
        access_type={}",
        config.auth_uri,
        separator,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&config.scopes.join(" ")),
        urlencoding::encode(&state),
        urlencoding::encode(&challenge),
        if params.offline_access { "offline" } else { "online" },
    );

    if params.include_granted_scopes {
        url.push_str("&include_granted_scopes=true");
    }

    if params.force_consent {
        url.push_str("&prompt=consent");
    }

    AuthorizationRequest {
        url,
        state,
        verifier,
    }
}

/// Exchange authorization code for tokens
pub async fn exchange_code(
    http: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
    verifier: &str,
) -> Result<OAuthToken> {
    debug!(token_uri = %config.token_uri, "exchanging authorization code for tokens");

    let params = [
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("grant_type", "authorization_code"),
        ("redirect_uri", config.redirect_uri.as_str()),
    ];

    let response = http
        .post(&config.token_uri)
        .form(&params)
        .send()
        .await
        .map_err(|err| Error::SendTokenRequestError(err, config.token_uri.clone()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(Error::ParseTokenResponseError)?;
        return Err(Error::TokenRequestRejectedError {
            status: status.as_u16(),
            message: provider_message(&body),
        });
    }

    let token_response: serde_json::Value = response
        .json()
        .await
        .map_err(Error::ParseTokenResponseError)?;

    let access_token = token_response
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or(Error::MissingTokenFieldError("access_token"))?
        .to_string();

    // Google omits it when the user already granted offline access
    // and no consent screen was shown
    let refresh_token = token_response
        .get("refresh_token")
        .and_then(|v| v.as_str())
        .ok_or(Error::MissingTokenFieldError("refresh_token"))?
        .to_string();

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let expires_at = token_response
        .get("expires_in")
        .and_then(|v| v.as_u64())
        .map(|expires_in| now.saturating_add(expires_in));

    let token = OAuthToken {
        access_token,
        refresh_token,
        token_type: token_response
            .get("token_type")
            .and_then(|v| v.as_str())
            .unwrap_or("Bearer")
            .to_string(),
        expires_at,
    };

    info!("successfully obtained OAuth tokens");
    match token.expires_at {
        Some(expires_at) => debug!(expires_at, "access token expiry"),
        None => debug!("token response carries no expiry"),
    }

    Ok(token)
}

/// Extract `error` and `error_description` from an RFC 6749 error
/// body, falling back to the raw body.
fn provider_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    let error = value.get("error").and_then(|v| v.as_str());
    let description = value.get("error_description").and_then(|v| v.as_str());

    match (error, description) {
        (Some(error), Some(description)) => format!("{error}: {description}"),
        (Some(error), None) => error.to_string(),
        _ => body.trim().to_string(),
    }
}

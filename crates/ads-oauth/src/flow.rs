use tracing::debug;
use url::Url;

use crate::{
    AuthorizationParams, AuthorizationRequest, ClientSecrets, Error, OAuthConfig, OAuthToken,
    Result, exchange_code, generate_auth_url,
};

/// Authorization code flow for one client and one redirect URI.
///
/// [`AuthorizationFlow::authorization_url`] must be called first: it
/// generates the `state` and PKCE verifier that
/// [`AuthorizationFlow::fetch_token`] later checks and sends.
#[derive(Debug)]
pub struct AuthorizationFlow {
    client: ClientSecrets,
    config: OAuthConfig,
    insecure_transport: bool,
    request: Option<AuthorizationRequest>,
    http: reqwest::Client,
}

impl AuthorizationFlow {
    pub fn new(client: ClientSecrets, scopes: Vec<String>, redirect_uri: impl Into<String>) -> Self {
        let config = OAuthConfig::new(&client, redirect_uri, scopes);

        Self {
            client,
            config,
            insecure_transport: false,
            request: None,
            http: reqwest::Client::new(),
        }
    }

    /// Allow plain `http` redirect URIs and authorization responses.
    /// Only meant for local development against loopback redirects.
    pub fn with_insecure_transport(mut self, insecure: bool) -> Self {
        self.insecure_transport = insecure;
        self
    }

    pub fn client(&self) -> &ClientSecrets {
        &self.client
    }

    pub fn redirect_uri(&self) -> &str {
        &self.config.redirect_uri
    }

    /// Build the authorization URL the user has to visit. Returns the
    /// URL and the `state` bound to it.
    pub fn authorization_url(&mut self, params: &AuthorizationParams) -> Result<(String, String)> {
        let redirect_uri = &self.config.redirect_uri;
        let redirect = Url::parse(redirect_uri)
            .map_err(|err| Error::InvalidRedirectUriError(err, redirect_uri.clone()))?;
        check_transport(&redirect, self.insecure_transport)?;

        Url::parse(&self.config.auth_uri)
            .map_err(|err| Error::InvalidEndpointError(err, self.config.auth_uri.clone()))?;

        let request = generate_auth_url(&self.config, params);
        debug!(redirect_uri = %redirect, "generated authorization URL");

        let url = (request.url.clone(), request.state.clone());
        self.request = Some(request);

        Ok(url)
    }

    /// Exchange the full redirect URL the browser landed on for tokens
    pub async fn fetch_token(&self, authorization_response: &str) -> Result<OAuthToken> {
        let request = self
            .request
            .as_ref()
            .ok_or(Error::MissingAuthorizationRequestError)?;

        let code = parse_redirect_response(
            authorization_response,
            &request.state,
            self.insecure_transport,
        )?;

        exchange_code(&self.http, &self.config, &code, &request.verifier).await
    }
}

fn check_transport(url: &Url, insecure_transport: bool) -> Result<()> {
    if url.scheme() != "https" && !insecure_transport {
        // the origin only, the query may carry the authorization code
        return Err(Error::InsecureTransportError(url.origin().ascii_serialization()));
    }

    Ok(())
}

/// Extract the authorization code from a redirect URL, checking
/// transport, provider errors and the `state` value.
pub fn parse_redirect_response(
    authorization_response: &str,
    expected_state: &str,
    insecure_transport: bool,
) -> Result<String> {
    let url = Url::parse(authorization_response.trim()).map_err(Error::ParseRedirectResponseError)?;
    check_transport(&url, insecure_transport)?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, val)| val.into_owned())
    };

    if let Some(error) = param("error") {
        return Err(Error::AuthorizationDeniedError(error));
    }

    let state = param("state").ok_or(Error::MissingStateError)?;
    if state != expected_state {
        return Err(Error::InvalidStateError);
    }

    param("code").ok_or(Error::MissingCodeError)
}

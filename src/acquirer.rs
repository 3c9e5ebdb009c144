//! The interactive token acquisition workflow: inspect the client
//! configuration, pick a redirect URI, present the authorization URL,
//! collect the redirect, exchange it and report the credentials.

use std::{
    future::Future,
    io::{BufRead, Write},
    path::Path,
};

use ads_oauth::{AuthorizationFlow, AuthorizationParams, ClientSecrets, OAuthToken};
use tracing::{debug, info, warn};

use crate::{Error, ExchangeOutcome, FlowOptions, Result, report};

/// Seam between the workflow and the OAuth library
pub trait AuthorizationService {
    /// Build the URL the operator has to visit
    fn authorization_url(&mut self, params: &AuthorizationParams) -> ads_oauth::Result<String>;

    /// Exchange the full redirect URL for tokens
    fn fetch_token(
        &self,
        authorization_response: &str,
    ) -> impl Future<Output = ads_oauth::Result<OAuthToken>> + Send;
}

impl AuthorizationService for AuthorizationFlow {
    fn authorization_url(&mut self, params: &AuthorizationParams) -> ads_oauth::Result<String> {
        AuthorizationFlow::authorization_url(self, params).map(|(url, _state)| url)
    }

    fn fetch_token(
        &self,
        authorization_response: &str,
    ) -> impl Future<Output = ads_oauth::Result<OAuthToken>> + Send {
        AuthorizationFlow::fetch_token(self, authorization_response)
    }
}

/// Build the OAuth flow for the selected redirect URI
pub fn authorization_flow(
    options: &FlowOptions,
    client: &ClientSecrets,
    redirect_uri: &str,
) -> AuthorizationFlow {
    AuthorizationFlow::new(client.clone(), options.scopes(), redirect_uri)
        .with_insecure_transport(options.insecure_transport)
}

/// Load the client secrets file and print what it contains
pub fn inspect_configuration(path: &Path, out: &mut impl Write) -> Result<ClientSecrets> {
    debug!(path = %path.display(), "loading client secrets");

    let client = ClientSecrets::from_file(path).map_err(Error::LoadClientConfigError)?;
    report::client_summary(out, &client)?;

    Ok(client)
}

/// Prefer the first registered redirect URI, fall back to the default
pub fn select_redirect_uri(
    registered: &[String],
    options: &FlowOptions,
    out: &mut impl Write,
) -> Result<String> {
    if let Some(uri) = registered.first() {
        writeln!(out, "Using existing redirect URI: {uri}")?;
        return Ok(uri.clone());
    }

    let uri = &options.default_redirect_uri;
    warn!(redirect_uri = %uri, "no registered redirect URI, using the default one");
    writeln!(out, "Using default redirect URI: {uri}")?;
    writeln!(
        out,
        "Make sure you've added this URI to your OAuth client in Google Cloud Console!"
    )?;

    Ok(uri.clone())
}

/// Ask for offline access with forced consent, so that a refresh
/// token is issued even on repeated authorizations
pub fn build_authorization_request(service: &mut impl AuthorizationService) -> Result<String> {
    service
        .authorization_url(&AuthorizationParams::offline_consent())
        .map_err(Error::BuildAuthorizationUrlError)
}

/// Print the instructions and read the redirect URL the operator
/// pastes back
pub fn collect_authorization_response(
    auth_url: &str,
    redirect_uri: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<String> {
    report::authorization_link(out, auth_url)?;
    report::paste_instructions(out, redirect_uri)?;

    write!(out, "\nPaste the full redirect URL here: ")?;
    out.flush()?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(Error::ReadRedirectUrlError)?;
    if read == 0 {
        return Err(Error::MissingRedirectUrlError);
    }

    Ok(line.trim().to_string())
}

/// Serve the redirect URI locally and wait for the browser instead of
/// asking the operator to paste the URL
pub async fn listen_for_authorization_response(
    auth_url: &str,
    redirect_uri: &str,
    options: &FlowOptions,
    out: &mut impl Write,
) -> Result<String> {
    report::authorization_link(out, auth_url)?;
    writeln!(out, "\nWaiting for your browser to be redirected to: {redirect_uri}")?;
    out.flush()?;

    ads_oauth::wait_for_redirect(redirect_uri, options.listen_timeout)
        .await
        .map_err(Error::CaptureRedirectError)
}

pub async fn exchange_code_for_tokens(
    service: &impl AuthorizationService,
    client: &ClientSecrets,
    authorization_response: &str,
) -> ExchangeOutcome {
    let result = service.fetch_token(authorization_response).await;
    let outcome = ExchangeOutcome::from_result(client, result);

    match outcome.message() {
        None => info!("authorization code exchanged"),
        Some(message) => debug!(%message, "authorization code exchange failed"),
    }

    outcome
}

pub fn report_credentials(outcome: &ExchangeOutcome, out: &mut impl Write) -> Result<()> {
    report::outcome(out, outcome)?;
    Ok(())
}

/// Run the whole workflow once. `connect` builds the OAuth service
/// for the client and the selected redirect URI.
pub async fn run<S, F>(
    options: &FlowOptions,
    input: &mut impl BufRead,
    out: &mut impl Write,
    connect: F,
) -> Result<ExchangeOutcome>
where
    S: AuthorizationService,
    F: FnOnce(&ClientSecrets, &str) -> S,
{
    let client = inspect_configuration(&options.credentials_file, out)?;
    let redirect_uri = select_redirect_uri(&client.redirect_uris, options, out)?;

    let mut service = connect(&client, &redirect_uri);
    let auth_url = build_authorization_request(&mut service)?;

    let authorization_response = if options.listen {
        listen_for_authorization_response(&auth_url, &redirect_uri, options, out).await?
    } else {
        collect_authorization_response(&auth_url, &redirect_uri, input, out)?
    };

    let outcome = exchange_code_for_tokens(&service, &client, &authorization_response).await;
    report_credentials(&outcome, out)?;

    Ok(outcome)
}

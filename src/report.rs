//! Operator-facing console output.

use std::io::{self, Write};

use ads_oauth::ClientSecrets;

use crate::{Credentials, ExchangeOutcome};

pub const CLIENT_ID_VAR: &str = "GOOGLE_ADS_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "GOOGLE_ADS_CLIENT_SECRET";
pub const REFRESH_TOKEN_VAR: &str = "GOOGLE_ADS_REFRESH_TOKEN";

/// Printed after every failed exchange, whatever the cause
pub const REMEDIATION_HINTS: [&str; 3] = [
    "1. Redirect URI mismatch - check your OAuth client configuration",
    "2. Invalid authorization code - try generating a new auth URL",
    "3. Network issues - check your internet connection",
];

fn rule(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(60))
}

pub fn client_summary(out: &mut impl Write, client: &ClientSecrets) -> io::Result<()> {
    rule(out)?;
    writeln!(out, "YOUR OAUTH CLIENT INFO:")?;
    rule(out)?;
    writeln!(out, "Client ID: {}", client.client_id)?;
    writeln!(out, "App Type: {}", client.client_type)?;

    if client.redirect_uris.is_empty() {
        writeln!(out, "No redirect URIs found in the JSON file")?;
    } else {
        writeln!(out, "Configured Redirect URIs:")?;
        for uri in &client.redirect_uris {
            writeln!(out, "  - {uri}")?;
        }
    }

    rule(out)
}

pub fn authorization_link(out: &mut impl Write, auth_url: &str) -> io::Result<()> {
    writeln!(out)?;
    rule(out)?;
    writeln!(out, "STEP 1: Visit this URL in your browser:")?;
    writeln!(out, "{auth_url}")?;
    rule(out)
}

pub fn paste_instructions(out: &mut impl Write, redirect_uri: &str) -> io::Result<()> {
    writeln!(out, "\nSTEP 2: After authorizing, you'll be redirected to: {redirect_uri}")?;
    writeln!(out, "The page might not load (that's normal for localhost).")?;
    writeln!(out, "Copy the ENTIRE URL from your browser's address bar and paste it below.")?;
    rule(out)
}

pub fn credentials(out: &mut impl Write, credentials: &Credentials) -> io::Result<()> {
    writeln!(out)?;
    rule(out)?;
    writeln!(out, "SUCCESS! Your credentials:")?;
    rule(out)?;
    writeln!(out, "CLIENT_ID: {}", credentials.client_id)?;
    writeln!(out, "CLIENT_SECRET: {}", credentials.client_secret)?;
    writeln!(out, "REFRESH_TOKEN: {}", credentials.refresh_token)?;
    rule(out)?;

    writeln!(out, "\nAdd these to your environment variables:")?;
    writeln!(out, "{CLIENT_ID_VAR}={}", credentials.client_id)?;
    writeln!(out, "{CLIENT_SECRET_VAR}={}", credentials.client_secret)?;
    writeln!(out, "{REFRESH_TOKEN_VAR}={}", credentials.refresh_token)
}

pub fn failure(out: &mut impl Write, message: &str) -> io::Result<()> {
    writeln!(out, "\nError: {message}")?;
    writeln!(out, "\nCommon issues:")?;
    for hint in REMEDIATION_HINTS {
        writeln!(out, "{hint}")?;
    }
    Ok(())
}

pub fn outcome(out: &mut impl Write, outcome: &ExchangeOutcome) -> io::Result<()> {
    match outcome {
        ExchangeOutcome::Success(creds) => credentials(out, creds),
        ExchangeOutcome::ConfigError { message }
        | ExchangeOutcome::NetworkError { message }
        | ExchangeOutcome::ExchangeRejected {
            provider_message: message,
        } => failure(out, message),
    }
}

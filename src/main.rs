use std::{error::Error as _, io, path::PathBuf, process::ExitCode, time::Duration};

use ads_refresh_token::{
    FlowOptions, acquirer,
    options::{
        ADWORDS_SCOPE, DEFAULT_CREDENTIALS_FILE, DEFAULT_LISTEN_TIMEOUT_SECS, DEFAULT_REDIRECT_URI,
    },
};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Google Ads refresh token generator - Runs the OAuth 2.0 offline access flow and prints the credentials
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the OAuth client secrets file downloaded from Google Cloud Console
    #[arg(long, default_value = DEFAULT_CREDENTIALS_FILE)]
    credentials_file: PathBuf,

    /// OAuth scope to request
    #[arg(long, default_value = ADWORDS_SCOPE)]
    scope: String,

    /// Redirect URI used when the client secrets file registers none
    #[arg(long, default_value = DEFAULT_REDIRECT_URI)]
    default_redirect_uri: String,

    /// Refuse plain http redirect URIs (turns off local development mode)
    #[arg(long)]
    https_only: bool,

    /// Capture the redirect with a local callback server instead of pasting it
    #[arg(long)]
    listen: bool,

    /// Seconds to wait for the browser redirect with --listen (default: 300)
    #[arg(long, default_value_t = DEFAULT_LISTEN_TIMEOUT_SECS)]
    listen_timeout_secs: u64,
}

impl From<Args> for FlowOptions {
    fn from(args: Args) -> Self {
        Self {
            credentials_file: args.credentials_file,
            scope: args.scope,
            default_redirect_uri: args.default_redirect_uri,
            insecure_transport: !args.https_only,
            listen: args.listen,
            listen_timeout: Duration::from_secs(args.listen_timeout_secs),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let options = FlowOptions::from(Args::parse());
    debug!(?options, "starting token acquisition");

    let mut input = io::stdin().lock();
    let mut output = io::stdout();

    let result = acquirer::run(&options, &mut input, &mut output, |client, redirect_uri| {
        acquirer::authorization_flow(&options, client, redirect_uri)
    })
    .await;

    match result {
        // A failed exchange has already been reported with its hints
        Ok(outcome) => {
            debug!(success = outcome.is_success(), "token acquisition finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

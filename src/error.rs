use std::io;

use thiserror::Error;

/// The global `Result` alias of the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a run. Failures of the code exchange itself are
/// not errors: they end up in [`crate::ExchangeOutcome`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot load OAuth client configuration")]
    LoadClientConfigError(#[source] ads_oauth::Error),
    #[error("cannot build authorization URL")]
    BuildAuthorizationUrlError(#[source] ads_oauth::Error),
    #[error("cannot capture authorization redirect")]
    CaptureRedirectError(#[source] ads_oauth::Error),
    #[error("cannot read redirect URL from standard input")]
    ReadRedirectUrlError(#[source] io::Error),
    #[error("standard input closed before a redirect URL was entered")]
    MissingRedirectUrlError,

    #[error(transparent)]
    IoError(#[from] io::Error),
}

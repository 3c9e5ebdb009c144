use std::{io, path::PathBuf};

use thiserror::Error;

/// The global `Result` alias of the library.
pub type Result<T> = std::result::Result<T, Error>;

/// The global `Error` enum of the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read client secrets file {1}: {0}")]
    ReadClientSecretsError(#[source] io::Error, PathBuf),
    #[error("cannot parse client secrets: {0}")]
    ParseClientSecretsError(#[source] serde_json::Error),
    #[error("client secrets must contain a \"web\" or an \"installed\" section")]
    MissingClientTypeError,

    #[error("invalid redirect URI {1}: {0}")]
    InvalidRedirectUriError(#[source] url::ParseError, String),
    #[error("invalid endpoint URL {1}: {0}")]
    InvalidEndpointError(#[source] url::ParseError, String),
    #[error("OAuth 2 must use HTTPS, refusing {0} outside local development mode")]
    InsecureTransportError(String),

    #[error("no authorization URL was generated before exchanging the code")]
    MissingAuthorizationRequestError,
    #[error("cannot parse redirect URL: {0}")]
    ParseRedirectResponseError(#[source] url::ParseError),
    #[error("authorization server returned an error: {0}")]
    AuthorizationDeniedError(String),
    #[error("cannot find state in redirect URL")]
    MissingStateError,
    #[error("mismatching state: the redirect URL does not belong to this authorization request")]
    InvalidStateError,
    #[error("cannot find code in redirect URL")]
    MissingCodeError,

    #[error("cannot send token request to {1}: {0}")]
    SendTokenRequestError(#[source] reqwest::Error, String),
    #[error("token endpoint rejected the authorization code (status {status}): {message}")]
    TokenRequestRejectedError { status: u16, message: String },
    #[error("cannot parse token response: {0}")]
    ParseTokenResponseError(#[source] reqwest::Error),
    #[error("missing {0} in token response")]
    MissingTokenFieldError(&'static str),

    #[error("cannot listen for redirect URI {0}: only http loopback URIs are supported")]
    UnsupportedCallbackUriError(String),
    #[error("cannot bind redirect server on {1}: {0}")]
    BindCallbackServerError(#[source] io::Error, String),
    #[error("OAuth authorization timeout ({0} seconds)")]
    CallbackTimeoutError(u64),
    #[error("interrupted while waiting for the authorization redirect")]
    CallbackCancelledError,
}

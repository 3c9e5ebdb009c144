//! Result of the code exchange, classified so that callers can branch
//! on the cause instead of matching printed messages.

use ads_oauth::{ClientSecrets, Error, OAuthToken};

/// Credentials a Google Ads API client needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

impl Credentials {
    pub fn new(client: &ClientSecrets, token: &OAuthToken) -> Self {
        Self {
            client_id: client.client_id.clone(),
            client_secret: client.client_secret.clone(),
            refresh_token: token.refresh_token.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    Success(Credentials),
    /// The client configuration or redirect URI is unusable
    ConfigError { message: String },
    /// The token endpoint could not be reached
    NetworkError { message: String },
    /// The redirect URL or the code was refused, locally or by the
    /// provider
    ExchangeRejected { provider_message: String },
}

impl ExchangeOutcome {
    pub fn from_result(client: &ClientSecrets, result: ads_oauth::Result<OAuthToken>) -> Self {
        match result {
            Ok(token) => Self::Success(Credentials::new(client, &token)),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn from_error(err: Error) -> Self {
        let message = err.to_string();

        match err {
            Error::SendTokenRequestError(..) => Self::NetworkError { message },
            Error::ParseTokenResponseError(ref err) if !err.is_decode() => {
                Self::NetworkError { message }
            }

            Error::TokenRequestRejectedError { message, .. }
            | Error::AuthorizationDeniedError(message) => Self::ExchangeRejected {
                provider_message: message,
            },
            Error::ParseTokenResponseError(_)
            | Error::MissingTokenFieldError(_)
            | Error::ParseRedirectResponseError(..)
            | Error::MissingStateError
            | Error::InvalidStateError
            | Error::MissingCodeError
            | Error::InsecureTransportError(_)
            | Error::MissingAuthorizationRequestError => Self::ExchangeRejected {
                provider_message: message,
            },

            Error::ReadClientSecretsError(..)
            | Error::ParseClientSecretsError(_)
            | Error::MissingClientTypeError
            | Error::InvalidRedirectUriError(..)
            | Error::InvalidEndpointError(..)
            | Error::UnsupportedCallbackUriError(_)
            | Error::BindCallbackServerError(..)
            | Error::CallbackTimeoutError(_)
            | Error::CallbackCancelledError => Self::ConfigError { message },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            Self::Success(credentials) => Some(credentials),
            _ => None,
        }
    }

    /// Failure message, `None` on success
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::ConfigError { message } | Self::NetworkError { message } => Some(message),
            Self::ExchangeRejected { provider_message } => Some(provider_message),
        }
    }
}

//! Loopback redirect capture, an alternative to copying the redirect
//! URL out of the browser by hand.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{
    Router,
    extract::{Query, RawQuery},
    response::{Html, IntoResponse},
    routing::get,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::{Host, Url};

use crate::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Deserialize)]
struct AuthCallback {
    code: Option<String>,
    error: Option<String>,
}

/// Resolve the socket address and route path to serve for a redirect
/// URI. Only `http` loopback URIs can be served locally.
fn callback_address(redirect: &Url) -> Result<(String, String)> {
    let unsupported = || Error::UnsupportedCallbackUriError(redirect.to_string());

    if redirect.scheme() != "http" {
        return Err(unsupported());
    }

    let host = match redirect.host() {
        Some(Host::Domain("localhost")) => "127.0.0.1".to_string(),
        Some(Host::Ipv4(ip)) if ip.is_loopback() => ip.to_string(),
        Some(Host::Ipv6(ip)) if ip.is_loopback() => format!("[{ip}]"),
        _ => return Err(unsupported()),
    };
    let port = redirect.port_or_known_default().unwrap_or(80);

    Ok((format!("{host}:{port}"), redirect.path().to_string()))
}

/// Wait until the callback handler stored a query, `timeout` elapsed
/// or `cancel` completed.
async fn poll_for_query(
    slot: &Mutex<Option<String>>,
    timeout: Duration,
    cancel: impl Future<Output = ()>,
) -> Result<String> {
    tokio::pin!(cancel);
    let start = tokio::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(Error::CallbackTimeoutError(timeout.as_secs()));
        }

        let query_opt = slot.lock().await.take();
        if let Some(query) = query_opt {
            return Ok(query);
        }

        tokio::select! {
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
            _ = &mut cancel => return Err(Error::CallbackCancelledError),
        }
    }
}

/// Serve the redirect URI locally and wait for the browser to land on
/// it. Returns the full redirect URL, query included, ready to be
/// exchanged.
pub async fn wait_for_redirect(redirect_uri: &str, timeout: Duration) -> Result<String> {
    let redirect = Url::parse(redirect_uri)
        .map_err(|err| Error::InvalidRedirectUriError(err, redirect_uri.to_owned()))?;
    let (addr, path) = callback_address(&redirect)?;

    // Shared state for callback
    let query_receiver = Arc::new(Mutex::new(None::<String>));
    let query_receiver_clone = query_receiver.clone();

    let callback_handler = move |Query(params): Query<AuthCallback>, RawQuery(query): RawQuery| async move {
        if let Some(query) = query {
            *query_receiver_clone.lock().await = Some(query);
        }

        if let Some(error) = params.error {
            return Html(format!(
                "<html><body><h1>Authorization Failed</h1><p>Error: {}</p>\
                <p>You can close this window.</p></body></html>",
                error
            ))
            .into_response();
        }

        if params.code.is_some() {
            return Html(
                "<html><body><h1>Authorization Successful!</h1>\
                <p>You can close this window and return to the terminal.</p></body></html>",
            )
            .into_response();
        }

        Html("<html><body><h1>Authorization Failed</h1><p>No code received</p></body></html>")
            .into_response()
    };

    let app = Router::new().route(&path, get(callback_handler));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|err| Error::BindCallbackServerError(err, addr.clone()))?;
    let server = axum::serve(listener, app);

    let server_handle = tokio::spawn(async move {
        server.await.ok();
    });

    info!(%addr, %path, "waiting for authorization redirect");

    // installed once for the whole wait
    let interrupted = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let query = poll_for_query(&query_receiver, timeout, interrupted).await;
    server_handle.abort();
    let query = query?;

    debug!("received authorization redirect");

    let mut response = redirect;
    response.set_query(Some(&query));

    Ok(response.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(uri: &str) -> Result<(String, String)> {
        callback_address(&Url::parse(uri).unwrap())
    }

    #[test]
    fn serves_loopback_redirects() {
        assert_eq!(
            address("http://localhost:8080/callback").unwrap(),
            ("127.0.0.1:8080".to_string(), "/callback".to_string())
        );
        assert_eq!(
            address("http://127.0.0.1:9999").unwrap(),
            ("127.0.0.1:9999".to_string(), "/".to_string())
        );
        assert_eq!(
            address("http://[::1]:8080/oauth2callback").unwrap(),
            ("[::1]:8080".to_string(), "/oauth2callback".to_string())
        );
        assert_eq!(
            address("http://localhost/callback").unwrap().0,
            "127.0.0.1:80"
        );
    }

    #[tokio::test]
    async fn cancellation_spanning_several_polls_is_not_lost() {
        let slot = Mutex::new(None);
        let started = tokio::time::Instant::now();

        let err = poll_for_query(
            &slot,
            Duration::from_secs(30),
            tokio::time::sleep(POLL_INTERVAL * 3 / 2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::CallbackCancelledError));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn stored_query_ends_the_wait() {
        let slot = Mutex::new(Some("state=abc&code=c".to_string()));

        let query = poll_for_query(&slot, Duration::from_secs(30), std::future::pending())
            .await
            .unwrap();

        assert_eq!(query, "state=abc&code=c");
        assert!(slot.lock().await.is_none());
    }

    #[tokio::test]
    async fn gives_up_after_timeout() {
        let slot = Mutex::new(None);

        let err = poll_for_query(&slot, Duration::from_millis(100), std::future::pending())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::CallbackTimeoutError(0)));
    }

    #[test]
    fn refuses_remote_or_https_redirects() {
        assert!(matches!(
            address("https://localhost:8080/callback"),
            Err(Error::UnsupportedCallbackUriError(_))
        ));
        assert!(matches!(
            address("http://example.com/callback"),
            Err(Error::UnsupportedCallbackUriError(_))
        ));
    }
}

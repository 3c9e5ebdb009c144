use std::{
    future::{Future, ready},
    io::{Cursor, Write},
    path::PathBuf,
    sync::Mutex,
};

use ads_oauth::{AuthorizationParams, ClientSecrets, Error as OAuthError, OAuthToken};
use ads_refresh_token::{
    Error, ExchangeOutcome, FlowOptions,
    acquirer::{self, AuthorizationService},
    report::REMEDIATION_HINTS,
};
use tempfile::NamedTempFile;

const PASTED: &str = "http://localhost:8080/callback?state=s&code=4%2F0Ab";

/// Stand-in for the OAuth library: answers every exchange with the
/// same canned result and records what it was asked.
struct MockService {
    redirect_uri: String,
    result: fn() -> ads_oauth::Result<OAuthToken>,
    params: Option<AuthorizationParams>,
    responses: Mutex<Vec<String>>,
}

impl MockService {
    fn new(redirect_uri: &str, result: fn() -> ads_oauth::Result<OAuthToken>) -> Self {
        Self {
            redirect_uri: redirect_uri.to_string(),
            result,
            params: None,
            responses: Mutex::new(Vec::new()),
        }
    }
}

impl AuthorizationService for MockService {
    fn authorization_url(&mut self, params: &AuthorizationParams) -> ads_oauth::Result<String> {
        self.params = Some(params.clone());
        Ok(format!(
            "https://accounts.google.com/o/oauth2/auth?redirect_uri={}",
            self.redirect_uri
        ))
    }

    fn fetch_token(
        &self,
        authorization_response: &str,
    ) -> impl Future<Output = ads_oauth::Result<OAuthToken>> + Send {
        self.responses
            .lock()
            .unwrap()
            .push(authorization_response.to_string());
        ready((self.result)())
    }
}

fn refresh_token_r() -> ads_oauth::Result<OAuthToken> {
    Ok(OAuthToken {
        access_token: "ya29.a0".to_string(),
        refresh_token: "R".to_string(),
        token_type: "Bearer".to_string(),
        expires_at: None,
    })
}

fn invalid_grant() -> ads_oauth::Result<OAuthToken> {
    Err(OAuthError::TokenRequestRejectedError {
        status: 400,
        message: "invalid_grant".to_string(),
    })
}

fn credentials_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn options(path: PathBuf) -> FlowOptions {
    FlowOptions {
        credentials_file: path,
        ..FlowOptions::default()
    }
}

const WEB_CLIENT: &str = r#"{"web": {
    "client_id": "X",
    "client_secret": "Y",
    "redirect_uris": ["http://localhost:8080/callback"]
}}"#;

/// Run the workflow with `stdin` as operator input, returning the
/// outcome and the console output.
async fn run(
    options: &FlowOptions,
    stdin: &str,
    result: fn() -> ads_oauth::Result<OAuthToken>,
) -> (ads_refresh_token::Result<ExchangeOutcome>, String) {
    let mut input = Cursor::new(stdin.to_string());
    let mut out = Vec::new();

    let outcome = acquirer::run(options, &mut input, &mut out, |_client, redirect_uri| {
        MockService::new(redirect_uri, result)
    })
    .await;

    (outcome, String::from_utf8(out).unwrap())
}

#[test_log::test(tokio::test)]
async fn successful_exchange_prints_env_assignments() {
    let file = credentials_file(WEB_CLIENT);
    let options = options(file.path().to_path_buf());
    let (outcome, text) = run(&options, &format!("{PASTED}\n"), refresh_token_r).await;

    let outcome = outcome.unwrap();
    assert!(outcome.is_success());

    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.contains(&"GOOGLE_ADS_CLIENT_ID=X"));
    assert!(lines.contains(&"GOOGLE_ADS_CLIENT_SECRET=Y"));
    assert!(lines.contains(&"GOOGLE_ADS_REFRESH_TOKEN=R"));
    assert!(lines.contains(&"SUCCESS! Your credentials:"));
    assert!(lines.contains(&"Using existing redirect URI: http://localhost:8080/callback"));
    assert!(!text.contains("Common issues:"));
}

#[test_log::test(tokio::test)]
async fn rejected_exchange_prints_hints_only() {
    let file = credentials_file(WEB_CLIENT);
    let options = options(file.path().to_path_buf());
    let (outcome, text) = run(&options, &format!("{PASTED}\n"), invalid_grant).await;

    assert_eq!(
        outcome.unwrap(),
        ExchangeOutcome::ExchangeRejected {
            provider_message: "invalid_grant".to_string()
        }
    );

    assert!(text.contains("Error: invalid_grant"));
    for hint in REMEDIATION_HINTS {
        assert!(text.contains(hint), "missing hint {hint:?}");
    }
    assert!(!text.contains("GOOGLE_ADS_"));
    assert!(!text.contains("REFRESH_TOKEN:"));
}

#[test_log::test(tokio::test)]
async fn service_gets_registered_redirect_and_pasted_url() {
    let file = credentials_file(WEB_CLIENT);
    let options = options(file.path().to_path_buf());
    let mut input = Cursor::new(format!("   {PASTED}  \n"));
    let mut out = Vec::new();

    let client = acquirer::inspect_configuration(&options.credentials_file, &mut out).unwrap();
    let redirect_uri =
        acquirer::select_redirect_uri(&client.redirect_uris, &options, &mut out).unwrap();
    let mut mock = MockService::new(&redirect_uri, refresh_token_r);

    let auth_url = acquirer::build_authorization_request(&mut mock).unwrap();
    assert_eq!(mock.params, Some(AuthorizationParams::offline_consent()));
    assert!(auth_url.ends_with("redirect_uri=http://localhost:8080/callback"));

    let response =
        acquirer::collect_authorization_response(&auth_url, &redirect_uri, &mut input, &mut out)
            .unwrap();
    let outcome = acquirer::exchange_code_for_tokens(&mock, &client, &response).await;

    assert!(outcome.is_success());
    assert_eq!(*mock.responses.lock().unwrap(), vec![PASTED.to_string()]);
}

#[test_log::test(tokio::test)]
async fn installed_client_without_redirect_uris_uses_default() {
    let file = credentials_file(r#"{"installed": {"client_id": "X", "client_secret": "Y"}}"#);
    let options = options(file.path().to_path_buf());
    let mut out = Vec::new();

    let client = acquirer::inspect_configuration(&options.credentials_file, &mut out).unwrap();
    let redirect_uri =
        acquirer::select_redirect_uri(&client.redirect_uris, &options, &mut out).unwrap();

    assert_eq!(redirect_uri, "http://localhost:8080/callback");

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("App Type: installed"));
    assert!(text.contains("No redirect URIs found in the JSON file"));
    assert!(text.contains("Using default redirect URI: http://localhost:8080/callback"));
}

#[test_log::test(tokio::test)]
async fn malformed_configuration_fails_before_exchange() {
    let file = credentials_file("client_id = X");
    let mut input = Cursor::new(format!("{PASTED}\n"));
    let mut out = Vec::new();

    let result = acquirer::run(
        &options(file.path().to_path_buf()),
        &mut input,
        &mut out,
        |_client: &ClientSecrets, _redirect_uri: &str| -> MockService {
            panic!("the OAuth service must not be built for a malformed configuration")
        },
    )
    .await;

    match result.unwrap_err() {
        Error::LoadClientConfigError(OAuthError::ParseClientSecretsError(_)) => (),
        err => panic!("unexpected error: {err:?}"),
    }
    assert!(out.is_empty());
}

#[test_log::test(tokio::test)]
async fn missing_configuration_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut out = Vec::new();

    let err = acquirer::inspect_configuration(&dir.path().join("client_secret.json"), &mut out)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::LoadClientConfigError(OAuthError::ReadClientSecretsError(..))
    ));
}

#[test_log::test(tokio::test)]
async fn inspection_is_idempotent() {
    let file = credentials_file(WEB_CLIENT);

    let mut first = Vec::new();
    let mut second = Vec::new();
    let a = acquirer::inspect_configuration(file.path(), &mut first).unwrap();
    let b = acquirer::inspect_configuration(file.path(), &mut second).unwrap();

    assert_eq!(a, b);
    assert_eq!(first, second);
    assert!(String::from_utf8(first).unwrap().contains("Client ID: X"));
}

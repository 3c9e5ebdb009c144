//! Client secrets descriptor, as downloaded from the Google Cloud
//! Console credentials page.

use std::{fmt, fs, path::Path};

use serde::Deserialize;

use crate::{DEFAULT_AUTH_URI, DEFAULT_TOKEN_URI, Error, Result};

/// Kind of OAuth client the descriptor was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientType {
    Web,
    Installed,
}

impl ClientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Web => "web",
            ClientType::Installed => "installed",
        }
    }
}

impl fmt::Display for ClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    web: Option<ClientSection>,
    installed: Option<ClientSection>,
}

#[derive(Debug, Deserialize)]
struct ClientSection {
    client_id: String,
    client_secret: String,
    #[serde(default)]
    redirect_uris: Vec<String>,
    auth_uri: Option<String>,
    token_uri: Option<String>,
}

/// OAuth client configuration loaded from a client secrets file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSecrets {
    /// Section the client was found in
    pub client_type: ClientType,
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Redirect URIs registered for the client, in file order
    pub redirect_uris: Vec<String>,
    /// Authorization endpoint
    pub auth_uri: String,
    /// Token endpoint
    pub token_uri: String,
}

impl ClientSecrets {
    /// Load client secrets from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|err| Error::ReadClientSecretsError(err, path.to_path_buf()))?;
        Self::from_json(&content)
    }

    /// Parse client secrets from a JSON document. The `web` section
    /// takes precedence when both sections are present.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: ClientSecretsFile =
            serde_json::from_str(content).map_err(Error::ParseClientSecretsError)?;

        let (client_type, section) = match (file.web, file.installed) {
            (Some(web), _) => (ClientType::Web, web),
            (None, Some(installed)) => (ClientType::Installed, installed),
            (None, None) => return Err(Error::MissingClientTypeError),
        };

        Ok(Self {
            client_type,
            client_id: section.client_id,
            client_secret: section.client_secret,
            redirect_uris: section.redirect_uris,
            auth_uri: section
                .auth_uri
                .unwrap_or_else(|| DEFAULT_AUTH_URI.to_string()),
            token_uri: section
                .token_uri
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }
}

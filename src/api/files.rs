//! The two Google OAuth files kept under `.secrets`: the client credentials downloaded from the
//! Cloud console (`client_secret.json`) and the tokens written by `gagyebu auth` (`token.json`).

use crate::api::OAUTH_SCOPES;
use crate::{utils, Result};
use anyhow::{anyhow, Context};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Google only hands the authorization code to a loopback redirect without a port.
const LOOPBACK_REDIRECTS: [&str; 2] = ["http://localhost", "http://127.0.0.1"];

/// Access tokens this close to expiry, in seconds, are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// A JSON document together with the path it is saved to.
#[derive(Default, Debug, Clone)]
pub(super) struct JsonFile<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    path: PathBuf,
    data: F,
}

impl<F> JsonFile<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    pub(super) async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = utils::deserialize(&path).await?;
        Ok(Self { path, data })
    }

    pub(super) fn new(path: impl Into<PathBuf>, data: F) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Writes the data back out, readable by the owner only.
    pub(super) async fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.data)
            .with_context(|| format!("Unable to serialize {}", self.path.display()))?;
        utils::write(&self.path, json).await?;
        restrict_to_owner(&self.path)
    }

    pub(super) fn data(&self) -> &F {
        &self.data
    }

    pub(super) fn data_mut(&mut self) -> &mut F {
        &mut self.data
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Unable to set the permissions of {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_to_owner(_: &Path) -> Result<()> {
    Ok(())
}

/// `client_secret.json` for a "Desktop app" OAuth client. Google nests the fields under
/// `installed`:
///
/// ```json
/// {
///   "installed": {
///     "client_id": "1234-abcd.apps.googleusercontent.com",
///     "client_secret": "GOCSPX-...",
///     "redirect_uris": ["http://localhost"],
///     "auth_uri": "https://accounts.google.com/o/oauth2/auth",
///     "token_uri": "https://oauth2.googleapis.com/token"
///   }
/// }
/// ```
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub(super) struct SecretFile {
    installed: DesktopClient,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
struct DesktopClient {
    client_id: String,
    client_secret: String,
    #[serde(deserialize_with = "loopback_redirects")]
    redirect_uris: Vec<String>,
    auth_uri: String,
    token_uri: String,
}

fn loopback_redirects<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let uris = Vec::<String>::deserialize(deserializer)?;
    if uris.iter().any(|uri| LOOPBACK_REDIRECTS.contains(&uri.as_str())) {
        return Ok(uris);
    }
    Err(serde::de::Error::custom(format!(
        "At least one of the redirects needs to be {}, found {uris:?}. Add it to the redirect \
        URIs of the OAuth client in the Google Cloud console and download the file again.",
        LOOPBACK_REDIRECTS[0]
    )))
}

impl SecretFile {
    pub(super) async fn load(path: &Path) -> Result<SecretFile> {
        utils::deserialize(path)
            .await
            .with_context(|| format!("Unable to read the OAuth client file {}", path.display()))
    }

    pub(super) fn client_id(&self) -> &str {
        &self.installed.client_id
    }

    pub(super) fn client_secret(&self) -> &str {
        &self.installed.client_secret
    }

    pub(super) fn auth_uri(&self) -> &str {
        &self.installed.auth_uri
    }

    pub(super) fn token_uri(&self) -> &str {
        &self.installed.token_uri
    }
}

/// `token.json`: what Google granted us the last time we authorized or refreshed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub(super) struct TokenFile {
    scopes: Vec<String>,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenFile {
    /// Fails when the file is unreadable or lacks one of [`OAUTH_SCOPES`].
    pub(super) async fn load(path: impl AsRef<Path>) -> Result<JsonFile<Self>> {
        let file: JsonFile<Self> = JsonFile::load(path.as_ref())
            .await
            .context("Unable to read the OAuth token file")?;
        if let Some(missing) = file.data().missing_scope() {
            return Err(anyhow!(
                "OAuth scope '{missing}' is missing. Run 'gagyebu auth' again."
            ));
        }
        Ok(file)
    }

    fn missing_scope(&self) -> Option<&'static str> {
        OAUTH_SCOPES
            .iter()
            .copied()
            .find(|required| !self.scopes.iter().any(|granted| granted == required))
    }

    pub(super) fn new(
        scopes: Vec<String>,
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scopes,
            access_token,
            refresh_token,
            expires_at,
        }
    }

    pub(super) fn access_token(&self) -> &str {
        &self.access_token
    }

    pub(super) fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub(super) fn is_expired(&self) -> bool {
        self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) <= Utc::now()
    }

    /// Google usually leaves out the refresh token and scopes on a refresh, so those are only
    /// replaced when present.
    pub(super) fn update(
        &mut self,
        access_token: String,
        expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
        scopes: Option<Vec<String>>,
    ) {
        self.access_token = access_token;
        self.expires_at = expires_at;
        if let Some(refresh_token) = refresh_token {
            self.refresh_token = refresh_token;
        }
        if let Some(scopes) = scopes {
            self.scopes = scopes;
        }
    }
}

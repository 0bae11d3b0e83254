//! OAuth 2.0 authentication flow implementation for the Google Sheets API.
//!
//! This module handles the complete OAuth workflow including:
//! - Loading OAuth credentials from `client_secret.json`
//! - Managing access and refresh tokens in `token.json`
//! - Running the OAuth consent flow with a local callback server
//! - Automatic token refresh when expired

use crate::api::files::{JsonFile, SecretFile, TokenFile};
use crate::api::OAUTH_SCOPES;
use crate::Result;
use anyhow::{bail, Context};
use chrono::Utc;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use std::collections::HashMap;
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, info};

const OAUTH_CALLBACK_PORT: u16 = 3030;

/// Used when Google does not say how long an access token lives.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Provides a valid access token for the Google APIs, refreshing it and saving it back to
/// `token.json` when it is about to expire.
pub(crate) struct TokenProvider {
    client: GoogleClient,
    http: reqwest::Client,
    token: JsonFile<TokenFile>,
}

impl TokenProvider {
    /// Runs the complete OAuth consent flow. This is the only place where the user is asked to
    /// visit Google in a browser.
    ///
    /// 1. Loads the OAuth client credentials from `client_secret`
    /// 2. Prints the Google consent URL
    /// 3. Waits for the redirect on `http://localhost:3030`
    /// 4. Exchanges the authorization code for access and refresh tokens
    /// 5. Saves the tokens to `token_path`
    pub(crate) async fn initialize(
        client_secret: impl AsRef<Path>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let client = client(client_secret.as_ref()).await?;
        let http = http_client()?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new(s.to_string())))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("Open this URL in your browser to authorize gagyebu:\n\n{auth_url}\n");
        info!("Waiting for the authorization on http://localhost:{OAUTH_CALLBACK_PORT}");

        let params = receive_callback(OAUTH_CALLBACK_PORT).await?;
        if let Some(error) = params.get("error") {
            bail!("Authorization was denied: {error}");
        }
        let state = params
            .get("state")
            .context("The OAuth callback did not include a state")?;
        if state != csrf_token.secret() {
            bail!("The OAuth callback state does not match, the authorization was not completed");
        }
        let code = params
            .get("code")
            .context("The OAuth callback did not include an authorization code")?;

        let response = client
            .exchange_code(AuthorizationCode::new(code.clone()))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http)
            .await
            .context("Failed to exchange the authorization code for a token")?;

        let refresh_token = response
            .refresh_token()
            .context("Google did not return a refresh token")?
            .secret()
            .clone();
        let expires_in = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let scopes = response
            .scopes()
            .map(|scopes| scopes.iter().map(|s| (**s).clone()).collect())
            .unwrap_or_else(|| OAUTH_SCOPES.iter().map(|s| s.to_string()).collect());
        let token_file = TokenFile::new(
            scopes,
            response.access_token().secret().clone(),
            refresh_token,
            expires_at(expires_in),
        );
        let token = JsonFile::new(token_path, token_file);
        token.save().await?;
        info!("Authorization successful, tokens saved to {}", token.path().display());

        Ok(Self {
            client,
            http,
            token,
        })
    }

    /// Loads the saved tokens without any user interaction. Fails if `token.json` is missing or
    /// was not granted the scopes this app needs.
    pub(crate) async fn load(
        client_secret: impl AsRef<Path>,
        token_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let client = client(client_secret.as_ref()).await?;
        let token = TokenFile::load(token_path.as_ref()).await?;
        Ok(Self {
            client,
            http: http_client()?,
            token,
        })
    }

    /// Exchanges the refresh token for a new access token and saves it.
    pub(crate) async fn refresh(&mut self) -> Result<()> {
        debug!("Refreshing the OAuth access token");
        let refresh_token = RefreshToken::new(self.token.data().refresh_token().to_string());
        let response = self
            .client
            .exchange_refresh_token(&refresh_token)
            .request_async(&self.http)
            .await
            .context("Failed to refresh the OAuth access token")?;

        let expires_in = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        self.token.data_mut().update(
            response.access_token().secret().clone(),
            expires_at(expires_in),
            response.refresh_token().map(|t| t.secret().clone()),
            response
                .scopes()
                .map(|scopes| scopes.iter().map(|s| (**s).clone()).collect()),
        );
        self.token.save().await
    }

    /// Returns the access token, refreshing it first if it expires within a minute.
    pub(crate) async fn token_with_refresh(&mut self) -> Result<&str> {
        if self.token.data().is_expired() {
            self.refresh().await?;
        }
        Ok(self.token())
    }

    /// Returns the access token as it is, without checking whether it has expired.
    pub(crate) fn token(&self) -> &str {
        self.token.data().access_token()
    }
}

async fn client(client_secret: &Path) -> Result<GoogleClient> {
    let secret = SecretFile::load(client_secret).await?;
    let auth_url = AuthUrl::new(secret.auth_uri().to_string())
        .context("Invalid auth_uri in the OAuth client secret file")?;
    let token_url = TokenUrl::new(secret.token_uri().to_string())
        .context("Invalid token_uri in the OAuth client secret file")?;
    let redirect_url = RedirectUrl::new(format!("http://localhost:{OAUTH_CALLBACK_PORT}"))
        .context("Invalid OAuth redirect URL")?;
    Ok(BasicClient::new(ClientId::new(secret.client_id().to_string()))
        .set_client_secret(ClientSecret::new(secret.client_secret().to_string()))
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url))
}

/// OAuth token endpoints must not be followed through redirects.
fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Unable to create the HTTP client")
}

fn expires_at(expires_in: Duration) -> chrono::DateTime<Utc> {
    let expires_in = chrono::Duration::from_std(expires_in)
        .unwrap_or_else(|_| chrono::Duration::seconds(DEFAULT_TOKEN_LIFETIME.as_secs() as i64));
    Utc::now() + expires_in
}

/// Serves `http://localhost:{port}` until a request arrives carrying either an authorization
/// `code` or an `error`, and returns that request's query parameters.
async fn receive_callback(port: u16) -> Result<HashMap<String, String>> {
    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("Unable to listen for the OAuth callback on port {port}"))?;

    loop {
        let (stream, _) = listener
            .accept()
            .await
            .context("Failed to accept the OAuth callback connection")?;

        let captured: Arc<Mutex<Option<HashMap<String, String>>>> = Arc::new(Mutex::new(None));
        let sink = captured.clone();
        let service = service_fn(move |request: Request<Incoming>| {
            let sink = sink.clone();
            async move {
                let params = query_params(request.uri().query().unwrap_or_default());
                let page = CallbackPage::for_params(&params);
                if let Ok(mut slot) = sink.lock() {
                    *slot = Some(params);
                }
                Ok::<_, Infallible>(Response::new(page.body().to_string()))
            }
        });

        if let Err(e) = http1::Builder::new()
            .keep_alive(false)
            .serve_connection(TokioIo::new(stream), service)
            .await
        {
            debug!("Error while serving an OAuth callback connection: {e}");
            continue;
        }

        let params = captured.lock().ok().and_then(|mut slot| slot.take());
        if let Some(params) = params {
            if params.contains_key("code") || params.contains_key("error") {
                return Ok(params);
            }
        }
    }
}

fn query_params(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

/// The page shown in the browser after Google redirects back to the callback server.
enum CallbackPage {
    Done,
    Denied,
    Ignored,
}

impl CallbackPage {
    fn for_params(params: &HashMap<String, String>) -> Self {
        if params.contains_key("code") {
            CallbackPage::Done
        } else if params.contains_key("error") {
            CallbackPage::Denied
        } else {
            CallbackPage::Ignored
        }
    }

    fn body(&self) -> &'static str {
        match self {
            CallbackPage::Done => {
                "gagyebu is authorized. You can close this window and return to the terminal."
            }
            CallbackPage::Denied => "Authorization was denied. Return to the terminal for details.",
            CallbackPage::Ignored => "Waiting for the Google authorization redirect.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params() {
        let params = query_params("state=abc&code=4%2F0AX&scope=https%3A%2F%2Fx");
        assert_eq!(params.get("state").unwrap(), "abc");
        assert_eq!(params.get("code").unwrap(), "4/0AX");
        assert_eq!(params.get("scope").unwrap(), "https://x");
        assert!(query_params("").is_empty());
    }

    #[test]
    fn test_callback_page() {
        let mut params = HashMap::new();
        assert!(matches!(
            CallbackPage::for_params(&params),
            CallbackPage::Ignored
        ));
        params.insert("error".to_string(), "access_denied".to_string());
        assert!(matches!(
            CallbackPage::for_params(&params),
            CallbackPage::Denied
        ));
        params.insert("code".to_string(), "x".to_string());
        assert!(CallbackPage::for_params(&params)
            .body()
            .contains("authorized"));
    }

    #[test]
    fn test_expires_at() {
        let at = expires_at(Duration::from_secs(120));
        let delta = at - Utc::now();
        assert!(delta.num_seconds() > 100 && delta.num_seconds() <= 120);
    }
}

//! Configuration file handling for gagyebu.
//!
//! The configuration file is stored at `$LEDGER_HOME/config.json` and contains settings for the
//! app including the Google Sheet URL, the web server address, the dashboard cache lifetime and
//! authentication file paths.

use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "gagyebu";
const CONFIG_VERSION: u8 = 1;
const SECRETS: &str = ".secrets";
const CLIENT_SECRET_JSON: &str = "client_secret.json";
const TOKEN_JSON: &str = "token.json";
const CONFIG_JSON: &str = "config.json";
const DEFAULT_LISTEN: &str = "127.0.0.1:8501";
const DEFAULT_DASHBOARD_TTL_SECS: u64 = 60;

/// The loaded `$LEDGER_HOME/config.json` plus the paths derived from the ledger home.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    secrets: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
    spreadsheet_id: String,
}

impl Config {
    /// Sets up a new ledger home at `dir`: writes a default `config.json` pointing at
    /// `sheet_url` and moves the downloaded OAuth client file `secret_file` into `.secrets`.
    ///
    /// The URL is checked before anything touches the disk, so a bad URL leaves `secret_file`
    /// where it was.
    pub async fn create(
        dir: impl Into<PathBuf>,
        secret_file: &Path,
        sheet_url: &str,
    ) -> Result<Self> {
        spreadsheet_id_of(sheet_url)?;

        let dir = dir.into();
        utils::make_dir(dir.join(SECRETS))
            .await
            .context("Unable to create the ledger home")?;
        let root = utils::canonicalize(&dir).await?;

        let file = ConfigFile {
            sheet_url: sheet_url.to_string(),
            ..ConfigFile::default()
        };
        utils::rename(secret_file, root.join(file.client_secret_path())).await?;
        file.save(root.join(CONFIG_JSON)).await?;
        Self::from_parts(root, file)
    }

    /// Loads an existing ledger home. Fails if `init` has not been run there.
    pub async fn load(ledger_home: impl Into<PathBuf>) -> Result<Self> {
        let root = utils::canonicalize(ledger_home.into())
            .await
            .context("The ledger home does not exist. Run 'gagyebu init' first")?;
        let config_json = root.join(CONFIG_JSON);
        if !config_json.is_file() {
            bail!("{} not found. Run 'gagyebu init' first", config_json.display())
        }
        let file = ConfigFile::load(&config_json).await?;
        let config = Self::from_parts(root, file)?;
        if !config.secrets.is_dir() {
            bail!("{} not found. Run 'gagyebu init' first", config.secrets.display())
        }
        Ok(config)
    }

    fn from_parts(root: PathBuf, config_file: ConfigFile) -> Result<Self> {
        let spreadsheet_id = spreadsheet_id_of(&config_file.sheet_url)?.to_string();
        Ok(Self {
            secrets: root.join(SECRETS),
            config_path: root.join(CONFIG_JSON),
            root,
            config_file,
            spreadsheet_id,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn secrets(&self) -> &Path {
        &self.secrets
    }

    pub fn sheet_url(&self) -> &str {
        &self.config_file.sheet_url
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// The address the web server listens on.
    pub fn listen(&self) -> &str {
        self.config_file.listen.as_deref().unwrap_or(DEFAULT_LISTEN)
    }

    /// How long dashboard totals are served from the cache.
    pub fn dashboard_ttl(&self) -> Duration {
        Duration::from_secs(
            self.config_file
                .dashboard_ttl_secs
                .unwrap_or(DEFAULT_DASHBOARD_TTL_SECS),
        )
    }

    /// Relative paths in `config.json` are taken from the ledger home.
    pub fn client_secret_path(&self) -> PathBuf {
        self.resolve(self.config_file.client_secret_path())
    }

    pub fn token_path(&self) -> PathBuf {
        self.resolve(self.config_file.token_path())
    }

    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// On-disk form of `config.json`:
/// ```json
/// {
///   "app_name": "gagyebu",
///   "config_version": 1,
///   "sheet_url": "https://docs.google.com/spreadsheets/d/1qH8vZ3nLw0Rk5TyD2mXeB7uJ4cFsG9aPiN6oKtWdYrE",
///   "listen": "127.0.0.1:8501",
///   "dashboard_ttl_secs": 60,
///   "client_secret_path": ".secrets/client_secret.json",
///   "token_path": ".secrets/token.json"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Always "gagyebu"
    app_name: String,

    config_version: u8,

    sheet_url: String,

    /// Address for `gagyebu serve`, defaults to 127.0.0.1:8501
    #[serde(default, skip_serializing_if = "Option::is_none")]
    listen: Option<String>,

    /// Seconds the dashboard totals are cached, defaults to 60
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dashboard_ttl_secs: Option<u64>,

    /// Defaults to .secrets/client_secret.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_secret_path: Option<PathBuf>,

    /// Defaults to .secrets/token.json
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_path: Option<PathBuf>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            sheet_url: String::new(),
            listen: None,
            dashboard_ttl_secs: None,
            client_secret_path: None,
            token_path: None,
        }
    }
}

impl ConfigFile {
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)
            .await
            .with_context(|| format!("Failed to load config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name '{}' in config.json, expected '{}'",
            config.app_name,
            APP_NAME
        );

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(path, data)
            .await
            .context("Unable to save config.json")
    }

    fn client_secret_path(&self) -> PathBuf {
        self.client_secret_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(CLIENT_SECRET_JSON))
    }

    fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(SECRETS).join(TOKEN_JSON))
    }
}

/// The path segment after `/d/` in `https://docs.google.com/spreadsheets/d/<id>/edit`.
fn spreadsheet_id_of(url: &str) -> Result<&str> {
    let mut parts = url.split('/');
    while let Some(part) = parts.next() {
        if part == "d" {
            let id = parts
                .next()
                .and_then(|p| p.split(['?', '#']).next())
                .unwrap_or_default();
            if id.is_empty() {
                break;
            }
            return Ok(id);
        }
    }
    bail!(
        "Invalid Google Sheets URL format '{url}'. Expected: \
        https://docs.google.com/spreadsheets/d/SPREADSHEET_ID"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const URL: &str =
        "https://docs.google.com/spreadsheets/d/1qH8vZ3nLw0Rk5TyD2mXeB7uJ4cFsG9aPiN6oKtWdYrE/edit";

    #[tokio::test]
    async fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("ledger_home");
        let secret_source_file = dir.path().join("x.txt");
        let secret_content = "12345";
        utils::write(&secret_source_file, secret_content)
            .await
            .unwrap();

        let config = Config::create(&home_dir, &secret_source_file, URL)
            .await
            .unwrap();

        assert_eq!(URL, config.sheet_url());
        assert_eq!(
            "1qH8vZ3nLw0Rk5TyD2mXeB7uJ4cFsG9aPiN6oKtWdYrE",
            config.spreadsheet_id()
        );
        assert_eq!(config.listen(), DEFAULT_LISTEN);
        assert_eq!(config.dashboard_ttl(), Duration::from_secs(60));

        let found_secret_content = utils::read(&config.client_secret_path()).await.unwrap();
        assert_eq!(secret_content, found_secret_content);
        assert!(!secret_source_file.exists());
        assert!(config.secrets().is_dir());
        assert_eq!(config.token_path(), config.secrets().join(TOKEN_JSON));

        let loaded = Config::load(&home_dir).await.unwrap();
        assert_eq!(loaded.spreadsheet_id(), config.spreadsheet_id());
        assert_eq!(loaded.config_path(), config.config_path());
    }

    #[tokio::test]
    async fn test_config_create_bad_url_leaves_secret() {
        let dir = TempDir::new().unwrap();
        let secret_file = dir.path().join("secret.json");
        utils::write(&secret_file, "{}").await.unwrap();
        let result = Config::create(dir.path().join("home"), &secret_file, "https://x.com").await;
        assert!(result.is_err());
        assert!(secret_file.exists());
    }

    #[tokio::test]
    async fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).await.is_err());
    }

    #[tokio::test]
    async fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");

        let original = ConfigFile {
            sheet_url: "https://docs.google.com/spreadsheets/d/test123".to_string(),
            listen: Some("0.0.0.0:9000".to_string()),
            dashboard_ttl_secs: Some(5),
            client_secret_path: Some(PathBuf::from(".secrets/my_key.json")),
            token_path: Some(PathBuf::from("/abs/my_token.json")),
            ..ConfigFile::default()
        };
        original.save(&config_path).await.unwrap();
        let loaded = ConfigFile::load(&config_path).await.unwrap();
        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_config_custom_paths() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("home");
        utils::make_dir(root.join(SECRETS)).await.unwrap();
        let json = r#"{
            "app_name": "gagyebu",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/minimal",
            "dashboard_ttl_secs": 0,
            "client_secret_path": "keys/secret.json",
            "token_path": "/abs/token.json"
        }"#;
        utils::write(root.join(CONFIG_JSON), json).await.unwrap();

        let config = Config::load(&root).await.unwrap();
        assert_eq!(config.spreadsheet_id(), "minimal");
        assert_eq!(config.dashboard_ttl(), Duration::ZERO);
        assert_eq!(
            config.client_secret_path(),
            config.root().join("keys/secret.json")
        );
        assert_eq!(config.token_path(), PathBuf::from("/abs/token.json"));
    }

    #[tokio::test]
    async fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1,
            "sheet_url": "https://docs.google.com/spreadsheets/d/test"
        }"#;
        utils::write(&config_path, json).await.unwrap();

        let result = ConfigFile::load(&config_path).await;
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_serialization_omits_none_fields() {
        let json = serde_json::to_string(&ConfigFile::default()).unwrap();
        assert!(!json.contains("client_secret_path"));
        assert!(!json.contains("token_path"));
        assert!(!json.contains("listen"));
    }

    #[test]
    fn test_spreadsheet_id_of() {
        assert_eq!(
            spreadsheet_id_of(URL).unwrap(),
            "1qH8vZ3nLw0Rk5TyD2mXeB7uJ4cFsG9aPiN6oKtWdYrE"
        );
        assert_eq!(
            spreadsheet_id_of("https://docs.google.com/spreadsheets/d/ABC123?foo=bar")
                .unwrap(),
            "ABC123"
        );
        assert_eq!(
            spreadsheet_id_of("https://docs.google.com/spreadsheets/d/ABC123#gid=0").unwrap(),
            "ABC123"
        );
        assert!(spreadsheet_id_of("https://example.com/invalid").is_err());
        assert!(spreadsheet_id_of("https://docs.google.com/spreadsheets/d/").is_err());
        assert!(spreadsheet_id_of("").is_err());
    }
}

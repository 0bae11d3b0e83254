//! Access to the Google spreadsheet that holds the ledger.
//!
//! Everything that talks to the spreadsheet goes through the `Sheet` trait so that the rest of the
//! app can be run, top-to-bottom, against the in-memory `TestSheet` instead.

mod files;
mod oauth;
mod sheet;
mod test_sheet;

use crate::model::Column;
use crate::{Config, Result};
use serde::{Deserialize, Serialize};
use sheet::GoogleSheet;
use tracing::debug;

pub(crate) use oauth::TokenProvider;
pub(crate) use test_sheet::TestSheet;
#[cfg(test)]
pub(crate) use test_sheet::{Call, TestSheetState};

/// OAuth scopes required for reading and writing the ledger spreadsheet.
pub(crate) const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// When this environment variable is set and non-empty the app uses `TestSheet`.
const TEST_MODE_ENV: &str = "GAGYEBU_IN_TEST_MODE";

/// Selects which `Sheet` implementation backs the app.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Talk to the real Google spreadsheet.
    #[default]
    Google,
    /// Use the in-memory, seeded `TestSheet`.
    Testing,
}

serde_plain::derive_display_from_serialize!(Mode);
serde_plain::derive_fromstr_from_deserialize!(Mode);

impl Mode {
    /// Returns `Mode::Testing` when `GAGYEBU_IN_TEST_MODE` is set to a non-empty value.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Google,
        }
    }
}

/// One A1 range and the rows of values to write into it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub(crate) struct SheetRange {
    pub(crate) range: String,
    pub(crate) values: Vec<Vec<String>>,
}

impl SheetRange {
    /// A range holding a single cell value.
    pub(crate) fn single(range: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            values: vec![vec![value.into()]],
        }
    }
}

/// The operations the ledger needs from a spreadsheet.
#[async_trait::async_trait]
pub(crate) trait Sheet: Send {
    /// Returns every populated row of `tab` as formatted text. Rows may be shorter than their
    /// neighbours when their trailing cells are empty.
    async fn get(&mut self, tab: &str) -> Result<Vec<Vec<String>>>;

    /// Returns one column of `tab`, top to bottom, up to its last populated cell. Empty cells in
    /// between are returned as empty strings.
    async fn column(&mut self, tab: &str, column: Column) -> Result<Vec<String>>;

    /// Returns the titles of all tabs in the spreadsheet.
    async fn tab_names(&mut self) -> Result<Vec<String>>;

    /// Writes all of `data` in one batch update, interpreting values as if a user typed them.
    async fn write_ranges(&mut self, data: &[SheetRange]) -> Result<()>;
}

/// Creates the `Sheet` implementation selected by `mode`.
pub(crate) async fn sheet(config: &Config, mode: Mode) -> Result<Box<dyn Sheet>> {
    debug!("Using {mode} mode for spreadsheet access");
    match mode {
        Mode::Google => {
            let token_provider =
                TokenProvider::load(config.client_secret_path(), config.token_path()).await?;
            Ok(Box::new(
                GoogleSheet::new(config.clone(), token_provider).await?,
            ))
        }
        Mode::Testing => Ok(Box::new(TestSheet::new(config.spreadsheet_id()))),
    }
}

//! A throwaway ledger home for tests, backed by its own `TestSheet`.

use crate::api::{Mode, TestSheet, TestSheetState};
use crate::ledger::Ledger;
use crate::Config;
use serde_json::json;
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

/// A ledger home in a temp directory. The directory lives as long as the `TestEnv`.
pub(crate) struct TestEnv {
    _dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Runs `init` against a fresh spreadsheet id, which gives the environment a seeded
    /// `TestSheet` that no other test shares.
    pub(crate) async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let download = dir.path().join("client_secret.json");
        let client = json!({
            "installed": {
                "client_id": "test-client-id",
                "client_secret": "test-secret",
                "redirect_uris": ["http://localhost"],
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        });
        std::fs::write(&download, client.to_string()).unwrap();

        let spreadsheet_id = Uuid::new_v4().simple().to_string();
        let sheet_url = format!("https://docs.google.com/spreadsheets/d/{spreadsheet_id}/edit");
        let config = Config::create(dir.path().join("gagyebu"), &download, &sheet_url)
            .await
            .unwrap();

        Self { _dir: dir, config }
    }

    pub(crate) fn config(&self) -> Config {
        self.config.clone()
    }

    /// Opened the way `serve` opens it.
    pub(crate) async fn ledger(&self) -> Ledger {
        Ledger::open(&self.config, Mode::Testing).await.unwrap()
    }

    pub(crate) fn ledger_with_ttl(&self, ttl: Duration) -> Ledger {
        Ledger::new(Box::new(self.test_sheet()), ttl)
    }

    /// A snapshot of the sheet, including the writes made so far.
    pub(crate) fn get_state(&self) -> TestSheetState {
        self.test_sheet().get_state()
    }

    pub(crate) fn set_state(&self, state: TestSheetState) {
        self.test_sheet().set_state(state)
    }

    fn test_sheet(&self) -> TestSheet {
        TestSheet::new(self.config.spreadsheet_id())
    }
}

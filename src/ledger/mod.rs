//! The two operations that touch the spreadsheet: reading the monthly dashboard and recording an
//! entry.

mod dashboard;
mod submit;

use crate::api::{self, Mode, Sheet};
use crate::{Config, Result};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

pub use dashboard::{summarize, Dashboard, DashboardStatus, Totals};
pub use submit::Submitted;

use dashboard::DashboardCache;

/// The household ledger: the spreadsheet plus the dashboard cache in front of it.
///
/// The spreadsheet handle sits behind an async mutex. A submission holds it from reading the
/// anchor column until the row is written, so two submissions from the same process never pick
/// the same row.
pub struct Ledger {
    sheet: tokio::sync::Mutex<Box<dyn Sheet>>,
    cache: Mutex<DashboardCache>,
}

impl Ledger {
    pub(crate) fn new(sheet: Box<dyn Sheet>, dashboard_ttl: Duration) -> Self {
        Self {
            sheet: tokio::sync::Mutex::new(sheet),
            cache: Mutex::new(DashboardCache::new(dashboard_ttl)),
        }
    }

    /// Opens the spreadsheet named by `config` using the `Sheet` implementation chosen by `mode`.
    pub async fn open(config: &Config, mode: Mode) -> Result<Self> {
        let sheet = api::sheet(config, mode).await?;
        Ok(Self::new(sheet, config.dashboard_ttl()))
    }

    /// Drops every cached dashboard so the next read goes to the spreadsheet.
    pub fn invalidate(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, DashboardCache> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

//! Monthly totals read back from a month tab.

use crate::ledger::Ledger;
use crate::model::cell::{self, AMOUNT_COLUMN, HEADER_ROWS, MAJOR_COLUMN};
use crate::model::{Major, Won};
use serde::Serialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The whole-won totals of one month, by major category.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Totals {
    pub income: i64,
    pub expense: i64,
    pub saving: i64,
    pub invest: i64,
}

impl Totals {
    pub fn get(&self, major: Major) -> i64 {
        match major {
            Major::Income => self.income,
            Major::Expense => self.expense,
            Major::Saving => self.saving,
            Major::Investment => self.invest,
        }
    }
}

/// How the totals of a `Dashboard` came about.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DashboardStatus {
    /// The ledger rows of the tab were summed.
    Loaded,
    /// The tab has nothing below its header block.
    NoData,
    /// The spreadsheet could not be read. The totals are all zero.
    FetchFailed(String),
}

/// The totals shown at the top of the page.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Dashboard {
    /// The month tab, e.g. `3월`.
    pub month: String,
    pub totals: Totals,
    #[serde(flatten)]
    pub status: DashboardStatus,
}

impl Dashboard {
    fn failed(month: &str, detail: String) -> Self {
        Self {
            month: month.to_string(),
            totals: Totals::default(),
            status: DashboardStatus::FetchFailed(detail),
        }
    }
}

/// Sums the amount column of `rows` by the major column.
///
/// The first `HEADER_ROWS` rows are the header block and are skipped. Amounts that do not parse
/// count as zero, rows with an unrecognized major are ignored, and cells missing from the end of a
/// short row are treated as empty. Each total is summed exactly and then truncated to whole won.
pub fn summarize(month: &str, rows: &[Vec<String>]) -> Dashboard {
    if rows.len() <= HEADER_ROWS {
        return Dashboard {
            month: month.to_string(),
            totals: Totals::default(),
            status: DashboardStatus::NoData,
        };
    }

    let mut sums: HashMap<Major, Won> = HashMap::new();
    for row in &rows[HEADER_ROWS..] {
        let value_at = |index: usize| row.get(index).map(String::as_str).unwrap_or_default();
        let Some(major) = Major::from_label(value_at(MAJOR_COLUMN.index()).trim()) else {
            continue;
        };
        *sums.entry(major).or_default() += Won::from_cell(value_at(AMOUNT_COLUMN.index()));
    }

    let total = |major: Major| sums.get(&major).map(Won::whole).unwrap_or_default();
    Dashboard {
        month: month.to_string(),
        totals: Totals {
            income: total(Major::Income),
            expense: total(Major::Expense),
            saving: total(Major::Saving),
            invest: total(Major::Investment),
        },
        status: DashboardStatus::Loaded,
    }
}

/// Dashboards by month tab, each kept for `ttl` after it was read. Failed reads are not kept.
#[derive(Debug)]
pub(super) struct DashboardCache {
    ttl: Duration,
    entries: HashMap<String, (Instant, Dashboard)>,
}

impl DashboardCache {
    pub(super) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    fn get(&self, month: &str) -> Option<Dashboard> {
        self.entries
            .get(month)
            .filter(|(read_at, _)| read_at.elapsed() < self.ttl)
            .map(|(_, dashboard)| dashboard.clone())
    }

    fn put(&mut self, dashboard: Dashboard) {
        if matches!(dashboard.status, DashboardStatus::FetchFailed(_)) {
            return;
        }
        self.entries
            .insert(dashboard.month.clone(), (Instant::now(), dashboard));
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Ledger {
    /// The totals of month `month` (1 to 12).
    ///
    /// This never fails: if the spreadsheet cannot be read the totals are zero and the status is
    /// `FetchFailed`.
    pub async fn dashboard(&self, month: u32) -> Dashboard {
        let tab = cell::month_label(month);
        if let Some(cached) = self.cache().get(&tab) {
            debug!("Using cached dashboard for {tab}");
            return cached;
        }

        // The cache is filled under the sheet lock so a submission cannot clear it in between.
        let mut sheet = self.sheet.lock().await;
        let dashboard = match sheet.get(&tab).await {
            Ok(rows) => summarize(&tab, &rows),
            Err(e) => {
                warn!("Unable to read the {tab} tab for the dashboard: {e:#}");
                Dashboard::failed(&tab, format!("{e:#}"))
            }
        };
        self.cache().put(dashboard.clone());
        drop(sheet);
        dashboard
    }
}

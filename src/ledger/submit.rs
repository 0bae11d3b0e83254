//! Recording a validated entry as a new row of its month tab.

use crate::api::SheetRange;
use crate::error::SubmissionError;
use crate::ledger::Ledger;
use crate::model::cell::{ANCHOR_COLUMN, FIRST_DATA_ROW};
use crate::model::{Cell, Draft};
use serde::Serialize;
use tracing::{debug, info};

/// Where an entry was written.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Submitted {
    /// The month tab, e.g. `3월`.
    pub month: String,
    /// The 1-indexed row.
    pub row: u32,
}

/// The row after the `populated` rows of the anchor column, but never above `FIRST_DATA_ROW`.
fn next_row(populated: usize) -> u32 {
    let after = u32::try_from(populated)
        .unwrap_or(u32::MAX)
        .saturating_add(1);
    after.max(FIRST_DATA_ROW)
}

impl Ledger {
    /// Validates `draft` and appends it to its month tab.
    ///
    /// Nothing is sent to the spreadsheet unless the draft is complete. The six cells of the row
    /// are written in a single batch update, after which the dashboard cache is dropped.
    pub async fn submit(&self, draft: &Draft) -> Result<Submitted, SubmissionError> {
        let entry = draft.validate()?;
        let tab = entry.month_tab();

        let mut sheet = self.sheet.lock().await;
        let tabs = sheet
            .tab_names()
            .await
            .map_err(SubmissionError::RemoteStoreFailure)?;
        if !tabs.contains(&tab) {
            return Err(SubmissionError::TargetTableNotFound(tab));
        }

        let anchor = sheet
            .column(&tab, ANCHOR_COLUMN)
            .await
            .map_err(SubmissionError::RemoteStoreFailure)?;
        let row = next_row(anchor.len());
        debug!(
            "{tab} has {} rows in column {ANCHOR_COLUMN}, writing row {row}",
            anchor.len()
        );

        let data: Vec<SheetRange> = entry
            .cells()
            .into_iter()
            .map(|(column, value)| SheetRange::single(Cell::new(column, row).on(&tab), value))
            .collect();
        sheet
            .write_ranges(&data)
            .await
            .map_err(SubmissionError::RemoteStoreFailure)?;
        self.invalidate();
        drop(sheet);

        info!(
            "Recorded {} {} ({} > {} > {}) in {tab} row {row}",
            entry.major, entry.amount, entry.middle, entry.sub, entry.detail
        );
        Ok(Submitted { month: tab, row })
    }
}

use crate::commands::Out;
use crate::ledger::{Dashboard, DashboardStatus, Ledger};
use crate::model::thousands;
use crate::{Config, Mode, Result};
use chrono::{Datelike, Local};

/// Reads the totals of `month`, or of the current month if `None`.
///
/// A tab that cannot be read is not an error here: the totals are zero and the message says why.
pub async fn dashboard(config: &Config, mode: Mode, month: Option<u32>) -> Result<Out<Dashboard>> {
    let month = month.unwrap_or_else(|| Local::now().month());
    let ledger = Ledger::open(config, mode).await?;
    let dashboard = ledger.dashboard(month).await;
    Ok(Out::new(message(&dashboard), dashboard))
}

fn message(dashboard: &Dashboard) -> String {
    let totals = &dashboard.totals;
    let summary = format!(
        "{}: 수입 +{} / 지출 -{} / 저축 {} / 투자 {}",
        dashboard.month,
        thousands(totals.income),
        thousands(totals.expense),
        thousands(totals.saving),
        thousands(totals.invest),
    );
    match &dashboard.status {
        DashboardStatus::Loaded => summary,
        DashboardStatus::NoData => format!("{summary} (no entries yet)"),
        DashboardStatus::FetchFailed(detail) => {
            format!("{summary} (unable to read the sheet: {detail})")
        }
    }
}

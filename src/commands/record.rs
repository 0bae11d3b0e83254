use crate::args::RecordArgs;
use crate::commands::Out;
use crate::ledger::{Ledger, Submitted};
use crate::model::{taxonomy, Draft};
use crate::{Config, Mode, Result};
use anyhow::bail;
use tracing::warn;

/// Records one entry through the same validation and submission steps as the web form.
///
/// # Errors
/// Returns an error with the message the form would show if the entry is incomplete, the
/// categories do not form a path, the month has no tab, or the sheet cannot be written.
pub async fn record(config: &Config, mode: Mode, args: &RecordArgs) -> Result<Out<Submitted>> {
    let mut draft = match args.date() {
        Some(date) => Draft::new(date),
        None => Draft::today(),
    };
    if !taxonomy::is_payment_method(args.payment()) {
        warn!("'{}' is not one of the form's payment methods", args.payment());
    }
    draft.amount = Some(args.amount());
    draft.payment = Some(args.payment().to_string());
    draft.description = args.description().trim().to_string();
    if let Err(e) = draft.select_categories(args.categories().map(Some)) {
        bail!("{}", e.user_message());
    }

    let ledger = Ledger::open(config, mode).await?;
    match ledger.submit(&draft).await {
        Ok(submitted) => Ok(Out::new(
            format!("{} 시트 {}행에 저장되었습니다.", submitted.month, submitted.row),
            submitted,
        )),
        Err(e) => bail!("{}", e.user_message()),
    }
}

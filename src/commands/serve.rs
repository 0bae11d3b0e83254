use crate::commands::Out;
use crate::ledger::Ledger;
use crate::{web, Config, Mode, Result};

/// Runs the web form until interrupted. `listen` overrides the address in `config.json`.
pub async fn serve(config: &Config, mode: Mode, listen: Option<&str>) -> Result<Out<()>> {
    let ledger = Ledger::open(config, mode).await?;
    let listen = listen.unwrap_or(config.listen());
    web::serve(ledger, listen).await?;
    Ok("The web server has stopped".into())
}

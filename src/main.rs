use clap::Parser;
use gagyebu::args::{Args, Command};
use gagyebu::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logger(args.common().log_level());
    debug!("Log level set to {}", args.common().log_level());

    if let Err(e) = run(args).await {
        error!("Exiting with error: {e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().ledger_home().path();

    // GAGYEBU_IN_TEST_MODE swaps Google for an in-memory sheet.
    let mode = Mode::from_env();
    let config = || Config::load(home);

    match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.client_secret(), init_args.sheet_url())
                .await?
                .print()
        }
        Command::Auth(auth_args) if auth_args.verify() => {
            commands::auth_verify(&config().await?).await?.print()
        }
        Command::Auth(_) => commands::auth(&config().await?).await?.print(),
        Command::Serve(serve_args) => {
            commands::serve(&config().await?, mode, serve_args.listen())
                .await?
                .print()
        }
        Command::Dashboard(dashboard_args) => {
            commands::dashboard(&config().await?, mode, dashboard_args.month())
                .await?
                .print()
        }
        Command::Record(record_args) => commands::record(&config().await?, mode, record_args)
            .await?
            .print(),
    }
    Ok(())
}

/// Logs to stderr. RUST_LOG wins over `level` when set; otherwise only this crate logs.
fn init_logger(level: LevelFilter) {
    let filter = if std::env::var_os("RUST_LOG").is_some() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!("{}={level}", env!("CARGO_CRATE_NAME")))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

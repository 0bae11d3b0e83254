//! These structs provide the CLI interface for the gagyebu CLI.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// gagyebu: a household ledger that writes to a Google sheet.
///
/// Each entry is recorded as a row of the month's tab ("1월" through "12월") of your ledger
/// spreadsheet. The `serve` command runs a small web form for entering records and shows the
/// month's income, expense, saving and investment totals.
///
/// You will need to set up a Google OAuth client for this. Run `gagyebu init` and then
/// `gagyebu auth` before anything else.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration files.
    ///
    /// This is the first command you should run. You need two things ready beforehand:
    ///
    /// - The URL of your ledger Google Sheet, passed as --sheet-url.
    ///
    /// - The OAuth client credentials downloaded from the Google Cloud console (a "Desktop app"
    ///   client), passed as --client-secret. The file is moved into the data directory.
    Init(InitArgs),
    /// Authenticate with Google Sheets via OAuth.
    Auth(AuthArgs),
    /// Run the web form.
    Serve(ServeArgs),
    /// Print the income, expense, saving and investment totals of a month.
    Dashboard(DashboardArgs),
    /// Record one entry in the month tab of its date.
    Record(RecordArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where the configuration and OAuth secrets are held. Defaults to ~/gagyebu
    #[arg(long, env = "LEDGER_HOME", default_value_t = default_ledger_home())]
    ledger_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, ledger_home: PathBuf) -> Self {
        Self {
            log_level,
            ledger_home: ledger_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn ledger_home(&self) -> &DisplayPath {
        &self.ledger_home
    }
}

/// (Not shown): Args for the `gagyebu init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of your ledger Google sheet. It looks like this:
    /// https://docs.google.com/spreadsheets/d/1a7Km9FxQwRbPt82JvN4LzYpH5OcGnWsT6iDuE3VhMjX/edit
    #[arg(long)]
    sheet_url: String,

    /// The path to your downloaded OAuth client credentials. This file will be moved to the
    /// secrets directory inside the data directory.
    #[arg(long)]
    client_secret: PathBuf,
}

impl InitArgs {
    pub fn new(sheet_url: impl Into<String>, client_secret: impl Into<PathBuf>) -> Self {
        Self {
            sheet_url: sheet_url.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn sheet_url(&self) -> &str {
        &self.sheet_url
    }

    pub fn client_secret(&self) -> &Path {
        &self.client_secret
    }
}

/// (Not shown): Args for the `gagyebu auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    /// Verify and refresh authentication.
    #[arg(long)]
    verify: bool,
}

impl AuthArgs {
    pub fn new(verify: bool) -> Self {
        Self { verify }
    }

    pub fn verify(&self) -> bool {
        self.verify
    }
}

/// (Not shown): Args for the `gagyebu serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// The address to listen on, e.g. 127.0.0.1:8501. Defaults to `listen` in config.json.
    #[arg(long)]
    listen: Option<String>,
}

impl ServeArgs {
    pub fn new(listen: Option<String>) -> Self {
        Self { listen }
    }

    pub fn listen(&self) -> Option<&str> {
        self.listen.as_deref()
    }
}

/// (Not shown): Args for the `gagyebu dashboard` command.
#[derive(Debug, Parser, Clone)]
pub struct DashboardArgs {
    /// The month, 1 to 12. Defaults to the current month.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
    month: Option<u32>,
}

impl DashboardArgs {
    pub fn new(month: Option<u32>) -> Self {
        Self { month }
    }

    pub fn month(&self) -> Option<u32> {
        self.month
    }
}

/// (Not shown): Args for the `gagyebu record` command.
///
/// The categories are applied top down, the same way the web form applies them, so they must
/// form a path of the category tree, e.g. 지출 > 변동지출 > 식비 > 외식.
#[derive(Debug, Parser, Clone)]
pub struct RecordArgs {
    /// The amount in won.
    #[arg(long)]
    amount: u64,

    /// The payment method, e.g. 현금.
    #[arg(long)]
    payment: String,

    /// The major category: 수입, 지출, 저축 or 투자.
    #[arg(long)]
    major: String,

    /// The middle category.
    #[arg(long)]
    middle: String,

    /// The sub category.
    #[arg(long)]
    sub: String,

    /// The detail category.
    #[arg(long)]
    detail: String,

    /// The date of the entry, YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// A free-text note.
    #[arg(long, default_value = "")]
    description: String,
}

impl RecordArgs {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        amount: u64,
        payment: impl Into<String>,
        major: impl Into<String>,
        middle: impl Into<String>,
        sub: impl Into<String>,
        detail: impl Into<String>,
        date: Option<NaiveDate>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            payment: payment.into(),
            major: major.into(),
            middle: middle.into(),
            sub: sub.into(),
            detail: detail.into(),
            date,
            description: description.into(),
        }
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn payment(&self) -> &str {
        &self.payment
    }

    /// The four category labels, from the top.
    pub fn categories(&self) -> [&str; 4] {
        [&self.major, &self.middle, &self.sub, &self.detail]
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

fn default_ledger_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("gagyebu"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --ledger-home or LEDGER_HOME instead of relying on the default \
                directory. If you continue using the program right now, you may have problems!",
            );
            PathBuf::from("gagyebu")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

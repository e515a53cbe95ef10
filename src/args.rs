//! These structs provide the CLI interface for the expense CLI.

use crate::model::{TransactionType, TypeFilter};
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expense: A command-line tool for tracking personal income and expenses.
///
/// Transactions are kept in a local SQLite database. Deleted transactions go to a trash from
/// which they can be restored or purged. Monthly statistics are computed from the active
/// transactions, and the whole set of active transactions can be pushed to a REST collection
/// with the sync subcommand.
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
    /// Create the data directory, the configuration file and the database.
    ///
    /// This is the first command you should run. By default the data directory is
    /// $HOME/expense, pass --expense-home if you want it somewhere else.
    Init(InitArgs),
    /// Record a new transaction.
    Add(AddArgs),
    /// List active transactions, newest first.
    List(ListArgs),
    /// List the transactions in the trash.
    Trash,
    /// Show one transaction, whether it is active or in the trash.
    Show(IdArgs),
    /// Change the title and amount of a transaction.
    Edit(EditArgs),
    /// Move a transaction to the trash.
    Delete(IdArgs),
    /// Take a transaction out of the trash.
    Restore(IdArgs),
    /// Permanently remove a transaction.
    Purge(IdArgs),
    /// Show income and expense totals for each month.
    Stats(StatsArgs),
    /// Replace the contents of the remote collection with the active transactions.
    ///
    /// Every item of the remote collection is deleted, then each active transaction is posted.
    /// Trashed transactions are not sent.
    Sync(SyncArgs),
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

    /// The directory where expense data and configuration is held. Defaults to ~/expense
    #[arg(long, env = "EXPENSE_HOME", default_value_t = default_expense_home())]
    expense_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, expense_home: PathBuf) -> Self {
        Self {
            log_level,
            expense_home: expense_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expense_home(&self) -> &DisplayPath {
        &self.expense_home
    }
}

/// (Not shown): Args for the `expense init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of the REST collection that `expense sync` pushes to, for example
    /// https://example.mockapi.io/api/v1/transactions
    #[arg(long)]
    sync_url: Option<String>,
}

impl InitArgs {
    pub fn new(sync_url: Option<String>) -> Self {
        Self { sync_url }
    }

    pub fn sync_url(&self) -> Option<&str> {
        self.sync_url.as_deref()
    }
}

/// (Not shown): Args for the `expense add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// What the money was for, e.g. "Cà phê".
    title: String,

    /// A non-negative number. Thousands separators are allowed, e.g. 50,000
    amount: String,

    /// Thu (income) or Chi (expense).
    #[arg(long = "type", default_value_t = TransactionType::Expense)]
    kind: TransactionType,
}

impl AddArgs {
    pub fn new(
        title: impl Into<String>,
        amount: impl Into<String>,
        kind: TransactionType,
    ) -> Self {
        Self {
            title: title.into(),
            amount: amount.into(),
            kind,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }
}

/// (Not shown): Args for the `expense list` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct ListArgs {
    /// Only show transactions whose title or type contains this text, ignoring case (accented
    /// letters included). Spaces around the text are kept.
    #[arg(long)]
    search: Option<String>,

    /// all, Thu (income) or Chi (expense).
    #[arg(long = "type", default_value_t = TypeFilter::All)]
    kind: TypeFilter,
}

impl ListArgs {
    pub fn new(search: Option<String>, kind: TypeFilter) -> Self {
        Self { search, kind }
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn kind(&self) -> TypeFilter {
        self.kind
    }
}

/// (Not shown): Args for commands that act on a single transaction.
#[derive(Debug, Parser, Clone, Copy)]
pub struct IdArgs {
    /// The id of the transaction, as shown by `expense list`.
    id: i64,
}

impl IdArgs {
    pub fn new(id: i64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> i64 {
        self.id
    }
}

/// (Not shown): Args for the `expense edit` command.
#[derive(Debug, Parser, Clone)]
pub struct EditArgs {
    /// The id of the transaction, as shown by `expense list`.
    id: i64,

    /// The new title.
    title: String,

    /// The new amount.
    amount: String,
}

impl EditArgs {
    pub fn new(id: i64, title: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            amount: amount.into(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }
}

/// (Not shown): Args for the `expense stats` command.
#[derive(Debug, Default, Parser, Clone, Copy)]
pub struct StatsArgs {
    /// Only count transactions created in this year. By default every year is folded into the
    /// same twelve months.
    #[arg(long)]
    year: Option<i32>,
}

impl StatsArgs {
    pub fn new(year: Option<i32>) -> Self {
        Self { year }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

/// (Not shown): Args for the `expense sync` command.
#[derive(Debug, Default, Parser, Clone)]
pub struct SyncArgs {
    /// The URL of the REST collection. Defaults to the sync_url in config.json
    #[arg(long)]
    url: Option<String>,
}

impl SyncArgs {
    pub fn new(url: Option<String>) -> Self {
        Self { url }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }
}

fn default_expense_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expense"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expense-home or EXPENSE_HOME instead of relying on the \
                default expense home directory. If you continue using the program right now, you \
                may have problems!",
            );
            PathBuf::from("expense")
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
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["expense", "--expense-home", "/tmp/expense-test"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_add_defaults_to_expense() {
        let args = parse(&["add", "Cà phê", "50,000"]);
        let Command::Add(add) = args.command() else {
            panic!("expected add, got {:?}", args.command());
        };
        assert_eq!(add.title(), "Cà phê");
        assert_eq!(add.amount(), "50,000");
        assert_eq!(add.kind(), TransactionType::Expense);
    }

    #[test]
    fn test_add_income() {
        let args = parse(&["add", "Lương", "10000000", "--type", "thu"]);
        let Command::Add(add) = args.command() else {
            panic!("expected add");
        };
        assert_eq!(add.kind(), TransactionType::Income);
    }

    #[test]
    fn test_list_filters() {
        let args = parse(&["list", "--search", "cà", "--type", "Chi"]);
        let Command::List(list) = args.command() else {
            panic!("expected list");
        };
        assert_eq!(list.search(), Some("cà"));
        assert_eq!(list.kind(), TypeFilter::Expense);

        let args = parse(&["list"]);
        let Command::List(list) = args.command() else {
            panic!("expected list");
        };
        assert_eq!(list.search(), None);
        assert_eq!(list.kind(), TypeFilter::All);
    }

    #[test]
    fn test_bad_type_is_rejected() {
        let result = Args::try_parse_from(["expense", "add", "x", "1", "--type", "gift"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_edit_and_ids() {
        let args = parse(&["edit", "3", "Cà phê sáng", "60000"]);
        let Command::Edit(edit) = args.command() else {
            panic!("expected edit");
        };
        assert_eq!(edit.id(), 3);
        assert_eq!(edit.title(), "Cà phê sáng");

        let args = parse(&["purge", "9"]);
        assert!(matches!(args.command(), Command::Purge(id) if id.id() == 9));
    }

    #[test]
    fn test_common() {
        let args = parse(&["--log-level", "debug", "trash"]);
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert_eq!(
            args.common().expense_home().path(),
            Path::new("/tmp/expense-test")
        );
    }

    #[test]
    fn test_stats_and_sync() {
        let args = parse(&["stats", "--year", "2025"]);
        assert!(matches!(args.command(), Command::Stats(s) if s.year() == Some(2025)));

        let args = parse(&["sync", "--url", "http://localhost:3000/t"]);
        assert!(
            matches!(args.command(), Command::Sync(s) if s.url() == Some("http://localhost:3000/t"))
        );
    }
}

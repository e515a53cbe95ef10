use clap::Parser;
use expense_sync::args::{Args, Command};
use expense_sync::{commands, Config, Mode, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expense_home().path();

    // This allows for running sync without a REST endpoint. When EXPENSE_SYNC_IN_TEST_MODE is set
    // and non-zero in length, then the mode will be Mode::Testing, otherwise it will be Mode::Http.
    let mode = Mode::from_env();

    if let Command::Init(init_args) = args.command() {
        commands::init(home, init_args.sync_url()).await?.print();
        return Ok(());
    }

    let config = Config::load(home).await?;
    let result = run(&config, args.command(), mode).await;
    config.close().await;
    result
}

/// Routes every command except `init`, which runs before a `Config` exists.
async fn run(config: &Config, command: &Command, mode: Mode) -> Result<()> {
    let config = config.clone();
    let _: () = match command {
        Command::Init(_) => {}
        Command::Add(add_args) => commands::insert_transaction(config, add_args.clone())
            .await?
            .print(),
        Command::List(list_args) => commands::list_transactions(config, list_args.clone())
            .await?
            .print(),
        Command::Trash => commands::list_trash(config).await?.print(),
        Command::Show(id_args) => commands::show_transaction(config, *id_args).await?.print(),
        Command::Edit(edit_args) => commands::update_transaction(config, edit_args.clone())
            .await?
            .print(),
        Command::Delete(id_args) => commands::delete_transaction(config, *id_args)
            .await?
            .print(),
        Command::Restore(id_args) => commands::restore_transaction(config, *id_args)
            .await?
            .print(),
        Command::Purge(id_args) => commands::purge_transaction(config, *id_args)
            .await?
            .print(),
        Command::Stats(stats_args) => commands::statistics(config, *stats_args).await?.print(),
        Command::Sync(sync_args) => commands::sync(config, sync_args.url(), mode)
            .await?
            .print(),
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "expense_sync={},{}={}",
                level,
                env!("CARGO_CRATE_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

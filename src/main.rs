use clap::Parser;
use finance_sync::args::{
    AddSubcommand, Args, Command, DeleteSubcommand, EntityKind, UpdateSubcommand,
};
use finance_sync::{commands, Config, Mode, Result};
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
    let home = args.common().finsync_home().path();

    // This allows for running the program without a backend. When FINSYNC_IN_TEST_MODE is set
    // and non-zero in length, then the mode will be Mode::Test, otherwise it will be Mode::Http.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.base_url(), init_args.timeout_secs())
                .await?
                .print()
        }

        Command::List(list_args) => {
            let config = Config::load(home).await?;
            match list_args.entity() {
                EntityKind::Transactions => commands::list_transactions(&config, mode)
                    .await?
                    .print(),
                EntityKind::Budgets => commands::list_budgets(&config, mode).await?.print(),
            }
        }

        Command::Add(add) => {
            let config = Config::load(home).await?;
            match add {
                AddSubcommand::Transaction(args) => {
                    commands::add_transaction(&config, mode, args.draft())
                        .await?
                        .print()
                }
                AddSubcommand::Budget(args) => commands::add_budget(&config, mode, args.draft())
                    .await?
                    .print(),
            }
        }

        Command::Update(update) => {
            let config = Config::load(home).await?;
            match update {
                UpdateSubcommand::Transaction(args) => {
                    commands::update_transaction(&config, mode, args.id(), args.patch())
                        .await?
                        .print()
                }
                UpdateSubcommand::Budget(args) => {
                    commands::update_budget(&config, mode, args.id(), args.patch())
                        .await?
                        .print()
                }
            }
        }

        Command::Delete(delete) => {
            let config = Config::load(home).await?;
            match delete {
                DeleteSubcommand::Transaction(args) => {
                    commands::delete_transaction(&config, mode, args.id())
                        .await?
                        .print()
                }
                DeleteSubcommand::Budget(args) => commands::delete_budget(&config, mode, args.id())
                    .await?
                    .print(),
            }
        }
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
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

use clap::Parser;
use quillpress::cli::{self, Cli, Commands};
use quillpress::services::repair::RepairIncomplete;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit status when `repair-slugs` finishes with records it could not fix.
const EXIT_REPAIR_INCOMPLETE: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.downcast_ref::<RepairIncomplete>().is_some() => {
            tracing::warn!("{}", e);
            ExitCode::from(EXIT_REPAIR_INCOMPLETE)
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quillpress=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(args: Cli) -> anyhow::Result<()> {
    let config = args.config;
    match args.command {
        Some(Commands::Init { path, name }) => cli::init::run(path, name).await,
        Some(Commands::Serve { host, port }) => cli::serve::run(&config, host, port).await,
        Some(Commands::Migrate) => cli::migrate::run(&config).await,
        Some(Commands::Seed) => cli::seed::run(&config).await,
        Some(Commands::RepairSlugs) => cli::repair::run(&config).await,
        Some(Commands::User { command }) => cli::user::run(&config, command).await,
        Some(Commands::Post { command }) => cli::post::run(&config, command).await,
        Some(Commands::Comment { command }) => cli::comment::run(&config, command).await,
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

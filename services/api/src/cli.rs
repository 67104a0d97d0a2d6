use crate::report::{run_stay_report, StayReportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use facility_ledger::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Facility Ledger",
    about = "Serve and run resident stay-period and enrollment-day calculations",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with monthly stay periods offline
    Stays {
        #[command(subcommand)]
        command: StaysCommand,
    },
}

#[derive(Subcommand, Debug)]
enum StaysCommand {
    /// Compute a month from a facility snapshot and print the stay report
    Report(StayReportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Facility snapshot JSON files to load into the in-memory store
    #[arg(long)]
    pub(crate) seed: Vec<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Stays {
            command: StaysCommand::Report(args),
        } => run_stay_report(args),
    }
}

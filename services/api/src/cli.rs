use crate::commands::{run_availability, run_quote, AvailabilityArgs, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use stay_engine::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Stay Engine",
    about = "Resolve vacation-rental availability and quote stays from the command line",
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
    /// List bookable nights from a reservation export
    Availability(AvailabilityArgs),
    /// Price a stay from rate and fee exports
    Quote(QuoteArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Availability(args) => run_availability(args),
        Command::Quote(args) => run_quote(args),
    }
}

use crate::commands::{run_analyze, run_rank, run_validate, AnalyzeArgs, RankArgs, ValidateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rengas_guru::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "rengas-guru",
    about = "Score, rank and inspect tire catalogs from the command line or over HTTP",
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
    /// Rank a catalog export by preference-weighted attractiveness
    Rank(RankArgs),
    /// Summarise one numeric column of a catalog export
    Analyze(AnalyzeArgs),
    /// List catalog rows with missing or malformed fields
    Validate(ValidateArgs),
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
        Command::Rank(args) => run_rank(args),
        Command::Analyze(args) => run_analyze(args),
        Command::Validate(args) => run_validate(args),
    }
}

use crate::demo::{run_demo, run_simulation, DemoArgs, SimulateArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use funnel_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Funnel Lead Scoring",
    about = "Run and demonstrate the funnel lead scoring service from the command line",
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
    /// Score a synthetic lead against a rule set and show the breakdown
    Simulate(SimulateArgs),
    /// Run an end-to-end CLI demo covering batch scoring and a test email
    Demo(DemoArgs),
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
        Command::Simulate(args) => run_simulation(args),
        Command::Demo(args) => run_demo(args),
    }
}

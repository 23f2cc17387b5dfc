use clap::Parser;
use planner::cli::commands::Cli;
use planner::cli::handlers;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    planner::logging::init(cli.verbose);

    if let Err(e) = handlers::dispatch(cli).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

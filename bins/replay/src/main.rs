mod cmd;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "replay",
    about = "Stream recorded timeseries sensor files over TCP/UDP"
)]
struct Cli {
    #[command(subcommand)]
    command: cmd::Command,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = cmd::run(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

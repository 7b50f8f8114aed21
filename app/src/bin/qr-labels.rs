//! Command-line entry point.

use clap::Parser;

use qr_labels_lib::cli::{Cli, Command};
use qr_labels_lib::commands::{run_generate, run_inspect, run_preview, run_serve};
use qr_labels_lib::config::{AppConfig, load_dotenv};
use qr_labels_lib::logging::{LogConfig, init_logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let serving = matches!(cli.command, Command::Serve(_));
    init_logging(&LogConfig::from_verbosity(cli.verbose, cli.quiet).with_compact(!serving));

    load_dotenv();
    let config = AppConfig::load()?;

    match cli.command {
        Command::Generate(args) => run_generate(&args, &config),
        Command::Preview(args) => run_preview(&args, &config),
        Command::Inspect(args) => run_inspect(&args, &config),
        Command::Serve(args) => {
            tracing::info!("Starting QR label server");
            run_serve(&args, config).await
        }
    }
}

use clap::Parser;
use copybundle::cli::{run, Cli};

#[tokio::main]
async fn main() {
    // Initialize tracing for the CLI.
    tracing_subscriber::fmt::init();
    tracing::info!("CLI application startup: tracing initialised");

    let cli = Cli::parse();
    let code = match run(cli).await {
        Ok(code) => {
            tracing::info!(exit_code = code, "CLI completed");
            code
        }
        Err(e) => {
            tracing::error!(error = %e, "CLI exited with error");
            eprintln!("error: {e:#}");
            1
        }
    };
    std::process::exit(code);
}

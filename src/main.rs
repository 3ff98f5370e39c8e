// Ballpark - Application Entry Point
//
// Parses CLI arguments, initializes structured logging on stderr (stdout is
// reserved for command output), and dispatches to the command handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ballpark::cli::{execute, Cli};

#[tokio::main]
async fn main() {
    // RUST_LOG=ballpark=debug for verbose output. No level logs raw keys.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ballpark=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    match execute(cli.command).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

//! boundary - investigation workspace lifecycle CLI

use boundary_cli::cli::Cli;
use boundary_cli::domain::{ErrorKind, LifecycleError};
use boundary_cli::output::json::format_error;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted; stopping after the current step (Ctrl-C again to quit now)");
            on_interrupt.cancel();
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(130);
            }
        }
    });

    let json = cli.json;
    if let Err(e) = cli.run(cancel).await {
        let code = e
            .downcast_ref::<LifecycleError>()
            .map_or(ErrorKind::Fatal, LifecycleError::kind);
        match format_error(&format!("{e:#}"), code.as_str()) {
            Ok(obj) if json => println!("{obj}"),
            _ => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,boundary_cli=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

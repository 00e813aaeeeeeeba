//! Entry point for nc_inspector.
//! Parses the CLI, sets up diagnostics and runs the interactive session.

use clap::Parser;
use nc_inspector::cli::Args;
use nc_inspector::session::Session;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> ExitCode {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    println!("NetCDF Variable Inspector");
    println!("{}", "=".repeat(80));

    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout());
    match session.run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\n❌ Error: {}", e);
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

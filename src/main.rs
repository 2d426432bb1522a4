use std::process::ExitCode;

use clap::Parser;
use jck_extract::cli::{AppContext, Cli, Commands, USAGE};
use jck_extract::core::RequestError;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        dry_run: cli.dry_run,
    };

    let result = match cli.command {
        Commands::Extract(args) => jck_extract::extract_run(args, &ctx),
        Commands::Init(args) => jck_extract::infra::config::init(args, &ctx),
        Commands::Completions(args) => jck_extract::completion::run(args, &ctx),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast::<RequestError>() {
                Ok(invalid) => {
                    eprintln!("{:?}", miette::Report::new(invalid));
                    eprint!("{USAGE}");
                }
                Err(err) => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// RUST_LOG wins; otherwise warnings everywhere and `-v` levels for this crate.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,jck_extract={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

mod fetch;
mod reactor;
mod resolve;
mod translate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "tycho-resolve")]
#[command(about = "Translate and resolve p2 metadata")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short = 'q', long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a reactor project for every configured environment
    Resolve(resolve::ResolveArgs),

    /// Translate a manifest, feature or product into installable units
    Translate(translate::TranslateArgs),

    /// Copy an artifact out of a local artifact repository
    Fetch(fetch::FetchArgs),
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Warn,
        (false, 1) => LevelFilter::Info,
        (false, 2) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };

    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn run() -> Result<i32> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    match args.command {
        Commands::Resolve(args) => resolve::execute(args),
        Commands::Translate(args) => translate::execute(args),
        Commands::Fetch(args) => fetch::execute(args),
    }
}

/// Process status for a command's return code; anything outside 0..=255 is a failure
fn exit_status(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => ExitCode::from(exit_status(code)),
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}

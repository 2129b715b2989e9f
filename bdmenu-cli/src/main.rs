//! bdmenu CLI - dump Blu-ray interactive menus as JSON.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bdmenu")]
#[command(version)]
#[command(about = "Extract Blu-ray HDMV interactive menus")]
struct Args {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    /// Write JSON to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract the menu from a single .m2ts clip
    Menu {
        /// Path to the menu clip
        clip: PathBuf,
    },
    /// Scan a mounted disc into a playlist tree with menus
    Disc {
        /// Disc root directory (the one containing BDMV/)
        root: PathBuf,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { "info" })
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let json = match &args.command {
        Command::Menu { clip } => {
            let igs = bdmenu::extract_menu(clip)?;
            to_json(&igs, args.pretty)?
        }
        Command::Disc { root } => {
            let tree = bdmenu::open_disc(root)?;
            to_json(&tree, args.pretty)?
        }
    };

    match &args.output {
        Some(path) => fs::write(path, json)?,
        None => println!("{}", json),
    }
    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{classes, encode, ClassesArgs, EncodeArgs};

/// psikit - markup text encoding and Python class inspection
#[derive(Parser, Debug)]
#[command(name = "psikit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Encode text as markup-safe nodes
    Encode(EncodeArgs),

    /// Inspect the classes of a Python file or directory
    Classes(ClassesArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.display().to_string(),
        Err(err) => {
            eprintln!("{} Cannot get current directory: {}", "Error:".red().bold(), err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Command::Encode(args) => encode(args, &cwd),
        Command::Classes(args) => classes(args, &cwd),
    };

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}

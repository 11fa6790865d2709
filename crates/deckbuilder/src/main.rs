mod cli;
mod commands;

use clap::Parser;
use colored::Colorize;
use log::LevelFilter;

fn main() {
    let cli = cli::Cli::parse();

    init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = cli.run() {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

/// `-q` wins over `-v`; `RUST_LOG` overrides both.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

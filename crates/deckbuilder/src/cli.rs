use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deckbuilder")]
#[command(author, version, about)]
#[command(long_about = "A template-driven slide deck builder.\n\n\
    Assemble decks from a fixed catalog of layouts, fill them with images\n\
    and text, and reorder, duplicate or delete slides.\n\n\
    Examples:\n  \
    deckbuilder templates                 List the slide templates\n  \
    deckbuilder ingest photos/*.png       Check a batch of images\n  \
    deckbuilder run deck.yaml             Build a deck from a script\n  \
    deckbuilder run deck.yaml --yaml      Print the resulting deck as YAML")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the slide template catalog
    Templates,

    /// Validate and ingest files into a fresh deck's libraries
    Ingest {
        /// Treat the files as knowledge (PDF or text) instead of images
        #[arg(long)]
        knowledge: bool,

        /// Files to ingest
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Apply a YAML script of deck operations to a fresh deck
    Run {
        /// Script file: a YAML list of steps
        script: PathBuf,

        /// Print the final deck as YAML instead of an outline
        #[arg(long)]
        yaml: bool,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. assets.image_max_mb, defaults.initial_template)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Some(Commands::Templates) => {
                crate::commands::templates::run();
                Ok(())
            }
            Some(Commands::Ingest { knowledge, files }) => {
                crate::commands::ingest::run(&files, knowledge, self.quiet)
            }
            Some(Commands::Run { script, yaml }) => {
                if !script.exists() {
                    anyhow::bail!("File not found: {}", script.display());
                }
                crate::commands::run::run(&script, yaml, self.quiet)
            }
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                crate::commands::version::run();
                Ok(())
            }
            None => {
                use clap::CommandFactory;
                let mut cmd = Self::command();
                cmd.print_help()?;
                println!();
                Ok(())
            }
        }
    }
}

pub mod build;
pub mod completions;
pub mod inspect;
pub mod locate;

use clap::{Parser, Subcommand};

/// mosaic - Pack pixel-art world documents into a growable tile atlas
#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest an archive directory and write the atlas surfaces and index
    Build(build::BuildArgs),

    /// Parse one world document and summarise it
    Inspect(inspect::InspectArgs),

    /// Look up which document was placed at a grid coordinate
    Locate(locate::LocateArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

use clap::Parser;
use miette::Result;
use mosaic::cli::{Cli, Commands};
use mosaic::logging::init_logging;
use mosaic::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let printer = Printer::new();

    match cli.command {
        Commands::Build(args) => mosaic::cli::build::run(args, &printer)?,
        Commands::Inspect(args) => mosaic::cli::inspect::run(args, &printer)?,
        Commands::Locate(args) => mosaic::cli::locate::run(args)?,
        Commands::Completions(args) => mosaic::cli::completions::run(args)?,
    }

    Ok(())
}

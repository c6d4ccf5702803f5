use anyhow::Result;
use clap::Parser;

use scurry::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}

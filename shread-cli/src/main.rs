//! SHREAD CLI - build the meteorology plot and maintain its data cache.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "shread-cli",
    version,
    about = "SHREAD snow hydrology meteorology toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: shread_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    shread_cmd::run(cli.command)
}

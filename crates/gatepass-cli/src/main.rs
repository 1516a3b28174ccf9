use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = gatepass_cli::Cli::parse();
    gatepass_cli::run_cli(cli)
}

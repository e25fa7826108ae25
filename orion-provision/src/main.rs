mod api;
mod cli;
mod config;
mod excel;
mod services;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use cli::commands::provision::handle_provision_command;

fn init_logging(verbosity: u8) {
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let all_provisioned = handle_provision_command(cli.provision).await?;
    if !all_provisioned {
        std::process::exit(1);
    }

    Ok(())
}

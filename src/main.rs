use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use usagey_demo::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.get_command();

    // The server picks its log format from configuration, so it initializes
    // tracing itself once the config is loaded
    if !matches!(command, cli::Commands::Start) {
        init_tracing("text");
    }

    match command {
        cli::Commands::Start => {
            commands::start::execute(&args.config).await?;
        }
        cli::Commands::Test => {
            commands::test::execute(&args.config)?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
        },
        cli::Commands::Models => {
            commands::models::execute(&args.config)?;
        }
        cli::Commands::Calculate { model, usage } => {
            commands::calculate::execute(&args.config, &model, usage)?;
        }
        cli::Commands::Version => {
            println!("Usagey Demo v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

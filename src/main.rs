use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use salary_predictor::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    let command = args.get_command();

    // The start command initializes tracing itself, from the loaded config
    if !matches!(command, cli::Commands::Start) {
        init_tracing("info", "text");
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
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("Salary Predictor v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::Parser;

use marine_flow::cli::commands::{
    invoke::InvokeCommand, rules::RulesCommand, status::StatusCommand, Command, Target,
};
use marine_flow::cli::{Cli, Commands};
use marine_flow::config::MarineFlowConfig;
use marine_flow::dispatch::EntryPoint;
use marine_flow::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    MarineFlowConfig::load_env_file()?;
    let config = MarineFlowConfig::load()?;
    init_telemetry(&config.observability)?;

    let target = Target::resolve(&config, cli.instance, cli.data_dir)?;

    match cli.command {
        Commands::Init { state } => tokio::runtime::Runtime::new()?
            .block_on(async { InvokeCommand::init(target, state).execute().await }),
        Commands::Invoke { function, args } => tokio::runtime::Runtime::new()?.block_on(async {
            InvokeCommand::new(target, EntryPoint::Invoke, function, args)
                .execute()
                .await
        }),
        Commands::Query { function, args } => tokio::runtime::Runtime::new()?.block_on(async {
            InvokeCommand::new(target, EntryPoint::Query, function, args)
                .execute()
                .await
        }),
        Commands::Status => tokio::runtime::Runtime::new()?
            .block_on(async { StatusCommand::new(target).execute().await }),
        Commands::Rules { json, check, from } => tokio::runtime::Runtime::new()?
            .block_on(async { RulesCommand::new(json, check, from).execute().await }),
    }
}

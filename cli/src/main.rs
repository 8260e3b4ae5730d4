//! Liquid Labs CLI - Entry Point
//!
//! Provisions the on-prem stack (application server, model server and
//! postgres) through docker compose.

use clap::Parser;
use colored::Colorize;
use tracing::{error, info};

use liquidai_cli::cli::{Cli, Commands, ConfigCommands, ModelCommands};
use liquidai_cli::commands::launch::LaunchOptions;
use liquidai_cli::commands::model::{CheckpointOptions, HfModelOptions};
use liquidai_cli::commands::{config_cmd, down, launch, model, purge, smoke};
use liquidai_cli::config::store::ConfigStore;
use liquidai_cli::errors::CliError;
use liquidai_cli::logs::{init_logging, LogOptions};
use liquidai_cli::runtime::docker::DockerCli;
use liquidai_cli::storage::layout::ProjectLayout;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_options = LogOptions {
        log_level: cli.log_level,
        json_format: cli.log_json,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(cli).await {
        Ok(()) => {}
        Err(CliError::Cancelled) => {
            info!("Cancelled at the prompt");
            println!("{}", CliError::Cancelled);
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("{} {}", "error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let store = ConfigStore::new(ProjectLayout::new(&cli.dir));
    let docker = DockerCli::new(&cli.docker_bin, &cli.dir).with_compose_file(cli.compose_file);

    match cli.command {
        Commands::Launch {
            upgrade_stack,
            upgrade_model,
        } => {
            let options = LaunchOptions {
                upgrade_stack,
                upgrade_model,
            };
            launch::run(&store, &docker, options).await
        }
        Commands::Down => down::run(&store, &docker).await,
        Commands::Purge { force } => {
            let mut input = std::io::stdin().lock();
            purge::run(&store, &docker, force, &mut input).await
        }
        Commands::Config(action) => match action {
            ConfigCommands::Show => {
                print!("{}", config_cmd::show(&store).await?);
                Ok(())
            }
            ConfigCommands::Get { key } => {
                println!("{}", config_cmd::get(&store, &key).await?);
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                config_cmd::set(&store, &key, &value).await?;
                println!("{} updated in {}", key, store.layout().config_file().path().display());
                Ok(())
            }
            ConfigCommands::Env => {
                print!("{}", config_cmd::env(&store).await?.to_dotenv());
                Ok(())
            }
        },
        Commands::Model(action) => match action {
            ModelCommands::RunHf {
                name,
                path,
                port,
                gpu,
                gpu_memory_utilization,
                max_num_seqs,
                max_model_len,
                hf_token,
            } => {
                let options = HfModelOptions {
                    name,
                    path,
                    port,
                    gpu,
                    gpu_memory_utilization,
                    max_num_seqs,
                    max_model_len,
                    hf_token,
                };
                model::run_hf(&docker, &options).await
            }
            ModelCommands::RunCheckpoint {
                path,
                port,
                gpu,
                gpu_memory_utilization,
                max_num_seqs,
            } => {
                let options = CheckpointOptions {
                    path,
                    port,
                    gpu,
                    gpu_memory_utilization,
                    max_num_seqs,
                };
                model::run_checkpoint(&store, &docker, &options).await
            }
            ModelCommands::List => model::list(&docker).await,
            ModelCommands::Stop { name } => {
                let mut input = std::io::stdin().lock();
                model::stop(&docker, name.as_deref(), &mut input).await
            }
        },
        Commands::Test { base_url } => smoke::run(&store, &base_url).await,
    }
}

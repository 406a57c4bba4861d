mod commands;
mod config;
mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;

use ibmvpc_client::{ClientConfig, VpcClient};
use ibmvpc_provider::IbmVpcProvider;
use ibmvpc_state::{BackendConfig, StateBackend, create_backend};

#[derive(Parser)]
#[command(name = "ibmvpc")]
#[command(about = "Manage IBM Cloud VPC DNS resolution from a JSON configuration", long_about = None)]
struct Cli {
    /// State file location
    #[arg(long, global = true, env = "IBMVPC_STATE", default_value = "ibmvpc.state.json")]
    state: PathBuf,

    /// Region override (defaults to IC_REGION / IBMCLOUD_REGION, then us-south)
    #[arg(long, global = true)]
    region: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file
    Validate {
        #[arg(default_value = "ibmvpc.json")]
        file: PathBuf,
    },
    /// Show execution plan without applying changes
    Plan {
        #[arg(default_value = "ibmvpc.json")]
        file: PathBuf,
    },
    /// Apply changes to reach the desired state
    Apply {
        #[arg(default_value = "ibmvpc.json")]
        file: PathBuf,
    },
    /// Re-read every resource in state
    Refresh,
    /// Destroy every resource recorded in state
    Destroy {
        /// Skip confirmation prompt
        #[arg(long)]
        auto_approve: bool,
    },
    /// Show attribute schemas
    Schema {
        /// Only this resource or data source type
        resource_type: Option<String>,
    },
    /// Remove a state lock left behind by an interrupted run
    ForceUnlock { lock_id: String },
}

fn init_logger(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    builder.init();
}

fn get_backend(state: &Path) -> Result<Box<dyn StateBackend>, String> {
    let mut config = BackendConfig::local();
    config.attributes.insert(
        "path".to_string(),
        ibmvpc_core::resource::Value::String(state.display().to_string()),
    );
    create_backend(&config).map_err(|e| e.to_string())
}

fn get_provider(region: Option<&str>) -> Result<IbmVpcProvider, String> {
    let mut config = ClientConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(region) = region {
        config = config.with_region(region);
    }
    log::info!("Using VPC endpoint {}", config.service_url());
    let client = VpcClient::new(config).map_err(|e| e.to_string())?;
    Ok(IbmVpcProvider::new(Arc::new(client)))
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Validate { file } => commands::run_validate(&file),
        Commands::Schema { resource_type } => commands::run_schema(resource_type.as_deref()),
        Commands::ForceUnlock { lock_id } => {
            let backend = get_backend(&cli.state)?;
            commands::run_force_unlock(backend.as_ref(), &lock_id).await
        }
        Commands::Plan { file } => {
            let backend = get_backend(&cli.state)?;
            let provider = get_provider(cli.region.as_deref())?;
            commands::run_plan(&provider, backend.as_ref(), &file).await
        }
        Commands::Apply { file } => {
            let backend = get_backend(&cli.state)?;
            let provider = get_provider(cli.region.as_deref())?;
            commands::run_apply(&provider, backend.as_ref(), &file).await
        }
        Commands::Refresh => {
            let backend = get_backend(&cli.state)?;
            let provider = get_provider(cli.region.as_deref())?;
            commands::run_refresh(&provider, backend.as_ref()).await
        }
        Commands::Destroy { auto_approve } => {
            let backend = get_backend(&cli.state)?;
            let provider = get_provider(cli.region.as_deref())?;
            commands::run_destroy(&provider, backend.as_ref(), auto_approve).await
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

use crate::app::status::render_status;
use crate::cli::commands::{Cli, Commands, IdentityCommands};
use anyhow::{Context, Result, bail};
use dialoguer::Password;
use serde::Serialize;
use std::future::Future;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use zos_lens::config::{Config, NetworkEnv};
use zos_lens::error::ConfigError;
use zos_lens::grid::{FarmFilter, GridDirectory, NodeFilter};
use zos_lens::rmb::DemoConnector;
use zos_lens::{Lens, LensError};

const DEMO_LATENCY: Duration = Duration::from_millis(500);

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build a lens over the only transport this binary links.
fn open_lens(config: &Config, demo: bool) -> Result<Lens, LensError> {
    if !(demo || config.rmb.demo) {
        return Err(ConfigError::Validation(
            "no RMB relay transport is linked into this build; rerun with --demo \
             or set `rmb.demo = true`"
                .into(),
        )
        .into());
    }
    Ok(Lens::from_config(
        config,
        Arc::new(DemoConnector::new(DEMO_LATENCY)),
    ))
}

/// Await an RMB-backed call for at most `rmb.read_timeout_secs`.
async fn bounded<T>(
    config: &Config,
    call: impl Future<Output = zos_lens::Result<T>>,
) -> Result<T> {
    let limit = Duration::from_secs(config.rmb.read_timeout_secs);
    let outcome = tokio::time::timeout(limit, call)
        .await
        .with_context(|| format!("no reply within {}s", limit.as_secs()))?;
    Ok(outcome?)
}

/// Run one deployment query, print its JSON and tear the session down.
macro_rules! query {
    ($config:expr, $demo:expr, |$lens:ident| $call:expr) => {{
        let mut $lens = open_lens($config, $demo)?;
        let result = bounded($config, $call).await;
        $lens.disconnect().await;
        print_json(&result?)
    }};
}

async fn resolve_twin(config: &Config, node: u32, twin: Option<u32>) -> Result<u32> {
    if let Some(twin) = twin {
        return Ok(twin);
    }
    let mut directory = GridDirectory::new(config.directory.clone());
    let Some(found) = directory.client(config.network).node_by_id(node).await else {
        bail!(
            "node {node} was not found on the {} network; pass --twin explicitly",
            config.network
        );
    };
    Ok(found.twin_id)
}

fn read_mnemonic(mnemonic: Option<String>) -> Result<String> {
    if let Some(mnemonic) = mnemonic {
        return Ok(mnemonic);
    }
    if !std::io::stdin().is_terminal() {
        bail!("--mnemonic is required in non-interactive mode");
    }
    Password::new()
        .with_prompt("Secret phrase (input hidden)")
        .allow_empty_password(false)
        .interact()
        .context("Failed to read secret phrase from terminal")
}

#[allow(clippy::too_many_lines)]
pub async fn dispatch(cli: Cli, mut config: Config) -> Result<()> {
    let demo = cli.demo;
    match cli.command {
        Commands::Deployments => {
            query!(&config, demo, |lens| lens.list_deployments())
        }
        Commands::Deployment { twin, contract } => {
            query!(&config, demo, |lens| lens.get_deployment_detail(twin, contract))
        }
        Commands::History { twin, contract } => {
            query!(&config, demo, |lens| lens.get_deployment_history(twin, contract))
        }
        Commands::Info {
            twin,
            contract,
            workload,
        } => {
            query!(&config, demo, |lens| lens.get_workload_info(twin, contract, &workload))
        }
        Commands::Health { twin, contract } => {
            query!(&config, demo, |lens| lens.get_deployment_health(twin, contract))
        }

        Commands::Nodes {
            node_id,
            farm_id,
            country,
            city,
            page,
            size,
        } => {
            let filter = NodeFilter {
                node_id,
                farm_id,
                country,
                city,
                page,
                size,
            };
            let mut directory = GridDirectory::new(config.directory.clone());
            let page = directory.client(config.network).list_nodes(&filter).await?;
            print_json(&page)
        }
        Commands::Farms {
            name,
            farm_id,
            page,
            size,
        } => {
            let filter = FarmFilter {
                name,
                farm_id,
                page,
                size,
            };
            let mut directory = GridDirectory::new(config.directory.clone());
            let farms = directory.client(config.network).list_farms(&filter).await?;
            print_json(&farms)
        }

        Commands::Select { node, twin, clear } => {
            if clear {
                config.selected_node_id = None;
                config.selected_twin_id = None;
                config.save()?;
                println!("Selection cleared.");
                return Ok(());
            }
            let Some(node) = node else {
                bail!("--node is required unless --clear is given");
            };
            let twin = resolve_twin(&config, node, twin).await?;
            config.selected_node_id = Some(node);
            config.selected_twin_id = Some(twin);
            config.save()?;
            info!(node_id = node, twin_id = twin, "Selection saved");
            println!("Selected node {node} (twin {twin}).");
            Ok(())
        }

        Commands::Network { network } => {
            let Some(network) = network else {
                for (env, label) in NetworkEnv::all() {
                    let marker = if env == config.network { "*" } else { " " };
                    println!("{marker} {env} ({label})");
                }
                return Ok(());
            };
            if network != config.network {
                // Node and twin ids are per network.
                config.selected_node_id = None;
                config.selected_twin_id = None;
            }
            config.network = network;
            config.save()?;
            println!("Network set to {network}.");
            Ok(())
        }

        Commands::Identity { identity_command } => match identity_command {
            IdentityCommands::Set { mnemonic } => {
                let phrase = read_mnemonic(mnemonic)?;
                let phrase = phrase.trim();
                if phrase.is_empty() {
                    return Err(LensError::from(ConfigError::MissingMnemonic).into());
                }
                config.mnemonic = Some(phrase.to_string());
                config.save()?;
                println!("Secret phrase saved.");
                Ok(())
            }
            IdentityCommands::Clear => {
                config.mnemonic = None;
                config.save()?;
                println!("Secret phrase removed.");
                Ok(())
            }
        },

        Commands::Status => {
            println!("{}", render_status(&config, demo));
            Ok(())
        }
    }
}

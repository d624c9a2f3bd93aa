use clap::{Parser, Subcommand};
use zos_lens::config::NetworkEnv;

/// `zos-lens` - Inspect the deployments hosted on a ThreeFold grid node.
#[derive(Parser, Debug)]
#[command(name = "zos-lens")]
#[command(version)]
#[command(about = "Query a node's debug API over RMB.", long_about = None)]
pub struct Cli {
    /// Answer from built-in sample data instead of a relay
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the deployments hosted on the selected node
    Deployments,

    /// Show one deployment in full
    Deployment {
        /// Twin that owns the deployment
        twin: u32,
        /// Contract id of the deployment
        contract: u64,
    },

    /// Show a deployment's state transitions
    History { twin: u32, contract: u64 },

    /// Inspect a single workload (info and logs)
    Info {
        twin: u32,
        contract: u64,
        /// Workload name inside the deployment
        workload: String,
    },

    /// Run the node's health checks for a deployment
    Health { twin: u32, contract: u64 },

    /// Browse nodes that are up on the active network
    Nodes {
        #[arg(long)]
        node_id: Option<u32>,

        #[arg(long)]
        farm_id: Option<u32>,

        #[arg(long)]
        country: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        size: Option<u32>,
    },

    /// Browse farms on the active network
    Farms {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        farm_id: Option<u32>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        size: Option<u32>,
    },

    /// Choose the node to query
    Select {
        /// Node id as listed by `nodes`
        #[arg(long, required_unless_present = "clear")]
        node: Option<u32>,

        /// Twin id of the node; looked up through gridproxy when omitted
        #[arg(long, requires = "node")]
        twin: Option<u32>,

        /// Forget the current selection
        #[arg(long, conflicts_with_all = ["node", "twin"])]
        clear: bool,
    },

    /// Show or switch the grid network (dev, test, qa, main)
    Network { network: Option<NetworkEnv> },

    /// Manage the secret phrase used to sign RMB requests
    Identity {
        #[command(subcommand)]
        identity_command: IdentityCommands,
    },

    /// Show network, identity and selection
    Status,
}

#[derive(Subcommand, Debug)]
pub enum IdentityCommands {
    /// Store a secret phrase (prompted for when not given)
    Set {
        #[arg(long)]
        mnemonic: Option<String>,
    },
    /// Remove the stored secret phrase
    Clear,
}

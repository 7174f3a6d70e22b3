//! # Cluster Subcommand
//!
//! Forwards generated state files to a live control plane through the
//! external `deck` binary. The control-plane address is resolved from the
//! topology document for the requested `(compliance type, dc)` pair; this
//! command never speaks to the gateway itself.
//!
//! ## Usage
//!
//! ```bash
//! apiops cluster diff --state-file generated/kong-dev-pci-delhi.yaml \
//!     --env dev --compliance-type pci --dc delhi --topology-file topology.yaml
//!
//! apiops cluster dump --env dev --compliance-type pci --dc delhi \
//!     --topology-file topology.yaml
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, bail, Result};
use clap::{Args, Subcommand};

use apiops_core::topology::Topology;
use apiops_deck::gateway::GatewayOps;
use apiops_deck::{Deck, DeckParams, TlsParams};

/// Arguments for the `apiops cluster` subcommand.
#[derive(Args, Debug)]
pub struct ClusterArgs {
    #[command(subcommand)]
    pub command: ClusterCommand,
}

/// Cluster subcommands, each forwarding to the matching decK operation.
#[derive(Subcommand, Debug)]
pub enum ClusterCommand {
    /// Validate a state file against the cluster.
    Validate(ClusterOpts),
    /// Show what syncing a state file would change.
    Diff(ClusterOpts),
    /// Apply a state file to the cluster.
    Sync(ClusterOpts),
    /// Export the cluster's current state.
    Dump(ClusterOpts),
}

/// Shared options for every cluster operation.
#[derive(Args, Debug)]
pub struct ClusterOpts {
    /// Generated state file to forward (required except for dump).
    #[arg(long, short = 's')]
    pub state_file: Option<PathBuf>,

    /// Environment identifier name.
    #[arg(long, short = 'e')]
    pub env: String,

    /// Compliance type of the target control plane (e.g. pci, non-pci).
    #[arg(long, short = 'c')]
    pub compliance_type: String,

    /// Path to the topology definition file.
    #[arg(long, short = 't')]
    pub topology_file: PathBuf,

    /// DC name of the target control plane.
    #[arg(long, short = 'd')]
    pub dc: String,

    /// Path of the decK binary.
    #[arg(long, default_value = "deck")]
    pub deck_bin: String,

    /// decK configuration file.
    #[arg(long)]
    pub deck_config: Option<String>,

    /// Request timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// CA certificate file.
    #[arg(long)]
    pub ca_cert_file: Option<String>,

    /// TLS client certificate file.
    #[arg(long)]
    pub tls_client_cert_file: Option<String>,

    /// TLS client key file.
    #[arg(long)]
    pub tls_client_key_file: Option<String>,

    /// TLS server name.
    #[arg(long)]
    pub tls_server_name: Option<String>,
}

enum Operation {
    Validate,
    Diff,
    Sync,
    Dump,
}

/// Execute the cluster subcommand.
pub fn run_cluster(args: &ClusterArgs) -> Result<u8> {
    match &args.command {
        ClusterCommand::Validate(opts) => forward(opts, Operation::Validate),
        ClusterCommand::Diff(opts) => forward(opts, Operation::Diff),
        ClusterCommand::Sync(opts) => forward(opts, Operation::Sync),
        ClusterCommand::Dump(opts) => forward(opts, Operation::Dump),
    }
}

fn forward(opts: &ClusterOpts, operation: Operation) -> Result<u8> {
    let address = resolve_control_plane(opts)?;

    let params = DeckParams {
        kong_addr: Some(address),
        config_file: opts.deck_config.clone(),
        timeout: opts.timeout,
        tls: TlsParams {
            ca_cert_file: opts.ca_cert_file.clone(),
            tls_client_cert_file: opts.tls_client_cert_file.clone(),
            tls_client_key_file: opts.tls_client_key_file.clone(),
            tls_server_name: opts.tls_server_name.clone(),
        },
    };
    let mut gateway = GatewayOps::new(Deck::new(&opts.deck_bin, params));

    match operation {
        Operation::Dump => gateway.dump(),
        Operation::Validate => gateway.validate(&required_state_file(opts)?),
        Operation::Diff => gateway.diff(&required_state_file(opts)?),
        Operation::Sync => gateway.sync(&required_state_file(opts)?),
    }

    if !gateway.deck.error.is_empty() {
        for err in &gateway.deck.error {
            eprintln!("{err}");
        }
        return Ok(1);
    }
    for line in &gateway.deck.output {
        println!("{line}");
    }
    Ok(0)
}

fn required_state_file(opts: &ClusterOpts) -> Result<String> {
    opts.state_file
        .as_ref()
        .map(|p| p.display().to_string())
        .ok_or_else(|| anyhow!("pass all the required options: --state-file"))
}

/// Resolve the control-plane address for the requested compliance type and
/// dc, validating the dc against the environment's declared list first.
fn resolve_control_plane(opts: &ClusterOpts) -> Result<String> {
    let topology = Topology::load(&opts.topology_file)?;
    let environment = topology.environment(&opts.env)?;

    if !environment.has_dc(&opts.dc) {
        bail!(
            "'{}' is not a valid dc name in environment '{}'; pass one of: {}",
            opts.dc,
            opts.env,
            environment.dc.join(", ")
        );
    }

    environment
        .control_plane_address(&opts.compliance_type, &opts.dc)
        .map(|addr| addr.to_string())
        .ok_or_else(|| {
            anyhow!(
                "no control plane found for compliance type '{}' and dc '{}'",
                opts.compliance_type,
                opts.dc
            )
        })
}

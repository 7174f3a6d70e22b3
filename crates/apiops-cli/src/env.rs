//! # Env Subcommand
//!
//! Lint and generate operations over an environment directory.
//!
//! ## Usage
//!
//! ```bash
//! # Validate the directory against the gateway conventions:
//! apiops env lint --gateway-dir configs --env dev --topology-file topology.yaml
//!
//! # Generate the state document for one compliance type and dc:
//! apiops env generate --gateway-dir configs --env dev \
//!     --topology-file topology.yaml --compliance-type pci --dc delhi
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use apiops_core::merge::{merge_environment, write_state, MergeConfig};
use apiops_core::validate::{lint_environment, LintConfig};

/// Arguments for the `apiops env` subcommand.
#[derive(Args, Debug)]
pub struct EnvArgs {
    #[command(subcommand)]
    pub command: EnvCommand,
}

/// Env subcommands.
#[derive(Subcommand, Debug)]
pub enum EnvCommand {
    /// Lint the environment directory against the gateway conventions.
    Lint {
        /// Root directory holding one subdirectory per environment.
        #[arg(long, short = 'g')]
        gateway_dir: PathBuf,

        /// Environment identifier name.
        #[arg(long, short = 'e')]
        env: String,

        /// Path to the topology definition file.
        #[arg(long, short = 't')]
        topology_file: Option<PathBuf>,
    },

    /// Generate the merged gateway state for one compliance type and dc.
    Generate {
        /// Root directory holding one subdirectory per environment.
        #[arg(long, short = 'g')]
        gateway_dir: PathBuf,

        /// Environment identifier name.
        #[arg(long, short = 'e')]
        env: String,

        /// Path to the topology definition file.
        #[arg(long, short = 't')]
        topology_file: Option<PathBuf>,

        /// Compliance type selecting the services to keep (e.g. pci).
        #[arg(long, short = 'c')]
        compliance_type: String,

        /// Data center whose upstream targets are materialized.
        #[arg(long, short = 'd')]
        dc: String,
    },
}

/// Execute the env subcommand.
pub fn run_env(args: &EnvArgs) -> Result<u8> {
    match &args.command {
        EnvCommand::Lint {
            gateway_dir,
            env,
            topology_file,
        } => run_lint(gateway_dir, env, topology_file.as_deref()),
        EnvCommand::Generate {
            gateway_dir,
            env,
            topology_file,
            compliance_type,
            dc,
        } => run_generate(gateway_dir, env, topology_file.as_deref(), compliance_type, dc),
    }
}

fn run_lint(
    gateway_dir: &std::path::Path,
    env: &str,
    topology_file: Option<&std::path::Path>,
) -> Result<u8> {
    let report = lint_environment(&LintConfig {
        gateway_root: gateway_dir.to_path_buf(),
        env_name: env.to_string(),
        topology_file: topology_file.map(|p| p.to_path_buf()),
    });

    if report.is_clean() {
        println!("environment '{env}' validated successfully");
        return Ok(0);
    }

    eprintln!("lint failed, the environment directory is not correctly formatted:");
    for defect in report.defects() {
        eprintln!("  - {defect}");
    }
    Ok(1)
}

fn run_generate(
    gateway_dir: &std::path::Path,
    env: &str,
    topology_file: Option<&std::path::Path>,
    compliance_type: &str,
    dc: &str,
) -> Result<u8> {
    let config = MergeConfig {
        gateway_root: gateway_dir.to_path_buf(),
        env_name: env.to_string(),
        topology_file: topology_file.map(|p| p.to_path_buf()),
        compliance_type: compliance_type.to_string(),
        dc_name: dc.to_string(),
    };

    let outcome = merge_environment(&config);
    if !outcome.is_success() {
        eprintln!("merge failed, the environment directory is not correctly formatted; run lint:");
        for defect in outcome.report.defects() {
            eprintln!("  - {defect}");
        }
        return Ok(1);
    }

    let path = write_state(&config, &outcome.state)?;
    println!("gateway state generated at: {}", path.display());
    Ok(0)
}

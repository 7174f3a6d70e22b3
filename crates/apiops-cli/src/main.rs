//! # apiops CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros; verbosity is mapped from repeated `-v` flags
//! onto a tracing filter.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use apiops_cli::cluster::{run_cluster, ClusterArgs};
use apiops_cli::env::{run_env, EnvArgs};

/// apiops — declarative gateway configuration toolchain.
///
/// Lints environment directories against the gateway conventions,
/// generates compliance- and dc-scoped state documents, and forwards them
/// to a live control plane through the external decK binary.
#[derive(Parser, Debug)]
#[command(name = "apiops", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Lint and generate over an environment directory.
    Env(EnvArgs),

    /// Operations against a live gateway cluster via decK.
    Cluster(ClusterArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Env(args) => run_env(&args),
        Commands::Cluster(args) => run_cluster(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiops_cli::cluster::ClusterCommand;
    use apiops_cli::env::EnvCommand;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_env_lint() {
        let cli = Cli::try_parse_from([
            "apiops",
            "env",
            "lint",
            "--gateway-dir",
            "configs",
            "--env",
            "dev",
            "--topology-file",
            "topology.yaml",
        ])
        .unwrap();
        let Commands::Env(args) = cli.command else {
            panic!("expected env subcommand");
        };
        let EnvCommand::Lint {
            gateway_dir,
            env,
            topology_file,
        } = args.command
        else {
            panic!("expected lint");
        };
        assert_eq!(gateway_dir, PathBuf::from("configs"));
        assert_eq!(env, "dev");
        assert_eq!(topology_file, Some(PathBuf::from("topology.yaml")));
    }

    #[test]
    fn cli_parse_env_lint_topology_is_optional() {
        let cli =
            Cli::try_parse_from(["apiops", "env", "lint", "-g", "configs", "-e", "dev"]).unwrap();
        let Commands::Env(args) = cli.command else {
            panic!("expected env subcommand");
        };
        let EnvCommand::Lint { topology_file, .. } = args.command else {
            panic!("expected lint");
        };
        assert!(topology_file.is_none());
    }

    #[test]
    fn cli_parse_env_generate() {
        let cli = Cli::try_parse_from([
            "apiops",
            "env",
            "generate",
            "-g",
            "configs",
            "-e",
            "dev",
            "-c",
            "pci",
            "-d",
            "delhi",
        ])
        .unwrap();
        let Commands::Env(args) = cli.command else {
            panic!("expected env subcommand");
        };
        let EnvCommand::Generate {
            compliance_type,
            dc,
            ..
        } = args.command
        else {
            panic!("expected generate");
        };
        assert_eq!(compliance_type, "pci");
        assert_eq!(dc, "delhi");
    }

    #[test]
    fn cli_parse_env_generate_requires_compliance_type() {
        let result = Cli::try_parse_from([
            "apiops", "env", "generate", "-g", "configs", "-e", "dev", "-d", "delhi",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_cluster_sync() {
        let cli = Cli::try_parse_from([
            "apiops",
            "cluster",
            "sync",
            "--state-file",
            "generated/kong-dev-pci-delhi.yaml",
            "--env",
            "dev",
            "--compliance-type",
            "pci",
            "--topology-file",
            "topology.yaml",
            "--dc",
            "delhi",
        ])
        .unwrap();
        let Commands::Cluster(args) = cli.command else {
            panic!("expected cluster subcommand");
        };
        let ClusterCommand::Sync(opts) = args.command else {
            panic!("expected sync");
        };
        assert_eq!(
            opts.state_file,
            Some(PathBuf::from("generated/kong-dev-pci-delhi.yaml"))
        );
        assert_eq!(opts.deck_bin, "deck");
    }

    #[test]
    fn cli_parse_cluster_dump_without_state_file() {
        let cli = Cli::try_parse_from([
            "apiops",
            "cluster",
            "dump",
            "-e",
            "dev",
            "-c",
            "pci",
            "-t",
            "topology.yaml",
            "-d",
            "delhi",
        ])
        .unwrap();
        let Commands::Cluster(args) = cli.command else {
            panic!("expected cluster subcommand");
        };
        let ClusterCommand::Dump(opts) = args.command else {
            panic!("expected dump");
        };
        assert!(opts.state_file.is_none());
    }

    #[test]
    fn cli_parse_cluster_tls_options() {
        let cli = Cli::try_parse_from([
            "apiops",
            "cluster",
            "diff",
            "-s",
            "state.yaml",
            "-e",
            "dev",
            "-c",
            "pci",
            "-t",
            "topology.yaml",
            "-d",
            "delhi",
            "--ca-cert-file",
            "ca.pem",
            "--tls-server-name",
            "gateway.example.com",
            "--timeout",
            "30",
        ])
        .unwrap();
        let Commands::Cluster(args) = cli.command else {
            panic!("expected cluster subcommand");
        };
        let ClusterCommand::Diff(opts) = args.command else {
            panic!("expected diff");
        };
        assert_eq!(opts.ca_cert_file.as_deref(), Some("ca.pem"));
        assert_eq!(opts.tls_server_name.as_deref(), Some("gateway.example.com"));
        assert_eq!(opts.timeout, Some(30));
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli0 =
            Cli::try_parse_from(["apiops", "env", "lint", "-g", "c", "-e", "dev"]).unwrap();
        assert_eq!(cli0.verbose, 0);

        let cli2 =
            Cli::try_parse_from(["apiops", "-vv", "env", "lint", "-g", "c", "-e", "dev"]).unwrap();
        assert_eq!(cli2.verbose, 2);
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["apiops"]).is_err());
    }

    #[test]
    fn cli_parse_unknown_subcommand_errors() {
        assert!(Cli::try_parse_from(["apiops", "nonexistent"]).is_err());
    }
}

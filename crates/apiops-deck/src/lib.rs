//! # apiops-deck — decK Subprocess Wrapper
//!
//! Builds and runs invocations of the external `deck` binary, the
//! gateway-control tool that lints, diffs, syncs, and dumps declarative
//! state against a live cluster.
//!
//! This crate owns none of decK's semantics. It renders the shared
//! connection parameters as `--kebab-case` flags, spawns the binary, and
//! captures stdout/stderr; everything else — what the commands mean, what
//! the state files contain — belongs to decK itself or to `apiops-core`.
//!
//! - [`gateway`] — `deck gateway sync|diff|dump|validate` against a
//!   control-plane address.
//! - [`file`] — `deck file lint|render|merge|validate` over local state
//!   files.

pub mod file;
pub mod gateway;

use std::process::Command;

/// TLS connection bundle forwarded to decK when talking to a protected
/// control plane.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsParams {
    pub ca_cert_file: Option<String>,
    pub tls_client_cert_file: Option<String>,
    pub tls_client_key_file: Option<String>,
    pub tls_server_name: Option<String>,
}

impl TlsParams {
    fn flag_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        push_flag(&mut args, "--ca-cert-file", self.ca_cert_file.as_deref());
        push_flag(
            &mut args,
            "--tls-client-cert-file",
            self.tls_client_cert_file.as_deref(),
        );
        push_flag(
            &mut args,
            "--tls-client-key-file",
            self.tls_client_key_file.as_deref(),
        );
        push_flag(
            &mut args,
            "--tls-server-name",
            self.tls_server_name.as_deref(),
        );
        args
    }
}

/// Shared decK connection parameters. Unset fields emit no flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeckParams {
    /// Control-plane address (`--kong-addr`).
    pub kong_addr: Option<String>,
    /// decK configuration file (`--config-file`).
    pub config_file: Option<String>,
    /// Request timeout in seconds (`--timeout`).
    pub timeout: Option<u64>,
    /// TLS connection bundle.
    pub tls: TlsParams,
}

/// One decK binary plus its connection parameters, accumulating the
/// output and error lines of every executed command.
#[derive(Debug)]
pub struct Deck {
    binary_path: String,
    params: DeckParams,
    /// Captured stdout, one entry per successful command.
    pub output: Vec<String>,
    /// Captured failures, one entry per failed command.
    pub error: Vec<String>,
}

impl Deck {
    /// Wrap a decK binary with its connection parameters.
    pub fn new(binary_path: impl Into<String>, params: DeckParams) -> Self {
        Self {
            binary_path: binary_path.into(),
            params,
            output: Vec::new(),
            error: Vec::new(),
        }
    }

    /// Path of the wrapped binary.
    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    /// The connection flags appended to every invocation.
    pub fn param_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        push_flag(&mut args, "--kong-addr", self.params.kong_addr.as_deref());
        push_flag(
            &mut args,
            "--config-file",
            self.params.config_file.as_deref(),
        );
        if let Some(timeout) = self.params.timeout {
            args.push("--timeout".to_string());
            args.push(timeout.to_string());
        }
        args.extend(self.params.tls.flag_args());
        args
    }

    /// The full argument vector for one command, connection flags last.
    pub fn command_args(&self, command: &[&str]) -> Vec<String> {
        let mut args: Vec<String> = command.iter().map(|s| s.to_string()).collect();
        args.extend(self.param_args());
        args
    }

    /// Run one decK command, recording stdout on success or stderr on
    /// failure. Never raises; callers inspect [`Deck::error`].
    pub fn execute(&mut self, command: &[&str]) {
        let args = self.command_args(command);
        tracing::debug!(binary = %self.binary_path, ?args, "executing deck command");

        match Command::new(&self.binary_path).args(&args).output() {
            Ok(out) if out.status.success() => {
                self.output
                    .push(String::from_utf8_lossy(&out.stdout).trim_end().to_string());
            }
            Ok(out) => {
                self.error.push(format!(
                    "error executing command: {}",
                    String::from_utf8_lossy(&out.stderr).trim_end()
                ));
            }
            Err(err) => {
                self.error.push(format!("error executing command: {err}"));
            }
        }
    }
}

fn push_flag(args: &mut Vec<String>, flag: &str, value: Option<&str>) {
    if let Some(value) = value {
        args.push(flag.to_string());
        args.push(value.to_string());
    }
}

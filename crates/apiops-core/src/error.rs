//! # Error Types — Defect Taxonomy and Fatal Errors
//!
//! Two layers of failure run through the toolchain:
//!
//! - [`GatewayError`] — fatal conditions that stop an operation outright:
//!   a missing top-level directory, an unreadable or unparseable topology
//!   document, a failed state write. These use `thiserror` and propagate
//!   with `?`.
//! - [`Defect`] — a single lint/merge finding. Defects are never raised;
//!   they are collected into a [`Report`] so one run surfaces as many
//!   problems as possible.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal error for the gateway toolchain.
///
/// Only missing top-level inputs and unrecoverable I/O belong here. Anything
/// scoped to a single record or file inside the environment directory is a
/// [`Defect`] instead.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A required directory does not exist.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// The requested environment is not defined in the topology document.
    #[error("environment '{0}' not found in topology")]
    EnvironmentNotFound(String),

    /// Reading a file or directory failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document is not well-formed YAML of the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Path of the malformed document.
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Serializing the merged state document failed.
    #[error("failed to serialize state document: {0}")]
    Serialize(#[from] serde_yaml::Error),

    /// Writing the merged state document failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path of the failed write.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Classification of a single defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefectKind {
    /// Missing/extra directories or files, wrong document shape.
    Structural,
    /// Weight sums, missing tags, cross-reference violations.
    Semantic,
    /// Malformed document syntax.
    Parse,
}

/// One lint or merge finding: a kind plus the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defect {
    kind: DefectKind,
    message: String,
}

impl Defect {
    /// A structural defect.
    pub fn structural(message: impl Into<String>) -> Self {
        Self {
            kind: DefectKind::Structural,
            message: message.into(),
        }
    }

    /// A semantic defect.
    pub fn semantic(message: impl Into<String>) -> Self {
        Self {
            kind: DefectKind::Semantic,
            message: message.into(),
        }
    }

    /// A parse defect.
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: DefectKind::Parse,
            message: message.into(),
        }
    }

    /// The defect classification.
    pub fn kind(&self) -> DefectKind {
        self.kind
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Ordered collection of defects produced by one validation or merge run.
///
/// Passed through each stage by mutable reference and returned by value;
/// no stage short-circuits on an earlier stage's findings.
#[derive(Debug, Default)]
#[must_use]
pub struct Report {
    defects: Vec<Defect>,
}

impl Report {
    /// An empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one defect.
    pub fn push(&mut self, defect: Defect) {
        self.defects.push(defect);
    }

    /// Record a batch of defects, preserving their order.
    pub fn extend(&mut self, defects: impl IntoIterator<Item = Defect>) {
        self.defects.extend(defects);
    }

    /// True when no defects were recorded. A clean report means the run
    /// passed.
    pub fn is_clean(&self) -> bool {
        self.defects.is_empty()
    }

    /// Number of recorded defects.
    pub fn len(&self) -> usize {
        self.defects.len()
    }

    /// True when the report holds no defects.
    pub fn is_empty(&self) -> bool {
        self.defects.is_empty()
    }

    /// The recorded defects, in collection order.
    pub fn defects(&self) -> &[Defect] {
        &self.defects
    }

    /// Consume the report into plain message strings.
    pub fn into_messages(self) -> Vec<String> {
        self.defects.into_iter().map(|d| d.message).collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, defect) in self.defects.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{defect}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defect_display_is_bare_message() {
        let d = Defect::semantic("weights must sum to 100");
        assert_eq!(d.to_string(), "weights must sum to 100");
        assert_eq!(d.kind(), DefectKind::Semantic);
    }

    #[test]
    fn report_starts_clean() {
        let report = Report::new();
        assert!(report.is_clean());
        assert!(report.is_empty());
        assert_eq!(report.len(), 0);
    }

    #[test]
    fn report_preserves_order() {
        let mut report = Report::new();
        report.push(Defect::structural("first"));
        report.extend([Defect::parse("second"), Defect::semantic("third")]);
        assert!(!report.is_clean());
        assert_eq!(report.len(), 3);
        assert_eq!(
            report.into_messages(),
            vec!["first", "second", "third"]
        );
    }

    #[test]
    fn report_display_joins_lines() {
        let mut report = Report::new();
        report.push(Defect::structural("a"));
        report.push(Defect::structural("b"));
        assert_eq!(report.to_string(), "a\nb");
    }

    #[test]
    fn gateway_error_display() {
        let err = GatewayError::EnvironmentNotFound("dev".to_string());
        assert_eq!(err.to_string(), "environment 'dev' not found in topology");
    }
}

//! Error types for graph loading, configuration and emission.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while turning a program document into a [`crate::graph::TypeGraph`].
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Failed to parse program document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to read program document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unresolved type reference '{reference}' in {context}")]
    UnresolvedReference { reference: String, context: String },

    #[error("Duplicate declaration '{0}'")]
    DuplicateDeclaration(String),

    #[error("'{reference}' in {context} does not name a {expected}")]
    KindMismatch {
        reference: String,
        context: String,
        expected: &'static str,
    },
}

/// Failure while loading or validating emitter options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid value for option '{option}': {reason}")]
    InvalidOption { option: &'static str, reason: String },
}

/// Failure while writing emitted artifacts.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

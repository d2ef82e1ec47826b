//! Structured error types for configuration resolution.

use serde::Serialize;
use std::path::PathBuf;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Caller mistakes, detected before any fragment is read
    InvalidHierarchy,
    NotADirectory,
    NotAFile,
    ConflictingSources,
    MissingRoot,
    MissingBootstrapKey,
    InvalidRootLocator,
    InvalidLocale,

    // Fragment and reference errors
    MalformedFragment,
    UnresolvedReference,

    // Internal errors
    IoError,
}

/// Errors that can occur while resolving a configuration tree.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ProfileDir must be a RootDir subdirectory: {profile} is not under {root}")]
    InvalidHierarchy { profile: PathBuf, root: PathBuf },

    #[error("{path} is not a directory")]
    NotADirectory { path: PathBuf },

    #[error("{path} is not a file")]
    NotAFile { path: PathBuf },

    #[error("ConfigFile must be an alternative to RootDir and ProfileDir")]
    ConflictingSources,

    #[error("no root directory, profile directory or config file was given")]
    MissingRoot,

    #[error("config file {path} does not define `{key}`")]
    MissingBootstrapKey { path: PathBuf, key: String },

    #[error("invalid root directory locator `{locator}`: {reason}")]
    InvalidRootLocator { locator: String, reason: String },

    #[error("invalid locale `{input}`")]
    InvalidLocale { input: String },

    #[error("failed to parse {format} fragment {path}: {message}")]
    MalformedFragment {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("could not resolve substitution `${{{reference}}}`: {reason}")]
    UnresolvedReference { reference: String, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_hierarchy(profile: impl Into<PathBuf>, root: impl Into<PathBuf>) -> Self {
        Self::InvalidHierarchy {
            profile: profile.into(),
            root: root.into(),
        }
    }

    pub fn malformed(
        path: impl Into<PathBuf>,
        format: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedFragment {
            path: path.into(),
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn unresolved(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidHierarchy { .. } => ErrorCode::InvalidHierarchy,
            Self::NotADirectory { .. } => ErrorCode::NotADirectory,
            Self::NotAFile { .. } => ErrorCode::NotAFile,
            Self::ConflictingSources => ErrorCode::ConflictingSources,
            Self::MissingRoot => ErrorCode::MissingRoot,
            Self::MissingBootstrapKey { .. } => ErrorCode::MissingBootstrapKey,
            Self::InvalidRootLocator { .. } => ErrorCode::InvalidRootLocator,
            Self::InvalidLocale { .. } => ErrorCode::InvalidLocale,
            Self::MalformedFragment { .. } => ErrorCode::MalformedFragment,
            Self::UnresolvedReference { .. } => ErrorCode::UnresolvedReference,
            Self::Io { .. } => ErrorCode::IoError,
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

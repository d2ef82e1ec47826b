//! CLI command definitions for i18n-config
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for printed configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// YAML
    Yaml,
}

/// Resolve layered, locale-aware configuration directories
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Root directory, the least specific directory of the chain
    #[arg(short, long, global = true, env = "I18N_CONFIG_ROOT")]
    pub root: Option<PathBuf>,

    /// Profile directory, the most specific directory of the chain
    #[arg(short, long, global = true, env = "I18N_CONFIG_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Base config file naming rootDir and profilePath (alternative to --root/--profile)
    #[arg(short, long, global = true, env = "I18N_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    /// Requested locale, e.g. it_IT
    #[arg(long, global = true, env = "I18N_CONFIG_LOCALE")]
    pub locale: Option<String>,

    /// Default locale (detected from LC_ALL, LC_MESSAGES or LANG when absent)
    #[arg(long, global = true)]
    pub default_locale: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the whole resolved configuration (default if no subcommand given)
    Show,

    /// Print the value at a dotted path; exits with status 1 when absent
    Get {
        /// Dotted path, e.g. root.property1
        path: String,
    },

    /// Print section names, one per line
    Sections,

    /// Print the fragment files of every section, grouped by locale bucket
    Sequences,
}

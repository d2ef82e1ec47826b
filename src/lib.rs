//! Layered, locale-aware configuration resolution.
//!
//! Configuration fragments are read from every directory between a profile
//! directory and its root directory, bucketed by locale suffix, merged with
//! fallback composition and exposed as a single [`Config`].

pub mod bootstrap;
pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod fragment;
pub mod hocon;
pub mod locale;
pub mod merge;
pub mod paths;
pub mod properties;
pub mod resolver;
pub mod sequence;
pub mod substitute;

pub use builder::ConfigBuilder;
pub use config::Config;
pub use error::{ConfigError, ErrorCode, Result};
pub use format::Format;
pub use fragment::Fragment;
pub use locale::{Locale, LocaleSet};
pub use resolver::SequenceResolver;
pub use sequence::{FileSequences, LocaleBucket, SequenceMap};
pub use substitute::{EnvLookup, ProcessEnv};

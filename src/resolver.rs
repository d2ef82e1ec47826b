//! Sequence resolution and merging.
//!
//! Scans a directory chain, merges every section's fragments with fallback
//! composition, attaches the sections to the root configuration and runs the
//! substitution pass over the result.

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::format::value_kind;
use crate::locale::LocaleSet;
use crate::merge::fallback_all;
use crate::sequence::{self, FileSequences, SequenceMap};
use crate::substitute::{self, EnvLookup, ProcessEnv};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Resolves a directory chain into a [`Config`].
#[derive(Clone)]
pub struct SequenceResolver {
    locales: LocaleSet,
    env: Arc<dyn EnvLookup>,
}

impl std::fmt::Debug for SequenceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceResolver")
            .field("locales", &self.locales)
            .finish_non_exhaustive()
    }
}

impl SequenceResolver {
    /// Create a resolver reading substitution fallbacks from the process environment.
    pub fn new(locales: LocaleSet) -> Self {
        Self {
            locales,
            env: Arc::new(ProcessEnv),
        }
    }

    /// Use a different environment for substitution fallbacks.
    pub fn with_env(mut self, env: Arc<dyn EnvLookup>) -> Self {
        self.env = env;
        self
    }

    pub fn locales(&self) -> &LocaleSet {
        &self.locales
    }

    /// Bucket every fragment of the chain per section.
    pub fn scan(&self, chain: &[PathBuf]) -> Result<SequenceMap> {
        sequence::scan_chain(chain, &self.locales)
    }

    /// Merge one section's fragments.
    ///
    /// Each bucket is folded with the first fragment winning, then the bucket
    /// values are folded in precedence order.
    pub fn merge_section(&self, sequences: &FileSequences) -> Result<Value> {
        let mut bucket_values = Vec::new();
        for (bucket, fragments) in sequences.iter() {
            if fragments.is_empty() {
                continue;
            }
            let values = fragments
                .iter()
                .map(|fragment| fragment.format.load(&fragment.path))
                .collect::<Result<Vec<_>>>()?;
            debug!(bucket = %bucket, fragments = values.len(), "Merging bucket");
            bucket_values.push(fallback_all(values));
        }
        Ok(fallback_all(bucket_values))
    }

    /// Resolve a chain into the final configuration.
    ///
    /// `base` supplies keys present before any section is attached; a
    /// section overwrites a base key of the same name. It is an already
    /// resolved tree, so its strings are taken literally.
    pub fn resolve(&self, chain: &[PathBuf], base: Option<Value>) -> Result<Config> {
        let sequences = self.scan(chain)?;
        let mut root = match base.map(substitute::escape_literals) {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(ConfigError::malformed(
                    chain.last().cloned().unwrap_or_default(),
                    "base",
                    format!("base configuration must be an object, found {}", value_kind(&other)),
                ));
            }
            None => Map::new(),
        };

        for (section, files) in &sequences {
            let value = self.merge_section(files)?;
            debug!(section = %section, fragments = files.len(), "Merged section");
            root.insert(section.clone(), value);
        }

        let resolved = substitute::resolve(Value::Object(root), self.env.as_ref())?;
        info!(
            sections = sequences.len(),
            directories = chain.len(),
            "Resolved configuration"
        );
        Ok(Config::from_value(resolved))
    }
}

//! Configuration builder.
//!
//! Collects the sources (root and profile directories, or a base config
//! file) and locales, validates them as they are supplied, and runs the
//! resolver on [`ConfigBuilder::build`].

use crate::bootstrap::Bootstrap;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::locale::{Locale, LocaleSet};
use crate::paths;
use crate::resolver::SequenceResolver;
use crate::sequence::SequenceMap;
use crate::substitute::{EnvLookup, ProcessEnv};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builder for a resolved [`Config`].
///
/// Either a root directory (optionally with a profile directory below it) or
/// a base config file must be supplied, not both.
///
/// ```no_run
/// use i18n_config::{ConfigBuilder, Locale};
///
/// let config = ConfigBuilder::new()
///     .with_root_dir("/etc/myapp")?
///     .with_profile_dir("/etc/myapp/prod")?
///     .with_locale(Locale::parse("it_IT")?)
///     .build()?;
/// println!("{:?}", config.get("root.property1"));
/// # Ok::<(), i18n_config::ConfigError>(())
/// ```
#[derive(Clone)]
pub struct ConfigBuilder {
    root_dir: Option<PathBuf>,
    profile_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
    locale: Option<Locale>,
    default_locale: Option<Locale>,
    env: Arc<dyn EnvLookup>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("root_dir", &self.root_dir)
            .field("profile_dir", &self.profile_dir)
            .field("config_file", &self.config_file)
            .field("locale", &self.locale)
            .field("default_locale", &self.default_locale)
            .finish_non_exhaustive()
    }
}

/// Chain and base tree derived from the builder's sources.
struct Sources {
    chain: Vec<PathBuf>,
    base: Option<Value>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            root_dir: None,
            profile_dir: None,
            config_file: None,
            locale: None,
            default_locale: None,
            env: Arc::new(ProcessEnv),
        }
    }

    /// Set the root directory, the least specific directory of the chain.
    pub fn with_root_dir(mut self, dir: impl AsRef<Path>) -> Result<Self> {
        self.root_dir = Some(existing_dir(dir.as_ref())?);
        self.check_state()?;
        Ok(self)
    }

    /// Set the profile directory, the most specific directory of the chain.
    pub fn with_profile_dir(mut self, dir: impl AsRef<Path>) -> Result<Self> {
        self.profile_dir = Some(existing_dir(dir.as_ref())?);
        self.check_state()?;
        Ok(self)
    }

    /// Read the root and profile directories from a base config file.
    pub fn with_config_file(mut self, file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref();
        if !file.is_file() {
            return Err(ConfigError::NotAFile {
                path: file.to_path_buf(),
            });
        }
        self.config_file = Some(file.to_path_buf());
        self.check_state()?;
        Ok(self)
    }

    /// Requested locale.
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Default locale. Detected from the environment when not set.
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = Some(locale);
        self
    }

    /// Environment used for substitution fallbacks.
    pub fn with_env(mut self, env: Arc<dyn EnvLookup>) -> Self {
        self.env = env;
        self
    }

    /// Resolve the configuration.
    pub fn build(&self) -> Result<Config> {
        let sources = self.sources()?;
        self.resolver().resolve(&sources.chain, sources.base)
    }

    /// Per-section fragment lists, without loading any fragment.
    pub fn sequences(&self) -> Result<SequenceMap> {
        let sources = self.sources()?;
        self.resolver().scan(&sources.chain)
    }

    /// The locales resolution will use.
    pub fn locales(&self) -> LocaleSet {
        let default = self.default_locale.clone().unwrap_or_else(Locale::system);
        LocaleSet::new(self.locale.clone(), default)
    }

    fn resolver(&self) -> SequenceResolver {
        SequenceResolver::new(self.locales()).with_env(Arc::clone(&self.env))
    }

    fn check_state(&self) -> Result<()> {
        if self.config_file.is_some() && (self.root_dir.is_some() || self.profile_dir.is_some()) {
            return Err(ConfigError::ConflictingSources);
        }
        if let (Some(root), Some(profile)) = (&self.root_dir, &self.profile_dir)
            && !paths::has_parent(profile, root)
        {
            return Err(ConfigError::invalid_hierarchy(profile, root));
        }
        Ok(())
    }

    fn sources(&self) -> Result<Sources> {
        if let Some(file) = &self.config_file {
            let bootstrap = Bootstrap::load(file, self.env.as_ref())?;
            let chain = paths::enumerate(&bootstrap.profile_dir, &bootstrap.root_dir)?;
            return Ok(Sources {
                chain,
                base: Some(bootstrap.tree),
            });
        }

        let (profile, root) = match (&self.profile_dir, &self.root_dir) {
            (Some(profile), Some(root)) => (profile, root),
            (Some(dir), None) | (None, Some(dir)) => (dir, dir),
            (None, None) => return Err(ConfigError::MissingRoot),
        };
        Ok(Sources {
            chain: paths::enumerate(profile, root)?,
            base: None,
        })
    }
}

fn existing_dir(dir: &Path) -> Result<PathBuf> {
    if dir.is_dir() {
        Ok(dir.to_path_buf())
    } else {
        Err(ConfigError::NotADirectory {
            path: dir.to_path_buf(),
        })
    }
}

//! Base config file handling.
//!
//! A base config file names the root directory and the profile path instead
//! of the caller passing them directly. Its own keys are kept in the final
//! configuration.

use crate::error::{ConfigError, Result};
use crate::format;
use crate::substitute::{self, EnvLookup};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Key holding the root directory locator (URI or path).
pub const ROOT_DIR_CONFIG_KEY: &str = "rootDir";

/// Key holding the profile path, relative to the root directory.
pub const PROFILE_PATH_CONFIG_KEY: &str = "profilePath";

/// Directories and tree read from a base config file.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub root_dir: PathBuf,
    pub profile_dir: PathBuf,
    /// The resolved contents of the base file
    pub tree: Value,
}

impl Bootstrap {
    /// Parse and resolve the base file, then locate the root and profile directories.
    pub fn load(file: &Path, env: &dyn EnvLookup) -> Result<Self> {
        let tree = substitute::resolve(format::load_path(file)?, env)?;

        let root_locator = required_str(&tree, file, ROOT_DIR_CONFIG_KEY)?;
        let profile_path = required_str(&tree, file, PROFILE_PATH_CONFIG_KEY)?;

        let base_dir = file.parent().unwrap_or_else(|| Path::new("."));
        let root_dir = locate_root(root_locator, base_dir)?;
        let profile_dir = root_dir.join(profile_path);

        tracing::debug!(
            file = %file.display(),
            root = %root_dir.display(),
            profile = %profile_dir.display(),
            "Loaded base config"
        );

        Ok(Self {
            root_dir,
            profile_dir,
            tree,
        })
    }
}

fn required_str<'a>(tree: &'a Value, file: &Path, key: &str) -> Result<&'a str> {
    tree.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ConfigError::MissingBootstrapKey {
            path: file.to_path_buf(),
            key: key.to_string(),
        })
}

/// Turn a root directory locator into a path.
///
/// `file:` URIs are percent-decoded; absolute paths are used as-is; anything
/// else is relative to `base_dir`, the base file's directory.
pub fn locate_root(locator: &str, base_dir: &Path) -> Result<PathBuf> {
    let invalid = |reason: &str| ConfigError::InvalidRootLocator {
        locator: locator.to_string(),
        reason: reason.to_string(),
    };

    if let Some(scheme) = uri_scheme(locator) {
        if !scheme.eq_ignore_ascii_case("file") {
            return Err(invalid("only file: URIs are supported"));
        }
        let rest = &locator[scheme.len() + 1..];
        // file:///abs, file://localhost/abs and file:/abs
        let path = match rest.strip_prefix("//") {
            Some(authority_and_path) => {
                let slash = authority_and_path
                    .find('/')
                    .ok_or_else(|| invalid("missing path"))?;
                let host = &authority_and_path[..slash];
                if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
                    return Err(invalid("remote hosts are not supported"));
                }
                &authority_and_path[slash..]
            }
            None => rest,
        };
        let decoded = urlencoding::decode(path).map_err(|_| invalid("invalid percent-encoding"))?;
        let path = PathBuf::from(decoded.into_owned());
        return Ok(if path.is_absolute() {
            path
        } else {
            base_dir.join(path)
        });
    }

    let path = Path::new(locator);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(base_dir.join(path))
    }
}

/// URI scheme of a locator, if it has one.
///
/// A single letter followed by `:` is a Windows drive, not a scheme.
fn uri_scheme(locator: &str) -> Option<&str> {
    let colon = locator.find(':')?;
    let scheme = &locator[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    let valid = first.is_ascii_alphabetic()
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (valid && scheme.len() > 1).then_some(scheme)
}

//! Locale values used to pick localized fragments.
//!
//! A [`Locale`] is a language plus an optional country, written `it` or
//! `it_IT`. The default locale is never read from process-wide state inside
//! the resolver: callers pass it explicitly through a [`LocaleSet`].

use crate::error::{ConfigError, Result};
use crate::substitute::{EnvLookup, ProcessEnv};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Environment variables consulted by [`Locale::from_env`], highest priority first.
pub const LOCALE_ENV_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// A language with an optional country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    language: String,
    country: Option<String>,
}

impl Locale {
    /// Create a locale, normalizing the language to lowercase and the country to uppercase.
    pub fn new(language: &str, country: Option<&str>) -> Result<Self> {
        let invalid = || ConfigError::InvalidLocale {
            input: match country {
                Some(c) => format!("{language}_{c}"),
                None => language.to_string(),
            },
        };

        if !(2..=3).contains(&language.len()) || !language.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(invalid());
        }

        let country = match country.filter(|c| !c.is_empty()) {
            Some(c) => {
                let alpha = c.len() == 2 && c.chars().all(|ch| ch.is_ascii_alphabetic());
                let numeric = c.len() == 3 && c.chars().all(|ch| ch.is_ascii_digit());
                if !alpha && !numeric {
                    return Err(invalid());
                }
                Some(c.to_ascii_uppercase())
            }
            None => None,
        };

        Ok(Self {
            language: language.to_ascii_lowercase(),
            country,
        })
    }

    /// Parse `it`, `it_IT`, `it-IT` or a POSIX locale such as `it_IT.UTF-8@euro`.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let base = trimmed
            .split(['.', '@'])
            .next()
            .unwrap_or_default();
        let mut parts = base.splitn(2, ['_', '-']);
        let language = parts.next().unwrap_or_default();
        let country = parts.next();

        Self::new(language, country).map_err(|_| ConfigError::InvalidLocale {
            input: input.to_string(),
        })
    }

    /// Detect a locale from `LC_ALL`, `LC_MESSAGES` and `LANG`.
    ///
    /// The first non-empty variable decides; `C`, `POSIX` and other
    /// unparseable values yield `None`.
    pub fn from_env(env: &dyn EnvLookup) -> Option<Self> {
        LOCALE_ENV_VARS
            .iter()
            .filter_map(|name| env.var(name))
            .find(|value| !value.trim().is_empty())
            .and_then(|value| Self::parse(&value).ok())
    }

    /// The locale of the running process, falling back to `en_US`.
    pub fn system() -> Self {
        Self::from_env(&ProcessEnv).unwrap_or_else(Self::fallback)
    }

    fn fallback() -> Self {
        Self {
            language: "en".to_string(),
            country: Some("US".to_string()),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    /// File-name suffix for the language alone, e.g. `_it`.
    pub fn language_suffix(&self) -> String {
        format!("_{}", self.language)
    }

    /// File-name suffix for language and country, e.g. `_it_IT`.
    pub fn country_suffix(&self) -> Option<String> {
        self.country
            .as_ref()
            .map(|country| format!("_{}_{}", self.language, country))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.country {
            Some(country) => write!(f, "{}_{}", self.language, country),
            None => write!(f, "{}", self.language),
        }
    }
}

impl FromStr for Locale {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// The requested locale together with the default locale it falls back to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSet {
    current: Option<Locale>,
    default: Locale,
}

impl LocaleSet {
    /// A requested locale equal to the default is treated as absent.
    pub fn new(requested: Option<Locale>, default: Locale) -> Self {
        let current = requested.filter(|locale| *locale != default);
        Self { current, default }
    }

    /// Only the default locale applies.
    pub fn default_only(default: Locale) -> Self {
        Self::new(None, default)
    }

    /// The requested locale, when it differs from the default.
    pub fn current(&self) -> Option<&Locale> {
        self.current.as_ref()
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }
}

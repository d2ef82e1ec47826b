//! Classification of fragment file names into (section, bucket) pairs.

use crate::format::Format;
use crate::locale::LocaleSet;
use crate::sequence::LocaleBucket;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Any name ending in `_xx` or `_xx_YY` looks localized, whichever locale it names.
static LOCALIZED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_[a-z]{2}(_[A-Z]{2})?$").expect("localized name pattern is valid")
});

/// A candidate file placed in one section and bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub path: PathBuf,
    pub format: Format,
    pub section: String,
    pub bucket: LocaleBucket,
}

impl Fragment {
    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Whether a base name carries a locale suffix.
pub fn is_localized(base_name: &str) -> bool {
    LOCALIZED_NAME.is_match(base_name)
}

/// Strip the format suffix, keeping everything before the last `.`.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    }
}

/// Place a base name into every (section, bucket) it belongs to.
///
/// Checks the current locale's `_lang_COUNTRY` and `_lang` suffixes (when a
/// current locale is active), then the default locale's, then whether the
/// name is unsuffixed. A name that looks localized but matches neither
/// locale yields nothing.
pub fn classify(base_name: &str, locales: &LocaleSet) -> Vec<(String, LocaleBucket)> {
    let mut placements = Vec::new();

    if let Some(current) = locales.current() {
        if let Some(suffix) = current.country_suffix()
            && let Some(section) = base_name.strip_suffix(suffix.as_str())
        {
            placements.push((section.to_string(), LocaleBucket::CurrentLanguageCountry));
        }
        if let Some(section) = base_name.strip_suffix(current.language_suffix().as_str()) {
            placements.push((section.to_string(), LocaleBucket::CurrentLanguage));
        }
    }

    let default = locales.default_locale();
    if let Some(suffix) = default.country_suffix()
        && let Some(section) = base_name.strip_suffix(suffix.as_str())
    {
        placements.push((section.to_string(), LocaleBucket::DefaultLanguageCountry));
    }
    if let Some(section) = base_name.strip_suffix(default.language_suffix().as_str()) {
        placements.push((section.to_string(), LocaleBucket::DefaultLanguage));
    }

    if !is_localized(base_name) {
        placements.push((base_name.to_string(), LocaleBucket::Base));
    }

    placements.retain(|(section, _)| !section.is_empty());
    placements
}

/// Classify one file, returning a fragment per placement.
///
/// Returns an empty list for unsupported extensions and for stale-locale names.
pub fn fragments_for(path: &Path, locales: &LocaleSet) -> Vec<Fragment> {
    let Some(format) = Format::from_path(path) else {
        return Vec::new();
    };
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Vec::new();
    };

    classify(base_name(file_name), locales)
        .into_iter()
        .map(|(section, bucket)| Fragment {
            path: path.to_path_buf(),
            format,
            section,
            bucket,
        })
        .collect()
}

//! Per-section fragment sequences.
//!
//! Scanning a directory chain yields, for every section name, five ordered
//! file lists, one per [`LocaleBucket`]. Within a bucket, fragments from the
//! directory nearest to the profile come first; inside one directory they are
//! ordered by base name, then by format declaration order.

use crate::error::{ConfigError, Result};
use crate::format::Format;
use crate::fragment::{self, Fragment};
use crate::locale::LocaleSet;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Locale precedence class of a fragment, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LocaleBucket {
    /// Requested locale, `_lang_COUNTRY` suffix
    CurrentLanguageCountry = 0,
    /// Requested locale, `_lang` suffix
    CurrentLanguage = 1,
    /// Default locale, `_lang_COUNTRY` suffix
    DefaultLanguageCountry = 2,
    /// Default locale, `_lang` suffix
    DefaultLanguage = 3,
    /// No locale suffix
    Base = 4,
}

impl LocaleBucket {
    /// All buckets in precedence order.
    pub const ALL: [LocaleBucket; 5] = [
        LocaleBucket::CurrentLanguageCountry,
        LocaleBucket::CurrentLanguage,
        LocaleBucket::DefaultLanguageCountry,
        LocaleBucket::DefaultLanguage,
        LocaleBucket::Base,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentLanguageCountry => "current-language-country",
            Self::CurrentLanguage => "current-language",
            Self::DefaultLanguageCountry => "default-language-country",
            Self::DefaultLanguage => "default-language",
            Self::Base => "base",
        }
    }
}

impl fmt::Display for LocaleBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The ordered fragment lists of one section, one per bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSequences {
    buckets: [Vec<Fragment>; 5],
}

impl FileSequences {
    /// Append a fragment to the end of its bucket.
    pub fn push(&mut self, fragment: Fragment) {
        self.buckets[fragment.bucket.index()].push(fragment);
    }

    pub fn bucket(&self, bucket: LocaleBucket) -> &[Fragment] {
        &self.buckets[bucket.index()]
    }

    /// Buckets in precedence order, empty ones included.
    pub fn iter(&self) -> impl Iterator<Item = (LocaleBucket, &[Fragment])> {
        LocaleBucket::ALL
            .into_iter()
            .map(move |bucket| (bucket, self.bucket(bucket)))
    }

    /// Total number of fragments across buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for FileSequences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (bucket, fragments) in self.iter() {
            if fragments.is_empty() {
                continue;
            }
            writeln!(f, "  {bucket}:")?;
            for fragment in fragments {
                writeln!(f, "    {}", fragment.path.display())?;
            }
        }
        Ok(())
    }
}

/// Section name to its fragment sequences, in section name order.
pub type SequenceMap = BTreeMap<String, FileSequences>;

/// Scan every directory of the chain and bucket its fragments per section.
///
/// `chain` must be ordered nearest-to-profile first.
pub fn scan_chain(chain: &[PathBuf], locales: &LocaleSet) -> Result<SequenceMap> {
    let mut map = SequenceMap::new();

    for dir in chain {
        let files = list_fragment_files(dir)?;
        debug!(dir = %dir.display(), files = files.len(), "Scanning directory");

        for path in files {
            let fragments = fragment::fragments_for(&path, locales);
            if fragments.is_empty() {
                debug!(
                    file = %path.display(),
                    "Skipping fragment whose locale suffix matches neither the requested nor the default locale"
                );
                continue;
            }
            for fragment in fragments {
                map.entry(fragment.section.clone())
                    .or_default()
                    .push(fragment);
            }
        }
    }

    Ok(map)
}

/// List regular files with a supported extension, ordered by base name then
/// format declaration order.
pub fn list_fragment_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::io(dir, e))?;

    let mut files: Vec<(String, Format, PathBuf)> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(format) = Format::from_path(&path) else {
            continue;
        };
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            debug!(file = %path.display(), "Skipping non UTF-8 file name");
            continue;
        };
        files.push((fragment::base_name(name).to_string(), format, path.clone()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));
    Ok(files.into_iter().map(|(_, _, path)| path).collect())
}

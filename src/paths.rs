//! Directory chain enumeration.
//!
//! The chain runs from the profile directory up to the root directory,
//! both inclusive. Paths are compared in canonical form so `root/.` and
//! `root/child/..` are both recognized as `root`.

use crate::error::{ConfigError, Result};
use std::path::{Component, Path, PathBuf};

/// Enumerate the directories from `profile_dir` up to `root_dir`, inclusive.
///
/// The first element is `profile_dir`, every following element is the
/// parent of the previous one, and the last element is `root_dir`.
/// Fails with [`ConfigError::InvalidHierarchy`] when `profile_dir` is
/// neither `root_dir` nor one of its descendants.
pub fn enumerate(profile_dir: &Path, root_dir: &Path) -> Result<Vec<PathBuf>> {
    let root = canonical(root_dir);
    let mut chain = Vec::new();
    let mut current = Some(canonical(profile_dir));

    while let Some(dir) = current {
        if dir == root {
            chain.push(dir);
            return Ok(chain);
        }
        current = dir.parent().map(Path::to_path_buf);
        chain.push(dir);
    }

    Err(ConfigError::invalid_hierarchy(profile_dir, root_dir))
}

/// Whether `parent` is `child` or one of its ancestors.
pub fn has_parent(child: &Path, parent: &Path) -> bool {
    let parent = canonical(parent);
    canonical(child).ancestors().any(|ancestor| ancestor == parent)
}

/// Canonical form of a path.
///
/// Uses the filesystem when the path exists (resolving symlinks), and
/// falls back to an absolute, lexically normalized path otherwise.
pub fn canonical(path: &Path) -> PathBuf {
    match std::fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(_) => {
            let absolute = if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join(path)
            };
            normalize_path_components(&absolute)
        }
    }
}

/// Normalize path components (resolve `.` and `..`) without touching the filesystem.
pub fn normalize_path_components(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => {
                // Windows drive prefix (e.g., C:)
                components.push(Component::Prefix(p));
            }
            Component::RootDir => {
                components.push(Component::RootDir);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                } else if !matches!(
                    components.last(),
                    Some(Component::RootDir) | Some(Component::Prefix(_))
                ) {
                    // Leading `..` of a relative path is kept
                    components.push(Component::ParentDir);
                }
            }
            Component::Normal(name) => {
                components.push(Component::Normal(name));
            }
        }
    }

    components.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tree() -> (TempDir, PathBuf, PathBuf, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let parent = temp.path().join("parent");
        let child_1 = parent.join("child_1");
        let child_1_1 = child_1.join("child_1_1");
        let child_2 = parent.join("child_2");
        std::fs::create_dir_all(&child_1_1).unwrap();
        std::fs::create_dir_all(&child_2).unwrap();
        (
            temp,
            canonical(&parent),
            canonical(&child_1),
            canonical(&child_1_1),
            canonical(&child_2),
        )
    }

    #[test]
    fn test_has_parent() {
        let (_temp, _parent, child_1, child_1_1, child_2) = tree();
        let child_1_1_1 = child_1_1.join("child_1_1_1");
        std::fs::create_dir_all(&child_1_1_1).unwrap();

        assert!(has_parent(&child_1_1_1, &child_1));
        assert!(has_parent(&child_1_1, &child_1));
        assert!(has_parent(&child_1, &child_1));
        assert!(!has_parent(&child_1_1_1, &child_2));
        assert!(!has_parent(&child_1_1, &child_2));
        assert!(!has_parent(&child_1, &child_2));
    }

    #[test]
    fn test_enumerate_chain() {
        let (_temp, parent, child_1, child_1_1, _child_2) = tree();

        assert_eq!(
            enumerate(&child_1_1, &parent).unwrap(),
            vec![child_1_1.clone(), child_1.clone(), parent.clone()]
        );
        assert_eq!(
            enumerate(&child_1, &parent).unwrap(),
            vec![child_1.clone(), parent.clone()]
        );
        assert_eq!(enumerate(&parent, &parent).unwrap(), vec![parent.clone()]);
    }

    #[test]
    fn test_enumerate_accepts_differently_spelled_paths() {
        let (_temp, parent, child_1, _child_1_1, _child_2) = tree();

        assert_eq!(enumerate(&parent.join("."), &parent).unwrap(), vec![parent.clone()]);
        assert_eq!(
            enumerate(&child_1, &child_1.join("..")).unwrap(),
            vec![child_1.clone(), parent.clone()]
        );
    }

    #[test]
    fn test_enumerate_consecutive_pairs_are_parent_child() {
        let (_temp, parent, _child_1, child_1_1, _child_2) = tree();
        let chain = enumerate(&child_1_1, &parent).unwrap();

        assert_eq!(chain.first(), Some(&child_1_1));
        assert_eq!(chain.last(), Some(&parent));
        for pair in chain.windows(2) {
            assert_eq!(pair[0].parent(), Some(pair[1].as_path()));
        }
    }

    #[test]
    fn test_enumerate_rejects_non_descendant() {
        let (_temp, _parent, child_1, _child_1_1, child_2) = tree();

        let err = enumerate(&child_1, &child_2).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHierarchy { .. }));
    }

    #[test]
    fn test_enumerate_rejects_ancestor_as_profile() {
        let (_temp, parent, child_1, _child_1_1, _child_2) = tree();
        assert!(enumerate(&parent, &child_1).is_err());
    }

    #[test]
    fn test_normalize_path_components() {
        assert_eq!(
            normalize_path_components(Path::new("/a/./b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(
            normalize_path_components(Path::new("/../a")),
            PathBuf::from("/a")
        );
        assert_eq!(
            normalize_path_components(Path::new("../a/b/..")),
            PathBuf::from("../a")
        );
    }
}

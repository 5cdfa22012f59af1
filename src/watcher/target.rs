//! The path being watched and its current real location.

use crate::error::{Result, WatchError};
use std::path::{Component, Path, PathBuf};

/// A watched path together with its resolved, symlink-free location.
///
/// The real path changes over the lifetime of a watch when the literal path
/// is a symlink that gets re-pointed. Only the most recently resolved value is
/// ever used for matching.
#[derive(Debug, Clone)]
pub struct WatchTarget {
    path: PathBuf,
    absolute: PathBuf,
    real_path: PathBuf,
}

impl WatchTarget {
    /// Resolve `path` through its symlinks.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::Resolve`] if the path does not exist or cannot be
    /// canonicalized.
    pub fn resolve(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let real_path = canonicalize(&path)?;
        let absolute = std::path::absolute(&path)
            .map(|p| clean(&p))
            .map_err(|source| WatchError::Resolve {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            absolute,
            real_path,
        })
    }

    /// Re-resolve the literal path, following a symlink that may have moved.
    ///
    /// Returns true if the real path changed.
    pub fn refresh(&mut self) -> Result<bool> {
        let real_path = canonicalize(&self.path)?;
        if real_path == self.real_path {
            return Ok(false);
        }
        self.real_path = real_path;
        Ok(true)
    }

    /// Whether an event on `path` concerns this target.
    pub fn matches(&self, path: &Path) -> bool {
        let path = clean(path);
        path == self.real_path || path == self.absolute || path == clean(&self.path)
    }

    /// The directory to subscribe to: the parent of the literal path.
    ///
    /// Symlink swaps and atomic renames only show up in the directory that
    /// holds the literal name, never in the directory of the resolved file.
    pub fn directory(&self) -> &Path {
        match self.absolute.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// The path as given by the caller.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The currently resolved real path.
    pub fn real_path(&self) -> &Path {
        &self.real_path
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|source| WatchError::Resolve {
        path: path.to_path_buf(),
        source,
    })
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component where there is one.
pub(crate) fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_clean() {
        assert_eq!(clean(Path::new("/cfg/./app.yaml")), PathBuf::from("/cfg/app.yaml"));
        assert_eq!(clean(Path::new("/cfg/x/../app.yaml")), PathBuf::from("/cfg/app.yaml"));
        assert_eq!(clean(Path::new("/../app.yaml")), PathBuf::from("/app.yaml"));
        assert_eq!(clean(Path::new("../app.yaml")), PathBuf::from("../app.yaml"));
        assert_eq!(clean(Path::new("./")), PathBuf::from("."));
    }

    #[test]
    fn test_resolve_missing_file() {
        let result = WatchTarget::resolve("/nonexistent/config.yaml");
        assert!(matches!(result, Err(WatchError::Resolve { .. })));
    }

    #[test]
    fn test_matches_literal_and_real() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");
        fs::write(&config_path, "port: 8080").unwrap();

        let target = WatchTarget::resolve(&config_path).unwrap();
        assert!(target.matches(&config_path));
        assert!(target.matches(target.real_path()));
        assert!(!target.matches(&temp_dir.path().join("other.yaml")));
        assert_eq!(target.directory(), clean(temp_dir.path()));
    }

    #[cfg(unix)]
    #[test]
    fn test_refresh_follows_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().canonicalize().unwrap();
        let a = dir.join("a.yaml");
        let b = dir.join("b.yaml");
        let link = dir.join("config.yaml");
        fs::write(&a, "port: 1").unwrap();
        fs::write(&b, "port: 2").unwrap();
        std::os::unix::fs::symlink(&a, &link).unwrap();

        let mut target = WatchTarget::resolve(&link).unwrap();
        assert_eq!(target.real_path(), a.as_path());
        assert!(!target.matches(&b));

        fs::remove_file(&link).unwrap();
        std::os::unix::fs::symlink(&b, &link).unwrap();

        assert!(target.refresh().unwrap());
        assert_eq!(target.real_path(), b.as_path());
        assert!(target.matches(&b));
        assert!(!target.matches(&a));
        assert!(!target.refresh().unwrap());
    }
}

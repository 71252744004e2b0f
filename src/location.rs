//! Resource locations
//!
//! A location is a root under which assets are looked up. Two kinds exist:
//! - [`FileSystemLocation`]: a directory on disk
//! - [`EmbeddedLocation`]: a packaged, in-memory resource tree
//!
//! Deriving a relative location can fail with an I/O error, which is distinct
//! from the derived location simply not existing.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

pub trait ResourceLocation: Clone + Debug + Send + Sync {
    /// Whether anything exists at this location.
    fn exists(&self) -> bool;

    /// Whether this location is a servable resource rather than a directory.
    fn is_readable(&self) -> bool {
        self.exists()
    }

    /// Derive a location for `relative`, treating `self` as a directory.
    fn create_relative(&self, relative: &str) -> io::Result<Self>;

    /// Human-readable name used in logs and errors.
    fn description(&self) -> String;
}

/// Reject relative paths that could escape or alias the location they are applied to.
///
/// An empty path names the location itself. Otherwise every segment must be a
/// plain name: no `.`, `..` or empty segments, though one trailing `/` is allowed.
pub(crate) fn validate_relative(relative: &str) -> io::Result<()> {
    if relative.contains('\0') {
        return Err(invalid_relative(relative, "contains a NUL byte"));
    }

    if relative.starts_with('/') || relative.starts_with('\\') {
        return Err(invalid_relative(relative, "is absolute"));
    }

    if relative.is_empty() {
        return Ok(());
    }

    let segments = relative.strip_suffix(['/', '\\']).unwrap_or(relative);
    for segment in segments.split(['/', '\\']) {
        match segment {
            ".." => return Err(invalid_relative(relative, "contains a parent reference")),
            "." => return Err(invalid_relative(relative, "contains a current-directory reference")),
            "" => return Err(invalid_relative(relative, "contains an empty segment")),
            _ => {}
        }
    }

    Ok(())
}

fn invalid_relative(relative: &str, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("relative path {relative:?} {reason}"),
    )
}

/// A directory on the local filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSystemLocation {
    path: PathBuf,
}

impl FileSystemLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResourceLocation for FileSystemLocation {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn is_readable(&self) -> bool {
        self.path.is_file()
    }

    fn create_relative(&self, relative: &str) -> io::Result<Self> {
        validate_relative(relative)?;

        let mut child = self.path.clone();
        for component in Path::new(relative).components() {
            if let Component::Normal(part) = component {
                child.push(part);
            }
        }

        // Missing is fine; any other failure to inspect the child is not.
        if let Err(err) = fs::symlink_metadata(&child) {
            match err.kind() {
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory => {}
                _ => return Err(err),
            }
        }

        Ok(Self { path: child })
    }

    fn description(&self) -> String {
        format!("file [{}]", self.path.display())
    }
}

/// A location inside a packaged resource tree.
///
/// Entries are keyed by `/`-separated paths such as `static/fr/index.html`;
/// directories exist implicitly when some entry lives beneath them.
#[derive(Debug, Clone)]
pub struct EmbeddedLocation {
    entries: Arc<BTreeMap<String, Vec<u8>>>,
    path: String,
}

impl EmbeddedLocation {
    pub fn new<I, K, V>(entries: I, root: &str) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Vec<u8>>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();

        Self {
            entries: Arc::new(entries),
            path: root.to_string(),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bytes of the resource, if this location names one.
    pub fn contents(&self) -> Option<&[u8]> {
        self.entries.get(&self.path).map(Vec::as_slice)
    }

    fn directory_prefix(&self) -> String {
        if self.path.is_empty() || self.path.ends_with('/') {
            self.path.clone()
        } else {
            format!("{}/", self.path)
        }
    }
}

impl PartialEq for EmbeddedLocation {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries) && self.path == other.path
    }
}

impl ResourceLocation for EmbeddedLocation {
    fn exists(&self) -> bool {
        if self.entries.contains_key(&self.path) {
            return true;
        }
        let prefix = self.directory_prefix();
        self.entries
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(key, _)| key.starts_with(&prefix))
    }

    fn is_readable(&self) -> bool {
        self.entries.contains_key(&self.path)
    }

    fn create_relative(&self, relative: &str) -> io::Result<Self> {
        validate_relative(relative)?;

        Ok(Self {
            entries: Arc::clone(&self.entries),
            path: format!("{}{}", self.directory_prefix(), relative),
        })
    }

    fn description(&self) -> String {
        format!("embedded resource [{}]", self.path)
    }
}

//! Dataset locators: local paths, `file://` URIs, and rejected remote schemes.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{LoadError, Result};

/// Schemes recognised as remote (never opened).
const REMOTE_SCHEMES: &[&str] = &["root", "xroot", "http", "https", "s3", "gs"];

/// On-disk format, inferred from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetFormat {
    /// Apache Parquet (`.parquet`, `.pq`).
    Parquet,
    /// ROOT TTree (`.root`).
    Root,
}

impl DatasetFormat {
    /// Format for `path`, by extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref()
        {
            Some("parquet") | Some("pq") => Ok(Self::Parquet),
            Some("root") => Ok(Self::Root),
            _ => Err(LoadError::UnsupportedFormat(format!(
                "cannot infer format of '{}' (expected .parquet, .pq or .root)",
                path.display()
            ))),
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parquet => f.write_str("parquet"),
            Self::Root => f.write_str("root"),
        }
    }
}

/// Where a dataset lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetLocator {
    /// A file on the local file system.
    Local(PathBuf),
    /// A remote URI (`root://`, `https://`, ...). Recognised but not opened.
    Remote {
        /// URI scheme, lower-cased.
        scheme: String,
        /// Full URI as given.
        uri: String,
    },
}

impl DatasetLocator {
    /// Parse a plain path or a `scheme://` URI.
    pub fn parse(s: &str) -> Self {
        let Some((scheme, rest)) = s.split_once("://") else {
            return Self::Local(PathBuf::from(s));
        };
        let scheme = scheme.to_ascii_lowercase();
        if scheme == "file" {
            return Self::Local(PathBuf::from(rest));
        }
        if !REMOTE_SCHEMES.contains(&scheme.as_str()) {
            tracing::debug!(scheme = %scheme, "unknown locator scheme, treating as remote");
        }
        Self::Remote { scheme, uri: s.to_string() }
    }

    /// `true` for remote locators.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// The local path, or [`LoadError::UnsupportedLocator`] for remote URIs.
    pub fn local_path(&self) -> Result<&Path> {
        match self {
            Self::Local(p) => Ok(p),
            Self::Remote { uri, .. } => Err(LoadError::UnsupportedLocator(uri.clone())),
        }
    }
}

impl fmt::Display for DatasetLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(p) => write!(f, "{}", p.display()),
            Self::Remote { uri, .. } => f.write_str(uri),
        }
    }
}

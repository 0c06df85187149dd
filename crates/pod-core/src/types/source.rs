//! Source locators.
//!
//! A `SourceReference` says where a package's source tree comes from. The
//! installer never interprets it; it is handed to a downloader as-is.

use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Where a package's source is fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceReference {
    /// Source-control checkout
    Git { url: Url, revision: GitRevision },
    /// Archive download
    Http { url: Url },
    /// Local directory or archive, already resolved to an absolute path
    Path { path: PathBuf },
}

/// Revision selector for git sources
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitRevision {
    Tag(String),
    Branch(String),
    Commit(String),
    /// Default branch
    Head,
}

impl SourceReference {
    /// Create a git source, validating the URL
    pub fn git(url: &str, revision: GitRevision) -> Result<Self, url::ParseError> {
        Ok(SourceReference::Git {
            url: Url::parse(url)?,
            revision,
        })
    }

    /// Create an archive source, validating the URL
    pub fn http(url: &str) -> Result<Self, url::ParseError> {
        Ok(SourceReference::Http {
            url: Url::parse(url)?,
        })
    }

    /// Create a local source; relative paths are resolved against `base`
    pub fn path(path: impl AsRef<Path>, base: Option<&Path>) -> Self {
        let path = path.as_ref();
        let path = match base {
            Some(base) if path.is_relative() => {
                crate::utils::normalize_path(&base.join(path))
            }
            _ => path.to_path_buf(),
        };
        SourceReference::Path { path }
    }

    /// Local path if this is a path source
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            SourceReference::Path { path } => Some(path),
            _ => None,
        }
    }

    /// Transport name used in log and error messages
    pub fn scheme(&self) -> &'static str {
        match self {
            SourceReference::Git { .. } => "git",
            SourceReference::Http { .. } => "http",
            SourceReference::Path { .. } => "path",
        }
    }
}

impl fmt::Display for GitRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(t) => write!(f, "tag:{t}"),
            Self::Branch(b) => write!(f, "branch:{b}"),
            Self::Commit(c) => write!(f, "commit:{c}"),
            Self::Head => write!(f, "HEAD"),
        }
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Git { url, revision } => write!(f, "git:{url}#{revision}"),
            Self::Http { url } => write!(f, "http:{url}"),
            Self::Path { path } => write!(f, "path:{}", path.display()),
        }
    }
}

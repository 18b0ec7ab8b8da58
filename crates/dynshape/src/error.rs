// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for catalog building, shape building and projection.

use std::error::Error;
use std::fmt;

/// Convenience result alias used across the crate.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Boxed error returned by an embed fetch callback.
pub type FetchError = Box<dyn Error + Send + Sync>;

/// Errors reported by the formatter.
///
/// All variants surface synchronously from a `format` call; nothing is
/// retried internally, and build failures are never cached.
#[derive(Debug)]
pub enum FormatError {
    /// The value to be projected does not serialize to a JSON object.
    NotARecord(String),
    /// A requested path names no field in the relevant catalog.
    UnknownField(String),
    /// A requested embed name was never registered.
    UnknownEmbed(String),
    /// The same full path was requested more than once.
    DuplicateField(String),
    /// An embed fetch callback failed; the cause is propagated verbatim.
    EmbedFetchFailed { name: String, source: FetchError },
    /// The source value could not be serialized.
    Serialize(serde_json::Error),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotARecord(name) => write!(f, "{} is not a record type", name),
            Self::UnknownField(path) => write!(f, "no field {} found", path),
            Self::UnknownEmbed(name) => write!(f, "embed {} was not registered", name),
            Self::DuplicateField(path) => write!(f, "field {} requested more than once", path),
            Self::EmbedFetchFailed { name, source } => {
                write!(f, "embed {} fetch failed: {}", name, source)
            }
            Self::Serialize(err) => write!(f, "source value serialization failed: {}", err),
        }
    }
}

impl Error for FormatError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmbedFetchFailed { source, .. } => Some(source.as_ref()),
            Self::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FormatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            FormatError::UnknownField("foo.bar".to_string()).to_string(),
            "no field foo.bar found"
        );
        assert_eq!(
            FormatError::UnknownEmbed("author".to_string()).to_string(),
            "embed author was not registered"
        );
        assert_eq!(
            FormatError::DuplicateField("foo".to_string()).to_string(),
            "field foo requested more than once"
        );
    }

    #[test]
    fn test_fetch_failure_source() {
        let err = FormatError::EmbedFetchFailed {
            name: "author".to_string(),
            source: "no such id".into(),
        };
        assert!(err.to_string().contains("no such id"));
        assert!(err.source().is_some());
    }
}

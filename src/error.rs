//! Error types for preload resolution.
//!
//! The resolver distinguishes two failure classes: fatal errors that abort a
//! resolution immediately (store failures, identity-map misses) and per-field
//! assignment errors that are collected while the pass completes and surfaced
//! once at the end.

use std::error::Error as StdError;
use std::fmt;

/// Failure while clearing or assigning a relationship field on an instance.
///
/// These are collected, not fatal: a single incompatible owner does not stop
/// the rest of the owner set from being populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the relationship field (or column) that rejected the value.
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot assign relation field `{}`: {}", self.field, self.message)
    }
}

impl StdError for FieldError {}

/// Failure raised by a query collaborator while fetching or materializing rows.
#[derive(Debug)]
pub enum QueryError {
    /// The underlying store reported an error.
    Backend(Box<dyn StdError + Send + Sync>),
    /// A fetched row could not be converted into the target model type.
    Decode(String),
    /// A nested preload attached to the query failed while hydrating results.
    Nested(Box<PreloadError>),
}

impl QueryError {
    pub fn backend(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self::Backend(err.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(err) => write!(f, "query failed: {err}"),
            Self::Decode(message) => write!(f, "row decode error: {message}"),
            Self::Nested(err) => write!(f, "nested preload failed: {err}"),
        }
    }
}

impl StdError for QueryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Backend(err) => Some(err.as_ref()),
            Self::Decode(_) => None,
            Self::Nested(err) => Some(err.as_ref()),
        }
    }
}

/// Terminal outcome of a failed preload resolution.
#[derive(Debug)]
pub enum PreloadError {
    /// The join-table or relation query failed; propagated untouched.
    Query(QueryError),
    /// A result row's key tuple matched nothing in the identity map. This is
    /// a data-integrity violation (dangling foreign key or wrong reference
    /// declaration), never retried and never silently dropped.
    Integrity {
        /// Debug representation of the offending row.
        row: String,
    },
    /// One or more relationship-field assignments failed. The pass ran to
    /// completion; every error is reported here.
    Assignment(Vec<FieldError>),
}

impl PreloadError {
    pub(crate) fn integrity<R: fmt::Debug>(row: &R) -> Self {
        Self::Integrity {
            row: format!("{row:?}"),
        }
    }
}

impl fmt::Display for PreloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(err) => write!(f, "{err}"),
            Self::Integrity { row } => {
                write!(f, "failed to assign association {row}, make sure foreign fields exist")
            }
            Self::Assignment(errors) => {
                write!(f, "{} relation field assignment(s) failed: ", errors.len())?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{err}")?;
                }
                Ok(())
            }
        }
    }
}

impl StdError for PreloadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueryError> for PreloadError {
    fn from(err: QueryError) -> Self {
        Self::Query(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrity_display_names_the_row() {
        let err = PreloadError::Integrity {
            row: "Tag { id: 9 }".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("Tag { id: 9 }"));
        assert!(text.contains("make sure foreign fields exist"));
    }

    #[test]
    fn test_assignment_display_joins_all_errors() {
        let err = PreloadError::Assignment(vec![
            FieldError::new("tags", "type mismatch"),
            FieldError::new("tags", "read-only"),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("2 relation field assignment(s) failed"));
        assert!(text.contains("type mismatch"));
        assert!(text.contains("read-only"));
    }

    #[test]
    fn test_query_error_source_chain() {
        let err = QueryError::backend("connection reset");
        assert!(StdError::source(&err).is_some());
        let wrapped = PreloadError::from(err);
        assert!(matches!(wrapped, PreloadError::Query(_)));
    }
}

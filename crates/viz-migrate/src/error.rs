//! Error types for migrations
//!
//! Provides error handling for:
//! - Version chains with missing links
//! - Documents that do not match the shape their version promises
//! - Identity lookups failing mid-migration

use viz_model::SchemaVersion;

/// Errors raised while migrating a persisted document
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// No forward path from the document's version
    #[error("cannot load this configuration: no {table} migration from version {from}")]
    Gap {
        /// Table that was walked
        table: &'static str,
        /// Version without outgoing migration
        from: SchemaVersion,
    },

    /// Version tag present but unreadable
    #[error("invalid version tag: {0}")]
    InvalidVersion(String),

    /// Document does not have the shape its version implies
    #[error("malformed {table} document at version {version}: {reason}")]
    Malformed {
        /// Table that was walked
        table: &'static str,
        /// Version being migrated from
        version: SchemaVersion,
        /// What was wrong
        reason: String,
    },

    /// Identity lookup failed
    #[error("identity resolution failed: {0}")]
    Resolver(#[from] ResolverError),

    /// Fully migrated document does not match the current schema
    #[error("migrated document does not match the current schema: {0}")]
    Deserialize(#[from] serde_json::Error),

    /// Migration table fails its completeness check
    #[error("incomplete {table} migration table: {detail}")]
    IncompleteTable {
        /// Table name
        table: &'static str,
        /// First violation found
        detail: String,
    },
}

impl MigrationError {
    /// Build a malformed-document error
    pub fn malformed(table: &'static str, version: SchemaVersion, reason: impl Into<String>) -> Self {
        Self::Malformed {
            table,
            version,
            reason: reason.into(),
        }
    }

    /// Whether the error comes from the chain itself rather than the input
    #[inline]
    #[must_use]
    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Gap { .. } | Self::IncompleteTable { .. })
    }
}

/// Errors raised by an identity resolver
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolverError {
    /// Lookup service unreachable
    #[error("identity service unavailable: {0}")]
    Unavailable(String),

    /// Unknown cube
    #[error("unknown cube: {0}")]
    NotFound(String),
}

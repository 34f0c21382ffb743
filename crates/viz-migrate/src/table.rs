//! Ordered migration tables and the driver walking them
//!
//! A [`MigrationTable`] is an ordered list of point migrations, each accepting
//! exactly one version and producing the next. The table is checked for
//! completeness when it is built, so a document can only fail to migrate
//! because its own version is unknown.

use crate::context::MigrationContext;
use crate::error::MigrationError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;
use viz_model::SchemaVersion;

/// Signature of a synchronous migration step
pub type StepFn = fn(Value, &MigrationContext) -> Result<Value, MigrationError>;

/// One point migration `from -> to`
#[async_trait]
pub trait Migration: Send + Sync {
    /// Version accepted
    fn from_version(&self) -> SchemaVersion;

    /// Version produced
    fn to_version(&self) -> SchemaVersion;

    /// Transform a document from [`Self::from_version`] to [`Self::to_version`]
    ///
    /// The driver rewrites the `version` tag afterwards.
    async fn up(&self, doc: Value, ctx: &MigrationContext) -> Result<Value, MigrationError>;
}

/// Migration implemented by a plain function
#[derive(Clone, Copy)]
pub struct SyncStep {
    from: SchemaVersion,
    to: SchemaVersion,
    apply: StepFn,
}

impl std::fmt::Debug for SyncStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncStep")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

impl SyncStep {
    /// Step `from -> to` applying `apply`
    #[inline]
    #[must_use]
    pub const fn new(from: SchemaVersion, to: SchemaVersion, apply: StepFn) -> Self {
        Self { from, to, apply }
    }
}

#[async_trait]
impl Migration for SyncStep {
    fn from_version(&self) -> SchemaVersion {
        self.from
    }

    fn to_version(&self) -> SchemaVersion {
        self.to
    }

    async fn up(&self, doc: Value, ctx: &MigrationContext) -> Result<Value, MigrationError> {
        (self.apply)(doc, ctx)
    }
}

/// Totally ordered chain of migrations ending at `latest`
pub struct MigrationTable {
    name: &'static str,
    latest: SchemaVersion,
    steps: Vec<Box<dyn Migration>>,
}

impl std::fmt::Debug for MigrationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationTable")
            .field("name", &self.name)
            .field("latest", &self.latest)
            .field("versions", &self.versions())
            .finish()
    }
}

impl MigrationTable {
    /// Build a table, checking that it is contiguous, strictly increasing
    /// and ends at `latest`
    pub fn new(
        name: &'static str,
        latest: SchemaVersion,
        steps: Vec<Box<dyn Migration>>,
    ) -> Result<Self, MigrationError> {
        let incomplete = |detail: String| MigrationError::IncompleteTable {
            table: name,
            detail,
        };

        for step in &steps {
            if step.from_version() >= step.to_version() {
                return Err(incomplete(format!(
                    "step {} -> {} does not move forward",
                    step.from_version(),
                    step.to_version()
                )));
            }
        }
        for pair in steps.windows(2) {
            if pair[0].to_version() != pair[1].from_version() {
                return Err(incomplete(format!(
                    "no step from {} (next step starts at {})",
                    pair[0].to_version(),
                    pair[1].from_version()
                )));
            }
        }
        match steps.last() {
            Some(last) if last.to_version() != latest => {
                return Err(incomplete(format!(
                    "chain ends at {} instead of {latest}",
                    last.to_version()
                )));
            }
            _ => {}
        }

        Ok(Self {
            name,
            latest,
            steps,
        })
    }

    /// Table name used in errors and logs
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Latest version of the table
    #[inline]
    #[must_use]
    pub fn latest(&self) -> SchemaVersion {
        self.latest
    }

    /// Every version a document can be at, oldest first
    #[must_use]
    pub fn versions(&self) -> Vec<SchemaVersion> {
        let mut versions: Vec<SchemaVersion> =
            self.steps.iter().map(|s| s.from_version()).collect();
        versions.push(self.latest);
        versions
    }

    /// Bring `doc` to the latest version, applying every intermediate step
    pub async fn migrate(
        &self,
        mut doc: Value,
        ctx: &MigrationContext,
    ) -> Result<Value, MigrationError> {
        let mut version = read_version(&doc)?;
        if version == self.latest {
            write_version(&mut doc, version, self.name)?;
            return Ok(doc);
        }

        let start = self
            .steps
            .iter()
            .position(|s| s.from_version() == version)
            .ok_or(MigrationError::Gap {
                table: self.name,
                from: version,
            })?;

        for step in &self.steps[start..] {
            doc = step.up(doc, ctx).await?;
            version = step.to_version();
            write_version(&mut doc, version, self.name)?;
            debug!(
                table = self.name,
                from = %step.from_version(),
                to = %version,
                "Applied migration step"
            );
        }

        Ok(doc)
    }
}

/// Declared version of a document; absent means [`SchemaVersion::UNVERSIONED`]
pub fn read_version(doc: &Value) -> Result<SchemaVersion, MigrationError> {
    match doc.get("version") {
        None | Some(Value::Null) => Ok(SchemaVersion::UNVERSIONED),
        Some(Value::String(raw)) => raw
            .parse()
            .map_err(|_| MigrationError::InvalidVersion(raw.clone())),
        Some(other) => Err(MigrationError::InvalidVersion(other.to_string())),
    }
}

fn write_version(
    doc: &mut Value,
    version: SchemaVersion,
    table: &'static str,
) -> Result<(), MigrationError> {
    as_object(doc, table, version)?.insert("version".to_string(), Value::String(version.to_string()));
    Ok(())
}

/// Document as a JSON object, or a malformed-document error
pub(crate) fn as_object<'a>(
    doc: &'a mut Value,
    table: &'static str,
    version: SchemaVersion,
) -> Result<&'a mut Map<String, Value>, MigrationError> {
    doc.as_object_mut()
        .ok_or_else(|| MigrationError::malformed(table, version, "document is not an object"))
}

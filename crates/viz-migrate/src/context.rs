//! Collaborators available to migration steps

use crate::resolver::{IdentityResolver, PassthroughResolver};
use std::sync::Arc;
use viz_model::DataSource;

/// Data source assumed for states persisted before the field existed
pub const DEFAULT_DATA_SOURCE_URL: &str = "https://lindas.admin.ch/query";

/// External facts a migration may need
#[derive(Clone)]
pub struct MigrationContext {
    /// Canonical identity lookup
    pub resolver: Arc<dyn IdentityResolver>,
    /// Fallback data source
    pub default_data_source: DataSource,
}

impl MigrationContext {
    /// Context using `resolver`
    #[must_use]
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self {
            resolver,
            default_data_source: DataSource::sparql(DEFAULT_DATA_SOURCE_URL),
        }
    }

    /// With a fallback data source
    #[inline]
    #[must_use]
    pub fn with_default_data_source(mut self, data_source: DataSource) -> Self {
        self.default_data_source = data_source;
        self
    }
}

impl Default for MigrationContext {
    fn default() -> Self {
        Self::new(Arc::new(PassthroughResolver))
    }
}

impl std::fmt::Debug for MigrationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationContext")
            .field("default_data_source", &self.default_data_source)
            .finish_non_exhaustive()
    }
}

//! Record source interfaces.
//!
//! Ownership model:
//! - `RecordSource` is the pipeline-facing adapter seam. Network and scraping
//!   adapters live outside this crate and implement it.
//! - `InMemorySource` serves prebuilt records (tests, fixtures, glue code).
//! - `sources::manual_list::ManualListSource` serves curated JSON lists.

use std::sync::Arc;

use crate::data::RawRecord;
use crate::errors::DigestError;
use crate::types::{PlatformName, SourceId};

/// Built-in source implementations.
pub mod sources;

pub use sources::manual_list::{ManualListConfig, ManualListSource};

/// Pipeline-facing producer of raw records.
///
/// `fetch` is called once per pipeline run. An `Err` is contained by the
/// pipeline: it is logged and the source contributes no records to that run.
pub trait RecordSource: Send + Sync {
    /// Stable source identifier used in stats, logs and derived ids.
    fn id(&self) -> &str;

    /// Platform name applied to records that do not carry one.
    fn platform(&self) -> &str;

    /// Produce this run's raw records.
    fn fetch(&self) -> Result<Vec<RawRecord>, DigestError>;
}

/// In-memory record source for tests and small fixed datasets.
pub struct InMemorySource {
    id: SourceId,
    platform: PlatformName,
    records: Arc<Vec<RawRecord>>,
}

impl InMemorySource {
    /// Create an in-memory source from prebuilt records.
    pub fn new(
        id: impl Into<SourceId>,
        platform: impl Into<PlatformName>,
        records: Vec<RawRecord>,
    ) -> Self {
        Self {
            id: id.into(),
            platform: platform.into(),
            records: Arc::new(records),
        }
    }
}

impl RecordSource for InMemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn platform(&self) -> &str {
        &self.platform
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, DigestError> {
        Ok(self.records.as_ref().clone())
    }
}

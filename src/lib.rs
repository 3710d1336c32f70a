#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Command-line runner.
pub mod cli;
/// Keyword decision-list classifier and built-in taxonomies.
pub mod classifier;
/// Magnitude coercion.
pub mod coerce;
/// Pipeline and file configuration types.
pub mod config;
/// Centralized constants used by scoring, classification and the pipeline.
pub mod constants;
/// Raw and canonical record types.
pub mod data;
/// Identity-based deduplication.
pub mod dedup;
/// JSON export.
pub mod export;
mod hash;
/// Aggregate metrics helpers.
pub mod metrics;
/// Pipeline driver.
pub mod pipeline;
/// Ranking aggregation and the `Digest` result.
pub mod ranking;
/// Community, discussion and hashtag scoring.
pub mod scoring;
/// Record source traits and built-in sources.
pub mod source;
/// Defensive timestamp parsing.
pub mod timestamps;
/// Shared type aliases.
pub mod types;
/// Text normalization helpers.
pub mod utils;

mod errors;

pub use classifier::{CategoryRule, Taxonomy};
pub use coerce::{Coerced, DefaultReason, Magnitude, coerce, coerce_detailed};
pub use config::{DigestConfig, PipelineConfig, RankingKey, RecordFields, Workflow};
pub use data::{CanonicalItem, RawRecord};
pub use dedup::Deduplicator;
pub use errors::DigestError;
pub use pipeline::{Pipeline, SourceReport, SourceRunStats};
pub use ranking::{CategoryGroup, Digest, Totals};
pub use scoring::{
    CommunityWeights, DiscussionSignals, HashtagEngagement, HashtagRating, HashtagSample,
    hashtag_engagement, score_community, score_discussion,
};
pub use source::{InMemorySource, ManualListConfig, ManualListSource, RecordSource};
pub use types::{CategoryLabel, FieldName, ItemId, Keyword, PlatformName, SourceId};

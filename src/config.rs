use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::classifier::Taxonomy;
use crate::constants::{fields, pipeline};
use crate::errors::DigestError;
use crate::scoring::CommunityWeights;
use crate::source::{ManualListConfig, ManualListSource, RecordSource};
use crate::types::FieldName;

/// Which aggregation workflow a run performs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// Community directory: size/recency/quality score, ranked by audience size.
    #[default]
    Communities,
    /// Discussion feed: interaction-signal score, ranked by engagement.
    Discussions,
}

impl Workflow {
    /// Ranking key used when none is configured explicitly.
    pub fn default_ranking(self) -> RankingKey {
        match self {
            Workflow::Communities => RankingKey::NumericMetric,
            Workflow::Discussions => RankingKey::EngagementScore,
        }
    }

    /// Built-in taxonomy for this workflow.
    pub fn default_taxonomy(self) -> Taxonomy {
        match self {
            Workflow::Communities => Taxonomy::communities(),
            Workflow::Discussions => Taxonomy::discussions(),
        }
    }
}

/// Field that orders ranked views (always descending, ties keep arrival order).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingKey {
    /// Workflow-specific engagement score.
    EngagementScore,
    /// Coerced audience size or magnitude.
    NumericMetric,
}

/// Raw-record key names per concept. Candidate lists are tried in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordFields {
    /// Unique id; records without one fall back to a url-derived id.
    pub id: FieldName,
    /// Platform override; defaults to the source's platform.
    pub platform: FieldName,
    /// Source name override; defaults to the source id.
    pub source: FieldName,
    /// Display title, also fed to the classifier.
    pub title: FieldName,
    /// Body text candidates.
    pub content: Vec<FieldName>,
    /// Canonical link.
    pub url: FieldName,
    /// Author or owner name.
    pub author: FieldName,
    /// Magnitude candidates (member/subscriber/follower counts).
    pub metric: Vec<FieldName>,
    /// Creation timestamp candidates for `created_at`.
    pub created_at: Vec<FieldName>,
    /// Timestamp chain used by discussion recency.
    pub discussion_timestamps: Vec<FieldName>,
    /// Quality prior for community scoring.
    pub base_quality: FieldName,
    /// Curated category hint honoured when it names a known label.
    pub category_hint: FieldName,
    /// Discussion signal: votes or score.
    pub signal_score: FieldName,
    /// Discussion signal: comment count.
    pub signal_comments: FieldName,
    /// Discussion signal: reply count.
    pub signal_replies: FieldName,
    /// Discussion signal: view count.
    pub signal_views: FieldName,
    /// Discussion signal: like count.
    pub signal_likes: FieldName,
}

fn owned<const N: usize>(names: [&str; N]) -> Vec<FieldName> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for RecordFields {
    fn default() -> Self {
        Self {
            id: fields::ID.into(),
            platform: fields::PLATFORM.into(),
            source: fields::SOURCE.into(),
            title: fields::TITLE.into(),
            content: owned(fields::CONTENT),
            url: fields::URL.into(),
            author: fields::AUTHOR.into(),
            metric: owned(fields::METRIC),
            created_at: owned(fields::CREATED_AT),
            discussion_timestamps: owned(fields::DISCUSSION_TIMESTAMPS),
            base_quality: fields::BASE_QUALITY.into(),
            category_hint: fields::CATEGORY.into(),
            signal_score: fields::SIGNAL_SCORE.into(),
            signal_comments: fields::SIGNAL_COMMENTS.into(),
            signal_replies: fields::SIGNAL_REPLIES.into(),
            signal_views: fields::SIGNAL_VIEWS.into(),
            signal_likes: fields::SIGNAL_LIKES.into(),
        }
    }
}

/// Runtime configuration of a pipeline.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Scoring strategy and default ranking/taxonomy.
    pub workflow: Workflow,
    /// Explicit ranking key; `None` uses the workflow default.
    pub ranking: Option<RankingKey>,
    /// Community score weights.
    pub weights: CommunityWeights,
    /// Explicit taxonomy; `None` uses the workflow preset.
    pub taxonomy: Option<Taxonomy>,
    /// Raw-record key names.
    pub fields: RecordFields,
    /// Upper bound on sources fetched at the same time.
    pub max_concurrent_sources: usize,
    /// Pause between fetch waves.
    pub source_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workflow: Workflow::default(),
            ranking: None,
            weights: CommunityWeights::default(),
            taxonomy: None,
            fields: RecordFields::default(),
            max_concurrent_sources: pipeline::DEFAULT_MAX_CONCURRENT_SOURCES,
            source_delay: Duration::ZERO,
        }
    }
}

impl PipelineConfig {
    /// Config for a workflow with all other settings at their defaults.
    pub fn for_workflow(workflow: Workflow) -> Self {
        Self {
            workflow,
            ..Self::default()
        }
    }

    /// Override the ranking key.
    pub fn with_ranking(mut self, ranking: RankingKey) -> Self {
        self.ranking = Some(ranking);
        self
    }

    /// Override community weights.
    pub fn with_weights(mut self, weights: CommunityWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Override the taxonomy.
    pub fn with_taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.taxonomy = Some(taxonomy);
        self
    }

    /// Override raw-record key names.
    pub fn with_fields(mut self, fields: RecordFields) -> Self {
        self.fields = fields;
        self
    }

    /// Override the concurrent fetch bound.
    pub fn with_max_concurrent_sources(mut self, max: usize) -> Self {
        self.max_concurrent_sources = max;
        self
    }

    /// Override the pause between fetch waves.
    pub fn with_source_delay(mut self, delay: Duration) -> Self {
        self.source_delay = delay;
        self
    }

    /// Effective ranking key.
    pub fn ranking_key(&self) -> RankingKey {
        self.ranking
            .unwrap_or_else(|| self.workflow.default_ranking())
    }

    /// Effective taxonomy.
    pub fn resolved_taxonomy(&self) -> Taxonomy {
        self.taxonomy
            .clone()
            .unwrap_or_else(|| self.workflow.default_taxonomy())
    }

    /// Check invariants that scoring and the fetch loop rely on.
    pub fn validate(&self) -> Result<(), DigestError> {
        self.weights.validate()?;
        if self.max_concurrent_sources == 0 {
            return Err(DigestError::Configuration(
                "max_concurrent_sources must be at least 1".into(),
            ));
        }
        let empty_fallback = self
            .taxonomy
            .as_ref()
            .is_some_and(|taxonomy| taxonomy.fallback().trim().is_empty());
        if empty_fallback {
            return Err(DigestError::Configuration(
                "taxonomy fallback label must not be empty".into(),
            ));
        }
        if self.fields.id.trim().is_empty() {
            return Err(DigestError::Configuration(
                "the record id field name must not be blank".into(),
            ));
        }
        Ok(())
    }
}

/// File-backed configuration: pipeline settings plus curated list sources.
///
/// Every key is optional. Relative list paths resolve against the config file's
/// directory.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Scoring and ranking workflow.
    pub workflow: Workflow,
    /// Ranking override; the workflow default applies when unset.
    pub ranking: Option<RankingKey>,
    /// Community score weights; must sum to 1.0.
    pub weights: CommunityWeights,
    /// Custom taxonomy; the workflow preset applies when unset.
    pub taxonomy: Option<Taxonomy>,
    /// Raw-record key names.
    pub fields: RecordFields,
    /// Sources fetched concurrently per wave.
    pub max_concurrent_sources: usize,
    /// Pause between fetch waves, in milliseconds.
    pub source_delay_ms: u64,
    /// Curated list sources, registered in order.
    pub sources: Vec<ManualListConfig>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            workflow: Workflow::default(),
            ranking: None,
            weights: CommunityWeights::default(),
            taxonomy: None,
            fields: RecordFields::default(),
            max_concurrent_sources: pipeline::DEFAULT_MAX_CONCURRENT_SOURCES,
            source_delay_ms: 0,
            sources: Vec::new(),
        }
    }
}

impl DigestConfig {
    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DigestError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let mut config: DigestConfig = serde_json::from_str(&raw)?;
        if let Some(base) = path.parent() {
            config.sources = config
                .sources
                .into_iter()
                .map(|source| source.resolve_path(base))
                .collect();
        }
        Ok(config)
    }

    /// Pipeline settings described by this file.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            workflow: self.workflow,
            ranking: self.ranking,
            weights: self.weights,
            taxonomy: self.taxonomy.clone(),
            fields: self.fields.clone(),
            max_concurrent_sources: self.max_concurrent_sources,
            source_delay: Duration::from_millis(self.source_delay_ms),
        }
    }

    /// Instantiate the configured list sources.
    pub fn build_sources(&self) -> Vec<Box<dyn RecordSource>> {
        self.sources
            .iter()
            .cloned()
            .map(|config| {
                let source = ManualListSource::new(config).with_id_field(&self.fields.id);
                Box::new(source) as Box<dyn RecordSource>
            })
            .collect()
    }
}

use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::Taxonomy;
use crate::coerce::{Magnitude, coerce};
use crate::config::{PipelineConfig, RecordFields, Workflow};
use crate::constants::{community, pipeline};
use crate::data::{CanonicalItem, RawRecord};
use crate::dedup::Deduplicator;
use crate::errors::DigestError;
use crate::hash::stable_hash_str;
use crate::ranking::Digest;
use crate::scoring::{CommunityWeights, DiscussionSignals, score_community, score_discussion};
use crate::source::RecordSource;
use crate::timestamps::parse_timestamp_value;
use crate::types::{ItemId, PlatformName, SourceId};
use crate::utils::normalize_inline_whitespace;

/// Outcome of one source during the most recent run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceRunStats {
    /// Records returned by the adapter.
    pub fetched: usize,
    /// Records admitted into the digest.
    pub admitted: usize,
    /// Records dropped because their id was already admitted.
    pub duplicates: usize,
    /// Records dropped because no identity could be resolved.
    pub skipped: usize,
    /// Duration of the fetch call in milliseconds.
    pub fetch_ms: u128,
    /// Adapter error message, if the fetch failed.
    pub last_error: Option<String>,
}

/// Per-source report attached to a digest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceReport {
    /// Id of the reporting source.
    pub source_id: SourceId,
    /// Platform the source reports for.
    pub platform: PlatformName,
    /// Counters and error of the last run.
    pub stats: SourceRunStats,
}

type FetchOutcome = (Result<Vec<RawRecord>, DigestError>, Duration);

/// Drives registered sources through normalization, scoring, dedup and ranking.
///
/// Sources are fetched concurrently in waves of at most
/// `max_concurrent_sources`; records are processed afterwards in registration
/// order, so the digest never depends on completion order.
pub struct Pipeline {
    config: PipelineConfig,
    taxonomy: Taxonomy,
    sources: Vec<Box<dyn RecordSource + 'static>>,
    reports: Vec<SourceReport>,
}

impl Pipeline {
    /// Create a pipeline after validating `config`.
    pub fn new(config: PipelineConfig) -> Result<Self, DigestError> {
        config.validate()?;
        let taxonomy = config.resolved_taxonomy();
        Ok(Self {
            config,
            taxonomy,
            sources: Vec::new(),
            reports: Vec::new(),
        })
    }

    /// Register a source; sources are processed in registration order.
    pub fn register_source(&mut self, source: Box<dyn RecordSource + 'static>) {
        self.sources.push(source);
    }

    /// Returns `true` when at least one source is registered.
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Taxonomy used for classification.
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Per-source reports of the most recent run.
    pub fn source_stats(&self) -> &[SourceReport] {
        &self.reports
    }

    /// Run once, using the current time.
    pub fn run(&mut self) -> Digest {
        self.run_at(Utc::now())
    }

    /// Run once with an explicit clock.
    pub fn run_at(&mut self, now: DateTime<Utc>) -> Digest {
        let outcomes = self.fetch_all();
        let normalizer = Normalizer {
            workflow: self.config.workflow,
            fields: &self.config.fields,
            weights: &self.config.weights,
            taxonomy: &self.taxonomy,
            now,
        };
        let mut dedup = Deduplicator::new();
        let mut items = Vec::new();
        let mut reports = Vec::with_capacity(self.sources.len());

        for (source, (result, elapsed)) in self.sources.iter().zip(outcomes) {
            let mut stats = SourceRunStats {
                fetch_ms: elapsed.as_millis(),
                ..SourceRunStats::default()
            };
            match result {
                Ok(records) => {
                    stats.fetched = records.len();
                    for record in records {
                        let Some(id) = normalizer.resolve_id(&record, source.id()) else {
                            stats.skipped += 1;
                            debug!(
                                source_id = %source.id(),
                                "record skipped: no id or url"
                            );
                            continue;
                        };
                        if !dedup.is_new(&id) {
                            stats.duplicates += 1;
                            continue;
                        }
                        items.push(normalizer.normalize(id, &record, source.as_ref()));
                        stats.admitted += 1;
                    }
                    debug!(
                        source_id = %source.id(),
                        fetched = stats.fetched,
                        admitted = stats.admitted,
                        duplicates = stats.duplicates,
                        skipped = stats.skipped,
                        fetch_ms = stats.fetch_ms,
                        "source records processed"
                    );
                }
                Err(err) => {
                    warn!(
                        source_id = %source.id(),
                        error = %err,
                        "source fetch failed; contributing no records"
                    );
                    stats.last_error = Some(err.to_string());
                }
            }
            reports.push(SourceReport {
                source_id: source.id().to_string(),
                platform: source.platform().to_string(),
                stats,
            });
        }

        info!(
            sources = self.sources.len(),
            items = items.len(),
            duplicates = dedup.rejected(),
            "pipeline run completed"
        );
        self.reports = reports.clone();
        Digest::assemble(items, self.config.ranking_key(), now)
            .with_sources(reports)
    }

    fn fetch_all(&self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::with_capacity(self.sources.len());
        let wave_size = self.config.max_concurrent_sources.max(1);
        for (wave_idx, wave) in self.sources.chunks(wave_size).enumerate() {
            if wave_idx > 0 && !self.config.source_delay.is_zero() {
                thread::sleep(self.config.source_delay);
            }
            thread::scope(|scope| {
                let handles: Vec<_> = wave
                    .iter()
                    .map(|source| {
                        scope.spawn(move || {
                            let start = Instant::now();
                            let result = source.fetch();
                            (result, start.elapsed())
                        })
                    })
                    .collect();
                for (source, handle) in wave.iter().zip(handles) {
                    let outcome = match handle.join() {
                        Ok(outcome) => outcome,
                        Err(_) => (
                            Err(DigestError::SourceUnavailable {
                                source_id: source.id().to_string(),
                                reason: "source fetch thread panicked".into(),
                            }),
                            Duration::from_secs(0),
                        ),
                    };
                    outcomes.push(outcome);
                }
            });
        }
        outcomes
    }
}

/// Per-run record normalization.
struct Normalizer<'a> {
    workflow: Workflow,
    fields: &'a RecordFields,
    weights: &'a CommunityWeights,
    taxonomy: &'a Taxonomy,
    now: DateTime<Utc>,
}

impl Normalizer<'_> {
    fn resolve_id(&self, record: &RawRecord, source_id: &str) -> Option<ItemId> {
        if let Some(id) = record.text(&self.fields.id) {
            return Some(id);
        }
        let url = record.text(&self.fields.url)?;
        Some(format!(
            "{source_id}{}{:016x}",
            pipeline::DERIVED_ID_SEPARATOR,
            stable_hash_str(&url)
        ))
    }

    fn normalize(
        &self,
        id: ItemId,
        record: &RawRecord,
        source: &dyn RecordSource,
    ) -> CanonicalItem {
        let fields = self.fields;
        let title = record.text(&fields.title).unwrap_or_default();
        let content = record
            .first_text(fields.content.iter().map(String::as_str))
            .unwrap_or_default();
        let category = self.category(record, &title, &content);

        let raw_metric = record
            .first_present(fields.metric.iter().map(String::as_str))
            .map(Magnitude::from)
            .unwrap_or_default();
        let numeric_metric = coerce(&raw_metric);
        let created_at = record
            .first_present(fields.created_at.iter().map(String::as_str))
            .and_then(parse_timestamp_value);

        let engagement_score = match self.workflow {
            Workflow::Communities => {
                let base_quality = record
                    .get(&fields.base_quality)
                    .map(|value| coerce(&Magnitude::from(value)))
                    .unwrap_or(community::DEFAULT_BASE_QUALITY);
                score_community(
                    created_at,
                    base_quality,
                    &raw_metric,
                    self.weights,
                    self.now,
                )
            }
            Workflow::Discussions => {
                let timestamp = record
                    .first_present(fields.discussion_timestamps.iter().map(String::as_str))
                    .and_then(parse_timestamp_value);
                score_discussion(&self.signals(record), timestamp, self.now) as f64
            }
        };

        CanonicalItem {
            id,
            platform: record
                .text(&fields.platform)
                .unwrap_or_else(|| source.platform().to_string()),
            source: record
                .text(&fields.source)
                .unwrap_or_else(|| source.id().to_string()),
            category,
            title,
            content,
            url: record.text(&fields.url).unwrap_or_default(),
            author: record.text(&fields.author).unwrap_or_default(),
            raw_metric,
            numeric_metric,
            created_at,
            fetched_at: self.now,
            engagement_score,
        }
    }

    fn category(&self, record: &RawRecord, title: &str, content: &str) -> String {
        if let Some(hint) = record.text(&self.fields.category_hint) {
            let hint = hint.trim();
            if self.taxonomy.contains_label(hint) {
                return hint.to_string();
            }
        }
        let seed = normalize_inline_whitespace(format!("{title} {content}"));
        self.taxonomy.categorize(&seed).to_string()
    }

    fn signals(&self, record: &RawRecord) -> DiscussionSignals {
        let signal = |key: &str| record.get(key).map(|value| coerce(&Magnitude::from(value)));
        DiscussionSignals {
            score: signal(&self.fields.signal_score),
            comments: signal(&self.fields.signal_comments),
            replies: signal(&self.fields.signal_replies),
            views: signal(&self.fields.signal_views),
            likes: signal(&self.fields.signal_likes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RankingKey;
    use crate::source::InMemorySource;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn by_id<'a>(digest: &'a Digest, id: &str) -> &'a CanonicalItem {
        digest.items.iter().find(|item| item.id == id).unwrap()
    }

    struct FailingSource;

    impl RecordSource for FailingSource {
        fn id(&self) -> &str {
            "broken"
        }

        fn platform(&self) -> &str {
            "Forum"
        }

        fn fetch(&self) -> Result<Vec<RawRecord>, DigestError> {
            Err(DigestError::SourceUnavailable {
                source_id: "broken".into(),
                reason: "timeout".into(),
            })
        }
    }

    struct PanickingSource;

    impl RecordSource for PanickingSource {
        fn id(&self) -> &str {
            "panics"
        }

        fn platform(&self) -> &str {
            "Forum"
        }

        fn fetch(&self) -> Result<Vec<RawRecord>, DigestError> {
            panic!("adapter bug")
        }
    }

    #[test]
    fn url_derived_ids_and_skipped_records() {
        let mut pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        pipeline.register_source(Box::new(InMemorySource::new(
            "rss",
            "News",
            vec![
                RawRecord::new()
                    .with("title", "Endometriosis study")
                    .with("url", "https://example.org/a"),
                RawRecord::new().with("title", "no identity"),
                RawRecord::new()
                    .with("title", "Endometriosis study again")
                    .with("url", "https://example.org/a"),
            ],
        )));
        let digest = pipeline.run_at(now());
        assert_eq!(digest.items.len(), 1);
        assert_eq!(digest.items[0].id, "rss_4130e41a1ced2904");
        assert_eq!(digest.items[0].title, "Endometriosis study");
        let stats = &pipeline.source_stats()[0].stats;
        assert_eq!(stats.fetched, 3);
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn provenance_defaults_to_the_adapter() {
        let mut pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        pipeline.register_source(Box::new(InMemorySource::new(
            "discord_manual",
            "Discord",
            vec![
                RawRecord::new().with("id", "a"),
                RawRecord::new()
                    .with("id", "b")
                    .with("platform", "Slack")
                    .with("source", "import"),
            ],
        )));
        let digest = pipeline.run_at(now());
        let a = by_id(&digest, "a");
        assert_eq!(a.platform, "Discord");
        assert_eq!(a.source, "discord_manual");
        assert_eq!(a.fetched_at, now());
        let b = by_id(&digest, "b");
        assert_eq!(b.platform, "Slack");
        assert_eq!(b.source, "import");
    }

    #[test]
    fn known_category_hints_win_unknown_ones_do_not() {
        let mut pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
        pipeline.register_source(Box::new(InMemorySource::new(
            "list",
            "Facebook",
            vec![
                RawRecord::new()
                    .with("id", "hinted")
                    .with("title", "pregnancy after pcos")
                    .with("category", "Pregnancy"),
                RawRecord::new()
                    .with("id", "bogus")
                    .with("title", "living with pcos")
                    .with("category", "Not A Label"),
            ],
        )));
        let digest = pipeline.run_at(now());
        assert_eq!(by_id(&digest, "hinted").category, "Pregnancy");
        assert_eq!(by_id(&digest, "bogus").category, "PCOS");
    }

    #[test]
    fn discussion_workflow_scores_signals_with_recency() {
        let config = PipelineConfig::for_workflow(Workflow::Discussions);
        let mut pipeline = Pipeline::new(config).unwrap();
        let fresh = (now() - ChronoDuration::days(1)).to_rfc3339();
        let stale = (now() - ChronoDuration::days(90)).to_rfc3339();
        pipeline.register_source(Box::new(InMemorySource::new(
            "reddit",
            "Reddit",
            vec![
                RawRecord::new()
                    .with("id", "stale")
                    .with("score", 10)
                    .with("num_comments", "3")
                    .with("created_utc", stale),
                RawRecord::new()
                    .with("id", "fresh")
                    .with("score", 10)
                    .with("num_comments", "3")
                    .with("created_utc", fresh),
            ],
        )));
        let digest = pipeline.run_at(now());
        assert_eq!(digest.ranking, RankingKey::EngagementScore);
        assert_eq!(digest.items[0].id, "fresh");
        assert_eq!(digest.items[0].engagement_score, 70.0);
        assert_eq!(digest.items[1].engagement_score, 35.0);
    }

    #[test]
    fn failures_and_panics_are_contained() {
        let config = PipelineConfig::default().with_max_concurrent_sources(2);
        let mut pipeline = Pipeline::new(config).unwrap();
        pipeline.register_source(Box::new(FailingSource));
        pipeline.register_source(Box::new(PanickingSource));
        pipeline.register_source(Box::new(InMemorySource::new(
            "ok",
            "Forum",
            vec![RawRecord::new().with("id", "kept")],
        )));
        let digest = pipeline.run_at(now());
        assert_eq!(digest.items.len(), 1);
        let reports = pipeline.source_stats();
        assert_eq!(reports.len(), 3);
        let error = |idx: usize| reports[idx].stats.last_error.clone().unwrap_or_default();
        assert!(error(0).contains("timeout"));
        assert!(error(1).contains("panicked"));
        assert_eq!(reports[2].stats.admitted, 1);
        assert_eq!(digest.sources, reports);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PipelineConfig::default().with_max_concurrent_sources(0);
        assert!(Pipeline::new(config).is_err());
    }
}

//! Aggregation and ranking over admitted items.
//!
//! All views sort descending on one key with a stable sort, so items with equal
//! keys keep the order in which they were admitted.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::RankingKey;
use crate::data::CanonicalItem;
use crate::pipeline::SourceReport;
use crate::types::{CategoryLabel, PlatformName};

/// Value of `key` for `item`.
pub fn sort_value(item: &CanonicalItem, key: RankingKey) -> f64 {
    match key {
        RankingKey::EngagementScore => item.engagement_score,
        RankingKey::NumericMetric => item.numeric_metric,
    }
}

/// Stable descending sort on `key`.
pub fn rank_items(items: &mut [CanonicalItem], key: RankingKey) {
    items.sort_by(|a, b| {
        sort_value(b, key)
            .partial_cmp(&sort_value(a, key))
            .unwrap_or(Ordering::Equal)
    });
}

/// Items of one category plus aggregate stats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryGroup {
    /// Items ranked by the digest key.
    pub items: Vec<CanonicalItem>,
    /// Number of items in the group.
    pub count: usize,
    /// Sum of `numeric_metric` over the group.
    pub total_metric: f64,
}

/// Group items by category.
///
/// Groups appear in order of first appearance in `items`; each group is ranked
/// independently on `key`.
pub fn group_by_category(
    items: &[CanonicalItem],
    key: RankingKey,
) -> IndexMap<CategoryLabel, CategoryGroup> {
    let mut groups: IndexMap<CategoryLabel, CategoryGroup> = IndexMap::new();
    for item in items {
        let group = groups
            .entry(item.category.clone())
            .or_insert_with(|| CategoryGroup {
                items: Vec::new(),
                count: 0,
                total_metric: 0.0,
            });
        group.count += 1;
        group.total_metric += item.numeric_metric;
        group.items.push(item.clone());
    }
    for group in groups.values_mut() {
        rank_items(&mut group.items, key);
    }
    groups
}

/// Collection-wide totals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Items in the digest.
    pub item_count: usize,
    /// Distinct platforms.
    pub platform_count: usize,
    /// Distinct categories.
    pub category_count: usize,
    /// Sum of `numeric_metric` across all items.
    pub total_metric: f64,
    /// Distinct platforms, sorted.
    pub platforms: Vec<PlatformName>,
    /// Distinct categories, sorted.
    pub categories: Vec<CategoryLabel>,
}

/// Compute totals over `items`.
pub fn totals(items: &[CanonicalItem]) -> Totals {
    let platforms: BTreeSet<&str> = items.iter().map(|item| item.platform.as_str()).collect();
    let categories: BTreeSet<&str> = items.iter().map(|item| item.category.as_str()).collect();
    Totals {
        item_count: items.len(),
        platform_count: platforms.len(),
        category_count: categories.len(),
        total_metric: items.iter().map(|item| item.numeric_metric).sum(),
        platforms: platforms.into_iter().map(str::to_string).collect(),
        categories: categories.into_iter().map(str::to_string).collect(),
    }
}

/// Final ranked dataset of one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Digest {
    /// Clock the run scored against.
    pub generated_at: DateTime<Utc>,
    /// Key every view is ranked by.
    pub ranking: RankingKey,
    /// Global ranked view.
    pub items: Vec<CanonicalItem>,
    /// Grouped view keyed by category.
    pub categories: IndexMap<CategoryLabel, CategoryGroup>,
    /// Collection-wide totals.
    pub totals: Totals,
    /// Per-source run reports, in registration order.
    pub sources: Vec<SourceReport>,
}

impl Digest {
    /// Rank admitted items and build the grouped view and totals.
    pub fn assemble(
        mut items: Vec<CanonicalItem>,
        ranking: RankingKey,
        generated_at: DateTime<Utc>,
    ) -> Self {
        rank_items(&mut items, ranking);
        let categories = group_by_category(&items, ranking);
        let totals = totals(&items);
        Self {
            generated_at,
            ranking,
            items,
            categories,
            totals,
            sources: Vec::new(),
        }
    }

    /// Attach per-source reports.
    pub fn with_sources(mut self, sources: Vec<SourceReport>) -> Self {
        self.sources = sources;
        self
    }

    /// Up to `n` top-ranked items.
    pub fn top(&self, n: usize) -> &[CanonicalItem] {
        &self.items[..n.min(self.items.len())]
    }

    /// Group for `category`, if any item landed in it.
    pub fn category(&self, category: &str) -> Option<&CategoryGroup> {
        self.categories.get(category)
    }

    /// Returns `true` when no items were admitted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::Magnitude;
    use chrono::TimeZone;

    fn item(id: &str, category: &str, platform: &str, metric: f64, score: f64) -> CanonicalItem {
        CanonicalItem {
            id: id.to_string(),
            platform: platform.to_string(),
            source: platform.to_string(),
            category: category.to_string(),
            title: id.to_string(),
            content: String::new(),
            url: String::new(),
            author: String::new(),
            raw_metric: Magnitude::Number(metric),
            numeric_metric: metric,
            created_at: None,
            fetched_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            engagement_score: score,
        }
    }

    fn ids(items: &[CanonicalItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn equal_scores_keep_arrival_order() {
        let mut items = vec![
            item("A", "X", "P", 0.0, 10.0),
            item("top", "X", "P", 0.0, 50.0),
            item("B", "X", "P", 0.0, 10.0),
            item("C", "X", "P", 0.0, 10.0),
        ];
        rank_items(&mut items, RankingKey::EngagementScore);
        assert_eq!(ids(&items), vec!["top", "A", "B", "C"]);
    }

    #[test]
    fn ranking_key_selects_the_field() {
        let mut items = vec![
            item("small", "X", "P", 10.0, 90.0),
            item("big", "X", "P", 900.0, 5.0),
        ];
        rank_items(&mut items, RankingKey::NumericMetric);
        assert_eq!(ids(&items), vec!["big", "small"]);
        rank_items(&mut items, RankingKey::EngagementScore);
        assert_eq!(ids(&items), vec!["small", "big"]);
    }

    #[test]
    fn groups_carry_counts_sums_and_their_own_order() {
        let items = vec![
            item("p1", "PCOS", "Reddit", 100.0, 1.0),
            item("m1", "Menopause", "Reddit", 50.0, 3.0),
            item("p2", "PCOS", "Discord", 300.0, 2.0),
        ];
        let groups = group_by_category(&items, RankingKey::EngagementScore);
        let labels: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["PCOS", "Menopause"]);
        let pcos = &groups["PCOS"];
        assert_eq!(pcos.count, 2);
        assert_eq!(pcos.total_metric, 400.0);
        assert_eq!(ids(&pcos.items), vec!["p2", "p1"]);
    }

    #[test]
    fn totals_count_distinct_values() {
        let items = vec![
            item("a", "PCOS", "Reddit", 1.5, 0.0),
            item("b", "PCOS", "Discord", 2.5, 0.0),
            item("c", "Menopause", "Reddit", 6.0, 0.0),
        ];
        let totals = totals(&items);
        assert_eq!(totals.item_count, 3);
        assert_eq!(totals.platform_count, 2);
        assert_eq!(totals.category_count, 2);
        assert_eq!(totals.total_metric, 10.0);
        assert_eq!(totals.platforms, vec!["Discord", "Reddit"]);
        assert_eq!(totals.categories, vec!["Menopause", "PCOS"]);
    }

    #[test]
    fn digest_assembles_ranked_views() {
        let generated_at = Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap();
        let digest = Digest::assemble(
            vec![
                item("low", "PCOS", "Reddit", 1.0, 0.0),
                item("high", "Menopause", "Reddit", 5.0, 0.0),
            ],
            RankingKey::NumericMetric,
            generated_at,
        );
        assert_eq!(ids(&digest.items), vec!["high", "low"]);
        let labels: Vec<&str> = digest.categories.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["Menopause", "PCOS"]);
        assert_eq!(ids(digest.top(1)), vec!["high"]);
        assert_eq!(digest.top(10).len(), 2);
        assert!(digest.category("PCOS").is_some());
        assert!(digest.category("Thyroid Disorders").is_none());
        assert!(!digest.is_empty());
    }

    #[test]
    fn empty_digest_is_well_formed() {
        let digest = Digest::assemble(Vec::new(), RankingKey::EngagementScore, Utc::now());
        assert!(digest.is_empty());
        assert_eq!(digest.totals, Totals::default());
        assert!(digest.top(5).is_empty());
    }
}

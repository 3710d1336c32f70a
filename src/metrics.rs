use std::collections::HashMap;

use crate::data::CanonicalItem;
use crate::types::PlatformName;

/// Aggregate skew metrics for per-platform item counts.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformSkew {
    /// Items counted.
    pub total: usize,
    /// Distinct platforms.
    pub platforms: usize,
    /// Smallest per-platform count.
    pub min: usize,
    /// Largest per-platform count.
    pub max: usize,
    /// Mean items per platform.
    pub mean: f64,
    /// Share of the largest platform.
    pub max_share: f64,
    /// Share of the smallest platform.
    pub min_share: f64,
    /// `max / min`.
    pub ratio: f64,
    /// Per-platform counts, largest first.
    pub per_platform: Vec<PlatformShare>,
}

/// One platform's share of a digest.
#[derive(Clone, Debug, PartialEq)]
pub struct PlatformShare {
    /// Platform name.
    pub platform: PlatformName,
    /// Items from this platform.
    pub count: usize,
    /// `count / total`.
    pub share: f64,
}

/// Compute per-platform shares and skew; `None` when `items` is empty.
pub fn platform_shares(items: &[CanonicalItem]) -> Option<PlatformSkew> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item.platform.as_str()).or_default() += 1;
    }
    if counts.is_empty() {
        return None;
    }
    let total: usize = counts.values().sum();
    let platforms = counts.len();
    let min = counts.values().copied().min().unwrap_or(0);
    let max = counts.values().copied().max().unwrap_or(0);
    let share = |count: usize| count as f64 / total as f64;
    let mut per_platform: Vec<PlatformShare> = counts
        .iter()
        .map(|(platform, count)| PlatformShare {
            platform: platform.to_string(),
            count: *count,
            share: share(*count),
        })
        .collect();
    per_platform.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.platform.cmp(&b.platform))
    });
    Some(PlatformSkew {
        total,
        platforms,
        min,
        max,
        mean: total as f64 / platforms as f64,
        max_share: share(max),
        min_share: share(min),
        ratio: max as f64 / min as f64,
        per_platform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::Magnitude;
    use chrono::Utc;

    fn on(platform: &str) -> CanonicalItem {
        CanonicalItem {
            id: String::new(),
            platform: platform.to_string(),
            source: String::new(),
            category: String::new(),
            title: String::new(),
            content: String::new(),
            url: String::new(),
            author: String::new(),
            raw_metric: Magnitude::Empty,
            numeric_metric: 0.0,
            created_at: None,
            fetched_at: Utc::now(),
            engagement_score: 0.0,
        }
    }

    #[test]
    fn platform_shares_report_balance() {
        let items = vec![on("Reddit"), on("Discord"), on("Reddit"), on("Discord")];
        let skew = platform_shares(&items).expect("skew");
        assert_eq!(skew.total, 4);
        assert_eq!(skew.platforms, 2);
        assert!((skew.max_share - 0.5).abs() < 1e-6);
        assert!((skew.ratio - 1.0).abs() < 1e-6);
        assert!(
            skew.per_platform
                .iter()
                .all(|entry| (entry.share - 0.5).abs() < 1e-6)
        );
    }

    #[test]
    fn platform_shares_report_imbalance() {
        let items = vec![
            on("Reddit"),
            on("Reddit"),
            on("Reddit"),
            on("Reddit"),
            on("Discord"),
            on("Discord"),
            on("Facebook"),
            on("Facebook"),
        ];
        let skew = platform_shares(&items).expect("skew");
        assert_eq!(skew.total, 8);
        assert_eq!(skew.min, 2);
        assert_eq!(skew.max, 4);
        assert!((skew.ratio - 2.0).abs() < 1e-6);
        assert_eq!(skew.per_platform[0].platform, "Reddit");
        assert_eq!(skew.per_platform[1].platform, "Discord");
    }

    #[test]
    fn empty_input_has_no_shares() {
        assert!(platform_shares(&[]).is_none());
    }
}

//! Engagement scoring strategies.
//!
//! Two independent models live here and are deliberately kept apart:
//! - the community model blends audience size, recency buckets and a quality
//!   prior into a bounded 0-100 score;
//! - the discussion model accumulates raw interaction signals and applies a
//!   short-horizon recency multiplier.
//!
//! Both are pure: the caller passes `now`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::coerce::{Magnitude, coerce};
use crate::constants::{community, discussion, hashtag};
use crate::errors::DigestError;
use crate::timestamps::age_in_days;

/// Weights of the community score components. Must sum to 1.0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityWeights {
    /// Weight of `min(metric / 1000, 100)`.
    pub activity: f64,
    /// Weight of `min(metric / 2000, 100)`.
    pub reach: f64,
    /// Weight of the recency bucket score.
    pub recency: f64,
    /// Weight of the quality prior.
    pub quality: f64,
}

impl Default for CommunityWeights {
    fn default() -> Self {
        Self {
            activity: community::WEIGHT_ACTIVITY,
            reach: community::WEIGHT_REACH,
            recency: community::WEIGHT_RECENCY,
            quality: community::WEIGHT_QUALITY,
        }
    }
}

impl CommunityWeights {
    /// Sum of all four weights.
    pub fn sum(&self) -> f64 {
        self.activity + self.reach + self.recency + self.quality
    }

    /// Reject negative weights and weights that do not sum to 1.0.
    pub fn validate(&self) -> Result<(), DigestError> {
        let parts = [self.activity, self.reach, self.recency, self.quality];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(DigestError::Configuration(format!(
                "community weights must be finite and non-negative: {self:?}"
            )));
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > community::WEIGHT_SUM_TOLERANCE {
            return Err(DigestError::Configuration(format!(
                "community weights must sum to 1.0, got {sum:.6}"
            )));
        }
        Ok(())
    }
}

/// Recency bucket score for a community created at `created_at`.
///
/// Unknown creation time maps to a neutral score; future timestamps count as age 0.
pub fn community_recency(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(created_at) = created_at else {
        return community::RECENCY_UNKNOWN;
    };
    let age_days = age_in_days(created_at, now).max(0);
    community::RECENCY_BUCKETS
        .iter()
        .find(|(limit, _)| age_days < *limit)
        .map(|(_, score)| *score)
        .unwrap_or(community::RECENCY_OLDEST)
}

/// Quality prior on a 0-100 scale. Inputs up to 1 are read as a 0-1 fraction,
/// larger inputs as a 0-10 rating.
pub fn community_quality(base_quality: f64) -> f64 {
    if base_quality <= 1.0 {
        base_quality * 100.0
    } else {
        cap_sub_score(base_quality * 10.0)
    }
}

fn cap_sub_score(value: f64) -> f64 {
    value.min(community::SUB_SCORE_CAP)
}

/// Weighted community engagement score, rounded to two decimals.
pub fn score_community(
    created_at: Option<DateTime<Utc>>,
    base_quality: f64,
    metric: &Magnitude,
    weights: &CommunityWeights,
    now: DateTime<Utc>,
) -> f64 {
    debug_assert!(
        (weights.sum() - 1.0).abs() <= community::WEIGHT_SUM_TOLERANCE,
        "community weights must sum to 1.0"
    );
    let metric = coerce(metric);
    let activity = cap_sub_score(metric / community::ACTIVITY_DIVISOR);
    let reach = cap_sub_score(metric / community::REACH_DIVISOR);
    let recency = community_recency(created_at, now);
    let quality = community_quality(base_quality);

    round_to(
        weights.activity * activity
            + weights.reach * reach
            + weights.recency * recency
            + weights.quality * quality,
        2,
    )
}

/// Interaction counters of a discussion. Absent signals contribute nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscussionSignals {
    /// Raw upvotes/score.
    pub score: Option<f64>,
    /// Comment count.
    pub comments: Option<f64>,
    /// Reply count.
    pub replies: Option<f64>,
    /// View count.
    pub views: Option<f64>,
    /// Like count.
    pub likes: Option<f64>,
}

impl DiscussionSignals {
    /// Weighted sum of the signals that are present.
    pub fn base_score(&self) -> f64 {
        [
            (self.score, discussion::SCORE_WEIGHT),
            (self.comments, discussion::COMMENT_WEIGHT),
            (self.replies, discussion::REPLY_WEIGHT),
            (self.views, discussion::VIEW_WEIGHT),
            (self.likes, discussion::LIKE_WEIGHT),
        ]
        .into_iter()
        .filter_map(|(value, weight)| value.map(|value| value * weight))
        .sum()
    }
}

/// Recency multiplier for a discussion timestamp; `1.0` when unknown or old.
pub fn discussion_recency_multiplier(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(timestamp) = timestamp else {
        return 1.0;
    };
    let age_days = age_in_days(timestamp, now);
    discussion::RECENCY_MULTIPLIERS
        .iter()
        .find(|(limit, _)| age_days < *limit)
        .map(|(_, multiplier)| *multiplier)
        .unwrap_or(1.0)
}

/// Discussion engagement score, truncated toward zero.
///
/// `timestamp` is the already-resolved point in time; pass `None` when no
/// candidate field was present or it failed to parse.
pub fn score_discussion(
    signals: &DiscussionSignals,
    timestamp: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i64 {
    let scored = signals.base_score() * discussion_recency_multiplier(timestamp, now);
    if scored.is_finite() {
        scored.trunc() as i64
    } else {
        0
    }
}

/// Aggregated metrics sampled from posts under one hashtag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HashtagSample {
    /// Total posts published under the hashtag.
    pub posts: f64,
    /// Likes across sampled posts.
    pub likes: f64,
    /// Comments across sampled posts.
    pub comments: f64,
    /// Shares across sampled posts.
    pub shares: f64,
    /// Saves across sampled posts.
    pub saves: f64,
    /// Reach/impressions across sampled posts.
    pub reach: f64,
    /// Number of posts the sample covers.
    pub sampled_posts: u64,
}

/// Benchmark band for a reach-based engagement rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashtagRating {
    /// Above 5%.
    Excellent,
    /// Above 1%.
    Good,
    /// Above 0.5%.
    Average,
    /// Everything else.
    Poor,
}

impl HashtagRating {
    /// Band for a reach-based engagement rate in percent.
    pub fn for_rate(rate: f64) -> Self {
        if rate > hashtag::EXCELLENT_ABOVE {
            HashtagRating::Excellent
        } else if rate > hashtag::GOOD_ABOVE {
            HashtagRating::Good
        } else if rate > hashtag::AVERAGE_ABOVE {
            HashtagRating::Average
        } else {
            HashtagRating::Poor
        }
    }
}

/// Engagement summary of a hashtag sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HashtagEngagement {
    /// Likes, comments, shares and saves combined.
    pub total_engagements: f64,
    /// Engagements per reach, in percent.
    pub engagement_rate_reach: f64,
    /// Mean engagements per sampled post.
    pub avg_engagements_per_post: f64,
    /// Engagements per published post, in percent.
    pub engagement_rate_posts: f64,
    /// Band for `engagement_rate_reach`.
    pub rating: HashtagRating,
}

/// Compute engagement rates for a hashtag sample. Zero denominators yield zero rates.
pub fn hashtag_engagement(sample: &HashtagSample) -> HashtagEngagement {
    let total = sample.likes + sample.comments + sample.shares + sample.saves;
    let rate_reach = if sample.reach > 0.0 {
        total / sample.reach * 100.0
    } else {
        0.0
    };
    let avg_per_post = if sample.sampled_posts > 0 {
        total / sample.sampled_posts as f64
    } else {
        0.0
    };
    let rate_posts = if sample.posts > 0.0 {
        total / sample.posts * 100.0
    } else {
        0.0
    };
    HashtagEngagement {
        total_engagements: total,
        engagement_rate_reach: round_to(rate_reach, 2),
        avg_engagements_per_post: round_to(avg_per_post, 1),
        engagement_rate_posts: round_to(rate_posts, 2),
        rating: HashtagRating::for_rate(rate_reach),
    }
}

/// Round half to even at `decimals` places.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

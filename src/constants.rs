/// Constants used by the community scoring model.
pub mod community {
    /// Default weight of the activity sub-score.
    pub const WEIGHT_ACTIVITY: f64 = 0.40;
    /// Default weight of the reach sub-score.
    pub const WEIGHT_REACH: f64 = 0.25;
    /// Default weight of the recency sub-score.
    pub const WEIGHT_RECENCY: f64 = 0.15;
    /// Default weight of the quality sub-score.
    pub const WEIGHT_QUALITY: f64 = 0.20;
    /// Allowed drift when checking that weights sum to 1.0.
    pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

    /// Metric divisor for the activity sub-score.
    pub const ACTIVITY_DIVISOR: f64 = 1_000.0;
    /// Metric divisor for the reach sub-score.
    pub const REACH_DIVISOR: f64 = 2_000.0;
    /// Upper bound of every capped sub-score.
    pub const SUB_SCORE_CAP: f64 = 100.0;

    /// Recency buckets as `(max_age_days_exclusive, score)`, checked in order.
    pub const RECENCY_BUCKETS: [(i64, f64); 3] = [(30, 90.0), (180, 80.0), (365, 70.0)];
    /// Recency score for communities older than every bucket.
    pub const RECENCY_OLDEST: f64 = 60.0;
    /// Recency score used when no creation timestamp is known.
    pub const RECENCY_UNKNOWN: f64 = 75.0;

    /// Base quality assumed when a record does not carry one.
    pub const DEFAULT_BASE_QUALITY: f64 = 1.0;
}

/// Constants used by the discussion scoring model.
pub mod discussion {
    /// Multiplier applied to raw upvotes/score.
    pub const SCORE_WEIGHT: f64 = 2.0;
    /// Multiplier applied to comment counts.
    pub const COMMENT_WEIGHT: f64 = 5.0;
    /// Multiplier applied to reply counts.
    pub const REPLY_WEIGHT: f64 = 5.0;
    /// Multiplier applied to view counts.
    pub const VIEW_WEIGHT: f64 = 0.1;
    /// Multiplier applied to like counts.
    pub const LIKE_WEIGHT: f64 = 2.0;

    /// Recency multipliers as `(max_age_days_exclusive, multiplier)`, checked in order.
    pub const RECENCY_MULTIPLIERS: [(i64, f64); 2] = [(7, 2.0), (30, 1.5)];
}

/// Constants used by the hashtag engagement calculator.
pub mod hashtag {
    /// Reach-based engagement rate (percent) above which a hashtag rates `Excellent`.
    pub const EXCELLENT_ABOVE: f64 = 5.0;
    /// Reach-based engagement rate (percent) above which a hashtag rates `Good`.
    pub const GOOD_ABOVE: f64 = 1.0;
    /// Reach-based engagement rate (percent) above which a hashtag rates `Average`.
    pub const AVERAGE_ABOVE: f64 = 0.5;
}

/// Constants used by the classifier presets.
pub mod classifier {
    /// Fallback label returned when no rule matches.
    pub const FALLBACK_LABEL: &str = "General Women's Health";
}

/// Default raw-record key names.
pub mod fields {
    /// Identity key.
    pub const ID: &str = "id";
    /// Platform display name.
    pub const PLATFORM: &str = "platform";
    /// Source display name.
    pub const SOURCE: &str = "source";
    /// Title text.
    pub const TITLE: &str = "title";
    /// Link to the item.
    pub const URL: &str = "url";
    /// Author display name.
    pub const AUTHOR: &str = "author";
    /// Curated category hint.
    pub const CATEGORY: &str = "category";
    /// Base quality (0-1 or 0-10 scale).
    pub const BASE_QUALITY: &str = "base_score";
    /// Curated entry name, used to derive ids for manual lists.
    pub const NAME: &str = "name";

    /// Body text candidates, first present wins.
    pub const CONTENT: [&str; 4] = ["content", "description", "selftext", "summary"];
    /// Magnitude candidates, first present wins.
    pub const METRIC: [&str; 6] = [
        "metric",
        "number_members",
        "members",
        "subscribers",
        "followers",
        "posts",
    ];
    /// Creation timestamp candidates, first present wins.
    pub const CREATED_AT: [&str; 3] = ["created_at", "created_utc", "published_at"];
    /// Timestamp chain used by discussion recency, first present wins.
    pub const DISCUSSION_TIMESTAMPS: [&str; 3] = ["created_utc", "published_at", "fetched_date"];

    /// Raw upvote/score signal.
    pub const SIGNAL_SCORE: &str = "score";
    /// Comment count signal.
    pub const SIGNAL_COMMENTS: &str = "num_comments";
    /// Reply count signal.
    pub const SIGNAL_REPLIES: &str = "replies_count";
    /// View count signal.
    pub const SIGNAL_VIEWS: &str = "views";
    /// Like count signal.
    pub const SIGNAL_LIKES: &str = "likes";
}

/// Constants used for url-derived identity hashing.
pub mod hash {
    /// FNV-1a 64-bit offset basis.
    pub const FNV1A64_OFFSET: u64 = 0xcbf29ce484222325;
    /// FNV-1a 64-bit prime.
    pub const FNV1A64_PRIME: u64 = 0x100000001b3;
}

/// Constants used by the pipeline driver.
pub mod pipeline {
    /// Default number of sources fetched concurrently.
    pub const DEFAULT_MAX_CONCURRENT_SOURCES: usize = 4;
    /// Separator between a source id and a url hash in derived ids.
    pub const DERIVED_ID_SEPARATOR: &str = "_";
}

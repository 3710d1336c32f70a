//! JSON export of a digest.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::info;

use crate::config::RankingKey;
use crate::data::CanonicalItem;
use crate::errors::DigestError;
use crate::pipeline::SourceReport;
use crate::ranking::{CategoryGroup, Digest, Totals};
use crate::types::CategoryLabel;

#[derive(Serialize)]
struct ExportMetadata<'a> {
    generated_at: DateTime<Utc>,
    ranking: RankingKey,
    totals: &'a Totals,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    metadata: ExportMetadata<'a>,
    items: &'a [CanonicalItem],
    categories: &'a IndexMap<CategoryLabel, CategoryGroup>,
    sources: &'a [SourceReport],
}

impl<'a> From<&'a Digest> for ExportDocument<'a> {
    fn from(digest: &'a Digest) -> Self {
        Self {
            metadata: ExportMetadata {
                generated_at: digest.generated_at,
                ranking: digest.ranking,
                totals: &digest.totals,
            },
            items: &digest.items,
            categories: &digest.categories,
            sources: &digest.sources,
        }
    }
}

/// Render `digest` as pretty-printed JSON.
pub fn to_json_string(digest: &Digest) -> Result<String, DigestError> {
    Ok(serde_json::to_string_pretty(&ExportDocument::from(digest))?)
}

/// Write `digest` as JSON to `path`, creating parent directories.
pub fn write_json(digest: &Digest, path: impl AsRef<Path>) -> Result<(), DigestError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, to_json_string(digest)?)?;
    info!(
        path = %path.display(),
        items = digest.items.len(),
        "digest exported"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::Magnitude;
    use chrono::TimeZone;
    use serde_json::Value;

    fn digest() -> Digest {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let item = CanonicalItem {
            id: "fb_pcos".into(),
            platform: "Facebook".into(),
            source: "facebook".into(),
            category: "PCOS".into(),
            title: "PCOS Support".into(),
            content: String::new(),
            url: String::new(),
            author: String::new(),
            raw_metric: Magnitude::Text("12K".into()),
            numeric_metric: 12_000.0,
            created_at: None,
            fetched_at: now,
            engagement_score: 38.1,
        };
        Digest::assemble(vec![item], RankingKey::NumericMetric, now)
    }

    #[test]
    fn document_has_metadata_header() {
        let rendered = to_json_string(&digest()).unwrap();
        let json: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(json["metadata"]["ranking"], "numeric_metric");
        assert_eq!(json["metadata"]["totals"]["item_count"], 1);
        assert_eq!(json["metadata"]["generated_at"], "2025-03-01T00:00:00Z");
        assert_eq!(json["items"][0]["raw_metric"], "12K");
        assert_eq!(json["categories"]["PCOS"]["count"], 1);
        assert!(json["sources"].as_array().unwrap().is_empty());
    }

    #[test]
    fn write_json_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("digest.json");
        write_json(&digest(), &path).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"fb_pcos\""));
    }
}

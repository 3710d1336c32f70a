use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::constants::fields;
use crate::data::RawRecord;
use crate::errors::DigestError;
use crate::source::RecordSource;
use crate::types::{FieldName, PlatformName, SourceId};

/// Configuration for a curated list of communities.
///
/// Entries come either inline (`entries`) or from a JSON array file (`path`);
/// when both are set the file wins.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ManualListConfig {
    /// Stable source identifier.
    pub id: SourceId,
    /// Platform name applied to entries that do not carry one.
    pub platform: PlatformName,
    /// Prefix for ids derived from entry names; defaults to `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_prefix: Option<String>,
    /// JSON array file holding the entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Inline entries.
    #[serde(default)]
    pub entries: Vec<RawRecord>,
}

impl ManualListConfig {
    /// Create a config with inline entries.
    pub fn new(id: impl Into<SourceId>, platform: impl Into<PlatformName>) -> Self {
        Self {
            id: id.into(),
            platform: platform.into(),
            id_prefix: None,
            path: None,
            entries: Vec::new(),
        }
    }

    /// Read entries from a JSON array file at fetch time.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Override the prefix of derived ids.
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = Some(prefix.into());
        self
    }

    /// Set inline entries.
    pub fn with_entries(mut self, entries: Vec<RawRecord>) -> Self {
        self.entries = entries;
        self
    }

    /// Resolve a relative `path` against `base`.
    pub fn resolve_path(mut self, base: &Path) -> Self {
        if let Some(path) = self.path.take() {
            self.path = Some(if path.is_relative() {
                base.join(path)
            } else {
                path
            });
        }
        self
    }
}

/// Source over a curated list of entries.
///
/// Entries without an id get `{prefix}_{name}` where the name is lowercased,
/// stripped of `#`, and has spaces replaced by underscores.
pub struct ManualListSource {
    config: ManualListConfig,
    id_field: FieldName,
}

impl ManualListSource {
    /// Create a manual list source from configuration.
    pub fn new(config: ManualListConfig) -> Self {
        Self {
            config,
            id_field: fields::ID.to_string(),
        }
    }

    /// Write derived ids under `id_field` instead of the default key.
    pub fn with_id_field(mut self, id_field: impl Into<FieldName>) -> Self {
        self.id_field = id_field.into();
        self
    }

    fn load_entries(&self) -> Result<Vec<RawRecord>, DigestError> {
        let Some(path) = self.config.path.as_ref() else {
            return Ok(self.config.entries.clone());
        };
        let raw = fs::read_to_string(path).map_err(|err| DigestError::SourceUnavailable {
            source_id: self.config.id.clone(),
            reason: format!("failed to read {}: {err}", path.display()),
        })?;
        let parsed: Vec<Value> =
            serde_json::from_str(&raw).map_err(|err| DigestError::SourceUnavailable {
                source_id: self.config.id.clone(),
                reason: format!("failed to parse {}: {err}", path.display()),
            })?;
        parsed.into_iter().map(RawRecord::try_from).collect()
    }

    fn derived_id(&self, name: &str) -> String {
        let prefix = self.config.id_prefix.as_deref().unwrap_or(&self.config.id);
        let slug = name.replace('#', "").trim().to_lowercase().replace(' ', "_");
        format!("{prefix}_{slug}")
    }
}

impl RecordSource for ManualListSource {
    fn id(&self) -> &str {
        &self.config.id
    }

    fn platform(&self) -> &str {
        &self.config.platform
    }

    fn fetch(&self) -> Result<Vec<RawRecord>, DigestError> {
        let mut entries = self.load_entries()?;
        for entry in &mut entries {
            let Some(name) = entry.text(fields::NAME) else {
                continue;
            };
            if entry.get(&self.id_field).is_none() {
                let id = self.derived_id(&name);
                entry.insert(self.id_field.clone(), id);
            }
            if entry.get(fields::TITLE).is_none() {
                entry.insert(fields::TITLE, name);
            }
        }
        debug!(
            source_id = %self.config.id,
            entry_count = entries.len(),
            "manual list loaded"
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn entry(value: Value) -> RawRecord {
        RawRecord::try_from(value).unwrap()
    }

    fn text(record: &RawRecord, key: &str) -> String {
        record.text(key).unwrap_or_default()
    }

    #[test]
    fn derives_ids_and_titles_from_names() {
        let entries = vec![
            entry(json!({"name": "PCOS Sisters Group", "members": "12K"})),
            entry(json!({"id": "custom", "name": "Kept"})),
        ];
        let config = ManualListConfig::new("facebook", "Facebook");
        let records = ManualListSource::new(config.with_entries(entries))
            .fetch()
            .unwrap();
        assert_eq!(text(&records[0], "id"), "facebook_pcos_sisters_group");
        assert_eq!(text(&records[0], "title"), "PCOS Sisters Group");
        assert_eq!(text(&records[1], "id"), "custom");
    }

    #[test]
    fn prefix_override_and_hash_stripping() {
        let config = ManualListConfig::new("ig_manual", "Instagram")
            .with_id_prefix("instagram")
            .with_entries(vec![entry(json!({"name": "#PCOSWarrior"}))]);
        let records = ManualListSource::new(config).fetch().unwrap();
        assert_eq!(text(&records[0], "id"), "instagram_pcoswarrior");
    }

    #[test]
    fn reads_entries_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Endo Warriors", "members": 500}}, {{"name": "Thyroid Talk"}}]"#
        )
        .unwrap();
        let config = ManualListConfig::new("discord", "Discord");
        let records = ManualListSource::new(config.with_path(file.path()))
            .fetch()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(text(&records[1], "id"), "discord_thyroid_talk");
    }

    #[test]
    fn missing_or_malformed_files_are_source_errors() {
        let config = ManualListConfig::new("discord", "Discord");
        let missing = config.clone().with_path("/nonexistent/list.json");
        assert!(matches!(
            ManualListSource::new(missing).fetch(),
            Err(DigestError::SourceUnavailable { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let malformed = config.with_path(file.path());
        assert!(ManualListSource::new(malformed).fetch().is_err());
    }

    #[test]
    fn relative_paths_resolve_against_base() {
        let config = ManualListConfig::new("x", "X")
            .with_path("lists/x.json")
            .resolve_path(Path::new("/etc/digest"));
        let expected = PathBuf::from("/etc/digest/lists/x.json");
        assert_eq!(config.path, Some(expected));
    }

    #[test]
    fn custom_id_field_is_respected() {
        let config = ManualListConfig::new("tw", "Twitter/X")
            .with_entries(vec![entry(json!({"name": "Menopause Chat"}))]);
        let records = ManualListSource::new(config)
            .with_id_field("key")
            .fetch()
            .unwrap();
        assert_eq!(text(&records[0], "key"), "tw_menopause_chat");
        assert!(records[0].get("id").is_none());
    }
}

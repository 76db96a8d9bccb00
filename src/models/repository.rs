use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// License metadata as detected by GitHub
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub spdx_id: Option<String>,
}

/// README payload as returned by the contents API.
///
/// An absent README is stored as `{}`, so both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Readme {
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Readme {
    /// Wraps plain text the same way the contents API does
    pub fn from_text(text: &str) -> Self {
        Self {
            encoding: Some("base64".to_string()),
            content: Some(STANDARD.encode(text.as_bytes())),
        }
    }

    /// Decodes the payload into text.
    ///
    /// Only `base64` payloads are understood. The API wraps the encoded
    /// content at 60 columns, so embedded whitespace is skipped.
    pub fn decoded_text(&self) -> Option<String> {
        match (self.encoding.as_deref(), self.content.as_deref()) {
            (Some("base64"), Some(content)) => {
                let compact: String = content
                    .chars()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                match STANDARD.decode(compact) {
                    Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(e) => {
                        tracing::warn!(error = %e, "README payload is not valid base64");
                        None
                    }
                }
            }
            (Some(encoding), Some(_)) => {
                tracing::debug!(encoding = %encoding, "Unsupported README encoding");
                None
            }
            _ => None,
        }
    }
}

/// One repository as produced by the extraction step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub owner: String,
    pub repo: String,
    #[serde(default)]
    pub fork: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub license: Option<License>,
    /// Language name to bytes of code
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: BTreeMap<String, u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub topics: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub readme: Option<Readme>,
    /// Whether the requesting user contributed to this repository
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributor: Option<bool>,
    /// False for entries the extractor skipped (e.g. unaccepted license)
    #[serde(default = "default_valid")]
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

fn default_valid() -> bool {
    true
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RepositoryRecord {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            fork: false,
            license: None,
            languages: BTreeMap::new(),
            topics: Vec::new(),
            readme: None,
            contributor: None,
            valid: true,
            fetched_at: None,
        }
    }

    pub fn with_language(mut self, language: &str, bytes: u64) -> Self {
        self.languages.insert(language.to_string(), bytes);
        self
    }

    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topics.push(topic.to_string());
        self
    }

    pub fn with_readme(mut self, text: &str) -> Self {
        self.readme = Some(Readme::from_text(text));
        self
    }

    /// `owner/repo`, the identity used for exclusion and tie-breaking
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn readme_text(&self) -> Option<String> {
        self.readme.as_ref().and_then(Readme::decoded_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readme_round_trips_through_base64() {
        let readme = Readme::from_text("Fast JSON parser");
        assert_eq!(readme.decoded_text().as_deref(), Some("Fast JSON parser"));
    }

    #[test]
    fn test_readme_ignores_line_wrapping() {
        let readme = Readme {
            encoding: Some("base64".to_string()),
            content: Some("SGVsbG8g\nV29ybGQ=\n".to_string()),
        };
        assert_eq!(readme.decoded_text().as_deref(), Some("Hello World"));
    }

    #[test]
    fn test_readme_without_encoding_is_absent() {
        assert_eq!(Readme::default().decoded_text(), None);
        let plain = Readme {
            encoding: Some("utf-8".to_string()),
            content: Some("text".to_string()),
        };
        assert_eq!(plain.decoded_text(), None);
    }

    #[test]
    fn test_deserialize_extractor_output() {
        let json = r#"{
            "owner": "octo",
            "repo": "parser",
            "fork": false,
            "license": {"key": "mit", "name": "MIT License", "spdx_id": "MIT"},
            "readme": {},
            "topics": ["json", "parsing"],
            "languages": null,
            "valid": true
        }"#;
        let record: RepositoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.full_name(), "octo/parser");
        assert!(record.languages.is_empty());
        assert_eq!(record.topics.len(), 2);
        assert_eq!(record.readme_text(), None);
        assert_eq!(record.license.unwrap().key.as_deref(), Some("mit"));
    }

    #[test]
    fn test_skipped_entry_deserializes_as_invalid() {
        let json = r#"{"owner": "octo", "repo": "gpl-thing", "valid": false}"#;
        let record: RepositoryRecord = serde_json::from_str(json).unwrap();
        assert!(!record.valid);
        assert!(record.topics.is_empty());
    }
}

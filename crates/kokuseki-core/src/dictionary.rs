//! # Dictionary Store
//!
//! Exact-match override table from a canonical display name to its known
//! nationality labels. Loaded once at startup from a JSON mapping
//! (`{"Kim Jong-un": ["Korean"], ...}`) and immutable afterwards.
//!
//! A missing or unreadable dictionary is not an error: the store degrades to
//! empty and the engine serves model-only predictions. The failure is logged
//! so operators can tell the override table is absent.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{KokusekiError, Result};

/// Immutable name -> nationality-labels lookup table.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: HashMap<String, Vec<String>>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a dictionary from in-memory pairs. Primarily for tests and
    /// embedding hosts that manage their own persistence.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<String>)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, labels)| (name.into(), labels))
                .collect(),
        }
    }

    /// Load the dictionary from a JSON mapping file.
    ///
    /// Never fails: any load error is logged with `tracing::warn!` and an
    /// empty store is returned, so the engine keeps serving model-only
    /// predictions.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(dict) => {
                tracing::info!(
                    path = %path.display(),
                    entries = dict.len(),
                    "loaded nationality dictionary"
                );
                dict
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "dictionary unavailable, continuing with model-only predictions"
                );
                Self::empty()
            }
        }
    }

    /// Strict variant of [`Dictionary::load`] that surfaces the failure.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| KokusekiError::Dictionary(format!("read {}: {e}", path.display())))?;
        let entries: HashMap<String, Vec<String>> = serde_json::from_str(&raw)
            .map_err(|e| KokusekiError::Dictionary(format!("parse {}: {e}", path.display())))?;
        Ok(Self { entries })
    }

    /// Exact-match lookup of a restored display name.
    pub fn lookup(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Number of known names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_lookup_hit_and_miss() {
        let dict = Dictionary::from_entries([("Kim Jong-un", vec!["Korean".to_string()])]);
        assert_eq!(dict.lookup("Kim Jong-un"), Some(&["Korean".to_string()][..]));
        assert_eq!(dict.lookup("Angela Merkel"), None);
    }

    #[test]
    fn test_load_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Kim Jong-un": ["Korean"], "Jing Xu": ["Chinese", "American"]}}"#
        )
        .unwrap();

        let dict = Dictionary::load(file.path());
        assert_eq!(dict.len(), 2);
        assert_eq!(
            dict.lookup("Jing Xu"),
            Some(&["Chinese".to_string(), "American".to_string()][..])
        );
    }

    #[test]
    fn test_missing_file_degrades_to_empty() {
        let dict = Dictionary::load("/nonexistent/name2nats.json");
        assert!(dict.is_empty());
        assert_eq!(dict.lookup("Kim Jong-un"), None);
    }

    #[test]
    fn test_malformed_json_degrades_to_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json at all").unwrap();

        let dict = Dictionary::load(file.path());
        assert!(dict.is_empty());
    }

    #[test]
    fn test_try_load_surfaces_errors() {
        let err = Dictionary::try_load("/nonexistent/name2nats.json").unwrap_err();
        assert!(err.to_string().contains("name2nats.json"));
        assert!(!err.is_retryable());
    }
}

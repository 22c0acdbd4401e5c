//! Backend selection from a declarative configuration set.

use crate::providers::{AzureClient, OllamaClient};
use crate::types::{ProviderEntry, ProviderSet};
use crate::{Error, TextProvider};

/// Constructs the active backend client from a configuration set.
///
/// Selection is pure and one-shot: it walks the set once, builds a client,
/// and performs no network activity itself.
pub struct ProviderSelector;

impl ProviderSelector {
    /// Walk the set in document order and construct a client from the
    /// first bundle with `enabled: true`.
    pub fn select(set: &ProviderSet) -> Result<Box<dyn TextProvider>, Error> {
        for (name, entry) in set.entries() {
            if entry.enabled {
                return Self::create(name, entry);
            }
        }
        Err(Error::NoProviderConfigured)
    }

    /// Construct a client for a named backend directly.
    pub fn create(name: &str, entry: &ProviderEntry) -> Result<Box<dyn TextProvider>, Error> {
        match name {
            "azure" => Ok(Box::new(AzureClient::from_entry(entry)?)),
            "ollama" => Ok(Box::new(OllamaClient::from_entry(entry)?)),
            other => Err(Error::UnsupportedBackend(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ollama_entry(enabled: bool, model: &str) -> ProviderEntry {
        ProviderEntry {
            enabled,
            model: Some(model.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_enabled_bundle_wins() {
        let set = ProviderSet::new(vec![
            ("ollama".to_string(), ollama_entry(false, "skipped")),
            ("ollama".to_string(), ollama_entry(true, "first")),
            ("ollama".to_string(), ollama_entry(true, "second")),
        ]);
        let provider = ProviderSelector::select(&set).unwrap();
        assert_eq!(provider.supported_models(), vec!["first"]);
    }

    #[test]
    fn test_selection_is_deterministic() {
        let set = ProviderSet::new(vec![
            ("ollama".to_string(), ollama_entry(true, "a")),
            ("ollama".to_string(), ollama_entry(true, "b")),
        ]);
        for _ in 0..10 {
            let provider = ProviderSelector::select(&set).unwrap();
            assert_eq!(provider.supported_models(), vec!["a"]);
        }
    }

    #[test]
    fn test_no_enabled_bundle() {
        let set = ProviderSet::new(vec![
            ("azure".to_string(), ProviderEntry::default()),
            ("ollama".to_string(), ollama_entry(false, "llama2")),
        ]);
        assert!(matches!(
            ProviderSelector::select(&set),
            Err(Error::NoProviderConfigured)
        ));

        assert!(matches!(
            ProviderSelector::select(&ProviderSet::default()),
            Err(Error::NoProviderConfigured)
        ));
    }

    #[test]
    fn test_unsupported_backend_name() {
        let err = ProviderSelector::create("bedrock", &ProviderEntry::default()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedBackend(name) if name == "bedrock"));

        let set = ProviderSet::new(vec![(
            "bedrock".to_string(),
            ProviderEntry {
                enabled: true,
                ..Default::default()
            },
        )]);
        assert!(matches!(
            ProviderSelector::select(&set),
            Err(Error::UnsupportedBackend(_))
        ));
    }
}

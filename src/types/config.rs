//! Configuration-set types for backend selection.
//!
//! These types describe the inbound configuration shape; actually loading and
//! validating a configuration file belongs to the caller.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::fmt;

/// One addressable model within a gateway backend. Immutable once loaded.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSpec {
    /// Deployment the model is routed to on the gateway.
    pub deployment_name: String,
    /// Body-level model identifier, required by some gateway models.
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

/// A named bundle of connection parameters for one backend. Which fields are
/// meaningful depends on the backend the bundle is keyed under.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderEntry {
    #[serde(default)]
    pub enabled: bool,
    /// Remote gateway endpoint.
    pub endpoint: Option<String>,
    /// Local daemon base URL.
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    /// Model table for the remote gateway (name -> spec).
    #[serde(default)]
    pub models: HashMap<String, ModelSpec>,
    /// Single configured model for the local daemon.
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Model used when the caller does not name one.
    pub default_model: Option<String>,
    /// Model code analysis is routed to.
    pub analysis_model: Option<String>,
}

/// The full configuration set: an ordered sequence of (name, bundle) pairs.
///
/// Order matters: selection walks the entries in document order and the
/// first enabled bundle wins, so deserialization keeps the pairs as a
/// sequence instead of collecting them into a map.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSet {
    #[serde(default, deserialize_with = "ordered_entries")]
    providers: Vec<(String, ProviderEntry)>,
}

impl ProviderSet {
    pub fn new(providers: Vec<(String, ProviderEntry)>) -> Self {
        Self { providers }
    }

    /// Entries in document order.
    pub fn entries(&self) -> &[(String, ProviderEntry)] {
        &self.providers
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

fn ordered_entries<'de, D>(deserializer: D) -> Result<Vec<(String, ProviderEntry)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct EntriesVisitor;

    impl<'de> Visitor<'de> for EntriesVisitor {
        type Value = Vec<(String, ProviderEntry)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of provider name to provider entry")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(pair) = map.next_entry::<String, ProviderEntry>()? {
                entries.push(pair);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor)
}

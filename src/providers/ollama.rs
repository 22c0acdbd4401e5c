//! Local-daemon backend client.
//!
//! Talks to a locally running inference daemon over newline-delimited JSON.
//! A single model is configured per client; a cheap catalog probe runs
//! before every generation so an unreachable or unprovisioned daemon fails
//! fast instead of timing out on a streaming call.

use crate::accumulator::accumulate;
use crate::json_lines::JsonLines;
use crate::prompt;
use crate::provider::TextProvider;
use crate::sink::ProgressSink;
use crate::types::ProviderEntry;
use crate::Error;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const BACKEND: &str = "ollama";
const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama2";
/// Local inference can be slow for large models.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
/// Independent of the generation timeout; the probe must stay cheap.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TaggedModel>,
}

#[derive(Debug, Deserialize)]
struct TaggedModel {
    name: String,
}

/// Client for the local daemon backend.
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
    timeout: Duration,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl OllamaClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, Error> {
        let timeout = timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport(BACKEND, "failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
            sink: None,
        })
    }

    /// Create a client from a configuration bundle, applying the defaults
    /// for anything the bundle leaves out.
    pub fn from_entry(entry: &ProviderEntry) -> Result<Self, Error> {
        Self::new(
            entry.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL),
            entry.model.as_deref().unwrap_or(DEFAULT_MODEL),
            entry.timeout_secs.map(Duration::from_secs),
        )
    }

    /// Attach a sink that receives fragments for progressive display.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Reachability and model-presence probe against the catalog endpoint.
    async fn check_available(&self) -> Result<(), Error> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                Error::unavailable(format!(
                    "cannot reach daemon at {}: {e}. Make sure it is running",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            return Err(Error::unavailable(format!(
                "catalog probe returned {} from {}",
                response.status(),
                self.base_url
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| Error::unavailable(format!("malformed catalog response: {e}")))?;

        if !tags.models.iter().any(|m| m.name == self.model) {
            return Err(Error::unavailable(format!(
                "model '{}' not available at {}. Make sure it is pulled",
                self.model, self.base_url
            )));
        }
        Ok(())
    }

    /// Live model catalog. Best effort: an unreachable daemon yields an
    /// empty list, not an error.
    pub async fn available_models(&self) -> Vec<String> {
        let url = format!("{}/api/tags", self.base_url);
        let response = match self.client.get(&url).timeout(PROBE_TIMEOUT).send().await {
            Ok(response) if response.status().is_success() => response,
            _ => return Vec::new(),
        };
        match response.json::<TagsResponse>().await {
            Ok(tags) => tags.models.into_iter().map(|m| m.name).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn classify_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_connect() {
            Error::transport(
                BACKEND,
                format!(
                    "cannot connect to daemon at {}. Make sure it is running and accessible",
                    self.base_url
                ),
                e,
            )
        } else if e.is_timeout() {
            Error::transport(
                BACKEND,
                format!("request timed out after {} seconds", self.timeout.as_secs()),
                e,
            )
        } else {
            Error::transport(BACKEND, "request failed", e)
        }
    }
}

#[async_trait::async_trait]
impl TextProvider for OllamaClient {
    async fn generate_text(
        &self,
        prompt: &str,
        model: Option<&str>,
        system_prompt: Option<&str>,
    ) -> Result<String, Error> {
        if let Some(requested) = model {
            if requested != self.model {
                // Single-model client: no dynamic switching.
                tracing::warn!(
                    requested,
                    configured = %self.model,
                    "requested model differs from configured model; using configured model"
                );
            }
        }

        self.check_available().await?;

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: true,
            system: system_prompt,
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::request_failed(
                BACKEND,
                format!("API error {status}: {detail}"),
            ));
        }

        let decoder = JsonLines::new(BACKEND, response.bytes_stream());
        accumulate(decoder, self.sink.as_deref()).await
    }

    async fn generate_code(&self, prompt: &str, language: Option<&str>) -> Result<String, Error> {
        let system = prompt::code_system_prompt(language);
        self.generate_text(prompt, None, Some(&system)).await
    }

    async fn analyze_code(&self, code: &str, question: &str) -> Result<String, Error> {
        let prompt = prompt::analysis_prompt(code, question);
        self.generate_text(&prompt, None, Some(prompt::analysis_system_prompt()))
            .await
    }

    fn supported_models(&self) -> Vec<String> {
        vec![self.model.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_entry() {
        let client = OllamaClient::from_entry(&ProviderEntry::default()).unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_entry_overrides() {
        let entry = ProviderEntry {
            base_url: Some("http://10.0.0.5:11434/".into()),
            model: Some("codellama".into()),
            timeout_secs: Some(300),
            ..Default::default()
        };
        let client = OllamaClient::from_entry(&entry).unwrap();
        assert_eq!(client.base_url, "http://10.0.0.5:11434");
        assert_eq!(client.model, "codellama");
        assert_eq!(client.timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_supported_models_is_the_configured_model() {
        let client = OllamaClient::new(DEFAULT_BASE_URL, "mistral", None).unwrap();
        assert_eq!(client.supported_models(), vec!["mistral"]);
    }
}

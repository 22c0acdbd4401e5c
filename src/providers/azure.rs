//! Remote-gateway backend client.
//!
//! Speaks the gateway's deployment-addressed chat-completions API with
//! event-stream framing. One connection per call, released on every exit
//! path; nothing is cached across calls.

use crate::accumulator::accumulate;
use crate::event_stream::EventStream;
use crate::prompt;
use crate::provider::TextProvider;
use crate::sink::ProgressSink;
use crate::types::{conversation, Message, ModelSpec, ProviderEntry};
use crate::Error;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

const BACKEND: &str = "azure";
const DEFAULT_API_VERSION: &str = "2024-02-15-preview";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Models the original deployment routes to when the configuration does not
/// override them.
const DEFAULT_TEXT_MODEL: &str = "deepseek";
const DEFAULT_ANALYSIS_MODEL: &str = "claude";

/// Environment variable consulted when the bundle carries no credential.
pub const API_KEY_ENV: &str = "AZURE_OPENAI_API_KEY";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    stream: bool,
}

/// Client for the remote gateway backend.
pub struct AzureClient {
    client: Client,
    endpoint: String,
    api_key: String,
    api_version: String,
    models: HashMap<String, ModelSpec>,
    default_model: String,
    analysis_model: String,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl AzureClient {
    /// Create a client from explicit parameters. The credential falls back
    /// to [`API_KEY_ENV`] when `api_key` is `None`.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        models: HashMap<String, ModelSpec>,
    ) -> Result<Self, Error> {
        let api_key = api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                Error::missing_credential(format!(
                    "no API key in configuration or {API_KEY_ENV}"
                ))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::transport(BACKEND, "failed to build HTTP client", e))?;

        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key,
            api_version: DEFAULT_API_VERSION.to_string(),
            models,
            default_model: DEFAULT_TEXT_MODEL.to_string(),
            analysis_model: DEFAULT_ANALYSIS_MODEL.to_string(),
            sink: None,
        })
    }

    /// Create a client from a configuration bundle.
    pub fn from_entry(entry: &ProviderEntry) -> Result<Self, Error> {
        let endpoint = entry
            .endpoint
            .as_deref()
            .ok_or_else(|| Error::config("azure bundle has no endpoint"))?;

        let mut client = Self::new(endpoint, entry.api_key.clone(), entry.models.clone())?;
        if let Some(version) = &entry.api_version {
            client.api_version = version.clone();
        }
        if let Some(model) = &entry.default_model {
            client.default_model = model.clone();
        }
        if let Some(model) = &entry.analysis_model {
            client.analysis_model = model.clone();
        }
        Ok(client)
    }

    /// Attach a sink that receives fragments for progressive display.
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    fn resolve(&self, model: Option<&str>) -> Result<&ModelSpec, Error> {
        let name = model.unwrap_or(&self.default_model);
        self.models
            .get(name)
            .ok_or_else(|| Error::unknown_model(name))
    }

    fn deployment_url(&self, spec: &ModelSpec) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, spec.deployment_name, self.api_version
        )
    }
}

#[async_trait::async_trait]
impl TextProvider for AzureClient {
    async fn generate_text(
        &self,
        prompt: &str,
        model: Option<&str>,
        system_prompt: Option<&str>,
    ) -> Result<String, Error> {
        let spec = self.resolve(model)?;
        let messages = conversation(prompt, system_prompt);
        let body = ChatRequest {
            messages: &messages,
            max_tokens: spec.max_tokens,
            temperature: spec.temperature,
            model: spec.model_name.as_deref(),
            stream: true,
        };

        let response = self
            .client
            .post(self.deployment_url(spec))
            .header("api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::transport(BACKEND, "request could not be sent", e))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::request_failed(
                BACKEND,
                format!("API error {status}: {detail}"),
            ));
        }

        let decoder = EventStream::new(BACKEND, response.bytes_stream());
        accumulate(decoder, self.sink.as_deref()).await
    }

    async fn generate_code(&self, prompt: &str, language: Option<&str>) -> Result<String, Error> {
        let system = prompt::code_system_prompt(language);
        self.generate_text(prompt, None, Some(&system)).await
    }

    async fn analyze_code(&self, code: &str, question: &str) -> Result<String, Error> {
        let prompt = prompt::analysis_prompt(code, question);
        self.generate_text(
            &prompt,
            Some(self.analysis_model.as_str()),
            Some(prompt::analysis_system_prompt()),
        )
        .await
    }

    fn supported_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.models.keys().cloned().collect();
        models.sort();
        models
    }
}

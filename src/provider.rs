use crate::Error;

/// The capability set every backend must satisfy.
///
/// Every method suspends until the underlying stream reports completion or
/// fails; no intermediate state is retained after return.
#[async_trait::async_trait]
pub trait TextProvider: Send + Sync + 'static {
    /// Generate free text. An unknown `model` fails with
    /// [`Error::UnknownModel`]; `None` uses the backend's default model.
    async fn generate_text(
        &self,
        prompt: &str,
        model: Option<&str>,
        system_prompt: Option<&str>,
    ) -> Result<String, Error>;

    /// Generate code, optionally in a specific language. Wraps
    /// `generate_text` with a synthesized code-only system prompt and
    /// delegates to the backend's designated default model.
    async fn generate_code(&self, prompt: &str, language: Option<&str>) -> Result<String, Error>;

    /// Analyze a piece of code against a question. Wraps `generate_text`
    /// with a fixed analysis template and a structured-critique system
    /// prompt.
    async fn analyze_code(&self, code: &str, question: &str) -> Result<String, Error>;

    /// Models this backend accepts, from static configuration. For a
    /// backend whose catalog is only discoverable over the network this is
    /// the configured subset, not a live union.
    fn supported_models(&self) -> Vec<String>;
}

impl std::fmt::Debug for dyn TextProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn TextProvider")
    }
}

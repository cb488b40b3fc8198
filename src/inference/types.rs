use std::fmt;
use std::time::Duration;

/// Model used when neither the request nor the configuration names one.
pub const FALLBACK_MODEL: &str = "openai/gpt-oss-20b:free";
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-call knobs for a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Explicit model; wins over the configured default.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Provider settings, resolved once at startup and handed to the provider.
/// The provider never reads the process environment itself.
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub default_model: Option<String>,
}

impl ProviderConfig {
    /// Model selection: explicit → configured default → fallback.
    pub fn select_model(&self, explicit: Option<&str>) -> String {
        explicit
            .or(self.default_model.as_deref())
            .unwrap_or(FALLBACK_MODEL)
            .to_string()
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

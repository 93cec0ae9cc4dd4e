//! Configuration types and per-provider defaults for OpenAI-compatible providers.
//!
//! Each provider that speaks the OpenAI chat completions protocol gets a
//! factory function returning an [`OpenAiCompatConfig`] with the correct
//! base URL and defaults.

/// Default model when routing through OpenRouter's free tier.
pub const OPENROUTER_DEFAULT_MODEL: &str = "arcee-ai/trinity-large-preview:free";

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "openai", "openrouter").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.openai.com/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Default model identifier, used when a request leaves the model blank.
    pub model: String,
}

/// OpenAI default configuration.
///
/// Base URL: `https://api.openai.com/v1`
pub fn openai_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openai".into(),
        base_url: "https://api.openai.com/v1".into(),
        api_key: api_key.into(),
        model: model.into(),
    }
}

/// OpenRouter default configuration.
///
/// Base URL: `https://openrouter.ai/api/v1`
pub fn openrouter_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "openrouter".into(),
        base_url: "https://openrouter.ai/api/v1".into(),
        api_key: api_key.into(),
        model: model.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_defaults() {
        let config = openai_defaults("sk-test", "gpt-4o-mini");
        assert_eq!(config.provider_name, "openai");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_openrouter_defaults() {
        let config = openrouter_defaults("or-test", OPENROUTER_DEFAULT_MODEL);
        assert_eq!(config.provider_name, "openrouter");
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.model, "arcee-ai/trinity-large-preview:free");
    }
}

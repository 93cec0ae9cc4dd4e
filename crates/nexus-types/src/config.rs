//! Runtime settings for the chat backend.
//!
//! Settings are loaded once at process start (see `nexus-infra::settings`)
//! and injected through application state. A missing provider is a
//! representable state: requests that need one fail with a service-unavailable
//! response instead of the process refusing to boot.

use serde::{Deserialize, Serialize};

/// Credentials and endpoint for the completion provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Provider name (e.g., "openai", "openrouter").
    pub name: String,
    pub api_key: String,
    pub base_url: String,
}

/// Model identifiers for each dispatch role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRoster {
    /// Economical model for plain text turns.
    pub default_model: String,
    /// Multimodal-capable model, used when media is attached.
    pub multimodal_model: String,
    /// Search-capable model, used when web search is requested without media.
    pub search_model: String,
    /// Fixed fallback model reissued when the primary attempt fails.
    pub fallback_model: String,
    /// Fast model for auxiliary calls (suggestions, titles).
    pub auxiliary_model: String,
}

impl Default for ModelRoster {
    fn default() -> Self {
        Self {
            default_model: "gpt-4o-mini".to_string(),
            multimodal_model: "gpt-4o".to_string(),
            search_model: "gpt-4o".to_string(),
            fallback_model: "gpt-4o-mini".to_string(),
            auxiliary_model: "gpt-4o-mini".to_string(),
        }
    }
}

/// Complete runtime settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Completion provider; `None` when no credentials are configured.
    pub provider: Option<ProviderSettings>,
    #[serde(default)]
    pub models: ModelRoster,
    /// Password gating the training-instruction management surface.
    pub training_password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roster_defaults() {
        let roster = ModelRoster::default();
        assert_eq!(roster.default_model, "gpt-4o-mini");
        assert_eq!(roster.multimodal_model, "gpt-4o");
        assert_eq!(roster.search_model, "gpt-4o");
        assert_eq!(roster.fallback_model, "gpt-4o-mini");
    }

    #[test]
    fn test_settings_default_has_no_provider() {
        let settings = Settings::default();
        assert!(settings.provider.is_none());
        assert!(settings.training_password.is_none());
    }
}

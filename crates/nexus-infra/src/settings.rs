//! Environment settings loader.
//!
//! Builds the explicitly injected [`Settings`] object at process start.
//! Missing provider credentials degrade gracefully: the process boots, a
//! warning is logged, and chat endpoints answer with service-unavailable.
//!
//! Recognized variables:
//! - `NEXUS_OPENAI_API_KEY` / `NEXUS_OPENAI_BASE_URL` -- primary provider
//! - `NEXUS_OPENROUTER_API_KEY` -- OpenRouter, tried when OpenAI is unset
//! - `NEXUS_TRAINING_PASSWORD` -- gates the training management surface
//! - `NEXUS_DATA_DIR` / `NEXUS_OBJECT_DIR` -- data and object-store roots

use std::path::PathBuf;

use nexus_types::config::{ModelRoster, ProviderSettings, Settings};

use crate::llm::openai_compat::config::OPENROUTER_DEFAULT_MODEL;

/// Load settings from the environment.
pub fn load_settings() -> Settings {
    let provider = resolve_provider();
    let mut models = ModelRoster::default();
    if let Some(p) = &provider {
        // OpenRouter's economical default differs from OpenAI's.
        if p.name == "openrouter" {
            models.default_model = OPENROUTER_DEFAULT_MODEL.to_string();
        }
    }

    let training_password = std::env::var("NEXUS_TRAINING_PASSWORD").ok();
    if training_password.is_none() {
        tracing::warn!(
            "NEXUS_TRAINING_PASSWORD is not set; the training feature is disabled"
        );
    }

    Settings {
        provider,
        models,
        training_password,
    }
}

fn resolve_provider() -> Option<ProviderSettings> {
    if let Ok(api_key) = std::env::var("NEXUS_OPENAI_API_KEY") {
        let base_url = std::env::var("NEXUS_OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        return Some(ProviderSettings {
            name: "openai".to_string(),
            api_key,
            base_url,
        });
    }

    if let Ok(api_key) = std::env::var("NEXUS_OPENROUTER_API_KEY") {
        return Some(ProviderSettings {
            name: "openrouter".to_string(),
            api_key,
            base_url: "https://openrouter.ai/api/v1".to_string(),
        });
    }

    tracing::warn!(
        "no provider credentials configured (NEXUS_OPENAI_API_KEY / NEXUS_OPENROUTER_API_KEY); \
         chat endpoints will answer 503"
    );
    None
}

/// Resolve the data directory: `NEXUS_DATA_DIR`, falling back to `~/.nexus`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("NEXUS_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nexus")
}

/// Resolve the object-store root: `NEXUS_OBJECT_DIR`, falling back to
/// `{data_dir}/objects`.
pub fn resolve_object_dir(data_dir: &std::path::Path) -> PathBuf {
    if let Ok(dir) = std::env::var("NEXUS_OBJECT_DIR") {
        return PathBuf::from(dir);
    }
    data_dir.join("objects")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_dir_defaults_under_data_dir() {
        // Only meaningful when the override is absent, which is the common
        // test environment.
        if std::env::var("NEXUS_OBJECT_DIR").is_err() {
            let dir = resolve_object_dir(std::path::Path::new("/tmp/nexus-data"));
            assert_eq!(dir, PathBuf::from("/tmp/nexus-data/objects"));
        }
    }
}

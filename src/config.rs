use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacesConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub llm: LlmConfig,
    pub places: PlacesConfig,
    pub http_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} is not set"));

        let database_url = required("DATABASE_URL")?;
        let llm = LlmConfig {
            api_key: required("OPENAI_API_KEY")?,
            base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".into()),
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".into()),
        };
        let places = PlacesConfig {
            api_key: required("AMAP_KEY")?,
            base_url: lookup("AMAP_BASE_URL")
                .unwrap_or_else(|| "https://restapi.amap.com/v3".into()),
        };
        let http_timeout_secs = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(30);

        Ok(Self {
            database_url,
            llm,
            places,
            http_timeout_secs,
        })
    }
}

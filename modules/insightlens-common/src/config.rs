use anyhow::{Context, Result};

/// Which chat-completion provider the summarizer talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    OpenAi,
    OpenRouter,
}

/// Application configuration loaded from environment variables.
/// Only the storage location and bind address are required; every
/// upstream credential is optional and its absence degrades the
/// corresponding adapter or provider instead of failing startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Storage
    pub database_path: String,

    // Upstream credentials
    pub news_api_key: Option<String>,
    pub youtube_api_key: Option<String>,

    // LLM
    pub llm_provider: LlmProvider,
    pub llm_model: String,
    pub openai_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,

    // Feeds
    pub rss_region: String,

    // Web server
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let llm_provider = match std::env::var("LLM_PROVIDER").as_deref() {
            Ok("openrouter") => LlmProvider::OpenRouter,
            _ => LlmProvider::OpenAi,
        };

        Ok(Self {
            database_path: std::env::var("INSIGHTLENS_DB_PATH")
                .unwrap_or_else(|_| "data/insightlens.db".to_string()),
            news_api_key: std::env::var("NEWS_API_KEY").ok(),
            youtube_api_key: std::env::var("YOUTUBE_API_KEY").ok(),
            llm_provider,
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openrouter_api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            rss_region: std::env::var("INSIGHTLENS_RSS_REGION")
                .unwrap_or_else(|_| "IN:en".to_string()),
            host: std::env::var("INSIGHTLENS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("INSIGHTLENS_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .context("INSIGHTLENS_PORT must be a number")?,
        })
    }

    /// The credential for the selected completion provider, if configured.
    pub fn completion_api_key(&self) -> Option<&str> {
        match self.llm_provider {
            LlmProvider::OpenAi => self.openai_api_key.as_deref(),
            LlmProvider::OpenRouter => self.openrouter_api_key.as_deref(),
        }
    }
}

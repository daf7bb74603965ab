use skypad_search::types::SkypadConfig;

/// Log output format. Env: `SKYPAD_LOG_JSON`, default plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_env() -> Self {
        Self::from_value(std::env::var("SKYPAD_LOG_JSON").ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Load connection and provider settings from the environment (and `.env`).
///
/// # Errors
/// Returns an error if `NEO4J_PASSWORD` is missing or a numeric variable
/// cannot be parsed.
pub fn load() -> anyhow::Result<SkypadConfig> {
    SkypadConfig::from_env().map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))
}

use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub sheets_api_key: String,
    pub spreadsheet_id: String,
    /// TTS is enabled only when an API key is present.
    pub tts_api_key: Option<String>,
    pub tts_voice: String,
    pub tts_language_code: String,
    pub server_host: String,
    pub server_port: u16,
    /// Allowed CORS origins (comma-separated). Use "*" for any origin (development only).
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY environment variable must be set"))?;

        let sheets_api_key = env::var("GOOGLE_SHEETS_API_KEY").map_err(|_| {
            anyhow::anyhow!("GOOGLE_SHEETS_API_KEY environment variable must be set")
        })?;

        let spreadsheet_id = env::var("SPREADSHEET_ID")
            .map_err(|_| anyhow::anyhow!("SPREADSHEET_ID environment variable must be set"))?;

        // Parse CORS origins - default to localhost for development
        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:8000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Config {
            gemini_api_key,
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string()),
            sheets_api_key,
            spreadsheet_id,
            tts_api_key: env::var("TTS_API_KEY").ok(),
            tts_voice: env::var("TTS_VOICE").unwrap_or_else(|_| "ru-RU-Wavenet-C".to_string()),
            tts_language_code: env::var("TTS_LANGUAGE_CODE")
                .unwrap_or_else(|_| "ru-RU".to_string()),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8000),
            cors_origins,
        })
    }
}

//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

/// Runtime configuration for hrdesk-server.
///
/// Every field except the Gemini API key has a default, so the server starts
/// without any environment variables set. Chat requests fail with the
/// generic apology until `GOOGLE_API_KEY` is provided.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// sqlx database URL (default: `"sqlite://hrdesk.db?mode=rwc"`).
    pub database_url: String,

    /// Root directory for uploaded files. Documents land in `<media>/documents/`.
    pub media_dir: PathBuf,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve `/swagger-ui` and `/api-docs/openapi.json`.
    pub enable_swagger: bool,

    /// Upper bound for a multipart upload body, in MiB.
    pub max_upload_size_mb: usize,

    /// Mark the sign-in cookie `Secure`; enable when served over HTTPS.
    pub secure_cookies: bool,

    /// Gemini API key (`GOOGLE_API_KEY`).
    pub google_api_key: String,

    /// Gemini REST base URL, overridable for proxies and tests.
    pub gemini_base_url: String,

    pub embedding_model: String,
    pub chat_model: String,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("HRDESK_BIND", "0.0.0.0:8000"),
            database_url: env_or("HRDESK_DATABASE_URL", "sqlite://hrdesk.db?mode=rwc"),
            media_dir: PathBuf::from(env_or("HRDESK_MEDIA_DIR", "media")),
            log_level: env_or("HRDESK_LOG", "info"),
            log_json: env_flag("HRDESK_LOG_JSON", false),
            cors_allowed_origins: std::env::var("HRDESK_CORS_ORIGINS")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            enable_swagger: env_flag("HRDESK_ENABLE_SWAGGER", true),
            max_upload_size_mb: parse_env("HRDESK_MAX_UPLOAD_SIZE_MB", 20),
            secure_cookies: env_flag("HRDESK_SECURE_COOKIES", false),
            google_api_key: env_or("GOOGLE_API_KEY", ""),
            gemini_base_url: env_or("HRDESK_GEMINI_BASE_URL", hrdesk_rag::GEMINI_BASE_URL),
            embedding_model: env_or(
                "HRDESK_EMBEDDING_MODEL",
                hrdesk_rag::embed::DEFAULT_EMBEDDING_MODEL,
            ),
            chat_model: env_or("HRDESK_CHAT_MODEL", hrdesk_rag::llm::DEFAULT_CHAT_MODEL),
        }
    }

    /// Directory holding uploaded policy documents.
    pub fn documents_dir(&self) -> PathBuf {
        self.media_dir.join("documents")
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

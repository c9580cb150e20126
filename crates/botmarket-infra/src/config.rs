//! Environment-driven runtime settings.

/// Runtime settings resolved from the environment at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// SQLite database URL.
    pub database_url: String,
    /// Telegram Bot API base, up to and excluding the token.
    pub telegram_api_url: String,
    /// Bot token; empty disables outbound Telegram delivery in practice.
    pub telegram_bot_token: String,
}

impl Settings {
    /// Resolve settings from `BOTMARKET_DATA_DIR`, `TELEGRAM_API_URL`, and
    /// `TELEGRAM_BOT_TOKEN`, with local-development defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: default_database_url(),
            telegram_api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| "https://api.telegram.org/bot".to_string()),
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
        }
    }
}

/// Returns the default database URL based on the `BOTMARKET_DATA_DIR` env
/// var, falling back to `~/.botmarket/botmarket.db`.
pub fn default_database_url() -> String {
    let data_dir = std::env::var("BOTMARKET_DATA_DIR").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{home}/.botmarket")
    });
    format!("sqlite://{data_dir}/botmarket.db")
}

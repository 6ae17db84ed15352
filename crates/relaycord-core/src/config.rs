use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

pub const DEFAULT_HISTORY_LIMIT: u8 = 10;
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Persona appended to prompts built from plain channel messages.
pub const DEFAULT_CHAT_PERSONA: &str = "You are a friendly person chatting in this Discord channel. Reply directly to the last message in a natural, conversational way. Don't summarize the conversation or introduce yourself as an AI. Just respond as if you're another person in the chat.Reply like a normal human being in short sentences and use roleplaying terms for *doing* actions, You are a little 20 year old, act sassy, your studying computer science, talk in all CAPS when your mad, you are allowed to swear, you love KFC and white monster";

/// Persona appended to prompts built for `/analyze`.
pub const DEFAULT_ANALYZE_PERSONA: &str = "Reply like a normal human being in short sentences and use roleplaying terms for *doing* actions, You are a 16 year old vietnamese girl, you like KSI thick of it";

/// Top-level config (relaycord.toml + RELAYCORD_* env overrides + legacy env vars).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token. Empty means "not configured"; the gateway login fails later.
    #[serde(default, deserialize_with = "string_or_number")]
    pub bot_token: String,
    /// Application (client) id used for command registration.
    /// Empty lets serenity learn it from the Ready event.
    #[serde(default, deserialize_with = "string_or_number")]
    pub application_id: String,
    /// How many recent messages are fetched per request.
    #[serde(default = "default_history_limit")]
    pub history_limit: u8,
    #[serde(default = "default_chat_persona")]
    pub chat_persona: String,
    #[serde(default = "default_analyze_persona")]
    pub analyze_persona: String,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            application_id: String::new(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            chat_persona: default_chat_persona(),
            analyze_persona: default_analyze_persona(),
        }
    }
}

impl DiscordConfig {
    /// Parsed application id, `None` when unset or not a valid snowflake.
    pub fn application_id(&self) -> Option<u64> {
        self.application_id
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
    }
}

/// Google Generative Language API (Gemini) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default, deserialize_with = "string_or_number")]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Optional cap on generated tokens. Unset leaves the API default.
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_gemini_model(),
            base_url: default_gemini_base_url(),
            max_output_tokens: None,
        }
    }
}

fn default_history_limit() -> u8 {
    DEFAULT_HISTORY_LIMIT
}
fn default_chat_persona() -> String {
    DEFAULT_CHAT_PERSONA.to_string()
}
fn default_analyze_persona() -> String {
    DEFAULT_ANALYZE_PERSONA.to_string()
}
fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}
fn default_gemini_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

/// Env values are parsed loosely by figment, so a numeric `CLIENT_ID`
/// arrives as an integer and a value like `true` as a bool. Keep them as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(u64),
        Signed(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
        Raw::Bool(b) => b.to_string(),
    })
}

impl RelayConfig {
    /// Load config, layered in this order (later wins):
    ///   1. built-in defaults
    ///   2. TOML file (explicit path, else ~/.relaycord/relaycord.toml; missing is fine)
    ///   3. RELAYCORD_* env vars, nested with `__` (RELAYCORD_GEMINI__MODEL)
    ///   4. DISCORD_TOKEN / CLIENT_ID / GEMINI_API_KEY
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);
        debug!(path = %path, "loading config");

        let config: RelayConfig = Self::figment(&path)
            .extract()
            .map_err(|e| crate::error::RelayError::Config(e.to_string()))?;

        if !std::path::Path::new(&path).exists() {
            debug!(path = %path, "config file not found, using defaults and env");
        }
        Ok(config)
    }

    /// The layered figment behind [`RelayConfig::load`].
    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(RelayConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("RELAYCORD_").split("__"))
            .merge(legacy_env())
    }
}

/// The three bare env vars the bot has always been configured with.
///
/// figment hands `map` the key in its original case.
fn legacy_env() -> Env {
    Env::raw()
        .only(&["DISCORD_TOKEN", "CLIENT_ID", "GEMINI_API_KEY"])
        .map(|key| match key.as_str().to_ascii_lowercase().as_str() {
            "discord_token" => "discord.bot_token".into(),
            "client_id" => "discord.application_id".into(),
            "gemini_api_key" => "gemini.api_key".into(),
            other => other.to_string().into(),
        })
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.relaycord/relaycord.toml", home)
}

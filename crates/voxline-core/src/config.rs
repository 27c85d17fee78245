//! Voxline configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, VoxlineError};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoxlineConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub platform: PlatformConfig,
}

impl VoxlineConfig {
    /// Load config from `VOXLINE_CONFIG` or the default path
    /// (~/.voxline/config.toml). Missing file means defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("VOXLINE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Self::default_path());
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| VoxlineError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| VoxlineError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".voxline")
            .join("config.toml")
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Shared secret expected in the `x-vapi-secret` header.
    /// Empty means the check is disabled.
    #[serde(default)]
    pub webhook_secret: String,
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8080 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            webhook_secret: String::new(),
        }
    }
}

/// Scheduling gate configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Event kinds allowed to trigger session-based dispatch. Variables
    /// from other update kinds are still merged, they just cannot claim.
    #[serde(default = "default_update_triggers")]
    pub update_triggers: Vec<String>,
    /// Tool function name recognized as the scheduling action.
    #[serde(default = "default_scheduling_function")]
    pub scheduling_function: String,
    /// Sessions idle longer than this are evicted.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// How often the eviction sweep runs.
    #[serde(default = "default_sweep_secs")]
    pub sweep_secs: u64,
}

fn default_update_triggers() -> Vec<String> {
    vec!["conversation-update".into(), "tool.completed".into()]
}
fn default_scheduling_function() -> String { "scheduleMeeting".into() }
fn default_session_ttl_secs() -> u64 { 1800 }
fn default_sweep_secs() -> u64 { 300 }

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            update_triggers: default_update_triggers(),
            scheduling_function: default_scheduling_function(),
            session_ttl_secs: default_session_ttl_secs(),
            sweep_secs: default_sweep_secs(),
        }
    }
}

/// Google Calendar collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    /// IANA timezone label attached to event start/end times.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Static access token. Takes effect when no refresh credentials are set.
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Upper bound on each calendar API call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_calendar_id() -> String { "primary".into() }
fn default_timezone() -> String { "Asia/Kolkata".into() }
fn default_api_base() -> String { "https://www.googleapis.com/calendar/v3".into() }
fn default_token_url() -> String { "https://oauth2.googleapis.com/token".into() }
fn default_timeout_secs() -> u64 { 10 }

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            timezone: default_timezone(),
            api_base: default_api_base(),
            token_url: default_token_url(),
            access_token: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Voice-platform configuration, used by `voxline provision`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Falls back to the VAPI_API_KEY environment variable when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_platform_base")]
    pub base_url: String,
    /// Public URL of this relay's /webhook endpoint.
    #[serde(default)]
    pub webhook_url: String,
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
    #[serde(default = "default_first_message")]
    pub first_message: String,
    #[serde(default = "default_end_call_message")]
    pub end_call_message: String,
    #[serde(default = "default_model_provider")]
    pub model_provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_voice_provider")]
    pub voice_provider: String,
    #[serde(default = "default_voice_id")]
    pub voice_id: String,
    #[serde(default = "default_transcriber_provider")]
    pub transcriber_provider: String,
    #[serde(default = "default_transcriber_model")]
    pub transcriber_model: String,
}

fn default_platform_base() -> String { "https://api.vapi.ai".into() }
fn default_assistant_name() -> String { "Voice Scheduler".into() }
fn default_first_message() -> String {
    "Hello! I'm your scheduling assistant. May I have your name?".into()
}
fn default_end_call_message() -> String { "Great! Your meeting is scheduled.".into() }
fn default_model_provider() -> String { "openai".into() }
fn default_model() -> String { "gpt-4o".into() }
fn default_temperature() -> f32 { 0.5 }
fn default_max_tokens() -> u32 { 200 }
fn default_voice_provider() -> String { "azure".into() }
fn default_voice_id() -> String { "en-US-JennyNeural".into() }
fn default_transcriber_provider() -> String { "deepgram".into() }
fn default_transcriber_model() -> String { "nova2".into() }

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_platform_base(),
            webhook_url: String::new(),
            assistant_name: default_assistant_name(),
            first_message: default_first_message(),
            end_call_message: default_end_call_message(),
            model_provider: default_model_provider(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            voice_provider: default_voice_provider(),
            voice_id: default_voice_id(),
            transcriber_provider: default_transcriber_provider(),
            transcriber_model: default_transcriber_model(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config: VoxlineConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.calendar.calendar_id, "primary");
        assert_eq!(
            config.gate.update_triggers,
            vec!["conversation-update", "tool.completed"]
        );
        assert!(config.server.webhook_secret.is_empty());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: VoxlineConfig = toml::from_str(
            r#"
            [server]
            port = 3000

            [gate]
            update_triggers = ["tool.completed"]
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.gate.update_triggers, vec!["tool.completed"]);
        assert_eq!(config.gate.scheduling_function, "scheduleMeeting");
        assert_eq!(config.calendar.timeout_secs, 10);
    }

    #[test]
    fn calendar_credentials_roundtrip() {
        let config: VoxlineConfig = toml::from_str(
            r#"
            [calendar]
            calendar_id = "team@group.calendar.google.com"
            timezone = "Europe/Berlin"
            refresh_token = "1//abc"
            client_id = "cid"
            client_secret = "cs"
            "#,
        )
        .unwrap();
        assert_eq!(config.calendar.calendar_id, "team@group.calendar.google.com");
        assert_eq!(config.calendar.timezone, "Europe/Berlin");
        assert_eq!(config.calendar.refresh_token, "1//abc");
    }
}

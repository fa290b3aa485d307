//! Configuration management for the Lumi companion

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{Error, Result};

/// Default persona text for the system message
pub const DEFAULT_PERSONA: &str = "你是小Lumi，一个可爱温柔、情商极高的陪伴型AI助手。你擅长提供情绪支持、鼓励和温暖的话语。你的语气总是轻柔、善解人意，并愿意倾听和安慰用户。";

/// Spoken when a wake phrase pulls the companion out of Dormant
pub const DEFAULT_WAKE_ACK: &str = "我在呢，主人！想聊点什么？";

/// Spoken when the session returns to Dormant
pub const DEFAULT_SLEEP_ACK: &str = "那我先去休息啦，想我了再叫我哦。";

/// Lumi companion configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Session lifecycle settings
    pub session: SessionConfig,

    /// Chat model settings
    pub llm: LlmConfig,

    /// Voice/audio settings
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// Path to data directory (memory stores)
    pub data_dir: PathBuf,
}

/// Session lifecycle settings
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Phrases that wake the companion from Dormant
    pub wake_phrases: Vec<String>,

    /// Keywords that send an Awake session back to Dormant
    pub sleep_keywords: Vec<String>,

    /// Seconds of silence before an Awake session goes Dormant
    pub silence_timeout_secs: u64,

    /// Persona text for the system message
    pub persona: String,

    /// Spoken acknowledgement on wake
    pub wake_ack: String,

    /// Spoken acknowledgement on sleep
    pub sleep_ack: String,

    /// Maximum short-term history length (0 disables bounding)
    pub max_history_messages: usize,
}

impl SessionConfig {
    /// Silence window after which an Awake session goes Dormant
    #[must_use]
    pub const fn silence_timeout(&self) -> Duration {
        Duration::from_secs(self.silence_timeout_secs)
    }
}

/// Chat model settings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model identifier for chat completions
    pub model: String,

    /// `OpenAI`-compatible API base URL
    pub base_url: String,
}

/// Voice processing settings
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// Voice input/output enabled (false = console mode)
    pub enabled: bool,

    /// STT model identifier
    pub stt_model: String,

    /// Language hint passed to transcription
    pub stt_language: String,

    /// TTS model identifier
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// Seconds per microphone listen window
    pub listen_window_secs: u64,

    /// Milliseconds between animation frames
    pub frame_interval_ms: u64,
}

impl VoiceConfig {
    /// Duration of one microphone listen window
    #[must_use]
    pub const fn listen_window(&self) -> Duration {
        Duration::from_secs(self.listen_window_secs)
    }

    /// Delay between animation frames
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

/// API keys for external services
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (chat, Whisper and TTS)
    pub openai: Option<String>,
}

impl ApiKeys {
    /// Return the `OpenAI` key, which every network adapter needs
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if no key is configured
    pub fn require_openai(&self) -> Result<&str> {
        self.openai
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "OPENAI_API_KEY is not set; export it or run `lumi setup`".to_string(),
                )
            })
    }
}

impl Config {
    /// Load configuration with priority env > config file > defaults
    ///
    /// `config_path` overrides the standard file location and must then load
    /// cleanly. `disable_voice` forces console mode regardless of file and
    /// env settings.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given config path cannot be read or
    /// parsed.
    pub fn load(config_path: Option<&Path>, disable_voice: bool) -> Result<Self> {
        let fc = file::load_config_file(config_path)?;

        let api_keys = ApiKeys {
            openai: std::env::var("OPENAI_API_KEY").ok().or(fc.api_keys.openai),
        };

        let session = SessionConfig {
            wake_phrases: fc.session.wake_phrases.unwrap_or_else(default_wake_phrases),
            sleep_keywords: fc
                .session
                .sleep_keywords
                .unwrap_or_else(default_sleep_keywords),
            silence_timeout_secs: std::env::var("LUMI_SILENCE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(fc.session.silence_timeout_secs)
                .unwrap_or(8),
            persona: fc
                .session
                .persona
                .unwrap_or_else(|| DEFAULT_PERSONA.to_string()),
            wake_ack: fc
                .session
                .wake_ack
                .unwrap_or_else(|| DEFAULT_WAKE_ACK.to_string()),
            sleep_ack: fc
                .session
                .sleep_ack
                .unwrap_or_else(|| DEFAULT_SLEEP_ACK.to_string()),
            max_history_messages: fc.session.max_history_messages.unwrap_or(100),
        };

        let llm = LlmConfig {
            model: std::env::var("LUMI_MODEL")
                .ok()
                .or(fc.llm.model)
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            base_url: std::env::var("LUMI_BASE_URL")
                .ok()
                .or(fc.llm.base_url)
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        };

        let voice = Self::resolve_voice(fc.voice, disable_voice);

        if disable_voice {
            tracing::info!("voice explicitly disabled, running in console mode");
        }

        // Data directory (~/.local/share/lumi on Linux)
        let data_dir = std::env::var("LUMI_DATA_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| fc.storage.data_dir.map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        std::fs::create_dir_all(&data_dir).ok();

        Ok(Self {
            session,
            llm,
            voice,
            api_keys,
            data_dir,
        })
    }

    fn resolve_voice(fc: file::VoiceFileConfig, disable_voice: bool) -> VoiceConfig {
        let enabled = if disable_voice {
            false
        } else {
            std::env::var("LUMI_CONSOLE")
                .ok()
                .map(|v| !(v == "1" || v.eq_ignore_ascii_case("true")))
                .or(fc.enabled)
                .unwrap_or(true)
        };

        VoiceConfig {
            enabled,
            stt_model: std::env::var("LUMI_STT_MODEL")
                .ok()
                .or(fc.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            stt_language: fc.stt_language.unwrap_or_else(|| "zh".to_string()),
            tts_model: std::env::var("LUMI_TTS_MODEL")
                .ok()
                .or(fc.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: std::env::var("LUMI_TTS_VOICE")
                .ok()
                .or(fc.tts_voice)
                .unwrap_or_else(|| "zh-CN-XiaoyiNeural".to_string()),
            listen_window_secs: fc.listen_window_secs.unwrap_or(5),
            frame_interval_ms: fc.frame_interval_ms.unwrap_or(300),
        }
    }

    /// Path of the short-term conversation store
    #[must_use]
    pub fn short_term_path(&self) -> PathBuf {
        self.data_dir.join("memory.json")
    }

    /// Path of the long-term memory store
    #[must_use]
    pub fn long_term_path(&self) -> PathBuf {
        self.data_dir.join("long_term.json")
    }
}

fn default_wake_phrases() -> Vec<String> {
    vec!["Hi, Lumi".to_string(), "小Lumi".to_string()]
}

fn default_sleep_keywords() -> Vec<String> {
    vec![
        "睡觉吧Lumi".to_string(),
        "睡吧Lumi".to_string(),
        "goodnight Lumi".to_string(),
        "晚安Lumi".to_string(),
    ]
}

/// Default data directory: `~/.local/share/lumi`
fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map_or_else(|| PathBuf::from(".lumi"), |d| d.data_dir().join("lumi"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let keys = ApiKeys { openai: None };
        assert!(matches!(keys.require_openai(), Err(Error::Config(_))));

        let blank = ApiKeys {
            openai: Some("   ".to_string()),
        };
        assert!(matches!(blank.require_openai(), Err(Error::Config(_))));
    }

    #[test]
    fn test_present_key_is_returned_trimmed() {
        let keys = ApiKeys {
            openai: Some(" sk-test ".to_string()),
        };
        assert_eq!(keys.require_openai().unwrap(), "sk-test");
    }

    #[test]
    fn test_duration_helpers_convert_units() {
        let session = SessionConfig {
            wake_phrases: default_wake_phrases(),
            sleep_keywords: default_sleep_keywords(),
            silence_timeout_secs: 8,
            persona: DEFAULT_PERSONA.to_string(),
            wake_ack: DEFAULT_WAKE_ACK.to_string(),
            sleep_ack: DEFAULT_SLEEP_ACK.to_string(),
            max_history_messages: 100,
        };
        assert_eq!(session.silence_timeout(), Duration::from_secs(8));

        let voice = Config::resolve_voice(file::VoiceFileConfig::default(), true);
        assert_eq!(voice.listen_window(), Duration::from_secs(5));
        assert_eq!(voice.frame_interval(), Duration::from_millis(300));
        assert!(!voice.enabled);
    }

    #[test]
    fn test_file_overlay_wins_over_defaults() {
        let fc = file::VoiceFileConfig {
            enabled: None,
            stt_model: None,
            stt_language: Some("en".to_string()),
            tts_model: None,
            tts_voice: Some("alloy".to_string()),
            listen_window_secs: Some(3),
            frame_interval_ms: Some(150),
        };

        let voice = Config::resolve_voice(fc, true);
        assert_eq!(voice.stt_language, "en");
        assert_eq!(voice.tts_voice, "alloy");
        assert_eq!(voice.listen_window(), Duration::from_secs(3));
        assert_eq!(voice.frame_interval(), Duration::from_millis(150));
        assert_eq!(voice.stt_model, "whisper-1");
    }
}

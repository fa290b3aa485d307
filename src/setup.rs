//! Interactive first-run setup wizard (`lumi setup`)

use std::path::{Path, PathBuf};

use dialoguer::{Confirm, Input};

use crate::config::file::{self, ApiKeysFileConfig, LumiConfigFile};

/// Run the interactive setup wizard
///
/// # Errors
///
/// Returns error if user input fails or the config cannot be written
pub fn run_setup() -> anyhow::Result<()> {
    println!("Lumi Setup\n");

    let existing = file::load_config_file(None)?;
    let config_path = file::config_file_path()
        .unwrap_or_else(|| PathBuf::from(".config/lumi/config.toml"));

    if config_path.exists() {
        println!("Existing config found at {}\n", config_path.display());
    }

    // 1. OpenAI API key (chat, Whisper and TTS)
    let api_key = prompt_api_key(existing.api_keys.openai.as_deref())?;

    // 2. Chat model
    let default_model = existing
        .llm
        .model
        .clone()
        .unwrap_or_else(|| "gpt-3.5-turbo".to_string());
    let model: String = Input::new()
        .with_prompt("Chat model")
        .default(default_model)
        .interact_text()?;

    // 3. Silence timeout
    let silence_timeout_secs: u64 = Input::new()
        .with_prompt("Silence timeout in seconds (Lumi dozes off after this)")
        .default(existing.session.silence_timeout_secs.unwrap_or(8))
        .interact_text()?;

    // 4. Voice (optional)
    let voice_default = existing.voice.enabled.unwrap_or(true);
    let enable_voice = Confirm::new()
        .with_prompt("Enable voice (microphone + speech)?")
        .default(voice_default)
        .interact()?;

    let mut voice = existing.voice;
    voice.enabled = Some(enable_voice);
    if enable_voice {
        let default_voice = voice
            .tts_voice
            .clone()
            .unwrap_or_else(|| "zh-CN-XiaoyiNeural".to_string());
        let tts_voice: String = Input::new()
            .with_prompt("TTS voice")
            .default(default_voice)
            .interact_text()?;
        voice.tts_voice = Some(tts_voice);
    }

    // 5. Build and write config, carrying over fields the wizard
    // does not prompt for
    let mut session = existing.session;
    session.silence_timeout_secs = Some(silence_timeout_secs);

    let mut llm = existing.llm;
    llm.model = Some(model);

    let config_file = LumiConfigFile {
        session,
        llm,
        voice,
        api_keys: ApiKeysFileConfig { openai: api_key },
        storage: existing.storage,
    };

    write_config(&config_path, &config_file)?;
    println!("\nConfig written to {}", config_path.display());

    println!("\nSetup complete! Run `lumi` to start, or `lumi --console` to chat in the terminal.");

    Ok(())
}

/// Prompt for the `OpenAI` key, keeping an existing one on empty input
fn prompt_api_key(existing_key: Option<&str>) -> anyhow::Result<Option<String>> {
    let masked = existing_key.map(|k| {
        if k.len() > 8 {
            format!("{}...{}", &k[..4], &k[k.len() - 4..])
        } else {
            "****".to_string()
        }
    });

    let prompt = masked.map_or_else(
        || "OpenAI API key (OPENAI_API_KEY)".to_string(),
        |m| format!("OpenAI API key (current: {m}, leave blank to keep)"),
    );

    let input: String = Input::new()
        .with_prompt(&prompt)
        .allow_empty(true)
        .interact_text()?;

    Ok(if input.is_empty() {
        existing_key.map(str::to_string)
    } else {
        Some(input)
    })
}

/// Serialize and write the config file
fn write_config(path: &Path, config: &LumiConfigFile) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let toml = serialize_config(config);
    std::fs::write(path, toml)?;

    Ok(())
}

/// Serialize config to a readable TOML string
fn serialize_config(config: &LumiConfigFile) -> String {
    let mut out = String::new();

    // [session]
    let sc = &config.session;
    if sc.wake_phrases.is_some()
        || sc.sleep_keywords.is_some()
        || sc.silence_timeout_secs.is_some()
        || sc.persona.is_some()
        || sc.wake_ack.is_some()
        || sc.sleep_ack.is_some()
        || sc.max_history_messages.is_some()
    {
        out.push_str("[session]\n");
        if let Some(ref phrases) = sc.wake_phrases {
            out.push_str(&format!("wake_phrases = [{}]\n", quote_list(phrases)));
        }
        if let Some(ref keywords) = sc.sleep_keywords {
            out.push_str(&format!("sleep_keywords = [{}]\n", quote_list(keywords)));
        }
        if let Some(secs) = sc.silence_timeout_secs {
            out.push_str(&format!("silence_timeout_secs = {secs}\n"));
        }
        if let Some(ref persona) = sc.persona {
            out.push_str(&format!("persona = \"{persona}\"\n"));
        }
        if let Some(ref ack) = sc.wake_ack {
            out.push_str(&format!("wake_ack = \"{ack}\"\n"));
        }
        if let Some(ref ack) = sc.sleep_ack {
            out.push_str(&format!("sleep_ack = \"{ack}\"\n"));
        }
        if let Some(max) = sc.max_history_messages {
            out.push_str(&format!("max_history_messages = {max}\n"));
        }
        out.push('\n');
    }

    // [llm]
    if config.llm.model.is_some() || config.llm.base_url.is_some() {
        out.push_str("[llm]\n");
        if let Some(ref model) = config.llm.model {
            out.push_str(&format!("model = \"{model}\"\n"));
        }
        if let Some(ref url) = config.llm.base_url {
            out.push_str(&format!("base_url = \"{url}\"\n"));
        }
        out.push('\n');
    }

    // [voice]
    let vc = &config.voice;
    if vc.enabled.is_some() {
        out.push_str("[voice]\n");
        if let Some(enabled) = vc.enabled {
            out.push_str(&format!("enabled = {enabled}\n"));
        }
        if let Some(ref m) = vc.stt_model {
            out.push_str(&format!("stt_model = \"{m}\"\n"));
        }
        if let Some(ref l) = vc.stt_language {
            out.push_str(&format!("stt_language = \"{l}\"\n"));
        }
        if let Some(ref m) = vc.tts_model {
            out.push_str(&format!("tts_model = \"{m}\"\n"));
        }
        if let Some(ref v) = vc.tts_voice {
            out.push_str(&format!("tts_voice = \"{v}\"\n"));
        }
        if let Some(secs) = vc.listen_window_secs {
            out.push_str(&format!("listen_window_secs = {secs}\n"));
        }
        if let Some(ms) = vc.frame_interval_ms {
            out.push_str(&format!("frame_interval_ms = {ms}\n"));
        }
        out.push('\n');
    }

    // [api_keys]
    if let Some(ref key) = config.api_keys.openai {
        out.push_str("[api_keys]\n");
        out.push_str(&format!("openai = \"{key}\"\n\n"));
    }

    // [storage]
    if let Some(ref dir) = config.storage.data_dir {
        out.push_str("[storage]\n");
        out.push_str(&format!("data_dir = \"{dir}\"\n"));
    }

    out
}

fn quote_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::{SessionFileConfig, VoiceFileConfig};

    #[test]
    fn test_serialized_config_round_trips() {
        let config = LumiConfigFile {
            session: SessionFileConfig {
                wake_phrases: Some(vec!["Hi, Lumi".to_string(), "小Lumi".to_string()]),
                sleep_keywords: None,
                silence_timeout_secs: Some(10),
                persona: None,
                wake_ack: None,
                sleep_ack: None,
                max_history_messages: Some(50),
            },
            llm: crate::config::file::LlmFileConfig {
                model: Some("gpt-3.5-turbo".to_string()),
                base_url: None,
            },
            voice: VoiceFileConfig {
                enabled: Some(true),
                tts_voice: Some("zh-CN-XiaoyiNeural".to_string()),
                ..VoiceFileConfig::default()
            },
            api_keys: ApiKeysFileConfig {
                openai: Some("sk-test".to_string()),
            },
            storage: crate::config::file::StorageFileConfig::default(),
        };

        let toml = serialize_config(&config);
        let parsed: LumiConfigFile = toml::from_str(&toml).unwrap();

        assert_eq!(parsed.session.wake_phrases, config.session.wake_phrases);
        assert_eq!(parsed.session.silence_timeout_secs, Some(10));
        assert_eq!(parsed.session.max_history_messages, Some(50));
        assert_eq!(parsed.llm.model.as_deref(), Some("gpt-3.5-turbo"));
        assert_eq!(parsed.voice.enabled, Some(true));
        assert_eq!(parsed.voice.tts_voice.as_deref(), Some("zh-CN-XiaoyiNeural"));
        assert_eq!(parsed.api_keys.openai.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let toml = serialize_config(&LumiConfigFile::default());
        assert!(toml.is_empty());
    }
}

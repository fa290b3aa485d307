use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use lumi_companion::animator::FeedbackAnimator;
use lumi_companion::display::{ConsoleDisplay, DisplayAdapter, PanelDisplay};
use lumi_companion::memory::MemoryStore;
use lumi_companion::model::OpenAiChatModel;
use lumi_companion::session::SessionEngine;
use lumi_companion::voice;
use lumi_companion::Config;

/// Lumi - a voice-driven companion agent
#[derive(Parser)]
#[command(name = "lumi", version, about)]
struct Cli {
    /// Path to the config file (defaults to ~/.config/lumi/config.toml)
    #[arg(short, long, env = "LUMI_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Type and read in the terminal instead of using audio hardware
    #[arg(long)]
    console: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive first-run setup
    Setup,
    /// Inspect or clear the persisted memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test TTS output
    TestTts {
        /// Text to speak
        #[arg(default_value = "你好，我是小Lumi！很高兴见到你。")]
        text: String,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Print learned preferences and recent conversations
    Show,
    /// Delete both memory stores
    Clear,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,lumi_companion=info",
        1 => "info,lumi_companion=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Handle subcommands
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Setup => lumi_companion::setup::run_setup(),
            Command::Memory { action } => {
                let config = Config::load(cli.config.as_deref(), true)?;
                match action {
                    MemoryAction::Show => memory_show(&config),
                    MemoryAction::Clear => memory_clear(&config),
                }
            }
            Command::TestMic { duration } => test_mic(duration).await,
            Command::TestTts { text } => {
                let config = Config::load(cli.config.as_deref(), false)?;
                test_tts(&config, &text).await
            }
        };
    }

    let config = Config::load(cli.config.as_deref(), cli.console)?;

    tracing::info!(
        console = !config.voice.enabled,
        model = %config.llm.model,
        "starting lumi companion"
    );

    // Chat needs a key in every mode; fail here rather than mid-turn
    let api_key = config.api_keys.require_openai()?.to_string();

    let model = Arc::new(OpenAiChatModel::new(
        config.llm.base_url.clone(),
        api_key,
        config.llm.model.clone(),
    )?);

    let input = voice::build_input(&config)?;
    let output = voice::build_output(&config)?;

    let display: Arc<dyn DisplayAdapter> = if config.voice.enabled {
        Arc::new(PanelDisplay)
    } else {
        Arc::new(ConsoleDisplay)
    };
    let animator = FeedbackAnimator::new(display, config.voice.frame_interval());

    let store = MemoryStore::new(config.short_term_path(), config.long_term_path());

    let mut engine =
        SessionEngine::new(&config.session, store, model, input, output, animator)?;

    // Ctrl-C requests shutdown through the channel
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::mpsc::channel(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown_tx.send(()).await.ok();
        }
    });

    let phrases = config.session.wake_phrases.join("\" or \"");
    tracing::info!("lumi ready - say \"{phrases}\"");

    engine.run(&mut shutdown_rx).await?;

    tracing::info!("goodbye");
    Ok(())
}

/// Print learned preferences and recent conversation records
fn memory_show(config: &Config) -> anyhow::Result<()> {
    let store = MemoryStore::new(config.short_term_path(), config.long_term_path());
    let memory = store.load_long_term()?;

    if memory.preferences.is_empty() {
        println!("No preferences learned yet.");
    } else {
        println!("Preferences:");
        for (label, items) in [
            ("likes", &memory.preferences.likes),
            ("dislikes", &memory.preferences.dislikes),
            ("interests", &memory.preferences.interests),
        ] {
            if !items.is_empty() {
                println!("  {label}: {}", items.join(", "));
            }
        }
    }

    println!();

    if memory.conversations.is_empty() {
        println!("No conversations recorded yet.");
    } else {
        println!("Recent conversations (newest first):");
        for record in memory.conversations.iter().rev().take(10) {
            println!("  [{}] ({})", record.timestamp, record.emotion);
            println!("    主人: {}", record.user_input);
            println!("    小Lumi: {}", record.reply);
        }
    }

    Ok(())
}

/// Delete both memory stores after confirmation
fn memory_clear(config: &Config) -> anyhow::Result<()> {
    let confirmed = dialoguer::Confirm::new()
        .with_prompt("Delete all of Lumi's memories?")
        .default(false)
        .interact()?;

    if !confirmed {
        println!("Nothing deleted.");
        return Ok(());
    }

    let store = MemoryStore::new(config.short_term_path(), config.long_term_path());
    store.clear()?;
    println!("Memory cleared.");

    Ok(())
}

/// Test microphone input
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");
    println!("Sample rate: {} Hz", voice::SAMPLE_RATE);
    println!("---");

    for i in 0..duration {
        let samples = voice::record_window(Duration::from_secs(1)).await?;
        let energy = voice::rms_level(&samples);
        let peak = samples.iter().map(|s| s.abs()).fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!("[{:2}s] RMS: {energy:.4} | Peak: {peak:.4} | [{meter}]", i + 1);
    }

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Test TTS output
async fn test_tts(config: &Config, text: &str) -> anyhow::Result<()> {
    println!("Testing TTS with text: \"{text}\"\n");

    let tts = voice::TextToSpeech::new(
        config.llm.base_url.clone(),
        config.api_keys.require_openai()?.to_string(),
        config.voice.tts_voice.clone(),
        config.voice.tts_model.clone(),
    )?;

    println!("Synthesizing speech...");
    let mp3 = tts.synthesize(text).await?;
    println!("Got {} bytes of audio data", mp3.len());

    if mp3.len() > 3 {
        println!(
            "First 4 bytes: {:02x} {:02x} {:02x} {:02x}",
            mp3[0], mp3[1], mp3[2], mp3[3]
        );
    }

    println!("Playing audio...");
    voice::play_mp3(mp3).await?;

    println!("\n---");
    println!("If you heard the speech, TTS is working!");

    Ok(())
}

use anyhow::Result;
use clap::Parser;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use visifind::audio::capture::CommandCapture;
use visifind::audio::playback::CommandSynth;
use visifind::audio::{SpeechCapture, SpeechSynth};
use visifind::config::AppConfig;
use visifind::console::{parse_line, ConsoleInput};
use visifind::driver::{Components, Driver, EVENT_CHANNEL_CAPACITY};
use visifind::kernel::event::Event;
use visifind::outputs::display::TerminalDisplay;
use visifind::outputs::text::TextSynth;
use visifind::services::search::HttpSearchService;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = AppConfig::parse();

    // Logs go to stderr; stdout belongs to the display.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("visifind=info")),
        )
        .with_writer(std::io::stderr)
        .init();
    info!("VisiFind booting against {}", config.api_url);

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let capture: Option<Box<dyn SpeechCapture>> = match config.recognizer.as_deref() {
        Some(line) => match CommandCapture::new(line, tx.clone()) {
            Ok(capture) => Some(Box::new(capture)),
            Err(e) => {
                warn!("Ignoring recognizer: {}", e);
                None
            }
        },
        None => None,
    };

    let synth: Option<Box<dyn SpeechSynth>> = match config.tts.as_deref() {
        Some(line) => match CommandSynth::new(line, tx.clone()) {
            Ok(synth) => Some(Box::new(synth)),
            Err(e) => {
                warn!("Ignoring TTS command: {}", e);
                None
            }
        },
        None if config.print_speech => Some(Box::new(TextSynth::new(
            tx.clone(),
            Duration::from_millis(config.print_speech_ms_per_word),
        ))),
        None => None,
    };

    let components = Components {
        backend: Arc::new(HttpSearchService::new(config.api_url.clone(), config.request_timeout())),
        capture,
        synth,
        display: Box::new(TerminalDisplay::stdout()),
    };

    let driver = Driver::new(
        config.reactor_config(),
        tx.clone(),
        rx,
        components,
        config.request_timeout(),
    );

    let shutdown = CancellationToken::new();
    spawn_console(tx, shutdown.clone());

    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    driver.run(shutdown).await;
    info!("VisiFind stopped");
    Ok(())
}

/// Reads stdin on a plain thread so a pending read never holds up runtime shutdown.
fn spawn_console(tx: mpsc::Sender<Event>, shutdown: CancellationToken) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_line(&line) {
                ConsoleInput::Event(event) => {
                    if tx.blocking_send(event.into()).is_err() {
                        break;
                    }
                }
                ConsoleInput::Quit => break,
                ConsoleInput::Invalid(hint) => println!("  {}", hint),
            }
        }
        shutdown.cancel();
    });
}

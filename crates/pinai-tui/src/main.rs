use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use pinai_core::options::Language;
use pinai_core::{logging, Config, GeminiClient, Orchestrator};

mod app;
mod handler;
mod panels;
mod tasks;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "pinai")]
#[command(version, about = "Pin Ai: chat, coding, studio, planners and news on Gemini")]
struct Cli {
    /// Use the fast chat model
    #[arg(short, long)]
    fast: bool,

    /// Reply language (e.g. English, Hindi, Tamil)
    #[arg(short, long, value_parser = parse_language)]
    language: Option<Language>,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn parse_language(s: &str) -> Result<Language, String> {
    Language::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Language::all().iter().map(|l| l.as_str()).collect();
        format!("unknown language '{}', expected one of: {}", s, names.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config comes first since it decides where logs go
    let config_path = match cli.config {
        Some(path) => Some(path),
        None => Config::config_path().ok(),
    };
    let mut config = match &config_path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("could not load config from {}", path.display()))?,
        None => Config::default(),
    };

    let log_dir = logging::init(&config).context("could not initialize logging")?;
    match &config_path {
        Some(path) => tracing::info!("config file: {}", path.display()),
        None => tracing::warn!("no config directory; language choices will not be saved"),
    }

    if cli.fast {
        config.fast_mode = true;
    }
    if let Some(language) = cli.language {
        config.default_language = Some(language.as_str().to_string());
    }

    let api_key = config.resolve_api_key();
    if api_key.is_none() {
        tracing::warn!("no Gemini API key configured");
    }
    let client = GeminiClient::with_base_url(api_key, &config.base_url);
    let orchestrator = Orchestrator::new(Arc::new(client))
        .with_media_dir(config.media_dir())
        .with_poll_policy(config.poll_policy());

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(orchestrator, &config, config_path, events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    tracing::info!("Pin Ai exiting");
    result.with_context(|| format!("details in the log files under {}", log_dir.display()))
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use deskpad_core::config::{CREDENTIAL_ENV, LOG_LEVEL_ENV};
use deskpad_core::logging::init_logging;
use deskpad_core::{Config, FileStore, GeminiClient, TextGenerator, Workspace};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "deskpad")]
#[command(version, about = "To-dos, notes, a calendar and a Gemini chat in your terminal")]
struct Cli {
    /// Directory holding storage.json and logs (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level: error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = config.resolve_data_dir(cli.data_dir.as_deref())?;
    let env_level = std::env::var(LOG_LEVEL_ENV).ok();
    let level = config.resolve_log_level(cli.log_level.as_deref(), env_level.as_deref());
    init_logging(&level, &data_dir.join("logs"))?;

    let store = FileStore::open(&data_dir)
        .with_context(|| format!("Failed to open storage in {}", data_dir.display()))?;
    info!("event=store_opened path={}", store.path().display());

    let fallback = std::env::var(CREDENTIAL_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty());
    let workspace = Workspace::load(store, fallback)?;

    let client = match config.request_timeout() {
        Some(timeout) => GeminiClient::with_timeout(config.endpoint(), config.model(), timeout)?,
        None => GeminiClient::new(config.endpoint(), config.model()),
    };
    let model_name = client.model().to_string();
    let generator: Arc<dyn TextGenerator> = Arc::new(client);

    let mut app = App::new(workspace, generator, &model_name);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    info!("event=shutdown");
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    if let Some(task) = app.chat_task.take() {
        task.abort();
    }
    Ok(())
}

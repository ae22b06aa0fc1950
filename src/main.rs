use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

mod app;
mod client;
mod config;
mod controller;
mod handler;
mod input;
mod logging;
mod state;
mod tui;
mod ui;

use app::App;
use client::HttpBackend;
use config::{Config, ENDPOINT_ENV};
use controller::ChatController;
use state::ConversationId;

#[derive(Parser)]
#[command(name = "chat")]
#[command(about = "Chat with a prompt/response generation endpoint")]
#[command(version)]
struct Cli {
    /// Endpoint prompts are posted to (overrides CHAT_ENDPOINT and the config file)
    #[arg(short, long, global = true)]
    endpoint: Option<String>,

    /// Continue an existing conversation
    #[arg(long, global = true)]
    chat_id: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one prompt and print the reply
    Ask {
        /// The prompt text
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|_| Config::new());
    // Logging is optional: the chat works without a writable config dir
    if let Err(e) = logging::init(&config) {
        eprintln!("chat: logging disabled: {:#}", e);
    }

    let env_endpoint = std::env::var(ENDPOINT_ENV).ok();
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref(), env_endpoint.as_deref());
    let chat_id = ConversationId::new(cli.chat_id.as_deref());
    info!(%endpoint, version = env!("CARGO_PKG_VERSION"), "chat starting");

    let http = reqwest::Client::builder()
        .user_agent(concat!("chat-tui/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let chat = ChatController::new(HttpBackend::with_client(http, &endpoint), chat_id);

    match cli.command {
        Some(Commands::Ask { prompt }) => ask_once(chat, &prompt).await,
        None => run_tui(chat, &endpoint).await,
    }
}

async fn ask_once(mut chat: ChatController<HttpBackend>, prompt: &str) -> Result<()> {
    let Some(outcome) = chat.ask(prompt).await else {
        bail!("prompt is empty");
    };

    if outcome.is_error() {
        eprintln!("{}", outcome.display_text());
    } else {
        println!("{}", outcome.display_text());
    }
    if !chat.chat_id().is_empty() {
        eprintln!("chat_id: {}", chat.chat_id().as_str());
    }

    if outcome.is_error() {
        bail!("request to {} failed", chat.backend().endpoint());
    }
    Ok(())
}

async fn run_tui(chat: ChatController<HttpBackend>, endpoint: &str) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();
    let mut app = App::new(chat, endpoint, events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    if let Err(e) = &result {
        warn!(error = %e, "chat exited with an error");
    }
    result
}

async fn run_loop(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut tui::EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event)?,
            None => break,
        }
    }
    Ok(())
}

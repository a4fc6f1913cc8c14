use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

mod api;
mod app;
mod config;
mod handler;
mod session;
mod tui;
mod ui;

use api::ChatClient;
use app::App;
use config::Settings;
use session::{run_turn, Role, Session};

#[derive(Parser)]
#[command(name = "campus-chat")]
#[command(about = "Chat with the Angelo State University assistant from your terminal")]
struct Cli {
    /// Backend root URL (overrides config and API_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// Your question
        question: String,
    },
    /// Write a default config file for editing
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load()?;
    if let Some(base_url) = cli.base_url {
        settings.api_base_url = base_url;
    }
    if let Some(timeout) = cli.timeout {
        settings.timeout_secs = timeout;
    }

    match cli.command {
        Some(Commands::Ask { question }) => ask_once(settings, &question).await,
        Some(Commands::Init) => init_config(settings),
        None => run_tui(settings).await,
    }
}

/// One-shot mode: run a single turn through the same session machinery the
/// TUI uses and print the outcome.
async fn ask_once(settings: Settings, question: &str) -> Result<()> {
    let client = ChatClient::new(
        &settings.api_base_url,
        Duration::from_secs(settings.timeout_secs),
    )?;
    let mut session = Session::new();

    println!("{} {}", "You:".cyan().bold(), question);
    run_turn(&mut session, &client, question).await;

    if let Some(error) = session.last_error() {
        eprintln!("{}: {}", "Error".red().bold(), error);
        eprintln!(
            "Make sure the backend is running and reachable at {}",
            client.base_url().bold()
        );
        std::process::exit(1);
    }

    let answer = session
        .messages()
        .iter()
        .rev()
        .find(|m| m.role == Role::Assistant);

    match answer {
        Some(message) => println!("{} {}", "Bot:".yellow().bold(), message.content),
        None => println!("{}", "The backend returned an empty response.".dimmed()),
    }

    Ok(())
}

fn init_config(settings: Settings) -> Result<()> {
    let path = settings.save()?;
    println!("Wrote {}", path.display().to_string().bold());
    println!("Edit it, or override with API_BASE_URL / CHAT_TIMEOUT_SECS.");
    Ok(())
}

async fn run_tui(settings: Settings) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(settings)?;
    let mut events = tui::EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut tui::EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event)?;
        }

        app.poll_turn().await;
    }
    Ok(())
}

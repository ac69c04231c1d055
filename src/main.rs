use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_assistant::app::{self, App};
use doc_assistant::config::{self, Config};
use doc_assistant::conversation::Conversation;
use doc_assistant::ui::conversation::ConversationManager;
use doc_assistant::{HttpTransport, MessageKind, QaTransport};
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "doc-assistant")]
#[command(version)]
#[command(about = "Ask questions about your engineering documents", long_about = None)]
struct Cli {
    /// QA endpoint URL (overrides the config file)
    #[arg(long, global = true, env = "DOC_ASSISTANT_ENDPOINT")]
    endpoint: Option<String>,

    /// Config file to use instead of ~/.doc-assistant/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file to use instead of ~/.doc-assistant/logs/doc-assistant.log
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask { query: String },
    /// Write a config file pointing at an endpoint
    Init {
        #[arg(long = "endpoint", value_name = "URL")]
        url: String,
    },
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("doc_assistant=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

async fn ask(transport: &dyn QaTransport, query: String) -> Result<bool> {
    let mut conversation = Conversation::new();
    conversation.update_input(query);

    if !conversation.exchange(transport).await {
        println!("Nothing to ask.");
        return Ok(true);
    }

    let Some(reply) = conversation.messages().last() else {
        return Ok(false);
    };
    if reply.kind != MessageKind::Bot {
        return Ok(false);
    }

    println!("{}", reply.content);
    for citation in &reply.citations {
        println!();
        println!("Source: {}", citation.display_title());
        if let Some(snippet) = &citation.snippet {
            println!("  \"{}\"", snippet);
        }
    }

    // Only a successful exchange sets the conversation id
    Ok(conversation.conversation_id().is_some())
}

async fn run_chat(config: Config, transport: Arc<dyn QaTransport>) -> Result<()> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        anyhow::bail!("doc-assistant requires a terminal; use `doc-assistant ask <QUERY>` instead");
    }

    let manager = ConversationManager::new(transport, config.ui);
    let mut app = App::new(manager);

    let mut terminal = app::init_terminal()?;
    let result = app.run(&mut terminal).await;
    app::restore_terminal()?;
    terminal.show_cursor()?;

    result
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = match cli.log_file {
        Some(path) => path,
        None => config::default_log_path()?,
    };
    init_logging(&log_path)?;

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };

    if let Some(Commands::Init { url }) = &cli.command {
        HttpTransport::new(url)?;
        let mut config = Config::load_from(&config_path)?;
        config.endpoint = Some(url.clone());
        config.save_to(&config_path)?;
        println!("Wrote {}", config_path.display());
        return Ok(());
    }

    let config = Config::load_from(&config_path)?;
    let endpoint = config.resolve_endpoint(cli.endpoint.as_deref())?;
    let transport = Arc::new(HttpTransport::new(&endpoint)?);
    tracing::info!(endpoint = %transport.endpoint(), "Using QA endpoint");

    match cli.command {
        Some(Commands::Ask { query }) => {
            if !ask(transport.as_ref(), query).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Init { .. }) => Ok(()),
        None => run_chat(config, transport).await,
    }
}

//! kanban - task board with a streaming chat assistant

mod commands;
mod config;
mod history;
mod render;
mod tasks;

use clap::Parser;
use kanban_ai::ChatClient;
use kanban_chat::{
    ChatConfig, ChatHandle, ChatSession, HttpTransport, MemoryStore, MessageStore, TurnOutcome, task_context,
};
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::history::JsonlStore;
use crate::render::StreamPrinter;
use crate::tasks::TaskStore;

/// kanban - task board with a streaming chat assistant
#[derive(Parser, Debug)]
#[command(name = "kanban")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Send a single message and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Chat endpoint URL
    #[arg(long)]
    url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long)]
    api_key: Option<String>,

    /// Board owner
    #[arg(short, long)]
    user: Option<String>,

    /// Keep chat history in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Setup tracing
    let filter = if args.verbose {
        EnvFilter::new("kanban=debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();

    // CLI flags take precedence over the environment and the config file
    let Some(chat_url) = cfg.chat_url(args.url) else {
        eprintln!("Error: No chat endpoint configured");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  1. Pass it directly: kanban --url https://.../chat");
        eprintln!("  2. Set it in the environment: export KANBAN_CHAT_URL=...");
        eprintln!("  3. Add it to the config file: kanban --init-config");
        std::process::exit(1);
    };

    let mut client = ChatClient::new(chat_url)?;
    if let Some(api_key) = cfg.api_key(args.api_key) {
        client = client.with_api_key(api_key);
    }
    let transport = Arc::new(HttpTransport::new(client));

    let user_id = cfg.user_id(args.user);
    let data_dir = cfg.data_dir();
    let store: Arc<dyn MessageStore> = if args.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(JsonlStore::new(&data_dir, &user_id))
    };
    let mut tasks = TaskStore::open(&data_dir, &user_id)?;

    let chat_config = ChatConfig {
        max_parse_attempts: cfg.max_reparse_attempts(),
        history_limit: cfg.history_limit(),
    };
    let mut session = ChatSession::new(chat_config, transport, store);

    spawn_interrupt_listener(session.handle());

    // Chat still works without history
    if let Err(e) = session.hydrate_from_store().await {
        tracing::warn!("Could not load chat history: {}", e);
    }

    // Non-interactive mode
    if let Some(command) = args.command {
        let outcome = send(&mut session, &tasks, &command).await?;
        if !matches!(outcome, TurnOutcome::Completed { .. } | TurnOutcome::Empty) {
            std::process::exit(1);
        }
        return Ok(());
    }

    run_interactive(&mut session, &mut tasks, &user_id).await
}

/// Ctrl-C aborts the turn in flight, or exits when idle.
///
/// Installed once: the first `ctrl_c()` replaces the default SIGINT action for
/// the rest of the process.
fn spawn_interrupt_listener(handle: ChatHandle) {
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if handle.interrupt() {
                tracing::debug!("Interrupted turn");
            } else {
                println!();
                std::process::exit(130);
            }
        }
    });
}

/// Run one turn, printing the reply as it streams.
async fn send(
    session: &mut ChatSession,
    tasks: &TaskStore,
    input: &str,
) -> anyhow::Result<TurnOutcome> {
    let context = task_context(&tasks.snapshot());
    let mut receiver = session.subscribe();
    let mut printer = StreamPrinter::new(io::stdout());

    let turn = session.submit_turn(input, &context);
    tokio::pin!(turn);

    let result = loop {
        tokio::select! {
            result = &mut turn => break result,
            event = receiver.recv() => {
                if let Ok(event) = event {
                    printer.render(&event)?;
                }
            }
        }
    };

    // Events sent after the last poll are still buffered
    while let Ok(event) = receiver.try_recv() {
        printer.render(&event)?;
    }

    Ok(result?)
}

async fn run_interactive(
    session: &mut ChatSession,
    tasks: &mut TaskStore,
    user_id: &str,
) -> anyhow::Result<()> {
    // Show minimal startup info (only if TTY)
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!(
            "kanban ({}) {} tasks, {} messages loaded. /help for commands.",
            user_id,
            tasks.len(),
            session.messages().len()
        );
        eprintln!();
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        // Handle slash commands
        if let Some(result) = commands::execute_command(input, tasks, session) {
            match result {
                commands::CommandResult::Exit => break,
                commands::CommandResult::Message(msg) => println!("{}", msg),
                commands::CommandResult::Unknown(cmd) => {
                    println!("Unknown command: /{}", cmd);
                    println!("Type /help for available commands.");
                }
            }
            println!();
            continue;
        }

        println!();
        match send(session, tasks, input).await {
            Ok(TurnOutcome::Cancelled) => println!("[cancelled]"),
            Ok(TurnOutcome::Empty) => println!("[no reply]"),
            Ok(_) => {}
            Err(e) => eprintln!("Error: {}", e),
        }
        println!();
    }

    Ok(())
}

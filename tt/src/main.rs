//! turntalk - two-party chat over a polled shared store
//!
//! CLI entry point: joins the session and guarantees a disconnect on exit.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use sharedstore::FileStore;
use tracing::{debug, info, warn};

use turntalk::cli::{Cli, Command};
use turntalk::console::{CHAT_BANNER, Console, TerminalConsole, client_line, server_line};
use turntalk::session::validate_name;
use turntalk::{Config, DisconnectOutcome, Participant, ProtocolError, Session, wait_for_shutdown};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<PathBuf> {
    // The terminal belongs to the chat, so logs go to a file
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(sharedstore::APP_DIR)
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(str::to_uppercase).as_deref() {
        Some("TRACE") => tracing::Level::TRACE,
        Some("DEBUG") => tracing::Level::DEBUG,
        Some("INFO") | None => tracing::Level::INFO,
        Some("WARN") | Some("WARNING") => tracing::Level::WARN,
        Some("ERROR") => tracing::Level::ERROR,
        Some(other) => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
            tracing::Level::INFO
        }
    };

    // Two participants usually run side by side; one file each
    let log_path = log_dir.join(format!("turntalk-{}.log", std::process::id()));
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(log_path)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Chat { name, poll_ms } => {
            if let Some(ms) = poll_ms {
                config.poll_interval_ms = ms.max(1);
            }
            cmd_chat(&config, name).await
        }
        Command::Status => cmd_status(&config).await,
    }
}

async fn cmd_chat(config: &Config, name: Option<String>) -> Result<()> {
    info!(store = %config.store_path.display(), "cmd_chat: called");
    let store = FileStore::open(&config.store_path).context("Failed to open store")?;
    let mut participant = Participant::new(Arc::new(store), config.protocol());
    let mut console = TerminalConsole::new();

    let report = participant.reset().await.context("Failed to reset session")?;
    console.display(&server_line(&format!(
        "Server running, last reset at {}",
        report.last_reset_time
    )));
    console.display(&server_line("Creating connection..."));

    // One-shot admission: refuse before asking for a name
    if let Err(e) = participant.ensure_accepting().await {
        return refuse(&mut console, e);
    }

    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    let name = match name {
        Some(name) => {
            validate_name(&name)?;
            name
        }
        None => {
            let prompted = tokio::select! {
                prompted = prompt_for_name(&participant, &mut console) => prompted,
                _ = &mut shutdown => return Ok(()),
            };
            match prompted {
                Ok(name) => name,
                Err(e) if e.is_operator_exit() => return Ok(()),
                Err(e) => return Err(e).context("Failed to read name"),
            }
        }
    };
    console.display(&server_line(&format!("Hello {}.", name)));

    if !participant.is_setup_authorized() {
        console.display(&server_line("Waiting for first connection to finish processing..."));
    }
    tokio::select! {
        gate = participant.await_setup_gate() => gate.context("Failed waiting for setup gate")?,
        _ = &mut shutdown => return Ok(()),
    }

    let admission = match participant.register(&name).await {
        Ok(admission) => admission,
        Err(e) if e.is_admission_rejection() => return refuse(&mut console, e),
        Err(e) => return Err(e).context("Failed to connect"),
    };

    match &admission.peer {
        None => console.display(&server_line(&format!(
            "You are connection {}. Please wait for another person to connect.",
            admission.position
        ))),
        Some(peer) => {
            console.display(&server_line(&format!(
                "You are connection {}. User '{}' is already connected. Please wait for a message.",
                admission.position, peer
            )));
            console.display(CHAT_BANNER);
        }
    }

    // From here on the slot is ours: every exit path goes through disconnect
    let ended: Result<(), eyre::Report> = tokio::select! {
        handoff = participant.run_handoff(&mut console) => match handoff {
            Err(e) if e.is_operator_exit() => Ok(()),
            Err(e) => Err(e.into()),
            Ok(()) => Ok(()),
        },
        signal = &mut shutdown => signal.map(|s| info!(signal = %s, "Leaving chat")).map_err(eyre::Report::from),
    };

    println!();
    match participant.disconnect().await.context("Failed to disconnect")? {
        DisconnectOutcome::HandedOver { .. } => console.display(&server_line("Disconnected.")),
        DisconnectOutcome::Closed => console.display(&server_line("Disconnected, closing server.")),
        DisconnectOutcome::NotConnected => warn!("cmd_chat: participant was not connected at exit"),
    }

    ended
}

/// Ask until we get a valid name that nobody in the roster uses
async fn prompt_for_name(participant: &Participant, console: &mut dyn Console) -> Result<String, ProtocolError> {
    loop {
        let name = console.prompt_name().await?.trim().to_string();
        if let Err(e) = validate_name(&name) {
            console.display(&client_line(&e.to_string()));
            continue;
        }
        if participant.session().roster().await?.contains(&name) {
            console.display(&server_line(&format!("Name '{}' is already taken.", name)));
            continue;
        }
        return Ok(name);
    }
}

fn refuse(console: &mut dyn Console, error: ProtocolError) -> Result<()> {
    info!(error = %error, "Admission refused");
    match error {
        ProtocolError::SessionFull { .. } => {
            console.display(&server_line("Server full, exiting..."));
            Ok(())
        }
        ProtocolError::NotAccepting { .. } => {
            console.display(&server_line("Server not accepting connections, exiting..."));
            Ok(())
        }
        other => Err(other.into()),
    }
}

async fn cmd_status(config: &Config) -> Result<()> {
    let store = FileStore::open(&config.store_path).context("Failed to open store")?;
    let session = Session::new(Arc::new(store), config.connection_limit);
    let snapshot = session.snapshot().await.context("Failed to read session")?;

    let status = snapshot
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "absent".to_string());

    println!("{}", "Session".bright_cyan().bold());
    println!("  Store:        {}", config.store_path.display());
    println!("  Status:       {}", status.yellow());
    println!(
        "  Connections:  {}/{}",
        snapshot.connection_count, snapshot.connection_limit
    );
    println!("  Roster:       {}", snapshot.roster);
    println!("  Sender:       {}", snapshot.sender.as_deref().unwrap_or("-"));
    println!("  Setup gate:   {}", snapshot.setup_gate);
    println!("  Sender left:  {}", snapshot.sender_left);
    println!("  Last message: {}", snapshot.last_message);
    println!("  Last reset:   {}", snapshot.last_reset_time);

    let violations = snapshot.check_invariants();
    if violations.is_empty() {
        println!("{} Invariants hold", "✓".green());
    } else {
        for violation in violations {
            println!("{} {}", "✗".red(), violation);
        }
    }

    Ok(())
}

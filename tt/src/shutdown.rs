//! Termination signals that trigger a clean disconnect
//!
//! SIGKILL cannot be caught. A participant killed that way leaves its slot in
//! the store until the session is next reset.
//!
//! While the line editor waits for input the terminal is in raw mode, and
//! Ctrl+C reaches the editor as a keypress rather than as SIGINT. A SIGTERM
//! sent from elsewhere at that moment still disconnects, but the process
//! exits with the editor thread blocked, so the terminal stays raw until
//! `reset` or `stty sane` is run. After SIGHUP there is no terminal left to
//! restore.

use tracing::{debug, warn};

/// Signal that ended the chat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
    Hangup,
}

impl std::fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
            Self::Hangup => write!(f, "SIGHUP"),
        }
    }
}

/// Resolve on the first graceful termination signal
#[cfg(unix)]
pub async fn wait_for_shutdown() -> std::io::Result<ShutdownSignal> {
    use tokio::signal::unix::{SignalKind, signal};

    debug!("wait_for_shutdown: installing signal handlers");
    let mut sighup = signal(SignalKind::hangup())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let received = tokio::select! {
        _ = sigint.recv() => ShutdownSignal::Interrupt,
        _ = sigterm.recv() => ShutdownSignal::Terminate,
        _ = sighup.recv() => ShutdownSignal::Hangup,
    };
    warn!(signal = %received, "Shutdown signal received");
    Ok(received)
}

/// Resolve on Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_shutdown() -> std::io::Result<ShutdownSignal> {
    debug!("wait_for_shutdown: waiting for ctrl_c (non-Unix)");
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received");
    Ok(ShutdownSignal::Interrupt)
}

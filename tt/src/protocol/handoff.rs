//! Turn handoff state machine
//!
//! ```text
//!            turn observed               message read
//! WaitingTurn ─────────────▶ Compose ─────────────────▶ Commit
//!      ▲                        │ no peer in roster       │
//!      └────────────────────────┴─────────────────────────┘
//!                  delivered, or recipient left
//! ```

use tracing::{debug, info, warn};

use super::Participant;
use crate::console::{CHAT_BANNER, Console, client_line, server_line};
use crate::error::ProtocolError;

/// Where a participant is in the handoff loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnState {
    /// Polling until we hold the turn and a peer is present
    WaitingTurn,
    /// Showing the peer's message and reading ours
    Compose,
    /// About to write `body` and pass the turn to `recipient`
    Commit { recipient: String, body: String },
}

/// Result of a commit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Message written, turn passed to the recipient
    Delivered,
    /// Recipient left while we composed; message dropped, turn kept
    RecipientLeft,
}

/// Header and body as stored in `last_message`
pub fn format_message(name: &str, body: &str) -> String {
    format!("[{}]: {}", name.to_uppercase(), body)
}

impl Participant {
    fn connected_name(&self) -> Result<String, ProtocolError> {
        match (&self.name, self.connected) {
            (Some(name), true) => Ok(name.clone()),
            _ => Err(ProtocolError::NotConnected),
        }
    }

    /// Whether we hold the turn and someone is there to receive
    pub async fn is_my_turn(&self) -> Result<bool, ProtocolError> {
        let name = self.connected_name()?;
        let sender = self.session.sender().await?;
        if sender.as_deref() != Some(name.as_str()) {
            return Ok(false);
        }
        Ok(self.session.connection_count().await? >= 2)
    }

    /// Poll until it is our turn, relaying a departed sender's notice
    pub async fn wait_for_turn(&mut self, console: &mut dyn Console) -> Result<(), ProtocolError> {
        debug!("wait_for_turn: called");
        loop {
            if self.is_my_turn().await? {
                return Ok(());
            }

            self.pause().await;

            if self.session.sender_left().await? {
                let who = self.last_peer.take().unwrap_or_else(|| "sender".to_string());
                info!(peer = %who, "Sender disconnected while we waited");
                console.display(&server_line(&format!("User '{}' disconnected.", who)));
                console.display(&server_line("Please wait for another connection or CTRL+C to exit."));
                self.session.set_sender_left(false).await?;
            }
        }
    }

    /// Pick the recipient, show the last message, read ours
    ///
    /// Returns `None` when the roster holds nobody else (a stale read).
    pub async fn compose(&mut self, console: &mut dyn Console) -> Result<Option<(String, String)>, ProtocolError> {
        let name = self.connected_name()?;
        let roster = self.session.roster().await?;
        let Some(recipient) = roster.without(&name).first().map(str::to_string) else {
            warn!(%roster, "compose: no recipient in roster");
            return Ok(None);
        };
        self.last_peer = Some(recipient.clone());

        let last_message = self.session.last_message().await?;
        if last_message.is_empty() {
            console.display("");
            console.display(&server_line(&format!(
                "User '{}' has connected, you are now chatting:",
                recipient
            )));
            console.display(CHAT_BANNER);
        } else {
            console.display(&last_message);
        }

        let body = loop {
            let body = console.get_outgoing_message(&name).await?;
            if !body.is_empty() {
                break body;
            }
            console.display(&client_line("Please enter a message of valid length."));
        };

        Ok(Some((recipient, body)))
    }

    /// Write the message and pass the turn, unless the recipient has left
    pub async fn commit(
        &mut self,
        recipient: &str,
        body: &str,
        console: &mut dyn Console,
    ) -> Result<CommitOutcome, ProtocolError> {
        let name = self.connected_name()?;

        // The recipient may have disconnected while we composed
        if !self.session.roster().await?.contains(recipient) {
            info!(recipient, "Recipient left before commit, message dropped");
            console.display(&server_line(&format!(
                "User '{}' disconnected, your message was not sent.",
                recipient
            )));
            console.display(&server_line("Please wait for another connection or CTRL+C to exit."));
            return Ok(CommitOutcome::RecipientLeft);
        }

        self.session.set_last_message(&format_message(&name, body)).await?;
        self.session.set_sender(recipient).await?;
        debug!(from = %name, to = recipient, "commit: turn handed over");
        Ok(CommitOutcome::Delivered)
    }

    /// Advance the state machine by one state
    pub async fn step(&mut self, state: TurnState, console: &mut dyn Console) -> Result<TurnState, ProtocolError> {
        match state {
            TurnState::WaitingTurn => {
                self.wait_for_turn(console).await?;
                Ok(TurnState::Compose)
            }
            TurnState::Compose => Ok(match self.compose(console).await? {
                Some((recipient, body)) => TurnState::Commit { recipient, body },
                None => TurnState::WaitingTurn,
            }),
            TurnState::Commit { recipient, body } => {
                let outcome = self.commit(&recipient, &body, console).await?;
                debug!(?outcome, "step: commit finished");
                Ok(TurnState::WaitingTurn)
            }
        }
    }

    /// Run the handoff loop; only returns on error
    pub async fn run_handoff(&mut self, console: &mut dyn Console) -> Result<(), ProtocolError> {
        let mut state = TurnState::WaitingTurn;
        loop {
            state = self.step(state, console).await?;
        }
    }
}

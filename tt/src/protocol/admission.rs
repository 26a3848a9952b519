//! Connection admission

use tracing::{debug, info};

use super::Participant;
use crate::error::ProtocolError;
use crate::session::{SessionStatus, validate_name};

/// Result of a successful connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// 1 for the first participant, 2 for the second
    pub position: usize,
    /// Participant already connected when we joined
    pub peer: Option<String>,
}

impl Admission {
    /// First participant holds the initial turn
    pub fn is_first(&self) -> bool {
        self.position == 1
    }
}

impl Participant {
    /// Refuse early if the session is full or not OPEN
    ///
    /// Returns the connection count observed by the check.
    pub async fn ensure_accepting(&self) -> Result<usize, ProtocolError> {
        let count = self.session.connection_count().await?;
        let limit = self.session.connection_limit().await?;
        debug!(count, limit, "ensure_accepting: read counts");

        if count >= limit {
            return Err(ProtocolError::SessionFull { limit });
        }

        match self.session.status().await? {
            Some(SessionStatus::Open) => Ok(count),
            status => Err(ProtocolError::NotAccepting { status }),
        }
    }

    /// Block until the participant that performed the reset has registered
    ///
    /// Returns immediately for the resetter. Everyone else polls
    /// `setup_gate`, which is only set after `connection_count` has been
    /// incremented, so the count read afterwards is never the pre-registration
    /// zero.
    pub async fn await_setup_gate(&mut self) -> Result<(), ProtocolError> {
        if self.setup_authorized {
            return Ok(());
        }

        info!("Waiting for first connection to finish processing");
        while !self.session.setup_gate().await? {
            self.pause().await;
        }
        self.setup_authorized = true;
        debug!("await_setup_gate: gate open");
        Ok(())
    }

    /// Register under `name` after the gate has been passed
    ///
    /// This is the write half of admission and is not meant to be cancelled.
    pub async fn register(&mut self, name: &str) -> Result<Admission, ProtocolError> {
        debug!(name, "Participant::register: called");
        validate_name(name)?;
        if let Some(current) = &self.name
            && self.connected
        {
            return Err(ProtocolError::AlreadyConnected(current.clone()));
        }

        let count = self.ensure_accepting().await?;
        let mut roster = self.session.roster().await?;
        if roster.contains(name) {
            return Err(ProtocolError::NameTaken(name.to_string()));
        }

        let admission = if count == 0 {
            // First in: sole roster member and holder of the initial turn
            self.session.set_roster(&crate::session::Roster::single(name)).await?;
            self.session.set_sender(name).await?;
            Admission {
                position: 1,
                peer: None,
            }
        } else {
            // Second in: recipient; the first participant keeps the turn
            let peer = roster.first().map(str::to_string);
            roster.push(name);
            self.session.set_status(SessionStatus::Active).await?;
            self.session.set_roster(&roster).await?;
            Admission {
                position: count + 1,
                peer,
            }
        };

        self.session.set_connection_count(count + 1).await?;
        self.session.set_setup_gate(true).await?;

        self.name = Some(name.to_string());
        self.connected = true;
        self.last_peer = admission.peer.clone();
        info!(name, position = admission.position, peer = ?admission.peer, "Connected");
        Ok(admission)
    }

    /// Check admission, wait out a lost setup race, then register
    pub async fn connect(&mut self, name: &str) -> Result<Admission, ProtocolError> {
        self.ensure_accepting().await?;
        self.await_setup_gate().await?;
        self.register(name).await
    }
}

//! Two-party coordination protocol over a polled store
//!
//! A participant goes through four phases, each in its own module:
//!
//! - [`bootstrap`] - reinitialize a closed or absent session, winning the
//!   right to register first
//! - [`admission`] - take a slot and decide first vs second role
//! - [`handoff`] - wait for the turn, compose, commit, hand the turn over
//! - [`disconnect`] - leave, flagging the peer if we held the turn
//!
//! Nothing here locks. `sender` is an advisory token: a participant writes
//! `last_message` only while it reads itself as sender, and correctness
//! depends on the order of the writes in each phase.

pub mod admission;
pub mod bootstrap;
pub mod disconnect;
pub mod handoff;

use std::sync::Arc;
use std::time::Duration;

use sharedstore::SharedStore;
use tracing::debug;

use crate::session::Session;

pub use admission::Admission;
pub use bootstrap::{ResetOutcome, ResetReport};
pub use disconnect::DisconnectOutcome;
pub use handoff::{CommitOutcome, TurnState, format_message};

/// Default interval between store polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Connection limit; the handoff logic is defined for exactly two
pub const DEFAULT_CONNECTION_LIMIT: usize = 2;

/// Tunables for one participant
#[derive(Debug, Clone)]
pub struct ProtocolConfig {
    /// Fixed delay between polls while waiting
    pub poll_interval: Duration,
    /// Limit written into the session at reset
    pub connection_limit: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            connection_limit: DEFAULT_CONNECTION_LIMIT,
        }
    }
}

/// One chat participant; all shared state lives in the store
pub struct Participant {
    session: Session,
    config: ProtocolConfig,
    /// Set by connect
    name: Option<String>,
    /// True once this participant may read `connection_count` to pick its role
    setup_authorized: bool,
    connected: bool,
    /// Display only: who we last chatted with
    last_peer: Option<String>,
}

impl Participant {
    pub fn new(store: Arc<dyn SharedStore>, config: ProtocolConfig) -> Self {
        debug!(?config, "Participant::new: called");
        Self {
            session: Session::new(store, config.connection_limit),
            config,
            name: None,
            setup_authorized: false,
            connected: false,
            last_peer: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether this participant performed the reset or already passed the gate
    pub fn is_setup_authorized(&self) -> bool {
        self.setup_authorized
    }

    async fn pause(&self) {
        tokio::time::sleep(self.config.poll_interval).await;
    }
}

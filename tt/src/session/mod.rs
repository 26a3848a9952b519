//! Session state held in the shared store
//!
//! The whole coordination state is a handful of scalar string keys. This
//! module names them and provides typed reads and writes; it keeps no local
//! copy of any value, so every read goes to the store.

mod roster;
mod snapshot;
mod status;

use std::sync::Arc;

use sharedstore::SharedStore;
use tracing::debug;

pub use roster::{Roster, validate_name};
pub use snapshot::SessionSnapshot;
pub use status::SessionStatus;

use crate::error::ProtocolError;

/// Store keys making up the session schema
pub mod keys {
    pub const CONNECTION_LIMIT: &str = "connection_limit";
    pub const CONNECTION_COUNT: &str = "connection_count";
    pub const ROSTER: &str = "roster";
    pub const SENDER: &str = "sender";
    pub const SETUP_GATE: &str = "setup_gate";
    pub const SENDER_LEFT_FLAG: &str = "sender_left_flag";
    pub const LAST_MESSAGE: &str = "last_message";
    pub const STATUS: &str = "status";
    pub const LAST_RESET_TIME: &str = "last_reset_time";
}

const TRUE: &str = "TRUE";
const FALSE: &str = "FALSE";

/// Typed view over the session keys of a shared store
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SharedStore>,
    default_limit: usize,
}

impl Session {
    /// `default_limit` is reported when the limit key is absent
    pub fn new(store: Arc<dyn SharedStore>, default_limit: usize) -> Self {
        Self { store, default_limit }
    }

    /// Wipe the store and write a fresh OPEN session
    ///
    /// `status` is written after every key it guards so a reader that sees
    /// OPEN also sees the rest of the schema (once propagated).
    pub async fn initialize(&self, limit: usize, reset_time: &str) -> Result<(), ProtocolError> {
        debug!(limit, reset_time, "Session::initialize: called");
        self.store.clear().await?;
        self.set_connection_limit(limit).await?;
        self.set_connection_count(0).await?;
        self.set_setup_gate(false).await?;
        self.set_roster(&Roster::new()).await?;
        self.set_sender("").await?;
        self.set_sender_left(false).await?;
        self.set_last_message("").await?;
        self.set_status(SessionStatus::Open).await?;
        self.set_last_reset_time(reset_time).await?;
        Ok(())
    }

    /// Absent status reads as `None`
    pub async fn status(&self) -> Result<Option<SessionStatus>, ProtocolError> {
        let raw = self.store.get(keys::STATUS).await?;
        if raw.is_empty() {
            return Ok(None);
        }
        raw.parse()
            .map(Some)
            .map_err(|_| ProtocolError::Corrupt {
                key: keys::STATUS,
                value: raw,
            })
    }

    pub async fn set_status(&self, status: SessionStatus) -> Result<(), ProtocolError> {
        Ok(self.store.set(keys::STATUS, &status.to_string()).await?)
    }

    pub async fn connection_limit(&self) -> Result<usize, ProtocolError> {
        self.read_count(keys::CONNECTION_LIMIT, self.default_limit).await
    }

    pub async fn set_connection_limit(&self, limit: usize) -> Result<(), ProtocolError> {
        Ok(self.store.set(keys::CONNECTION_LIMIT, &limit.to_string()).await?)
    }

    /// Absent count reads as 0
    pub async fn connection_count(&self) -> Result<usize, ProtocolError> {
        self.read_count(keys::CONNECTION_COUNT, 0).await
    }

    pub async fn set_connection_count(&self, count: usize) -> Result<(), ProtocolError> {
        Ok(self.store.set(keys::CONNECTION_COUNT, &count.to_string()).await?)
    }

    pub async fn roster(&self) -> Result<Roster, ProtocolError> {
        Ok(Roster::parse(&self.store.get(keys::ROSTER).await?))
    }

    pub async fn set_roster(&self, roster: &Roster) -> Result<(), ProtocolError> {
        Ok(self.store.set(keys::ROSTER, &roster.encode()).await?)
    }

    /// Empty sender reads as `None`
    pub async fn sender(&self) -> Result<Option<String>, ProtocolError> {
        let raw = self.store.get(keys::SENDER).await?;
        Ok(if raw.is_empty() { None } else { Some(raw) })
    }

    pub async fn set_sender(&self, name: &str) -> Result<(), ProtocolError> {
        Ok(self.store.set(keys::SENDER, name).await?)
    }

    pub async fn setup_gate(&self) -> Result<bool, ProtocolError> {
        self.read_flag(keys::SETUP_GATE).await
    }

    pub async fn set_setup_gate(&self, open: bool) -> Result<(), ProtocolError> {
        self.write_flag(keys::SETUP_GATE, open).await
    }

    pub async fn sender_left(&self) -> Result<bool, ProtocolError> {
        self.read_flag(keys::SENDER_LEFT_FLAG).await
    }

    pub async fn set_sender_left(&self, left: bool) -> Result<(), ProtocolError> {
        self.write_flag(keys::SENDER_LEFT_FLAG, left).await
    }

    pub async fn last_message(&self) -> Result<String, ProtocolError> {
        Ok(self.store.get(keys::LAST_MESSAGE).await?)
    }

    pub async fn set_last_message(&self, message: &str) -> Result<(), ProtocolError> {
        Ok(self.store.set(keys::LAST_MESSAGE, message).await?)
    }

    pub async fn last_reset_time(&self) -> Result<String, ProtocolError> {
        Ok(self.store.get(keys::LAST_RESET_TIME).await?)
    }

    pub async fn set_last_reset_time(&self, time: &str) -> Result<(), ProtocolError> {
        Ok(self.store.set(keys::LAST_RESET_TIME, time).await?)
    }

    /// Read every field, one key at a time
    pub async fn snapshot(&self) -> Result<SessionSnapshot, ProtocolError> {
        Ok(SessionSnapshot {
            connection_limit: self.connection_limit().await?,
            connection_count: self.connection_count().await?,
            roster: self.roster().await?,
            sender: self.sender().await?,
            status: self.status().await?,
            setup_gate: self.setup_gate().await?,
            sender_left: self.sender_left().await?,
            last_message: self.last_message().await?,
            last_reset_time: self.last_reset_time().await?,
        })
    }

    async fn read_count(&self, key: &'static str, absent: usize) -> Result<usize, ProtocolError> {
        let raw = self.store.get(key).await?;
        if raw.is_empty() {
            return Ok(absent);
        }
        raw.trim()
            .parse()
            .map_err(|_| ProtocolError::Corrupt { key, value: raw })
    }

    async fn read_flag(&self, key: &'static str) -> Result<bool, ProtocolError> {
        let raw = self.store.get(key).await?;
        match raw.as_str() {
            TRUE => Ok(true),
            FALSE | "" => Ok(false),
            _ => Err(ProtocolError::Corrupt { key, value: raw }),
        }
    }

    async fn write_flag(&self, key: &str, value: bool) -> Result<(), ProtocolError> {
        Ok(self.store.set(key, if value { TRUE } else { FALSE }).await?)
    }
}

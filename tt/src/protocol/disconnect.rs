//! Leaving the session

use tracing::{debug, info, warn};

use super::Participant;
use crate::error::ProtocolError;
use crate::session::{Roster, SessionStatus};

/// What `disconnect` did to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectOutcome {
    /// One participant remains and now holds the turn
    HandedOver { remaining: String },
    /// We were the last one; the session is CLOSED
    Closed,
    /// Never registered, or already disconnected
    NotConnected,
}

impl Participant {
    /// Give up our slot
    ///
    /// Runs its writes at most once per participant. A departing sender sets
    /// `sender_left_flag` because the remaining participant is blocked waiting
    /// for a message that will not come; a departing recipient needs no flag,
    /// the sender notices at commit time.
    pub async fn disconnect(&mut self) -> Result<DisconnectOutcome, ProtocolError> {
        debug!(name = ?self.name, connected = self.connected, "Participant::disconnect: called");
        let name = match (&self.name, self.connected) {
            (Some(name), true) => name.clone(),
            _ => return Ok(DisconnectOutcome::NotConnected),
        };
        self.connected = false;

        let count = self.session.connection_count().await?.saturating_sub(1);
        self.session.set_connection_count(count).await?;

        if count == 1 {
            let roster = self.session.roster().await?;
            if let Some(remaining) = roster.without(&name).first().map(str::to_string) {
                if self.session.sender().await?.as_deref() == Some(name.as_str()) {
                    self.session.set_sender_left(true).await?;
                }
                self.session.set_sender(&remaining).await?;
                self.session.set_roster(&Roster::single(&remaining)).await?;
                // Next chat starts fresh once a new participant connects
                self.session.set_last_message("").await?;
                self.session.set_status(SessionStatus::Open).await?;
                info!(name = %name, remaining = %remaining, "Disconnected, turn handed over");
                return Ok(DisconnectOutcome::HandedOver { remaining });
            }

            warn!(%roster, name = %name, "disconnect: no remaining participant in roster, closing");
            self.session.set_connection_count(0).await?;
        }

        self.session.set_status(SessionStatus::Closed).await?;
        self.session.set_roster(&Roster::new()).await?;
        self.session.set_sender("").await?;
        info!(name = %name, "Disconnected, session closed");
        Ok(DisconnectOutcome::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{joined, participant};
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::session::keys;
    use sharedstore::{MemoryStore, SharedStore};

    #[tokio::test]
    async fn test_sender_disconnect() {
        let store = MemoryStore::new();
        let mut alice = joined(&store, "alice").await;
        let _bob = joined(&store, "bob").await;

        let outcome = alice.disconnect().await.unwrap();

        assert_eq!(
            outcome,
            DisconnectOutcome::HandedOver {
                remaining: "bob".to_string()
            }
        );
        let snap = alice.session().snapshot().await.unwrap();
        assert_eq!(snap.connection_count, 1);
        assert_eq!(snap.roster.names(), ["bob"]);
        assert_eq!(snap.sender.as_deref(), Some("bob"));
        assert!(snap.sender_left);
        assert_eq!(snap.last_message, "");
        assert_eq!(snap.status, Some(SessionStatus::Open));
        assert!(snap.check_invariants().is_empty());
    }

    #[tokio::test]
    async fn test_recipient_disconnect_sets_no_flag() {
        let store = MemoryStore::new();
        let mut alice = joined(&store, "alice").await;
        let bob = joined(&store, "bob").await;
        alice
            .commit("bob", "hello", &mut ScriptedConsole::new())
            .await
            .unwrap();

        // bob holds the turn, alice is the recipient
        alice.disconnect().await.unwrap();

        assert_eq!(store.get(keys::SENDER_LEFT_FLAG).await.unwrap(), "FALSE");
        assert_eq!(store.get(keys::SENDER).await.unwrap(), "bob");
        assert_eq!(store.get(keys::LAST_MESSAGE).await.unwrap(), "");
        assert!(!bob.is_my_turn().await.unwrap(), "bob is alone again");
    }

    #[tokio::test]
    async fn test_last_disconnect_closes_session() {
        let store = MemoryStore::new();
        let mut alice = joined(&store, "alice").await;

        assert_eq!(alice.disconnect().await.unwrap(), DisconnectOutcome::Closed);

        let snap = alice.session().snapshot().await.unwrap();
        assert_eq!(snap.status, Some(SessionStatus::Closed));
        assert_eq!(snap.connection_count, 0);
        assert!(snap.roster.is_empty());
        assert_eq!(snap.sender, None);
        assert!(snap.check_invariants().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_runs_once() {
        let store = MemoryStore::new();
        let mut alice = joined(&store, "alice").await;
        let _bob = joined(&store, "bob").await;

        alice.disconnect().await.unwrap();
        assert_eq!(alice.disconnect().await.unwrap(), DisconnectOutcome::NotConnected);
        assert_eq!(store.get(keys::CONNECTION_COUNT).await.unwrap(), "1");
    }

    #[tokio::test]
    async fn test_disconnect_without_connect_is_noop() {
        let store = MemoryStore::new();
        let mut p = participant(&store);
        p.reset().await.unwrap();

        assert_eq!(p.disconnect().await.unwrap(), DisconnectOutcome::NotConnected);
        assert_eq!(store.get(keys::STATUS).await.unwrap(), "OPEN");
    }

    #[tokio::test]
    async fn test_stale_roster_falls_back_to_close() {
        let store = MemoryStore::new();
        let mut alice = joined(&store, "alice").await;
        let _bob = joined(&store, "bob").await;
        store.set(keys::ROSTER, "alice").await.unwrap();

        assert_eq!(alice.disconnect().await.unwrap(), DisconnectOutcome::Closed);
        assert_eq!(store.get(keys::CONNECTION_COUNT).await.unwrap(), "0");
        assert_eq!(store.get(keys::STATUS).await.unwrap(), "CLOSED");
    }
}

//! Session bootstrap and reset

use tracing::{debug, info};

use super::Participant;
use crate::error::ProtocolError;
use crate::session::SessionStatus;

/// What `reset` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// Session was closed or absent and has been rewritten
    Reinitialized,
    /// Session was OPEN or ACTIVE and was left alone
    Existing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetReport {
    pub outcome: ResetOutcome,
    /// As read back after the reset decision
    pub last_reset_time: String,
}

impl Participant {
    /// Reinitialize the session if it is CLOSED or was never created
    ///
    /// The caller that performs the rewrite is authorized to register
    /// immediately; it writes `setup_gate = FALSE` so anyone else who saw the
    /// stale state waits in `connect` until it has registered as connection 1.
    pub async fn reset(&mut self) -> Result<ResetReport, ProtocolError> {
        debug!("Participant::reset: called");
        let status = self.session.status().await?;

        let outcome = match status {
            None | Some(SessionStatus::Closed) => {
                let now = chrono::Local::now().format("%H:%M:%S").to_string();
                self.session.initialize(self.config.connection_limit, &now).await?;
                self.setup_authorized = true;
                info!(previous = ?status, reset_time = %now, "Session reinitialized");
                ResetOutcome::Reinitialized
            }
            Some(status) => {
                debug!(%status, "reset: existing session is valid");
                ResetOutcome::Existing
            }
        };

        Ok(ResetReport {
            outcome,
            last_reset_time: self.session.last_reset_time().await?,
        })
    }
}

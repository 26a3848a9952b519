//! Point-in-time view of every session field

use super::{Roster, SessionStatus};

/// All session fields as read, one key at a time
///
/// Reads are not atomic across keys, so a snapshot taken while another
/// participant is mid-handoff can be inconsistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub connection_limit: usize,
    pub connection_count: usize,
    pub roster: Roster,
    pub sender: Option<String>,
    pub status: Option<SessionStatus>,
    pub setup_gate: bool,
    pub sender_left: bool,
    pub last_message: String,
    pub last_reset_time: String,
}

impl SessionSnapshot {
    /// Describe every violated session invariant
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.connection_count != self.roster.len() {
            violations.push(format!(
                "connection_count {} != roster length {} ({})",
                self.connection_count,
                self.roster.len(),
                self.roster
            ));
        }

        if let Some(sender) = &self.sender
            && !self.roster.contains(sender)
        {
            violations.push(format!("sender '{}' not in roster ({})", sender, self.roster));
        }

        match self.status {
            Some(SessionStatus::Active) if self.connection_count != self.connection_limit => {
                violations.push(format!(
                    "status ACTIVE with {} of {} connections",
                    self.connection_count, self.connection_limit
                ));
            }
            Some(SessionStatus::Closed) if self.connection_count != 0 || !self.roster.is_empty() => {
                violations.push(format!(
                    "status CLOSED with {} connections and roster ({})",
                    self.connection_count, self.roster
                ));
            }
            _ => {}
        }

        violations
    }

    /// Same session ignoring the diagnostic reset timestamp
    pub fn same_state_as(&self, other: &SessionSnapshot) -> bool {
        Self {
            last_reset_time: String::new(),
            ..self.clone()
        } == Self {
            last_reset_time: String::new(),
            ..other.clone()
        }
    }
}

//! turntalk - two-party turn-based chat over a polled key-value store
//!
//! Two participants take turns writing messages into a shared store that
//! offers nothing but `get`, `set` and `clear`. There are no locks and no
//! notifications: each participant polls, and the `sender` key acts as an
//! advisory token saying whose turn it is.
//!
//! # Modules
//!
//! - [`session`] - store keys and typed views over them
//! - [`protocol`] - bootstrap, admission, turn handoff, disconnect
//! - [`console`] - operator I/O collaborator
//! - [`shutdown`] - signals that trigger the scoped disconnect
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod protocol;
pub mod session;
pub mod shutdown;

pub use config::Config;
pub use console::{Console, ConsoleError, ScriptedConsole, TerminalConsole};
pub use error::ProtocolError;
pub use protocol::{
    Admission, CommitOutcome, DisconnectOutcome, Participant, ProtocolConfig, ResetOutcome, ResetReport, TurnState,
    format_message,
};
pub use session::{Roster, Session, SessionSnapshot, SessionStatus};
pub use shutdown::{ShutdownSignal, wait_for_shutdown};

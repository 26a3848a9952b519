//! Operator-facing I/O used by the protocol
//!
//! The protocol never touches the terminal directly. It asks a [`Console`]
//! for a name and for outgoing messages, and hands it lines to show.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, mpsc};

use async_trait::async_trait;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::debug;

/// Tag for lines produced by the coordination layer
pub const SERVER_TAG: &str = "[SERVER]";

/// Tag for lines about local input handling
pub const CLIENT_TAG: &str = "[CLIENT]";

/// Separator shown when a chat starts
pub const CHAT_BANNER: &str = "================================== CHAT ==================================";

/// Errors from reading operator input
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Interrupted")]
    Interrupted,

    #[error("Input closed")]
    Closed,

    #[error("Console I/O error: {0}")]
    Io(String),
}

/// Interactive collaborator; every call blocks until the operator answers
#[async_trait]
pub trait Console: Send {
    /// Ask for the participant's display name
    async fn prompt_name(&mut self) -> Result<String, ConsoleError>;

    /// Ask `name` for the next message body
    async fn get_outgoing_message(&mut self, name: &str) -> Result<String, ConsoleError>;

    /// Show one line to the operator
    fn display(&mut self, text: &str);
}

/// Format a line tagged as coming from the coordination layer
pub fn server_line(text: &str) -> String {
    format!("{} {}", SERVER_TAG, text)
}

/// Format a line tagged as coming from local input handling
pub fn client_line(text: &str) -> String {
    format!("{} {}", CLIENT_TAG, text)
}

/// Prompt shown while composing, e.g. `[ALICE]: `
pub fn message_prompt(name: &str) -> String {
    format!("[{}]: ", name.to_uppercase())
}

struct ReadRequest {
    prompt: String,
    reply: oneshot::Sender<Result<String, ConsoleError>>,
}

/// Terminal console backed by a rustyline editor
///
/// The editor lives on its own thread so a pending read never pins a tokio
/// worker; when the process exits that thread is dropped with it.
pub struct TerminalConsole {
    requests: mpsc::Sender<ReadRequest>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        let (requests, rx) = mpsc::channel::<ReadRequest>();
        // Without the thread every read reports Closed
        if let Err(e) = std::thread::Builder::new()
            .name("console-input".to_string())
            .spawn(move || input_thread(rx))
        {
            tracing::error!(error = %e, "Failed to spawn console input thread");
        }
        Self { requests }
    }

    async fn read_line(&mut self, prompt: String) -> Result<String, ConsoleError> {
        let (reply, response) = oneshot::channel();
        self.requests
            .send(ReadRequest { prompt, reply })
            .map_err(|_| ConsoleError::Closed)?;
        response.await.map_err(|_| ConsoleError::Closed)?
    }
}

impl Default for TerminalConsole {
    fn default() -> Self {
        Self::new()
    }
}

fn input_thread(rx: mpsc::Receiver<ReadRequest>) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => Some(editor),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize readline");
            None
        }
    };

    while let Ok(request) = rx.recv() {
        let result = match editor.as_mut() {
            Some(editor) => match editor.readline(&request.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = editor.add_history_entry(line.as_str());
                    }
                    Ok(line)
                }
                Err(ReadlineError::Interrupted) => Err(ConsoleError::Interrupted),
                Err(ReadlineError::Eof) => Err(ConsoleError::Closed),
                Err(e) => Err(ConsoleError::Io(e.to_string())),
            },
            None => Err(ConsoleError::Io("readline unavailable".to_string())),
        };
        let _ = request.reply.send(result);
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn prompt_name(&mut self) -> Result<String, ConsoleError> {
        self.read_line(format!("{} Enter name: ", SERVER_TAG.bright_cyan())).await
    }

    async fn get_outgoing_message(&mut self, name: &str) -> Result<String, ConsoleError> {
        self.read_line(message_prompt(name).bright_green().to_string()).await
    }

    fn display(&mut self, text: &str) {
        if let Some(rest) = text.strip_prefix(SERVER_TAG) {
            println!("{}{}", SERVER_TAG.bright_cyan(), rest);
        } else if let Some(rest) = text.strip_prefix(CLIENT_TAG) {
            println!("{}{}", CLIENT_TAG.yellow(), rest);
        } else {
            println!("{}", text);
        }
    }
}

/// Console fed from queues, recording everything displayed
///
/// Runs a participant without a terminal. Once a queue is exhausted the
/// corresponding read fails with [`ConsoleError::Closed`].
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    names: VecDeque<String>,
    messages: VecDeque<String>,
    transcript: Arc<Mutex<Vec<String>>>,
}

impl ScriptedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_messages<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.messages.extend(messages.into_iter().map(Into::into));
        self
    }

    /// Shared handle to the displayed lines, readable after the console moves
    pub fn transcript_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.transcript)
    }

    /// Copy of every displayed line so far
    pub fn transcript(&self) -> Vec<String> {
        self.transcript.lock().map(|t| t.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    async fn prompt_name(&mut self) -> Result<String, ConsoleError> {
        self.names.pop_front().ok_or(ConsoleError::Closed)
    }

    async fn get_outgoing_message(&mut self, name: &str) -> Result<String, ConsoleError> {
        let message = self.messages.pop_front().ok_or(ConsoleError::Closed)?;
        debug!(name, message = %message, "ScriptedConsole::get_outgoing_message");
        Ok(message)
    }

    fn display(&mut self, text: &str) {
        if let Ok(mut transcript) = self.transcript.lock() {
            transcript.push(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_tags() {
        assert_eq!(server_line("Hello alice."), "[SERVER] Hello alice.");
        assert_eq!(client_line("oops"), "[CLIENT] oops");
        assert_eq!(message_prompt("alice"), "[ALICE]: ");
    }

    #[tokio::test]
    async fn test_scripted_console_queues() {
        let mut console = ScriptedConsole::new().with_names(["alice"]).with_messages(["hi", ""]);

        assert_eq!(console.prompt_name().await.unwrap(), "alice");
        assert!(matches!(console.prompt_name().await, Err(ConsoleError::Closed)));

        assert_eq!(console.get_outgoing_message("alice").await.unwrap(), "hi");
        assert_eq!(console.get_outgoing_message("alice").await.unwrap(), "");
        assert!(matches!(
            console.get_outgoing_message("alice").await,
            Err(ConsoleError::Closed)
        ));
    }

    #[test]
    fn test_scripted_console_transcript() {
        let mut console = ScriptedConsole::new();
        let handle = console.transcript_handle();

        console.display("one");
        console.display("two");

        assert_eq!(console.transcript(), vec!["one", "two"]);
        assert_eq!(handle.lock().unwrap().len(), 2);
    }
}

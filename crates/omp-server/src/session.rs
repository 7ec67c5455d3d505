//! Per-connection session state.
//!
//! One [`Session`] serves one client connection end to end, single
//! threaded: feed it events (or a byte stream via [`Session::serve`])
//! and it mutates its own state, accumulates the open command, and
//! writes responses into its sink.
//!
//! The session also supports transient construction for reentrant
//! sub-command execution: a wizard builds a second session over the
//! same backend while the outer one stays exactly where it was.

use std::io::BufRead;

use tracing::{debug, warn};

use omp_core::error::{Error, Result};
use omp_core::event::{Attrs, EventReader, XmlEvent};
use omp_core::sink::{BufferSink, OutputSink};
use omp_core::status::StatusCode;

use crate::backend::Backend;
use crate::config::EngineConfig;
use crate::dispatch;
use crate::parser::{self, ActiveCommand, ElementParser, EndResult, StartResult};
use crate::response;

/// Whether the caller should keep feeding events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep going.
    Continue,
    /// Stop parsing this stream; the connection is done.
    Quit,
}

/// Session role established at authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
    /// Read-only role; mutating commands are refused.
    Observer,
}

impl Role {
    /// Parse the backend's role string; unknown strings get the
    /// least-privileged non-observer role.
    pub fn parse(role: &str) -> Role {
        match role.to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "observer" => Role::Observer,
            _ => Role::User,
        }
    }

    /// Wire spelling of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
            Role::Observer => "Observer",
        }
    }
}

/// Identity of an authenticated session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub username: String,
    pub role: Role,
    pub timezone: String,
}

/// Authentication phase of the session.
#[derive(Debug, Clone)]
pub(crate) enum Phase {
    PreAuth,
    Authenticated(SessionUser),
}

/// Per-connection protocol state.
pub struct Session<S: OutputSink> {
    pub(crate) phase: Phase,
    /// The open command's parser and data; `None` at the baseline.
    active: Option<ActiveCommand>,
    /// Remaining depth of an unknown subtree being read over.
    read_over_depth: u32,
    /// Bytes of text accumulated by the open command.
    text_used: usize,
    /// Inside a <commands> wrapper.
    in_commands: bool,
    /// This process already forked a scan worker.
    pub(crate) forked: bool,
    pub(crate) config: EngineConfig,
    pub(crate) sink: S,
}

impl<S: OutputSink> Session<S> {
    /// Create a session for a fresh connection.
    pub fn new(config: EngineConfig, sink: S) -> Self {
        Session {
            phase: Phase::PreAuth,
            active: None,
            read_over_depth: 0,
            text_used: 0,
            in_commands: false,
            forked: false,
            config,
            sink,
        }
    }

    /// The output sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The output sink, mutably (for draining).
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the session, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// True once AUTHENTICATE has succeeded.
    pub fn authenticated(&self) -> bool {
        matches!(self.phase, Phase::Authenticated(_))
    }

    /// The authenticated user, if any.
    pub fn user(&self) -> Option<&SessionUser> {
        match &self.phase {
            Phase::Authenticated(user) => Some(user),
            Phase::PreAuth => None,
        }
    }

    /// True when no command is open and no read-over is pending — the
    /// state every command must return to, success or failure.
    pub fn at_baseline(&self) -> bool {
        self.active.is_none() && self.read_over_depth == 0
    }

    /// Current read-over depth (0 when not skipping).
    pub fn read_over_depth(&self) -> u32 {
        self.read_over_depth
    }

    /// Drive a whole byte stream through the session.
    ///
    /// Returns when the stream ends or a command signals the end of the
    /// connection. Transport faults (malformed XML, I/O) and fatal
    /// conditions propagate as errors; `Error::BufferFull` propagates
    /// with all state intact so the caller can drain the sink and
    /// resume.
    pub fn serve<R: BufRead, B: Backend>(&mut self, reader: R, backend: &mut B) -> Result<()> {
        let mut events = EventReader::new(reader);
        loop {
            let event = match events.next_event() {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(error @ Error::Xml { .. }) => {
                    // Best-effort notification; the stream cannot be
                    // resynchronized, so the connection ends either way.
                    let _ = response::with_text(
                        &mut self.sink,
                        "omp",
                        StatusCode::Syntax,
                        "Error in XML stream",
                    );
                    self.reset_command();
                    return Err(error);
                }
                Err(error) => return Err(error),
            };
            match self.process_event(event, backend)? {
                Flow::Continue => {}
                Flow::Quit => break,
            }
        }
        Ok(())
    }

    /// Feed one event through the state machine.
    pub fn process_event<B: Backend>(&mut self, event: XmlEvent, backend: &mut B) -> Result<Flow> {
        // A pending read-over swallows everything until the unknown
        // subtree closes; the open parser is left untouched.
        if self.read_over_depth > 0 {
            match event {
                XmlEvent::Start { .. } => self.read_over_depth += 1,
                XmlEvent::End { .. } => self.read_over_depth -= 1,
                XmlEvent::Text(_) => {}
            }
            return Ok(Flow::Continue);
        }

        match event {
            XmlEvent::Start { name, attrs } => self.handle_start(&name, &attrs),
            XmlEvent::Text(text) => self.handle_text(&text),
            XmlEvent::End { name } => self.handle_end(&name, backend),
        }
    }

    fn handle_start(&mut self, name: &str, attrs: &Attrs) -> Result<Flow> {
        let Some(active) = self.active.as_mut() else {
            return self.open_top_level(name, attrs);
        };

        match active.start_element(name, attrs) {
            StartResult::Consumed => Ok(Flow::Continue),
            StartResult::Unknown if active.importing() => {
                debug!(element = name, "reading over unknown import element");
                self.read_over_depth = 1;
                Ok(Flow::Continue)
            }
            StartResult::Unknown => {
                let command = active.command_name().to_owned();
                warn!(command = %command, element = name, "unexpected element");
                response::with_text(
                    &mut self.sink,
                    &command,
                    StatusCode::Syntax,
                    &format!("Bogus element: {}", name),
                )?;
                self.reset_command();
                Ok(Flow::Quit)
            }
        }
    }

    fn open_top_level(&mut self, name: &str, attrs: &Attrs) -> Result<Flow> {
        if name == "commands" && !self.in_commands {
            self.in_commands = true;
            response::open(&mut self.sink, "commands", StatusCode::Ok)?;
            return Ok(Flow::Continue);
        }

        match parser::open_command(name, attrs) {
            Some(active) => {
                self.active = Some(active);
                Ok(Flow::Continue)
            }
            None => {
                warn!(element = name, "bogus command name");
                response::with_text(
                    &mut self.sink,
                    "omp",
                    StatusCode::Syntax,
                    "Bogus command name",
                )?;
                Ok(Flow::Quit)
            }
        }
    }

    fn handle_text(&mut self, text: &str) -> Result<Flow> {
        let Some(active) = self.active.as_mut() else {
            // Whitespace (or stray text) between commands carries no
            // meaning.
            return Ok(Flow::Continue);
        };

        self.text_used = self.text_used.saturating_add(text.len());
        if self.text_used > self.config.max_command_text {
            let command = active.command_name().to_owned();
            warn!(command = %command, "command text limit exceeded");
            response::with_text(
                &mut self.sink,
                &command,
                StatusCode::Syntax,
                "Command text is too long",
            )?;
            self.reset_command();
            return Ok(Flow::Quit);
        }

        active.text(text);
        Ok(Flow::Continue)
    }

    fn handle_end<B: Backend>(&mut self, name: &str, backend: &mut B) -> Result<Flow> {
        match self.active.as_mut() {
            Some(active) => match active.end_element(name) {
                EndResult::Open => Ok(Flow::Continue),
                EndResult::Complete(command) => {
                    // Reset before dispatch: the command record now owns
                    // every accumulated field, and the session is back at
                    // the baseline whatever dispatch decides.
                    self.reset_command();
                    dispatch::dispatch(self, backend, command)
                }
            },
            None => {
                if self.in_commands && name == "commands" {
                    self.in_commands = false;
                    response::close(&mut self.sink, "commands")?;
                    return Ok(Flow::Continue);
                }
                // The event source enforces tag balance, so an end
                // element with nothing open cannot happen.
                Err(Error::Internal {
                    message: format!("unbalanced end element </{}>", name),
                })
            }
        }
    }

    /// Drop the open command and its accumulated data.
    ///
    /// Safe to call with nothing open; runs exactly once per command on
    /// the closing tag and on every aborting error path.
    fn reset_command(&mut self) {
        self.active = None;
        self.text_used = 0;
        self.read_over_depth = 0;
    }

    /// Run synthesized sub-commands through a transient session sharing
    /// this session's identity and backend, capturing their output.
    ///
    /// The outer session is untouched apart from inheriting a fork
    /// performed by a sub-command.
    pub(crate) fn run_nested<B: Backend>(
        &mut self,
        backend: &mut B,
        commands_xml: &str,
    ) -> Result<String> {
        let mut nested = Session::new(self.config.clone(), BufferSink::new());
        nested.phase = self.phase.clone();
        nested.forked = self.forked;
        nested.serve(std::io::Cursor::new(commands_xml.as_bytes()), backend)?;
        self.forked = nested.forked;
        let output = nested.sink.as_str().into_owned();
        Ok(output)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing() {
        assert_eq!(Role::parse("Admin"), Role::Admin);
        assert_eq!(Role::parse("observer"), Role::Observer);
        assert_eq!(Role::parse("something-new"), Role::User);
    }

    #[test]
    fn fresh_session_is_at_baseline_and_unauthenticated() {
        let session = Session::new(EngineConfig::default(), BufferSink::new());
        assert!(session.at_baseline());
        assert!(!session.authenticated());
        assert!(session.user().is_none());
    }
}

use serde::Deserialize;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use thorp_core::engine::clamp_deck_count;
use thorp_page::PageEvent;
use tracing::{Level, event};

use crate::background::{Background, now_ms};
use crate::presentation::PresentationSink;
use crate::protocol::{Message, Reply};
use crate::session::Session;
use crate::store::{PersistenceStore, StoreError, keys, reset_entries};

/// One line of watch input: either a page event or a protocol message.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Inbound {
    Page(PageEvent),
    Message(Message),
}

impl Inbound {
    /// Parse a line; blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, serde_json::Error> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(line).map(Some)
    }
}

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("invalid input: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read input: {0}")]
    Input(#[source] io::Error),
    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchSummary {
    pub lines: usize,
    pub skipped: usize,
    pub refreshes: usize,
    pub store_failures: usize,
}

/// Drives a page session, the background dispatcher and an overlay sink
/// from a single stream of inbound lines.
///
/// Store writes are best effort: a failed write is logged and counted, and
/// counting carries on with the in-memory state.
pub struct Watch<S, P> {
    background: Background<S>,
    sink: P,
    session: Option<Session>,
    deck_count: i64,
    store_failures: usize,
}

impl<S: PersistenceStore, P: PresentationSink> Watch<S, P> {
    pub fn new(store: S, sink: P, deck_count: i64) -> Self {
        Self {
            background: Background::new(store),
            sink,
            session: None,
            deck_count: i64::from(clamp_deck_count(deck_count)),
            store_failures: 0,
        }
    }

    pub fn background(&self) -> &Background<S> {
        &self.background
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn store_failures(&self) -> usize {
        self.store_failures
    }

    pub fn into_parts(self) -> (S, P) {
        (self.background.into_store(), self.sink)
    }

    pub fn handle_line(&mut self, line: &str, now_ms: u64) -> Result<Option<Reply>, WatchError> {
        match Inbound::parse(line)? {
            Some(inbound) => self.handle(inbound, now_ms),
            None => Ok(None),
        }
    }

    pub fn handle(&mut self, inbound: Inbound, now_ms: u64) -> Result<Option<Reply>, WatchError> {
        match inbound {
            Inbound::Page(PageEvent::Load(page)) => {
                self.background.on_navigation();
                let (session, outbound) = Session::start(&page, self.deck_count);
                self.session = Some(session);
                self.dispatch(&outbound, now_ms);
                self.present()?;
                Ok(None)
            }
            Inbound::Page(page_event) => {
                let deck_count = self.deck_count;
                let outbound = self
                    .session
                    .get_or_insert_with(|| Session::new(deck_count))
                    .on_page_event(&page_event);
                self.dispatch(&outbound, now_ms);
                if !outbound.is_empty() {
                    self.present()?;
                }
                Ok(None)
            }
            Inbound::Message(message) => self.handle_message(message, now_ms),
        }
    }

    fn handle_message(
        &mut self,
        message: Message,
        now_ms: u64,
    ) -> Result<Option<Reply>, WatchError> {
        match &message {
            Message::GameDetected { .. } | Message::CountUpdate(_) => {
                let written = self.background.handle(&message, now_ms);
                self.persist(written);
                return Ok(None);
            }
            Message::ResetCount => {
                let written = self.background.store_mut().set_many(reset_entries());
                self.persist(written);
            }
            Message::SetDeckCount { count } => {
                let decks = clamp_deck_count(*count);
                self.deck_count = i64::from(decks);
                let written = self
                    .background
                    .store_mut()
                    .set(keys::DECK_COUNT, Value::from(decks));
                self.persist(written);
            }
            Message::GetStatus => {}
        }

        let Some(session) = self.session.as_mut() else {
            event!(
                target: "thorp::session",
                Level::DEBUG,
                message = message.kind(),
                "no page session; command not delivered"
            );
            return Ok(None);
        };
        let handled = session.handle(&message);
        self.dispatch(&handled.outbound, now_ms);
        if !handled.outbound.is_empty() {
            self.present()?;
        }
        Ok(handled.reply)
    }

    /// Periodic redraw of the current snapshot.
    pub fn tick(&mut self) -> Result<(), WatchError> {
        if let Some(session) = &self.session {
            self.sink
                .refresh(&session.snapshot())
                .map_err(WatchError::Output)?;
        }
        Ok(())
    }

    /// Consume `input` until it ends, refreshing the overlay every `refresh`
    /// whether or not lines keep arriving. Replies are written to `replies`
    /// as JSON lines. Malformed lines are logged and skipped.
    pub fn run<R, W>(
        &mut self,
        input: R,
        mut replies: W,
        refresh: Duration,
    ) -> Result<WatchSummary, WatchError>
    where
        R: BufRead + Send + 'static,
        W: Write,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for line in input.lines() {
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let mut summary = WatchSummary::default();
        let mut next_tick = Instant::now() + refresh;
        loop {
            let now = Instant::now();
            if now >= next_tick {
                summary.refreshes += 1;
                self.tick()?;
                next_tick = now + refresh;
                continue;
            }
            match rx.recv_timeout(next_tick - now) {
                Ok(Ok(line)) => {
                    summary.lines += 1;
                    match self.handle_line(&line, now_ms()) {
                        Ok(Some(reply)) => {
                            let encoded = serde_json::to_string(&reply)?;
                            writeln!(replies, "{encoded}").map_err(WatchError::Output)?;
                            replies.flush().map_err(WatchError::Output)?;
                        }
                        Ok(None) => {}
                        Err(WatchError::Parse(err)) => {
                            summary.skipped += 1;
                            event!(
                                target: "thorp::session",
                                Level::WARN,
                                line = summary.lines,
                                error = %err,
                                "skipping malformed input"
                            );
                        }
                        Err(err) => return Err(err),
                    }
                }
                Ok(Err(err)) => return Err(WatchError::Input(err)),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        summary.store_failures = self.store_failures;

        event!(
            target: "thorp::session",
            Level::INFO,
            lines = summary.lines,
            skipped = summary.skipped,
            refreshes = summary.refreshes,
            store_failures = summary.store_failures,
            "watch finished"
        );
        Ok(summary)
    }

    fn dispatch(&mut self, outbound: &[Message], now_ms: u64) {
        for message in outbound {
            let written = self.background.handle(message, now_ms);
            self.persist(written);
        }
    }

    fn persist(&mut self, written: Result<(), StoreError>) {
        if let Err(err) = written {
            self.store_failures += 1;
            event!(
                target: "thorp::store",
                Level::WARN,
                error = %err,
                failures = self.store_failures,
                "store write failed; count kept in memory"
            );
        }
    }

    fn present(&mut self) -> Result<(), WatchError> {
        if let Some(session) = &self.session {
            self.sink
                .present(&session.snapshot())
                .map_err(WatchError::Output)?;
        }
        Ok(())
    }
}

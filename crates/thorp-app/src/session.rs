use thorp_core::{CountingEngine, CountingState};
use thorp_page::{Detection, Detector, GameKind, PageEvent, PageLoad};
use tracing::{Level, event};

use crate::protocol::{Message, Reply, StatusReply};

/// Result of handing a popup command to a session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Handled {
    pub reply: Option<Reply>,
    pub outbound: Vec<Message>,
}

/// Counter for one page context.
///
/// A session owns its engine and detector outright; it is created when the
/// page loads and dropped when the next page replaces it.
#[derive(Debug)]
pub struct Session {
    engine: CountingEngine,
    detector: Detector,
}

impl Session {
    pub fn new(deck_count: i64) -> Self {
        Self {
            engine: CountingEngine::with_deck_count(deck_count),
            detector: Detector::new(),
        }
    }

    /// Open a session for a freshly loaded page.
    pub fn start(page: &PageLoad, deck_count: i64) -> (Self, Vec<Message>) {
        let mut session = Self::new(deck_count);
        event!(
            target: "thorp::session",
            Level::INFO,
            url = %page.url,
            decks = session.engine.state().deck_count,
            "session started"
        );
        let outbound = session.on_page_event(&PageEvent::Load(page.clone()));
        (session, outbound)
    }

    pub fn game(&self) -> Option<GameKind> {
        self.detector.game()
    }

    pub fn snapshot(&self) -> CountingState {
        self.engine.snapshot()
    }

    pub fn status(&self) -> StatusReply {
        StatusReply::new(self.game(), self.engine.state())
    }

    /// Feed one page event through detection and counting, in order.
    pub fn on_page_event(&mut self, page_event: &PageEvent) -> Vec<Message> {
        self.detector
            .process(page_event)
            .into_iter()
            .map(|detection| self.apply(detection))
            .collect()
    }

    pub fn apply(&mut self, detection: Detection) -> Message {
        match detection {
            Detection::GameDetected { game, url } => Message::GameDetected { game, url },
            Detection::CardObserved { token } => {
                let points = self.engine.observe_card(&token);
                let state = self.engine.snapshot();
                event!(
                    target: "thorp::session",
                    Level::DEBUG,
                    token = %token,
                    points,
                    running_count = state.running_count,
                    cards_seen = state.cards_seen,
                    true_count = state.true_count,
                    "card counted"
                );
                Message::count_update(&state)
            }
        }
    }

    /// Handle a command addressed to the page. Messages meant for the
    /// background are ignored.
    pub fn handle(&mut self, message: &Message) -> Handled {
        match message {
            Message::ResetCount => {
                self.engine.reset();
                self.detector.clear_marks();
                event!(target: "thorp::session", Level::INFO, "count reset");
                Handled {
                    reply: Some(Reply::ack()),
                    outbound: vec![Message::count_update(self.engine.state())],
                }
            }
            Message::SetDeckCount { count } => {
                self.engine.set_deck_count(*count);
                event!(
                    target: "thorp::session",
                    Level::INFO,
                    requested = *count,
                    decks = self.engine.state().deck_count,
                    "deck count changed"
                );
                Handled {
                    reply: Some(Reply::ack()),
                    outbound: vec![Message::count_update(self.engine.state())],
                }
            }
            Message::GetStatus => Handled {
                reply: Some(Reply::Status(self.status())),
                outbound: Vec::new(),
            },
            Message::GameDetected { .. } | Message::CountUpdate(_) => Handled::default(),
        }
    }
}

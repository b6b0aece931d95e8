use serde::{Deserialize, Serialize};
use thorp_core::{CountingState, StrategyAdjustments};
use thorp_page::GameKind;

/// Messages exchanged between the page session, the background dispatcher
/// and the popup. The JSON form uses a `type` tag and camelCase fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    GameDetected { game: GameKind, url: String },
    CountUpdate(CountUpdate),
    ResetCount,
    SetDeckCount { count: i64 },
    GetStatus,
}

impl Message {
    pub const fn kind(&self) -> &'static str {
        match self {
            Message::GameDetected { .. } => "GAME_DETECTED",
            Message::CountUpdate(_) => "COUNT_UPDATE",
            Message::ResetCount => "RESET_COUNT",
            Message::SetDeckCount { .. } => "SET_DECK_COUNT",
            Message::GetStatus => "GET_STATUS",
        }
    }

    pub fn count_update(state: &CountingState) -> Self {
        Message::CountUpdate(CountUpdate::from(state))
    }
}

/// Count fields pushed after every state change. The deck count is not part
/// of the update; it is owned by whoever configured it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountUpdate {
    pub running_count: i32,
    pub true_count: f64,
    pub high_low_index: f64,
    pub player_advantage: f64,
    pub bet_recommendation: u8,
    pub cards_seen: u32,
    pub strategy_adjustments: StrategyAdjustments,
}

impl From<&CountingState> for CountUpdate {
    fn from(state: &CountingState) -> Self {
        Self {
            running_count: state.running_count,
            true_count: state.true_count,
            high_low_index: state.high_low_index,
            player_advantage: state.player_advantage,
            bet_recommendation: state.bet_recommendation,
            cards_seen: state.cards_seen,
            strategy_adjustments: state.strategy_adjustments,
        }
    }
}

/// Answer to `GET_STATUS`: the live snapshot of one page session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReply {
    pub game: Option<GameKind>,
    pub running_count: i32,
    pub true_count: f64,
    pub high_low_index: f64,
    pub player_advantage: f64,
    pub bet_recommendation: u8,
    pub cards_seen: u32,
    pub deck_count: u8,
    pub strategy_adjustments: StrategyAdjustments,
}

impl StatusReply {
    pub fn new(game: Option<GameKind>, state: &CountingState) -> Self {
        Self {
            game,
            running_count: state.running_count,
            true_count: state.true_count,
            high_low_index: state.high_low_index,
            player_advantage: state.player_advantage,
            bet_recommendation: state.bet_recommendation,
            cards_seen: state.cards_seen,
            deck_count: state.deck_count,
            strategy_adjustments: state.strategy_adjustments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Status(StatusReply),
    Ack { success: bool },
}

impl Reply {
    pub const fn ack() -> Self {
        Reply::Ack { success: true }
    }
}

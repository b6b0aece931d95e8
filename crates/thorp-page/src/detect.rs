use crate::page::{PageEvent, PageLoad, PageNode};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{Level, event};

/// Keyword lists scanned in order; the first game to reach its threshold wins.
const GAME_PATTERNS: [(GameKind, &[&str]); 4] = [
    (
        GameKind::Blackjack,
        &[
            "blackjack",
            "21",
            "bj",
            "dealer",
            "hit",
            "stand",
            "double down",
            "split",
        ],
    ),
    (
        GameKind::Poker,
        &["poker", "texas hold", "holdem", "flop", "turn", "river"],
    ),
    (GameKind::Baccarat, &["baccarat", "punto", "banco"]),
    (
        GameKind::CardGame,
        &["cards", "playing cards", "deck", "hand"],
    ),
];

const KEYWORD_THRESHOLD: usize = 3;
const BLACKJACK_KEYWORD_THRESHOLD: usize = 2;
const VISUAL_CARD_THRESHOLD: usize = 2;

const CARD_KEYWORDS: [&str; 10] = [
    "card", "ace", "king", "queen", "jack", "spade", "heart", "diamond", "club", "ten",
];

static RANK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+|ace|king|queen|jack|ten|a|k|q|j)\b").expect("rank pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    #[serde(rename = "blackjack")]
    Blackjack,
    #[serde(rename = "poker")]
    Poker,
    #[serde(rename = "baccarat")]
    Baccarat,
    #[serde(rename = "card game")]
    CardGame,
}

impl GameKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            GameKind::Blackjack => "blackjack",
            GameKind::Poker => "poker",
            GameKind::Baccarat => "baccarat",
            GameKind::CardGame => "card game",
        }
    }

    /// Sentence-case label, e.g. `Card game`.
    pub const fn label(self) -> &'static str {
        match self {
            GameKind::Blackjack => "Blackjack",
            GameKind::Poker => "Poker",
            GameKind::Baccarat => "Baccarat",
            GameKind::CardGame => "Card game",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown game `{0}`")]
pub struct UnknownGame(pub String);

impl FromStr for GameKind {
    type Err = UnknownGame;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "blackjack" => Ok(GameKind::Blackjack),
            "poker" => Ok(GameKind::Poker),
            "baccarat" => Ok(GameKind::Baccarat),
            "card game" => Ok(GameKind::CardGame),
            _ => Err(UnknownGame(value.to_string())),
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "detection", rename_all = "snake_case")]
pub enum Detection {
    GameDetected { game: GameKind, url: String },
    CardObserved { token: String },
}

/// Identify the game on a freshly loaded page.
///
/// Keyword hits across body, title and URL are tried first; a page with
/// enough card-like elements is reported as a generic card game.
pub fn detect_game(page: &PageLoad) -> Option<GameKind> {
    let body = page.body.to_lowercase();
    let title = page.title.to_lowercase();
    let url = page.url.to_lowercase();

    for (game, keywords) in GAME_PATTERNS {
        let hits = keywords
            .iter()
            .filter(|keyword| {
                body.contains(*keyword) || title.contains(*keyword) || url.contains(*keyword)
            })
            .count();
        if hits >= KEYWORD_THRESHOLD
            || (game == GameKind::Blackjack && hits >= BLACKJACK_KEYWORD_THRESHOLD)
        {
            return Some(game);
        }
    }

    if count_card_elements(&page.nodes) >= VISUAL_CARD_THRESHOLD {
        return Some(GameKind::CardGame);
    }
    None
}

/// Number of nodes that look like rendered playing cards.
pub fn count_card_elements(nodes: &[PageNode]) -> usize {
    nodes
        .iter()
        .filter(|node| node.is_element() && looks_like_card(node))
        .count()
}

fn looks_like_card(node: &PageNode) -> bool {
    if node.class_lower().contains("card") {
        return true;
    }
    if node
        .id
        .as_deref()
        .is_some_and(|id| id.to_lowercase().contains("card"))
    {
        return true;
    }
    if node.attribute("data-card").is_some() {
        return true;
    }
    node.attribute("role") == Some("img")
        && node
            .attribute("alt")
            .is_some_and(|alt| alt.to_lowercase().contains("card"))
}

fn has_card_keyword(node: &PageNode) -> bool {
    let text = node.text.to_lowercase();
    let class = node.class_lower();
    CARD_KEYWORDS
        .iter()
        .any(|keyword| text.contains(keyword) || class.contains(keyword))
}

/// First rank-looking word in a node's text.
pub fn extract_rank_token(text: &str) -> Option<&str> {
    RANK_TOKEN
        .captures(text.trim())
        .and_then(|captures| captures.get(1))
        .map(|token| token.as_str())
}

/// Stateful detector for one page context.
///
/// Counted elements are remembered by key so a node re-inserted by a later
/// mutation batch is never reported twice; [`Detector::clear_marks`] forgets
/// them when the count is reset.
#[derive(Debug, Default)]
pub struct Detector {
    game: Option<GameKind>,
    url: String,
    counted: HashSet<String>,
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn game(&self) -> Option<GameKind> {
        self.game
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn counted_len(&self) -> usize {
        self.counted.len()
    }

    pub fn process(&mut self, page_event: &PageEvent) -> Vec<Detection> {
        match page_event {
            PageEvent::Load(page) => self.load(page),
            PageEvent::Mutations { added } => self.mutations(added),
        }
    }

    /// Start over for a newly loaded page.
    pub fn load(&mut self, page: &PageLoad) -> Vec<Detection> {
        self.game = None;
        self.counted.clear();
        self.url = page.url.clone();

        match detect_game(page) {
            Some(game) => vec![self.identify(game)],
            None => Vec::new(),
        }
    }

    pub fn mutations(&mut self, added: &[PageNode]) -> Vec<Detection> {
        let mut detections = Vec::new();
        for node in added.iter().filter(|node| node.is_element()) {
            if self.game.is_none() && has_card_keyword(node) {
                detections.push(self.identify(GameKind::CardGame));
            }
            if self.game.is_some() {
                if let Some(token) = self.extract(node) {
                    detections.push(Detection::CardObserved { token });
                }
            }
        }
        detections
    }

    pub fn clear_marks(&mut self) {
        self.counted.clear();
    }

    fn identify(&mut self, game: GameKind) -> Detection {
        self.game = Some(game);
        event!(
            target: "thorp::detect",
            Level::INFO,
            game = %game,
            url = %self.url,
            "game detected"
        );
        Detection::GameDetected {
            game,
            url: self.url.clone(),
        }
    }

    fn extract(&mut self, node: &PageNode) -> Option<String> {
        if node.is_marked_counted() {
            return None;
        }
        if node.key.as_ref().is_some_and(|key| self.counted.contains(key)) {
            return None;
        }
        let token = extract_rank_token(&node.text)?.to_string();
        if let Some(key) = node.key.as_ref() {
            self.counted.insert(key.clone());
        }
        event!(
            target: "thorp::detect",
            Level::DEBUG,
            token = %token,
            key = ?node.key,
            "card observed"
        );
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::COUNTED_MARKER;

    fn page(url: &str, title: &str, body: &str) -> PageLoad {
        PageLoad {
            url: url.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            nodes: Vec::new(),
        }
    }

    #[test]
    fn blackjack_needs_two_keywords() {
        let load = page("https://casino.test/table", "Live Blackjack", "Dealer stands");
        assert_eq!(detect_game(&load), Some(GameKind::Blackjack));
    }

    #[test]
    fn poker_needs_three_keywords() {
        let two = page("https://x.test", "Poker night", "see the flop");
        assert_eq!(detect_game(&two), None);
        let three = page("https://x.test", "Poker night", "see the flop and the river");
        assert_eq!(detect_game(&three), Some(GameKind::Poker));
    }

    #[test]
    fn baccarat_matches_before_generic_cards() {
        let load = page("https://x.test/baccarat", "", "punto banco with cards in hand");
        assert_eq!(detect_game(&load), Some(GameKind::Baccarat));
    }

    #[test]
    fn visual_fallback_counts_card_elements() {
        let mut load = page("https://x.test", "Welcome", "nothing to see");
        load.nodes = vec![
            PageNode::element("").with_class("playing-card"),
            PageNode {
                id: Some("dealerCard1".into()),
                ..PageNode::default()
            },
        ];
        assert_eq!(detect_game(&load), Some(GameKind::CardGame));

        load.nodes.truncate(1);
        assert_eq!(detect_game(&load), None);
    }

    #[test]
    fn image_with_card_alt_text_counts_as_card() {
        let node = PageNode::element("")
            .with_attribute("role", "img")
            .with_attribute("alt", "Card: seven of clubs");
        assert!(looks_like_card(&node));
        let plain = PageNode::element("").with_attribute("alt", "card");
        assert!(!looks_like_card(&plain));
    }

    #[test]
    fn extract_rank_token_prefers_first_word() {
        assert_eq!(extract_rank_token("Ace of spades"), Some("Ace"));
        assert_eq!(extract_rank_token("10♥"), Some("10"));
        assert_eq!(extract_rank_token("  K  "), Some("K"));
        assert_eq!(extract_rank_token("Queen"), Some("Queen"));
        assert_eq!(extract_rank_token("shuffle"), None);
    }

    #[test]
    fn mutations_before_detection_identify_card_game() {
        let mut detector = Detector::new();
        assert!(detector.load(&page("https://x.test", "", "")).is_empty());
        let detections = detector.mutations(&[PageNode::element("King of hearts").with_key("c1")]);
        assert_eq!(
            detections,
            vec![
                Detection::GameDetected {
                    game: GameKind::CardGame,
                    url: "https://x.test".into()
                },
                Detection::CardObserved {
                    token: "King".into()
                },
            ]
        );
    }

    #[test]
    fn nodes_are_ignored_until_a_game_is_known() {
        let mut detector = Detector::new();
        assert!(detector.mutations(&[PageNode::element("7")]).is_empty());
        assert_eq!(detector.game(), None);
    }

    #[test]
    fn keyed_nodes_are_counted_once() {
        let mut detector = Detector::new();
        detector.load(&page("https://bj.test", "Blackjack", "dealer"));
        let node = PageNode::element("5").with_key("seat-1-card-1");
        assert_eq!(detector.mutations(&[node.clone()]).len(), 1);
        assert!(detector.mutations(&[node.clone()]).is_empty());
        assert_eq!(detector.counted_len(), 1);

        detector.clear_marks();
        assert_eq!(detector.mutations(&[node]).len(), 1);
    }

    #[test]
    fn marked_and_text_nodes_are_skipped() {
        let mut detector = Detector::new();
        detector.load(&page("https://bj.test", "Blackjack", "dealer"));
        let marked = PageNode::element("9").with_attribute(COUNTED_MARKER, "true");
        let text = PageNode {
            node_type: crate::page::NodeType::Text,
            text: "4".into(),
            ..PageNode::default()
        };
        let unkeyed = PageNode::element("4");
        let detections = detector.mutations(&[marked, text, unkeyed.clone(), unkeyed]);
        assert_eq!(
            detections,
            vec![
                Detection::CardObserved { token: "4".into() },
                Detection::CardObserved { token: "4".into() },
            ]
        );
    }

    #[test]
    fn reload_forgets_game_and_marks() {
        let mut detector = Detector::new();
        detector.load(&page("https://bj.test", "Blackjack", "dealer"));
        detector.mutations(&[PageNode::element("A").with_key("k")]);
        detector.load(&page("https://news.test", "News", ""));
        assert_eq!(detector.game(), None);
        assert_eq!(detector.counted_len(), 0);
        assert_eq!(detector.url(), "https://news.test");
    }

    #[test]
    fn game_kind_labels() {
        assert_eq!(GameKind::CardGame.label(), "Card game");
        assert_eq!("Card Game".parse(), Ok(GameKind::CardGame));
        assert_eq!(
            "roulette".parse::<GameKind>(),
            Err(UnknownGame("roulette".into()))
        );
        assert_eq!(
            serde_json::to_string(&GameKind::CardGame).unwrap(),
            "\"card game\""
        );
    }
}

use std::io::Cursor;

use thorp_page::{Detection, DetectionStream, GameKind};

const TABLE_FEED: &str = r#"
{"kind":"load","url":"https://casino.test/live-blackjack","title":"Live Blackjack","body":"Hit or Stand? Dealer must draw to 16."}
{"kind":"mutations","added":[{"key":"dealer-0","className":"card","text":"K♠"},{"key":"player-0","className":"card","text":"5♦"}]}
{"kind":"mutations","added":[{"key":"dealer-0","className":"card","text":"K♠"},{"key":"player-1","className":"card","text":"5♣"},{"nodeType":"text","text":"2"}]}
{"kind":"mutations","added":[{"key":"player-2","className":"card","text":"2 of hearts"},{"key":"chip","className":"chip","text":"Bet placed"}]}
"#;

fn tokens(detections: &[Detection]) -> Vec<&str> {
    detections
        .iter()
        .filter_map(|detection| match detection {
            Detection::CardObserved { token } => Some(token.as_str()),
            Detection::GameDetected { .. } => None,
        })
        .collect()
}

#[test]
fn table_feed_reports_each_card_once() {
    let detections: Vec<Detection> = DetectionStream::new(Cursor::new(TABLE_FEED))
        .collect::<Result<_, _>>()
        .expect("feed is well formed");

    assert_eq!(
        detections.first(),
        Some(&Detection::GameDetected {
            game: GameKind::Blackjack,
            url: "https://casino.test/live-blackjack".into(),
        })
    );
    // The chip text has no rank word, the re-inserted dealer card is skipped.
    assert_eq!(tokens(&detections), vec!["K", "5", "5", "2"]);
}

#[test]
fn stream_is_lazy() {
    let mut stream = DetectionStream::new(Cursor::new(TABLE_FEED));
    let first = stream.next().expect("one item").expect("ok");
    assert!(matches!(first, Detection::GameDetected { .. }));
    // Only the blank line and the load line have been consumed so far.
    assert_eq!(stream.lines_read(), 2);
}

#[test]
fn reset_between_batches_allows_recount() {
    let feed = concat!(
        r#"{"kind":"load","title":"Blackjack","body":"dealer"}"#,
        "\n",
        r#"{"kind":"mutations","added":[{"key":"c1","text":"Q"}]}"#,
        "\n",
        r#"{"kind":"mutations","added":[{"key":"c1","text":"Q"}]}"#,
        "\n",
    );
    let mut stream = DetectionStream::new(Cursor::new(feed));
    assert!(matches!(
        stream.next(),
        Some(Ok(Detection::GameDetected { .. }))
    ));
    assert!(matches!(
        stream.next(),
        Some(Ok(Detection::CardObserved { .. }))
    ));
    stream.detector_mut().clear_marks();
    assert!(matches!(
        stream.next(),
        Some(Ok(Detection::CardObserved { .. }))
    ));
    assert!(stream.next().is_none());
}

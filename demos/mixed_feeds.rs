//! Mixed Feeds Example
//!
//! A historical replay merged with a realtime ticker running on its own
//! thread. Ctrl-C is not wired here; the ticker is bounded so the run ends
//! on its own.
//!
//! Run with: cargo run -p demos --bin mixed_feeds

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use contracts::EventRecord;
use dispatcher::Dispatcher;
use feeds::{EventRecorder, HistoricalFeed, RealtimeConfig, RealtimeFeed};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    observability::init()?;

    let open: DateTime<Utc> = "2024-01-02T09:30:00Z".parse()?;
    let bars = HistoricalFeed::new(
        "bars",
        (0..5).map(|i| EventRecord {
            at: open + chrono::Duration::minutes(i),
            payload: serde_json::json!({ "bar": i }),
        }),
    );
    let ticker = RealtimeFeed::new(
        "ticker",
        RealtimeConfig {
            interval: Duration::from_millis(2),
            count: Some(10),
            channel_capacity: 4,
            payload: serde_json::json!({ "source": "live" }),
            ..RealtimeConfig::default()
        },
    );

    let recorder = EventRecorder::new();
    bars.listen(recorder.callback());
    ticker.listen(recorder.callback());
    let ticker = Arc::new(ticker);

    let mut dispatcher = Dispatcher::new();
    dispatcher.add_subject(Arc::new(bars));
    dispatcher.add_subject(ticker.clone());

    let idle = Arc::new(AtomicU64::new(0));
    let idle_count = Arc::clone(&idle);
    dispatcher.idle_signal().subscribe(move || {
        idle_count.fetch_add(1, Ordering::Relaxed);
    });

    dispatcher.run()?;

    for event in recorder.events() {
        let when = event
            .timestamp
            .map_or_else(|| "realtime".to_string(), |ts| ts.format("%H:%M").to_string());
        println!("{when:>8}  {}#{}", event.source, event.sequence);
    }

    let feed = ticker.metrics().snapshot();
    println!(
        "\nticker produced {} / dispatched {}; idle rounds {}",
        feed.events_produced,
        feed.events_dispatched,
        idle.load(Ordering::Relaxed)
    );
    Ok(())
}

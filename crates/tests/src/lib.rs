//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 场景 → feeds → dispatcher 全链路
//! - 历史与实时 subject 混合调度
//! - 外部停止与错误清理

#[cfg(test)]
mod contract_tests {
    use contracts::DispatchPriority;

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert!(DispatchPriority::Level(u32::MAX) < DispatchPriority::Last);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{DispatchPriority, EventRecord, Subject, SubjectRef, Timestamp};
    use dispatcher::{Dispatcher, DispatcherConfig, LifecycleState};
    use feeds::{build_subjects, EventRecorder, HistoricalFeed, RealtimeConfig, RealtimeFeed};
    use rand::Rng;

    fn base() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).unwrap()
    }

    fn records(offsets_secs: &[i64]) -> Vec<EventRecord> {
        offsets_secs
            .iter()
            .map(|&s| EventRecord {
                at: base() + Duration::seconds(s),
                payload: serde_json::json!({ "offset": s }),
            })
            .collect()
    }

    fn labels(recorder: &EventRecorder) -> Vec<String> {
        recorder
            .events()
            .iter()
            .map(|e| format!("{}#{}", e.source, e.sequence))
            .collect()
    }

    /// End-to-end: scenario text → ConfigLoader → feeds → Dispatcher::run
    #[test]
    fn test_e2e_scenario_run_merges_by_time() {
        let content = r#"
[[subjects]]
id = "trades"
kind = "historical"
[[subjects.events]]
at = "2024-01-02T09:30:00Z"
[[subjects.events]]
at = "2024-01-02T09:30:02Z"

[[subjects]]
id = "quotes"
kind = "historical"
priority = 1
[[subjects.events]]
at = "2024-01-02T09:30:00Z"
[[subjects.events]]
at = "2024-01-02T09:30:01Z"
[[subjects.events]]
at = "2024-01-02T09:30:02Z"
"#;
        let scenario = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        let recorder = EventRecorder::new();

        let mut dispatcher = Dispatcher::new();
        for subject in build_subjects(&scenario, Some(recorder.callback())).unwrap() {
            assert!(dispatcher.add_subject(subject));
        }
        dispatcher.run().unwrap();

        assert_eq!(
            labels(&recorder),
            ["quotes#1", "trades#1", "quotes#2", "quotes#3", "trades#2"]
        );
        assert!(dispatcher.ended());
        assert_eq!(
            dispatcher.current_datetime(),
            Some(base() + Duration::seconds(2))
        );

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.events, 5);
        assert_eq!(metrics.rounds, 4);
        assert_eq!(metrics.max_events_per_round, 2);
    }

    /// Merged stream is globally non-decreasing in time for random inputs
    #[test]
    fn test_e2e_random_feeds_stay_time_ordered() {
        let mut rng = rand::rng();
        let recorder = EventRecorder::new();
        let mut dispatcher = Dispatcher::new();
        let mut expected = 0;

        for i in 0..5 {
            let count = rng.random_range(1..20);
            let offsets: Vec<i64> = (0..count).map(|_| rng.random_range(0..50)).collect();
            expected += offsets.len();

            let priority = if rng.random_bool(0.5) {
                DispatchPriority::Level(rng.random_range(0..3))
            } else {
                DispatchPriority::Last
            };
            let feed = HistoricalFeed::new(format!("feed{i}"), records(&offsets))
                .with_priority(priority);
            feed.listen(recorder.callback());
            dispatcher.add_subject(Arc::new(feed));
        }

        dispatcher.run().unwrap();

        let events = recorder.events();
        assert_eq!(events.len(), expected);
        assert!(events
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
    }

    /// Historical + realtime: realtime events interleave, historical order is kept
    #[test]
    fn test_e2e_realtime_interleaves_with_history() {
        let recorder = EventRecorder::new();

        let bars = HistoricalFeed::new("bars", records(&[0, 1, 2]));
        bars.listen(recorder.callback());

        let ticker = RealtimeFeed::new(
            "ticker",
            RealtimeConfig {
                interval: std::time::Duration::ZERO,
                count: Some(4),
                channel_capacity: 2,
                ..RealtimeConfig::default()
            },
        );
        ticker.listen(recorder.callback());
        let ticker = Arc::new(ticker);

        let mut dispatcher = Dispatcher::new();
        dispatcher.add_subject(Arc::new(bars));
        dispatcher.add_subject(ticker.clone());

        let idle = Arc::new(AtomicUsize::new(0));
        let idle_count = idle.clone();
        dispatcher
            .idle_signal()
            .subscribe(move || {
                idle_count.fetch_add(1, Ordering::Relaxed);
            });

        dispatcher.run().unwrap();

        assert_eq!(recorder.count_from("ticker"), 4);
        assert_eq!(recorder.count_from("bars"), 3);

        let bar_offsets: Vec<_> = recorder
            .events()
            .iter()
            .filter(|e| e.source == "bars")
            .map(|e| e.payload["offset"].as_i64().unwrap())
            .collect();
        assert_eq!(bar_offsets, [0, 1, 2]);

        assert!(ticker.is_exhausted());
        assert!(!ticker.is_running());
        assert_eq!(dispatcher.state(), LifecycleState::Ended);
        assert_eq!(
            dispatcher.metrics().idle_rounds,
            idle.load(Ordering::Relaxed) as u64
        );
    }

    /// A paced ticker does not spin the dispatcher between events
    #[test]
    fn test_e2e_paced_realtime_keeps_idle_rounds_bounded() {
        let ticker = RealtimeFeed::new(
            "ticker",
            RealtimeConfig {
                interval: std::time::Duration::from_millis(50),
                count: Some(4),
                ..RealtimeConfig::default()
            },
        );
        let recorder = EventRecorder::new();
        ticker.listen(recorder.callback());

        let mut dispatcher = Dispatcher::new();
        dispatcher.add_subject(Arc::new(ticker));
        dispatcher.run().unwrap();

        let metrics = dispatcher.metrics();
        assert_eq!(recorder.count_from("ticker"), 4);
        assert_eq!(metrics.events, 4);
        assert!(
            metrics.idle_rounds < 20,
            "idle rounds: {}",
            metrics.idle_rounds
        );
    }

    /// External stop from another thread ends an unbounded realtime run
    #[test]
    fn test_e2e_stop_handle_ends_unbounded_run() {
        let ticker = RealtimeFeed::new(
            "ticker",
            RealtimeConfig {
                interval: std::time::Duration::from_millis(1),
                count: None,
                channel_capacity: 4,
                ..RealtimeConfig::default()
            },
        );
        let recorder = EventRecorder::new();
        ticker.listen(recorder.callback());
        let ticker = Arc::new(ticker);

        let mut dispatcher = Dispatcher::new();
        dispatcher.add_subject(ticker.clone());

        let stop = dispatcher.stop_handle();
        let watcher_recorder = recorder.clone();
        let watcher = std::thread::spawn(move || {
            while watcher_recorder.len() < 3 {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
            stop.stop();
        });

        dispatcher.run().unwrap();
        watcher.join().unwrap();

        assert!(recorder.len() >= 3);
        assert!(dispatcher.ended());
        assert!(!ticker.is_running());
        // Pure realtime rounds never define the clock.
        assert_eq!(dispatcher.current_datetime(), None);
    }

    /// Step mode over feeds: clock advances one distinct timestamp per step
    #[test]
    fn test_e2e_step_mode_advances_clock() {
        let a = HistoricalFeed::new("a", records(&[0, 10]));
        let b = HistoricalFeed::new("b", records(&[5, 10]));

        let mut dispatcher = Dispatcher::with_config(DispatcherConfig { max_rounds: None });
        dispatcher.add_subject(Arc::new(a));
        dispatcher.add_subject(Arc::new(b));

        let mut clock = Vec::new();
        while dispatcher.step().unwrap() {
            clock.push(dispatcher.current_datetime().unwrap());
        }

        let offsets: Vec<_> = clock.iter().map(|ts| (*ts - base()).num_seconds()).collect();
        assert_eq!(offsets, [0, 5, 10]);
        assert!(!dispatcher.step().unwrap());
    }

    /// A failing subject still gets every subject torn down
    #[test]
    fn test_e2e_dispatch_error_tears_down_realtime_thread() {
        struct Broken;

        impl Subject for Broken {
            fn id(&self) -> &str {
                "broken"
            }
            fn is_exhausted(&self) -> bool {
                false
            }
            fn peek_timestamp(&self) -> Result<Option<Timestamp>, contracts::ContractError> {
                Ok(Some(base()))
            }
            fn dispatch(&self) -> Result<bool, contracts::ContractError> {
                Err(contracts::ContractError::subject_dispatch("broken", "feed corrupted"))
            }
            fn start(&self) -> Result<(), contracts::ContractError> {
                Ok(())
            }
            fn stop(&self) -> Result<(), contracts::ContractError> {
                Ok(())
            }
            fn join(&self) -> Result<(), contracts::ContractError> {
                Ok(())
            }
        }

        let ticker = Arc::new(RealtimeFeed::new(
            "ticker",
            RealtimeConfig {
                count: None,
                ..RealtimeConfig::default()
            },
        ));

        let mut dispatcher = Dispatcher::new();
        dispatcher.add_subject(ticker.clone());
        let broken: SubjectRef = Arc::new(Broken);
        dispatcher.add_subject(broken);

        let err = dispatcher.run().unwrap_err();
        assert_eq!(err.subject(), Some("broken"));
        assert!(dispatcher.ended());
        assert!(!ticker.is_running());
    }
}

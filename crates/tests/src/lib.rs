//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 配置 → 分发器 → sink 的端到端流程
//! - 多生产者顺序与背压场景
//! - worker 失败上报

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatchSnapshot, Level, LogRecord};

    #[test]
    fn test_record_serializes_without_empty_formatted() {
        let record = LogRecord::new("app", Level::Warn, "disk low");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["level"], "warn");
        assert!(json.get("formatted").is_none());
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(DispatchSnapshot::default()).unwrap();
        assert_eq!(json["submitted"], 0);
        assert_eq!(json["queue_capacity"], 0);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{ContractError, Level, LogRecord, Sink};
    use dispatcher::{
        create_dispatcher, DispatcherBuilder, DispatcherError, FailureKind, JsonFormatter,
        LifecycleState, MemorySink, PlainFormatter,
    };
    use parking_lot::Mutex;
    use tempfile::tempdir;

    /// Sink that parks the worker on its first record until released
    struct PausingSink {
        release: Option<mpsc::Receiver<()>>,
        paused: mpsc::Sender<()>,
    }

    impl Sink for PausingSink {
        fn name(&self) -> &str {
            "pause"
        }

        fn log(&mut self, _record: &LogRecord) -> Result<(), ContractError> {
            if let Some(release) = self.release.take() {
                let _ = self.paused.send(());
                let _ = release.recv();
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    /// Sink that rejects any record at `Error` or above
    struct StrictSink {
        accepted: Arc<Mutex<Vec<String>>>,
    }

    impl Sink for StrictSink {
        fn name(&self) -> &str {
            "strict"
        }

        fn log(&mut self, record: &LogRecord) -> Result<(), ContractError> {
            if record.level >= Level::Error {
                return Err(ContractError::sink_write("strict", "refusing error records"));
            }
            self.accepted.lock().push(record.raw.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ContractError> {
            Ok(())
        }
    }

    /// Config file → blueprint → dispatcher → file sink
    #[test]
    fn test_e2e_config_to_file_sink() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("out").join("app.log");
        let config = format!(
            r#"
version = "v1"

[dispatcher]
queue_capacity = 4
shutdown_timeout_ms = 5000

[formatter]
kind = "json"

[[sinks]]
name = "file"
sink_type = "file"
[sinks.params]
path = "{}"
append = "false"
"#,
            log_path.display()
        );

        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();
        let dispatcher = create_dispatcher(&blueprint).unwrap();
        assert_eq!(dispatcher.capacity(), 4);

        for i in 0..50 {
            dispatcher
                .submit(&LogRecord::new("e2e", Level::Info, format!("event {i}")))
                .unwrap();
        }
        assert!(dispatcher.shutdown_timeout(Duration::from_secs(5)));
        assert_eq!(dispatcher.state(), LifecycleState::Stopped);

        let content = fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 50);
        for (i, line) in lines.iter().enumerate() {
            let value: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(value["logger"], "e2e");
            assert_eq!(value["message"], format!("event {i}"));
        }
    }

    /// Each producer's records keep their relative order
    #[test]
    fn test_e2e_multi_producer_order() {
        let memory = MemorySink::new("mem");
        let dispatcher = Arc::new(
            DispatcherBuilder::new(16)
                .formatter(Arc::new(PlainFormatter::with_time_format("%s")))
                .sink(Box::new(memory.clone()))
                .build()
                .unwrap(),
        );

        let producers: Vec<_> = (0..8)
            .map(|p| {
                let dispatcher = Arc::clone(&dispatcher);
                thread::spawn(move || {
                    for seq in 0..250 {
                        let name = format!("producer-{p}");
                        dispatcher
                            .submit(&LogRecord::new(name, Level::Debug, seq.to_string()))
                            .unwrap();
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }
        dispatcher.shutdown();

        let lines = memory.lines();
        assert_eq!(lines.len(), 2000);
        for p in 0..8 {
            let tag = format!("[producer-{p}]");
            let seqs: Vec<u32> = lines
                .iter()
                .filter(|l| l.contains(&tag))
                .map(|l| l.rsplit(' ').next().unwrap().parse().unwrap())
                .collect();
            assert_eq!(seqs, (0..250).collect::<Vec<_>>(), "producer {p}");
        }

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.submitted, 2000);
        assert_eq!(metrics.processed, 2000);
        assert_eq!(metrics.in_flight(), 0);
    }

    /// A paused worker makes producers wait instead of dropping records
    #[test]
    fn test_e2e_paused_worker_applies_backpressure() {
        let (release_tx, release_rx) = mpsc::channel();
        let (paused_tx, paused_rx) = mpsc::channel();
        let memory = MemorySink::new("mem");
        let dispatcher = Arc::new(
            DispatcherBuilder::new(2)
                .sink(Box::new(PausingSink {
                    release: Some(release_rx),
                    paused: paused_tx,
                }))
                .sink(Box::new(memory.clone()))
                .build()
                .unwrap(),
        );

        dispatcher
            .submit(&LogRecord::new("bp", Level::Info, "0"))
            .unwrap();
        paused_rx.recv().unwrap();

        let producer = {
            let dispatcher = Arc::clone(&dispatcher);
            thread::spawn(move || {
                for i in 1..10 {
                    dispatcher
                        .submit(&LogRecord::new("bp", Level::Info, i.to_string()))
                        .unwrap();
                }
            })
        };

        // Two fit in the queue, the third submit must be blocked
        while dispatcher.metrics().backpressure_events == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!producer.is_finished());
        assert_eq!(dispatcher.metrics().submitted, 3);

        release_tx.send(()).unwrap();
        producer.join().unwrap();
        dispatcher.shutdown();

        let raws: Vec<String> = memory
            .lines()
            .iter()
            .map(|l| l.rsplit(' ').next().unwrap().to_string())
            .collect();
        assert_eq!(raws, (0..10).map(|i| i.to_string()).collect::<Vec<_>>());
    }

    /// Sink failures surface once on the next submit and do not stop the worker
    #[test]
    fn test_e2e_failure_surfaced_then_recovers() {
        let accepted = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = DispatcherBuilder::new(8)
            .sink(Box::new(StrictSink {
                accepted: Arc::clone(&accepted),
            }))
            .build()
            .unwrap();

        dispatcher
            .submit(&LogRecord::new("svc", Level::Info, "started"))
            .unwrap();
        dispatcher
            .submit(&LogRecord::new("svc", Level::Error, "crashed"))
            .unwrap();

        while dispatcher.metrics().processed < 2 {
            thread::sleep(Duration::from_millis(1));
        }

        let err = dispatcher
            .submit(&LogRecord::new("svc", Level::Info, "dropped by error"))
            .unwrap_err();
        assert!(err.is_worker_failure());
        match err {
            DispatcherError::WorkerFailure(failure) => {
                assert_eq!(
                    failure.kind,
                    FailureKind::Sink {
                        name: "strict".to_string()
                    }
                );
                assert!(failure.to_string().starts_with("async logger worker failure"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        dispatcher
            .submit(&LogRecord::new("svc", Level::Info, "recovered"))
            .unwrap();
        dispatcher.shutdown();

        assert_eq!(*accepted.lock(), vec!["started", "recovered"]);
        assert!(matches!(
            dispatcher.submit(&LogRecord::new("svc", Level::Info, "late")),
            Err(DispatcherError::Inactive)
        ));
    }

    /// Formatter swapped mid-stream applies to later records only
    #[test]
    fn test_e2e_formatter_swap() {
        let memory = MemorySink::new("mem");
        let dispatcher = DispatcherBuilder::new(4)
            .formatter(Arc::new(PlainFormatter::new()))
            .sink(Box::new(memory.clone()))
            .build()
            .unwrap();

        dispatcher
            .submit(&LogRecord::new("fmt", Level::Info, "before"))
            .unwrap();
        while dispatcher.metrics().processed < 1 {
            thread::sleep(Duration::from_millis(1));
        }
        dispatcher.reconfigure_formatter(Arc::new(JsonFormatter::new()));
        dispatcher
            .submit(&LogRecord::new("fmt", Level::Info, "after"))
            .unwrap();
        dispatcher.shutdown();

        let lines = memory.lines();
        assert!(lines[0].ends_with("[fmt] [info] before"));
        let json: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(json["message"], "after");
    }

    /// Dispatcher counters flow into the metrics facade without a recorder
    #[test]
    fn test_e2e_observability_snapshot() {
        let dispatcher = DispatcherBuilder::new(4).build().unwrap();
        dispatcher
            .submit(&LogRecord::new("obs", Level::Trace, "tick"))
            .unwrap();
        dispatcher.shutdown();

        let snapshot = dispatcher.metrics();
        observability::record_dispatch_snapshot(&Default::default(), &snapshot);
        assert_eq!(snapshot.processed, 1);
        assert_eq!(snapshot.queue_len, 0);
    }
}

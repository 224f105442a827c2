//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Covers:
//! - configuration snapshot round trips
//! - synthetic capture -> batching -> file persistence -> read back
//! - count batching through configured in-memory sinks

#[cfg(test)]
mod contract_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{PipelineBlueprint, SinkConfig, SinkType};

    #[test]
    fn test_default_blueprint_survives_toml() {
        let mut blueprint = PipelineBlueprint::default();
        blueprint.sinks.push(
            SinkConfig::new("disk", SinkType::File).with_param("base_path", "./output"),
        );

        let toml = ConfigLoader::to_toml(&blueprint).unwrap();
        let back = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();

        assert_eq!(back.batcher, blueprint.batcher);
        assert_eq!(back.capture, blueprint.capture);
        assert_eq!(back.sinks, blueprint.sinks);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use batcher::{number_of_batches, reassemble, MotionBatcher, RateSource};
    use capture::{CaptureSession, SyntheticSource};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        BatchStrategy, BatcherConfig, CaptureConfig, Sample, SensorKind, SinkConfig, SinkType,
        WorkoutInfo, WorkoutSession,
    };
    use dispatcher::{list_sessions, read_session, DispatcherBuilder, MemoryStore};
    use observability::BatchMetricsAggregator;

    /// Synthetic capture -> rate estimation -> time windows -> FileSink -> read back
    #[tokio::test]
    async fn test_e2e_synthetic_capture_to_file_and_back() {
        let dir = tempfile::tempdir().unwrap();

        // 64 Hz / 32 Hz keep the generated timestamps exact
        let mut capture = CaptureSession::start(&CaptureConfig::default());
        let source = Arc::new(SyntheticSource::simulated(64.0, 32.0, Duration::from_secs(5)));
        capture.add_source(Box::new(Arc::clone(&source))).unwrap();
        source.wait_finished().await;
        let mut series = capture.stop().await.unwrap();

        assert_eq!(series.accelerometer.len(), 320);
        assert_eq!(series.gyroscope.len(), 160);
        assert_eq!(series.accelerometer_rate, None);

        let batcher = MotionBatcher::new(BatcherConfig {
            strategy: BatchStrategy::TimeInterval,
            target_entries_per_batch: 96,
            ..Default::default()
        });
        let rates = batcher.estimate_rates(&mut series);
        assert_eq!(rates.accelerometer.source, RateSource::Estimated);
        assert_eq!(series.accelerometer_rate, Some(64));
        assert_eq!(series.gyroscope_rate, Some(32));

        let plan = batcher.batch(&series).unwrap();
        assert_eq!(plan.summary.interval_s, Some(1.0));
        assert_eq!(plan.batches.len(), number_of_batches(&series, 96).unwrap());
        assert_eq!(reassemble(&plan.batches), series);

        let session = WorkoutSession::from_series(WorkoutInfo::default(), series);
        let base = dir.path().to_string_lossy().to_string();
        let dispatcher = DispatcherBuilder::new(vec![
            SinkConfig::new("disk", SinkType::File).with_param("base_path", base),
            SinkConfig::new("log", SinkType::Log),
        ])
        .build()
        .unwrap();

        let record = dispatcher.persist(&session, &plan.batches).await;
        let reports = dispatcher.shutdown().await;
        assert!(reports.iter().all(|r| r.metrics.failure_count == 0));
        assert_eq!(record.number_of_batches, plan.batches.len());

        let stored = read_session(dir.path(), session.id).unwrap();
        assert!(stored.is_complete());
        let numbers: Vec<usize> = stored.batches.iter().map(|b| b.batch_number).collect();
        let expected: Vec<usize> = (1..=plan.batches.len()).collect();
        assert_eq!(numbers, expected);
        assert_eq!(stored.reassemble(), session.series);

        let listed = list_sessions(dir.path()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].session_id, session.id);
        assert_eq!(listed[0].accelerometer_entries, 320);
    }

    /// Configuration file -> count batching -> memory sinks
    #[tokio::test]
    async fn test_e2e_count_strategy_from_config() {
        let config = r#"
[batcher]
strategy = "count"
target_entries_per_batch = 30

[[sinks]]
name = "mem"
sink_type = "memory"
queue_capacity = 1
"#;
        let blueprint = ConfigLoader::load_from_str(config, ConfigFormat::Toml).unwrap();

        // 50 Hz / 25 Hz, gyroscope runs past the last accelerometer sample
        let accel = (0..50)
            .map(|i| Sample::new(i as f64 * 0.02, 0.0, 0.0, -1.0))
            .collect();
        let gyro = (0..40)
            .map(|i| Sample::new(i as f64 * 0.04, 0.5, 0.0, 0.0))
            .collect();
        let series = contracts::MotionSeries::new(accel, gyro).with_rates(50, 25);

        let batcher = MotionBatcher::new(blueprint.batcher.clone());
        let plan = batcher.batch(&series).unwrap();

        // quotas 20 + 10; the last 10 gyroscope samples have no accelerometer partner
        let sizes: Vec<(usize, usize)> = plan
            .batches
            .iter()
            .map(|b| (b.data.accelerometer.len(), b.data.gyroscope.len()))
            .collect();
        assert_eq!(sizes, vec![(20, 10), (20, 10), (10, 10)]);

        let store = MemoryStore::new();
        let dispatcher = DispatcherBuilder::new(blueprint.sinks.clone())
            .with_memory_store(store.clone())
            .build()
            .unwrap();
        let session = WorkoutSession::from_series(WorkoutInfo::default(), series);
        dispatcher.persist(&session, &plan.batches).await;
        let reports = dispatcher.shutdown().await;

        let stored = store.get(session.id).unwrap();
        assert!(stored.is_complete());
        assert_eq!(stored.session.gyroscope_entries, 30);
        let rebuilt = stored.reassemble();
        assert_eq!(rebuilt.accelerometer, session.series.accelerometer);
        assert_eq!(rebuilt.gyroscope[..], session.series.gyroscope[..30]);

        let mut aggregator = BatchMetricsAggregator::new();
        aggregator.update(&plan);
        for report in &reports {
            aggregator.record_sink(
                &report.name,
                report.metrics.written(),
                report.metrics.failure_count,
            );
        }
        let summary = aggregator.summary();
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.sinks["mem"].written, 4);
        assert_eq!(summary.failure_rate(), 0.0);
    }

    /// Samples pushed out of order are sorted at stop and batch cleanly
    #[tokio::test]
    async fn test_e2e_manual_producer_out_of_order() {
        let mut capture = CaptureSession::start(&CaptureConfig::default());
        let tx = capture.sender().unwrap();

        let producer = tokio::spawn(async move {
            for t in [0.5, 0.0, 0.25, 0.75] {
                tx.send(SensorKind::Accelerometer, Sample::new(t, 0.0, 0.0, -1.0))
                    .await
                    .unwrap();
            }
            for t in [0.0, 0.5] {
                tx.send(SensorKind::Gyroscope, Sample::new(t, 0.1, 0.0, 0.0))
                    .await
                    .unwrap();
            }
        });
        producer.await.unwrap();

        let mut series = capture.stop().await.unwrap();
        assert_eq!(capture.metrics().out_of_order, 2);
        let stamps: Vec<f64> = series.accelerometer.iter().map(|s| s.timestamp).collect();
        assert_eq!(stamps, vec![0.0, 0.25, 0.5, 0.75]);

        let batcher = MotionBatcher::new(BatcherConfig {
            target_entries_per_batch: 3,
            ..Default::default()
        });
        batcher.estimate_rates(&mut series);
        assert_eq!(series.accelerometer_rate, Some(4));
        assert_eq!(series.gyroscope_rate, Some(2));

        let plan = batcher.batch(&series).unwrap();
        assert_eq!(reassemble(&plan.batches), series);
    }
}

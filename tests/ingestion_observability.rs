use std::sync::{Arc, Mutex};

use tabular_ingest::ingestion::{
    ingest, ingest_from_path, BytesResource, CompositeObserver, FileObserver, IngestionContext, IngestionObserver,
    IngestionOptions, IngestionSeverity, IngestionStats,
};
use tabular_ingest::IngestionError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<IngestionStats>>,
    failures: Mutex<Vec<IngestionSeverity>>,
    alerts: Mutex<Vec<IngestionSeverity>>,
}

impl IngestionObserver for RecordingObserver {
    fn on_success(&self, _ctx: &IngestionContext, stats: IngestionStats) {
        self.successes.lock().unwrap().push(stats);
    }

    fn on_failure(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &IngestionContext, severity: IngestionSeverity, _error: &IngestionError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn options_with(obs: Arc<RecordingObserver>) -> IngestionOptions {
    IngestionOptions {
        observer: Some(obs),
        alert_at_or_above: IngestionSeverity::Critical,
        ..Default::default()
    }
}

#[test]
fn observer_receives_stats_on_success() {
    let obs = Arc::new(RecordingObserver::default());
    let _ = ingest_from_path("tests/fixtures/people.csv", &options_with(obs.clone())).unwrap();

    assert_eq!(
        obs.successes.lock().unwrap().clone(),
        vec![IngestionStats { rows: 2, columns: 4 }]
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn observer_receives_failure_and_alert_on_missing_resource() {
    let obs = Arc::new(RecordingObserver::default());

    // Missing file -> ResourceNotFound -> Critical
    let _ = ingest_from_path("tests/fixtures/does_not_exist.csv", &options_with(obs.clone())).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Critical]);
}

#[test]
fn observer_receives_failure_without_alert_for_malformed_data() {
    let obs = Arc::new(RecordingObserver::default());

    // Arity mismatch -> Error severity (not Critical) -> should not alert
    let _ = ingest_from_path("tests/fixtures/ragged.csv", &options_with(obs.clone())).unwrap_err();

    assert_eq!(obs.failures.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn lower_alert_threshold_alerts_on_malformed_data() {
    let obs = Arc::new(RecordingObserver::default());
    let opts = IngestionOptions {
        alert_at_or_above: IngestionSeverity::Error,
        ..options_with(obs.clone())
    };

    let resource = BytesResource::owned("empty.csv", "");
    let _ = ingest(&resource, &opts).unwrap_err();

    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![IngestionSeverity::Error]);
}

#[test]
fn composite_and_file_observers_record_events() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("ingest.log");

    let recorder = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn IngestionObserver>> = vec![recorder.clone(), Arc::new(FileObserver::new(&log_path))];
    let composite = CompositeObserver::new(observers);
    let opts = IngestionOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    let _ = ingest(&BytesResource::owned("ok.csv", "a\n1\n"), &opts).unwrap();
    let _ = ingest_from_path("tests/fixtures/does_not_exist.csv", &opts).unwrap_err();

    assert_eq!(recorder.successes.lock().unwrap().len(), 1);
    assert_eq!(recorder.alerts.lock().unwrap().len(), 1);

    let log = std::fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("ok resource=ok.csv rows=1 columns=1"));
    assert!(lines[1].contains("fail severity=Critical"));
    assert!(lines[2].contains("ALERT severity=Critical"));
}

#[test]
fn file_observer_rejects_unopenable_path_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileObserver::try_new(dir.path().join("no_such_dir").join("ingest.log")).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}

#[test]
fn file_observer_flags_failed_writes() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened for appending.
    let observer = Arc::new(FileObserver::new(dir.path()));
    assert!(!observer.write_failed());

    let opts = IngestionOptions {
        observer: Some(observer.clone()),
        ..Default::default()
    };
    let _ = ingest(&BytesResource::owned("ok.csv", "a\n1\n"), &opts).unwrap();

    assert!(observer.write_failed());
}

#[test]
fn file_observer_lines_carry_timestamp_and_options() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("ingest.log");
    let observer = Arc::new(FileObserver::try_new(&log_path).unwrap());
    let opts = IngestionOptions {
        observer: Some(observer.clone()),
        csv: tabular_ingest::ingestion::CsvOptions {
            has_header: false,
            ..Default::default()
        },
        ..Default::default()
    };

    let _ = ingest(&BytesResource::owned("raw.csv", "1,x\n2,y\n"), &opts).unwrap();

    let log = std::fs::read_to_string(&log_path).unwrap();
    let (ts, rest) = log.trim_end().split_once(' ').unwrap();
    assert!(ts.parse::<u64>().is_ok());
    assert_eq!(rest, "ok resource=raw.csv rows=2 columns=2 header=false infer=true");
    assert!(!observer.write_failed());
}

#[test]
fn severity_follows_whether_input_was_readable() {
    let missing = IngestionError::ResourceNotFound {
        resource: "gone.csv".to_string(),
    };
    assert_eq!(IngestionSeverity::for_error(&missing), IngestionSeverity::Critical);

    let ragged = ingest(&BytesResource::owned("r.csv", "a,b\n1\n"), &IngestionOptions::default()).unwrap_err();
    assert_eq!(IngestionSeverity::for_error(&ragged), IngestionSeverity::Error);
    assert!(IngestionSeverity::Error < IngestionSeverity::Critical);
}

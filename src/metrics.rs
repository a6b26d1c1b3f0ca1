use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// How many recent requests the live log retains before evicting the oldest.
pub const LIVE_LOG_CAPACITY: usize = 100;

/// Aggregate request counters, serialized as-is by `/dashboard/stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RequestStats {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,

    /// Unix milliseconds of the most recent request; 0 before any traffic.
    pub last_request_time: u64,

    /// Running mean handling time in milliseconds over all requests.
    pub average_response_time: f64,
}

impl std::fmt::Display for RequestStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} requests ({} ok, {} failed), avg {:.1}ms",
            self.total_requests,
            self.successful_requests,
            self.failed_requests,
            self.average_response_time
        )
    }
}

/// Thread-safe accumulator for [`RequestStats`]. Every `/v1` request is
/// recorded exactly once, whether it succeeded, failed validation, or was
/// rejected by auth.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    inner: Mutex<RequestStats>,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished request into the counters. A status in `[200, 300)`
    /// counts as successful; the mean is updated incrementally so no sample
    /// history is kept.
    pub fn record(&self, status: u16, duration: Duration) {
        let sample = duration.as_millis() as f64;
        let mut stats = self.lock();

        stats.total_requests += 1;
        if (200..300).contains(&status) {
            stats.successful_requests += 1;
        } else {
            stats.failed_requests += 1;
        }
        stats.last_request_time = unix_millis();

        if stats.total_requests == 1 {
            stats.average_response_time = sample;
        } else {
            let total = stats.total_requests as f64;
            stats.average_response_time =
                (stats.average_response_time * (total - 1.0) + sample) / total;
        }
    }

    pub fn snapshot(&self) -> RequestStats {
        *self.lock()
    }

    fn lock(&self) -> MutexGuard<'_, RequestStats> {
        // Updates are straight-line arithmetic; a poisoned guard still holds
        // valid counters.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// One entry of the live request log, serialized as-is by
/// `/dashboard/requests`.
#[derive(Debug, Clone, Serialize)]
pub struct LiveRequest {
    pub id: String,

    /// Unix milliseconds when the request finished.
    pub timestamp: u64,

    pub method: String,
    pub path: String,
    pub status: u16,

    /// Handling time in milliseconds.
    pub duration: u64,

    pub user_agent: String,
}

impl LiveRequest {
    pub fn new(
        method: &str,
        path: &str,
        status: u16,
        duration: Duration,
        user_agent: &str,
    ) -> Self {
        LiveRequest {
            id: Uuid::new_v4().to_string(),
            timestamp: unix_millis(),
            method: method.to_string(),
            path: path.to_string(),
            status,
            duration: duration.as_millis() as u64,
            user_agent: user_agent.to_string(),
        }
    }
}

/// Bounded FIFO of the most recent requests, oldest first. Readers get a
/// snapshot; writers never block on serialization.
#[derive(Debug)]
pub struct LiveRequestLog {
    entries: Mutex<VecDeque<LiveRequest>>,
    capacity: usize,
}

impl LiveRequestLog {
    pub fn new(capacity: usize) -> Self {
        LiveRequestLog {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn push(&self, entry: LiveRequest) {
        let mut entries = self.lock();
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn snapshot(&self) -> Vec<LiveRequest> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LiveRequest>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for LiveRequestLog {
    fn default() -> Self {
        Self::new(LIVE_LOG_CAPACITY)
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_seeds_average() {
        let recorder = StatsRecorder::new();
        recorder.record(200, Duration::from_millis(120));

        let stats = recorder.snapshot();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.average_response_time, 120.0);
    }

    #[test]
    fn test_incremental_average() {
        let recorder = StatsRecorder::new();
        recorder.record(200, Duration::from_millis(100));
        recorder.record(200, Duration::from_millis(200));
        recorder.record(200, Duration::from_millis(600));

        let stats = recorder.snapshot();
        assert_eq!(stats.total_requests, 3);
        assert!((stats.average_response_time - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_success_boundaries() {
        let recorder = StatsRecorder::new();
        recorder.record(200, Duration::from_millis(1));
        recorder.record(299, Duration::from_millis(1));
        recorder.record(300, Duration::from_millis(1));
        recorder.record(199, Duration::from_millis(1));
        recorder.record(502, Duration::from_millis(1));

        let stats = recorder.snapshot();
        assert_eq!(stats.successful_requests, 2);
        assert_eq!(stats.failed_requests, 3);
        assert_eq!(stats.total_requests, 5);
    }

    #[test]
    fn test_last_request_time_advances() {
        let recorder = StatsRecorder::new();
        assert_eq!(recorder.snapshot().last_request_time, 0);

        recorder.record(200, Duration::from_millis(1));
        assert!(recorder.snapshot().last_request_time > 0);
    }

    #[test]
    fn test_stats_json_field_names() {
        let json = serde_json::to_value(RequestStats::default()).unwrap();
        for field in [
            "total_requests",
            "successful_requests",
            "failed_requests",
            "last_request_time",
            "average_response_time",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
    }

    #[test]
    fn test_concurrent_recording() {
        use std::sync::Arc;
        use std::thread;

        let recorder = Arc::new(StatsRecorder::new());
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let r = Arc::clone(&recorder);
                thread::spawn(move || r.record(200, Duration::from_millis(50)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = recorder.snapshot();
        assert_eq!(stats.total_requests, 10);
        assert!((stats.average_response_time - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_live_log_evicts_oldest() {
        let log = LiveRequestLog::new(3);
        for i in 0..5 {
            log.push(LiveRequest::new(
                "POST",
                &format!("/v1/chat/completions?n={}", i),
                200,
                Duration::from_millis(10),
                "test",
            ));
        }

        let entries = log.snapshot();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].path, "/v1/chat/completions?n=2");
        assert_eq!(entries[2].path, "/v1/chat/completions?n=4");
    }

    #[test]
    fn test_live_log_default_capacity() {
        let log = LiveRequestLog::default();
        for i in 0..(LIVE_LOG_CAPACITY + 1) {
            log.push(LiveRequest::new(
                "GET",
                &format!("/v1/models?n={}", i),
                200,
                Duration::from_millis(1),
                "test",
            ));
        }

        // One past capacity: the first entry is gone, the rest are in order.
        let entries = log.snapshot();
        assert_eq!(entries.len(), LIVE_LOG_CAPACITY);
        assert_eq!(entries[0].path, "/v1/models?n=1");
        assert_eq!(
            entries[LIVE_LOG_CAPACITY - 1].path,
            format!("/v1/models?n={}", LIVE_LOG_CAPACITY)
        );
    }

    #[test]
    fn test_live_request_json_field_names() {
        let entry = LiveRequest::new("GET", "/v1/models", 200, Duration::from_millis(7), "curl");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["method"], "GET");
        assert_eq!(json["path"], "/v1/models");
        assert_eq!(json["status"], 200);
        assert_eq!(json["duration"], 7);
        assert_eq!(json["user_agent"], "curl");
        assert!(json["id"].is_string());
        assert!(json["timestamp"].is_u64());
    }

    #[test]
    fn test_live_request_ids_unique() {
        let a = LiveRequest::new("GET", "/", 200, Duration::ZERO, "");
        let b = LiveRequest::new("GET", "/", 200, Duration::ZERO, "");
        assert_ne!(a.id, b.id);
    }
}

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use sumi_fetch::fetcher::{HttpClient, HttpResponse};
use sumi_fetch::url::default_validator;
use sumi_fetch::{
    aggregate, FailureKind, FetchFailure, FetchOutcome, Fetcher, Page, TransportError, WorkerPool,
};

/// Deterministic stub: the path of the URL decides the response
struct RoutedClient {
    delay: Duration,
    calls: Mutex<HashMap<String, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl RoutedClient {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            calls: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl HttpClient for RoutedClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        let _in_flight = InFlight::enter(&self.in_flight, &self.peak_in_flight);
        tokio::time::sleep(self.delay).await;

        if url.ends_with("/missing") {
            Ok(HttpResponse::from_bytes(404, "nope"))
        } else if url.ends_with("/down") {
            Err(TransportError::Connect("connection refused".to_string()))
        } else {
            Ok(HttpResponse::from_bytes(200, format!("content of {}", url)))
        }
    }
}

/// Counts a request as in flight until dropped, including when aborted
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = counter.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

fn expected_outcome(url: &str) -> Option<FailureKind> {
    if url.ends_with("/missing") {
        Some(FailureKind::NotFound)
    } else if url.ends_with("/down") {
        Some(FailureKind::Transport)
    } else if url.starts_with("http") || url.starts_with("www.") {
        None
    } else {
        Some(FailureKind::InvalidUrl)
    }
}

fn mixed_urls() -> Vec<String> {
    vec![
        "https://site1.com/".to_string(),
        "https://site2.com/missing".to_string(),
        "www.example.com".to_string(),
        "example.com".to_string(),
        "https://site3.com/down".to_string(),
        ".hello".to_string(),
        "https://site4.com/a".to_string(),
        "www.example.co.uk/missing".to_string(),
    ]
}

#[tokio::test]
async fn test_aggregate_invariant_under_concurrency() {
    let urls = mixed_urls();
    let n = urls.len();

    for concurrency in [1, 2, 4, n] {
        let client = RoutedClient::new(Duration::from_millis(5));
        let fetcher = Arc::new(Fetcher::from_shared(
            client.clone(),
            Arc::new(default_validator()),
        ));

        let records = aggregate(urls.clone(), fetcher, concurrency)
            .await
            .expect("aggregate failed");

        assert_eq!(records.len(), n, "concurrency {}", concurrency);

        let seen: HashSet<&str> = records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(seen.len(), n, "duplicate records at concurrency {}", concurrency);

        for record in &records {
            assert_eq!(
                record.outcome.failure_kind(),
                expected_outcome(&record.url),
                "wrong outcome for {} at concurrency {}",
                record.url,
                concurrency
            );
            if record.outcome.is_success() {
                assert_eq!(
                    record.outcome,
                    FetchOutcome::Success(Page {
                        content: format!("content of {}", record.url).into_bytes(),
                        status_code: 200,
                    })
                );
            }
            assert!(record.worker < concurrency);
        }

        // Invalid URLs never reach the capability; the rest are requested once
        let calls = client.calls.lock().unwrap();
        assert_eq!(calls.len(), 6);
        assert!(calls.values().all(|&count| count == 1));
    }
}

#[tokio::test]
async fn test_worker_counts_sum_to_batch_size() {
    for concurrency in [1, 3, 8, 50] {
        let client = RoutedClient::new(Duration::from_millis(1));
        let fetcher = Arc::new(Fetcher::from_shared(client.clone(), Arc::new(|_: &str| true)));
        let urls: Vec<String> = (0..40).map(|i| format!("https://host{}.com/", i)).collect();

        let report = WorkerPool::new(fetcher, concurrency)
            .expect("valid concurrency")
            .with_queue_capacity(4)
            .run(urls)
            .await;

        assert!(report.is_complete());
        assert_eq!(report.submitted, 40);
        assert_eq!(report.workers.len(), concurrency);
        assert_eq!(report.processed(), 40);
        assert_eq!(client.calls.lock().unwrap().len(), 40);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_wall_clock_tracks_ceil_n_over_w() {
    let delay = Duration::from_millis(100);
    let client = RoutedClient::new(delay);
    let fetcher = Arc::new(Fetcher::from_shared(client.clone(), Arc::new(|_: &str| true)));
    let urls: Vec<String> = (0..9).map(|i| format!("https://host{}.com/", i)).collect();

    let start = Instant::now();
    let records = aggregate(urls, fetcher, 3).await.expect("aggregate failed");
    let elapsed = start.elapsed();

    // ceil(9 / 3) * 100ms = 300ms; a serial run would take 900ms
    assert_eq!(records.len(), 9);
    assert!(elapsed >= Duration::from_millis(300), "{:?}", elapsed);
    assert!(elapsed < Duration::from_millis(600), "{:?}", elapsed);
    assert_eq!(client.peak_in_flight.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_large_batch_with_small_queue() {
    let client = RoutedClient::new(Duration::ZERO);
    let fetcher = Arc::new(Fetcher::from_shared(client.clone(), Arc::new(|_: &str| true)));
    let urls = (0..2_000).map(|i| format!("https://host{}.com/", i));

    let pool = WorkerPool::new(fetcher, 8)
        .expect("valid concurrency")
        .with_queue_capacity(2);
    let mut stream = pool.spawn(urls);

    let mut seen = HashSet::new();
    while let Some(record) = stream.next().await {
        assert!(record.outcome.is_success());
        assert!(seen.insert(record.url), "record delivered twice");
    }

    let report = stream.finish().await;
    assert_eq!(seen.len(), 2_000);
    assert_eq!(report.submitted, 2_000);
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_failures_do_not_abort_batch() {
    let client = RoutedClient::new(Duration::ZERO);
    let fetcher = Arc::new(Fetcher::from_shared(client, Arc::new(|_: &str| true)));
    let urls: Vec<String> = (0..10)
        .map(|i| {
            if i % 2 == 0 {
                format!("https://host{}.com/down", i)
            } else {
                format!("https://host{}.com/", i)
            }
        })
        .collect();

    let records = aggregate(urls, fetcher, 2).await.expect("aggregate failed");

    let failures: Vec<&FetchFailure> = records
        .iter()
        .filter_map(|r| match &r.outcome {
            FetchOutcome::Failure(failure) => Some(failure),
            FetchOutcome::Success(_) => None,
        })
        .collect();
    assert_eq!(records.len(), 10);
    assert_eq!(failures.len(), 5);
    assert!(failures.iter().all(|f| f.kind == FailureKind::Transport));
}

#[tokio::test]
async fn test_dropping_stream_cancels_batch() {
    let client = RoutedClient::new(Duration::from_secs(30));
    let fetcher = Arc::new(Fetcher::from_shared(client.clone(), Arc::new(|_: &str| true)));
    let urls: Vec<String> = (0..4).map(|i| format!("https://host{}.com/", i)).collect();

    let stream = WorkerPool::new(fetcher, 2)
        .expect("valid concurrency")
        .spawn(urls);
    tokio::time::sleep(Duration::from_millis(20)).await;
    drop(stream);

    // Aborted workers release their in-flight requests
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.in_flight.load(Ordering::SeqCst), 0);
}

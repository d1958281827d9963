//! Scan engine: shared state, pending-task accounting and the
//! recursive subdivision task.
//!
//! One [`ScanEngine`] owns everything a single subnet sweep shares: the
//! rate limiter, the nameserver pool, the retry budget, the result
//! channel and the pending-task counter. Tasks recurse by spawning
//! children against the same engine; the sweep is complete when the
//! counter returns to zero.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Notify;
use tracing::{debug, error, warn};

use ptrsweep_core::{
    PtrRecord, PtrResponse, ResponseStatus, Result, ScanError, Subnet, TransportError,
};

use crate::query;
use crate::resolver::ResolverClient;

/// Configuration for one subnet sweep.
///
/// Passed explicitly to the engine and shared by reference with every
/// task it spawns; there is no ambient global state.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Aggregate outbound queries per second across the whole engine
    pub rate: NonZeroU32,
    /// Attempts per query before its subtree is abandoned
    pub attempts: u32,
    /// Candidate nameservers, chosen uniformly at random per attempt
    pub nameservers: Vec<SocketAddr>,
}

impl ScanConfig {
    /// Build a validated configuration.
    pub fn new(rate: u32, attempts: u32, nameservers: Vec<SocketAddr>) -> Result<Self> {
        let rate = NonZeroU32::new(rate)
            .ok_or_else(|| ScanError::Config("rate must be at least 1 query/s".into()))?;
        if attempts == 0 {
            return Err(ScanError::Config("attempts must be at least 1".into()));
        }
        if nameservers.is_empty() {
            return Err(ScanError::Config("nameserver pool is empty".into()));
        }
        Ok(Self {
            rate,
            attempts,
            nameservers,
        })
    }
}

/// Counters reported when a sweep completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Total tasks run (queries attempted, counting each level once)
    pub tasks: u64,
    /// PTR records emitted to the sink
    pub records: u64,
    /// Subtrees abandoned because every attempt failed at the transport
    pub transport_failures: u64,
    /// Responses with a status outside success/name-error
    pub anomalies: u64,
}

/// Pending-task accounting.
///
/// Incremented strictly before a task is spawned and decremented
/// exactly once when it finishes, so the count can never transiently
/// read zero while live tasks remain.
struct TaskCounter {
    pending: AtomicUsize,
    idle: Notify,
}

impl TaskCounter {
    fn new() -> Self {
        Self {
            pending: AtomicUsize::new(0),
            idle: Notify::new(),
        }
    }

    fn register(&self) {
        self.pending.fetch_add(1, Ordering::AcqRel);
    }

    fn finish(&self) {
        if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.idle.notify_waiters();
        }
    }

    async fn wait_idle(&self) {
        loop {
            // Register interest before checking, so a final decrement
            // between the check and the await cannot be missed.
            let notified = self.idle.notified();
            if self.pending.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }
}

struct Shared {
    limiter: DefaultDirectRateLimiter,
    nameservers: Vec<SocketAddr>,
    attempts: u32,
    ipv4: bool,
    resolver: Arc<dyn ResolverClient>,
    sink: UnboundedSender<PtrRecord>,
    counter: TaskCounter,
    tasks: AtomicU64,
    records: AtomicU64,
    transport_failures: AtomicU64,
    anomalies: AtomicU64,
}

impl Shared {
    fn pick_nameserver(&self) -> SocketAddr {
        self.nameservers[rand::random_range(0..self.nameservers.len())]
    }
}

/// Engine for one subnet sweep.
pub struct ScanEngine {
    shared: Arc<Shared>,
    initial_query: String,
}

impl ScanEngine {
    /// Create an engine for `subnet`.
    ///
    /// Validates the configuration and computes the initial query; both
    /// failures are configuration errors that abort this subnet's sweep
    /// before any task is spawned.
    pub fn new(
        subnet: Subnet,
        config: &ScanConfig,
        resolver: Arc<dyn ResolverClient>,
        sink: UnboundedSender<PtrRecord>,
    ) -> Result<Self> {
        if config.nameservers.is_empty() {
            return Err(ScanError::Config("nameserver pool is empty".into()));
        }
        if config.attempts == 0 {
            return Err(ScanError::Config("attempts must be at least 1".into()));
        }
        let initial_query = query::reverse_query(&subnet)?;

        let shared = Arc::new(Shared {
            limiter: RateLimiter::direct(Quota::per_second(config.rate)),
            nameservers: config.nameservers.clone(),
            attempts: config.attempts,
            ipv4: subnet.is_ipv4(),
            resolver,
            sink,
            counter: TaskCounter::new(),
            tasks: AtomicU64::new(0),
            records: AtomicU64::new(0),
            transport_failures: AtomicU64::new(0),
            anomalies: AtomicU64::new(0),
        });

        Ok(Self {
            shared,
            initial_query,
        })
    }

    /// The query the root task will issue.
    #[must_use]
    pub fn initial_query(&self) -> &str {
        &self.initial_query
    }

    /// Launch the root task.
    pub fn start(&self) {
        debug!(query = %self.initial_query, "starting sweep");
        spawn_division(Arc::clone(&self.shared), self.initial_query.clone());
    }

    /// Block until every task in the recursion tree has finished, then
    /// return the sweep's statistics.
    pub async fn wait(&self) -> ScanStats {
        self.shared.counter.wait_idle().await;
        ScanStats {
            tasks: self.shared.tasks.load(Ordering::Relaxed),
            records: self.shared.records.load(Ordering::Relaxed),
            transport_failures: self.shared.transport_failures.load(Ordering::Relaxed),
            anomalies: self.shared.anomalies.load(Ordering::Relaxed),
        }
    }
}

/// Run one whole subnet sweep to completion.
///
/// Discovered records arrive through `sink` as a side channel while the
/// sweep runs; the returned statistics summarize what happened.
pub async fn run_scan(
    subnet: Subnet,
    config: &ScanConfig,
    resolver: Arc<dyn ResolverClient>,
    sink: UnboundedSender<PtrRecord>,
) -> Result<ScanStats> {
    let engine = ScanEngine::new(subnet, config, resolver, sink)?;
    engine.start();
    Ok(engine.wait().await)
}

/// Register a task on the pending counter, then spawn it.
fn spawn_division(shared: Arc<Shared>, query: String) {
    shared.counter.register();
    tokio::spawn(scan_division(shared, query));
}

/// One task invocation: admission, retry loop, classification, fan-out.
///
/// Returns a boxed future because the recursion re-enters this function
/// through `spawn_division`.
fn scan_division(shared: Arc<Shared>, query: String) -> BoxFuture<'static, ()> {
    async move {
        shared.tasks.fetch_add(1, Ordering::Relaxed);

        // Sole global throughput control point.
        shared.limiter.until_ready().await;

        let mut response = None;
        let mut last_error = None;
        for _ in 0..shared.attempts {
            let nameserver = shared.pick_nameserver();
            match shared.resolver.exchange(&query, nameserver).await {
                Ok(r) => {
                    response = Some(r);
                    break;
                }
                Err(e) => {
                    debug!(query = %query, nameserver = %nameserver, error = %e,
                        "exchange attempt failed");
                    last_error = Some(e);
                }
            }
        }

        match response {
            Some(response) => classify_and_descend(&shared, &query, response),
            None => {
                shared.transport_failures.fetch_add(1, Ordering::Relaxed);
                let err = ScanError::Transport {
                    query: query.clone(),
                    attempts: shared.attempts,
                    // attempts >= 1 is validated at construction, so at
                    // least one failure was recorded.
                    source: last_error
                        .unwrap_or_else(|| TransportError::Proto("no attempts made".into())),
                };
                error!(error = %err, "abandoning subtree");
            }
        }

        // Exactly one decrement per task, after classification and any
        // child registration.
        shared.counter.finish();
    }
    .boxed()
}

fn classify_and_descend(shared: &Arc<Shared>, query: &str, response: PtrResponse) {
    match response.status {
        ResponseStatus::Success if !response.records.is_empty() => {
            // Populated answer: this level is a leaf, the namespace
            // terminates at the first resource record.
            for record in response.records {
                shared.records.fetch_add(1, Ordering::Relaxed);
                // A dropped receiver must not stall the sweep.
                let _ = shared.sink.send(record);
            }
        }
        ResponseStatus::Success => {
            // Level exists but holds nothing: descend one label.
            if shared.ipv4 {
                for value in 0..=255u16 {
                    spawn_division(Arc::clone(shared), format!("{value}.{query}"));
                }
            } else {
                for value in 0..=0xfu8 {
                    spawn_division(Arc::clone(shared), format!("{value:x}.{query}"));
                }
            }
        }
        ResponseStatus::NameError => {
            debug!(query = %query, "authoritative name error, branch empty");
        }
        ResponseStatus::Other(code) => {
            shared.anomalies.fetch_add(1, Ordering::Relaxed);
            warn!(query = %query, code, "unexpected response code, not descending");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_rejects_empty_pool() {
        let err = ScanConfig::new(600, 5, Vec::new()).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_config_rejects_zero_rate_and_attempts() {
        let pool: Vec<SocketAddr> = vec!["127.0.0.1:53".parse().unwrap()];
        assert!(ScanConfig::new(0, 5, pool.clone()).unwrap_err().is_config_error());
        assert!(ScanConfig::new(600, 0, pool).unwrap_err().is_config_error());
    }

    #[tokio::test]
    async fn test_counter_waits_for_all_tasks() {
        let counter = Arc::new(TaskCounter::new());

        for _ in 0..64 {
            counter.register();
        }
        for _ in 0..64 {
            let counter = Arc::clone(&counter);
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                counter.finish();
            });
        }

        counter.wait_idle().await;
        assert_eq!(counter.pending.load(Ordering::Acquire), 0);
    }

    #[tokio::test]
    async fn test_counter_idle_from_the_start() {
        let counter = TaskCounter::new();
        // Nothing registered: must return immediately.
        counter.wait_idle().await;
    }
}

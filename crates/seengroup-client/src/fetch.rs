//! List sources, the retry wrapper and the visibility-gated poller.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, instrument, warn};

use seengroup_common::models::{Job, JobFilters, Product, ProductFilters};

use crate::error::{ClientError, Result};
use crate::gateway::GatewayClient;

// ── Sources ───────────────────────────────────────────────────────────────────

/// Reduces a filter set to a stable cache key.
pub trait Fingerprint {
    fn fingerprint(&self) -> String;
}

impl Fingerprint for JobFilters {
    fn fingerprint(&self) -> String {
        JobFilters::fingerprint(self)
    }
}

impl Fingerprint for ProductFilters {
    fn fingerprint(&self) -> String {
        ProductFilters::fingerprint(self)
    }
}

/// Something that can produce the full list for a filter set.
#[async_trait]
pub trait ListSource: Send + Sync + 'static {
    type Filters: Fingerprint + Clone + Send + Sync + 'static;
    type Item: Clone + Send + Sync + 'static;

    async fn fetch(&self, filters: &Self::Filters) -> Result<Vec<Self::Item>>;
}

/// `data` array of a gateway envelope, decoded.
fn data_list<T: DeserializeOwned>(body: Value) -> Result<Vec<T>> {
    match body.get("data") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(data) => serde_json::from_value(data.clone())
            .map_err(|e| ClientError::Validation(format!("Unexpected list payload: {}", e))),
    }
}

/// Public job board, `GET /api/career`.
pub struct HttpJobSource {
    gateway: GatewayClient,
}

impl HttpJobSource {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ListSource for HttpJobSource {
    type Filters = JobFilters;
    type Item = Job;

    #[instrument(skip(self))]
    async fn fetch(&self, filters: &JobFilters) -> Result<Vec<Job>> {
        let builder = self
            .gateway
            .request(Method::GET, "/api/career")?
            .query(&filters.query_pairs());
        let body = self
            .gateway
            .send(builder)
            .await?
            .into_result("Failed to fetch job listings.")?;
        data_list(body)
    }
}

/// Product catalog, `GET /api/products`.
pub struct HttpProductSource {
    gateway: GatewayClient,
}

impl HttpProductSource {
    pub fn new(gateway: GatewayClient) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl ListSource for HttpProductSource {
    type Filters = ProductFilters;
    type Item = Product;

    #[instrument(skip(self))]
    async fn fetch(&self, filters: &ProductFilters) -> Result<Vec<Product>> {
        let builder = self
            .gateway
            .request(Method::GET, "/api/products")?
            .query(&filters.query_pairs());
        let body = self
            .gateway
            .send(builder)
            .await?
            .into_result("Failed to fetch products")?;
        data_list(body)
    }
}

// ── Retry ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first.
    pub retries: u32,
    /// Per-attempt deadline.
    pub timeout: Duration,
    /// Wait before retry `n` is `backoff * n`.
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Admin dashboard statistics.
    pub const DASHBOARD: RetryPolicy = RetryPolicy {
        retries: 2,
        timeout: Duration::from_secs(8),
        backoff: Duration::from_millis(500),
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::DASHBOARD
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// retries are used up. The last error is returned.
pub async fn fetch_with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        let outcome = match timeout(policy.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(policy.timeout)),
        };
        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.retries => {
                attempt += 1;
                warn!(attempt, error = %e, "retrying request");
                sleep(policy.backoff * attempt).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// `GET /api/proxy/admin/dashboard/stats` with the dashboard retry policy.
/// Returns the `data` object, or the whole body when it has none.
pub async fn dashboard_stats(gateway: &GatewayClient, policy: RetryPolicy) -> Result<Value> {
    fetch_with_retry(policy, || async {
        let reply = gateway
            .send(gateway.request(Method::GET, "/api/proxy/admin/dashboard/stats")?)
            .await?;
        if !reply.is_ok() {
            return Err(ClientError::Rejected {
                status: reply.status,
                message: "Failed to fetch dashboard stats".to_string(),
            });
        }
        Ok(match reply.body.get("data") {
            Some(data) if !data.is_null() => data.clone(),
            _ => reply.body,
        })
    })
    .await
}

// ── Poller ────────────────────────────────────────────────────────────────────

/// Dashboard refresh cadence.
pub const DASHBOARD_POLL_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Runs a task every `period` while the visibility flag is true. Ticks that
/// fall while hidden are skipped. Aborted on drop.
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn<F, Fut>(period: Duration, visible: watch::Receiver<bool>, mut task: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately; the initial load is the
            // caller's business.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let shown = *visible.borrow();
                if shown {
                    debug!("poll tick");
                    task().await;
                } else {
                    debug!("poll tick skipped while hidden");
                }
            }
        });
        Self { handle }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

//! Configuration-driven MCP client pool.
//!
//! The pool keeps one live client per server entry published by the
//! configuration source and re-reads that source on a timer. Queries check
//! whether a refresh is due, trigger it in the background when it is, and
//! proceed against the current pool snapshot without waiting for the pass to
//! finish. Reconciliation is serialized through a single lock; each entry
//! transitions atomically between absent and present, so readers never see a
//! half-built entry or a client that has already been closed.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::{read_descriptors, ConfigSource, ServerDescriptor};
use crate::error::{PoolError, Result};

use super::client::MCPClient;
use super::schema::{MCPServerTools, MCPToolSchema};
use super::transport::{MCPConnector, MCPTransportRecipe};

/// Tuning knobs for pool refresh behavior.
#[derive(Debug, Clone)]
pub struct MCPClientPoolOptions {
    /// Configuration namespace the pool reads server entries from.
    pub namespace: String,
    /// Minimum time between reconciliation passes.
    pub refresh_interval: Duration,
    /// Upper bound on one background pass; must stay below the interval so a
    /// stuck pass cannot starve the next one.
    pub refresh_timeout: Duration,
}

impl Default for MCPClientPoolOptions {
    fn default() -> Self {
        Self {
            namespace: "mcp".into(),
            refresh_interval: Duration::from_secs(30),
            refresh_timeout: Duration::from_secs(20),
        }
    }
}

impl MCPClientPoolOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration namespace.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Set the refresh interval.
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the per-pass timeout.
    pub fn refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }
}

struct PooledEntry {
    descriptor: ServerDescriptor,
    client: Arc<dyn MCPClient>,
}

/// Pool of MCP clients kept in sync with a configuration source.
///
/// Cheap to share: the pool is a handle around reference-counted state, so
/// hosts pass it by clone or reference rather than through globals.
#[derive(Clone)]
pub struct MCPClientPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    source: Arc<dyn ConfigSource>,
    connector: Arc<dyn MCPConnector>,
    options: MCPClientPoolOptions,
    entries: RwLock<HashMap<String, PooledEntry>>,
    reconcile_lock: Mutex<()>,
    /// Millisecond deadline (relative to `epoch`) for the next permitted
    /// reconciliation pass; starts at zero so the first operation triggers
    /// the first pass.
    next_refresh_ms: AtomicU64,
    epoch: Instant,
    disposed: AtomicBool,
    shutdown: CancellationToken,
    refresh_task: StdMutex<Option<JoinHandle<()>>>,
}

impl MCPClientPool {
    /// Create a pool with default options.
    pub fn new(source: Arc<dyn ConfigSource>, connector: Arc<dyn MCPConnector>) -> Self {
        Self::with_options(source, connector, MCPClientPoolOptions::default())
    }

    /// Create a pool with explicit options.
    pub fn with_options(
        source: Arc<dyn ConfigSource>,
        connector: Arc<dyn MCPConnector>,
        options: MCPClientPoolOptions,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                source,
                connector,
                options,
                entries: RwLock::new(HashMap::new()),
                reconcile_lock: Mutex::new(()),
                next_refresh_ms: AtomicU64::new(0),
                epoch: Instant::now(),
                disposed: AtomicBool::new(false),
                shutdown: CancellationToken::new(),
                refresh_task: StdMutex::new(None),
            }),
        }
    }

    /// List the union of tools across all pooled clients.
    ///
    /// Triggers an opportunistic refresh check first but never waits for the
    /// pass; the listing reflects whatever clients are pooled right now.
    pub async fn list_tools(&self) -> Result<Vec<MCPToolSchema>> {
        Ok(self
            .list_tools_by_server()
            .await?
            .into_iter()
            .flat_map(|server| server.tools)
            .collect())
    }

    /// List tools grouped by the server that exposes them.
    ///
    /// Every pooled client is queried; a client whose listing fails is
    /// logged and omitted from this result rather than failing the union.
    pub async fn list_tools_by_server(&self) -> Result<Vec<MCPServerTools>> {
        self.inner.ensure_live()?;
        PoolInner::maybe_spawn_refresh(&self.inner);

        let snapshot = self.inner.snapshot().await;
        let queries = snapshot.into_iter().map(|(server, client)| async move {
            match client.list_tools().await {
                Ok(tools) => Some(MCPServerTools { server, tools }),
                Err(error) => {
                    warn!(server = %server, error = %error, "skipping server that failed to list tools");
                    None
                }
            }
        });

        Ok(join_all(queries).await.into_iter().flatten().collect())
    }

    /// Invoke a tool on a named pooled server.
    ///
    /// Server lookup is case-insensitive, matching descriptor identity.
    pub async fn call_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value> {
        self.inner.ensure_live()?;
        PoolInner::maybe_spawn_refresh(&self.inner);

        let client = {
            let entries = self.inner.entries.read().await;
            entries
                .get(&server.to_ascii_lowercase())
                .map(|entry| Arc::clone(&entry.client))
        }
        .ok_or_else(|| PoolError::ServerNotFound(server.to_owned()))?;

        client.call_tool(tool, arguments).await
    }

    /// Names of the currently pooled servers, sorted.
    pub async fn server_names(&self) -> Vec<String> {
        let entries = self.inner.entries.read().await;
        let mut names: Vec<String> = entries
            .values()
            .map(|entry| entry.descriptor.name.clone())
            .collect();
        names.sort();
        names
    }

    /// Run one reconciliation pass to completion on the caller's task.
    ///
    /// Bypasses the deadline gate but still serializes on the reconcile
    /// lock. Hosts use this to warm the pool before serving traffic.
    pub async fn refresh(&self) -> Result<()> {
        self.inner.ensure_live()?;
        let token = self.inner.shutdown.child_token();
        self.inner.reconcile(token).await?;
        self.inner.schedule_next_refresh();
        Ok(())
    }

    /// Tear the pool down: stop refreshes, close every client, clear the set.
    ///
    /// Idempotent and safe to call concurrently with in-flight queries; the
    /// disposed flag flips first so late operations fail fast with
    /// [`PoolError::Disposed`] instead of racing the teardown.
    pub async fn dispose(&self) {
        let inner = &self.inner;
        if inner.disposed.swap(true, Ordering::SeqCst) {
            return;
        }

        inner.shutdown.cancel();

        let in_flight = inner.refresh_task.lock().unwrap().take();
        if let Some(handle) = in_flight {
            let _ = handle.await;
        }

        let _guard = inner.reconcile_lock.lock().await;
        let drained: Vec<PooledEntry> = {
            let mut entries = inner.entries.write().await;
            entries.drain().map(|(_, entry)| entry).collect()
        };

        for entry in drained {
            if let Err(error) = entry.client.close().await {
                warn!(server = %entry.descriptor.name, error = %error, "error closing client during teardown");
            }
        }

        info!("MCP client pool disposed");
    }
}

impl PoolInner {
    fn ensure_live(&self) -> Result<()> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(PoolError::Disposed);
        }
        Ok(())
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn schedule_next_refresh(&self) {
        let next = self.now_ms() + self.options.refresh_interval.as_millis() as u64;
        self.next_refresh_ms.store(next, Ordering::SeqCst);
    }

    /// Claim the refresh deadline if it has passed.
    ///
    /// The thread that advances the deadline is the one that runs the pass;
    /// late arrivals observe the advanced deadline and skip. This keeps the
    /// due-check O(1) and free of any I/O.
    fn try_claim_refresh(&self) -> bool {
        let now = self.now_ms();
        let deadline = self.next_refresh_ms.load(Ordering::SeqCst);
        if deadline > now {
            return false;
        }

        let next = now + self.options.refresh_interval.as_millis() as u64;
        self.next_refresh_ms
            .compare_exchange(deadline, next, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    fn maybe_spawn_refresh(inner: &Arc<Self>) {
        if !inner.try_claim_refresh() {
            return;
        }

        let task_inner = Arc::clone(inner);
        let token = inner.shutdown.child_token();
        let abort = token.clone();
        let bound = inner.options.refresh_timeout;

        let handle = tokio::spawn(async move {
            let pass = tokio::time::timeout(bound, task_inner.reconcile(token));
            tokio::select! {
                _ = abort.cancelled() => {
                    debug!("background refresh pass aborted by teardown");
                }
                outcome = pass => match outcome {
                    Ok(Ok(())) => debug!("background refresh pass completed"),
                    Ok(Err(error)) => warn!(error = %error, "background refresh pass failed"),
                    Err(_) => {
                        warn!(timeout_ms = bound.as_millis() as u64, "background refresh pass timed out");
                    }
                },
            }
        });

        *inner.refresh_task.lock().unwrap() = Some(handle);
    }

    /// Align the pool with the current configuration snapshot.
    ///
    /// Stale entries are removed from the visible set before their clients
    /// are closed, and removal happens before addition so a renamed or
    /// retyped entry is fully torn down before any replacement is built. A
    /// failure on one entry never aborts the pass for its siblings;
    /// cancellation leaves whatever was committed so far.
    async fn reconcile(&self, token: CancellationToken) -> Result<()> {
        let _guard = self.reconcile_lock.lock().await;
        self.ensure_live()?;

        self.source.refresh().await;
        let descriptors = read_descriptors(self.source.as_ref(), &self.options.namespace).await;
        debug!(count = descriptors.len(), "reconciling MCP client pool");

        if descriptors.is_empty() {
            let drained: Vec<PooledEntry> = {
                let mut entries = self.entries.write().await;
                entries.drain().map(|(_, entry)| entry).collect()
            };
            if !drained.is_empty() {
                info!(closed = drained.len(), "configuration is empty, clearing pool");
            }
            for entry in drained {
                self.close_entry(entry).await;
            }
            return Ok(());
        }

        let mut desired: HashMap<String, &ServerDescriptor> = HashMap::new();
        for descriptor in &descriptors {
            desired.entry(descriptor.pool_key()).or_insert(descriptor);
        }

        let removed: Vec<PooledEntry> = {
            let mut entries = self.entries.write().await;
            let stale: Vec<String> = entries
                .iter()
                .filter(|(key, entry)| {
                    desired
                        .get(key.as_str())
                        .map_or(true, |descriptor| **descriptor != entry.descriptor)
                })
                .map(|(key, _)| key.clone())
                .collect();
            stale
                .into_iter()
                .filter_map(|key| entries.remove(&key))
                .collect()
        };
        for entry in removed {
            self.close_entry(entry).await;
        }

        let mut seen: HashSet<String> = HashSet::new();
        for descriptor in &descriptors {
            if token.is_cancelled() {
                return Err(PoolError::Cancelled("pool refresh interrupted".into()));
            }

            let key = descriptor.pool_key();
            if !seen.insert(key.clone()) {
                warn!(server = %descriptor.name, "duplicate server name in configuration, keeping the first entry");
                continue;
            }

            let already_pooled = self.entries.read().await.contains_key(&key);
            if already_pooled {
                continue;
            }

            let recipe = match MCPTransportRecipe::for_descriptor(descriptor) {
                Ok(recipe) => recipe,
                Err(error) => {
                    warn!(server = %descriptor.name, error = %error, "dropping server with unsupported kind");
                    continue;
                }
            };

            let client = match self.connector.connect(recipe).await {
                Ok(client) => Arc::<dyn MCPClient>::from(client),
                Err(error) => {
                    warn!(server = %descriptor.name, error = %error, "failed to connect MCP server, retrying next pass");
                    continue;
                }
            };

            let mut entries = self.entries.write().await;
            match entries.entry(key) {
                Entry::Occupied(_) => {
                    drop(entries);
                    // the pool is a set: one client per name, the loser is closed
                    if let Err(error) = client.close().await {
                        warn!(server = %descriptor.name, error = %error, "error closing duplicate client");
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(PooledEntry {
                        descriptor: descriptor.clone(),
                        client,
                    });
                    info!(server = %descriptor.name, kind = %descriptor.kind, "connected MCP server");
                }
            }
        }

        Ok(())
    }

    async fn close_entry(&self, entry: PooledEntry) {
        debug!(server = %entry.descriptor.name, "closing stale MCP client");
        if let Err(error) = entry.client.close().await {
            warn!(server = %entry.descriptor.name, error = %error, "error closing stale client");
        }
    }

    /// Read-consistent view of the current entries, sorted by server name.
    async fn snapshot(&self) -> Vec<(String, Arc<dyn MCPClient>)> {
        let entries = self.entries.read().await;
        let mut snapshot: Vec<(String, Arc<dyn MCPClient>)> = entries
            .values()
            .map(|entry| (entry.descriptor.name.clone(), Arc::clone(&entry.client)))
            .collect();
        snapshot.sort_by(|left, right| left.0.cmp(&right.0));
        snapshot
    }
}

//! Producers coordinator
//!
//! Multiplexes logical producers and committing consumers onto a small pool
//! of physical connections, one pool per stream leader. Registration looks
//! up the leader, finds (or opens) a connection with a free slot, and hands
//! the tenant its publishing id. Connection loss and topology changes
//! displace the affected registrations and hand them to a recovery job
//! (see [`crate::recovery`]) that rebinds them with fresh metadata.
//!
//! All slot bookkeeping lives behind one mutex with short critical
//! sections; metadata lookups and connection handshakes run outside it.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use skein_protocol::{Broker, ResponseCode};
use tracing::{debug, info, warn};

use crate::backoff::BackOffDelayPolicy;
use crate::environment::Environment;
use crate::hooks::{CommittingConsumer, ManagedProducer};
use crate::recovery::{self, PendingSet, RecoveryKind};
use crate::transport::{
    ClientFactory, ClientParameters, Connection, MetadataListener, ShutdownListener,
    ShutdownReason,
};
use crate::{Error, Result};

/// Producer slots per physical connection; a slot index is the tenant's
/// publishing id, so this cannot exceed `u8::MAX + 1`.
pub const MAX_PRODUCERS_PER_CLIENT: usize = 256;

/// Committing-consumer slots per physical connection
pub const MAX_COMMITTING_CONSUMERS_PER_CLIENT: usize = 50;

// ============================================================================
// Trackers
// ============================================================================

/// Where a registration is currently bound
struct Binding {
    broker: String,
    manager_id: u64,
    slot: usize,
}

pub(crate) struct ProducerTracker {
    pub(crate) stream: String,
    pub(crate) producer: Arc<dyn ManagedProducer>,
    cancelled: AtomicBool,
    binding: Mutex<Option<Binding>>,
}

pub(crate) struct ConsumerTracker {
    pub(crate) stream: String,
    pub(crate) consumer: Arc<dyn CommittingConsumer>,
    cancelled: AtomicBool,
    binding: Mutex<Option<Binding>>,
}

/// A registration displaced by a failure event, or being placed.
///
/// Holds a non-owning reference to the tracker; the user owns the producer
/// or consumer behind it.
#[derive(Clone)]
pub(crate) enum Affected {
    Producer(Arc<ProducerTracker>),
    Consumer(Arc<ConsumerTracker>),
}

impl Affected {
    pub(crate) fn stream(&self) -> &str {
        match self {
            Affected::Producer(tracker) => &tracker.stream,
            Affected::Consumer(tracker) => &tracker.stream,
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        match self {
            Affected::Producer(tracker) => tracker.cancelled.load(Ordering::SeqCst),
            Affected::Consumer(tracker) => tracker.cancelled.load(Ordering::SeqCst),
        }
    }

    /// Flip the cancelled flag; returns the previous value
    fn set_cancelled(&self) -> bool {
        match self {
            Affected::Producer(tracker) => tracker.cancelled.swap(true, Ordering::SeqCst),
            Affected::Consumer(tracker) => tracker.cancelled.swap(true, Ordering::SeqCst),
        }
    }

    fn take_binding(&self) -> Option<Binding> {
        match self {
            Affected::Producer(tracker) => tracker.binding.lock().take(),
            Affected::Consumer(tracker) => tracker.binding.lock().take(),
        }
    }

    pub(crate) fn unavailable(&self) {
        match self {
            Affected::Producer(tracker) => tracker.producer.unavailable(),
            Affected::Consumer(tracker) => tracker.consumer.unavailable(),
        }
    }

    /// Bind hooks: publishing id (producers only), then the connection
    pub(crate) fn assign(&self, connection: Arc<dyn Connection>, publishing_id: Option<u8>) {
        match self {
            Affected::Producer(tracker) => {
                if let Some(publishing_id) = publishing_id {
                    tracker.producer.set_publisher_id(publishing_id);
                }
                tracker.producer.set_client(connection);
            }
            Affected::Consumer(tracker) => tracker.consumer.set_client(connection),
        }
    }

    pub(crate) fn running(&self) {
        match self {
            Affected::Producer(tracker) => tracker.producer.running(),
            Affected::Consumer(tracker) => tracker.consumer.running(),
        }
    }

    /// Identity comparison (same tracker object)
    pub(crate) fn same(&self, other: &Affected) -> bool {
        match (self, other) {
            (Affected::Producer(a), Affected::Producer(b)) => Arc::ptr_eq(a, b),
            (Affected::Consumer(a), Affected::Consumer(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ============================================================================
// Managers and pools
// ============================================================================

/// One physical connection plus its two bounded slot arrays
struct Manager {
    id: u64,
    connection: Arc<dyn Connection>,
    producers: Vec<Option<Arc<ProducerTracker>>>,
    committing_consumers: Vec<Option<Arc<ConsumerTracker>>>,
}

impl Manager {
    fn new(id: u64, connection: Arc<dyn Connection>) -> Self {
        Self {
            id,
            connection,
            producers: (0..MAX_PRODUCERS_PER_CLIENT).map(|_| None).collect(),
            committing_consumers: (0..MAX_COMMITTING_CONSUMERS_PER_CLIENT)
                .map(|_| None)
                .collect(),
        }
    }

    fn producer_slots_used(&self) -> usize {
        self.producers.iter().flatten().count()
    }

    fn committing_consumer_slots_used(&self) -> usize {
        self.committing_consumers.iter().flatten().count()
    }

    fn occupancy(&self) -> usize {
        self.producer_slots_used() + self.committing_consumer_slots_used()
    }

    /// Claim the lowest free slot for `target`, if any
    fn try_allocate(
        &mut self,
        broker: &str,
        target: &Affected,
    ) -> Option<(Arc<dyn Connection>, Option<u8>)> {
        match target {
            Affected::Producer(tracker) => {
                let slot = self.producers.iter().position(Option::is_none)?;
                self.producers[slot] = Some(tracker.clone());
                *tracker.binding.lock() = Some(Binding {
                    broker: broker.to_string(),
                    manager_id: self.id,
                    slot,
                });
                debug!(broker, slot, stream = %tracker.stream, "allocated producer slot");
                Some((self.connection.clone(), Some(slot as u8)))
            }
            Affected::Consumer(tracker) => {
                let slot = self.committing_consumers.iter().position(Option::is_none)?;
                self.committing_consumers[slot] = Some(tracker.clone());
                *tracker.binding.lock() = Some(Binding {
                    broker: broker.to_string(),
                    manager_id: self.id,
                    slot,
                });
                debug!(broker, slot, stream = %tracker.stream, "allocated committing-consumer slot");
                Some((self.connection.clone(), None))
            }
        }
    }

    fn clear_slot(&mut self, target: &Affected, slot: usize) {
        match target {
            Affected::Producer(_) => {
                self.producers[slot] = None;
                debug!(slot, "released producer slot");
            }
            Affected::Consumer(_) => {
                self.committing_consumers[slot] = None;
                debug!(slot, "released committing-consumer slot");
            }
        }
    }

    /// Take every bound registration, clearing its binding
    fn drain_bound(&mut self) -> Vec<Affected> {
        let mut bound = Vec::new();
        for slot in self.producers.iter_mut() {
            if let Some(tracker) = slot.take() {
                tracker.binding.lock().take();
                bound.push(Affected::Producer(tracker));
            }
        }
        for slot in self.committing_consumers.iter_mut() {
            if let Some(tracker) = slot.take() {
                tracker.binding.lock().take();
                bound.push(Affected::Consumer(tracker));
            }
        }
        bound
    }

    /// Take the bound registrations for one stream, clearing their bindings
    fn unbind_stream(&mut self, stream: &str) -> Vec<Affected> {
        let mut displaced = Vec::new();
        for slot in self.producers.iter_mut() {
            if slot.as_ref().is_some_and(|t| t.stream == stream) {
                if let Some(tracker) = slot.take() {
                    tracker.binding.lock().take();
                    displaced.push(Affected::Producer(tracker));
                }
            }
        }
        for slot in self.committing_consumers.iter_mut() {
            if slot.as_ref().is_some_and(|t| t.stream == stream) {
                if let Some(tracker) = slot.take() {
                    tracker.binding.lock().take();
                    displaced.push(Affected::Consumer(tracker));
                }
            }
        }
        displaced
    }
}

/// Managers for one broker, scanned in insertion order so tenants pack
/// densely and teardown proceeds from the tail
struct Pool {
    broker: Broker,
    managers: Vec<Manager>,
}

impl Pool {
    fn new(broker: Broker) -> Self {
        Self {
            broker,
            managers: Vec::new(),
        }
    }
}

// ============================================================================
// Coordinator state
// ============================================================================

pub(crate) struct CoordState {
    pools: HashMap<String, Pool>,
    /// Every running recovery job, by id
    jobs: HashMap<u64, tokio::task::JoinHandle<()>>,
    /// Pending set of the in-flight topology job per stream; successive
    /// metadata events for the same stream join it instead of spawning a
    /// second job
    topology_jobs: HashMap<String, PendingSet>,
}

pub(crate) struct Inner {
    env: Arc<dyn Environment>,
    client_factory: Arc<dyn ClientFactory>,
    state: Mutex<CoordState>,
    closed: AtomicBool,
    manager_ids: AtomicU64,
    job_ids: AtomicU64,
}

fn allocate_in_pool(
    state: &mut CoordState,
    key: &str,
    target: &Affected,
) -> Option<(Arc<dyn Connection>, Option<u8>)> {
    let pool = state.pools.get_mut(key)?;
    pool.managers
        .iter_mut()
        .find_map(|manager| manager.try_allocate(key, target))
}

/// Release `target`'s slot if still bound; returns the connection of a
/// manager torn down because it became empty
fn unbind_target(state: &mut CoordState, target: &Affected) -> Option<Arc<dyn Connection>> {
    let binding = target.take_binding()?;
    let pool = state.pools.get_mut(&binding.broker)?;
    let index = pool
        .managers
        .iter()
        .position(|manager| manager.id == binding.manager_id)?;
    pool.managers[index].clear_slot(target, binding.slot);
    let mut torn_down = None;
    if pool.managers[index].occupancy() == 0 {
        torn_down = Some(pool.managers.remove(index).connection);
    }
    if pool.managers.is_empty() {
        state.pools.remove(&binding.broker);
    }
    torn_down
}

impl Inner {
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            Err(Error::IllegalState("coordinator is closed".into()))
        } else {
            Ok(())
        }
    }

    pub(crate) fn env(&self) -> &Arc<dyn Environment> {
        &self.env
    }

    /// Resolve the current leader for a stream, with registration-time
    /// error mapping
    pub(crate) async fn leader_for(&self, stream: &str) -> Result<Broker> {
        let mut records = self.env.locator().metadata(stream).await?;
        let Some(record) = records.remove(stream) else {
            return Err(Error::StreamDoesNotExist(stream.to_string()));
        };
        match record.response_code {
            ResponseCode::Ok => {}
            ResponseCode::StreamDoesNotExist => {
                return Err(Error::StreamDoesNotExist(stream.to_string()));
            }
            code => {
                return Err(Error::IllegalState(format!(
                    "metadata request for stream '{stream}' failed: {code:?}"
                )));
            }
        }
        record
            .leader
            .ok_or_else(|| Error::IllegalState(format!("no leader available for stream '{stream}'")))
    }

    /// Bind `target` to a manager of `leader`'s pool, opening a connection
    /// if every existing manager is full.
    ///
    /// Returns `Ok(None)` when the registration was cancelled before a slot
    /// could be claimed. Neither the state lock nor any other lock is held
    /// across the connection handshake.
    pub(crate) async fn place(
        self: &Arc<Self>,
        target: &Affected,
        leader: &Broker,
    ) -> Result<Option<(Arc<dyn Connection>, Option<u8>)>> {
        let key = leader.address();
        {
            let mut state = self.state.lock();
            self.ensure_open()?;
            if target.is_cancelled() {
                return Ok(None);
            }
            if let Some(placed) = allocate_in_pool(&mut state, &key, target) {
                return Ok(Some(placed));
            }
        }

        let manager_id = self.manager_ids.fetch_add(1, Ordering::Relaxed);
        let parameters = self.manager_parameters(leader, manager_id);
        let connection = self.client_factory.create(parameters).await?;
        info!(broker = %key, "opened producer connection");

        let mut spare = None;
        let placed = {
            let mut state = self.state.lock();
            if self.is_closed() {
                drop(state);
                connection.close();
                return Err(Error::IllegalState("coordinator is closed".into()));
            }
            if target.is_cancelled() {
                drop(state);
                connection.close();
                return Ok(None);
            }
            match allocate_in_pool(&mut state, &key, target) {
                Some(placed) => {
                    // capacity freed up while we were connecting
                    spare = Some(connection);
                    placed
                }
                None => {
                    state
                        .pools
                        .entry(key.clone())
                        .or_insert_with(|| Pool::new(leader.clone()))
                        .managers
                        .push(Manager::new(manager_id, connection));
                    match allocate_in_pool(&mut state, &key, target) {
                        Some(placed) => placed,
                        None => {
                            return Err(Error::IllegalState(
                                "no free slot on a freshly opened connection".into(),
                            ));
                        }
                    }
                }
            }
        };
        if let Some(spare) = spare {
            spare.close();
        }
        Ok(Some(placed))
    }

    /// Parameters for a new manager connection, with its upward listeners
    /// bound to this coordinator
    fn manager_parameters(self: &Arc<Self>, leader: &Broker, manager_id: u64) -> ClientParameters {
        let weak = Arc::downgrade(self);
        let shutdown: ShutdownListener = Arc::new(move |reason| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_connection_shutdown(manager_id, reason);
            }
        });
        let weak = Arc::downgrade(self);
        let metadata: MetadataListener = Arc::new(move |stream, _code| {
            if let Some(inner) = weak.upgrade() {
                inner.handle_topology_change(stream);
            }
        });
        self.env
            .client_parameters()
            .host(leader.host.clone())
            .port(leader.port)
            .shutdown_listener(shutdown)
            .metadata_listener(metadata)
    }

    /// Transport callback: a manager's connection terminated
    fn handle_connection_shutdown(self: &Arc<Self>, manager_id: u64, reason: ShutdownReason) {
        if !reason.is_unexpected() || self.is_closed() {
            return;
        }
        let affected = {
            let mut state = self.state.lock();
            let mut affected = Vec::new();
            let mut emptied = None;
            for (key, pool) in state.pools.iter_mut() {
                if let Some(index) = pool.managers.iter().position(|m| m.id == manager_id) {
                    let mut manager = pool.managers.remove(index);
                    affected = manager.drain_bound();
                    if pool.managers.is_empty() {
                        emptied = Some(key.clone());
                    }
                    break;
                }
            }
            if let Some(key) = emptied {
                state.pools.remove(&key);
            }
            affected
        };
        if affected.is_empty() {
            return;
        }
        warn!(?reason, displaced = affected.len(), "producer connection lost, scheduling recovery");
        for entry in &affected {
            if !entry.is_cancelled() {
                recovery::shield_hooks(entry.stream(), || entry.unavailable());
            }
        }
        let pending: PendingSet = Arc::new(Mutex::new(affected));
        let mut state = self.state.lock();
        if self.is_closed() {
            return;
        }
        let policy = self.env.recovery_back_off_delay_policy();
        self.spawn_recovery(&mut state, pending, policy, RecoveryKind::ConnectionLoss);
    }

    /// Transport callback: the broker announced a topology change for a
    /// stream
    fn handle_topology_change(self: &Arc<Self>, stream: &str) {
        if self.is_closed() {
            return;
        }
        let (displaced, torn_down) = {
            let mut state = self.state.lock();
            let mut displaced = Vec::new();
            let mut torn_down = Vec::new();
            for pool in state.pools.values_mut() {
                for manager in pool.managers.iter_mut() {
                    displaced.extend(manager.unbind_stream(stream));
                }
                let mut index = 0;
                while index < pool.managers.len() {
                    if pool.managers[index].occupancy() == 0 {
                        torn_down.push(pool.managers.remove(index).connection);
                    } else {
                        index += 1;
                    }
                }
            }
            state.pools.retain(|_, pool| !pool.managers.is_empty());
            (displaced, torn_down)
        };
        for connection in torn_down {
            connection.close();
        }
        if displaced.is_empty() {
            return;
        }
        warn!(stream, displaced = displaced.len(), "stream topology changed, scheduling recovery");
        for entry in &displaced {
            if !entry.is_cancelled() {
                recovery::shield_hooks(entry.stream(), || entry.unavailable());
            }
        }
        let mut state = self.state.lock();
        if self.is_closed() {
            return;
        }
        if let Some(pending) = state.topology_jobs.get(stream) {
            // a recovery job for this stream is already pending; the newly
            // displaced registrations join it
            pending.lock().extend(displaced);
            return;
        }
        let pending: PendingSet = Arc::new(Mutex::new(displaced));
        state.topology_jobs.insert(stream.to_string(), pending.clone());
        let policy = self.env.topology_update_back_off_delay_policy();
        let kind = RecoveryKind::Topology {
            stream: stream.to_string(),
        };
        self.spawn_recovery(&mut state, pending, policy, kind);
    }

    fn spawn_recovery(
        self: &Arc<Self>,
        state: &mut CoordState,
        pending: PendingSet,
        policy: BackOffDelayPolicy,
        kind: RecoveryKind,
    ) {
        let job_id = self.job_ids.fetch_add(1, Ordering::Relaxed);
        let handle = self.env.scheduler().spawn(recovery::run(
            Arc::downgrade(self),
            job_id,
            pending,
            policy,
            kind,
        ));
        state.jobs.insert(job_id, handle);
    }

    /// If the pending set is empty, unregister the job and report done
    pub(crate) fn try_finish_job(&self, job_id: u64, pending: &PendingSet, kind: &RecoveryKind) -> bool {
        let mut state = self.state.lock();
        let done = pending.lock().is_empty();
        if done {
            state.jobs.remove(&job_id);
            if let RecoveryKind::Topology { stream } = kind {
                state.topology_jobs.remove(stream);
            }
        }
        done
    }

    /// Drain the pending set and unregister the job (terminal failure)
    pub(crate) fn drain_job(&self, job_id: u64, pending: &PendingSet, kind: &RecoveryKind) -> Vec<Affected> {
        let mut state = self.state.lock();
        let drained = std::mem::take(&mut *pending.lock());
        state.jobs.remove(&job_id);
        if let RecoveryKind::Topology { stream } = kind {
            state.topology_jobs.remove(stream);
        }
        drained
    }

    /// Take every pending entry for one stream. Serialized with coalescing
    /// additions via the state lock.
    pub(crate) fn take_stream_entries(&self, pending: &PendingSet, stream: &str) -> Vec<Affected> {
        let _state = self.state.lock();
        let mut guard = pending.lock();
        let mut taken = Vec::new();
        let mut index = 0;
        while index < guard.len() {
            if guard[index].stream() == stream {
                taken.push(guard.remove(index));
            } else {
                index += 1;
            }
        }
        taken
    }

    fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let (jobs, connections) = {
            let mut state = self.state.lock();
            let jobs: Vec<_> = state.jobs.drain().map(|(_, handle)| handle).collect();
            state.topology_jobs.clear();
            let mut connections = Vec::new();
            for (_, pool) in state.pools.drain() {
                for mut manager in pool.managers {
                    manager.drain_bound();
                    connections.push(manager.connection);
                }
            }
            (jobs, connections)
        };
        for job in jobs {
            job.abort();
        }
        info!(connections = connections.len(), "closing producers coordinator");
        for connection in connections {
            connection.close();
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Coordinates producer and committing-consumer placement over a pool of
/// physical connections, one pool per stream leader.
///
/// See the module docs for the lifecycle; [`crate::recovery`] for what
/// happens when a connection dies or a stream moves.
pub struct ProducersCoordinator {
    inner: Arc<Inner>,
}

impl ProducersCoordinator {
    pub fn new(env: Arc<dyn Environment>, client_factory: Arc<dyn ClientFactory>) -> Self {
        Self {
            inner: Arc::new(Inner {
                env,
                client_factory,
                state: Mutex::new(CoordState {
                    pools: HashMap::new(),
                    jobs: HashMap::new(),
                    topology_jobs: HashMap::new(),
                }),
                closed: AtomicBool::new(false),
                manager_ids: AtomicU64::new(0),
                job_ids: AtomicU64::new(0),
            }),
        }
    }

    /// Register a producer against a stream.
    ///
    /// Looks up the stream leader, claims the lowest free producer slot on
    /// the leader's pool (opening a connection if needed), then calls
    /// `set_publisher_id` and `set_client` on the producer.
    ///
    /// # Errors
    ///
    /// [`Error::StreamDoesNotExist`] when the stream is unknown or deleted;
    /// [`Error::IllegalState`] for any other non-OK metadata response, a
    /// missing leader, or a closed coordinator. On error the producer is
    /// left untouched.
    pub async fn register_producer(
        &self,
        producer: Arc<dyn ManagedProducer>,
        stream: &str,
    ) -> Result<CleanupHandle> {
        self.inner.ensure_open()?;
        let leader = self.inner.leader_for(stream).await?;
        let tracker = Arc::new(ProducerTracker {
            stream: stream.to_string(),
            producer,
            cancelled: AtomicBool::new(false),
            binding: Mutex::new(None),
        });
        let target = Affected::Producer(tracker);
        match self.inner.place(&target, &leader).await? {
            Some((connection, publishing_id)) => target.assign(connection, publishing_id),
            None => {
                return Err(Error::IllegalState(
                    "registration cancelled before placement".into(),
                ));
            }
        }
        Ok(CleanupHandle {
            inner: Arc::downgrade(&self.inner),
            target,
        })
    }

    /// Register a consumer's offset-commit attachment against a stream.
    ///
    /// Same placement and errors as
    /// [`register_producer`](Self::register_producer), on the
    /// committing-consumer slot array and without a publishing id.
    pub async fn register_committing_consumer(
        &self,
        consumer: Arc<dyn CommittingConsumer>,
        stream: &str,
    ) -> Result<CleanupHandle> {
        self.inner.ensure_open()?;
        let leader = self.inner.leader_for(stream).await?;
        let tracker = Arc::new(ConsumerTracker {
            stream: stream.to_string(),
            consumer,
            cancelled: AtomicBool::new(false),
            binding: Mutex::new(None),
        });
        let target = Affected::Consumer(tracker);
        match self.inner.place(&target, &leader).await? {
            Some((connection, _)) => target.assign(connection, None),
            None => {
                return Err(Error::IllegalState(
                    "registration cancelled before placement".into(),
                ));
            }
        }
        Ok(CleanupHandle {
            inner: Arc::downgrade(&self.inner),
            target,
        })
    }

    /// Number of distinct broker pools currently resident
    pub fn pool_size(&self) -> usize {
        self.inner.state.lock().pools.len()
    }

    /// Total live manager connections across all pools
    pub fn client_count(&self) -> usize {
        self.inner
            .state
            .lock()
            .pools
            .values()
            .map(|pool| pool.managers.len())
            .sum()
    }

    /// Diagnostic snapshot; serializes to JSON
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        let state = self.inner.state.lock();
        let mut pools: Vec<PoolSnapshot> = state
            .pools
            .values()
            .map(|pool| PoolSnapshot {
                broker: pool.broker.address(),
                clients: pool
                    .managers
                    .iter()
                    .map(|manager| ClientSnapshot {
                        producer_slots_used: manager.producer_slots_used(),
                        committing_consumer_slots_used: manager.committing_consumer_slots_used(),
                    })
                    .collect(),
            })
            .collect();
        pools.sort_by(|a, b| a.broker.cmp(&b.broker));
        CoordinatorSnapshot { pools }
    }

    /// Close every pooled connection and cancel pending recovery jobs.
    /// Idempotent; later registrations fail with [`Error::IllegalState`].
    pub fn close(&self) {
        self.inner.close();
    }
}

impl Drop for ProducersCoordinator {
    fn drop(&mut self) {
        self.inner.close();
    }
}

/// Releases a registration's slot; returned by the register calls.
///
/// Safe to invoke at any time, any number of times, including while the
/// registration sits in a recovery pending set (it is excised and never
/// rebound).
pub struct CleanupHandle {
    inner: Weak<Inner>,
    target: Affected,
}

impl CleanupHandle {
    pub fn cancel(&self) {
        let Some(inner) = self.inner.upgrade() else {
            self.target.set_cancelled();
            return;
        };
        let torn_down = {
            let mut state = inner.state.lock();
            if self.target.set_cancelled() {
                return;
            }
            unbind_target(&mut state, &self.target)
        };
        if let Some(connection) = torn_down {
            connection.close();
        }
    }
}

// ============================================================================
// Monitoring snapshot
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CoordinatorSnapshot {
    pub pools: Vec<PoolSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct PoolSnapshot {
    pub broker: String,
    pub clients: Vec<ClientSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct ClientSnapshot {
    pub producer_slots_used: usize,
    pub committing_consumer_slots_used: usize,
}

impl fmt::Display for CoordinatorSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => Err(fmt::Error),
        }
    }
}

//! 实时 feed
//!
//! 后台线程按固定间隔产生无时间戳事件，经有界 async-channel 交给 dispatcher。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, OnceLock, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use async_channel::{Receiver, Sender, TryRecvError};
use contracts::{
    ContractError, DispatchPriority, EventCallback, FeedEvent, Subject, SubjectId, Timestamp,
};
use tracing::{debug, trace, warn};

use crate::error::FeedError;
use crate::listeners::Listeners;
use crate::metrics::FeedMetrics;

/// Realtime feed configuration
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Pause between two produced events
    pub interval: Duration,

    /// Events to produce before closing the channel (None = until stopped)
    pub count: Option<u64>,

    /// Bounded channel capacity; the producer blocks while it is full
    pub channel_capacity: usize,

    /// Payload attached to every event
    pub payload: serde_json::Value,

    /// How long `dispatch` waits on an empty channel before reporting no event
    pub poll_timeout: Duration,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(10),
            count: None,
            channel_capacity: 64,
            payload: serde_json::Value::Null,
            poll_timeout: Duration::from_millis(50),
        }
    }
}

/// Wakes a dispatcher waiting on an empty channel.
#[derive(Default)]
struct Doorbell {
    lock: Mutex<()>,
    ready: Condvar,
}

impl Doorbell {
    fn ring(&self) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.ready.notify_all();
    }

    /// Block until `done` holds or `deadline` passes.
    fn wait_until(&self, deadline: Instant, done: impl Fn() -> bool) {
        let mut guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !done() {
            let now = Instant::now();
            if now >= deadline {
                return;
            }
            guard = self
                .ready
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }
}

/// Feed whose events have no timestamp and are produced by a background thread.
///
/// Always eligible for dispatch. Exhausted once the producer has finished (or
/// the feed was stopped) and every produced event was dispatched. A dispatch
/// that finds the channel empty waits up to `poll_timeout` for the producer.
pub struct RealtimeFeed {
    id: SubjectId,
    priority: DispatchPriority,
    config: RealtimeConfig,
    running: Arc<AtomicBool>,
    receiver: OnceLock<Receiver<FeedEvent>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    doorbell: Arc<Doorbell>,
    listeners: Listeners,
    metrics: Arc<FeedMetrics>,
}

impl RealtimeFeed {
    pub fn new(id: impl Into<SubjectId>, config: RealtimeConfig) -> Self {
        Self {
            id: id.into(),
            priority: DispatchPriority::Last,
            config,
            running: Arc::new(AtomicBool::new(false)),
            receiver: OnceLock::new(),
            worker: Mutex::new(None),
            doorbell: Arc::new(Doorbell::default()),
            listeners: Listeners::default(),
            metrics: Arc::new(FeedMetrics::new()),
        }
    }

    pub fn with_priority(mut self, priority: DispatchPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Register a listener for dispatched events
    pub fn listen(&self, callback: EventCallback) {
        self.listeners.add(callback);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Whether the producer thread is still expected to send
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Events waiting in the channel
    pub fn queued(&self) -> usize {
        self.receiver.get().map_or(0, Receiver::len)
    }

    pub fn metrics(&self) -> Arc<FeedMetrics> {
        Arc::clone(&self.metrics)
    }

    fn receiver(&self) -> Result<&Receiver<FeedEvent>, FeedError> {
        self.receiver.get().ok_or_else(|| FeedError::NotStarted {
            feed_id: self.id.to_string(),
        })
    }

    fn spawn_producer(&self, tx: Sender<FeedEvent>) -> Result<JoinHandle<()>, FeedError> {
        let producer = Producer {
            id: self.id.clone(),
            config: self.config.clone(),
            running: Arc::clone(&self.running),
            metrics: Arc::clone(&self.metrics),
            doorbell: Arc::clone(&self.doorbell),
            tx,
        };

        thread::Builder::new()
            .name(format!("feed-{}", self.id))
            .spawn(move || producer.run())
            .map_err(|source| FeedError::ThreadSpawn {
                feed_id: self.id.to_string(),
                source,
            })
    }
}

struct Producer {
    id: SubjectId,
    config: RealtimeConfig,
    running: Arc<AtomicBool>,
    metrics: Arc<FeedMetrics>,
    doorbell: Arc<Doorbell>,
    tx: Sender<FeedEvent>,
}

impl Producer {
    fn run(self) {
        debug!(
            feed_id = %self.id,
            interval_ms = self.config.interval.as_millis() as u64,
            count = ?self.config.count,
            "realtime producer started"
        );

        let mut sequence: u64 = 0;
        while self.running.load(Ordering::Relaxed) {
            if self.config.count.is_some_and(|count| sequence >= count) {
                break;
            }
            sequence += 1;

            let event = FeedEvent {
                source: self.id.clone(),
                sequence,
                timestamp: None,
                payload: self.config.payload.clone(),
            };

            // Blocks while the channel is full; stop() closes it to wake us.
            if self.tx.send_blocking(event).is_err() {
                debug!(feed_id = %self.id, "realtime channel closed");
                break;
            }
            self.doorbell.ring();
            self.metrics.record_produced();
            observability::record_event_produced(&self.id);
            trace!(feed_id = %self.id, sequence, "realtime event produced");

            if !self.config.interval.is_zero() {
                thread::sleep(self.config.interval);
            }
        }

        self.running.store(false, Ordering::Relaxed);
        self.tx.close();
        self.doorbell.ring();
        debug!(feed_id = %self.id, produced = sequence, "realtime producer stopped");
    }
}

impl Subject for RealtimeFeed {
    fn id(&self) -> &str {
        &self.id
    }

    fn dispatch_priority(&self) -> DispatchPriority {
        self.priority
    }

    fn is_exhausted(&self) -> bool {
        match self.receiver.get() {
            Some(rx) => rx.is_closed() && rx.is_empty(),
            None => false,
        }
    }

    fn peek_timestamp(&self) -> Result<Option<Timestamp>, ContractError> {
        Ok(None)
    }

    fn dispatch(&self) -> Result<bool, ContractError> {
        let rx = self.receiver()?;
        let mut polled = rx.try_recv();
        if matches!(polled, Err(TryRecvError::Empty)) && !self.config.poll_timeout.is_zero() {
            let deadline = Instant::now() + self.config.poll_timeout;
            self.doorbell
                .wait_until(deadline, || !rx.is_empty() || rx.is_closed());
            polled = rx.try_recv();
        }

        let event = match polled {
            Ok(event) => event,
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => {
                self.metrics.record_empty_poll();
                return Ok(false);
            }
        };

        self.listeners.notify(&event);
        self.metrics.record_dispatched();
        observability::record_event_dispatched(&self.id, true);

        Ok(true)
    }

    fn start(&self) -> Result<(), ContractError> {
        let (tx, rx) = async_channel::bounded(self.config.channel_capacity.max(1));
        if self.receiver.set(rx).is_err() {
            return Err(FeedError::AlreadyStarted {
                feed_id: self.id.to_string(),
            }
            .into());
        }

        self.running.store(true, Ordering::Relaxed);
        let handle = match self.spawn_producer(tx) {
            Ok(handle) => handle,
            Err(err) => {
                self.running.store(false, Ordering::Relaxed);
                if let Some(rx) = self.receiver.get() {
                    rx.close();
                }
                return Err(err.into());
            }
        };
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        debug!(feed_id = %self.id, capacity = self.config.channel_capacity, "realtime feed started");
        Ok(())
    }

    fn stop(&self) -> Result<(), ContractError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(rx) = self.receiver.get() {
            rx.close();
        }
        self.doorbell.ring();
        debug!(feed_id = %self.id, queued = self.queued(), "realtime feed stopped");
        Ok(())
    }

    fn join(&self) -> Result<(), ContractError> {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        let Some(handle) = handle else {
            return Ok(());
        };
        if handle.join().is_err() {
            warn!(feed_id = %self.id, "realtime producer panicked");
            return Err(FeedError::ProducerPanicked {
                feed_id: self.id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

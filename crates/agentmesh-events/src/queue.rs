use crate::event::{Event, Priority};
use serde::Serialize;
use std::collections::VecDeque;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Default capacity of an [`EventQueue`].
pub const DEFAULT_CAPACITY: usize = 1000;

/// The three FIFO lanes plus the counters that must stay consistent with
/// them. Everything in here is mutated under one lock guard.
#[derive(Debug, Default)]
struct Lanes {
    high: VecDeque<Event>,
    normal: VecDeque<Event>,
    low: VecDeque<Event>,
    events_processed: u64,
    events_dropped: u64,
}

impl Lanes {
    fn total_size(&self) -> usize {
        self.high.len() + self.normal.len() + self.low.len()
    }
}

/// Point-in-time snapshot of an [`EventQueue`].
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    /// Events currently queued across all lanes.
    pub total_size: usize,
    /// Events in the high-priority lane.
    pub high_priority_size: usize,
    /// Events in the normal-priority lane.
    pub normal_priority_size: usize,
    /// Events in the low-priority lane.
    pub low_priority_size: usize,
    /// Capacity across all lanes combined.
    pub max_size: usize,
    /// Events handed to consumers since construction.
    pub events_processed: u64,
    /// Events dropped on overflow since construction.
    pub events_dropped: u64,
    /// True when no lane holds an event.
    pub is_empty: bool,
    /// True when the queue is at capacity.
    pub is_full: bool,
}

/// A bounded, priority-ordered mailbox for agent events.
///
/// Three internal FIFO lanes (high / normal / low); `get` drains strictly
/// high → normal → low. A `put` against a full queue drops the event and
/// increments a counter — the producer gets no signal. A sustained burst of
/// high-priority puts can starve the other lanes; there is no aging.
///
/// One mutex guards lane contents *and* counters for the whole body of
/// every operation, so size and drop accounting stay consistent under
/// concurrent producers.
#[derive(Debug)]
pub struct EventQueue {
    max_size: usize,
    lanes: Mutex<Lanes>,
}

impl EventQueue {
    /// Creates a queue holding at most `max_size` events across all lanes.
    pub fn new(max_size: usize) -> Self {
        info!(max_size, "event queue created");
        Self {
            max_size,
            lanes: Mutex::new(Lanes::default()),
        }
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.max_size
    }

    /// Enqueues an event into the lane named by its priority.
    ///
    /// If the queue is already at capacity the event is dropped and the
    /// drop counter is incremented; the caller is not notified.
    pub async fn put(&self, event: Event) {
        let mut lanes = self.lanes.lock().await;
        if lanes.total_size() >= self.max_size {
            lanes.events_dropped += 1;
            warn!(event_id = %event.event_id, "event queue full, dropping event");
            return;
        }

        debug!(event_id = %event.event_id, priority = %event.priority, "event enqueued");
        match event.priority {
            Priority::High => lanes.high.push_back(event),
            Priority::Normal => lanes.normal.push_back(event),
            Priority::Low => lanes.low.push_back(event),
        }
    }

    /// Dequeues the next event, high lane first, FIFO within a lane.
    ///
    /// Non-blocking poll: returns `None` immediately when all lanes are
    /// empty.
    pub async fn get(&self) -> Option<Event> {
        let mut lanes = self.lanes.lock().await;
        let event = lanes
            .high
            .pop_front()
            .or_else(|| lanes.normal.pop_front())
            .or_else(|| lanes.low.pop_front());

        if let Some(event) = event {
            lanes.events_processed += 1;
            debug!(event_id = %event.event_id, "event dequeued");
            Some(event)
        } else {
            None
        }
    }

    /// Returns a copy of the event `get` would return next, without
    /// removing it.
    pub async fn peek(&self) -> Option<Event> {
        let lanes = self.lanes.lock().await;
        lanes
            .high
            .front()
            .or_else(|| lanes.normal.front())
            .or_else(|| lanes.low.front())
            .cloned()
    }

    /// Empties all lanes. Counters are left intact.
    pub async fn clear(&self) {
        let mut lanes = self.lanes.lock().await;
        lanes.high.clear();
        lanes.normal.clear();
        lanes.low.clear();
        info!("event queue cleared");
    }

    /// Returns copies of every queued event with the given type tag,
    /// scanning all lanes without removing anything.
    pub async fn get_events_by_type(&self, event_type: &str) -> Vec<Event> {
        let lanes = self.lanes.lock().await;
        lanes
            .high
            .iter()
            .chain(lanes.normal.iter())
            .chain(lanes.low.iter())
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }

    /// Number of events currently queued across all lanes.
    pub async fn size(&self) -> usize {
        self.lanes.lock().await.total_size()
    }

    /// True when no lane holds an event.
    pub async fn is_empty(&self) -> bool {
        self.size().await == 0
    }

    /// True when the queue is at capacity.
    pub async fn is_full(&self) -> bool {
        self.size().await >= self.max_size
    }

    /// Events dropped on overflow since construction.
    pub async fn dropped_count(&self) -> u64 {
        self.lanes.lock().await.events_dropped
    }

    /// A consistent snapshot of lane sizes and counters.
    pub async fn stats(&self) -> QueueStats {
        let lanes = self.lanes.lock().await;
        let total_size = lanes.total_size();
        QueueStats {
            total_size,
            high_priority_size: lanes.high.len(),
            normal_priority_size: lanes.normal.len(),
            low_priority_size: lanes.low.len(),
            max_size: self.max_size,
            events_processed: lanes.events_processed,
            events_dropped: lanes.events_dropped,
            is_empty: total_size == 0,
            is_full: total_size >= self.max_size,
        }
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

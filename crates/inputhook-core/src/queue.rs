//! Hand-off from OS callback context to the consumer's polling point.

use crate::event::NormalizedInputEvent;
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};

/// Producer side of a [`DeliveryQueue`]. Cheap to clone, safe to use from any
/// thread, never blocks.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: Sender<NormalizedInputEvent>,
}

impl EventSink {
    /// Append an event. If the queue is gone the event is silently dropped;
    /// this runs inside OS callbacks where there is nobody to report to.
    pub fn enqueue(&self, event: NormalizedInputEvent) {
        let _ = self.tx.send(event);
    }
}

/// Unbounded FIFO of normalized events, many producers and one consumer.
#[derive(Debug)]
pub struct DeliveryQueue {
    tx: Sender<NormalizedInputEvent>,
    rx: Receiver<NormalizedInputEvent>,
}

impl DeliveryQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// A new producer handle.
    pub fn sink(&self) -> EventSink {
        EventSink {
            tx: self.tx.clone(),
        }
    }

    /// Enqueue from the owning side.
    pub fn enqueue(&self, event: NormalizedInputEvent) {
        let _ = self.tx.send(event);
    }

    /// Take the oldest event, if any (non-blocking).
    pub fn try_dequeue(&self) -> Option<NormalizedInputEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Take every pending event in enqueue order.
    pub fn drain_all(&self) -> Vec<NormalizedInputEvent> {
        self.rx.try_iter().collect()
    }

    /// Hand every pending event to `f` in enqueue order; returns how many.
    ///
    /// Events enqueued while this runs are delivered too, so a producer that
    /// never pauses keeps this loop busy.
    pub fn drain_into<F>(&self, mut f: F) -> usize
    where
        F: FnMut(NormalizedInputEvent),
    {
        let mut count = 0;
        while let Some(event) = self.try_dequeue() {
            f(event);
            count += 1;
        }
        count
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Discard every pending event; returns how many were dropped.
    pub fn clear(&self) -> usize {
        self.rx.try_iter().count()
    }
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use bytes::Bytes;

use super::ring_buffer::RingBuffer;
use crate::error::{QueueError, Result};

/// A named FIFO channel: one ring buffer behind its own lock.
pub struct Channel {
    name: String,
    ring: Mutex<RingBuffer>,
    stats: ChannelStats,
}

#[derive(Debug, Default)]
pub struct ChannelStats {
    enqueued_total: AtomicU64,
    dequeued_total: AtomicU64,
    rejected_full: AtomicU64,
}

impl ChannelStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueued_total(&self) -> u64 {
        self.enqueued_total.load(Ordering::SeqCst)
    }

    pub fn dequeued_total(&self) -> u64 {
        self.dequeued_total.load(Ordering::SeqCst)
    }

    /// Adds refused because the channel was full.
    pub fn rejected_full(&self) -> u64 {
        self.rejected_full.load(Ordering::SeqCst)
    }
}

impl Channel {
    pub fn new(name: String, slot_size: usize, capacity: usize) -> Result<Self> {
        Ok(Self {
            name,
            ring: Mutex::new(RingBuffer::new(slot_size, capacity)?),
            stats: ChannelStats::new(),
        })
    }

    pub fn add(&self, payload: &[u8]) -> Result<()> {
        match self.ring().add(payload) {
            Ok(()) => {
                self.stats.enqueued_total.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Err(e @ QueueError::CapacityExceeded { .. }) => {
                self.stats.rejected_full.fetch_add(1, Ordering::SeqCst);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub fn remove(&self) -> Option<Bytes> {
        let message = self.ring().remove()?;
        self.stats.dequeued_total.fetch_add(1, Ordering::SeqCst);
        Some(message)
    }

    pub fn occupancy(&self) -> usize {
        self.ring().occupancy()
    }

    pub fn capacity(&self) -> usize {
        self.ring().capacity()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> &ChannelStats {
        &self.stats
    }

    // The ring mutates its indices only after every fallible check, so a
    // poisoned guard still holds a consistent buffer.
    fn ring(&self) -> MutexGuard<'_, RingBuffer> {
        self.ring.lock().unwrap_or_else(|e| e.into_inner())
    }
}

use std::sync::Arc;

use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::channel::Channel;
use super::ring_buffer::RingBuffer;
use crate::error::{QueueError, Result};

/// Routes messages to per-channel ring buffers, creating each buffer on
/// the first write to its channel name.
///
/// Every channel shares the same slot size and capacity. Channels are never
/// removed.
pub struct QueueManager {
    channels: DashMap<String, Arc<Channel>>,
    slot_size: usize,
    capacity: usize,
}

impl QueueManager {
    /// Fails when the geometry could never produce a valid ring buffer, so
    /// a bad configuration surfaces at startup instead of on first write.
    pub fn new(slot_size: usize, capacity: usize) -> Result<Self> {
        RingBuffer::required_bytes(slot_size, capacity)?;

        Ok(Self {
            channels: DashMap::new(),
            slot_size,
            capacity,
        })
    }

    /// Enqueue `payload` on `channel`, creating the channel if needed.
    ///
    /// Oversized payloads are rejected before any channel is created.
    pub fn add(&self, channel: &str, payload: &[u8]) -> Result<()> {
        if payload.len() > self.slot_size {
            return Err(QueueError::PayloadTooLarge {
                size: payload.len(),
                max: self.slot_size,
            });
        }

        self.get_or_create_channel(channel)?.add(payload)
    }

    /// Dequeue the oldest message on `channel`. An unknown channel reads as
    /// empty and is not created.
    pub fn remove(&self, channel: &str) -> Option<Bytes> {
        self.get_channel(channel)?.remove()
    }

    pub fn occupancy(&self, channel: &str) -> usize {
        self.get_channel(channel)
            .map(|channel| channel.occupancy())
            .unwrap_or(0)
    }

    pub fn get_or_create_channel(&self, name: &str) -> Result<Arc<Channel>> {
        if let Some(channel) = self.channels.get(name) {
            return Ok(channel.clone());
        }

        // The entry holds the shard lock, so concurrent first writers to the
        // same name agree on a single channel.
        match self.channels.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let channel = Arc::new(Channel::new(
                    name.to_string(),
                    self.slot_size,
                    self.capacity,
                )?);
                entry.insert(channel.clone());
                Ok(channel)
            }
        }
    }

    pub fn get_channel(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.get(name).map(|channel| channel.clone())
    }

    pub fn list_channels(&self) -> Vec<String> {
        self.channels.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

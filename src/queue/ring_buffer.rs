use std::ops::Range;

use bytes::Bytes;

use crate::error::{QueueError, Result};

/// Width of the unsigned length prefix stored at the start of every slot.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Largest payload a slot can describe with its length prefix.
pub const MAX_SLOT_SIZE: usize = u32::MAX as usize - LENGTH_PREFIX_BYTES;

/// Fixed-capacity FIFO of length-prefixed byte messages.
///
/// Storage is one preallocated region of `capacity` slots, each
/// `LENGTH_PREFIX_BYTES + slot_size` wide. Nothing is allocated on the
/// add path; `remove` allocates only the returned copy.
///
/// `length` is the authoritative occupancy counter: `head` and `tail` are
/// only meaningful while `length > 0`.
pub struct RingBuffer {
    slot_size: usize,
    capacity: usize,
    storage: Box<[u8]>,
    length: usize,
    head: usize,
    tail: usize,
}

impl RingBuffer {
    pub fn new(slot_size: usize, capacity: usize) -> Result<Self> {
        let total = Self::required_bytes(slot_size, capacity)?;

        Ok(Self {
            slot_size,
            capacity,
            storage: vec![0u8; total].into_boxed_slice(),
            length: 0,
            head: 0,
            tail: 0,
        })
    }

    /// Size of the slot region for the given geometry, validating it first.
    pub fn required_bytes(slot_size: usize, capacity: usize) -> Result<usize> {
        if slot_size > MAX_SLOT_SIZE {
            return Err(QueueError::SlotSizeExceeded {
                size: slot_size,
                max: MAX_SLOT_SIZE,
            });
        }

        (slot_size + LENGTH_PREFIX_BYTES)
            .checked_mul(capacity)
            .filter(|total| *total <= isize::MAX as usize)
            .ok_or(QueueError::StorageTooLarge {
                slot_size,
                capacity,
            })
    }

    /// Append a message behind the most recent one.
    pub fn add(&mut self, payload: &[u8]) -> Result<()> {
        if payload.len() > self.slot_size {
            return Err(QueueError::PayloadTooLarge {
                size: payload.len(),
                max: self.slot_size,
            });
        }
        if self.length == self.capacity {
            return Err(QueueError::CapacityExceeded {
                capacity: self.capacity,
            });
        }

        let index = self.next_index();
        let range = self.slot_range(index);
        let (prefix, body) = self.storage[range].split_at_mut(LENGTH_PREFIX_BYTES);
        // slot_size <= MAX_SLOT_SIZE, so the cast is lossless
        prefix.copy_from_slice(&(payload.len() as u32).to_le_bytes());
        body[..payload.len()].copy_from_slice(payload);

        self.tail = index;
        self.length += 1;
        Ok(())
    }

    /// Take the oldest message, or `None` when the buffer is empty.
    ///
    /// The slot is zeroed before it is released.
    pub fn remove(&mut self) -> Option<Bytes> {
        if self.length == 0 {
            return None;
        }

        let range = self.slot_range(self.head);
        let (prefix, body) = self.storage[range].split_at_mut(LENGTH_PREFIX_BYTES);
        let mut raw_len = [0u8; LENGTH_PREFIX_BYTES];
        raw_len.copy_from_slice(prefix);
        let len = u32::from_le_bytes(raw_len) as usize;

        let message = Bytes::copy_from_slice(&body[..len]);
        body.fill(0);
        prefix.fill(0);

        self.head = (self.head + 1) % self.capacity;
        self.length -= 1;
        Some(message)
    }

    /// Number of messages currently stored.
    pub fn occupancy(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn is_full(&self) -> bool {
        self.length == self.capacity
    }

    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes reserved for slots, independent of occupancy.
    pub fn reserved_bytes(&self) -> usize {
        self.storage.len()
    }

    // Slot written by the next `add`: right after `tail`, or `head` when empty.
    // Only called with length < capacity, so capacity is non-zero.
    fn next_index(&self) -> usize {
        if self.length == 0 {
            self.head
        } else {
            (self.tail + 1) % self.capacity
        }
    }

    // Byte range of a slot, length prefix included.
    fn slot_range(&self, index: usize) -> Range<usize> {
        let stride = self.slot_size + LENGTH_PREFIX_BYTES;
        let start = index * stride;
        start..start + stride
    }
}

impl std::fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("slot_size", &self.slot_size)
            .field("capacity", &self.capacity)
            .field("length", &self.length)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_ranges_are_contiguous() {
        let ring = RingBuffer::new(8, 3).unwrap();

        assert_eq!(ring.slot_range(0), 0..12);
        assert_eq!(ring.slot_range(1), 12..24);
        assert_eq!(ring.slot_range(2), 24..36);
        assert_eq!(ring.reserved_bytes(), 36);
    }

    #[test]
    fn add_writes_little_endian_prefix() {
        let mut ring = RingBuffer::new(8, 2).unwrap();
        ring.add(b"abc").unwrap();

        assert_eq!(&ring.storage[0..4], &3u32.to_le_bytes());
        assert_eq!(&ring.storage[4..7], b"abc");
    }

    #[test]
    fn remove_zeroes_the_slot() {
        let mut ring = RingBuffer::new(8, 2).unwrap();
        ring.add(b"secret!!").unwrap();
        ring.remove().unwrap();

        assert!(ring.storage[0..12].iter().all(|b| *b == 0));
    }

    #[test]
    fn shorter_payload_reads_back_only_its_length() {
        let mut ring = RingBuffer::new(8, 1).unwrap();
        ring.add(b"longdata").unwrap();
        ring.remove().unwrap();
        ring.add(b"hi").unwrap();

        assert_eq!(ring.remove().unwrap(), Bytes::from_static(b"hi"));
    }

    #[test]
    fn indices_wrap_back_to_start() {
        let mut ring = RingBuffer::new(4, 3).unwrap();
        for round in 0..3u8 {
            ring.add(&[round]).unwrap();
            ring.remove().unwrap();
        }

        assert_eq!(ring.head, 0);
        assert_eq!(ring.tail, 2);
        assert_eq!(ring.next_index(), 0);
    }

    #[test]
    fn tail_follows_head_when_refilled_after_drain() {
        let mut ring = RingBuffer::new(4, 4).unwrap();
        ring.add(b"a").unwrap();
        ring.add(b"b").unwrap();
        ring.remove().unwrap();
        ring.remove().unwrap();
        ring.add(b"c").unwrap();

        assert_eq!(ring.head, 2);
        assert_eq!(ring.tail, 2);
    }
}

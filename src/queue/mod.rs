// Queue module exports

pub mod channel;
pub mod manager;
pub mod ring_buffer;

pub use channel::{Channel, ChannelStats};
pub use manager::QueueManager;
pub use ring_buffer::{RingBuffer, LENGTH_PREFIX_BYTES, MAX_SLOT_SIZE};

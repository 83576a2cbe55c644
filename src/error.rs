// Error types for the queue core and configuration

/// Result type alias for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// Slot size cannot be described by the 4-byte length prefix.
    #[error("slot size {size} cannot exceed {max}")]
    SlotSizeExceeded { size: usize, max: usize },

    /// `capacity * (slot_size + 4)` does not fit in memory addressing.
    #[error("ring storage for {capacity} slots of {slot_size} bytes is too large")]
    StorageTooLarge { slot_size: usize, capacity: usize },

    /// The channel already holds `capacity` messages.
    #[error("queue at capacity ({capacity} messages)")]
    CapacityExceeded { capacity: usize },

    /// Payload does not fit in one slot.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: String, value: String },

    #[error(transparent)]
    Queue(#[from] QueueError),
}

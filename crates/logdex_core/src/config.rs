//! View configuration.

/// Configuration for a [`crate::LogView`].
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Maximum number of messages turned into one atomic write batch.
    pub max_batch: usize,

    /// Capacity of the channel shared by fan-in workers. A worker blocks
    /// once this many items are waiting for the consumer.
    pub fan_in_buffer: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            max_batch: 100,
            fan_in_buffer: 16,
        }
    }
}

impl ViewConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of messages per write batch (at least 1).
    #[must_use]
    pub const fn max_batch(mut self, value: usize) -> Self {
        self.max_batch = if value == 0 { 1 } else { value };
        self
    }

    /// Sets the fan-in channel capacity (at least 1).
    #[must_use]
    pub const fn fan_in_buffer(mut self, value: usize) -> Self {
        self.fan_in_buffer = if value == 0 { 1 } else { value };
        self
    }
}

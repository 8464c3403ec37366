use crate::error::Error;

/// Configuration for the server ingress adapter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Size of each slab slot in bytes. Bounds the maximum request-head
    /// size and the per-stream deferred body buffer. The initial source
    /// window equals one slot.
    pub slot_capacity: usize,
    /// Number of slab slots. Bounds how many streams can hold deferred
    /// partial data at once; size it to the expected number of concurrent
    /// in-flight partial requests.
    pub slot_count: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            slot_capacity: 8192,
            slot_count: 64,
        }
    }
}

impl Config {
    /// Validate configuration values. Returns an error if any value is out
    /// of range.
    pub fn validate(&self) -> Result<(), Error> {
        if self.slot_capacity < 16 {
            return Err(Error::Config("slot_capacity must be at least 16".into()));
        }
        if self.slot_count == 0 {
            return Err(Error::Config("slot_count must be > 0".into()));
        }
        Ok(())
    }
}

/// Builder for [`Config`] with discoverable methods and `build()` validation.
///
/// # Example
///
/// ```rust
/// use fabric_http::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .slot_capacity(16384)
///     .slot_count(128)
///     .build()
///     .expect("invalid config");
/// ```
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with default config values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the slab slot size in bytes.
    pub fn slot_capacity(mut self, n: usize) -> Self {
        self.config.slot_capacity = n;
        self
    }

    /// Set the number of slab slots.
    pub fn slot_count(mut self, n: usize) -> Self {
        self.config.slot_count = n;
        self
    }

    /// Validate and build the final [`Config`].
    pub fn build(self) -> Result<Config, Error> {
        self.config.validate()?;
        Ok(self.config)
    }
}

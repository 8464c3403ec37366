//! Handles an adapter uses to act on the fabric.
//!
//! A `Source` is the inbound side of a routable: the adapter grants credit
//! on it, resets misbehaving streams, and unregisters finished ones. A
//! `Target` is an outbound endpoint the adapter writes frames to. Both are
//! driven single-threaded from frame-dispatch callbacks; implementations
//! need no interior synchronization.

/// Opaque handle identifying the stream that owns a throttle registration.
///
/// The hosting loop routes WINDOW/RESET frames for a registered outbound
/// stream back to the owner. Adapters mint a token and pass it through;
/// the value is never interpreted by the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamToken(u64);

impl StreamToken {
    pub fn new(value: u64) -> Self {
        StreamToken(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Inbound side of a routable.
pub trait Source {
    /// Name under which this source's streams are routed.
    fn routable_name(&self) -> &str;

    /// Grant `update` bytes of credit on an inbound stream.
    fn do_window(&mut self, stream_id: u64, update: u32);

    /// Abnormally terminate an inbound stream.
    fn do_reset(&mut self, stream_id: u64);

    /// Unregister a finished stream.
    fn remove_stream(&mut self, stream_id: u64);
}

/// Outbound endpoint the adapter writes frames to.
pub trait Target {
    fn name(&self) -> &str;

    /// Open a raw stream.
    fn do_begin(&mut self, stream_id: u64, reference_id: u64, correlation_id: u64);

    /// Open a stream whose BEGIN carries an HTTP extension with `headers`,
    /// pseudo-headers first, in order.
    fn do_http_begin(
        &mut self,
        stream_id: u64,
        reference_id: u64,
        correlation_id: u64,
        headers: &[(String, String)],
    );

    /// Write raw payload bytes.
    fn do_data(&mut self, stream_id: u64, payload: &[u8]);

    /// Write HTTP-DATA payload bytes.
    fn do_http_data(&mut self, stream_id: u64, payload: &[u8]);

    /// End a raw stream.
    fn do_end(&mut self, stream_id: u64);

    /// End an HTTP stream.
    fn do_http_end(&mut self, stream_id: u64);

    /// Route this stream's throttle frames to `owner`.
    fn set_throttle(&mut self, stream_id: u64, owner: StreamToken);

    /// Stop routing throttle frames for this stream.
    fn remove_throttle(&mut self, stream_id: u64);
}

/// Supplies targets by routable name.
pub trait TargetPool {
    fn supply(&mut self, name: &str) -> &mut dyn Target;
}

/// Supplies fresh stream identifiers.
pub trait StreamIds {
    fn supply(&mut self) -> u64;
}

/// Monotonic stream-id generator starting at 1.
#[derive(Debug, Default)]
pub struct SequentialStreamIds {
    next: u64,
}

impl SequentialStreamIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamIds for SequentialStreamIds {
    fn supply(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

//! Semantic frame model for fabric streams.
//!
//! The wire codec belongs to the transport; adapters see frames already
//! decoded into these shapes. BEGIN/DATA/END travel in stream direction,
//! WINDOW/RESET travel in throttle direction, back toward the producer.
//! All frames on a given stream arrive in FIFO order, but no ordering is
//! guaranteed between stream frames and throttle frames.

use bytes::Bytes;

/// A frame on a fabric stream, in stream direction.
#[derive(Debug, Clone)]
pub enum StreamFrame {
    /// Opens a stream. `reference_id` selects the route table; the
    /// `correlation_id` is echoed on the eventual reply stream.
    Begin {
        stream_id: u64,
        reference_id: u64,
        correlation_id: u64,
    },
    /// Carries payload bytes.
    Data { stream_id: u64, payload: Bytes },
    /// Ends a stream normally.
    End { stream_id: u64 },
}

impl StreamFrame {
    /// The stream this frame belongs to.
    pub fn stream_id(&self) -> u64 {
        match self {
            StreamFrame::Begin { stream_id, .. }
            | StreamFrame::Data { stream_id, .. }
            | StreamFrame::End { stream_id } => *stream_id,
        }
    }

    /// Build a DATA frame, copying `payload`.
    pub fn data(stream_id: u64, payload: &[u8]) -> Self {
        StreamFrame::Data {
            stream_id,
            payload: Bytes::copy_from_slice(payload),
        }
    }
}

/// A frame in throttle direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleFrame {
    /// Grants `update` bytes of credit on a stream.
    Window { stream_id: u64, update: u32 },
    /// Abnormally terminates a stream.
    Reset { stream_id: u64 },
}

impl ThrottleFrame {
    /// The stream this frame belongs to.
    pub fn stream_id(&self) -> u64 {
        match self {
            ThrottleFrame::Window { stream_id, .. } | ThrottleFrame::Reset { stream_id } => {
                *stream_id
            }
        }
    }
}

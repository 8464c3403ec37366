//! fabric — substrate contracts for protocol adapters.
//!
//! The fabric carries framed streams between routables: BEGIN/DATA/END in
//! stream direction, WINDOW/RESET in throttle direction. This crate holds
//! the contracts adapters consume: the semantic frame model and the
//! source/target handle traits. The transport itself (ring buffers, frame
//! codec, dispatch loop) lives with the host.
//!
//! Everything here assumes the fabric's scheduling model: handlers are
//! invoked serially on one thread and run to completion, so handles take
//! `&mut self` and carry no locks.

pub mod frame;
pub mod handle;

/// Stream-direction frames (BEGIN/DATA/END).
pub use frame::StreamFrame;
/// Throttle-direction frames (WINDOW/RESET).
pub use frame::ThrottleFrame;
/// Monotonic stream-id generator.
pub use handle::SequentialStreamIds;
/// Inbound routable handle.
pub use handle::Source;
/// Stream-id supply trait.
pub use handle::StreamIds;
/// Opaque throttle-registration owner handle.
pub use handle::StreamToken;
/// Outbound endpoint handle.
pub use handle::Target;
/// Target lookup by routable name.
pub use handle::TargetPool;

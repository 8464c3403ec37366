//! fabric-http — HTTP/1.1 server ingress adapter for the fabric.
//!
//! The adapter sits between the fabric's framed transport and HTTP-aware
//! targets. Upstream peers push the raw bytes of HTTP/1.1 request streams
//! as DATA frames; the adapter decodes them, routes each request to a
//! target by header match, and forwards the body while bridging the two
//! credit-based flow-control domains (source → adapter, adapter → target).
//! Requests that cannot be parsed or routed are answered with a canned
//! response over a loopback reject stream and the source is reset.
//!
//! Everything is single-threaded and run-to-completion: frame handlers
//! mutate per-stream state and return; waiting for credit means returning
//! without writing and resuming on the next WINDOW frame.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use fabric::{SequentialStreamIds, StreamFrame};
//! use fabric_http::{Config, Route, SourceInputStreamFactory};
//!
//! let config = Config::default();
//! let mut factory = SourceInputStreamFactory::new(
//!     &config,
//!     Box::new(source),
//!     Box::new(router),
//!     Box::new(SequentialStreamIds::new()),
//!     Box::new(targets),
//!     Box::new(correlator),
//! );
//! let mut stream = factory.new_stream();
//! stream.on_frame(&begin, &mut factory);
//! stream.on_frame(&StreamFrame::data(1, b"GET / HTTP/1.1\r\n..."), &mut factory);
//! ```

pub mod config;
pub mod correlation;
pub mod error;
pub mod headers;
pub mod metrics;
pub mod route;
pub mod slab;
pub mod stream;
pub mod window;

/// Adapter configuration.
pub use config::Config;
/// Builder for [`Config`] with `build()` validation.
pub use config::ConfigBuilder;
/// Correlation handle shared with the response side.
pub use correlation::Correlation;
/// Correlation registry trait.
pub use correlation::Correlator;
/// State shared between the input stream and its reply stream.
pub use correlation::ServerReplyState;
/// Setup errors.
pub use error::Error;
/// Protocol-level request failures and their canned responses.
pub use error::RequestError;
/// Insertion-ordered header list.
pub use headers::HeaderMap;
/// A route table entry.
pub use route::Route;
/// Correlation kinds a route establishes.
pub use route::RouteKind;
/// Route table lookup trait.
pub use route::Router;
/// Fixed pool of equal-size byte slots.
pub use slab::Slab;
/// Per-stream request decoder and flow-control core.
pub use stream::source_input::SourceInputStream;
/// Shared collaborators and slot pool for one source's streams.
pub use stream::source_input::SourceInputStreamFactory;
/// Credit-window counter.
pub use window::CreditWindow;

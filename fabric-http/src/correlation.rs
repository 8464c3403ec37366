//! Request/response correlation.
//!
//! All requests on one source connection share one correlation handle; the
//! response side retrieves it by the correlation id registered when each
//! request's target stream opens. The shared state counts in-flight
//! responses so the reply stream is not ended underneath the last one.

use std::cell::RefCell;
use std::rc::Rc;

use fabric::TargetPool;

use crate::route::RouteKind;

/// State shared between a source's input stream and the established output
/// stream that carries its responses.
#[derive(Debug)]
pub struct ServerReplyState {
    /// Stream id of the reply stream back to the source.
    pub reply_stream_id: u64,
    /// Routable name of the target currently serving the connection.
    pub target: String,
    /// Responses not yet fully written.
    pub pending_requests: u32,
    /// END was requested while responses were outstanding.
    pub end_requested: bool,
}

impl ServerReplyState {
    pub fn new(reply_stream_id: u64, target: &str) -> Self {
        ServerReplyState {
            reply_stream_id,
            target: target.to_string(),
            pending_requests: 0,
            end_requested: false,
        }
    }

    /// End the reply stream once no responses are outstanding; otherwise
    /// latch the request so the response side ends after draining.
    pub fn do_end(&mut self, targets: &mut dyn TargetPool) {
        if self.pending_requests == 0 {
            let target = targets.supply(&self.target);
            target.do_end(self.reply_stream_id);
            target.remove_throttle(self.reply_stream_id);
        } else {
            self.end_requested = true;
        }
    }
}

/// Correlation handle linking a request stream to its eventual reply.
#[derive(Debug, Clone)]
pub struct Correlation {
    /// Opaque id echoed from the source BEGIN.
    pub correlation_id: u64,
    /// Routable name of the source.
    pub source: String,
    pub kind: RouteKind,
    pub state: Rc<RefCell<ServerReplyState>>,
}

impl Correlation {
    pub fn new(correlation_id: u64, source: &str, state: ServerReplyState) -> Self {
        Correlation {
            correlation_id,
            source: source.to_string(),
            kind: RouteKind::OutputEstablished,
            state: Rc::new(RefCell::new(state)),
        }
    }
}

/// Registers correlation handles for retrieval by the response side.
pub trait Correlator {
    fn correlate_new(&mut self, correlation_id: u64, correlation: Correlation);
}

//! Source-side input stream: the per-connection HTTP/1.1 request decoder
//! and flow-control core.
//!
//! Each inbound fabric stream carries the raw bytes of an HTTP/1.1 request
//! stream. [`SourceInputStream`] consumes those bytes, routes each request
//! to a downstream target by header match, and forwards the body while
//! bridging two credit domains: the window owed to the source and the
//! window granted by the target. Tagged state machines drive stream
//! dispatch, request decoding, and target-throttle handling, so every
//! transition is inspectable.
//!
//! Bytes that cannot make progress (a partial request head, or body the
//! target has no window for) are parked in a slab slot and drained as
//! later frames and credits arrive. The source is never granted more
//! window than the adapter can absorb into the slot or pass on to the
//! target.

use fabric::{Source, StreamFrame, StreamIds, StreamToken, Target, TargetPool, ThrottleFrame};

use crate::config::Config;
use crate::correlation::{Correlation, Correlator, ServerReplyState};
use crate::error::RequestError;
use crate::headers::{self, RequestHead};
use crate::metrics;
use crate::route::{self, Router};
use crate::slab::Slab;
use crate::window::CreditWindow;

/// Source-frame dispatch state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    /// No BEGIN seen yet.
    Idle,
    /// BEGIN processed; decoding directly from incoming frames.
    Open,
    /// A slot holds deferred bytes; incoming data is appended and drained.
    Buffering,
    /// Rejected or reset; incoming data only returns credit.
    Rejected,
    /// END processed; any further frame is unexpected.
    Closed,
}

/// Position in the HTTP/1.1 request state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecoderState {
    /// Scanning for the end of a request head.
    Headers,
    /// Forwarding a body with known content-length.
    Body,
    /// Forwarding opaque bytes after a protocol upgrade.
    Upgraded,
    /// Absorbing; no further bytes are decoded.
    Drained,
}

/// Policy for throttle frames arriving from the current target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ThrottleState {
    /// Only RESET is honored.
    Ignore,
    /// Credits drive body forwarding and bounded source replenishment.
    Body,
    /// Credits drive upgrade passthrough until initial buffering drains.
    Upgraded,
    /// Steady-state upgrade pipe: credits pass to the source 1:1.
    Propagate,
    /// Credits clock a canned error response out to the reject target.
    Reject {
        response: &'static [u8],
        offset: usize,
    },
}

/// Outcome of one decoder step over the working buffer.
enum Decoded {
    /// Consumed up to this offset; keep decoding the rest of the buffer.
    Advanced(usize),
    /// Stop decoding this buffer: the tail was parked in a slot, credit ran
    /// out, or the stream was rejected.
    Paused,
}

/// Shared collaborators for every input stream of one source, plus the
/// slot pool and the compaction scratch region.
pub struct SourceInputStreamFactory {
    source: Box<dyn Source>,
    router: Box<dyn Router>,
    stream_ids: Box<dyn StreamIds>,
    targets: Box<dyn TargetPool>,
    correlator: Box<dyn Correlator>,
    slab: Slab,
    /// Staging area for slot compaction; data passes through here so the
    /// shift to offset zero never overlaps.
    scratch: Box<[u8]>,
    max_headers_size: usize,
}

impl SourceInputStreamFactory {
    pub fn new(
        config: &Config,
        source: Box<dyn Source>,
        router: Box<dyn Router>,
        stream_ids: Box<dyn StreamIds>,
        targets: Box<dyn TargetPool>,
        correlator: Box<dyn Correlator>,
    ) -> Self {
        SourceInputStreamFactory {
            source,
            router,
            stream_ids,
            targets,
            correlator,
            slab: Slab::new(config.slot_count, config.slot_capacity),
            scratch: vec![0u8; config.slot_capacity].into_boxed_slice(),
            max_headers_size: config.slot_capacity,
        }
    }

    /// A fresh stream for the next inbound BEGIN.
    pub fn new_stream(&self) -> SourceInputStream {
        SourceInputStream::new()
    }

    /// The shared slot pool.
    pub fn slab(&self) -> &Slab {
        &self.slab
    }
}

/// Per-inbound-stream decoder and flow-control state.
///
/// Driven by the hosting loop: stream frames via [`SourceInputStream::on_frame`],
/// throttle frames from the current target via
/// [`SourceInputStream::on_throttle`]. Handlers run to completion; waiting
/// for credit is returning without writing.
#[derive(Debug)]
pub struct SourceInputStream {
    stream_state: StreamState,
    decoder_state: DecoderState,
    throttle_state: ThrottleState,

    source_id: u64,
    source_ref: u64,
    source_correlation_id: u64,

    target: Option<String>,
    target_id: u64,

    slot_index: Option<usize>,
    slot_offset: usize,
    slot_position: usize,
    end_deferred: bool,

    /// Credit owed to the source.
    window: CreditWindow,
    /// Credit granted by the target.
    available_target_window: CreditWindow,
    /// Body bytes not yet forwarded.
    content_remaining: u64,
    has_upgrade: bool,

    correlation: Option<Correlation>,
}

impl SourceInputStream {
    fn new() -> Self {
        SourceInputStream {
            stream_state: StreamState::Idle,
            decoder_state: DecoderState::Headers,
            throttle_state: ThrottleState::Ignore,
            source_id: 0,
            source_ref: 0,
            source_correlation_id: 0,
            target: None,
            target_id: 0,
            slot_index: None,
            slot_offset: 0,
            slot_position: 0,
            end_deferred: false,
            window: CreditWindow::new(),
            available_target_window: CreditWindow::new(),
            content_remaining: 0,
            has_upgrade: false,
            correlation: None,
        }
    }

    /// Inbound stream id, assigned by the BEGIN frame.
    pub fn source_id(&self) -> u64 {
        self.source_id
    }

    /// Outbound stream id of the current target stream; throttle frames
    /// carrying any other id are stale and ignored.
    pub fn target_id(&self) -> u64 {
        self.target_id
    }

    /// Whether the current request negotiated a protocol upgrade.
    pub fn has_upgrade(&self) -> bool {
        self.has_upgrade
    }

    // ── Stream-frame dispatch ────────────────────────────────────────

    /// Handle a stream-direction frame from the source.
    pub fn on_frame(&mut self, frame: &StreamFrame, fx: &mut SourceInputStreamFactory) {
        match self.stream_state {
            StreamState::Idle => match frame {
                StreamFrame::Begin {
                    stream_id,
                    reference_id,
                    correlation_id,
                } => self.process_begin(*stream_id, *reference_id, *correlation_id, fx),
                _ => self.process_unexpected(frame.stream_id(), fx),
            },
            StreamState::Open => match frame {
                StreamFrame::Data { stream_id, payload } => {
                    self.process_data(*stream_id, payload, fx);
                    if self.slot_index.is_some() {
                        self.stream_state = StreamState::Buffering;
                    }
                }
                StreamFrame::End { stream_id } => {
                    debug_assert_eq!(*stream_id, self.source_id);
                    self.do_end(fx);
                }
                _ => self.process_unexpected(frame.stream_id(), fx),
            },
            StreamState::Buffering => match frame {
                StreamFrame::Data { stream_id, payload } => {
                    self.defer_and_process_data(*stream_id, payload, fx)
                }
                StreamFrame::End { stream_id } => {
                    debug_assert_eq!(*stream_id, self.source_id);
                    self.end_deferred = true;
                }
                _ => self.process_unexpected(frame.stream_id(), fx),
            },
            StreamState::Rejected => match frame {
                StreamFrame::Data { stream_id, payload } => {
                    fx.source.do_window(*stream_id, payload.len() as u32);
                }
                StreamFrame::End { stream_id } => {
                    fx.source.remove_stream(*stream_id);
                    self.stream_state = StreamState::Closed;
                }
                StreamFrame::Begin { .. } => {}
            },
            StreamState::Closed => {
                fx.source.do_reset(frame.stream_id());
                metrics::SOURCE_RESETS.increment();
            }
        }
    }

    fn process_begin(
        &mut self,
        stream_id: u64,
        reference_id: u64,
        correlation_id: u64,
        fx: &mut SourceInputStreamFactory,
    ) {
        self.source_id = stream_id;
        self.source_ref = reference_id;
        self.source_correlation_id = correlation_id;
        self.stream_state = StreamState::Open;
        self.decoder_state = DecoderState::Headers;
        self.do_source_window(fx.max_headers_size as u32, fx);
    }

    fn process_data(&mut self, stream_id: u64, payload: &[u8], fx: &mut SourceInputStreamFactory) {
        self.window.debit(payload.len());
        if self.window.is_negative() {
            self.process_unexpected(stream_id, fx);
        } else {
            self.decode(payload, 0, payload.len(), fx);
        }
    }

    fn defer_and_process_data(
        &mut self,
        stream_id: u64,
        payload: &[u8],
        fx: &mut SourceInputStreamFactory,
    ) {
        self.window.debit(payload.len());
        if self.window.is_negative() {
            self.process_unexpected(stream_id, fx);
            return;
        }
        let Some(index) = self.slot_index else { return };
        if self.slot_position + payload.len() > fx.slab.slot_capacity() {
            self.align_slot_data(fx);
        }
        let position = self.slot_position;
        if position + payload.len() > fx.slab.slot_capacity() {
            // the window discipline was violated; treat like any misbehaving peer
            self.process_unexpected(stream_id, fx);
            return;
        }
        fx.slab.buffer_mut(index)[position..position + payload.len()].copy_from_slice(payload);
        self.slot_position = position + payload.len();
        self.process_deferred_data(fx);
    }

    /// Drain deferred bytes from the held slot. Releases the slot and
    /// executes a latched END once everything is consumed.
    fn process_deferred_data(&mut self, fx: &mut SourceInputStreamFactory) {
        let Some(index) = self.slot_index else { return };
        let data = fx.slab.take(index);
        self.decode(&data, self.slot_offset, self.slot_position, fx);
        fx.slab.put_back(index, data);
        if self.slot_index.is_some() && self.slot_offset == self.slot_position {
            self.release_slot(fx);
            self.stream_state = StreamState::Open;
            if self.end_deferred {
                self.do_end(fx);
            }
        }
    }

    /// Shift the held region to offset zero so an append fits.
    fn align_slot_data(&mut self, fx: &mut SourceInputStreamFactory) {
        let Some(index) = self.slot_index else { return };
        let length = self.slot_position - self.slot_offset;
        let SourceInputStreamFactory { slab, scratch, .. } = fx;
        let slot = slab.buffer_mut(index);
        scratch[..length].copy_from_slice(&slot[self.slot_offset..self.slot_position]);
        slot[..length].copy_from_slice(&scratch[..length]);
        self.slot_offset = 0;
        self.slot_position = length;
    }

    fn do_end(&mut self, fx: &mut SourceInputStreamFactory) {
        self.decoder_state = DecoderState::Drained;
        self.stream_state = StreamState::Closed;
        self.throttle_state = ThrottleState::Ignore;
        fx.source.remove_stream(self.source_id);
        if let Some(name) = &self.target {
            fx.targets.supply(name).remove_throttle(self.target_id);
        }
        self.release_slot(fx);
        if let Some(correlation) = &self.correlation {
            correlation.state.borrow_mut().do_end(fx.targets.as_mut());
        }
    }

    fn process_unexpected(&mut self, stream_id: u64, fx: &mut SourceInputStreamFactory) {
        self.release_slot(fx);
        fx.source.do_reset(stream_id);
        metrics::SOURCE_RESETS.increment();
        self.stream_state = StreamState::Rejected;
    }

    // ── Request decoding ─────────────────────────────────────────────

    fn decode(
        &mut self,
        buf: &[u8],
        mut offset: usize,
        limit: usize,
        fx: &mut SourceInputStreamFactory,
    ) {
        while offset < limit {
            let step = match self.decoder_state {
                DecoderState::Headers => self.decode_headers(buf, offset, limit, fx),
                DecoderState::Body => self.decode_body(buf, offset, limit, fx),
                DecoderState::Upgraded => self.decode_upgraded(buf, offset, limit, fx),
                DecoderState::Drained => Decoded::Paused,
            };
            match step {
                Decoded::Advanced(next) => offset = next,
                Decoded::Paused => break,
            }
        }
    }

    fn decode_headers(
        &mut self,
        buf: &[u8],
        offset: usize,
        limit: usize,
        fx: &mut SourceInputStreamFactory,
    ) -> Decoded {
        match headers::end_of_head(&buf[offset..limit]) {
            Some(relative_end) => {
                let end = offset + relative_end;
                self.on_request_head(&buf[offset..end], fx);
                if self.slot_index.is_some() {
                    self.slot_offset = end;
                }
                if self.decoder_state == DecoderState::Drained {
                    Decoded::Paused
                } else {
                    Decoded::Advanced(end)
                }
            }
            None => {
                let length = limit - offset;
                if self.slot_index.is_none() && !self.park_tail(buf, offset, limit, fx) {
                    return Decoded::Paused;
                }
                if self.window.available() == 0 {
                    // Top the window back up so the largest acceptable head
                    // can still arrive; if that leaves no room, the head
                    // cannot fit a slot.
                    let refill = fx.max_headers_size.saturating_sub(length) as i64;
                    self.ensure_source_window(refill, fx);
                    if self.window.available() < 2 {
                        self.process_invalid_request(length, RequestError::HeadersTooLarge, fx);
                    }
                }
                Decoded::Paused
            }
        }
    }

    fn on_request_head(&mut self, head: &[u8], fx: &mut SourceInputStreamFactory) {
        match headers::parse_request_head(head) {
            Ok(request) => self.route_request(head.len(), request, fx),
            Err(error) => self.process_invalid_request(head.len(), error, fx),
        }
    }

    fn route_request(
        &mut self,
        head_len: usize,
        head: RequestHead,
        fx: &mut SourceInputStreamFactory,
    ) {
        let resolved = route::resolve(fx.router.supply_routes(self.source_ref), &head.headers)
            .map(|route| (route.target.clone(), route.target_ref));
        let Some((target_name, target_ref)) = resolved else {
            self.process_invalid_request(head_len, RequestError::NoRoute, fx);
            return;
        };

        let new_target_id = fx.stream_ids.supply();

        let correlation = match &self.correlation {
            None => {
                let reply_stream_id = fx.stream_ids.supply();
                let state = ServerReplyState::new(reply_stream_id, &target_name);
                let correlation =
                    Correlation::new(self.source_correlation_id, fx.source.routable_name(), state);
                self.correlation = Some(correlation.clone());
                correlation
            }
            Some(existing) => {
                existing.state.borrow_mut().target = target_name.clone();
                existing.clone()
            }
        };
        correlation.state.borrow_mut().pending_requests += 1;
        fx.correlator.correlate_new(new_target_id, correlation);

        self.available_target_window = CreditWindow::new();
        self.has_upgrade = head.has_upgrade;
        self.content_remaining = if head.has_upgrade {
            0
        } else {
            head.content_length
        };

        {
            let target = fx.targets.supply(&target_name);
            target.do_http_begin(
                new_target_id,
                target_ref,
                new_target_id,
                head.headers.as_slice(),
            );
            target.set_throttle(new_target_id, StreamToken::new(self.source_id));
            if !head.has_upgrade && head.content_length == 0 {
                target.do_http_end(new_target_id);
            }
        }
        self.target = Some(target_name);
        self.target_id = new_target_id;
        metrics::REQUESTS_ROUTED.increment();

        if head.has_upgrade {
            metrics::REQUESTS_UPGRADED.increment();
            self.decoder_state = DecoderState::Upgraded;
            self.throttle_state = ThrottleState::Upgraded;
        } else if head.content_length > 0 {
            self.decoder_state = DecoderState::Body;
            self.throttle_state = ThrottleState::Body;
        }
        // no body, no upgrade: decoder stays on headers for the next
        // pipelined request
    }

    fn decode_body(
        &mut self,
        buf: &[u8],
        offset: usize,
        limit: usize,
        fx: &mut SourceInputStreamFactory,
    ) -> Decoded {
        let length = limit - offset;
        let was_buffered = self.slot_index.is_some();
        let bounded = self.content_remaining.min(length as u64) as usize;
        let writable = self.available_target_window.writable(bounded);

        if writable > 0 {
            self.forward_http_data(&buf[offset..offset + writable], fx);
            self.content_remaining -= writable as u64;
            if was_buffered {
                self.slot_offset += writable;
            }
        }
        if !was_buffered && writable < length && !self.park_tail(buf, offset + writable, limit, fx)
        {
            return Decoded::Paused;
        }
        if self.content_remaining == 0 {
            self.finish_body(fx);
            if writable < length {
                if was_buffered {
                    // pipelined bytes follow the body; keep decoding them
                    return Decoded::Advanced(offset + writable);
                }
                // the tail was just parked; parse the next request this tick
                self.process_deferred_data(fx);
                return Decoded::Paused;
            }
            return Decoded::Advanced(limit);
        }
        if writable == length {
            Decoded::Advanced(limit)
        } else {
            Decoded::Paused
        }
    }

    fn decode_upgraded(
        &mut self,
        buf: &[u8],
        offset: usize,
        limit: usize,
        fx: &mut SourceInputStreamFactory,
    ) -> Decoded {
        let length = limit - offset;
        let was_buffered = self.slot_index.is_some();
        let writable = self.available_target_window.writable(length);

        if writable > 0 {
            self.forward_http_data(&buf[offset..offset + writable], fx);
            if was_buffered {
                self.slot_offset += writable;
            }
        }
        if writable == length {
            return Decoded::Advanced(limit);
        }
        if !was_buffered {
            self.park_tail(buf, offset + writable, limit, fx);
        }
        Decoded::Paused
    }

    fn forward_http_data(&mut self, payload: &[u8], fx: &mut SourceInputStreamFactory) {
        let Some(name) = &self.target else { return };
        fx.targets.supply(name).do_http_data(self.target_id, payload);
        metrics::BYTES_FORWARDED.add(payload.len() as u64);
        self.available_target_window.debit(payload.len());
    }

    fn finish_body(&mut self, fx: &mut SourceInputStreamFactory) {
        if let Some(name) = &self.target {
            fx.targets.supply(name).do_http_end(self.target_id);
        }
        self.decoder_state = DecoderState::Headers;
        self.throttle_state = ThrottleState::Ignore;
    }

    /// Park the unconsumed region `buf[from..limit]` in a freshly acquired
    /// slot. On pool exhaustion the stream is reset.
    fn park_tail(
        &mut self,
        buf: &[u8],
        from: usize,
        limit: usize,
        fx: &mut SourceInputStreamFactory,
    ) -> bool {
        match fx.slab.acquire(self.source_id) {
            Some(index) => {
                let length = limit - from;
                fx.slab.buffer_mut(index)[..length].copy_from_slice(&buf[from..limit]);
                self.slot_index = Some(index);
                self.slot_offset = 0;
                self.slot_position = length;
                true
            }
            None => {
                metrics::SLAB_EXHAUSTED.increment();
                self.process_unexpected(self.source_id, fx);
                false
            }
        }
    }

    /// Reject the request: open a loopback stream to the target named like
    /// the source, clock the canned response out against its throttle, and
    /// reset the source so no further request bytes are processed.
    fn process_invalid_request(
        &mut self,
        request_bytes: usize,
        error: RequestError,
        fx: &mut SourceInputStreamFactory,
    ) {
        self.release_slot(fx);
        let response = error.response();
        let reject_name = fx.source.routable_name().to_string();
        let reject_id = fx.stream_ids.supply();
        {
            let reject = fx.targets.supply(&reject_name);
            reject.do_begin(reject_id, 0, self.source_correlation_id);
            reject.set_throttle(reject_id, StreamToken::new(self.source_id));
        }
        self.target = Some(reject_name);
        // the reject writer's credits must pass the stale-frame gate
        self.target_id = reject_id;
        self.decoder_state = DecoderState::Drained;
        self.stream_state = StreamState::Rejected;
        self.throttle_state = ThrottleState::Reject {
            response,
            offset: 0,
        };
        metrics::REQUESTS_REJECTED.increment();
        // credit to drain whatever of the request is already in flight
        self.do_source_window(request_bytes as u32, fx);
        self.reset_source(fx);
    }

    // ── Target-throttle dispatch ─────────────────────────────────────

    /// Handle a throttle frame from the current target stream.
    pub fn on_throttle(&mut self, frame: &ThrottleFrame, fx: &mut SourceInputStreamFactory) {
        // frames from a previous target stream that has ended are stale
        if frame.stream_id() != self.target_id {
            return;
        }
        match self.throttle_state {
            ThrottleState::Ignore => {
                if matches!(frame, ThrottleFrame::Reset { .. }) {
                    self.process_reset(fx);
                }
            }
            ThrottleState::Body => match frame {
                ThrottleFrame::Window { update, .. } => self.process_window_for_body(*update, fx),
                ThrottleFrame::Reset { .. } => self.process_reset(fx),
            },
            ThrottleState::Upgraded => match frame {
                ThrottleFrame::Window { update, .. } => {
                    self.process_window_for_upgrade(*update, fx)
                }
                ThrottleFrame::Reset { .. } => self.process_reset(fx),
            },
            ThrottleState::Propagate => match frame {
                ThrottleFrame::Window { update, .. } => {
                    self.available_target_window.grant(*update);
                    self.do_source_window(*update, fx);
                }
                ThrottleFrame::Reset { .. } => self.process_reset(fx),
            },
            ThrottleState::Reject { response, offset } => match frame {
                ThrottleFrame::Window { update, .. } => {
                    self.process_window_for_reject(response, offset, *update, fx)
                }
                ThrottleFrame::Reset { .. } => self.process_reset(fx),
            },
        }
    }

    fn process_window_for_body(&mut self, update: u32, fx: &mut SourceInputStreamFactory) {
        self.available_target_window.grant(update);
        if self.slot_index.is_some() {
            self.process_deferred_data(fx);
        }
        // mint source credit only up to what the target (or a slot) can
        // absorb
        let bound = self
            .available_target_window
            .available()
            .min(fx.max_headers_size as i64);
        self.ensure_source_window(bound, fx);
    }

    fn process_window_for_upgrade(&mut self, update: u32, fx: &mut SourceInputStreamFactory) {
        self.available_target_window.grant(update);
        if self.slot_index.is_some() {
            self.process_deferred_data(fx);
        }
        if self.slot_index.is_none() {
            self.ensure_source_window(self.available_target_window.available(), fx);
            if self.window.available() == self.available_target_window.available() {
                // initial buffering has drained; become a symmetric pipe
                self.throttle_state = ThrottleState::Propagate;
            }
        }
    }

    fn process_window_for_reject(
        &mut self,
        response: &'static [u8],
        offset: usize,
        update: u32,
        fx: &mut SourceInputStreamFactory,
    ) {
        let writable = (update as usize).min(response.len() - offset);
        if writable > 0 {
            let Some(name) = &self.target else { return };
            fx.targets
                .supply(name)
                .do_data(self.target_id, &response[offset..offset + writable]);
            metrics::BYTES_REJECTED.add(writable as u64);
        }
        let offset = offset + writable;
        self.throttle_state = if offset == response.len() {
            ThrottleState::Ignore
        } else {
            ThrottleState::Reject { response, offset }
        };
    }

    fn process_reset(&mut self, fx: &mut SourceInputStreamFactory) {
        self.release_slot(fx);
        self.reset_source(fx);
    }

    // ── Window accounting ────────────────────────────────────────────

    fn do_source_window(&mut self, update: u32, fx: &mut SourceInputStreamFactory) {
        self.window.grant(update);
        fx.source.do_window(self.source_id, update);
    }

    fn ensure_source_window(&mut self, required: i64, fx: &mut SourceInputStreamFactory) {
        let available = self.window.available();
        if required > available {
            self.do_source_window((required - available) as u32, fx);
        }
    }

    fn reset_source(&mut self, fx: &mut SourceInputStreamFactory) {
        fx.source.do_reset(self.source_id);
        metrics::SOURCE_RESETS.increment();
    }

    fn release_slot(&mut self, fx: &mut SourceInputStreamFactory) {
        if let Some(index) = self.slot_index.take() {
            fx.slab.release(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::route::Route;

    struct NullSource;

    impl Source for NullSource {
        fn routable_name(&self) -> &str {
            "source"
        }
        fn do_window(&mut self, _: u64, _: u32) {}
        fn do_reset(&mut self, _: u64) {}
        fn remove_stream(&mut self, _: u64) {}
    }

    struct NullTarget {
        name: String,
    }

    impl Target for NullTarget {
        fn name(&self) -> &str {
            &self.name
        }
        fn do_begin(&mut self, _: u64, _: u64, _: u64) {}
        fn do_http_begin(&mut self, _: u64, _: u64, _: u64, _: &[(String, String)]) {}
        fn do_data(&mut self, _: u64, _: &[u8]) {}
        fn do_http_data(&mut self, _: u64, _: &[u8]) {}
        fn do_end(&mut self, _: u64) {}
        fn do_http_end(&mut self, _: u64) {}
        fn set_throttle(&mut self, _: u64, _: StreamToken) {}
        fn remove_throttle(&mut self, _: u64) {}
    }

    #[derive(Default)]
    struct NullTargets {
        targets: Vec<NullTarget>,
    }

    impl TargetPool for NullTargets {
        fn supply(&mut self, name: &str) -> &mut dyn Target {
            if let Some(index) = self.targets.iter().position(|t| t.name == name) {
                return &mut self.targets[index];
            }
            self.targets.push(NullTarget {
                name: name.to_string(),
            });
            self.targets.last_mut().expect("just pushed")
        }
    }

    struct OneRoute {
        routes: Vec<Route>,
    }

    impl Router for OneRoute {
        fn supply_routes(&self, _: u64) -> &[Route] {
            &self.routes
        }
    }

    struct NullCorrelator;

    impl Correlator for NullCorrelator {
        fn correlate_new(&mut self, _: u64, _: Correlation) {}
    }

    fn factory() -> SourceInputStreamFactory {
        let config = ConfigBuilder::new()
            .slot_capacity(64)
            .slot_count(2)
            .build()
            .unwrap();
        SourceInputStreamFactory::new(
            &config,
            Box::new(NullSource),
            Box::new(OneRoute {
                routes: vec![Route::new("app", 1).when(":authority", "a")],
            }),
            Box::new(fabric::SequentialStreamIds::new()),
            Box::new(NullTargets::default()),
            Box::new(NullCorrelator),
        )
    }

    fn opened(fx: &mut SourceInputStreamFactory) -> SourceInputStream {
        let mut stream = fx.new_stream();
        stream.on_frame(
            &StreamFrame::Begin {
                stream_id: 7,
                reference_id: 1,
                correlation_id: 9,
            },
            fx,
        );
        stream
    }

    #[test]
    fn begin_opens_stream_and_grants_one_slot_of_window() {
        let mut fx = factory();
        let stream = opened(&mut fx);
        assert_eq!(stream.stream_state, StreamState::Open);
        assert_eq!(stream.decoder_state, DecoderState::Headers);
        assert_eq!(stream.window.available(), 64);
    }

    #[test]
    fn request_without_body_stays_on_header_decode() {
        let mut fx = factory();
        let mut stream = opened(&mut fx);
        stream.on_frame(
            &StreamFrame::data(7, b"GET / HTTP/1.1\r\nHost: a\r\n\r\n"),
            &mut fx,
        );
        assert_eq!(stream.stream_state, StreamState::Open);
        assert_eq!(stream.decoder_state, DecoderState::Headers);
        assert_eq!(stream.throttle_state, ThrottleState::Ignore);
        assert_eq!(stream.target_id(), 1);
    }

    #[test]
    fn body_request_pairs_body_decoder_with_body_throttle() {
        let mut fx = factory();
        let mut stream = opened(&mut fx);
        stream.on_frame(
            &StreamFrame::data(7, b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhel"),
            &mut fx,
        );
        assert_eq!(stream.decoder_state, DecoderState::Body);
        assert_eq!(stream.throttle_state, ThrottleState::Body);
        // with no target window the fragment is parked
        assert_eq!(stream.stream_state, StreamState::Buffering);
        assert!(stream.slot_index.is_some());
        assert_eq!(stream.content_remaining, 5);
    }

    #[test]
    fn upgrade_pairs_upgrade_decoder_with_upgrade_throttle() {
        let mut fx = factory();
        let mut stream = opened(&mut fx);
        stream.on_frame(
            &StreamFrame::data(7, b"GET / HTTP/1.1\r\nHost: a\r\nUpgrade: ws\r\n\r\n"),
            &mut fx,
        );
        assert_eq!(stream.decoder_state, DecoderState::Upgraded);
        assert_eq!(stream.throttle_state, ThrottleState::Upgraded);
        assert!(stream.has_upgrade());
    }

    #[test]
    fn rejected_request_drains_the_decoder() {
        let mut fx = factory();
        let mut stream = opened(&mut fx);
        stream.on_frame(&StreamFrame::data(7, b"GARBAGE\r\n\r\n"), &mut fx);
        assert_eq!(stream.stream_state, StreamState::Rejected);
        assert_eq!(stream.decoder_state, DecoderState::Drained);
        assert!(matches!(
            stream.throttle_state,
            ThrottleState::Reject { offset: 0, .. }
        ));
    }

    #[test]
    fn end_closes_and_releases_the_slot() {
        let mut fx = factory();
        let mut stream = opened(&mut fx);
        stream.on_frame(&StreamFrame::data(7, b"GET / HTTP/1.1\r\nHo"), &mut fx);
        assert_eq!(fx.slab().free_count(), 1);

        // drain the deferred head, then end
        stream.on_frame(&StreamFrame::data(7, b"st: a\r\n\r\n"), &mut fx);
        stream.on_frame(&StreamFrame::End { stream_id: 7 }, &mut fx);
        assert_eq!(stream.stream_state, StreamState::Closed);
        assert_eq!(stream.decoder_state, DecoderState::Drained);
        assert_eq!(fx.slab().free_count(), 2);
    }

    #[test]
    fn stale_throttle_frame_changes_nothing() {
        let mut fx = factory();
        let mut stream = opened(&mut fx);
        stream.on_frame(
            &StreamFrame::data(7, b"POST / HTTP/1.1\r\nHost: a\r\nContent-Length: 5\r\n\r\nhel"),
            &mut fx,
        );
        let before = stream.available_target_window.available();
        stream.on_throttle(
            &ThrottleFrame::Window {
                stream_id: 99,
                update: 1000,
            },
            &mut fx,
        );
        assert_eq!(stream.available_target_window.available(), before);
        assert_eq!(stream.throttle_state, ThrottleState::Body);
    }
}

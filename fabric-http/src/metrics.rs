//! Adapter metrics.
//!
//! Counter and gauge statics in the metriken registry, picked up by
//! whatever exposition the hosting process wires in.

use metriken::{Counter, Gauge, metric};

// ── Requests ─────────────────────────────────────────────────────

#[metric(
    name = "fabric_http/requests/routed",
    description = "Requests routed to a target"
)]
pub static REQUESTS_ROUTED: Counter = Counter::new();

#[metric(
    name = "fabric_http/requests/rejected",
    description = "Requests answered with a canned error response"
)]
pub static REQUESTS_REJECTED: Counter = Counter::new();

#[metric(
    name = "fabric_http/requests/upgraded",
    description = "Requests that negotiated a protocol upgrade"
)]
pub static REQUESTS_UPGRADED: Counter = Counter::new();

// ── Bytes ────────────────────────────────────────────────────────

#[metric(
    name = "fabric_http/bytes/forwarded",
    description = "Body bytes forwarded to targets"
)]
pub static BYTES_FORWARDED: Counter = Counter::new();

#[metric(
    name = "fabric_http/bytes/rejected",
    description = "Canned response bytes written to reject streams"
)]
pub static BYTES_REJECTED: Counter = Counter::new();

// ── Slab ─────────────────────────────────────────────────────────

#[metric(name = "fabric_http/slab/acquired", description = "Slots acquired")]
pub static SLOTS_ACQUIRED: Counter = Counter::new();

#[metric(name = "fabric_http/slab/released", description = "Slots released")]
pub static SLOTS_RELEASED: Counter = Counter::new();

#[metric(
    name = "fabric_http/slab/exhausted",
    description = "Slot acquisitions that failed because the pool was empty"
)]
pub static SLAB_EXHAUSTED: Counter = Counter::new();

#[metric(name = "fabric_http/slab/held", description = "Slots currently held")]
pub static SLOTS_HELD: Gauge = Gauge::new();

// ── Streams ──────────────────────────────────────────────────────

#[metric(
    name = "fabric_http/source/resets",
    description = "RESET frames written to sources"
)]
pub static SOURCE_RESETS: Counter = Counter::new();

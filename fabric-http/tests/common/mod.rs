//! Shared test support: a recording in-memory fabric.
//!
//! The mocks log every call the adapter makes on its collaborators so
//! scenarios can assert exact frame sequences.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use fabric::{SequentialStreamIds, Source, StreamToken, Target, TargetPool};
use fabric_http::{Config, Correlation, Correlator, Route, Router, SourceInputStreamFactory};

pub type Log<T> = Rc<RefCell<Vec<T>>>;

fn new_log<T>() -> Log<T> {
    Rc::new(RefCell::new(Vec::new()))
}

// ── Source ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    Window { stream_id: u64, update: u32 },
    Reset { stream_id: u64 },
    Remove { stream_id: u64 },
}

pub struct RecordingSource {
    name: String,
    log: Log<SourceCall>,
}

impl Source for RecordingSource {
    fn routable_name(&self) -> &str {
        &self.name
    }
    fn do_window(&mut self, stream_id: u64, update: u32) {
        self.log
            .borrow_mut()
            .push(SourceCall::Window { stream_id, update });
    }
    fn do_reset(&mut self, stream_id: u64) {
        self.log.borrow_mut().push(SourceCall::Reset { stream_id });
    }
    fn remove_stream(&mut self, stream_id: u64) {
        self.log.borrow_mut().push(SourceCall::Remove { stream_id });
    }
}

// ── Targets ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetCall {
    Begin {
        stream_id: u64,
        reference_id: u64,
        correlation_id: u64,
    },
    HttpBegin {
        stream_id: u64,
        reference_id: u64,
        correlation_id: u64,
        headers: Vec<(String, String)>,
    },
    Data {
        stream_id: u64,
        payload: Vec<u8>,
    },
    HttpData {
        stream_id: u64,
        payload: Vec<u8>,
    },
    End {
        stream_id: u64,
    },
    HttpEnd {
        stream_id: u64,
    },
    SetThrottle {
        stream_id: u64,
        owner: u64,
    },
    RemoveThrottle {
        stream_id: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEvent {
    pub target: String,
    pub call: TargetCall,
}

struct RecordingTarget {
    name: String,
    log: Log<TargetEvent>,
}

impl RecordingTarget {
    fn record(&self, call: TargetCall) {
        self.log.borrow_mut().push(TargetEvent {
            target: self.name.clone(),
            call,
        });
    }
}

impl Target for RecordingTarget {
    fn name(&self) -> &str {
        &self.name
    }
    fn do_begin(&mut self, stream_id: u64, reference_id: u64, correlation_id: u64) {
        self.record(TargetCall::Begin {
            stream_id,
            reference_id,
            correlation_id,
        });
    }
    fn do_http_begin(
        &mut self,
        stream_id: u64,
        reference_id: u64,
        correlation_id: u64,
        headers: &[(String, String)],
    ) {
        self.record(TargetCall::HttpBegin {
            stream_id,
            reference_id,
            correlation_id,
            headers: headers.to_vec(),
        });
    }
    fn do_data(&mut self, stream_id: u64, payload: &[u8]) {
        self.record(TargetCall::Data {
            stream_id,
            payload: payload.to_vec(),
        });
    }
    fn do_http_data(&mut self, stream_id: u64, payload: &[u8]) {
        self.record(TargetCall::HttpData {
            stream_id,
            payload: payload.to_vec(),
        });
    }
    fn do_end(&mut self, stream_id: u64) {
        self.record(TargetCall::End { stream_id });
    }
    fn do_http_end(&mut self, stream_id: u64) {
        self.record(TargetCall::HttpEnd { stream_id });
    }
    fn set_throttle(&mut self, stream_id: u64, owner: StreamToken) {
        self.record(TargetCall::SetThrottle {
            stream_id,
            owner: owner.value(),
        });
    }
    fn remove_throttle(&mut self, stream_id: u64) {
        self.record(TargetCall::RemoveThrottle { stream_id });
    }
}

struct TargetSet {
    log: Log<TargetEvent>,
    targets: Vec<RecordingTarget>,
}

impl TargetPool for TargetSet {
    fn supply(&mut self, name: &str) -> &mut dyn Target {
        if let Some(index) = self.targets.iter().position(|t| t.name == name) {
            return &mut self.targets[index];
        }
        self.targets.push(RecordingTarget {
            name: name.to_string(),
            log: self.log.clone(),
        });
        self.targets.last_mut().expect("just pushed")
    }
}

// ── Routing and correlation ─────────────────────────────────────────

struct FixedRoutes {
    routes: Vec<Route>,
}

impl Router for FixedRoutes {
    fn supply_routes(&self, _source_ref: u64) -> &[Route] {
        &self.routes
    }
}

struct RecordingCorrelator {
    log: Log<(u64, Correlation)>,
}

impl Correlator for RecordingCorrelator {
    fn correlate_new(&mut self, correlation_id: u64, correlation: Correlation) {
        self.log.borrow_mut().push((correlation_id, correlation));
    }
}

// ── Harness ─────────────────────────────────────────────────────────

pub struct TestFabric {
    pub factory: SourceInputStreamFactory,
    pub source: Log<SourceCall>,
    pub targets: Log<TargetEvent>,
    pub correlations: Log<(u64, Correlation)>,
}

/// A factory wired to recording mocks, with routes for source "source".
pub fn fabric(config: &Config, routes: Vec<Route>) -> TestFabric {
    let source = new_log();
    let targets = new_log();
    let correlations = new_log();
    let factory = SourceInputStreamFactory::new(
        config,
        Box::new(RecordingSource {
            name: "source".to_string(),
            log: source.clone(),
        }),
        Box::new(FixedRoutes { routes }),
        Box::new(SequentialStreamIds::new()),
        Box::new(TargetSet {
            log: targets.clone(),
            targets: Vec::new(),
        }),
        Box::new(RecordingCorrelator {
            log: correlations.clone(),
        }),
    );
    TestFabric {
        factory,
        source,
        targets,
        correlations,
    }
}

impl TestFabric {
    /// All calls recorded against the named target, in order.
    pub fn calls_for(&self, target: &str) -> Vec<TargetCall> {
        self.targets
            .borrow()
            .iter()
            .filter(|event| event.target == target)
            .map(|event| event.call.clone())
            .collect()
    }

    pub fn source_calls(&self) -> Vec<SourceCall> {
        self.source.borrow().clone()
    }

    /// WINDOW updates granted to the source, in order.
    pub fn source_windows(&self) -> Vec<u32> {
        self.source
            .borrow()
            .iter()
            .filter_map(|call| match call {
                SourceCall::Window { update, .. } => Some(*update),
                _ => None,
            })
            .collect()
    }

    pub fn source_resets(&self) -> usize {
        self.source
            .borrow()
            .iter()
            .filter(|call| matches!(call, SourceCall::Reset { .. }))
            .count()
    }

    /// HTTP-DATA payloads written to the named target, concatenated.
    pub fn http_body(&self, target: &str) -> Vec<u8> {
        self.calls_for(target)
            .into_iter()
            .filter_map(|call| match call {
                TargetCall::HttpData { payload, .. } => Some(payload),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

/// The canonical test route: everything for authority "a" goes to "app".
pub fn default_routes() -> Vec<Route> {
    vec![Route::new("app", 0xA001).when(":authority", "a")]
}

/// Header list lookup for HttpBegin assertions.
pub fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

//! In-memory fabric wiring: drive two pipelined requests and a POST
//! through the adapter and print every frame the target sees.
//!
//! ```sh
//! cargo run --example loopback
//! ```

use fabric::{SequentialStreamIds, Source, StreamFrame, StreamToken, Target, TargetPool, ThrottleFrame};
use fabric_http::{Config, Correlation, Correlator, Route, Router, SourceInputStreamFactory};

struct PrintSource;

impl Source for PrintSource {
    fn routable_name(&self) -> &str {
        "demo"
    }
    fn do_window(&mut self, stream_id: u64, update: u32) {
        println!("source <- WINDOW stream={stream_id} update={update}");
    }
    fn do_reset(&mut self, stream_id: u64) {
        println!("source <- RESET stream={stream_id}");
    }
    fn remove_stream(&mut self, stream_id: u64) {
        println!("source <- remove stream={stream_id}");
    }
}

struct PrintTarget {
    name: String,
}

impl Target for PrintTarget {
    fn name(&self) -> &str {
        &self.name
    }
    fn do_begin(&mut self, stream_id: u64, reference_id: u64, correlation_id: u64) {
        println!(
            "{} <- BEGIN stream={stream_id} ref={reference_id} correlation={correlation_id}",
            self.name
        );
    }
    fn do_http_begin(
        &mut self,
        stream_id: u64,
        reference_id: u64,
        correlation_id: u64,
        headers: &[(String, String)],
    ) {
        println!(
            "{} <- HTTP-BEGIN stream={stream_id} ref={reference_id} correlation={correlation_id}",
            self.name
        );
        for (name, value) in headers {
            println!("{}      {name}: {value}", self.name);
        }
    }
    fn do_data(&mut self, stream_id: u64, payload: &[u8]) {
        println!(
            "{} <- DATA stream={stream_id} {:?}",
            self.name,
            String::from_utf8_lossy(payload)
        );
    }
    fn do_http_data(&mut self, stream_id: u64, payload: &[u8]) {
        println!(
            "{} <- HTTP-DATA stream={stream_id} {:?}",
            self.name,
            String::from_utf8_lossy(payload)
        );
    }
    fn do_end(&mut self, stream_id: u64) {
        println!("{} <- END stream={stream_id}", self.name);
    }
    fn do_http_end(&mut self, stream_id: u64) {
        println!("{} <- HTTP-END stream={stream_id}", self.name);
    }
    fn set_throttle(&mut self, stream_id: u64, owner: StreamToken) {
        println!(
            "{} :: throttle stream={stream_id} owner={}",
            self.name,
            owner.value()
        );
    }
    fn remove_throttle(&mut self, stream_id: u64) {
        println!("{} :: throttle removed stream={stream_id}", self.name);
    }
}

#[derive(Default)]
struct Targets {
    targets: Vec<PrintTarget>,
}

impl TargetPool for Targets {
    fn supply(&mut self, name: &str) -> &mut dyn Target {
        if let Some(index) = self.targets.iter().position(|t| t.name == name) {
            return &mut self.targets[index];
        }
        self.targets.push(PrintTarget {
            name: name.to_string(),
        });
        self.targets.last_mut().expect("just pushed")
    }
}

struct StaticRoutes {
    routes: Vec<Route>,
}

impl Router for StaticRoutes {
    fn supply_routes(&self, _source_ref: u64) -> &[Route] {
        &self.routes
    }
}

struct PrintCorrelator;

impl Correlator for PrintCorrelator {
    fn correlate_new(&mut self, correlation_id: u64, correlation: Correlation) {
        println!(
            ":: correlate id={correlation_id} pending={}",
            correlation.state.borrow().pending_requests
        );
    }
}

fn main() {
    let config = Config::default();
    let mut factory = SourceInputStreamFactory::new(
        &config,
        Box::new(PrintSource),
        Box::new(StaticRoutes {
            routes: vec![Route::new("app", 0x7001).when(":authority", "localhost")],
        }),
        Box::new(SequentialStreamIds::new()),
        Box::new(Targets::default()),
        Box::new(PrintCorrelator),
    );

    let mut stream = factory.new_stream();
    stream.on_frame(
        &StreamFrame::Begin {
            stream_id: 0x11,
            reference_id: 0x7000,
            correlation_id: 0x99,
        },
        &mut factory,
    );

    println!("--- two pipelined GETs in one frame ---");
    stream.on_frame(
        &StreamFrame::data(
            0x11,
            b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\nGET /two HTTP/1.1\r\nHost: localhost\r\n\r\n",
        ),
        &mut factory,
    );

    println!("--- POST with a flow-controlled body ---");
    stream.on_frame(
        &StreamFrame::data(
            0x11,
            b"POST /items HTTP/1.1\r\nHost: localhost\r\nContent-Length: 5\r\n\r\nhello",
        ),
        &mut factory,
    );
    // the target grants window, releasing the parked body
    let target_id = stream.target_id();
    stream.on_throttle(
        &ThrottleFrame::Window {
            stream_id: target_id,
            update: 1024,
        },
        &mut factory,
    );

    println!("--- source end ---");
    stream.on_frame(&StreamFrame::End { stream_id: 0x11 }, &mut factory);
}

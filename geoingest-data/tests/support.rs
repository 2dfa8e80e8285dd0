//! Helpers shared by the data-layer integration tests.

use std::{
    io::{BufRead, BufReader, Write},
    net::TcpListener,
    thread::{self, JoinHandle},
};

/// Tolerance, in degrees, for reprojected coordinates.
const COORDINATE_EPSILON: f64 = 1.0e-6;

/// Compare floating-point coordinates within a small epsilon.
pub fn assert_close(actual: f64, expected: f64) {
    let delta = (actual - expected).abs();
    assert!(
        delta <= COORDINATE_EPSILON,
        "expected {expected}, got {actual} (|Δ| = {delta})"
    );
}

/// A one-shot HTTP server answering a single request with a canned response.
pub struct CannedServer {
    /// Base URL of the server, ending in `/proj4def/`.
    pub base_url: String,
    handle: JoinHandle<String>,
}

impl CannedServer {
    /// Serve `body` with `status` (e.g. `"200 OK"`) to the next request.
    pub fn start(status: &str, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
        let port = listener.local_addr().expect("listener address").port();
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept request");
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("read request line");
            let mut header = String::new();
            while reader.read_line(&mut header).expect("read header") > 2 {
                header.clear();
            }
            let mut writer = stream;
            writer
                .write_all(response.as_bytes())
                .expect("write response");
            request_line
        });
        Self {
            base_url: format!("http://127.0.0.1:{port}/proj4def/"),
            handle,
        }
    }

    /// Wait for the request to be served and return its request line.
    pub fn request_line(self) -> String {
        self.handle.join().expect("server thread panicked")
    }
}

//! Minimal HTTP/1.1 fixture server for REST adapter tests.
//!
//! Routes match on the request path (query excluded). Every request is
//! recorded so tests can assert on query strings and signing headers.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
struct Route {
    path: String,
    status: u16,
    body: String,
    stall: bool,
}

pub struct FixtureServer {
    url: String,
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    task: JoinHandle<()>,
}

impl FixtureServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fixture");
        let url = format!("http://{}", listener.local_addr().expect("local addr"));
        let routes: Arc<Mutex<Vec<Route>>> = Arc::default();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();

        let task = {
            let routes = Arc::clone(&routes);
            let requests = Arc::clone(&requests);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let routes = Arc::clone(&routes);
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        serve(stream, routes, requests).await;
                    });
                }
            })
        };

        Self {
            url,
            routes,
            requests,
            task,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Answer `path` with `status` and a JSON `body`. Later routes win.
    pub fn route(&self, path: &str, status: u16, body: &str) {
        self.routes.lock().insert(
            0,
            Route {
                path: path.to_string(),
                status,
                body: body.to_string(),
                stall: false,
            },
        );
    }

    /// Accept requests to `path` but never answer them.
    pub fn stall(&self, path: &str) {
        self.routes.lock().insert(
            0,
            Route {
                path: path.to_string(),
                status: 200,
                body: String::new(),
                stall: true,
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for FixtureServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        }
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default();
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let headers = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let recorded = RecordedRequest {
        method,
        path: path.to_string(),
        query: query.to_string(),
        headers,
    };
    let route = routes.lock().iter().find(|r| r.path == recorded.path).cloned();
    requests.lock().push(recorded);

    if route.as_ref().is_some_and(|r| r.stall) {
        tokio::time::sleep(Duration::from_secs(60)).await;
        return;
    }

    let (status, body) = match route {
        Some(route) => (route.status, route.body),
        None => (404, r#"{"error":{"message":"no fixture route"}}"#.to_string()),
    };
    let response = format!(
        "HTTP/1.1 {status} Fixture\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

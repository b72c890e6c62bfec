//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use convoscope_agents::{Error, LlmClient, PageFetcher, Result, Summarizer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Page fetcher serving canned pages; unknown URLs fail
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    #[must_use]
    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.requested
            .lock()
            .expect("lock poisoned")
            .push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| Error::WebFetch(format!("connection refused: {url}")))
    }
}

/// Summarizer that returns a fixed summary for any non-empty page
pub struct FixedSummarizer(pub &'static str);

impl Summarizer for FixedSummarizer {
    fn summarize(&self, text: &str, _num_sentences: usize) -> String {
        if text.is_empty() {
            String::new()
        } else {
            self.0.to_string()
        }
    }
}

/// LLM returning a canned reply and recording what it was sent
pub struct StubLlm {
    reply: std::result::Result<String, String>,
    calls: Mutex<Vec<(String, f32)>>,
}

impl StubLlm {
    #[must_use]
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, f32)> {
        self.calls.lock().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl LlmClient for StubLlm {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.calls
            .lock()
            .expect("lock poisoned")
            .push((prompt.to_string(), temperature));
        self.reply.clone().map_err(Error::Llm)
    }
}

/// HTTP request as seen by [`StubServer`]
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    /// Path and query string
    pub target: String,
    /// Header names are lowercased
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("JSON request body")
    }
}

/// Local HTTP server answering every request with one canned JSON response
pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl StubServer {
    pub async fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let response = format!(
            "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let captured = Arc::clone(&requests);

        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let response = response.clone();
                let captured = Arc::clone(&captured);
                tokio::spawn(async move {
                    handle_connection(stream, &response, &captured).await;
                });
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().expect("lock poisoned").clone()
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    response: &str,
    captured: &Mutex<Vec<CapturedRequest>>,
) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    captured.lock().expect("lock poisoned").push(request);

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split(' ');
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_ascii_lowercase(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).into_owned();

    Some(CapturedRequest {
        method,
        target,
        headers,
        body,
    })
}

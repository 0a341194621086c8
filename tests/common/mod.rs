// Minimal one-shot HTTP server for driving the client in tests.
//
// It accepts a single connection, records the request, and answers with a
// canned status and body.

#![allow(dead_code)]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What the server saw.
#[derive(Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    /// Header names are lowercased.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Headers of the single multipart part, as the raw text between the
    /// first boundary line and the blank line that precedes the content.
    pub fn part_headers(&self) -> String {
        let text = self.body_text();
        let start = text.find("\r\n").map(|i| i + 2).unwrap_or(0);
        let end = text[start..]
            .find("\r\n\r\n")
            .map(|i| start + i)
            .unwrap_or(text.len());
        text[start..end].to_string()
    }
}

pub struct MockServer {
    url: String,
    handle: JoinHandle<RecordedRequest>,
}

impl MockServer {
    /// Serve one request, replying with `status` and `body`.
    pub fn start(status: u16, reason: &'static str, body: &[u8]) -> Self {
        let body = body.to_vec();
        Self::spawn(move |mut stream, request| {
            let head = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream.write_all(head.as_bytes()).unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
            request
        })
    }

    /// Read the request, then hold the connection open without answering.
    pub fn silent(hold: Duration) -> Self {
        Self::spawn(move |_stream, request| {
            thread::sleep(hold);
            request
        })
    }

    fn spawn<F>(respond: F) -> Self
    where
        F: FnOnce(TcpStream, RecordedRequest) -> RecordedRequest + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/v2", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let request = read_request(&stream);
            respond(stream, request)
        });
        MockServer { url, handle }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Wait for the recorded request. Only call this when the client is
    /// expected to have connected.
    pub fn request(self) -> RecordedRequest {
        self.handle.join().unwrap()
    }
}

fn read_request(stream: &TcpStream) -> RecordedRequest {
    let mut reader = BufReader::new(stream);

    let mut line = String::new();
    reader.read_line(&mut line).unwrap();
    let mut parts = line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let path = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((k, v)) = line.split_once(':') {
            headers.push((k.trim().to_ascii_lowercase(), v.trim().to_string()));
        }
    }

    let header = |name: &str| {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };

    let body = if let Some(len) = header("content-length") {
        let mut body = vec![0; len.parse().unwrap()];
        reader.read_exact(&mut body).unwrap();
        body
    } else if header("transfer-encoding").is_some_and(|v| v.eq_ignore_ascii_case("chunked")) {
        read_chunked(&mut reader)
    } else {
        Vec::new()
    };

    RecordedRequest {
        method,
        path,
        headers,
        body,
    }
}

fn read_chunked<R: BufRead>(reader: &mut R) -> Vec<u8> {
    let mut body = Vec::new();
    loop {
        let mut size = String::new();
        reader.read_line(&mut size).unwrap();
        let size = usize::from_str_radix(size.trim().split(';').next().unwrap(), 16).unwrap();
        let mut chunk = vec![0; size + 2];
        reader.read_exact(&mut chunk).unwrap();
        if size == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..size]);
    }
    body
}

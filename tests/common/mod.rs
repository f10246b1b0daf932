//! Fixture CONNECT proxy that also plays the origin server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const ACK: &[u8] = b"HTTP/1.1 200 Connection Established\r\n\r\n";

/// What one fixture connection received.
#[derive(Debug, Clone, Default)]
pub struct Captured {
    pub connect: Vec<u8>,
    pub request: Vec<u8>,
}

impl Captured {
    pub fn request_text(&self) -> String {
        String::from_utf8_lossy(&self.request).into_owned()
    }
}

pub struct FixtureProxy {
    pub port: u16,
    pub captured: Arc<Mutex<Vec<Captured>>>,
}

impl FixtureProxy {
    /// Accepts connections forever, answering CONNECT with `ack` and then
    /// sending each chunk of `reply` before closing.
    pub async fn spawn(ack: &'static [u8], reply: &[&'static [u8]]) -> Self {
        let reply: Vec<&'static [u8]> = reply.to_vec();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = captured.clone();

        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                let reply = reply.clone();
                let sink = sink.clone();
                tokio::spawn(async move {
                    let record = serve(stream, ack, reply).await;
                    sink.lock().unwrap().push(record);
                });
            }
        });

        Self { port, captured }
    }

    /// Waits until `count` connections have completed on the fixture side.
    pub async fn connections(&self, count: usize) -> Vec<Captured> {
        for _ in 0..200 {
            {
                let captured = self.captured.lock().unwrap();
                if captured.len() >= count {
                    return captured.clone();
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("fixture saw fewer than {count} connections");
    }
}

async fn serve(mut stream: TcpStream, ack: &[u8], reply: Vec<&[u8]>) -> Captured {
    let mut record = Captured::default();
    let mut pending = Vec::new();

    let Some(connect) = read_head(&mut stream, &mut pending).await else {
        return record;
    };
    record.connect = connect;
    stream.write_all(ack).await.unwrap();

    if !ack.windows(5).any(|w| w == b" 200 ") {
        // Anything the client still sends after a refusal is captured.
        let _ = stream.read_to_end(&mut pending).await;
        record.request = pending;
        return record;
    }

    let Some(head) = read_head(&mut stream, &mut pending).await else {
        return record;
    };
    let body_len = content_length(&head);
    while pending.len() < body_len {
        let mut buf = [0u8; 1024];
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => pending.extend_from_slice(&buf[..n]),
        }
    }
    record.request = head;
    record.request.extend_from_slice(&pending);

    for chunk in reply {
        if stream.write_all(chunk).await.is_err() {
            break;
        }
        stream.flush().await.ok();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    let _ = stream.shutdown().await;
    record
}

/// Reads through the next blank line; leftover bytes stay in `pending`.
async fn read_head(stream: &mut TcpStream, pending: &mut Vec<u8>) -> Option<Vec<u8>> {
    loop {
        if let Some(pos) = pending.windows(4).position(|w| w == b"\r\n\r\n") {
            let rest = pending.split_off(pos + 4);
            return Some(std::mem::replace(pending, rest));
        }
        let mut buf = [0u8; 1024];
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return None,
            Ok(n) => pending.extend_from_slice(&buf[..n]),
        }
    }
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())
                .flatten()
        })
        .unwrap_or(0)
}

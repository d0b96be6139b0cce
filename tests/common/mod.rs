//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

/// Start a mock backend that answers every connection with a fixed
/// 200 response.
pub async fn start_mock_backend(addr: SocketAddr, body: String) {
    start_backend(addr, 200, Vec::new(), body).await;
}

/// Start a mock backend with a fixed status, extra response headers and body.
#[allow(dead_code)]
pub async fn start_backend(
    addr: SocketAddr,
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
) {
    let listener = TcpListener::bind(addr).await.unwrap();
    let headers = Arc::new(headers);
    let body = Arc::new(body);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let headers = headers.clone();
                    let body = body.clone();
                    tokio::spawn(async move {
                        let status_text = match status {
                            200 => "200 OK",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            502 => "502 Bad Gateway",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let mut extra = String::new();
                        for (name, value) in headers.iter() {
                            extra.push_str(&format!("{}: {}\r\n", name, value));
                        }

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            extra,
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });
}

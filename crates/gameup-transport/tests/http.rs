//! Integration tests for the HTTP backend.
//!
//! These tests stand up a bare TCP listener that speaks just enough
//! HTTP/1.1 to answer one request, so we can check what `HttpBackend`
//! actually puts on the wire and how it reads the reply.

#[cfg(feature = "http")]
mod http {
    use gameup_transport::{ApiRequest, Backend, HttpBackend, TransportError};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accepts one connection, captures the raw request (head + body) and
    /// answers with the given status line and body.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = listener.local_addr().expect("should have addr");

        let handle = tokio::spawn(async move {
            let (mut stream, _) =
                listener.accept().await.expect("should accept");
            let raw = read_request(&mut stream).await;
            let reply = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream
                .write_all(reply.as_bytes())
                .await
                .expect("should write reply");
            stream.shutdown().await.ok();
            raw
        });

        (format!("http://{addr}"), handle)
    }

    /// Reads the request head, then as many body bytes as
    /// `content-length` announces.
    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = stream.read(&mut chunk).await.expect("should read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf).to_string();
            if let Some(head_end) = text.find("\r\n\r\n") {
                let head = text[..head_end].to_lowercase();
                let declared = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + declared {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    #[tokio::test]
    async fn test_execute_sends_method_path_bearer_and_body() {
        let (base, server) =
            serve_once("201 Created", r#"{"game":{"id":1}}"#).await;
        let backend = HttpBackend::new(&base).expect("should build");

        let request = ApiRequest::post(
            "/api/library",
            br#"{"igdb_game_id":42,"status":"Playing"}"#.to_vec(),
        )
        .with_bearer("abc123");
        let response = backend.execute(request).await.expect("should succeed");

        assert_eq!(response.status, 201);
        assert_eq!(response.body, br#"{"game":{"id":1}}"#);

        let raw = server.await.expect("server task should finish");
        let lower = raw.to_lowercase();
        assert!(raw.starts_with("POST /api/library HTTP/1.1"), "got: {raw}");
        assert!(lower.contains("authorization: bearer abc123"));
        assert!(lower.contains("content-type: application/json"));
        assert!(raw.ends_with(r#"{"igdb_game_id":42,"status":"Playing"}"#));
    }

    #[tokio::test]
    async fn test_execute_returns_error_statuses_as_responses() {
        // A 409 is an answer, not a transport failure.
        let (base, server) = serve_once(
            "409 Conflict",
            r#"{"error":"This game is already in your library"}"#,
        )
        .await;
        let backend = HttpBackend::new(&base).expect("should build");

        let response = backend
            .execute(ApiRequest::get("/api/library"))
            .await
            .expect("should return a response");

        assert_eq!(response.status, 409);
        assert!(!response.is_success());
        let raw = server.await.unwrap();
        assert!(!raw.to_lowercase().contains("authorization:"));
    }

    #[tokio::test]
    async fn test_execute_unreachable_backend_returns_connect_error() {
        // Bind to learn a free port, then close it so nothing listens.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let backend = HttpBackend::new(&format!("http://{addr}")).unwrap();
        let result = backend.execute(ApiRequest::get("/api/me")).await;

        assert!(
            matches!(result, Err(TransportError::Connect(_))),
            "expected Connect error, got {result:?}"
        );
    }
}

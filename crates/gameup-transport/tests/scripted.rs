//! Tests for the scripted test double.

#[cfg(feature = "mock")]
mod scripted {
    use gameup_transport::{
        ApiRequest, Backend, Method, ScriptedBackend, TransportError,
    };

    #[tokio::test]
    async fn test_replies_are_served_in_order_and_requests_recorded() {
        let backend = ScriptedBackend::new();
        backend.reply(200, "[]").reply(204, "");

        let first = backend.execute(ApiRequest::get("/a")).await.unwrap();
        let second = backend.execute(ApiRequest::delete("/b")).await.unwrap();

        assert_eq!(first.status, 200);
        assert_eq!(second.status, 204);
        assert_eq!(backend.remaining(), 0);

        let seen = backend.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].path, "/a");
        assert_eq!(seen[1].method, Method::Delete);
    }

    #[tokio::test]
    async fn test_empty_queue_fails_instead_of_hanging() {
        let backend = ScriptedBackend::new();

        let result = backend.execute(ApiRequest::get("/api/me")).await;

        assert!(matches!(result, Err(TransportError::Request(msg)) if msg.contains("/api/me")));
    }

    #[tokio::test]
    async fn test_queued_failure_is_returned() {
        let backend = ScriptedBackend::new();
        backend.fail(TransportError::Timeout);

        let result = backend.execute(ApiRequest::get("/x")).await;

        assert_eq!(result, Err(TransportError::Timeout));
    }
}

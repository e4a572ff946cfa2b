//! A scripted [`Backend`] for tests.
//!
//! Replies are queued up front and handed out in order; every request is
//! recorded so tests can assert on what was sent.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::{ApiRequest, ApiResponse, Backend, TransportError};

/// A [`Backend`] that answers from a queue of canned replies.
///
/// When the queue is empty every request fails with
/// [`TransportError::Request`], which makes an unexpected extra call show
/// up as an error instead of hanging.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedBackend {
    /// Creates a backend with no queued replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply with the given status and body.
    pub fn reply(&self, status: u16, body: &str) -> &Self {
        self.push(Ok(ApiResponse::new(status, body)))
    }

    /// Queues a transport failure.
    pub fn fail(&self, error: TransportError) -> &Self {
        self.push(Err(error))
    }

    /// Returns every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns how many queued replies have not been consumed.
    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, reply: Result<ApiResponse, TransportError>) -> &Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
        self
    }
}

impl Backend for ScriptedBackend {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let path = request.path.clone();
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Request(format!(
                    "no scripted reply for {path}"
                )))
            })
    }
}

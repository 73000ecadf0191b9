//! Recording fake transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::client::Client;
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse, Transport};

/// Answers requests from a queue of canned responses and keeps every
/// request it saw.
#[derive(Default)]
pub(crate) struct FakeTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn respond(&self, status: u16, body: &str) {
        self.responses.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body: body.as_bytes().to_vec(),
        }));
    }

    pub(crate) fn fail(&self, msg: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Transport(msg.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.seen.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no canned response".to_string())))
    }
}

pub(crate) fn client_with(fake: &Arc<FakeTransport>, token: &str) -> Client {
    Client::builder("K", token)
        .base_url("http://trello.test")
        .transport(Arc::clone(fake))
        .build()
}

//! Scriptable fakes for tests.
//!
//! Available in this crate's own tests and, through the `test-utils`
//! feature, in downstream test suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{InstallProgress, InstallState};
use crate::events::InstallEvent;
use crate::ports::{
    HttpTransport, InstallEventSink, ResponseBody, SinkError, TransportError, TransportRequest,
};

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Scripted behaviour for one URL.
#[derive(Debug, Clone)]
pub enum FakeRoute {
    /// Serve these bytes. Range requests get the matching slice.
    Body(Vec<u8>),
    /// Answer with a non-success status.
    Status(u16),
    /// Fail before any body is produced.
    Network(String),
    /// Serve these bytes, then fail mid-stream.
    Truncated(Vec<u8>),
    /// Serve these bytes, then never finish.
    Stall(Vec<u8>),
    /// Serve the whole body with 200 even when a range was asked for.
    IgnoresRange(Vec<u8>),
}

/// In-memory [`HttpTransport`] keyed by exact URL.
///
/// Unknown URLs answer 404. Every request is logged, including its range.
#[derive(Debug, Clone)]
pub struct FakeTransport {
    routes: Arc<Mutex<HashMap<String, FakeRoute>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
    chunk_size: usize,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeTransport {
    /// Create a transport with no routes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            chunk_size: 16 * 1024,
        }
    }

    /// Split bodies into chunks of at most `size` bytes.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// Script a URL.
    #[must_use]
    pub fn with_route(self, url: &str, route: FakeRoute) -> Self {
        self.set_route(url, route);
        self
    }

    /// Serve `body` at `url`.
    #[must_use]
    pub fn with_body(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with_route(url, FakeRoute::Body(body.into()))
    }

    /// Answer `status` at `url`.
    #[must_use]
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with_route(url, FakeRoute::Status(status))
    }

    /// Replace the script for a URL after construction.
    pub fn set_route(&self, url: &str, route: FakeRoute) {
        locked(&self.routes).insert(url.to_string(), route);
    }

    /// Every request seen so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<TransportRequest> {
        locked(&self.requests).clone()
    }

    /// URLs requested so far, in order.
    #[must_use]
    pub fn requested_urls(&self) -> Vec<String> {
        locked(&self.requests)
            .iter()
            .map(|r| r.url.to_string())
            .collect()
    }

    /// Forget the request log.
    pub fn clear_requests(&self) {
        locked(&self.requests).clear();
    }

    fn body(&self, status: u16, bytes: &[u8], tail: Tail) -> Box<dyn ResponseBody> {
        let chunks = bytes
            .chunks(self.chunk_size)
            .map(Bytes::copy_from_slice)
            .collect::<Vec<_>>();
        Box::new(FakeBody {
            status,
            chunks: chunks.into_iter().rev().collect(),
            length: bytes.len() as u64,
            tail,
        })
    }
}

fn slice_range(body: &[u8], request: &TransportRequest) -> Vec<u8> {
    let Some(range) = request.range else {
        return body.to_vec();
    };
    let len = body.len() as u64;
    if range.start >= len || range.end < range.start {
        return Vec::new();
    }
    let end = range.end.min(len - 1);
    let (Ok(start), Ok(end)) = (usize::try_from(range.start), usize::try_from(end)) else {
        return Vec::new();
    };
    body[start..=end].to_vec()
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, request: TransportRequest) -> Result<Box<dyn ResponseBody>, TransportError> {
        locked(&self.requests).push(request.clone());
        let route = locked(&self.routes).get(request.url.as_str()).cloned();
        let ok_status = if request.range.is_some() { 206 } else { 200 };

        match route {
            None => Err(TransportError::status(404, request.url.as_str())),
            Some(FakeRoute::Status(status)) => {
                Err(TransportError::status(status, request.url.as_str()))
            }
            Some(FakeRoute::Network(message)) => {
                Err(TransportError::network(request.url.as_str(), message))
            }
            Some(FakeRoute::Body(body)) => {
                Ok(self.body(ok_status, &slice_range(&body, &request), Tail::End))
            }
            Some(FakeRoute::Truncated(body)) => Ok(self.body(
                ok_status,
                &slice_range(&body, &request),
                Tail::Fail(request.url.to_string()),
            )),
            Some(FakeRoute::Stall(body)) => {
                Ok(self.body(ok_status, &slice_range(&body, &request), Tail::Stall))
            }
            Some(FakeRoute::IgnoresRange(body)) => Ok(self.body(200, &body, Tail::End)),
        }
    }
}

#[derive(Debug)]
enum Tail {
    End,
    Fail(String),
    Stall,
}

struct FakeBody {
    status: u16,
    chunks: Vec<Bytes>,
    length: u64,
    tail: Tail,
}

#[async_trait]
impl ResponseBody for FakeBody {
    async fn chunk(&mut self) -> Result<Option<Bytes>, TransportError> {
        if let Some(chunk) = self.chunks.pop() {
            return Ok(Some(chunk));
        }
        match &self.tail {
            Tail::End => Ok(None),
            Tail::Fail(url) => Err(TransportError::network(url.clone(), "connection reset")),
            Tail::Stall => std::future::pending().await,
        }
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn content_length(&self) -> Option<u64> {
        Some(self.length)
    }
}

/// How a [`RecordingSink`] responds after recording an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SinkBehavior {
    /// Accept the event.
    #[default]
    Accept,
    /// Return an error.
    Fail,
    /// Panic.
    Panic,
}

/// Sink that records every event it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<InstallEvent>>>,
    behavior: SinkBehavior,
}

impl RecordingSink {
    /// Create an accepting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that records and then fails or panics.
    #[must_use]
    pub fn with_behavior(behavior: SinkBehavior) -> Self {
        Self {
            events: Arc::default(),
            behavior,
        }
    }

    /// All events, in order.
    #[must_use]
    pub fn events(&self) -> Vec<InstallEvent> {
        locked(&self.events).clone()
    }

    /// State transitions only, in order.
    #[must_use]
    pub fn states(&self) -> Vec<InstallState> {
        locked(&self.events)
            .iter()
            .filter_map(InstallEvent::as_state)
            .collect()
    }

    /// Progress snapshots only, in order.
    #[must_use]
    pub fn progress(&self) -> Vec<InstallProgress> {
        locked(&self.events)
            .iter()
            .filter_map(|e| e.as_progress().copied())
            .collect()
    }

    /// The last progress snapshot, if any.
    #[must_use]
    pub fn last_progress(&self) -> Option<InstallProgress> {
        self.progress().last().copied()
    }
}

impl InstallEventSink for RecordingSink {
    fn emit(&self, event: InstallEvent) -> Result<(), SinkError> {
        locked(&self.events).push(event);
        match self.behavior {
            SinkBehavior::Accept => Ok(()),
            SinkBehavior::Fail => Err(SinkError::Rejected("recording sink told to fail".into())),
            SinkBehavior::Panic => panic!("recording sink told to panic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::ByteRange;
    use tokio_test::{assert_pending, assert_ready_ok, task};
    use url::Url;

    async fn drain(mut body: Box<dyn ResponseBody>) -> Result<Vec<u8>, TransportError> {
        let mut out = Vec::new();
        while let Some(chunk) = body.chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }

    #[test]
    fn stalled_body_stays_pending_after_its_bytes() {
        let transport = FakeTransport::new().with_route(
            "https://cdn.example.com/a.bin",
            FakeRoute::Stall(b"ab".to_vec()),
        );
        let url = Url::parse("https://cdn.example.com/a.bin").unwrap();

        let mut get = task::spawn(transport.get(TransportRequest::get(url)));
        let mut body = assert_ready_ok!(get.poll());

        let mut first = task::spawn(body.chunk());
        assert_eq!(assert_ready_ok!(first.poll()), Some(Bytes::from_static(b"ab")));
        drop(first);

        let mut next = task::spawn(body.chunk());
        assert_pending!(next.poll());
        assert_pending!(next.poll());
    }

    #[tokio::test]
    async fn serves_bodies_in_chunks() {
        let transport = FakeTransport::new()
            .with_chunk_size(3)
            .with_body("https://cdn.example.com/a.bin", b"abcdefgh".to_vec());
        let url = Url::parse("https://cdn.example.com/a.bin").unwrap();

        let body = transport.get(TransportRequest::get(url)).await.unwrap();
        assert_eq!(body.content_length(), Some(8));
        assert_eq!(drain(body).await.unwrap(), b"abcdefgh");
    }

    #[tokio::test]
    async fn slices_range_requests_and_logs_them() {
        let transport =
            FakeTransport::new().with_body("https://cdn.example.com/a.bin", b"abcdefgh".to_vec());
        let url = Url::parse("https://cdn.example.com/a.bin").unwrap();

        let request = TransportRequest::get(url).with_range(ByteRange::new(2, 4));
        let body = transport.get(request).await.unwrap();
        assert_eq!(drain(body).await.unwrap(), b"cde");

        let log = transport.requests();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].range, Some(ByteRange::new(2, 4)));
    }

    #[tokio::test]
    async fn unknown_urls_are_not_found() {
        let transport = FakeTransport::new();
        let url = Url::parse("https://cdn.example.com/missing").unwrap();
        let err = transport.get(TransportRequest::get(url)).await.err().unwrap();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn truncated_body_fails_after_data() {
        let transport = FakeTransport::new().with_route(
            "https://cdn.example.com/a.bin",
            FakeRoute::Truncated(b"abc".to_vec()),
        );
        let url = Url::parse("https://cdn.example.com/a.bin").unwrap();
        let mut body = transport.get(TransportRequest::get(url)).await.unwrap();
        assert!(body.chunk().await.unwrap().is_some());
        assert!(body.chunk().await.unwrap_err().is_http_classified());
    }

    #[test]
    fn recording_sink_splits_events() {
        let sink = RecordingSink::new();
        sink.emit(InstallEvent::state(InstallState::Preparing)).unwrap();
        sink.emit(InstallEvent::progress(InstallProgress::seeded(0, 1, 0, 1)))
            .unwrap();
        assert_eq!(sink.states(), vec![InstallState::Preparing]);
        assert_eq!(sink.progress().len(), 1);
        assert_eq!(sink.events().len(), 2);
    }

    #[test]
    fn failing_sink_still_records() {
        let sink = RecordingSink::with_behavior(SinkBehavior::Fail);
        assert!(sink.emit(InstallEvent::state(InstallState::Preparing)).is_err());
        assert_eq!(sink.states().len(), 1);
    }
}

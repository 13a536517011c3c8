//! Fakes shared by the client unit tests.

use async_trait::async_trait;
use reading_list_core::ports::{Clock, PortError, PortResult, RelayTransport};
use reading_list_core::relay::{RelayEnvelope, RelayRequest};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

/// A clock that only moves when told to.
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new(now_millis: i64) -> Self {
        Self(AtomicI64::new(now_millis))
    }

    pub fn set(&self, now_millis: i64) {
        self.0.store(now_millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Records every request and answers from a script; the last answer repeats.
pub struct RecordingRelay {
    answers: Mutex<VecDeque<RelayEnvelope>>,
    requests: Mutex<Vec<RelayRequest>>,
}

impl RecordingRelay {
    pub fn new(answers: Vec<RelayEnvelope>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(answer: RelayEnvelope) -> Self {
        Self::new(vec![answer])
    }

    pub fn requests(&self) -> Vec<RelayRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RelayTransport for RecordingRelay {
    async fn relay(&self, request: RelayRequest) -> PortResult<RelayEnvelope> {
        self.requests.lock().unwrap().push(request);
        let mut answers = self.answers.lock().unwrap();
        let answer = if answers.len() > 1 {
            answers.pop_front()
        } else {
            answers.front().cloned()
        };
        answer.ok_or_else(|| PortError::Unexpected("no scripted answer".to_string()))
    }
}

use crate::{PublishError, Publisher};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// Publisher that records every accepted payload instead of sending it.
#[derive(Default)]
pub struct RecordingPublisher {
    published: Mutex<Vec<(String, String)>>,
    failing_calls: Mutex<HashSet<usize>>,
    calls: Mutex<usize>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the `n`th call to `publish` (zero-based) fail with a timeout.
    pub fn fail_call(self, n: usize) -> Self {
        self.failing_calls.lock().unwrap().insert(n);
        self
    }

    /// `(topic, payload)` pairs in the order they were accepted.
    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), PublishError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let call = *calls;
            *calls += 1;
            call
        };

        if self.failing_calls.lock().unwrap().contains(&call) {
            return Err(PublishError::Timeout(Duration::ZERO));
        }

        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

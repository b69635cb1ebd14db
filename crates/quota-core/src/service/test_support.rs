//! Scripted store and fixed clock for exercising each branch of the protocol.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{UsageRecord, WindowKey};
use crate::error::StoreError;
use crate::ports::{Clock, CreateOutcome, UsageStore};

pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 2024-05-01T12:34:20Z, twenty seconds into its window.
pub(crate) fn noon_ish() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 34, 20).unwrap()
}

/// Store that replays queued answers and records which primitives were called.
#[derive(Default)]
pub(crate) struct ScriptedStore {
    increments: Mutex<VecDeque<Result<Option<u32>, StoreError>>>,
    reads: Mutex<VecDeque<Result<Option<u32>, StoreError>>>,
    creates: Mutex<VecDeque<Result<CreateOutcome, StoreError>>>,
    calls: Mutex<Vec<&'static str>>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_increment(self, answer: Result<Option<u32>, StoreError>) -> Self {
        self.increments.lock().unwrap().push_back(answer);
        self
    }

    pub fn on_read(self, answer: Result<Option<u32>, StoreError>) -> Self {
        self.reads.lock().unwrap().push_back(answer);
        self
    }

    pub fn on_create(self, answer: Result<CreateOutcome, StoreError>) -> Self {
        self.creates.lock().unwrap().push_back(answer);
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl UsageStore for ScriptedStore {
    async fn conditional_increment(
        &self,
        _key: &WindowKey,
        _limit: u32,
    ) -> Result<Option<u32>, StoreError> {
        self.record("increment");
        self.increments
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected conditional_increment")
    }

    async fn read(&self, key: &WindowKey) -> Result<Option<UsageRecord>, StoreError> {
        self.record("read");
        let answer = self
            .reads
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected read")?;
        Ok(answer.map(|count| UsageRecord::new(key.clone(), count)))
    }

    async fn create_if_absent(&self, _key: &WindowKey) -> Result<CreateOutcome, StoreError> {
        self.record("create");
        self.creates
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected create_if_absent")
    }

    fn backend(&self) -> &'static str {
        "scripted"
    }
}

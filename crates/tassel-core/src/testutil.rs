//! Test utilities: mock implementations of the core traits for unit and
//! integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{
    DetailRecord, StandardizedProgram, StandardizedRecord, StubRecord, UNKNOWN_UNIVERSITY,
};
use crate::site::SiteConfig;
use crate::traits::{Fetcher, RecordStore, Standardizer};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

enum MockResponse {
    Body(String),
    Unavailable,
}

/// In-memory Fetcher serving canned pages and recording every request.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, MockResponse>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.into(), MockResponse::Body(body.into()));
        self
    }

    /// Fail every fetch of `url`. Unmapped URLs fail the same way.
    pub fn with_unavailable(self, url: impl Into<String>) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert(url.into(), MockResponse::Unavailable);
        self
    }

    /// Every URL fetched so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url) {
            Some(MockResponse::Body(body)) => Ok(body.clone()),
            Some(MockResponse::Unavailable) | None => {
                Err(AppError::HttpError(format!("HTTP 404 for {url}")))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// MockStandardizer
// ---------------------------------------------------------------------------

/// In-memory Standardizer with canned pairs and a call log.
///
/// Inputs without a canned pair echo the input as the program and fall back
/// to the "Unknown" university sentinel.
#[derive(Clone, Default)]
pub struct MockStandardizer {
    pairs: Arc<Mutex<HashMap<String, StandardizedProgram>>>,
    fail: bool,
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockStandardizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a combined input string to a canned standardized pair.
    pub fn with_pair(
        self,
        input: impl Into<String>,
        program: impl Into<String>,
        university: impl Into<String>,
    ) -> Self {
        self.pairs.lock().unwrap().insert(
            input.into(),
            StandardizedProgram {
                program: program.into(),
                university: university.into(),
            },
        );
        self
    }

    /// Fail every call with a retryable standardizer error.
    pub fn with_error(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Every batch passed to `standardize` so far, in call order.
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }
}

impl Standardizer for MockStandardizer {
    async fn standardize(&self, programs: &[String]) -> Result<Vec<StandardizedProgram>, AppError> {
        self.calls.lock().unwrap().push(programs.to_vec());
        if self.fail {
            return Err(AppError::StandardizerError {
                message: "mock standardizer failure".to_string(),
                status_code: 500,
                retryable: true,
            });
        }
        let pairs = self.pairs.lock().unwrap();
        Ok(programs
            .iter()
            .map(|input| {
                pairs.get(input).cloned().unwrap_or_else(|| StandardizedProgram {
                    program: input.clone(),
                    university: UNKNOWN_UNIVERSITY.to_string(),
                })
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// In-memory RecordStore with a fixed watermark and url-deduplicated upserts.
#[derive(Clone, Default)]
pub struct MockStore {
    watermark: Option<u64>,
    fail_upsert: bool,
    saved: Arc<Mutex<Vec<StandardizedRecord>>>,
}

impl MockStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_watermark(id: u64) -> Self {
        Self {
            watermark: Some(id),
            ..Self::default()
        }
    }

    /// Fail every upsert with a store error.
    pub fn with_upsert_error(mut self) -> Self {
        self.fail_upsert = true;
        self
    }

    /// Every record persisted so far, in insertion order.
    pub fn saved(&self) -> Vec<StandardizedRecord> {
        self.saved.lock().unwrap().clone()
    }
}

impl RecordStore for MockStore {
    async fn max_record_id(&self) -> Result<Option<u64>, AppError> {
        Ok(self.watermark)
    }

    async fn upsert(&self, records: &[StandardizedRecord]) -> Result<u64, AppError> {
        if self.fail_upsert {
            return Err(AppError::StoreError("mock upsert failure".to_string()));
        }
        let mut saved = self.saved.lock().unwrap();
        let mut written = 0;
        for record in records {
            if saved.iter().any(|existing| existing.record.url == record.record.url) {
                continue;
            }
            saved.push(record.clone());
            written += 1;
        }
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A stub with the given id and no inline fields.
pub fn make_stub(id: u64) -> StubRecord {
    StubRecord {
        id,
        date_added: None,
        term: None,
        gre_total: None,
        gre_verbal: None,
        gre_aw: None,
    }
}

/// A detail record with the given field pairs and the default detail URL.
pub fn make_detail_record(id: u64, fields: &[(&str, &str)]) -> DetailRecord {
    DetailRecord {
        id,
        url: SiteConfig::default().detail_url(id),
        fields: fields
            .iter()
            .map(|(label, value)| (label.to_string(), value.to_string()))
            .collect(),
    }
}

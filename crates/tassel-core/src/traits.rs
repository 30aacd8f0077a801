use std::future::Future;

use crate::error::AppError;
use crate::models::{StandardizedProgram, StandardizedRecord};

/// Fetches a page body from a URL.
///
/// One GET per call, bounded timeout, no retries. Callers treat every
/// failure alike: the page is unavailable and its unit of work is dropped.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;
}

/// Standardizes a batch of combined "program, university" strings.
///
/// The output is index-aligned with the input and has the same length.
/// The same input string always maps to the same output pair, which is what
/// makes results cacheable client-side.
pub trait Standardizer: Send + Sync + Clone {
    fn standardize(
        &self,
        programs: &[String],
    ) -> impl Future<Output = Result<Vec<StandardizedProgram>, AppError>> + Send;
}

/// Persists standardized records and answers the watermark query.
pub trait RecordStore: Send + Sync + Clone {
    /// Highest record id already persisted, or None for an empty store.
    fn max_record_id(&self) -> impl Future<Output = Result<Option<u64>, AppError>> + Send;

    /// Idempotent upsert keyed on `url`; a duplicate url is a no-op, not an
    /// error. Returns the number of records newly written.
    fn upsert(
        &self,
        records: &[StandardizedRecord],
    ) -> impl Future<Output = Result<u64, AppError>> + Send;
}

/// A no-op RecordStore for crawls without persistence.
#[derive(Debug, Clone)]
pub struct NullStore;

impl RecordStore for NullStore {
    async fn max_record_id(&self) -> Result<Option<u64>, AppError> {
        Ok(None)
    }

    async fn upsert(&self, _records: &[StandardizedRecord]) -> Result<u64, AppError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNKNOWN_UNIVERSITY;
    use crate::normalize::normalize;
    use crate::testutil::make_detail_record;

    #[tokio::test]
    async fn null_store_reports_no_watermark_and_writes_nothing() {
        let store = NullStore;
        assert_eq!(store.max_record_id().await.unwrap(), None);

        let record = StandardizedRecord {
            record: normalize(&make_detail_record(1, &[("Program", "CS")])),
            standardized_program: "Computer Science".to_string(),
            standardized_university: UNKNOWN_UNIVERSITY.to_string(),
        };
        assert_eq!(store.upsert(&[record]).await.unwrap(), 0);
    }
}

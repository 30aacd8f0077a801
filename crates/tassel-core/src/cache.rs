//! Client-side standardizer caching: one upstream call per distinct input.

use std::collections::HashMap;

use moka::future::Cache;

use crate::error::AppError;
use crate::models::StandardizedProgram;
use crate::traits::Standardizer;

pub const DEFAULT_CACHE_CAPACITY: u64 = 100_000;

/// Wraps a Standardizer with an in-memory cache keyed on the input string.
///
/// Each batch is deduplicated before it goes upstream: a distinct uncached
/// string is sent once, and the response is reassembled in input order. An
/// upstream failure caches nothing, so a retry covers the whole batch again.
#[derive(Clone)]
pub struct CachedStandardizer<S: Standardizer> {
    inner: S,
    cache: Cache<String, StandardizedProgram>,
}

impl<S: Standardizer> CachedStandardizer<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(inner, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(inner: S, capacity: u64) -> Self {
        Self {
            inner,
            cache: Cache::new(capacity),
        }
    }
}

impl<S: Standardizer> Standardizer for CachedStandardizer<S> {
    async fn standardize(&self, programs: &[String]) -> Result<Vec<StandardizedProgram>, AppError> {
        let mut misses: Vec<String> = Vec::new();
        let mut resolved: HashMap<&str, StandardizedProgram> = HashMap::new();
        for program in programs {
            if resolved.contains_key(program.as_str()) {
                continue;
            }
            if let Some(hit) = self.cache.get(program).await {
                resolved.insert(program.as_str(), hit);
            } else if !misses.contains(program) {
                misses.push(program.clone());
            }
        }
        tracing::debug!(
            inputs = programs.len(),
            misses = misses.len(),
            "Standardizer cache lookup"
        );

        if !misses.is_empty() {
            let fresh = self.inner.standardize(&misses).await?;
            if fresh.len() != misses.len() {
                return Err(AppError::StandardizerError {
                    message: format!(
                        "standardizer returned {} rows for {} inputs",
                        fresh.len(),
                        misses.len()
                    ),
                    status_code: 200,
                    retryable: false,
                });
            }
            for (input, pair) in misses.iter().zip(fresh) {
                self.cache.insert(input.clone(), pair.clone()).await;
                resolved.insert(input.as_str(), pair);
            }
        }

        programs
            .iter()
            .map(|program| {
                resolved.get(program.as_str()).cloned().ok_or_else(|| {
                    AppError::StandardizerError {
                        message: format!("no standardized row for input {program:?}"),
                        status_code: 200,
                        retryable: false,
                    }
                })
            })
            .collect()
    }
}

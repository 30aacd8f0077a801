//! Crawl orchestration: batched listing scans feeding a detail-fetch pool.

use futures::StreamExt;

use crate::detail::DetailFetcher;
use crate::listing::ListingScanner;
use crate::models::{DetailRecord, StubRecord};
use crate::site::SiteConfig;
use crate::traits::Fetcher;

/// Knobs for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Listing pages requested per batch.
    pub pages_per_batch: u32,
    /// Concurrent listing-page fetches.
    pub listing_concurrency: usize,
    /// Concurrent detail-page fetches.
    pub detail_concurrency: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            pages_per_batch: 5,
            listing_concurrency: 100,
            detail_concurrency: 300,
        }
    }
}

/// Drives the two-phase crawl: listing pages in batches, then detail pages
/// for every stub that survived the watermark filter.
#[derive(Clone)]
pub struct CrawlService<F: Fetcher> {
    listing: ListingScanner<F>,
    detail: DetailFetcher<F>,
    config: CrawlConfig,
}

impl<F: Fetcher> CrawlService<F> {
    pub fn new(fetcher: F, site: SiteConfig) -> Self {
        Self::with_config(fetcher, site, CrawlConfig::default())
    }

    pub fn with_config(fetcher: F, site: SiteConfig, config: CrawlConfig) -> Self {
        Self {
            listing: ListingScanner::new(fetcher.clone(), site.clone()),
            detail: DetailFetcher::new(fetcher, site),
            config,
        }
    }

    /// Scan listing pages until `target_count` new stubs are collected or the
    /// site runs out of them, then fetch every stub's detail page.
    ///
    /// `watermark` is the highest id already persisted; stubs at or below it
    /// are skipped. Records whose detail page is unavailable are dropped, so
    /// the result may come up short of `target_count`. Output order matches
    /// listing order.
    pub async fn crawl(&self, watermark: Option<u64>, target_count: usize) -> Vec<DetailRecord> {
        let stubs = self.scan_batches(watermark, target_count).await;
        tracing::info!(stubs = stubs.len(), "Listing scan complete");

        let fetched: Vec<Option<DetailRecord>> = futures::stream::iter(stubs.iter())
            .map(|stub| self.detail.fetch_detail(stub))
            .buffered(self.config.detail_concurrency.max(1))
            .collect()
            .await;
        let records: Vec<DetailRecord> = fetched.into_iter().flatten().collect();
        tracing::info!(
            fetched = records.len(),
            dropped = stubs.len() - records.len(),
            "Detail fetch complete"
        );
        records
    }

    /// Walk listing pages in fixed-size batches, filtering against the
    /// watermark. A batch with no new stubs ends the scan: either the site is
    /// exhausted or everything from here on is already persisted.
    async fn scan_batches(&self, watermark: Option<u64>, target_count: usize) -> Vec<StubRecord> {
        let pages_per_batch = self.config.pages_per_batch.max(1);
        let mut collected: Vec<StubRecord> = Vec::new();
        let mut next_page: u32 = 1;
        while collected.len() < target_count {
            let batch: Vec<Vec<StubRecord>> =
                futures::stream::iter(next_page..next_page + pages_per_batch)
                    .map(|page| self.listing.scan(page))
                    .buffered(self.config.listing_concurrency.max(1))
                    .collect()
                    .await;
            let fresh: Vec<StubRecord> = batch
                .into_iter()
                .flatten()
                .filter(|stub| watermark.is_none_or(|mark| stub.id > mark))
                .collect();
            if fresh.is_empty() {
                tracing::info!(page = next_page, "No new records in batch; stopping scan");
                break;
            }
            collected.extend(fresh);
            next_page += pages_per_batch;
        }
        collected.truncate(target_count);
        collected
    }
}

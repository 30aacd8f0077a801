//! Core pipeline for admissions survey records: listing discovery, detail
//! fetching, normalization, and standardizer caching.

pub mod cache;
pub mod crawl;
pub mod detail;
pub mod error;
pub mod jsonl;
pub mod listing;
pub mod models;
pub mod normalize;
pub mod site;
pub mod testutil;
pub mod traits;

pub use cache::CachedStandardizer;
pub use crawl::{CrawlConfig, CrawlService};
pub use error::AppError;
pub use models::{
    DetailRecord, NormalizedRecord, StandardizedProgram, StandardizedRecord, StubRecord,
    UNKNOWN_UNIVERSITY,
};
pub use site::SiteConfig;
pub use traits::{Fetcher, NullStore, RecordStore, Standardizer};

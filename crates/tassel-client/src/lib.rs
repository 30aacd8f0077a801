pub mod fetcher;
pub mod standardizer;

pub use fetcher::ReqwestFetcher;
pub use standardizer::HttpStandardizer;

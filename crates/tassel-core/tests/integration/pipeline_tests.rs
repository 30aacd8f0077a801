use tassel_core::crawl::{CrawlConfig, CrawlService};
use tassel_core::jsonl::{read_jsonl, write_jsonl};
use tassel_core::normalize::{normalize, normalize_all};
use tassel_core::testutil::{MockFetcher, MockStandardizer, MockStore, make_detail_record};
use tassel_core::{
    CachedStandardizer, DetailRecord, RecordStore, SiteConfig, StandardizedRecord, Standardizer,
    UNKNOWN_UNIVERSITY,
};

use crate::integration::common::{detail_page, listing_page, record_rows};

#[tokio::test]
async fn crawl_normalize_standardize_persist_round_trip() {
    let site = SiteConfig::default();
    let fetcher = MockFetcher::new()
        .with_page(
            site.listing_url(1),
            listing_page(&[
                record_rows(
                    123,
                    "September 18, 2025",
                    &["Fall 2025", "GRE 330", "GRE V 165", "GRE AW 4.5"],
                ),
                record_rows(122, "September 17, 2025", &[]),
            ]),
        )
        .with_page(
            site.detail_url(123),
            detail_page(&[
                ("Program", "Computer Science"),
                ("Institution", "MIT"),
                ("Decision", "Accepted"),
                ("Notification", "Accepted on 15/04/2025"),
                ("Degree Type", "PhD"),
            ]),
        )
        .with_page(
            site.detail_url(122),
            detail_page(&[("Program", "History"), ("Institution", "Yale")]),
        );

    let config = CrawlConfig {
        pages_per_batch: 1,
        ..CrawlConfig::default()
    };
    let service = CrawlService::with_config(fetcher, site.clone(), config);
    let details = service.crawl(None, 2).await;

    assert_eq!(details.len(), 2);
    assert_eq!(details[0].id, 123);
    assert_eq!(details[0].url, site.detail_url(123));
    assert_eq!(details[0].fields.get("Term").map(String::as_str), Some("Fall 2025"));
    assert_eq!(details[0].fields.get("GRE Score").map(String::as_str), Some("330"));
    assert_eq!(details[0].fields.get("GRE V Score").map(String::as_str), Some("165"));
    assert_eq!(details[0].fields.get("GRE AW").map(String::as_str), Some("4.5"));

    let dir = tempfile::tempdir().unwrap();
    let raw_path = dir.path().join("details.jsonl");
    write_jsonl(&raw_path, &details).unwrap();
    let reloaded: Vec<DetailRecord> = read_jsonl(&raw_path).unwrap();
    assert_eq!(reloaded, details);

    let normalized = normalize_all(&reloaded, reloaded.len());
    assert_eq!(normalized[0].program, "Computer Science, MIT");
    assert_eq!(normalized[0].applicant_status.as_deref(), Some("Accepted"));
    assert_eq!(normalized[0].acceptance_date.as_deref(), Some("15/04/2025"));
    assert_eq!(normalized[0].term.as_deref(), Some("Fall 2025"));
    assert_eq!(normalized[1].program, "History, Yale");

    let standardizer = CachedStandardizer::new(
        MockStandardizer::new()
            .with_pair(
                "Computer Science, MIT",
                "Computer Science",
                "Massachusetts Institute of Technology",
            )
            .with_pair("History, Yale", "History", "Yale University"),
    );
    let inputs: Vec<String> = normalized.iter().map(|r| r.program.clone()).collect();
    let pairs = standardizer.standardize(&inputs).await.unwrap();
    let records: Vec<StandardizedRecord> = normalized
        .into_iter()
        .zip(pairs)
        .map(|(record, pair)| StandardizedRecord {
            record,
            standardized_program: pair.program,
            standardized_university: pair.university,
        })
        .collect();

    let store = MockStore::empty();
    assert_eq!(store.upsert(&records).await.unwrap(), 2);
    // Same records again: the upsert is idempotent on url.
    assert_eq!(store.upsert(&records).await.unwrap(), 0);
    let saved = store.saved();
    assert_eq!(saved.len(), 2);
    assert_eq!(
        saved[0].standardized_university,
        "Massachusetts Institute of Technology"
    );
}

#[tokio::test]
async fn watermark_from_store_skips_persisted_records() {
    let site = SiteConfig::default();
    let fetcher = MockFetcher::new()
        .with_page(
            site.listing_url(1),
            listing_page(&[
                record_rows(123, "September 18, 2025", &[]),
                record_rows(122, "September 17, 2025", &[]),
            ]),
        )
        .with_page(site.listing_url(2), listing_page(&[]))
        .with_page(site.detail_url(123), detail_page(&[("Program", "CS")]));

    let store = MockStore::with_watermark(122);
    let watermark = store.max_record_id().await.unwrap();

    let config = CrawlConfig {
        pages_per_batch: 1,
        ..CrawlConfig::default()
    };
    let service = CrawlService::with_config(fetcher.clone(), site.clone(), config);
    let details = service.crawl(watermark, 10).await;

    let ids: Vec<u64> = details.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![123]);
    assert!(!fetcher.requests().contains(&site.detail_url(122)));
}

#[tokio::test]
async fn unmatched_program_gets_the_unknown_sentinel_on_the_wire() {
    let standardizer = CachedStandardizer::new(MockStandardizer::new());
    let pairs = standardizer
        .standardize(&["Basket Weaving, Nowhere State".to_string()])
        .await
        .unwrap();
    assert_eq!(pairs[0].university, UNKNOWN_UNIVERSITY);

    let detail = make_detail_record(
        9,
        &[("Program", "Basket Weaving"), ("Institution", "Nowhere State")],
    );
    let record = StandardizedRecord {
        record: normalize(&detail),
        standardized_program: pairs[0].program.clone(),
        standardized_university: pairs[0].university.clone(),
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["program"], "Basket Weaving, Nowhere State");
    assert_eq!(json["llm-generated-program"], "Basket Weaving, Nowhere State");
    assert_eq!(json["llm-generated-university"], "Unknown");
}

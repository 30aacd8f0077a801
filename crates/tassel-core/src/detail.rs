//! Detail-page fetching: one record's page in, its label → value map out.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::models::{DetailRecord, StubRecord};
use crate::site::SiteConfig;
use crate::traits::Fetcher;

static BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dl > div").unwrap());
static LABEL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dt").unwrap());
static VALUE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("dd").unwrap());

/// Fetches and parses per-record detail pages.
#[derive(Clone)]
pub struct DetailFetcher<F: Fetcher> {
    fetcher: F,
    site: SiteConfig,
}

impl<F: Fetcher> DetailFetcher<F> {
    pub fn new(fetcher: F, site: SiteConfig) -> Self {
        Self { fetcher, site }
    }

    /// Fetch one record's detail page and merge its fields with the stub's.
    ///
    /// An unavailable page drops the record: returns None, never an error.
    pub async fn fetch_detail(&self, stub: &StubRecord) -> Option<DetailRecord> {
        let url = self.site.detail_url(stub.id);
        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!(id = stub.id, error = %e, "Detail page unavailable; dropping record");
                return None;
            }
        };

        let mut fields = parse_detail_fields(&html);
        overlay_stub_fields(&mut fields, stub);

        Some(DetailRecord {
            id: stub.id,
            url,
            fields,
        })
    }
}

/// Extract label → value pairs from the detail page's definition list.
///
/// Each `dl > div` block contributes its first `dt` as the label and first
/// `dd` as the value, both text-extracted and trimmed. Blocks missing either
/// side are skipped.
pub fn parse_detail_fields(html: &str) -> BTreeMap<String, String> {
    let document = Html::parse_document(html);
    let mut fields = BTreeMap::new();
    for block in document.select(&BLOCK_SELECTOR) {
        let Some(label) = block.select(&LABEL_SELECTOR).next() else {
            continue;
        };
        let Some(value) = block.select(&VALUE_SELECTOR).next() else {
            continue;
        };
        let label = label.text().collect::<String>().trim().to_string();
        let value = value.text().collect::<String>().trim().to_string();
        fields.insert(label, value);
    }
    fields
}

/// Overlay the stub's inline fields onto the parsed map.
///
/// The stub is authoritative for its five keys: a present value replaces
/// the page's, an absent one removes it. Every other key comes exclusively
/// from the detail page.
fn overlay_stub_fields(fields: &mut BTreeMap<String, String>, stub: &StubRecord) {
    let overlays = [
        ("Date Added", &stub.date_added),
        ("Term", &stub.term),
        ("GRE Score", &stub.gre_total),
        ("GRE V Score", &stub.gre_verbal),
        ("GRE AW", &stub.gre_aw),
    ];
    for (key, value) in overlays {
        match value {
            Some(v) => {
                fields.insert(key.to_string(), v.clone());
            }
            None => {
                fields.remove(key);
            }
        }
    }
}

//! Listing-page scanning: one survey page in, stub records out.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::StubRecord;
use crate::site::SiteConfig;
use crate::traits::Fetcher;

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Badge elements on the row following a record row.
static BADGE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.tw-inline-flex").unwrap());

/// Season name or abbreviation followed by a 2-4 digit year, e.g.
/// "Fall 2025", "F25".
static TERM_BADGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(Fall|Spring|Summer|Winter|F|S|Su|W)\s*\d{2,4}$").unwrap()
});

// Badge prefixes. AW and V are checked before the generic GRE prefix so
// verbal/AW scores never land in the total.
const GRE_AW_PREFIX: &str = "GRE AW";
const GRE_VERBAL_PREFIX: &str = "GRE V";
const GRE_TOTAL_PREFIX: &str = "GRE ";

/// Scans listing pages for stub records.
#[derive(Clone)]
pub struct ListingScanner<F: Fetcher> {
    fetcher: F,
    site: SiteConfig,
}

impl<F: Fetcher> ListingScanner<F> {
    pub fn new(fetcher: F, site: SiteConfig) -> Self {
        Self { fetcher, site }
    }

    /// Fetch one listing page and extract its stub records.
    ///
    /// An unavailable page (non-200, timeout, connection error) yields an
    /// empty list, indistinguishable from a valid page with zero rows.
    pub async fn scan(&self, page: u32) -> Vec<StubRecord> {
        let url = self.site.listing_url(page);
        match self.fetcher.fetch(&url).await {
            Ok(html) => parse_listing(&html, &self.site),
            Err(e) => {
                tracing::debug!(page, error = %e, "Listing page unavailable; skipping");
                Vec::new()
            }
        }
    }
}

/// Extract stub records from listing-page HTML, in row-encounter order.
///
/// A row containing a record-link anchor starts a record and consumes two
/// rows: itself and the badge row after it. Rows without an anchor advance
/// by one. A row whose anchor id does not parse is dropped silently but
/// still consumes its badge row.
pub fn parse_listing(html: &str, site: &SiteConfig) -> Vec<StubRecord> {
    let document = Html::parse_document(html);
    let rows: Vec<ElementRef<'_>> = document.select(&ROW_SELECTOR).collect();

    let mut stubs = Vec::new();
    let mut i = 0;
    while i < rows.len() {
        let row = rows[i];
        let Some(href) = record_anchor_href(row, site) else {
            i += 1;
            continue;
        };

        let badges = rows
            .get(i + 1)
            .map(|badge_row| parse_badges(*badge_row))
            .unwrap_or_default();
        i += 2;

        let Some(id) = site.record_id_from_href(&href) else {
            continue;
        };

        stubs.push(StubRecord {
            id,
            date_added: third_cell_text(row),
            term: badges.term,
            gre_total: badges.gre_total,
            gre_verbal: badges.gre_verbal,
            gre_aw: badges.gre_aw,
        });
    }
    stubs
}

/// Href of the first record-link anchor in a row, if any.
fn record_anchor_href(row: ElementRef<'_>, site: &SiteConfig) -> Option<String> {
    row.select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .find(|href| href.contains(&site.record_path_prefix))
        .map(str::to_string)
}

#[derive(Default)]
struct BadgeFields {
    term: Option<String>,
    gre_total: Option<String>,
    gre_verbal: Option<String>,
    gre_aw: Option<String>,
}

/// Classify the badge texts of a badge row. Unmatched badges are ignored.
fn parse_badges(row: ElementRef<'_>) -> BadgeFields {
    let mut fields = BadgeFields::default();
    for badge in row.select(&BADGE_SELECTOR) {
        let text = badge.text().collect::<String>().trim().to_string();
        if text.is_empty() {
            continue;
        }
        if TERM_BADGE.is_match(&text) {
            fields.term = Some(text);
        } else if let Some(rest) = text.strip_prefix(GRE_AW_PREFIX) {
            fields.gre_aw = Some(rest.trim().to_string());
        } else if let Some(rest) = text.strip_prefix(GRE_VERBAL_PREFIX) {
            fields.gre_verbal = Some(rest.trim().to_string());
        } else if let Some(rest) = text.strip_prefix(GRE_TOTAL_PREFIX) {
            fields.gre_total = Some(rest.trim().to_string());
        }
    }
    fields
}

/// Date-added sits in the fixed 3rd cell of a record row.
fn third_cell_text(row: ElementRef<'_>) -> Option<String> {
    let cell = row.select(&CELL_SELECTOR).nth(2)?;
    let text = cell.text().collect::<String>().trim().to_string();
    (!text.is_empty()).then_some(text)
}

/// Where the survey site lives and how its URLs are shaped.
///
/// Every site-specific string sits here, so an upstream route change is a
/// one-place edit (and tests can point the pipeline at fixture hosts).
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Listing endpoint; the page number is appended as a query parameter.
    pub listing_base: String,
    /// Detail endpoint; the record id is appended as a path segment.
    pub detail_base: String,
    /// Path prefix record-link anchors carry on listing pages.
    pub record_path_prefix: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_base: "https://www.thegradcafe.com/survey/".to_string(),
            detail_base: "https://www.thegradcafe.com/result/".to_string(),
            record_path_prefix: "/result/".to_string(),
        }
    }
}

impl SiteConfig {
    /// URL of one listing page.
    pub fn listing_url(&self, page: u32) -> String {
        format!("{}?page={page}", self.listing_base)
    }

    /// URL of one record's detail page.
    pub fn detail_url(&self, id: u64) -> String {
        format!("{}{id}", self.detail_base)
    }

    /// Parse the numeric record id out of an anchor href: the segment after
    /// the record path prefix, up to an optional fragment.
    ///
    /// Anything that does not parse as a positive integer yields None; the
    /// caller drops such rows silently.
    pub fn record_id_from_href(&self, href: &str) -> Option<u64> {
        let tail = href.rsplit(self.record_path_prefix.as_str()).next()?;
        let id_part = tail.split('#').next()?;
        id_part.trim().parse::<u64>().ok().filter(|id| *id > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_appends_page_parameter() {
        let site = SiteConfig::default();
        assert_eq!(
            site.listing_url(3),
            "https://www.thegradcafe.com/survey/?page=3"
        );
    }

    #[test]
    fn detail_url_appends_id() {
        let site = SiteConfig::default();
        assert_eq!(
            site.detail_url(123),
            "https://www.thegradcafe.com/result/123"
        );
    }

    #[test]
    fn record_id_parses_relative_href() {
        let site = SiteConfig::default();
        assert_eq!(site.record_id_from_href("/result/123"), Some(123));
    }

    #[test]
    fn record_id_parses_absolute_href() {
        let site = SiteConfig::default();
        assert_eq!(
            site.record_id_from_href("https://www.thegradcafe.com/result/456"),
            Some(456)
        );
    }

    #[test]
    fn record_id_strips_fragment() {
        let site = SiteConfig::default();
        assert_eq!(site.record_id_from_href("/result/123#comment-9"), Some(123));
    }

    #[test]
    fn record_id_reads_the_segment_after_the_last_prefix() {
        let site = SiteConfig::default();
        assert_eq!(
            site.record_id_from_href("/result/archive/result/123"),
            Some(123)
        );
    }

    #[test]
    fn record_id_rejects_non_numeric() {
        let site = SiteConfig::default();
        assert_eq!(site.record_id_from_href("/result/notanumber"), None);
    }

    #[test]
    fn record_id_rejects_zero_and_missing_prefix() {
        let site = SiteConfig::default();
        assert_eq!(site.record_id_from_href("/result/0"), None);
        assert_eq!(site.record_id_from_href("/survey/123"), None);
    }
}

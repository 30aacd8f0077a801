//! Shared page fixtures for the pipeline tests.

/// One record's pair of listing rows: the anchor row (link, category, date)
/// followed by its badge row.
pub fn record_rows(id: u64, date: &str, badges: &[&str]) -> String {
    let badge_divs: String = badges
        .iter()
        .map(|badge| format!("<div class=\"tw-inline-flex\">{badge}</div>"))
        .collect();
    format!(
        "<tr><td><a href=\"/result/{id}\">See more</a></td><td></td><td>{date}</td></tr>\
         <tr><td>{badge_divs}</td></tr>"
    )
}

pub fn listing_page(rows: &[String]) -> String {
    format!(
        "<html><body><table><tbody>{}</tbody></table></body></html>",
        rows.concat()
    )
}

pub fn detail_page(pairs: &[(&str, &str)]) -> String {
    let blocks: String = pairs
        .iter()
        .map(|(dt, dd)| format!("<div><dt>{dt}</dt><dd>{dd}</dd></div>"))
        .collect();
    format!("<html><body><dl>{blocks}</dl></body></html>")
}

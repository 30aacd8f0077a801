//! Normalization: raw detail-page fields into the cleaned record shape.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::models::{DetailRecord, NormalizedRecord};

static SPAN_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());
static DECISION_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").unwrap());

// Source labels per output field, in precedence order. The first label whose
// cell yields a non-empty value wins.
const PROGRAM_LABELS: &[&str] = &["Program"];
const UNIVERSITY_LABELS: &[&str] = &["Institution"];
const COMMENTS_LABELS: &[&str] = &["Notes"];
const DATE_ADDED_LABELS: &[&str] = &["Date Added"];
const STATUS_LABELS: &[&str] = &["Decision", "Status"];
const TERM_LABELS: &[&str] = &["Term"];
const NATIONALITY_LABELS: &[&str] = &["Degree's Country of Origin"];
const GRE_TOTAL_LABELS: &[&str] = &["GRE Score"];
const GRE_VERBAL_LABELS: &[&str] = &["GRE V Score"];
const DEGREE_LABELS: &[&str] = &["Degree Type"];
const GPA_LABELS: &[&str] = &["Undergrad GPA"];
const GRE_AW_LABELS: &[&str] = &["GRE AW"];

const NOTIFICATION_LABEL: &str = "Notification";
const STATUS_ACCEPTED: &str = "Accepted";
const STATUS_REJECTED: &str = "Rejected";

/// Map one detail record's raw fields into the cleaned shape.
///
/// `program` holds the combined "program, university" string; a side that is
/// missing contributes nothing, and no separator dangles. Decision dates are
/// mined from the raw Notification field and land on the side the status
/// says they belong to.
pub fn normalize(record: &DetailRecord) -> NormalizedRecord {
    let fields = &record.fields;
    let program = pick(fields, PROGRAM_LABELS);
    let university = pick(fields, UNIVERSITY_LABELS);
    let applicant_status = pick(fields, STATUS_LABELS);
    let notification = fields.get(NOTIFICATION_LABEL).map(String::as_str);
    let (acceptance_date, rejection_date) =
        decision_dates(applicant_status.as_deref(), notification);

    NormalizedRecord {
        program: combine_program_university(
            program.as_deref().unwrap_or(""),
            university.as_deref().unwrap_or(""),
        ),
        comments: pick(fields, COMMENTS_LABELS),
        date_added: pick(fields, DATE_ADDED_LABELS),
        applicant_status,
        acceptance_date,
        rejection_date,
        term: pick(fields, TERM_LABELS),
        nationality_bucket: pick(fields, NATIONALITY_LABELS),
        gre_total: pick(fields, GRE_TOTAL_LABELS),
        gre_verbal: pick(fields, GRE_VERBAL_LABELS),
        degree: pick(fields, DEGREE_LABELS),
        gpa: pick(fields, GPA_LABELS),
        gre_aw: pick(fields, GRE_AW_LABELS),
        url: record.url.clone(),
    }
}

/// Normalize at most `target_count` records, preserving input order.
pub fn normalize_all(records: &[DetailRecord], target_count: usize) -> Vec<NormalizedRecord> {
    records.iter().take(target_count).map(normalize).collect()
}

/// First label whose cell yields a non-empty value, extracted and trimmed.
fn pick(fields: &BTreeMap<String, String>, labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| {
        // The cell is parsed untrimmed: a blank text node after a label span
        // marks a valueless cell, and trimming first would erase it.
        let value = fields.get(*label)?;
        if value.trim().is_empty() {
            return None;
        }
        extract_label_text(value, label)
    })
}

/// Pull the value text out of a cell that may carry label markup.
///
/// A cell like `<span>Program</span>Computer Science` repeats its label in a
/// leading span; the value is whatever follows that span. Cells without a
/// matching span contribute their full text. A matching span whose sibling is
/// blank means the cell holds no value at all.
fn extract_label_text(value: &str, label: &str) -> Option<String> {
    let fragment = Html::parse_fragment(value);
    let span = fragment
        .select(&SPAN_SELECTOR)
        .find(|span| span.text().collect::<String>().trim() == label);
    if let Some(span) = span {
        if let Some(sibling) = span.next_sibling() {
            // The sibling is either a bare text node or an element.
            let text = if let Some(text_node) = sibling.value().as_text() {
                text_node.text.to_string()
            } else if let Some(element) = ElementRef::wrap(sibling) {
                element.text().collect()
            } else {
                String::new()
            };
            let text = text.trim();
            return (!text.is_empty()).then(|| text.to_string());
        }
    }
    let text = fragment.root_element().text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Join program and university with ", ", skipping whichever side is empty.
/// Trailing commas on the joined value are trimmed.
fn combine_program_university(program: &str, university: &str) -> String {
    let program = program.trim();
    let university = university.trim();
    let combined = match (program.is_empty(), university.is_empty()) {
        (false, false) => format!("{program}, {university}"),
        (false, true) => program.to_string(),
        (true, false) => university.to_string(),
        (true, true) => String::new(),
    };
    combined.trim_end_matches(',').to_string()
}

/// Route the first dd/mm/yyyy date in the notification to the decision side
/// named by the status. Statuses other than Accepted or Rejected get neither.
fn decision_dates(
    status: Option<&str>,
    notification: Option<&str>,
) -> (Option<String>, Option<String>) {
    let Some(notification) = notification else {
        return (None, None);
    };
    let Some(date) = DECISION_DATE
        .find(notification)
        .map(|m| m.as_str().to_string())
    else {
        return (None, None);
    };
    match status {
        Some(STATUS_ACCEPTED) => (Some(date), None),
        Some(STATUS_REJECTED) => (None, Some(date)),
        _ => (None, None),
    }
}

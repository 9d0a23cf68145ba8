//! In-memory search, sort and pagination over backend records.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::gateway::Record;

pub const ITEMS_PER_PAGE: usize = 15;

/// Pages shown either side of the current one
const PAGE_WINDOW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than `asc` sorts newest first
    pub fn parse(order: Option<&str>) -> Self {
        match order {
            Some(order) if order.eq_ignore_ascii_case("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One page of records plus the numbers needed to draw a pager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<Record>,
    pub total_count: usize,
    pub current_page: usize,
    pub last_page: usize,
    pub has_next: bool,
    pub has_prev: bool,
    pub page_range: Vec<usize>,
}

/// Text form of a field; missing and null fields read as empty
pub fn field_text(record: &Record, field: &str) -> String {
    match record.get(field) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Keeps records where any of `fields` contains `query`, ignoring case
pub fn filter_records(records: Vec<Record>, query: &str, fields: &[&str]) -> Vec<Record> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|record| {
            fields
                .iter()
                .any(|field| field_text(record, field).to_lowercase().contains(&needle))
        })
        .collect()
}

/// Stable sort on one field; numbers compare numerically, everything else as text
pub fn sort_records(records: &mut [Record], field: &str, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = compare_field(a, b, field);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_field(a: &Record, b: &Record, field: &str) -> Ordering {
    match (
        a.get(field).and_then(Value::as_f64),
        b.get(field).and_then(Value::as_f64),
    ) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => field_text(a, field).cmp(&field_text(b, field)),
    }
}

/// Parses a page number from the query string, falling back to the first page
pub fn parse_page(page: Option<&str>) -> usize {
    page.and_then(|page| page.trim().parse::<usize>().ok())
        .unwrap_or(1)
}

/// Slices out the requested page, clamping out-of-range requests to the nearest page
pub fn paginate(records: Vec<Record>, requested_page: usize, per_page: usize) -> Page {
    let per_page = per_page.max(1);
    let total_count = records.len();
    let last_page = total_count.div_ceil(per_page).max(1);
    let current_page = requested_page.clamp(1, last_page);

    let start = (current_page - 1) * per_page;
    let items = records.into_iter().skip(start).take(per_page).collect();

    let window_start = current_page.saturating_sub(PAGE_WINDOW).max(1);
    let window_end = (current_page + PAGE_WINDOW).min(last_page);

    Page {
        items,
        total_count,
        current_page,
        last_page,
        has_next: current_page < last_page,
        has_prev: current_page > 1,
        page_range: (window_start..=window_end).collect(),
    }
}

//! Search module for filter parsing, record predicates, sorting and paging.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entity::Entity;
use crate::status::Status;

/// Sentinel filter value that matches every status.
pub const ALL_STATUSES: &str = "all";

/// Parsed search filter from query string.
///
/// Filters can be specified in the query string using prefixes:
/// - `status:approved` - Filter by status (`status:all` matches everything)
/// - `tag:important` - Filter by tag (can specify multiple)
/// - `created:>2025-01-01` - Created after date
/// - `created:<2025-12-31` - Created before date
#[derive(Debug, Default, Clone)]
pub struct SearchFilter {
    /// Status filter, as typed
    pub status: Option<String>,
    /// Tag filters (entity must have all specified tags)
    pub tags: Vec<String>,
    /// Created after this date/time
    pub created_after: Option<DateTime<Utc>>,
    /// Created before this date/time
    pub created_before: Option<DateTime<Utc>>,
}

impl SearchFilter {
    /// Create an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if filter has any constraints.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.tags.is_empty()
            && self.created_after.is_none()
            && self.created_before.is_none()
    }
}

/// Parse a raw query string into (remaining query text, filters).
///
/// # Examples
///
/// ```ignore
/// let (query, filter) = parse_query("status:paid tag:q3 acme");
/// assert_eq!(query, "acme");
/// assert_eq!(filter.status, Some("paid".to_string()));
/// assert_eq!(filter.tags, vec!["q3".to_string()]);
/// ```
pub fn parse_query(raw: &str) -> (String, SearchFilter) {
    let mut filter = SearchFilter::default();
    let mut remaining = Vec::new();

    for token in raw.split_whitespace() {
        if let Some(value) = token.strip_prefix("status:") {
            filter.status = Some(value.to_string());
        } else if let Some(value) = token.strip_prefix("tag:") {
            filter.tags.push(value.to_string());
        } else if let Some(value) = token.strip_prefix("created:>") {
            filter.created_after = parse_date(value);
        } else if let Some(value) = token.strip_prefix("created:<") {
            filter.created_before = parse_date(value);
        } else {
            remaining.push(token);
        }
    }

    (remaining.join(" "), filter)
}

/// Parse a date string into DateTime<Utc>.
/// Supports ISO 8601 date format (YYYY-MM-DD) or full datetime.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    // Try full datetime first
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    // Try date only (YYYY-MM-DD) - set to midnight UTC
    if let Ok(date) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let datetime = date.and_hms_opt(0, 0, 0)?;
        return Some(DateTime::from_naive_utc_and_offset(datetime, Utc));
    }

    None
}

/// Discrete status filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter<S> {
    All,
    Only(S),
    /// A value that names no status of the module. Matches nothing.
    Unknown(String),
}

impl<S> Default for StatusFilter<S> {
    fn default() -> Self {
        StatusFilter::All
    }
}

impl<S: Status> StatusFilter<S> {
    /// Interpret a raw filter value; `all` (any case) or blank is the sentinel.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case(ALL_STATUSES) {
            return StatusFilter::All;
        }
        match raw.parse::<S>() {
            Ok(status) => StatusFilter::Only(status),
            Err(_) => StatusFilter::Unknown(raw.to_string()),
        }
    }

    pub fn matches(&self, status: S) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
            StatusFilter::Unknown(_) => false,
        }
    }
}

impl<S: Status> fmt::Display for StatusFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => write!(f, "{}", ALL_STATUSES),
            StatusFilter::Only(status) => write!(f, "{}", status),
            StatusFilter::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// Case-insensitive substring test over the entity's search fields.
pub fn matches_search<E: Entity>(entity: &E, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    entity
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

pub fn matches_filter<E: Entity>(entity: &E, filter: &StatusFilter<E::Status>) -> bool {
    filter.matches(entity.status())
}

/// Search text, status filter and the structured query filters, ANDed together.
#[derive(Debug, Clone)]
pub struct Query<S> {
    pub text: String,
    pub status: StatusFilter<S>,
    pub tags: Vec<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

impl<S> Default for Query<S> {
    fn default() -> Self {
        Self {
            text: String::new(),
            status: StatusFilter::default(),
            tags: Vec::new(),
            created_after: None,
            created_before: None,
        }
    }
}

impl<S: Status> Query<S> {
    /// Build a query from a raw string such as `status:paid tag:q3 acme`.
    pub fn parse(raw: &str) -> Self {
        let (text, filter) = parse_query(raw);
        Self {
            text,
            status: filter
                .status
                .as_deref()
                .map(StatusFilter::parse)
                .unwrap_or_default(),
            tags: filter.tags,
            created_after: filter.created_after,
            created_before: filter.created_before,
        }
    }

    pub fn matches<E: Entity<Status = S>>(&self, entity: &E) -> bool {
        let base = entity.base();
        matches_search(entity, &self.text)
            && matches_filter(entity, &self.status)
            && self.tags.iter().all(|t| base.tags.contains(t))
            && self.created_after.map_or(true, |after| base.created_at >= after)
            && self.created_before.map_or(true, |before| base.created_at < before)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Created,
    Amount,
    Status,
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" | "title" => Ok(SortKey::Name),
            "created" | "date" => Ok(SortKey::Created),
            "amount" => Ok(SortKey::Amount),
            "status" => Ok(SortKey::Status),
            _ => Err(format!(
                "Invalid sort key: {}. Valid keys: name, created, amount, status",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Sort {
    pub fn new(key: SortKey, order: SortOrder) -> Self {
        Self { key, order }
    }
}

/// Stable sort; records without an amount sort before those with one.
pub fn sort_entities<E: Entity>(items: &mut [&E], sort: Sort) {
    items.sort_by(|a, b| {
        let ordering = match sort.key {
            SortKey::Name => a.title().to_lowercase().cmp(&b.title().to_lowercase()),
            SortKey::Created => a.base().created_at.cmp(&b.base().created_at),
            SortKey::Amount => a
                .amount()
                .partial_cmp(&b.amount())
                .unwrap_or(Ordering::Equal),
            SortKey::Status => a.status().ordinal().cmp(&b.status().ordinal()),
        };
        match sort.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize) -> Self {
        Self {
            page,
            per_page: per_page.max(1),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, 10)
    }
}

/// One page of a larger result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// Cut `items` to the requested page. Pages past the end (or page 0) are empty.
pub fn paginate<T: Clone>(items: &[T], pagination: Pagination) -> PageSlice<T> {
    let per_page = pagination.per_page.max(1);
    let total = items.len();
    let total_pages = total.div_ceil(per_page);

    let page_items = if pagination.page == 0 {
        Vec::new()
    } else {
        items
            .iter()
            .skip((pagination.page - 1).saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect()
    };

    PageSlice {
        items: page_items,
        page: pagination.page,
        per_page,
        total,
        total_pages,
    }
}

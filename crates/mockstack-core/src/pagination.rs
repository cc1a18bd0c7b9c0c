//! Pagination over in-memory result slices.
//!
//! Two token styles are in use across the emulated APIs:
//!
//! - **index tokens**: the continuation token is the stringified position of
//!   the next item (`NextToken`, `Marker`)
//! - **natural-key tokens**: the token is the key of the last returned item
//!   (`LastEvaluatedTableName`, `LastEvaluatedBackupArn`) and the next page
//!   starts strictly after it
//!
//! In both cases "has more" is signaled by `next_token` being `Some`.

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Token to resume from, present only if more items remain.
    pub next_token: Option<String>,
}

/// A continuation token that cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    /// Token is not a non-negative integer.
    #[error("Invalid pagination token: {0}")]
    InvalidToken(String),
}

/// Paginate with a stringified index token.
///
/// `limit` is clamped to at least one item.
pub fn paginate_by_index<T>(
    items: Vec<T>,
    token: Option<&str>,
    limit: usize,
) -> Result<Page<T>, PaginationError> {
    let start = match token {
        None => 0,
        Some(t) => t
            .parse::<usize>()
            .map_err(|_| PaginationError::InvalidToken(t.to_owned()))?,
    };
    let limit = limit.max(1);
    let total = items.len();
    let end = start.saturating_add(limit).min(total);

    let items: Vec<T> = items.into_iter().skip(start).take(limit).collect();
    let next_token = (end < total).then(|| end.to_string());
    Ok(Page { items, next_token })
}

/// Paginate by natural key.
///
/// Items are sorted by `key`; the page starts at the first item whose key is
/// strictly greater than `exclusive_start`, so a token naming an item that was
/// deleted between calls still resumes at the right place.
pub fn paginate_after_key<T, F>(
    mut items: Vec<T>,
    exclusive_start: Option<&str>,
    limit: usize,
    key: F,
) -> Page<T>
where
    F: Fn(&T) -> &str,
{
    items.sort_by(|a, b| key(a).cmp(key(b)));
    let start = exclusive_start.map_or(0, |s| {
        items
            .iter()
            .position(|item| key(item) > s)
            .unwrap_or(items.len())
    });
    let limit = limit.max(1);
    let remaining = items.len() - start;

    let items: Vec<T> = items.into_iter().skip(start).take(limit).collect();
    let next_token = if remaining > limit {
        items.last().map(|item| key(item).to_owned())
    } else {
        None
    };
    Page { items, next_token }
}

/// Clamp an optional client-supplied page size into `1..=max`, using `default` when absent.
#[must_use]
pub fn page_size(requested: Option<i32>, default: usize, max: usize) -> usize {
    requested
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(default)
        .clamp(1, max)
}

//! Cursor pagination for provider list endpoints.
//!
//! List responses carry an absolute next-page URL instead of a bare cursor;
//! the cursor has to be dug back out of that URL's query string before the
//! next request. A next-page URL without a cursor would previously have
//! refetched the first page forever, so it is treated as an error.

use std::future::Future;

use anyhow::{bail, Context, Result};
use futures::{stream, Stream, TryStreamExt};
use url::Url;

/// Query parameter carrying the cursor in next-page URLs.
pub const CURSOR_PARAM: &str = "start";

/// One page of a provider listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Absolute URL of the following page, absent on the last page.
    pub next: Option<String>,
}

impl<T> Page<T> {
    /// A final page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Extract the cursor for the following page from a next-page URL.
fn next_cursor(next_url: &str) -> Result<String> {
    let url = Url::parse(next_url)
        .with_context(|| format!("malformed next-page URL {next_url:?}"))?;
    let cursor = url
        .query_pairs()
        .find(|(key, _)| key == CURSOR_PARAM)
        .map(|(_, value)| value.into_owned());
    match cursor {
        Some(cursor) if !cursor.is_empty() => Ok(cursor),
        _ => bail!("next-page URL {next_url:?} carries no {CURSOR_PARAM:?} cursor"),
    }
}

/// Lazily walk every page of a listing, starting without a cursor.
///
/// Each page is fetched exactly once, in cursor order. The walk ends at the
/// first page without a next-page URL; a fetch error ends it immediately.
pub fn pages<T, E, F, Fut>(fetch: F) -> impl Stream<Item = Result<Vec<T>>>
where
    E: Into<anyhow::Error>,
    F: Fn(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    stream::try_unfold((Some(None), fetch), |(state, fetch)| async move {
        let Some(cursor) = state else {
            return Ok(None);
        };
        let page = match fetch(cursor).await {
            Ok(page) => page,
            Err(e) => return Err(e.into()),
        };
        let next = match page.next.as_deref() {
            Some(next_url) => Some(Some(next_cursor(next_url)?)),
            None => None,
        };
        Ok(Some((page.items, (next, fetch))))
    })
}

/// Fetch every page of a listing and flatten the items.
pub async fn collect_all<T, E, F, Fut>(fetch: F) -> Result<Vec<T>>
where
    E: Into<anyhow::Error>,
    F: Fn(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    pages(fetch).try_concat().await
}

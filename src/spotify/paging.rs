use std::future::Future;

use async_stream::try_stream;
use futures::Stream;

use crate::{error::RemoteError, types::Page};

/// Turns a page fetcher into a lazy stream of pages.
///
/// Nothing is requested until the stream is polled, and every page is only
/// fetched after the previous one was consumed, so a consumer that stops early
/// stops the requests as well. The stream ends after the page without a next
/// cursor, or with the error of the first failing request. Calling `paginate`
/// again starts over at the first page.
///
/// # Example
///
/// ```
/// let pages = paginate(|cursor| catalog.playlists_page(cursor));
/// futures::pin_mut!(pages);
/// while let Some(page) = pages.next().await {
///     for playlist in page? { /* ... */ }
/// }
/// ```
pub fn paginate<'a, T, F, Fut>(mut fetch: F) -> impl Stream<Item = Result<Vec<T>, RemoteError>> + 'a
where
    T: 'a,
    F: FnMut(Option<String>) -> Fut + 'a,
    Fut: Future<Output = Result<Page<T>, RemoteError>> + 'a,
{
    try_stream! {
        let mut cursor: Option<String> = None;
        loop {
            let page = fetch(cursor.take()).await?;
            yield page.items;
            match page.next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
    }
}

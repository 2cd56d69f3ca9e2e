//! Cursor-driven pagination over directory listings.
//!
//! A [`Paginator`] wraps a "fetch one page" function and exposes the listing
//! as a lazy stream of pages. Page N+1 is only requested once page N has
//! arrived and named its successor; the stream ends after the page with no
//! successor. Every call to [`Paginator::pages`] starts again from the first
//! page.

use super::directory::{DirectoryError, Page, PageCursor};
use futures::future::BoxFuture;
use futures::stream::{self, Stream};

type FetchPage<T> = Box<
    dyn Fn(Option<PageCursor>) -> BoxFuture<'static, Result<Page<T>, DirectoryError>>
        + Send
        + Sync,
>;

enum Position {
    Start,
    At(PageCursor),
    Done,
}

/// A restartable, lazily fetched sequence of pages.
pub struct Paginator<T> {
    fetch: FetchPage<T>,
}

impl<T: Send + 'static> Paginator<T> {
    /// Creates a paginator from a function fetching the page at a cursor
    /// (`None` for the first page).
    pub fn new<F>(fetch: F) -> Self
    where
        F: Fn(Option<PageCursor>) -> BoxFuture<'static, Result<Page<T>, DirectoryError>>
            + Send
            + Sync
            + 'static,
    {
        Self {
            fetch: Box::new(fetch),
        }
    }

    /// Returns the listing as a stream of pages, starting at the first page.
    ///
    /// A failed fetch is yielded as the final item.
    pub fn pages(&self) -> impl Stream<Item = Result<Vec<T>, DirectoryError>> + Send + '_ {
        stream::try_unfold(Position::Start, move |position| {
            let request = match position {
                Position::Start => Some((self.fetch)(None)),
                Position::At(cursor) => Some((self.fetch)(Some(cursor))),
                Position::Done => None,
            };

            async move {
                let Some(request) = request else {
                    return Ok(None);
                };
                request.await.map(|page| {
                    let position = match page.next {
                        Some(cursor) => Position::At(cursor),
                        None => Position::Done,
                    };
                    Some((page.items, position))
                })
            }
        })
    }
}

impl<T> std::fmt::Debug for Paginator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Paginator")
            .field("fetch", &"<fn>")
            .finish()
    }
}

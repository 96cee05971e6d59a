//! Pull-based iteration over stored bookmarks.
//!
//! A [`BookmarkCursor`] yields one of three outcomes per pull: a record, the
//! end of the results, or an error. [`BookmarkIterator`] wraps a cursor and
//! turns that into a plain "next or stop" loop, latching the first error so
//! the caller can refuse to return a partial listing.

use anyhow::Result;

use crate::api::BookmarkPresenter;
use crate::model::BookmarkModel;

#[allow(async_fn_in_trait)]
pub trait BookmarkCursor {
    /// `Ok(None)` marks the end of the results.
    async fn next_record(&mut self) -> Result<Option<BookmarkModel>>;
}

/// Cursor over the rows of a `SELECT name, url, tags FROM bookmarks` query.
pub struct RowCursor {
    rows: libsql::Rows,
}

impl RowCursor {
    pub fn new(rows: libsql::Rows) -> Self {
        Self { rows }
    }
}

impl BookmarkCursor for RowCursor {
    async fn next_record(&mut self) -> Result<Option<BookmarkModel>> {
        match self.rows.next().await? {
            Some(row) => Ok(Some(BookmarkModel::from_row(&row)?)),
            None => Ok(None),
        }
    }
}

pub struct BookmarkIterator<C> {
    cursor: C,
    exhausted: bool,
    last_error: Option<anyhow::Error>,
}

impl<C: BookmarkCursor> BookmarkIterator<C> {
    pub fn new(cursor: C) -> Self {
        Self {
            cursor,
            exhausted: false,
            last_error: None,
        }
    }

    /// Returns the next bookmark, or `None` once the cursor is exhausted or
    /// has failed. The cursor is not polled again after that.
    pub async fn advance(&mut self) -> Option<BookmarkModel> {
        if self.exhausted {
            return None;
        }

        match self.cursor.next_record().await {
            Ok(Some(bookmark)) => Some(bookmark),
            Ok(None) => {
                self.exhausted = true;
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "bookmark cursor failed, stopping iteration");
                self.last_error = Some(e);
                self.exhausted = true;
                None
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        self.last_error.as_ref()
    }

    pub fn into_error(self) -> Option<anyhow::Error> {
        self.last_error
    }

    /// Drains the cursor into presenters. Any cursor failure discards what was
    /// collected so far.
    pub async fn collect_presenters(mut self) -> Result<Vec<BookmarkPresenter>> {
        let mut out = Vec::new();
        while let Some(bookmark) = self.advance().await {
            out.push(BookmarkPresenter::from(bookmark));
        }

        match self.into_error() {
            Some(e) => Err(e),
            None => Ok(out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    struct ScriptedCursor {
        script: VecDeque<Result<Option<BookmarkModel>>>,
        polls: usize,
    }

    impl ScriptedCursor {
        fn new(script: Vec<Result<Option<BookmarkModel>>>) -> Self {
            Self {
                script: script.into(),
                polls: 0,
            }
        }
    }

    impl BookmarkCursor for ScriptedCursor {
        async fn next_record(&mut self) -> Result<Option<BookmarkModel>> {
            self.polls += 1;
            self.script.pop_front().unwrap_or(Ok(None))
        }
    }

    fn bookmark(n: usize) -> BookmarkModel {
        BookmarkModel {
            name: format!("bookmark-{n}"),
            url: format!("http://example.com/{n}"),
            tags: vec![format!("tag-{n}")],
        }
    }

    #[tokio::test]
    async fn test_yields_all_records_then_stops() {
        let script = (0..3).map(|n| Ok(Some(bookmark(n)))).collect();
        let mut it = BookmarkIterator::new(ScriptedCursor::new(script));

        let mut seen = vec![];
        while let Some(b) = it.advance().await {
            seen.push(b);
        }

        assert_eq!(seen, vec![bookmark(0), bookmark(1), bookmark(2)]);
        assert!(it.is_exhausted());
        assert!(it.error().is_none());
    }

    #[tokio::test]
    async fn test_empty_cursor_is_not_an_error() {
        let it = BookmarkIterator::new(ScriptedCursor::new(vec![]));
        let presenters = it.collect_presenters().await.unwrap();
        assert!(presenters.is_empty());
    }

    #[tokio::test]
    async fn test_error_latches_and_stops_polling() {
        let script = vec![
            Ok(Some(bookmark(0))),
            Err(anyhow::anyhow!("connection reset")),
            Ok(Some(bookmark(1))),
        ];
        let mut it = BookmarkIterator::new(ScriptedCursor::new(script));

        assert_eq!(it.advance().await, Some(bookmark(0)));
        assert_eq!(it.advance().await, None);
        assert_eq!(it.advance().await, None);

        assert!(it.is_exhausted());
        assert_eq!(it.cursor.polls, 2);
        assert_eq!(it.error().unwrap().to_string(), "connection reset");
    }

    #[tokio::test]
    async fn test_error_after_records_discards_partial_listing() {
        let script = vec![
            Ok(Some(bookmark(0))),
            Ok(Some(bookmark(1))),
            Err(anyhow::anyhow!("failed to decode tags")),
        ];
        let it = BookmarkIterator::new(ScriptedCursor::new(script));

        let err = it.collect_presenters().await.unwrap_err();
        assert_eq!(err.to_string(), "failed to decode tags");
    }

    #[tokio::test]
    async fn test_error_on_first_pull() {
        let script = vec![Err(anyhow::anyhow!("no such table: bookmarks"))];
        let it = BookmarkIterator::new(ScriptedCursor::new(script));

        assert!(it.collect_presenters().await.is_err());
    }
}

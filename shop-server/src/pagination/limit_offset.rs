//! Limit/offset paginator
//!
//! Same snapshot-and-slice strategy as the page-number paginator, addressed by `(limit, offset)`.
//! It keeps its own cache namespace and always counts. An offset past the end is not an error:
//! the window is simply empty.

use std::sync::Arc;

use super::{QuerySignature, RecordSource, SnapshotStore, reorder};
use shared::error::{AppError, AppResult};

/// One limit/offset window
#[derive(Debug, Clone)]
pub struct Window<R> {
    pub items: Vec<R>,
    pub count: u64,
    pub limit: usize,
    pub offset: usize,
}

impl<R> Window<R> {
    /// Offset of the following window, if any
    pub fn next_offset(&self) -> Option<usize> {
        let next = self.offset.saturating_add(self.limit);
        ((next as u64) < self.count).then_some(next)
    }

    /// Offset of the preceding window; `None` at the start
    pub fn previous_offset(&self) -> Option<usize> {
        (self.offset > 0).then(|| self.offset.saturating_sub(self.limit))
    }

    pub fn map<T>(self, f: impl FnMut(R) -> T) -> Window<T> {
        Window {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

pub struct LimitOffsetPaginator<S: RecordSource + ?Sized> {
    source: Arc<S>,
    snapshots: SnapshotStore,
}

impl<S: RecordSource + ?Sized> LimitOffsetPaginator<S> {
    pub fn new(source: Arc<S>, snapshots: SnapshotStore) -> Self {
        Self { source, snapshots }
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub async fn paginate(
        &self,
        query: &QuerySignature,
        limit: usize,
        offset: usize,
    ) -> AppResult<Window<S::Record>> {
        if limit == 0 {
            return Err(AppError::validation("Limit must be greater than 0"));
        }

        let count = self.snapshots.count(self.source.as_ref(), query).await?;
        let mut window = Window {
            items: Vec::new(),
            count,
            limit,
            offset,
        };
        if count == 0 || offset as u64 > count {
            return Ok(window);
        }

        let ids = self
            .snapshots
            .identifiers(self.source.as_ref(), query)
            .await?;
        let start = offset.min(ids.len());
        let end = offset.saturating_add(limit).min(ids.len());
        let slice = &ids[start..end];
        if slice.is_empty() {
            return Ok(window);
        }

        let records = self.source.fetch_by_identifiers(query, slice).await?;
        window.items = reorder(slice, records);
        Ok(window)
    }
}

use std::{
    cmp::Ordering,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering},
};

use parking_lot::{Mutex, RwLock};

use super::{CachedQuery, DataSource, Filter, MoreDataRequest, Row, SortOrder, SortedIndices};
use crate::{
    error::{Error, Result},
    id::SourceId,
};

/// A data source backed by a vector of rows.
///
/// Paging requests are recorded rather than served; a loader (or a test)
/// answers them by calling [`VecDataSource::push_rows`].
pub struct VecDataSource {
    /// Source identifier.
    id: SourceId,
    /// Row storage.
    rows: RwLock<Vec<Row>>,
    /// Outstanding read locks.
    readers: AtomicUsize,
    /// Total read locks ever taken.
    lock_count: AtomicUsize,
    /// Mutation counter.
    revision: AtomicU64,
    /// Paging requests received.
    requests: Mutex<Vec<MoreDataRequest>>,
}

impl VecDataSource {
    /// Construct a source with initial rows.
    pub fn new(id: SourceId, rows: Vec<Row>) -> Self {
        Self {
            id,
            rows: RwLock::new(rows),
            readers: AtomicUsize::new(0),
            lock_count: AtomicUsize::new(0),
            revision: AtomicU64::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Append rows, bumping the revision.
    pub fn push_rows(&self, rows: impl IntoIterator<Item = Row>) {
        self.rows.write().extend(rows);
        self.revision.fetch_add(1, AtomicOrdering::SeqCst);
    }

    /// Replace a row in place, bumping the revision.
    pub fn set_row(&self, index: usize, row: Row) -> Result<()> {
        let mut rows = self.rows.write();
        let slot = rows
            .get_mut(index)
            .ok_or_else(|| Error::DataSource(format!("row {index} out of range")))?;
        *slot = row;
        self.revision.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(())
    }

    /// Paging requests received so far.
    pub fn requests(&self) -> Vec<MoreDataRequest> {
        self.requests.lock().clone()
    }

    /// Number of read locks currently held.
    pub fn active_readers(&self) -> usize {
        self.readers.load(AtomicOrdering::SeqCst)
    }

    /// Number of read locks taken over the source's lifetime.
    pub fn lock_count(&self) -> usize {
        self.lock_count.load(AtomicOrdering::SeqCst)
    }
}

impl DataSource for VecDataSource {
    fn id(&self) -> SourceId {
        self.id
    }

    fn lock_read(&self) {
        self.readers.fetch_add(1, AtomicOrdering::SeqCst);
        self.lock_count.fetch_add(1, AtomicOrdering::SeqCst);
    }

    fn unlock_read(&self) {
        let prev = self.readers.fetch_sub(1, AtomicOrdering::SeqCst);
        debug_assert!(prev > 0, "unlock_read without lock_read");
    }

    fn data_count(&self) -> usize {
        self.rows.read().len()
    }

    fn revision(&self) -> u64 {
        self.revision.load(AtomicOrdering::SeqCst)
    }

    fn cache_query(&self, filter: Option<&Filter>) -> CachedQuery {
        let rows = self.rows.read();
        let indices = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| filter.is_none_or(|f| f.matches(row)))
            .map(|(i, _)| i)
            .collect();
        CachedQuery {
            indices,
            revision: self.revision(),
        }
    }

    fn sort_query(
        &self,
        query: &CachedQuery,
        property: &str,
        order: SortOrder,
    ) -> Result<SortedIndices> {
        let rows = self.rows.read();
        if !rows.iter().any(|r| r.get(property).is_some()) {
            return Err(Error::DataSource(format!(
                "sort unsupported for property {property:?}"
            )));
        }
        let mut sorted = query.indices.clone();
        sorted.sort_by(|a, b| {
            let va = rows.get(*a).and_then(|r| r.get(property));
            let vb = rows.get(*b).and_then(|r| r.get(property));
            let ord = match (va, vb) {
                (Some(x), Some(y)) => x.compare(y).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
        Ok(SortedIndices(sorted))
    }

    fn iterate_data(&self, indices: &[usize], f: &mut dyn FnMut(usize, &Row)) {
        debug_assert!(
            self.active_readers() > 0,
            "iterate_data called without a read lock"
        );
        let rows = self.rows.read();
        for i in indices {
            if let Some(row) = rows.get(*i) {
                f(*i, row);
            }
        }
    }

    fn request_more_data(&self, request: MoreDataRequest) {
        self.requests.lock().push(request);
    }
}

//! Data sources bound to virtualized flex and grid widgets.
//!
//! A data source is a lockable, queryable provider of rows. The layout engine
//! caches a filtered index set (and optionally a sorted permutation of it),
//! locks the source for reading only while it pushes a bounded index range
//! into item widgets, and asks for more rows when a scroll reaches the end.

/// In-memory data source.
mod memory;

use std::{cmp::Ordering, fmt};

pub use memory::VecDataSource;
use serde::{Deserialize, Serialize};

use crate::{error::Result, id::SourceId};

/// A single property value in a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DataValue {
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl DataValue {
    /// Order two values of compatible kinds. Mixed kinds are unordered.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
        }
    }
}

/// One row of named properties.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    /// Property values in declaration order.
    pub values: Vec<(String, DataValue)>,
}

impl Row {
    /// Add a property.
    pub fn with(mut self, name: &str, value: DataValue) -> Self {
        self.values.push((name.to_string(), value));
        self
    }

    /// Look up a property.
    pub fn get(&self, name: &str) -> Option<&DataValue> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Comparison used by a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Less than.
    Lt,
    /// Greater than.
    Gt,
    /// Text contains.
    Contains,
}

/// A single-property row filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Property to test.
    pub property: String,
    /// Comparison.
    pub op: FilterOp,
    /// Operand.
    pub value: DataValue,
}

impl Filter {
    /// True if the row passes the filter. Rows missing the property fail.
    pub fn matches(&self, row: &Row) -> bool {
        let Some(v) = row.get(&self.property) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => v.compare(&self.value) == Some(Ordering::Equal),
            FilterOp::Ne => v.compare(&self.value) != Some(Ordering::Equal),
            FilterOp::Lt => v.compare(&self.value) == Some(Ordering::Less),
            FilterOp::Gt => v.compare(&self.value) == Some(Ordering::Greater),
            FilterOp::Contains => match (v, &self.value) {
                (DataValue::Text(hay), DataValue::Text(needle)) => hay.contains(needle.as_str()),
                _ => false,
            },
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SortOrder {
    /// Smallest first.
    #[default]
    Ascending,
    /// Largest first.
    Descending,
}

/// Property and direction to sort a query by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Property name.
    pub property: String,
    /// Direction.
    pub order: SortOrder,
}

/// Filtered row indices, tagged with the source revision they were taken at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CachedQuery {
    /// Source row indices passing the filter, in source order.
    pub indices: Vec<usize>,
    /// Source revision the query reflects.
    pub revision: u64,
}

/// A sorted permutation of a cached query's indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortedIndices(pub Vec<usize>);

/// A request for further rows, issued when scrolling reaches the end.
#[derive(Debug, Clone, PartialEq)]
pub struct MoreDataRequest {
    /// Source being asked.
    pub source: SourceId,
    /// Number of rows wanted.
    pub count: usize,
    /// Active sort, if any.
    pub sort: Option<SortKey>,
    /// Active filter, if any.
    pub filter: Option<Filter>,
    /// Length of the sorted query the request was computed from.
    pub sorted_len: Option<usize>,
    /// Source index of the last row currently in view order, if any.
    pub last_index: Option<usize>,
}

/// A lockable, queryable provider of rows.
///
/// `iterate_data` may only be called between `lock_read` and `unlock_read`.
pub trait DataSource {
    /// Identifier reported in paging requests.
    fn id(&self) -> SourceId;

    /// Acquire a read lock.
    fn lock_read(&self);

    /// Release a read lock acquired with `lock_read`.
    fn unlock_read(&self);

    /// Total number of rows.
    fn data_count(&self) -> usize;

    /// Monotonic counter bumped on every mutation.
    fn revision(&self) -> u64;

    /// Compute the indices passing a filter.
    fn cache_query(&self, filter: Option<&Filter>) -> CachedQuery;

    /// Sort a cached query by a property.
    fn sort_query(
        &self,
        query: &CachedQuery,
        property: &str,
        order: SortOrder,
    ) -> Result<SortedIndices>;

    /// Visit rows by source index. Indices out of range are skipped.
    fn iterate_data(&self, indices: &[usize], f: &mut dyn FnMut(usize, &Row));

    /// Ask the source to fetch more rows.
    fn request_more_data(&self, request: MoreDataRequest);
}

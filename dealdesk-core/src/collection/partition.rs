//! Per-partition paging state.

use crate::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Label of one of the parallel sub-collections a list screen shows.
///
/// Implementors are small closed enums. `all()` lists every label and
/// `index()` must return the label's position in `all()`.
pub trait PartitionKey: Copy + Eq + Ord + Hash + fmt::Debug + Send + Sync + 'static {
    fn all() -> &'static [Self];

    fn index(&self) -> usize;

    /// Name of the backend predicate selecting this partition's records.
    fn filter_name(&self) -> &'static str;

    /// Human readable tab title.
    fn title(&self) -> &'static str;
}

/// Open vs closed deals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealPartition {
    Open,
    Closed,
}

impl PartitionKey for DealPartition {
    fn all() -> &'static [Self] {
        &[DealPartition::Open, DealPartition::Closed]
    }

    fn index(&self) -> usize {
        match self {
            DealPartition::Open => 0,
            DealPartition::Closed => 1,
        }
    }

    fn filter_name(&self) -> &'static str {
        match self {
            DealPartition::Open => "open",
            DealPartition::Closed => "closed",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            DealPartition::Open => "Open",
            DealPartition::Closed => "Closed",
        }
    }
}

/// The implicit single partition of screens that do not split their records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinglePartition {
    All,
}

impl PartitionKey for SinglePartition {
    fn all() -> &'static [Self] {
        &[SinglePartition::All]
    }

    fn index(&self) -> usize {
        0
    }

    fn filter_name(&self) -> &'static str {
        "all"
    }

    fn title(&self) -> &'static str {
        "All"
    }
}

/// Page sizes a user may pick from. Sorted ascending, no duplicates, no zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct PageSizes(Vec<u32>);

impl PageSizes {
    pub const DEFAULT: [u32; 5] = [10, 20, 30, 40, 50];

    pub fn new(sizes: Vec<u32>) -> DeskResult<Self> {
        if sizes.is_empty() {
            return Err(DeskError::InvalidValue {
                field: "page_sizes",
                reason: "must not be empty".to_string(),
            });
        }
        if sizes.contains(&0) {
            return Err(DeskError::InvalidValue {
                field: "page_sizes",
                reason: "must be > 0".to_string(),
            });
        }
        if sizes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(DeskError::InvalidValue {
                field: "page_sizes",
                reason: "must be strictly increasing".to_string(),
            });
        }
        Ok(Self(sizes))
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn contains(&self, size: u32) -> bool {
        self.0.contains(&size)
    }

    pub fn smallest(&self) -> u32 {
        self.0[0]
    }

    /// Coerce an arbitrary size into the allowed set: the largest allowed
    /// size not above `size`, or the smallest allowed size.
    pub fn coerce(&self, size: u32) -> u32 {
        self.0
            .iter()
            .rev()
            .copied()
            .find(|allowed| *allowed <= size)
            .unwrap_or_else(|| self.smallest())
    }

    /// The allowed size following `current`, wrapping around.
    pub fn next_after(&self, current: u32) -> u32 {
        self.0
            .iter()
            .copied()
            .find(|allowed| *allowed > current)
            .unwrap_or_else(|| self.smallest())
    }
}

impl Default for PageSizes {
    fn default() -> Self {
        Self(Self::DEFAULT.to_vec())
    }
}

impl TryFrom<Vec<u32>> for PageSizes {
    type Error = DeskError;

    fn try_from(sizes: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(sizes)
    }
}

impl From<PageSizes> for Vec<u32> {
    fn from(sizes: PageSizes) -> Self {
        sizes.0
    }
}

/// Number of pages needed for `total_count` records, never less than one.
pub fn pages_for(total_count: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    let pages = total_count.div_ceil(size).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Load lifecycle of one partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Errored,
}

/// Paging state and the currently loaded page of one partition.
#[derive(Debug, Clone)]
pub struct PartitionState<R> {
    page: u32,
    page_size: u32,
    total_count: u64,
    records: Vec<R>,
    status: LoadStatus,
    latest_seq: u64,
    loaded_once: bool,
}

impl<R> PartitionState<R> {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_count: 0,
            records: Vec::new(),
            status: LoadStatus::Idle,
            latest_seq: 0,
            loaded_once: false,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_pages(&self) -> u32 {
        pages_for(self.total_count, self.page_size)
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    /// Whether a fetch for this partition has completed successfully at
    /// least once.
    pub fn has_loaded(&self) -> bool {
        self.loaded_once
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Move to page `n`, clamped into `[1, total_pages]`. Records stay as
    /// they are until the refetch resolves.
    pub fn set_page(&mut self, n: u32) {
        self.page = n.clamp(1, self.total_pages());
        self.status = LoadStatus::Loading;
    }

    /// Change the page size. Always returns to the first page.
    pub fn set_page_size(&mut self, size: u32) {
        self.page_size = size.max(1);
        self.page = 1;
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Pull `page` back into range after `total_count` shrank. Returns true
    /// when the page moved.
    pub fn clamp_page(&mut self) -> bool {
        let last = self.total_pages();
        if self.page > last {
            self.page = last;
            true
        } else {
            false
        }
    }

    /// Record the most recent total without touching the loaded records.
    pub fn set_total_count(&mut self, total_count: u64) {
        self.total_count = total_count;
    }

    /// Tag a new request for this partition. Any response carrying an older
    /// sequence number is stale from now on.
    pub fn begin_request(&mut self) -> u64 {
        self.latest_seq += 1;
        self.status = LoadStatus::Loading;
        self.latest_seq
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest_seq
    }

    /// Replace the loaded page wholesale.
    pub fn ingest(&mut self, records: Vec<R>, total_count: u64) {
        self.records = records;
        self.total_count = total_count;
        self.status = LoadStatus::Loaded;
        self.loaded_once = true;
    }

    /// Keep the last known page on failure.
    pub fn ingest_error(&mut self) {
        self.status = LoadStatus::Errored;
    }
}

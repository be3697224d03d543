//! Read-only views handed to the render layer.

use super::partition::{LoadStatus, PartitionKey};
use crate::compare::SortDirection;
use crate::error::CollectionError;
use crate::record::Record;

/// One partition as it should be displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionSnapshot<R, P> {
    pub label: P,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_count: u64,
    /// Loaded page after the unassigned filter and sort are applied.
    pub records: Vec<R>,
    pub status: LoadStatus,
    pub is_loading: bool,
}

/// Whole-controller view. `revision` changes whenever anything visible may
/// have changed.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<R: Record, P> {
    pub revision: u64,
    pub active_partition: P,
    /// Ordered like `P::all()`.
    pub partitions: Vec<PartitionSnapshot<R, P>>,
    pub search_text: String,
    pub sort_key: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub unassigned_only: bool,
    pub pending_delete: Option<R::Id>,
    pub delete_in_flight: bool,
}

impl<R: Record, P: PartitionKey> Snapshot<R, P> {
    pub fn partition(&self, label: P) -> &PartitionSnapshot<R, P> {
        &self.partitions[label.index()]
    }

    pub fn active(&self) -> &PartitionSnapshot<R, P> {
        self.partition(self.active_partition)
    }
}

/// Out-of-band notices the render layer turns into notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent<Id, P> {
    FetchFailed { partition: P, error: CollectionError },
    DeleteFailed { id: Id, error: CollectionError },
    Deleted { id: Id },
}

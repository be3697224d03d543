//! Server-paginated, client-filtered, client-sorted record collections.

pub mod api;
pub mod controller;
pub mod partition;
pub mod query;
pub mod snapshot;

pub use api::{CollectionApi, CollectionPage};
pub use controller::{
    ActiveSort, CollectionController, Command, ControllerConfig, ControllerState, FetchRequest,
    Intent, PageDirection, PendingDelete,
};
pub use partition::{
    pages_for, DealPartition, LoadStatus, PageSizes, PartitionKey, PartitionState, SinglePartition,
};
pub use query::{build_query, QueryDescriptor};
pub use snapshot::{ControllerEvent, PartitionSnapshot, Snapshot};

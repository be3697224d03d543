//! DealDesk Core - Records and Collections
//!
//! CRM record types plus the generic collection controller that pages,
//! filters and sorts them. No I/O lives here: the controller returns
//! commands and a driver executes them against a [`CollectionApi`].

pub mod collection;
pub mod compare;
pub mod entities;
pub mod enums;
pub mod error;
pub mod identity;
pub mod record;
pub mod session;

pub use collection::{
    build_query, pages_for, ActiveSort, CollectionApi, CollectionController, CollectionPage,
    Command, ControllerConfig, ControllerEvent, ControllerState, DealPartition, FetchRequest,
    Intent, LoadStatus, PageDirection, PageSizes, PartitionKey, PartitionSnapshot,
    PartitionState, PendingDelete, QueryDescriptor, SinglePartition, Snapshot,
};
pub use compare::{compare_by, stable_sort, SortDirection, SortKey, SortKind};
pub use entities::{Comment, Interaction, Lead, UserRef};
pub use enums::{InteractionKind, LeadStatus};
pub use error::{CollectionError, DeskError, DeskResult};
pub use identity::{
    new_entity_id, CommentId, EntityId, EntityIdType, InteractionId, LeadId, OrganizationId,
    Timestamp, UserId,
};
pub use record::{FieldValue, Record};
pub use session::SessionContext;

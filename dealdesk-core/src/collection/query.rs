//! Translation of controller state into backend collection queries.

use super::controller::ControllerState;
use super::partition::PartitionKey;
use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Deterministic, serializable description of one page fetch.
///
/// Serializes to flat URL query parameters: `offset`, `limit`, `search`
/// (omitted when blank), `partition`, then every extra filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    pub offset: u64,
    pub limit: u32,
    #[serde(rename = "search", default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(rename = "partition")]
    pub partition_filter: String,
    #[serde(flatten)]
    pub extra_filters: BTreeMap<String, String>,
}

impl QueryDescriptor {
    /// One past the index of the last record this query can return.
    pub fn end(&self) -> u64 {
        self.offset + u64::from(self.limit)
    }
}

/// Build the query for `label` from the current controller state.
pub fn build_query<R: Record, P: PartitionKey>(
    state: &ControllerState<R, P>,
    label: P,
) -> QueryDescriptor {
    let partition = state.partition(label);
    let search = state.search_text().trim();
    QueryDescriptor {
        offset: u64::from(partition.page().saturating_sub(1)) * u64::from(partition.page_size()),
        limit: partition.page_size(),
        search_text: (!search.is_empty()).then(|| search.to_string()),
        partition_filter: label.filter_name().to_string(),
        extra_filters: state.extra_filters().clone(),
    }
}

//! The collection controller state machine.
//!
//! One controller backs one list screen. It owns a [`PartitionState`] per
//! partition label plus the search text, sort and unassigned filter that
//! every partition shares. Operations never perform I/O themselves: they
//! update state and return the [`Command`]s a driver must execute. The
//! driver hands each outcome back through [`CollectionController::apply_fetch`]
//! or [`CollectionController::apply_delete`].
//!
//! Every fetch is tagged with a per-partition sequence number and only the
//! latest one is ingested, so a slow response can never overwrite a newer
//! page.

use super::api::CollectionPage;
use super::partition::{pages_for, PageSizes, PartitionKey, PartitionState};
use super::query::{build_query, QueryDescriptor};
use super::snapshot::{ControllerEvent, PartitionSnapshot, Snapshot};
use crate::compare::{compare_by, stable_sort, SortDirection, SortKey};
use crate::error::CollectionError;
use crate::record::Record;
use std::collections::{BTreeMap, VecDeque};

/// Per-screen controller settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub default_page_size: u32,
    pub page_sizes: PageSizes,
    /// Columns the user may sort by.
    pub sort_keys: Vec<SortKey>,
    /// Fixed filters sent with every query (e.g. the parent lead).
    pub extra_filters: BTreeMap<String, String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_sizes: PageSizes::default(),
            sort_keys: Vec::new(),
            extra_filters: BTreeMap::new(),
        }
    }
}

impl ControllerConfig {
    pub fn with_sort_keys(mut self, sort_keys: Vec<SortKey>) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    pub fn with_extra_filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_filters.insert(name.into(), value.into());
        self
    }

    pub fn with_page_sizes(mut self, default_page_size: u32, page_sizes: PageSizes) -> Self {
        self.default_page_size = default_page_size;
        self.page_sizes = page_sizes;
        self
    }
}

/// The sort currently applied to the visible page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSort {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// A record waiting to be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete<Id> {
    pub id: Id,
    /// Set once the user confirmed and the delete request went out.
    pub confirmed: bool,
}

/// Which way to move through a partition's pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageDirection {
    Next,
    Previous,
}

/// A page fetch the driver must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest<P> {
    pub partition: P,
    pub seq: u64,
    pub query: QueryDescriptor,
}

/// Side effect requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<Id, P> {
    Fetch(FetchRequest<P>),
    Delete(Id),
}

/// Everything the render layer may ask of a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent<Id, P> {
    SwitchPartition(P),
    SetSearchText(String),
    /// Cycle the sort on the named field.
    SetSort(String),
    ToggleUnassignedOnly,
    RequestPage(P, PageDirection),
    SetPageSize(P, u32),
    DeleteRecord(Id),
    ConfirmDelete,
    CancelDelete,
    Refresh,
}

/// Controller-owned state. Only the controller mutates it.
#[derive(Debug, Clone)]
pub struct ControllerState<R: Record, P: PartitionKey> {
    partitions: Vec<PartitionState<R>>,
    active_partition: P,
    search_text: String,
    sort: Option<ActiveSort>,
    unassigned_only: bool,
    pending_delete: Option<PendingDelete<R::Id>>,
    extra_filters: BTreeMap<String, String>,
}

impl<R: Record, P: PartitionKey> ControllerState<R, P> {
    pub fn new(config: &ControllerConfig) -> Self {
        let page_size = config.page_sizes.coerce(config.default_page_size);
        Self {
            partitions: P::all()
                .iter()
                .map(|_| PartitionState::new(page_size))
                .collect(),
            active_partition: P::all()[0],
            search_text: String::new(),
            sort: None,
            unassigned_only: false,
            pending_delete: None,
            extra_filters: config.extra_filters.clone(),
        }
    }

    pub fn partition(&self, label: P) -> &PartitionState<R> {
        &self.partitions[label.index()]
    }

    pub(crate) fn partition_mut(&mut self, label: P) -> &mut PartitionState<R> {
        &mut self.partitions[label.index()]
    }

    pub fn active_partition(&self) -> P {
        self.active_partition
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub(crate) fn set_search_text(&mut self, text: String) {
        self.search_text = text;
    }

    pub fn sort(&self) -> Option<&ActiveSort> {
        self.sort.as_ref()
    }

    pub fn unassigned_only(&self) -> bool {
        self.unassigned_only
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete<R::Id>> {
        self.pending_delete.as_ref()
    }

    pub fn extra_filters(&self) -> &BTreeMap<String, String> {
        &self.extra_filters
    }
}

/// Generic dual-partition list controller.
#[derive(Debug, Clone)]
pub struct CollectionController<R: Record, P: PartitionKey> {
    config: ControllerConfig,
    state: ControllerState<R, P>,
    events: VecDeque<ControllerEvent<R::Id, P>>,
    revision: u64,
}

impl<R: Record, P: PartitionKey> CollectionController<R, P> {
    pub fn new(config: ControllerConfig) -> Self {
        let state = ControllerState::new(&config);
        Self {
            config,
            state,
            events: VecDeque::new(),
            revision: 0,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> &ControllerState<R, P> {
        &self.state
    }

    /// Monotonic counter bumped on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Dispatch an intent from the render layer.
    pub fn handle(&mut self, intent: Intent<R::Id, P>) -> Vec<Command<R::Id, P>> {
        match intent {
            Intent::SwitchPartition(label) => self.switch_partition(label),
            Intent::SetSearchText(text) => self.set_search_text(text),
            Intent::SetSort(field) => {
                self.set_sort(&field);
                Vec::new()
            }
            Intent::ToggleUnassignedOnly => {
                self.toggle_unassigned_only();
                Vec::new()
            }
            Intent::RequestPage(label, direction) => self.request_page(label, direction),
            Intent::SetPageSize(label, size) => self.set_page_size(label, size),
            Intent::DeleteRecord(id) => {
                self.delete_record(id);
                Vec::new()
            }
            Intent::ConfirmDelete => self.confirm_delete(),
            Intent::CancelDelete => {
                self.cancel_delete();
                Vec::new()
            }
            Intent::Refresh => self.refresh(),
        }
    }

    /// Initial load: every partition is fetched so that all totals are
    /// known even while only one partition is displayed.
    pub fn start(&mut self) -> Vec<Command<R::Id, P>> {
        self.fetch_all()
    }

    /// Reload every partition at its current page.
    pub fn refresh(&mut self) -> Vec<Command<R::Id, P>> {
        self.fetch_all()
    }

    pub fn switch_partition(&mut self, label: P) -> Vec<Command<R::Id, P>> {
        self.state.active_partition = label;
        self.touch();
        let partition = self.state.partition(label);
        if partition.has_loaded() || partition.is_loading() {
            Vec::new()
        } else {
            vec![self.fetch(label)]
        }
    }

    /// A new search invalidates every page number, so all partitions go
    /// back to page 1 before anything is fetched.
    pub fn set_search_text(&mut self, text: String) -> Vec<Command<R::Id, P>> {
        if text == self.state.search_text {
            return Vec::new();
        }
        self.state.set_search_text(text);
        for partition in &mut self.state.partitions {
            partition.reset_page();
        }
        self.fetch_all()
    }

    /// Cycle the sort for `field`: unset, ascending, descending, unset.
    /// Choosing another field starts it ascending. Applies to the loaded
    /// page only.
    pub fn set_sort(&mut self, field: &str) {
        let Some(key) = self.config.sort_keys.iter().find(|k| k.field == field) else {
            tracing::debug!(field, "ignoring sort on unknown field");
            return;
        };
        self.state.sort = match self.state.sort.take() {
            Some(active) if active.key.field == field => match active.direction {
                SortDirection::Asc => Some(ActiveSort {
                    key: active.key,
                    direction: SortDirection::Desc,
                }),
                SortDirection::Desc => None,
            },
            _ => Some(ActiveSort {
                key: key.clone(),
                direction: SortDirection::Asc,
            }),
        };
        self.touch();
    }

    /// Applies to the loaded page only.
    pub fn toggle_unassigned_only(&mut self) {
        self.state.unassigned_only = !self.state.unassigned_only;
        self.touch();
    }

    pub fn request_page(
        &mut self,
        label: P,
        direction: PageDirection,
    ) -> Vec<Command<R::Id, P>> {
        let partition = self.state.partition_mut(label);
        let current = partition.page();
        let target = match direction {
            PageDirection::Next => current.saturating_add(1),
            PageDirection::Previous => current.saturating_sub(1),
        };
        let target = target.clamp(1, partition.total_pages());
        if target == current {
            return Vec::new();
        }
        partition.set_page(target);
        vec![self.fetch(label)]
    }

    pub fn set_page_size(&mut self, label: P, size: u32) -> Vec<Command<R::Id, P>> {
        let size = self.config.page_sizes.coerce(size);
        self.state.partition_mut(label).set_page_size(size);
        vec![self.fetch(label)]
    }

    /// Mark `id` for deletion pending confirmation. A newer request replaces
    /// an unconfirmed one; nothing changes while a delete is in flight.
    pub fn delete_record(&mut self, id: R::Id) {
        if let Some(pending) = &self.state.pending_delete {
            if pending.confirmed {
                tracing::debug!(%id, in_flight = %pending.id, "delete already in flight");
                return;
            }
        }
        self.state.pending_delete = Some(PendingDelete {
            id,
            confirmed: false,
        });
        self.touch();
    }

    pub fn confirm_delete(&mut self) -> Vec<Command<R::Id, P>> {
        let id = match &mut self.state.pending_delete {
            Some(pending) if !pending.confirmed => {
                pending.confirmed = true;
                pending.id.clone()
            }
            _ => return Vec::new(),
        };
        self.touch();
        tracing::debug!(%id, "delete confirmed");
        vec![Command::Delete(id)]
    }

    pub fn cancel_delete(&mut self) {
        if matches!(&self.state.pending_delete, Some(pending) if !pending.confirmed) {
            self.state.pending_delete = None;
            self.touch();
        }
    }

    /// Feed back the outcome of a fetch issued as `seq` for `label`.
    pub fn apply_fetch(
        &mut self,
        label: P,
        seq: u64,
        result: Result<CollectionPage<R>, CollectionError>,
    ) -> Vec<Command<R::Id, P>> {
        let partition = self.state.partition_mut(label);
        if !partition.is_current(seq) {
            tracing::debug!(
                ?label,
                seq,
                latest = partition.latest_seq(),
                "discarding stale response"
            );
            return Vec::new();
        }

        match result {
            Ok(page) => {
                let last_page = pages_for(page.total_count, partition.page_size());
                if partition.page() > last_page {
                    // The collection shrank below the current page: move to
                    // the new last page and keep the old rows until it arrives.
                    // Rows in this response, if any, belong to whatever offset
                    // the backend fell back to, so they are not ingested.
                    partition.set_total_count(page.total_count);
                    partition.clamp_page();
                    tracing::debug!(?label, page = partition.page(), "page out of range, refetching");
                    return vec![self.fetch(label)];
                }
                partition.ingest(page.records, page.total_count);
                self.touch();
                Vec::new()
            }
            Err(error) => {
                partition.ingest_error();
                tracing::warn!(?label, %error, "fetch failed");
                self.events.push_back(ControllerEvent::FetchFailed {
                    partition: label,
                    error,
                });
                self.touch();
                Vec::new()
            }
        }
    }

    /// Feed back the outcome of a delete. Success refetches the active
    /// partition's current page instead of splicing the row out locally.
    pub fn apply_delete(
        &mut self,
        id: R::Id,
        result: Result<(), CollectionError>,
    ) -> Vec<Command<R::Id, P>> {
        match &self.state.pending_delete {
            Some(pending) if pending.id == id => {}
            _ => {
                tracing::debug!(%id, "ignoring delete result for a record that is not pending");
                return Vec::new();
            }
        }
        self.state.pending_delete = None;

        match result {
            Ok(()) => {
                self.events.push_back(ControllerEvent::Deleted { id });
                let active = self.state.active_partition;
                vec![self.fetch(active)]
            }
            Err(error) => {
                tracing::warn!(%id, %error, "delete failed");
                self.events.push_back(ControllerEvent::DeleteFailed { id, error });
                self.touch();
                Vec::new()
            }
        }
    }

    /// Take every event produced since the last call.
    pub fn drain_events(&mut self) -> Vec<ControllerEvent<R::Id, P>> {
        self.events.drain(..).collect()
    }

    /// Rows of `label` as they should be displayed: the loaded page,
    /// filtered by the unassigned flag and stably sorted.
    pub fn visible_records(&self, label: P) -> Vec<R> {
        let records = self.state.partition(label).records();
        let filtered: Vec<R> = if self.state.unassigned_only {
            records
                .iter()
                .filter(|record| record.is_unassigned())
                .cloned()
                .collect()
        } else {
            records.to_vec()
        };
        match &self.state.sort {
            Some(sort) => stable_sort(&filtered, compare_by::<R>(&sort.key, Some(sort.direction))),
            None => filtered,
        }
    }

    /// Read-only view for the render layer.
    pub fn snapshot(&self) -> Snapshot<R, P> {
        let partitions = P::all()
            .iter()
            .map(|label| {
                let partition = self.state.partition(*label);
                PartitionSnapshot {
                    label: *label,
                    page: partition.page(),
                    page_size: partition.page_size(),
                    total_pages: partition.total_pages(),
                    total_count: partition.total_count(),
                    records: self.visible_records(*label),
                    status: partition.status(),
                    is_loading: partition.is_loading(),
                }
            })
            .collect();

        Snapshot {
            revision: self.revision,
            active_partition: self.state.active_partition,
            partitions,
            search_text: self.state.search_text.clone(),
            sort_key: self.state.sort.as_ref().map(|s| s.key.field.clone()),
            sort_direction: self.state.sort.as_ref().map(|s| s.direction),
            unassigned_only: self.state.unassigned_only,
            pending_delete: self.state.pending_delete.as_ref().map(|p| p.id.clone()),
            delete_in_flight: self
                .state
                .pending_delete
                .as_ref()
                .is_some_and(|p| p.confirmed),
        }
    }

    fn fetch_all(&mut self) -> Vec<Command<R::Id, P>> {
        P::all().iter().map(|label| self.fetch(*label)).collect()
    }

    fn fetch(&mut self, label: P) -> Command<R::Id, P> {
        let seq = self.state.partition_mut(label).begin_request();
        let query = build_query(&self.state, label);
        self.touch();
        tracing::debug!(?label, seq, offset = query.offset, limit = query.limit, "fetch issued");
        Command::Fetch(FetchRequest {
            partition: label,
            seq,
            query,
        })
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::partition::{DealPartition, LoadStatus, SinglePartition};
    use crate::{EntityIdType, Lead, LeadId, LeadStatus, UserId, UserRef};
    use chrono::Utc;

    type Controller = CollectionController<Lead, DealPartition>;

    fn lead(title: &str, amount: f64, assigned: bool) -> Lead {
        Lead {
            lead_id: LeadId::now_v7(),
            title: title.to_string(),
            company: None,
            contact_name: None,
            amount: Some(amount),
            probability: None,
            status: LeadStatus::New,
            assignee: assigned.then(|| UserRef {
                user_id: UserId::now_v7(),
                name: "Grace".to_string(),
                email: None,
            }),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn leads(prefix: &str, count: usize) -> Vec<Lead> {
        (0..count)
            .map(|i| lead(&format!("{}-{}", prefix, i), i as f64, i % 2 == 0))
            .collect()
    }

    fn config() -> ControllerConfig {
        ControllerConfig::default().with_sort_keys(vec![
            SortKey::numeric("amount"),
            SortKey::lexical("title"),
        ])
    }

    fn fetches(commands: Vec<Command<LeadId, DealPartition>>) -> Vec<FetchRequest<DealPartition>> {
        commands
            .into_iter()
            .map(|command| match command {
                Command::Fetch(request) => request,
                Command::Delete(id) => panic!("unexpected delete of {}", id),
            })
            .collect()
    }

    fn page(records: Vec<Lead>, total_count: u64) -> Result<CollectionPage<Lead>, CollectionError> {
        Ok(CollectionPage {
            records,
            total_count,
        })
    }

    /// Start a controller and answer the initial fetches.
    fn loaded(open_total: u64, closed_total: u64) -> Controller {
        let mut controller = Controller::new(config());
        for request in fetches(controller.start()) {
            let total = match request.partition {
                DealPartition::Open => open_total,
                DealPartition::Closed => closed_total,
            };
            let count = total.min(10) as usize;
            let follow = controller.apply_fetch(
                request.partition,
                request.seq,
                page(leads("init", count), total),
            );
            assert!(follow.is_empty());
        }
        controller
    }

    /// Walk `label` forward to `target` answering every fetch.
    fn go_to_page(controller: &mut Controller, label: DealPartition, target: u32) {
        while controller.state().partition(label).page() < target {
            let total = controller.state().partition(label).total_count();
            let request = fetches(controller.request_page(label, PageDirection::Next)).remove(0);
            controller.apply_fetch(label, request.seq, page(leads("walk", 10), total));
        }
    }

    #[test]
    fn test_start_fetches_every_partition() {
        let mut controller = Controller::new(config());
        let requests = fetches(controller.start());
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].partition, DealPartition::Open);
        assert_eq!(requests[1].partition, DealPartition::Closed);
        assert!(controller.snapshot().partitions.iter().all(|p| p.is_loading));
    }

    #[test]
    fn test_loading_one_partition_does_not_block_other() {
        let mut controller = Controller::new(config());
        let requests = fetches(controller.start());
        controller.apply_fetch(DealPartition::Closed, requests[1].seq, page(leads("c", 3), 3));

        let snapshot = controller.snapshot();
        assert!(snapshot.partition(DealPartition::Open).is_loading);
        let closed = snapshot.partition(DealPartition::Closed);
        assert_eq!(closed.status, LoadStatus::Loaded);
        assert_eq!(closed.records.len(), 3);
    }

    #[test]
    fn test_switch_partition_is_pure_read_after_load() {
        let mut controller = loaded(23, 5);
        let commands = controller.switch_partition(DealPartition::Closed);
        assert!(commands.is_empty());
        assert_eq!(controller.snapshot().active_partition, DealPartition::Closed);
    }

    #[test]
    fn test_switch_partition_fetches_when_never_loaded() {
        let mut controller = Controller::new(config());
        let requests = fetches(controller.start());
        controller.apply_fetch(
            DealPartition::Closed,
            requests[1].seq,
            Err(CollectionError::Transport("down".to_string())),
        );
        let retry = fetches(controller.switch_partition(DealPartition::Closed));
        assert_eq!(retry.len(), 1);
        assert_eq!(retry[0].partition, DealPartition::Closed);
    }

    #[test]
    fn test_next_page_on_last_page_is_noop() {
        let mut controller = loaded(23, 0);
        assert_eq!(controller.state().partition(DealPartition::Open).total_pages(), 3);
        go_to_page(&mut controller, DealPartition::Open, 3);

        let revision = controller.revision();
        let commands = controller.request_page(DealPartition::Open, PageDirection::Next);
        assert!(commands.is_empty());
        assert_eq!(controller.state().partition(DealPartition::Open).page(), 3);
        assert_eq!(controller.revision(), revision);
    }

    #[test]
    fn test_previous_page_on_first_page_is_noop() {
        let mut controller = loaded(23, 0);
        assert!(controller
            .request_page(DealPartition::Open, PageDirection::Previous)
            .is_empty());
    }

    #[test]
    fn test_request_page_fetches_only_that_partition() {
        let mut controller = loaded(23, 23);
        let requests = fetches(controller.request_page(DealPartition::Closed, PageDirection::Next));
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].partition, DealPartition::Closed);
        assert_eq!(requests[0].query.offset, 10);
        assert!(!controller.snapshot().partition(DealPartition::Open).is_loading);
    }

    #[test]
    fn test_search_resets_both_partitions_before_fetching() {
        let mut controller = loaded(100, 100);
        go_to_page(&mut controller, DealPartition::Open, 4);
        go_to_page(&mut controller, DealPartition::Closed, 2);

        let requests = fetches(controller.set_search_text("acme".to_string()));
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.query.offset, 0);
            assert_eq!(request.query.search_text.as_deref(), Some("acme"));
        }
        assert_eq!(controller.state().partition(DealPartition::Open).page(), 1);
        assert_eq!(controller.state().partition(DealPartition::Closed).page(), 1);
    }

    #[test]
    fn test_same_search_text_is_noop() {
        let mut controller = loaded(5, 5);
        assert_eq!(controller.set_search_text("acme".to_string()).len(), 2);
        assert!(controller.set_search_text("acme".to_string()).is_empty());
    }

    #[test]
    fn test_set_page_size_resets_page_and_coerces() {
        let mut controller = loaded(100, 0);
        go_to_page(&mut controller, DealPartition::Open, 5);

        let requests = fetches(controller.set_page_size(DealPartition::Open, 33));
        let open = controller.state().partition(DealPartition::Open);
        assert_eq!(open.page(), 1);
        assert_eq!(open.page_size(), 30);
        assert_eq!(requests[0].query.offset, 0);
        assert_eq!(requests[0].query.limit, 30);
    }

    #[test]
    fn test_sort_cycle_per_key() {
        let mut controller = loaded(5, 5);
        controller.set_sort("amount");
        assert_eq!(controller.snapshot().sort_direction, Some(SortDirection::Asc));
        controller.set_sort("amount");
        assert_eq!(controller.snapshot().sort_direction, Some(SortDirection::Desc));
        controller.set_sort("amount");
        assert_eq!(controller.snapshot().sort_key, None);
        assert_eq!(controller.snapshot().sort_direction, None);
    }

    #[test]
    fn test_sort_other_key_starts_ascending() {
        let mut controller = loaded(5, 5);
        controller.set_sort("amount");
        controller.set_sort("amount");
        controller.set_sort("title");
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.sort_key.as_deref(), Some("title"));
        assert_eq!(snapshot.sort_direction, Some(SortDirection::Asc));
    }

    #[test]
    fn test_sort_unknown_key_ignored() {
        let mut controller = loaded(5, 5);
        let revision = controller.revision();
        controller.set_sort("nope");
        assert_eq!(controller.snapshot().sort_key, None);
        assert_eq!(controller.revision(), revision);
    }

    #[test]
    fn test_sort_reorders_visible_page_without_fetch() {
        let mut controller = Controller::new(config());
        let requests = fetches(controller.start());
        let rows = vec![lead("mid", 50.0, true), lead("low", 1.0, true), lead("high", 90.0, true)];
        controller.apply_fetch(DealPartition::Open, requests[0].seq, page(rows, 3));

        let commands = controller.handle(Intent::SetSort("amount".to_string()));
        assert!(commands.is_empty());
        controller.set_sort("amount");
        let titles: Vec<String> = controller
            .snapshot()
            .active()
            .records
            .iter()
            .map(|l| l.title.clone())
            .collect();
        assert_eq!(titles, vec!["high", "mid", "low"]);
        // Loaded page itself keeps server order.
        assert_eq!(controller.state().partition(DealPartition::Open).records()[0].title, "mid");
    }

    #[test]
    fn test_unassigned_filter_is_page_local() {
        let mut controller = loaded(10, 0);
        let commands = controller.handle(Intent::ToggleUnassignedOnly);
        assert!(commands.is_empty());
        let snapshot = controller.snapshot();
        assert!(snapshot.unassigned_only);
        assert_eq!(snapshot.active().records.len(), 5);
        assert!(snapshot.active().records.iter().all(|l| l.assignee.is_none()));
        assert_eq!(snapshot.active().total_count, 10);
    }

    #[test]
    fn test_last_request_wins() {
        let mut controller = loaded(30, 0);
        let first = fetches(controller.request_page(DealPartition::Open, PageDirection::Next)).remove(0);
        let second = fetches(controller.request_page(DealPartition::Open, PageDirection::Next)).remove(0);
        assert!(second.seq > first.seq);
        assert_eq!(second.query.offset, 20);

        let newer = leads("second", 10);
        controller.apply_fetch(DealPartition::Open, second.seq, page(newer.clone(), 30));
        let stale = controller.apply_fetch(DealPartition::Open, first.seq, page(leads("first", 10), 30));
        assert!(stale.is_empty());

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active().records, newer);
        assert_eq!(snapshot.active().page, 3);
    }

    #[test]
    fn test_stale_response_does_not_clear_loading() {
        let mut controller = loaded(30, 0);
        let first = fetches(controller.request_page(DealPartition::Open, PageDirection::Next)).remove(0);
        let _second = fetches(controller.request_page(DealPartition::Open, PageDirection::Next)).remove(0);
        controller.apply_fetch(DealPartition::Open, first.seq, page(leads("first", 10), 30));
        assert!(controller.snapshot().active().is_loading);
    }

    #[test]
    fn test_fetch_failure_keeps_stale_data_and_reports_event() {
        let mut controller = loaded(23, 5);
        let before = controller.snapshot().active().records.clone();
        let request = fetches(controller.request_page(DealPartition::Open, PageDirection::Next)).remove(0);
        let commands = controller.apply_fetch(
            DealPartition::Open,
            request.seq,
            Err(CollectionError::Status {
                status: 500,
                message: "boom".to_string(),
            }),
        );
        assert!(commands.is_empty());

        let snapshot = controller.snapshot();
        let open = snapshot.partition(DealPartition::Open);
        assert_eq!(open.status, LoadStatus::Errored);
        assert!(!open.is_loading);
        assert_eq!(open.records, before);
        assert_eq!(snapshot.partition(DealPartition::Closed).status, LoadStatus::Loaded);

        let events = controller.drain_events();
        assert!(matches!(
            events.as_slice(),
            [ControllerEvent::FetchFailed { partition: DealPartition::Open, .. }]
        ));
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut controller = loaded(3, 0);
        let id = controller.snapshot().active().records[0].lead_id;
        assert!(controller.handle(Intent::DeleteRecord(id)).is_empty());
        assert_eq!(controller.snapshot().pending_delete, Some(id));

        controller.cancel_delete();
        assert_eq!(controller.snapshot().pending_delete, None);
        assert!(controller.confirm_delete().is_empty());
    }

    #[test]
    fn test_delete_success_refetches_active_page() {
        let mut controller = loaded(3, 0);
        let id = controller.snapshot().active().records[0].lead_id;
        controller.delete_record(id);
        let commands = controller.confirm_delete();
        assert_eq!(commands, vec![Command::Delete(id)]);
        assert!(controller.snapshot().delete_in_flight);

        let requests = fetches(controller.apply_delete(id, Ok(())));
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].partition, DealPartition::Open);
        assert_eq!(controller.snapshot().pending_delete, None);
        // Row is still shown until the refetch lands.
        assert_eq!(controller.snapshot().active().records.len(), 3);
        assert!(matches!(
            controller.drain_events().as_slice(),
            [ControllerEvent::Deleted { .. }]
        ));
    }

    #[test]
    fn test_delete_failure_leaves_state_untouched() {
        let mut controller = loaded(3, 0);
        let before = controller.snapshot();
        let id = before.active().records[1].lead_id;
        controller.delete_record(id);
        controller.confirm_delete();
        let commands = controller.apply_delete(id, Err(CollectionError::Rejected("locked".to_string())));
        assert!(commands.is_empty());

        let after = controller.snapshot();
        assert_eq!(after.pending_delete, None);
        assert_eq!(after.active().records, before.active().records);
        assert_eq!(after.active().page, before.active().page);
        assert!(matches!(
            controller.drain_events().as_slice(),
            [ControllerEvent::DeleteFailed { .. }]
        ));
    }

    #[test]
    fn test_delete_ignored_while_another_in_flight() {
        let mut controller = loaded(3, 0);
        let records = controller.snapshot().active().records.clone();
        controller.delete_record(records[0].lead_id);
        controller.confirm_delete();
        controller.delete_record(records[1].lead_id);
        assert_eq!(controller.snapshot().pending_delete, Some(records[0].lead_id));
    }

    #[test]
    fn test_delete_last_record_on_last_page_reclamps() {
        let mut controller = loaded(21, 0);
        go_to_page(&mut controller, DealPartition::Open, 3);
        // Page 3 holds a single record.
        let request = fetches(controller.refresh())
            .into_iter()
            .find(|r| r.partition == DealPartition::Open)
            .unwrap();
        let only = lead("only", 1.0, true);
        controller.apply_fetch(DealPartition::Open, request.seq, page(vec![only.clone()], 21));
        assert_eq!(controller.snapshot().active().page, 3);

        controller.delete_record(only.lead_id);
        controller.confirm_delete();
        let refetch = fetches(controller.apply_delete(only.lead_id, Ok(()))).remove(0);
        assert_eq!(refetch.query.offset, 20);

        // Backend now has 20 records: page 3 is empty.
        let follow = fetches(controller.apply_fetch(DealPartition::Open, refetch.seq, page(Vec::new(), 20)));
        assert_eq!(follow.len(), 1);
        assert_eq!(follow[0].query.offset, 10);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active().page, 2);
        assert_eq!(snapshot.active().total_pages, 2);
        assert!(snapshot.active().is_loading);
        assert_eq!(snapshot.active().records.len(), 1, "old rows stay visible while reloading");

        let rows = leads("page2", 10);
        controller.apply_fetch(DealPartition::Open, follow[0].seq, page(rows.clone(), 20));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active().page, 2);
        assert_eq!(snapshot.active().records, rows);
    }

    #[test]
    fn test_shrunk_total_with_rows_still_reclamps() {
        let mut controller = loaded(30, 0);
        go_to_page(&mut controller, DealPartition::Open, 3);
        assert_eq!(controller.snapshot().active().page, 3);

        // Another client removed rows; the backend answers the stale offset
        // with a row from its own last page and a much smaller total.
        let request = fetches(controller.refresh())
            .into_iter()
            .find(|r| r.partition == DealPartition::Open)
            .unwrap();
        let stray = lead("stray", 1.0, true);
        let follow = fetches(controller.apply_fetch(DealPartition::Open, request.seq, page(vec![stray], 5)));
        assert_eq!(follow.len(), 1);
        assert_eq!(follow[0].query.offset, 0);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active().page, 1);
        assert_eq!(snapshot.active().total_pages, 1);
        assert!(snapshot.active().page <= snapshot.active().total_pages);
        assert!(snapshot.active().is_loading);

        let rows = leads("left", 5);
        controller.apply_fetch(DealPartition::Open, follow[0].seq, page(rows.clone(), 5));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active().page, 1);
        assert_eq!(snapshot.active().records, rows);
    }

    #[test]
    fn test_empty_collection_stays_on_first_page() {
        let mut controller = CollectionController::<Lead, SinglePartition>::new(config());
        let request = match controller.start().remove(0) {
            Command::Fetch(request) => request,
            Command::Delete(_) => unreachable!(),
        };
        let follow = controller.apply_fetch(SinglePartition::All, request.seq, page(Vec::new(), 0));
        assert!(follow.is_empty());
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.active().page, 1);
        assert_eq!(snapshot.active().total_pages, 1);
        assert_eq!(snapshot.active().status, LoadStatus::Loaded);
    }

    #[test]
    fn test_revision_advances_on_changes() {
        let mut controller = loaded(5, 5);
        let before = controller.revision();
        controller.toggle_unassigned_only();
        assert!(controller.revision() > before);
        assert_eq!(controller.snapshot().revision, controller.revision());
    }
}

//! DealDesk Test Utilities
//!
//! Shared test infrastructure for the DealDesk workspace:
//! - Proptest generators for CRM records and pagination geometry
//! - An in-memory collection backend with failure injection
//! - Test fixtures for common scenarios
//! - Custom assertions for paging invariants

// Re-export core types for convenience
pub use dealdesk_core::{
    CollectionApi, CollectionError, CollectionPage, Comment, CommentId, DealPartition,
    EntityIdType, Interaction, InteractionId, InteractionKind, Lead, LeadId, LeadStatus,
    OrganizationId, PartitionSnapshot, QueryDescriptor, Record, SessionContext, Timestamp, UserId,
    UserRef,
};

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// ============================================================================
// IN-MEMORY COLLECTION BACKEND
// ============================================================================

type PartitionFn<R> = Arc<dyn Fn(&R, &str) -> bool + Send + Sync>;
type SearchFn<R> = Arc<dyn Fn(&R, &str) -> bool + Send + Sync>;
type FilterFn<R> = Arc<dyn Fn(&R, &BTreeMap<String, String>) -> bool + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// [`CollectionApi`] over a vector of records.
///
/// Applies the partition, search and extra filters of each query the way a
/// backend would, then slices out `offset..offset+limit`. Failures and
/// per-call delays can be queued up front to script a scenario.
#[derive(Clone)]
pub struct InMemoryCollection<R: Record> {
    records: Arc<Mutex<Vec<R>>>,
    partition_fn: PartitionFn<R>,
    search_fn: SearchFn<R>,
    filter_fn: FilterFn<R>,
    fetch_failures: Arc<Mutex<VecDeque<CollectionError>>>,
    delete_failures: Arc<Mutex<VecDeque<CollectionError>>>,
    fetch_delays: Arc<Mutex<VecDeque<Duration>>>,
    queries: Arc<Mutex<Vec<QueryDescriptor>>>,
}

impl<R: Record> InMemoryCollection<R> {
    /// Backend with a single "all" partition, no search and no filters.
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            partition_fn: Arc::new(|_, _| true),
            search_fn: Arc::new(|_, _| true),
            filter_fn: Arc::new(|_, _| true),
            fetch_failures: Arc::new(Mutex::new(VecDeque::new())),
            delete_failures: Arc::new(Mutex::new(VecDeque::new())),
            fetch_delays: Arc::new(Mutex::new(VecDeque::new())),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_partition_fn(
        mut self,
        partition_fn: impl Fn(&R, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.partition_fn = Arc::new(partition_fn);
        self
    }

    pub fn with_search_fn(mut self, search_fn: impl Fn(&R, &str) -> bool + Send + Sync + 'static) -> Self {
        self.search_fn = Arc::new(search_fn);
        self
    }

    pub fn with_filter_fn(
        mut self,
        filter_fn: impl Fn(&R, &BTreeMap<String, String>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.filter_fn = Arc::new(filter_fn);
        self
    }

    /// Make the next fetch fail with `error`.
    pub fn fail_next_fetch(&self, error: CollectionError) {
        lock(&self.fetch_failures).push_back(error);
    }

    /// Make the next delete fail with `error`.
    pub fn fail_next_delete(&self, error: CollectionError) {
        lock(&self.delete_failures).push_back(error);
    }

    /// Delay the next fetch by `delay` before it answers.
    pub fn delay_next_fetch(&self, delay: Duration) {
        lock(&self.fetch_delays).push_back(delay);
    }

    /// Every query received so far, in arrival order.
    pub fn queries(&self) -> Vec<QueryDescriptor> {
        lock(&self.queries).clone()
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert(&self, record: R) {
        lock(&self.records).push(record);
    }

    fn matching(&self, query: &QueryDescriptor) -> Vec<R> {
        let search = query.search_text.as_deref().unwrap_or("");
        let records = lock(&self.records);
        records
            .iter()
            .filter(|r| (self.partition_fn)(*r, &query.partition_filter))
            .filter(|r| search.is_empty() || (self.search_fn)(*r, search))
            .filter(|r| (self.filter_fn)(*r, &query.extra_filters))
            .cloned()
            .collect()
    }
}

impl InMemoryCollection<Lead> {
    /// Leads split into open/closed by status, searchable by title, company
    /// and contact.
    pub fn leads(records: Vec<Lead>) -> Self {
        Self::new(records)
            .with_partition_fn(|lead, partition| match partition {
                "open" => lead.status.is_open(),
                "closed" => !lead.status.is_open(),
                _ => true,
            })
            .with_search_fn(|lead, search| {
                let needle = search.to_lowercase();
                [Some(lead.title.as_str()), lead.company.as_deref(), lead.contact_name.as_deref()]
                    .into_iter()
                    .flatten()
                    .any(|text| text.to_lowercase().contains(&needle))
            })
    }
}

impl InMemoryCollection<Interaction> {
    pub fn interactions(records: Vec<Interaction>) -> Self {
        Self::new(records)
            .with_search_fn(|interaction, search| {
                interaction
                    .subject
                    .to_lowercase()
                    .contains(&search.to_lowercase())
            })
            .with_filter_fn(|interaction, filters| {
                filters
                    .get("lead_id")
                    .map_or(true, |id| interaction.lead_id.to_string() == *id)
            })
    }
}

impl InMemoryCollection<Comment> {
    pub fn comments(records: Vec<Comment>) -> Self {
        Self::new(records)
            .with_search_fn(|comment, search| comment.body.to_lowercase().contains(&search.to_lowercase()))
            .with_filter_fn(|comment, filters| {
                filters
                    .get("interaction_id")
                    .map_or(true, |id| comment.interaction_id.to_string() == *id)
            })
    }
}

#[async_trait]
impl<R: Record> CollectionApi<R> for InMemoryCollection<R> {
    async fn fetch_page(&self, query: &QueryDescriptor) -> Result<CollectionPage<R>, CollectionError> {
        lock(&self.queries).push(query.clone());

        let delay = lock(&self.fetch_delays).pop_front();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let failure = lock(&self.fetch_failures).pop_front();
        if let Some(error) = failure {
            return Err(error);
        }

        let matching = self.matching(query);
        let total_count = matching.len() as u64;
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let records = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .collect();
        Ok(CollectionPage {
            records,
            total_count,
        })
    }

    async fn delete_record(&self, id: &R::Id) -> Result<(), CollectionError> {
        let failure = lock(&self.delete_failures).pop_front();
        if let Some(error) = failure {
            return Err(error);
        }
        let mut records = lock(&self.records);
        match records.iter().position(|r| r.id() == *id) {
            Some(index) => {
                records.remove(index);
                Ok(())
            }
            None => Err(CollectionError::Status {
                status: 404,
                message: format!("record {} not found", id),
            }),
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating DealDesk records.

    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    // === Identity Type Generators ===

    /// Generate a random UUID (for generic ID generation).
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    pub fn arb_lead_id() -> impl Strategy<Value = LeadId> {
        arb_uuid().prop_map(LeadId::new)
    }

    pub fn arb_interaction_id() -> impl Strategy<Value = InteractionId> {
        arb_uuid().prop_map(InteractionId::new)
    }

    pub fn arb_comment_id() -> impl Strategy<Value = CommentId> {
        arb_uuid().prop_map(CommentId::new)
    }

    pub fn arb_user_id() -> impl Strategy<Value = UserId> {
        arb_uuid().prop_map(UserId::new)
    }

    /// Generate a Timestamp (DateTime<Utc>).
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        // 2020-2030
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    // === Enum Generators ===

    pub fn arb_lead_status() -> impl Strategy<Value = LeadStatus> {
        prop::sample::select(LeadStatus::all())
    }

    pub fn arb_interaction_kind() -> impl Strategy<Value = InteractionKind> {
        prop::sample::select(InteractionKind::all())
    }

    // === Struct Generators ===

    pub fn arb_user_ref() -> impl Strategy<Value = UserRef> {
        (
            arb_user_id(),
            "[A-Z][a-z]{2,10}",
            prop::option::of("[a-z]{3,8}@example\\.com"),
        )
            .prop_map(|(user_id, name, email)| UserRef {
                user_id,
                name,
                email,
            })
    }

    /// Generate a Lead struct.
    pub fn arb_lead() -> impl Strategy<Value = Lead> {
        (
            arb_lead_id(),
            "[a-zA-Z0-9 ]{1,40}",
            prop::option::of("[A-Z][a-z]{2,15}"),
            prop::option::of("[A-Z][a-z]{2,10} [A-Z][a-z]{2,10}"),
            prop::option::of(0.0f64..1_000_000.0),
            prop::option::of(0u8..=100),
            arb_lead_status(),
            prop::option::of(arb_user_ref()),
            arb_timestamp(),
        )
            .prop_map(
                |(
                    lead_id,
                    title,
                    company,
                    contact_name,
                    amount,
                    probability,
                    status,
                    assignee,
                    created_at,
                )| {
                    Lead {
                        lead_id,
                        title,
                        company,
                        contact_name,
                        amount,
                        probability,
                        status,
                        assignee,
                        created_at,
                        updated_at: created_at,
                    }
                },
            )
    }

    /// Generate an Interaction logged against `lead_id`.
    pub fn arb_interaction(lead_id: LeadId) -> impl Strategy<Value = Interaction> {
        (
            arb_interaction_id(),
            arb_interaction_kind(),
            "[a-zA-Z0-9 ]{1,60}",
            prop::option::of(arb_user_ref()),
            arb_timestamp(),
        )
            .prop_map(move |(interaction_id, kind, subject, assignee, occurred_at)| Interaction {
                interaction_id,
                lead_id,
                kind,
                subject,
                assignee,
                occurred_at,
            })
    }

    /// Generate a Comment on `interaction_id`.
    pub fn arb_comment(interaction_id: InteractionId) -> impl Strategy<Value = Comment> {
        (
            arb_comment_id(),
            prop::option::of(arb_user_ref()),
            "[a-zA-Z0-9 .,!?]{1,200}",
            arb_timestamp(),
        )
            .prop_map(move |(comment_id, author, body, created_at)| Comment {
                comment_id,
                interaction_id,
                author,
                body,
                created_at,
            })
    }

    /// Generate `(total_count, page_size, page)` with `page` inside
    /// `[1, total_pages]`.
    pub fn arb_page_geometry() -> impl Strategy<Value = (u64, u32, u32)> {
        (0u64..2_000, prop::sample::select(vec![10u32, 20, 30, 40, 50])).prop_flat_map(
            |(total, page_size)| {
                let pages = dealdesk_core::pages_for(total, page_size);
                (Just(total), Just(page_size), 1..=pages)
            },
        )
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records for common testing scenarios.

    use super::*;

    pub fn test_user(name: &str) -> UserRef {
        UserRef {
            user_id: UserId::now_v7(),
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
        }
    }

    /// Create an open lead assigned to a test user.
    pub fn open_lead(title: &str, amount: f64) -> Lead {
        let now = Utc::now();
        Lead {
            lead_id: LeadId::now_v7(),
            title: title.to_string(),
            company: Some("Acme".to_string()),
            contact_name: Some("Ada Lovelace".to_string()),
            amount: Some(amount),
            probability: Some(50),
            status: LeadStatus::Qualified,
            assignee: Some(test_user("Grace")),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a won lead with nobody assigned.
    pub fn closed_lead(title: &str, amount: f64) -> Lead {
        Lead {
            status: LeadStatus::Won,
            assignee: None,
            company: Some("Globex".to_string()),
            ..open_lead(title, amount)
        }
    }

    /// `open` open leads followed by `closed` closed leads, titled
    /// `open-N` / `closed-N` with amount N.
    pub fn lead_batch(open: usize, closed: usize) -> Vec<Lead> {
        (0..open)
            .map(|i| open_lead(&format!("open-{}", i), i as f64))
            .chain((0..closed).map(|i| closed_lead(&format!("closed-{}", i), i as f64)))
            .collect()
    }

    pub fn interaction_for(lead_id: LeadId, subject: &str) -> Interaction {
        Interaction {
            interaction_id: InteractionId::now_v7(),
            lead_id,
            kind: InteractionKind::Call,
            subject: subject.to_string(),
            assignee: Some(test_user("Grace")),
            occurred_at: Utc::now(),
        }
    }

    pub fn comment_for(interaction_id: InteractionId, body: &str) -> Comment {
        Comment {
            comment_id: CommentId::now_v7(),
            interaction_id,
            author: Some(test_user("Linus")),
            body: body.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Session authenticated with an API key.
    pub fn test_session() -> SessionContext {
        SessionContext {
            organization_id: OrganizationId::now_v7(),
            api_key: Some("test-key".to_string()),
            jwt: None,
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for paging invariants.

    use super::*;

    /// Assert that a partition's page lies in `[1, total_pages]`.
    #[track_caller]
    pub fn assert_page_in_range<R, P: std::fmt::Debug>(partition: &PartitionSnapshot<R, P>) {
        assert!(
            partition.page >= 1 && partition.page <= partition.total_pages.max(1),
            "Partition {:?} on page {} of {}",
            partition.label,
            partition.page,
            partition.total_pages
        );
    }

    /// Assert that a loaded partition with records on the backend never
    /// displays an empty page.
    #[track_caller]
    pub fn assert_not_empty_page<R, P: std::fmt::Debug>(partition: &PartitionSnapshot<R, P>) {
        if partition.total_count > 0 {
            assert!(
                !partition.records.is_empty(),
                "Partition {:?} shows an empty page {} of {} ({} records)",
                partition.label,
                partition.page,
                partition.total_pages,
                partition.total_count
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

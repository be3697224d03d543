//! Async session tests against the in-memory backend.

use dealdesk_core::{
    CollectionError, ControllerConfig, ControllerEvent, DealPartition, EntityIdType, Interaction,
    Lead, LeadId, LoadStatus, PageDirection, PageSizes, PartitionKey, Record, SinglePartition,
};
use dealdesk_test_utils::fixtures::{interaction_for, lead_batch};
use dealdesk_test_utils::InMemoryCollection;
use dealdesk_tui::session::{ListControls, ListSession, Outcome};
use dealdesk_tui::traits::TableRow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

type LeadOutcome = Outcome<Lead, DealPartition>;
type LeadSession = ListSession<Lead, DealPartition, LeadOutcome>;
type InteractionOutcome = Outcome<Interaction, SinglePartition>;
type InteractionSession = ListSession<Interaction, SinglePartition, InteractionOutcome>;

fn config<R: TableRow>() -> ControllerConfig {
    ControllerConfig::default()
        .with_sort_keys(R::sort_keys())
        .with_page_sizes(10, PageSizes::new(vec![10, 20, 30]).unwrap())
}

fn lead_session(
    backend: &InMemoryCollection<Lead>,
) -> (LeadSession, mpsc::Receiver<LeadOutcome>) {
    let (tx, rx) = mpsc::channel(64);
    let session = ListSession::new(config::<Lead>(), Arc::new(backend.clone()), tx, |o| o);
    (session, rx)
}

fn interaction_session(
    backend: &InMemoryCollection<Interaction>,
) -> (InteractionSession, mpsc::Receiver<InteractionOutcome>) {
    let (tx, rx) = mpsc::channel(64);
    let session = ListSession::new(config::<Interaction>(), Arc::new(backend.clone()), tx, |o| o);
    (session, rx)
}

/// Apply outcomes until nothing is in flight.
async fn settle<R, P>(
    session: &mut ListSession<R, P, Outcome<R, P>>,
    rx: &mut mpsc::Receiver<Outcome<R, P>>,
) where
    R: Record,
    P: PartitionKey,
{
    while session.in_flight() > 0 {
        let outcome = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for an outcome")
            .expect("channel closed");
        session.apply(outcome);
    }
}

async fn wait_for_queries<R: Record>(backend: &InMemoryCollection<R>, count: usize) {
    for _ in 0..1_000 {
        if backend.queries().len() >= count {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("backend never saw {} queries", count);
}

#[tokio::test]
async fn start_loads_both_partitions() {
    let backend = InMemoryCollection::leads(lead_batch(12, 3));
    let (mut session, mut rx) = lead_session(&backend);

    session.start();
    assert_eq!(session.in_flight(), 2);
    settle(&mut session, &mut rx).await;

    let snapshot = session.snapshot();
    let open = snapshot.partition(DealPartition::Open);
    assert_eq!(open.total_count, 12);
    assert_eq!(open.total_pages, 2);
    assert_eq!(open.records.len(), 10);
    assert_eq!(open.status, LoadStatus::Loaded);
    let closed = snapshot.partition(DealPartition::Closed);
    assert_eq!(closed.total_count, 3);
    assert_eq!(closed.records.len(), 3);
}

#[tokio::test]
async fn paging_stops_at_last_page() {
    let backend = InMemoryCollection::leads(lead_batch(12, 0));
    let (mut session, mut rx) = lead_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;

    session.page(PageDirection::Next);
    settle(&mut session, &mut rx).await;
    let active = session.snapshot().active().clone();
    assert_eq!(active.page, 2);
    assert_eq!(active.records.len(), 2);

    let before = backend.queries().len();
    session.page(PageDirection::Next);
    assert_eq!(session.in_flight(), 0);
    assert_eq!(backend.queries().len(), before);
}

#[tokio::test]
async fn search_resets_pages_and_filters_every_partition() {
    let backend = InMemoryCollection::leads(lead_batch(12, 4));
    let (mut session, mut rx) = lead_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;
    session.page(PageDirection::Next);
    settle(&mut session, &mut rx).await;

    session.search("open-1".to_string());
    assert_eq!(session.in_flight(), 2);
    settle(&mut session, &mut rx).await;

    let snapshot = session.snapshot();
    let open = snapshot.partition(DealPartition::Open);
    assert_eq!(open.page, 1);
    // open-1, open-10, open-11
    assert_eq!(open.total_count, 3);
    assert_eq!(snapshot.partition(DealPartition::Closed).total_count, 0);
    let last = backend.queries().pop().unwrap();
    assert_eq!(last.search_text.as_deref(), Some("open-1"));
    assert_eq!(last.offset, 0);
}

#[tokio::test]
async fn slow_response_never_overwrites_newer_one() {
    let records = (0..5)
        .map(|i| interaction_for(LeadId::now_v7(), &format!("alpha-{}", i)))
        .chain((0..2).map(|i| interaction_for(LeadId::now_v7(), &format!("beta-{}", i))))
        .collect();
    let backend = InMemoryCollection::interactions(records);
    let (mut session, mut rx) = interaction_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;
    let seen = backend.queries().len();

    backend.delay_next_fetch(Duration::from_millis(100));
    session.search("alpha".to_string());
    wait_for_queries(&backend, seen + 1).await;
    session.search("beta".to_string());
    settle(&mut session, &mut rx).await;

    let active = session.snapshot().active().clone();
    assert_eq!(active.total_count, 2);
    assert!(active.records.iter().all(|i| i.subject.starts_with("beta")));
}

#[tokio::test]
async fn fetch_failure_keeps_previous_page() {
    let lead_id = LeadId::now_v7();
    let backend = InMemoryCollection::interactions(vec![
        interaction_for(lead_id, "kickoff"),
        interaction_for(lead_id, "demo"),
    ]);
    let (mut session, mut rx) = interaction_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;
    session.drain_events();

    backend.fail_next_fetch(CollectionError::Transport("connection reset".to_string()));
    session.refresh();
    settle(&mut session, &mut rx).await;

    let active = session.snapshot().active().clone();
    assert_eq!(active.status, LoadStatus::Errored);
    assert_eq!(active.records.len(), 2);
    let events = session.drain_events();
    assert!(matches!(events.as_slice(), [ControllerEvent::FetchFailed { .. }]));
}

#[tokio::test]
async fn deleting_only_record_on_last_page_moves_back() {
    let backend = InMemoryCollection::leads(lead_batch(11, 0));
    let (mut session, mut rx) = lead_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;
    session.page(PageDirection::Next);
    settle(&mut session, &mut rx).await;
    assert_eq!(session.snapshot().active().records.len(), 1);

    session.request_delete_selected();
    assert!(session.has_pending_delete());
    session.confirm_delete();
    settle(&mut session, &mut rx).await;

    let active = session.snapshot().active().clone();
    assert_eq!(active.page, 1);
    assert_eq!(active.total_count, 10);
    assert_eq!(active.records.len(), 10);
    assert!(!session.has_pending_delete());
    assert_eq!(backend.len(), 10);
    let events = session.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, ControllerEvent::Deleted { .. })));
}

#[tokio::test]
async fn cancelled_delete_sends_nothing() {
    let backend = InMemoryCollection::leads(lead_batch(3, 0));
    let (mut session, mut rx) = lead_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;

    session.request_delete_selected();
    session.cancel_delete();
    assert!(!session.has_pending_delete());
    assert_eq!(session.in_flight(), 0);
    assert_eq!(backend.len(), 3);
}

#[tokio::test]
async fn failed_delete_keeps_record() {
    let backend = InMemoryCollection::leads(lead_batch(3, 0));
    let (mut session, mut rx) = lead_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;

    backend.fail_next_delete(CollectionError::Rejected("lead has open interactions".to_string()));
    session.request_delete_selected();
    session.confirm_delete();
    settle(&mut session, &mut rx).await;

    assert_eq!(backend.len(), 3);
    assert_eq!(session.snapshot().active().records.len(), 3);
    let events = session.drain_events();
    assert!(matches!(events.as_slice(), [ControllerEvent::DeleteFailed { .. }]));
}

#[tokio::test]
async fn unassigned_filter_and_sort_stay_on_the_loaded_page() {
    let mut leads = lead_batch(4, 0);
    leads[1].assignee = None;
    leads[3].assignee = None;
    let backend = InMemoryCollection::leads(leads);
    let (mut session, mut rx) = lead_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;
    let seen = backend.queries().len();

    session.toggle_unassigned();
    assert_eq!(session.snapshot().active().records.len(), 2);

    // Cursor starts on "title"; first cycle sorts ascending, second descending.
    session.cycle_sort();
    session.cycle_sort();
    let titles: Vec<String> = session
        .snapshot()
        .active()
        .records
        .iter()
        .map(|lead| lead.title.clone())
        .collect();
    assert_eq!(titles, vec!["open-3".to_string(), "open-1".to_string()]);

    assert_eq!(session.in_flight(), 0);
    assert_eq!(backend.queries().len(), seen);
}

#[tokio::test]
async fn page_size_cycles_through_allowed_sizes() {
    let backend = InMemoryCollection::leads(lead_batch(25, 0));
    let (mut session, mut rx) = lead_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;

    session.cycle_page_size();
    settle(&mut session, &mut rx).await;
    let active = session.snapshot().active().clone();
    assert_eq!(active.page_size, 20);
    assert_eq!(active.records.len(), 20);
    assert_eq!(backend.queries().pop().unwrap().limit, 20);
}

#[tokio::test]
async fn reset_discards_results_of_the_previous_controller() {
    let lead_a = LeadId::now_v7();
    let lead_b = LeadId::now_v7();
    let backend = InMemoryCollection::interactions(vec![
        interaction_for(lead_a, "a-call"),
        interaction_for(lead_a, "a-demo"),
        interaction_for(lead_b, "b-call"),
    ]);
    let (mut session, mut rx) = interaction_session(&backend);

    backend.delay_next_fetch(Duration::from_millis(50));
    session.start();
    wait_for_queries(&backend, 1).await;
    session.reset(config::<Interaction>().with_extra_filter("lead_id", lead_b.to_string()));
    settle(&mut session, &mut rx).await;

    let stale = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("stale outcome never arrived")
        .expect("channel closed");
    session.apply(stale);

    let active = session.snapshot().active().clone();
    assert_eq!(active.total_count, 1);
    assert_eq!(active.records[0].subject, "b-call");
    assert_eq!(session.in_flight(), 0);
}

#[tokio::test]
async fn selection_wraps_and_survives_sorting() {
    let backend = InMemoryCollection::leads(lead_batch(3, 0));
    let (mut session, mut rx) = lead_session(&backend);
    session.start();
    settle(&mut session, &mut rx).await;

    session.select_next();
    let selected = session.selected_record().unwrap();
    assert_eq!(selected.title, "open-1");

    session.cycle_sort();
    session.cycle_sort();
    let records = session.snapshot().active().records.clone();
    assert_eq!(session.selected_index(&records), Some(1));

    session.select_previous();
    session.select_previous();
    assert_eq!(session.selected_record().unwrap().title, "open-0");
}

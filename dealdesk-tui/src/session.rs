//! Async driver for one collection controller.
//!
//! A [`ListSession`] owns a controller and executes the commands it returns:
//! each command becomes a tokio task that calls the [`CollectionApi`] and
//! posts an [`Outcome`] back to the event loop, which hands it to
//! [`ListSession::apply`]. The controller itself is only touched from the
//! event loop.

use dealdesk_core::{
    CollectionApi, CollectionController, CollectionError, CollectionPage, Command,
    ControllerConfig, ControllerEvent, FetchRequest, Intent, PageDirection, PartitionKey, Record,
    Snapshot, SortKey,
};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Result of one executed command, routed back to its session.
#[derive(Debug)]
pub enum Outcome<R: Record, P> {
    Fetched {
        generation: u64,
        partition: P,
        seq: u64,
        result: Result<CollectionPage<R>, CollectionError>,
    },
    Deleted {
        generation: u64,
        id: R::Id,
        result: Result<(), CollectionError>,
    },
}

/// One list screen: controller, backend and selection.
pub struct ListSession<R: Record, P: PartitionKey, M> {
    controller: CollectionController<R, P>,
    api: Arc<dyn CollectionApi<R>>,
    sender: mpsc::Sender<M>,
    wrap: fn(Outcome<R, P>) -> M,
    /// Bumped on reset so results of the previous controller are dropped.
    generation: u64,
    in_flight: usize,
    selected: Option<R::Id>,
    sort_cursor: usize,
}

impl<R, P, M> ListSession<R, P, M>
where
    R: Record,
    P: PartitionKey,
    M: Send + 'static,
{
    pub fn new(
        config: ControllerConfig,
        api: Arc<dyn CollectionApi<R>>,
        sender: mpsc::Sender<M>,
        wrap: fn(Outcome<R, P>) -> M,
    ) -> Self {
        Self {
            controller: CollectionController::new(config),
            api,
            sender,
            wrap,
            generation: 0,
            in_flight: 0,
            selected: None,
            sort_cursor: 0,
        }
    }

    pub fn controller(&self) -> &CollectionController<R, P> {
        &self.controller
    }

    pub fn snapshot(&self) -> Snapshot<R, P> {
        self.controller.snapshot()
    }

    /// Number of commands whose outcome has not come back yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn start(&mut self) {
        let commands = self.controller.start();
        self.execute(commands);
    }

    /// Replace the controller, e.g. when the screen's fixed filters change.
    pub fn reset(&mut self, config: ControllerConfig) {
        self.controller = CollectionController::new(config);
        self.generation += 1;
        self.in_flight = 0;
        self.selected = None;
        self.sort_cursor = 0;
        self.start();
    }

    pub fn dispatch(&mut self, intent: Intent<R::Id, P>) {
        let commands = self.controller.handle(intent);
        self.execute(commands);
    }

    pub fn apply(&mut self, outcome: Outcome<R, P>) {
        let commands = match outcome {
            Outcome::Fetched {
                generation,
                partition,
                seq,
                result,
            } => {
                if generation != self.generation {
                    tracing::debug!(generation, current = self.generation, "dropping fetch from replaced session");
                    return;
                }
                self.in_flight = self.in_flight.saturating_sub(1);
                self.controller.apply_fetch(partition, seq, result)
            }
            Outcome::Deleted {
                generation,
                id,
                result,
            } => {
                if generation != self.generation {
                    tracing::debug!(generation, current = self.generation, "dropping delete from replaced session");
                    return;
                }
                self.in_flight = self.in_flight.saturating_sub(1);
                if result.is_ok() && self.selected.as_ref() == Some(&id) {
                    self.selected = None;
                }
                self.controller.apply_delete(id, result)
            }
        };
        self.execute(commands);
    }

    pub fn drain_events(&mut self) -> Vec<ControllerEvent<R::Id, P>> {
        self.controller.drain_events()
    }

    pub fn active_partition(&self) -> P {
        self.controller.state().active_partition()
    }

    pub fn sort_keys(&self) -> &[SortKey] {
        &self.controller.config().sort_keys
    }

    /// Index of the column the sort key cursor is on.
    pub fn sort_cursor(&self) -> usize {
        self.sort_cursor
    }

    /// Position of the selected record among `records`, falling back to
    /// the first row.
    pub fn selected_index(&self, records: &[R]) -> Option<usize> {
        if records.is_empty() {
            return None;
        }
        let found = self
            .selected
            .as_ref()
            .and_then(|id| records.iter().position(|record| record.id() == *id));
        Some(found.unwrap_or(0))
    }

    pub fn selected_record(&self) -> Option<R> {
        let records = self.controller.visible_records(self.active_partition());
        self.selected_index(&records).map(|index| records[index].clone())
    }

    fn execute(&mut self, commands: Vec<Command<R::Id, P>>) {
        for command in commands {
            self.in_flight += 1;
            let api = Arc::clone(&self.api);
            let sender = self.sender.clone();
            let wrap = self.wrap;
            let generation = self.generation;
            match command {
                Command::Fetch(FetchRequest {
                    partition,
                    seq,
                    query,
                }) => {
                    tokio::spawn(async move {
                        let result = api.fetch_page(&query).await;
                        let outcome = Outcome::Fetched {
                            generation,
                            partition,
                            seq,
                            result,
                        };
                        if sender.send(wrap(outcome)).await.is_err() {
                            tracing::debug!(?partition, seq, "event loop closed, dropping fetch result");
                        }
                    });
                }
                Command::Delete(id) => {
                    tokio::spawn(async move {
                        let result = api.delete_record(&id).await;
                        let outcome = Outcome::Deleted {
                            generation,
                            id,
                            result,
                        };
                        if sender.send(wrap(outcome)).await.is_err() {
                            tracing::debug!("event loop closed, dropping delete result");
                        }
                    });
                }
            }
        }
    }
}

/// Screen-independent controls the key handler drives.
pub trait ListControls {
    fn select_next(&mut self);
    fn select_previous(&mut self);
    fn page(&mut self, direction: PageDirection);
    fn shift_partition(&mut self, forward: bool);
    fn cycle_page_size(&mut self);
    fn next_sort_column(&mut self);
    /// Cycle the sort on the column under the cursor.
    fn cycle_sort(&mut self);
    fn toggle_unassigned(&mut self);
    fn search(&mut self, text: String);
    fn search_text(&self) -> &str;
    fn refresh(&mut self);
    fn request_delete_selected(&mut self);
    fn confirm_delete(&mut self);
    fn cancel_delete(&mut self);
    fn has_pending_delete(&self) -> bool;
}

impl<R, P, M> ListControls for ListSession<R, P, M>
where
    R: Record,
    P: PartitionKey,
    M: Send + 'static,
{
    fn select_next(&mut self) {
        let records = self.controller.visible_records(self.active_partition());
        select_next_id(&records, &mut self.selected);
    }

    fn select_previous(&mut self) {
        let records = self.controller.visible_records(self.active_partition());
        select_prev_id(&records, &mut self.selected);
    }

    fn page(&mut self, direction: PageDirection) {
        let active = self.active_partition();
        self.selected = None;
        self.dispatch(Intent::RequestPage(active, direction));
    }

    fn shift_partition(&mut self, forward: bool) {
        let all = P::all();
        let index = self.active_partition().index();
        let next = if forward {
            (index + 1) % all.len()
        } else if index == 0 {
            all.len() - 1
        } else {
            index - 1
        };
        self.selected = None;
        self.dispatch(Intent::SwitchPartition(all[next]));
    }

    fn cycle_page_size(&mut self) {
        let active = self.active_partition();
        let current = self.controller.state().partition(active).page_size();
        let next = self.controller.config().page_sizes.next_after(current);
        self.dispatch(Intent::SetPageSize(active, next));
    }

    fn next_sort_column(&mut self) {
        let count = self.sort_keys().len();
        if count > 0 {
            self.sort_cursor = (self.sort_cursor + 1) % count;
        }
    }

    fn cycle_sort(&mut self) {
        if let Some(key) = self.sort_keys().get(self.sort_cursor) {
            let field = key.field.clone();
            self.dispatch(Intent::SetSort(field));
        }
    }

    fn toggle_unassigned(&mut self) {
        self.dispatch(Intent::ToggleUnassignedOnly);
    }

    fn search(&mut self, text: String) {
        self.selected = None;
        self.dispatch(Intent::SetSearchText(text));
    }

    fn search_text(&self) -> &str {
        self.controller.state().search_text()
    }

    fn refresh(&mut self) {
        self.dispatch(Intent::Refresh);
    }

    fn request_delete_selected(&mut self) {
        if let Some(record) = self.selected_record() {
            self.dispatch(Intent::DeleteRecord(record.id()));
        }
    }

    fn confirm_delete(&mut self) {
        self.dispatch(Intent::ConfirmDelete);
    }

    fn cancel_delete(&mut self) {
        self.dispatch(Intent::CancelDelete);
    }

    fn has_pending_delete(&self) -> bool {
        self.controller.state().pending_delete().is_some()
    }
}

fn select_next_id<R: Record>(records: &[R], selected: &mut Option<R::Id>) {
    if records.is_empty() {
        *selected = None;
        return;
    }
    // An unset selection is shown on the first row.
    let index = selected
        .as_ref()
        .and_then(|id| records.iter().position(|record| record.id() == *id))
        .unwrap_or(0);
    let next = (index + 1) % records.len();
    *selected = Some(records[next].id());
}

fn select_prev_id<R: Record>(records: &[R], selected: &mut Option<R::Id>) {
    if records.is_empty() {
        *selected = None;
        return;
    }
    let index = selected
        .as_ref()
        .and_then(|id| records.iter().position(|record| record.id() == *id))
        .unwrap_or(0);
    let prev = if index == 0 {
        records.len() - 1
    } else {
        index - 1
    };
    *selected = Some(records[prev].id());
}

#[cfg(test)]
mod tests {
    use super::*;
    use dealdesk_test_utils::fixtures::lead_batch;

    #[test]
    fn test_select_next_wraps() {
        let leads = lead_batch(3, 0);
        let mut selected = None;
        select_next_id(&leads, &mut selected);
        assert_eq!(selected, Some(leads[1].lead_id));
        select_next_id(&leads, &mut selected);
        select_next_id(&leads, &mut selected);
        assert_eq!(selected, Some(leads[0].lead_id));
    }

    #[test]
    fn test_select_prev_from_unset_goes_to_last() {
        let leads = lead_batch(3, 0);
        let mut selected = None;
        select_prev_id(&leads, &mut selected);
        assert_eq!(selected, Some(leads[2].lead_id));
    }

    #[test]
    fn test_selection_cleared_on_empty_page() {
        let leads = lead_batch(0, 0);
        let mut selected = Some(dealdesk_core::EntityIdType::nil());
        select_next_id(&leads, &mut selected);
        assert_eq!(selected, None);
    }
}

//! Application state and input handling.

use crate::api_client::{RestClient, RestCollection};
use crate::config::{ConfigError, TuiConfig};
use crate::events::TuiEvent;
use crate::keys::{map_key, Action};
use crate::nav::Screen;
use crate::notifications::{Notification, NotificationAction, NotificationLevel};
use crate::session::{ListControls, ListSession};
use crate::theme::SynthBruteTheme;
use crate::traits::TableRow;
use chrono::{Duration, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use dealdesk_core::{
    CollectionApi, Comment, ControllerConfig, ControllerEvent, DealPartition, Interaction, Lead,
    PageDirection, PartitionKey, Record, SinglePartition,
};
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Informational notifications disappear after this many seconds.
const NOTIFICATION_TTL_SECS: i64 = 5;
const MAX_NOTIFICATIONS: usize = 50;

/// Backends for the three list screens.
#[derive(Clone)]
pub struct Backends {
    pub leads: Arc<dyn CollectionApi<Lead>>,
    pub interactions: Arc<dyn CollectionApi<Interaction>>,
    pub comments: Arc<dyn CollectionApi<Comment>>,
}

impl Backends {
    pub fn rest(client: &RestClient) -> Self {
        Self {
            leads: Arc::new(RestCollection::<Lead>::new(client.clone())),
            interactions: Arc::new(RestCollection::<Interaction>::new(client.clone())),
            comments: Arc::new(RestCollection::<Comment>::new(client.clone())),
        }
    }
}

/// Parent record a child screen is restricted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub filter: &'static str,
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct SearchInput {
    pub buffer: String,
}

pub struct App {
    pub config: TuiConfig,
    pub theme: SynthBruteTheme,
    pub active_screen: Screen,
    pub leads: ListSession<Lead, DealPartition, TuiEvent>,
    pub interactions: ListSession<Interaction, SinglePartition, TuiEvent>,
    pub comments: ListSession<Comment, SinglePartition, TuiEvent>,
    pub interaction_scope: Option<Scope>,
    pub comment_scope: Option<Scope>,
    pub notifications: Vec<Notification>,
    pub search: Option<SearchInput>,
    pub help_visible: bool,
    base: ControllerConfig,
}

impl App {
    pub fn new(
        config: TuiConfig,
        backends: Backends,
        sender: mpsc::Sender<TuiEvent>,
    ) -> Result<Self, ConfigError> {
        let base = config.controller_config()?;
        Ok(Self {
            leads: ListSession::new(
                screen_config::<Lead>(&base, None),
                backends.leads,
                sender.clone(),
                TuiEvent::Leads,
            ),
            interactions: ListSession::new(
                screen_config::<Interaction>(&base, None),
                backends.interactions,
                sender.clone(),
                TuiEvent::Interactions,
            ),
            comments: ListSession::new(
                screen_config::<Comment>(&base, None),
                backends.comments,
                sender,
                TuiEvent::Comments,
            ),
            config,
            theme: SynthBruteTheme::synthbrute(),
            active_screen: Screen::Leads,
            interaction_scope: None,
            comment_scope: None,
            notifications: Vec::new(),
            search: None,
            help_visible: false,
            base,
        })
    }

    /// Issue the initial fetches of every screen.
    pub fn start(&mut self) {
        self.leads.start();
        self.interactions.start();
        self.comments.start();
    }

    /// Returns `true` when the application should quit.
    pub fn handle_event(&mut self, event: TuiEvent) -> bool {
        match event {
            TuiEvent::Input(key) => return self.handle_key(key),
            TuiEvent::Tick => self.on_tick(),
            TuiEvent::Resize { .. } => {}
            TuiEvent::Leads(outcome) => self.leads.apply(outcome),
            TuiEvent::Interactions(outcome) => self.interactions.apply(outcome),
            TuiEvent::Comments(outcome) => self.comments.apply(outcome),
        }
        self.collect_events();
        false
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.search.is_some() {
            self.handle_search_key(key);
            return false;
        }
        let Some(action) = map_key(key) else {
            return false;
        };
        if self.help_visible {
            match action {
                Action::Quit => return true,
                Action::OpenHelp | Action::Cancel | Action::Confirm => self.help_visible = false,
                _ => {}
            }
            return false;
        }
        if self.active().has_pending_delete() {
            match action {
                Action::Quit => return true,
                Action::Confirm => self.active_mut().confirm_delete(),
                Action::Cancel => self.active_mut().cancel_delete(),
                _ => {}
            }
            return false;
        }
        self.handle_action(action)
    }

    pub fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return true,
            Action::NextScreen => self.active_screen = self.active_screen.next(),
            Action::PrevScreen => self.active_screen = self.active_screen.previous(),
            Action::SwitchScreen(index) => {
                if let Some(screen) = Screen::from_index(index) {
                    self.active_screen = screen;
                }
            }
            Action::MoveDown => self.active_mut().select_next(),
            Action::MoveUp => self.active_mut().select_previous(),
            Action::NextPage => self.active_mut().page(PageDirection::Next),
            Action::PrevPage => self.active_mut().page(PageDirection::Previous),
            Action::NextPartition => self.active_mut().shift_partition(true),
            Action::PrevPartition => self.active_mut().shift_partition(false),
            Action::OpenSearch => {
                let buffer = self.active().search_text().to_string();
                self.search = Some(SearchInput { buffer });
            }
            Action::NextSortColumn => self.active_mut().next_sort_column(),
            Action::CycleSort => self.active_mut().cycle_sort(),
            Action::ToggleUnassigned => self.active_mut().toggle_unassigned(),
            Action::CyclePageSize => self.active_mut().cycle_page_size(),
            Action::DeleteItem => self.active_mut().request_delete_selected(),
            Action::OpenChildren => self.open_children(),
            Action::ClearScope => self.clear_scope(),
            Action::OpenHelp => self.help_visible = true,
            Action::Refresh => {
                self.dismiss_retry();
                self.active_mut().refresh();
            }
            Action::Cancel => {
                self.notifications.pop();
            }
            Action::Confirm => {}
        }
        false
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return;
        }
        match key.code {
            KeyCode::Esc => self.search = None,
            KeyCode::Enter => {
                if let Some(input) = self.search.take() {
                    self.active_mut().search(input.buffer);
                }
            }
            KeyCode::Backspace => {
                if let Some(input) = self.search.as_mut() {
                    input.buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(input) = self.search.as_mut() {
                    input.buffer.push(c);
                }
            }
            _ => {}
        }
    }

    pub fn on_tick(&mut self) {
        let cutoff = Utc::now() - Duration::seconds(NOTIFICATION_TTL_SECS);
        self.notifications.retain(|note| {
            note.action.is_some()
                || note.level == NotificationLevel::Error
                || note.created_at > cutoff
        });
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.push_notification(Notification::new(level, message));
    }

    fn push_notification(&mut self, notification: Notification) {
        self.notifications.push(notification);
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    /// A refresh answers the retry prompts of the screen it reloads.
    fn dismiss_retry(&mut self) {
        let screen = self.active_screen;
        self.notifications.retain(|note| {
            note.action != Some(NotificationAction::Retry) || note.screen != Some(screen)
        });
    }

    pub fn active(&self) -> &dyn ListControls {
        match self.active_screen {
            Screen::Leads => &self.leads,
            Screen::Interactions => &self.interactions,
            Screen::Comments => &self.comments,
        }
    }

    pub fn active_mut(&mut self) -> &mut dyn ListControls {
        match self.active_screen {
            Screen::Leads => &mut self.leads,
            Screen::Interactions => &mut self.interactions,
            Screen::Comments => &mut self.comments,
        }
    }

    /// Scope of the active screen, if it is restricted to one parent.
    pub fn active_scope(&self) -> Option<&Scope> {
        match self.active_screen {
            Screen::Leads => None,
            Screen::Interactions => self.interaction_scope.as_ref(),
            Screen::Comments => self.comment_scope.as_ref(),
        }
    }

    /// Show the children of the selected record on the next screen.
    pub fn open_children(&mut self) {
        match self.active_screen {
            Screen::Leads => {
                let Some(lead) = self.leads.selected_record() else {
                    self.notify(NotificationLevel::Warning, "No lead selected");
                    return;
                };
                let scope = Scope {
                    filter: "lead_id",
                    value: lead.lead_id.to_string(),
                    label: lead.title,
                };
                self.interactions
                    .reset(screen_config::<Interaction>(&self.base, Some(&scope)));
                self.interaction_scope = Some(scope);
                self.active_screen = Screen::Interactions;
            }
            Screen::Interactions => {
                let Some(interaction) = self.interactions.selected_record() else {
                    self.notify(NotificationLevel::Warning, "No interaction selected");
                    return;
                };
                let scope = Scope {
                    filter: "interaction_id",
                    value: interaction.interaction_id.to_string(),
                    label: interaction.subject,
                };
                self.comments
                    .reset(screen_config::<Comment>(&self.base, Some(&scope)));
                self.comment_scope = Some(scope);
                self.active_screen = Screen::Comments;
            }
            Screen::Comments => {
                self.notify(NotificationLevel::Info, "Comments have no children");
            }
        }
    }

    /// Drop the parent restriction of the active screen.
    pub fn clear_scope(&mut self) {
        match self.active_screen {
            Screen::Leads => {}
            Screen::Interactions => {
                if self.interaction_scope.take().is_some() {
                    self.interactions
                        .reset(screen_config::<Interaction>(&self.base, None));
                }
            }
            Screen::Comments => {
                if self.comment_scope.take().is_some() {
                    self.comments
                        .reset(screen_config::<Comment>(&self.base, None));
                }
            }
        }
    }

    fn collect_events(&mut self) {
        let mut notes = Vec::new();
        notes.extend(describe_events(Screen::Leads, self.leads.drain_events()));
        notes.extend(describe_events(Screen::Interactions, self.interactions.drain_events()));
        notes.extend(describe_events(Screen::Comments, self.comments.drain_events()));
        for note in notes {
            self.push_notification(note);
        }
    }
}

fn screen_config<R: TableRow>(base: &ControllerConfig, scope: Option<&Scope>) -> ControllerConfig {
    let config = base.clone().with_sort_keys(R::sort_keys());
    match scope {
        Some(scope) => config.with_extra_filter(scope.filter, scope.value.clone()),
        None => config,
    }
}

fn describe_events<Id: fmt::Display, P: PartitionKey>(
    screen: Screen,
    events: Vec<ControllerEvent<Id, P>>,
) -> Vec<Notification> {
    let noun = screen.title().to_lowercase();
    let noun = noun.as_str();
    events
        .into_iter()
        .map(|event| match event {
            ControllerEvent::FetchFailed { partition, error } => {
                tracing::warn!(noun, ?partition, %error, "fetch failed");
                let message = if P::all().len() > 1 {
                    format!("Loading {} {} failed: {}", partition.title().to_lowercase(), noun, error)
                } else {
                    format!("Loading {} failed: {}", noun, error)
                };
                Notification::new(NotificationLevel::Error, message)
                    .with_action(NotificationAction::Retry)
            }
            ControllerEvent::DeleteFailed { id, error } => {
                tracing::warn!(noun, %id, %error, "delete failed");
                Notification::new(NotificationLevel::Error, format!("Delete failed: {}", error))
                    .with_action(NotificationAction::Dismiss)
            }
            ControllerEvent::Deleted { id } => {
                tracing::info!(noun, %id, "record deleted");
                Notification::new(NotificationLevel::Success, format!("Deleted {}", id))
            }
        })
        .map(|note| note.with_screen(screen))
        .collect()
}

/// Title of the record awaiting delete confirmation, if any.
pub fn pending_delete_label(app: &App) -> Option<String> {
    fn label<R: TableRow, P: PartitionKey, M: Send + 'static>(
        session: &ListSession<R, P, M>,
    ) -> Option<String> {
        let pending = session.controller().state().pending_delete()?;
        let records = session.controller().visible_records(session.active_partition());
        let title = records
            .iter()
            .find(|record| record.id() == pending.id)
            .and_then(|record| record.cells().into_iter().next())
            .unwrap_or_else(|| pending.id.to_string());
        Some(title)
    }
    match app.active_screen {
        Screen::Leads => label(&app.leads),
        Screen::Interactions => label(&app.interactions),
        Screen::Comments => label(&app.comments),
    }
}

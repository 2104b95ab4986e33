// Application state for the TUI
//
// App owns every piece of UI state: toasts, modals, forms, filters, the
// participants page and the bulk job counters. It never performs I/O itself.
// Input, ticks and backend results go in; `Command`s for the runtime come
// out. That keeps every state change on the single UI task.

use crate::api::models::Pagination;
use crate::api::{EventSummary, Participant, RegistrationRequest, Statistics, WinnerOutcome};
use crate::bulk::{self, BulkTracker};
use crate::certificate::{CertificateData, CertificateView};
use crate::config::{Config, Mode};
use crate::error::{ErrorClass, UiError};
use crate::events::{AppEvent, Command};
use crate::filters::{FilterState, SearchDebounce};
use crate::logging::LogBuffer;
use crate::session::{self, RefreshStamp, SessionMonitor};
use crate::tui::components::toast::{ToastKind, ToastStack, DEFAULT_DURATION};
use crate::tui::modal::{key_action, ModalAction, ModalController, ModalKind};
use crate::tui::theme::{Theme, ThemeKind};
use crate::validation::{event_form, registration_form, Form};
use chrono::{Local, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

/// Delay between a successful registration and the certificate popping up
pub const CERTIFICATE_DELAY: Duration = Duration::from_secs(1);

const SHORT_TOAST: Duration = Duration::from_millis(2000);

const REGISTRATION_FAILED: &str =
    "Registration failed. Please check your connection and try again.";
const CERTIFICATE_FAILED: &str = "Failed to generate certificate. Please try again.";

/// Top-level screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Public event list and registration
    Register,
    /// Admin participants table, filters and statistics
    Dashboard,
    /// Admin event list and add-event form
    EventSettings,
    /// Shown after the admin session expired
    SignedOut,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Register => "Register",
            View::Dashboard => "Dashboard",
            View::EventSettings => "Event Settings",
            View::SignedOut => "Signed Out",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, View::Dashboard | View::EventSettings)
    }
}

/// Action waiting on the confirmation modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    SelectWinner(u64),
    BulkSelect(Vec<u64>),
    RevokeWinner(u64),
    DeleteParticipant(u64),
    DeleteEvent(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub title: String,
    pub message: String,
    pub warning: Option<String>,
    pub action: PendingAction,
}

/// In-flight operations; each blocks a second submit of the same kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Busy {
    pub registering: bool,
    pub saving_event: bool,
    pub loading_certificate: bool,
    pub downloading: bool,
    pub exporting: bool,
}

/// Client-side sort of the current participants page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    None,
    Name,
    Email,
    College,
    Event,
    Date,
}

impl SortColumn {
    fn next(self) -> Self {
        match self {
            SortColumn::None => SortColumn::Name,
            SortColumn::Name => SortColumn::Email,
            SortColumn::Email => SortColumn::College,
            SortColumn::College => SortColumn::Event,
            SortColumn::Event => SortColumn::Date,
            SortColumn::Date => SortColumn::None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::None => "none",
            SortColumn::Name => "name",
            SortColumn::Email => "email",
            SortColumn::College => "college",
            SortColumn::Event => "event",
            SortColumn::Date => "date",
        }
    }

    fn key(&self, p: &Participant) -> String {
        match self {
            SortColumn::None => String::new(),
            SortColumn::Name => p.name.to_lowercase(),
            SortColumn::Email => p.email.to_lowercase(),
            SortColumn::College => p.college.to_lowercase(),
            SortColumn::Event => p.event.to_lowercase(),
            SortColumn::Date => p.registration_date_text(),
        }
    }
}

/// Certificate currently shown in the modal
#[derive(Debug, Clone)]
pub struct OpenCertificate {
    pub data: CertificateData,
    pub view: CertificateView,
}

/// Main application state
pub struct App {
    pub mode: Mode,
    pub view: View,
    pub should_quit: bool,

    pub theme_kind: ThemeKind,
    pub theme: Theme,

    pub toasts: ToastStack,
    pub modals: ModalController,
    pub registration: Form,
    pub event_form: Form,
    /// Event being edited in the event form, None when adding
    pub editing_event: Option<u64>,
    pub confirmation: Option<Confirmation>,
    pub certificate: Option<OpenCertificate>,
    pub busy: Busy,

    pub events: Vec<EventSummary>,
    /// Cursor in the public event list and the event settings list
    pub event_cursor: usize,

    pub participants: Vec<Participant>,
    pub pagination: Pagination,
    pub page: u32,
    /// Cursor in the participants table
    pub cursor: usize,
    /// Checked participant ids in the order they were checked
    pub selection: Vec<u64>,
    pub sort: SortColumn,
    pub sort_ascending: bool,
    pub statistics: Option<Statistics>,

    pub filters: FilterState,
    /// Search text as typed, applied through the debounce
    pub search_input: String,
    pub search_editing: bool,
    search_debounce: SearchDebounce,

    pub bulk: BulkTracker,
    pub session: SessionMonitor,
    refresh_stamp: RefreshStamp,

    pub log_buffer: LogBuffer,
    pub show_logs: bool,
}

impl App {
    pub fn new(config: &Config, log_buffer: LogBuffer, now: Instant) -> Self {
        let theme_kind = ThemeKind::from_name(&config.theme);
        let view = match config.mode {
            Mode::Public => View::Register,
            Mode::Admin => View::Dashboard,
        };
        Self {
            mode: config.mode,
            view,
            should_quit: false,
            theme_kind,
            theme: theme_kind.theme(),
            toasts: ToastStack::new(),
            modals: ModalController::new(),
            registration: registration_form(&[]),
            event_form: event_form(),
            editing_event: None,
            confirmation: None,
            certificate: None,
            busy: Busy::default(),
            events: Vec::new(),
            event_cursor: 0,
            participants: Vec::new(),
            pagination: Pagination::default(),
            page: 1,
            cursor: 0,
            selection: Vec::new(),
            sort: SortColumn::None,
            sort_ascending: true,
            statistics: None,
            filters: FilterState::default(),
            search_input: String::new(),
            search_editing: false,
            search_debounce: SearchDebounce::default(),
            bulk: BulkTracker::default(),
            session: SessionMonitor::new(now),
            refresh_stamp: RefreshStamp::new(config.state_file()),
            log_buffer,
            show_logs: false,
        }
    }

    /// Initial loads for the starting view
    pub fn startup(&mut self, now: Instant) -> Vec<Command> {
        match self.mode {
            Mode::Public => vec![Command::LoadEvents],
            Mode::Admin => {
                let mut commands = vec![Command::CheckSession, Command::LoadEvents];
                commands.extend(self.reload_dashboard(now));
                commands
            }
        }
    }

    pub fn event_names(&self) -> Vec<String> {
        self.events.iter().map(|e| e.event_name.clone()).collect()
    }

    /// Participants in display order (client-side sort applied)
    pub fn sorted_participants(&self) -> Vec<&Participant> {
        let mut rows: Vec<&Participant> = self.participants.iter().collect();
        if self.sort != SortColumn::None {
            rows.sort_by_cached_key(|p| self.sort.key(p));
            if !self.sort_ascending {
                rows.reverse();
            }
        }
        rows
    }

    pub fn is_selected(&self, id: u64) -> bool {
        self.selection.contains(&id)
    }

    fn participant_at_cursor(&self) -> Option<Participant> {
        self.sorted_participants()
            .get(self.cursor)
            .map(|p| (*p).clone())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Toasts and errors
    // ─────────────────────────────────────────────────────────────────────

    pub fn notify(&mut self, message: impl Into<String>, kind: ToastKind, now: Instant) {
        self.toasts.show_at(message, kind, DEFAULT_DURATION, now);
    }

    pub fn notify_for(
        &mut self,
        message: impl Into<String>,
        kind: ToastKind,
        duration: Duration,
        now: Instant,
    ) {
        self.toasts.show_at(message, kind, duration, now);
    }

    /// Surface a failure according to its class. Unauthorized answers on
    /// admin screens start the signed-out redirect instead of a plain toast.
    fn report(&mut self, error: &UiError, fallback: &str, now: Instant) {
        match error.class() {
            ErrorClass::Unauthorized if self.mode == Mode::Admin => {
                tracing::warn!(error = %error, "{}", fallback);
                if self.session.expire(now) {
                    self.notify(session::EXPIRED_MESSAGE, ToastKind::Warning, now);
                }
            }
            ErrorClass::Validation => {
                tracing::debug!(error = %error, "{}", fallback);
                self.notify(error.user_message(), ToastKind::Error, now);
            }
            ErrorClass::Network | ErrorClass::Unauthorized | ErrorClass::Render => {
                tracing::error!(error = %error, "{}", fallback);
                let message = match error {
                    UiError::Backend(msg) => msg.clone(),
                    _ => format!("{}: {}", fallback, error.user_message()),
                };
                self.notify(message, ToastKind::Error, now);
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Admin data loads
    // ─────────────────────────────────────────────────────────────────────

    fn reload_participants(&self) -> Command {
        Command::LoadParticipants {
            page: self.page,
            filters: self.filters.clone(),
        }
    }

    /// Participants, statistics and the persisted refresh stamp
    fn reload_dashboard(&mut self, now: Instant) -> Vec<Command> {
        self.session.refreshed(now);
        vec![
            self.reload_participants(),
            Command::LoadStatistics,
            Command::SaveRefreshStamp(Utc::now().timestamp_millis()),
        ]
    }

    /// Filters changed: back to the first page
    fn apply_filters(&mut self) -> Vec<Command> {
        self.page = 1;
        self.cursor = 0;
        tracing::debug!(filters = %self.filters.describe(), "filters applied");
        vec![self.reload_participants()]
    }

    fn clear_filters(&mut self, now: Instant) -> Vec<Command> {
        self.filters.clear();
        self.search_input.clear();
        self.search_editing = false;
        self.search_debounce.cancel();
        self.notify_for("Filters cleared", ToastKind::Info, SHORT_TOAST, now);
        self.apply_filters()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Timers and focus
    // ─────────────────────────────────────────────────────────────────────

    /// Advance timers: toast expiry, modal transitions, search debounce,
    /// session checks and the signed-out redirect.
    pub fn tick(&mut self, now: Instant) -> Vec<Command> {
        let mut commands = Vec::new();
        self.toasts.prune_expired(now);

        for kind in self.modals.tick(now) {
            self.on_modal_closed(kind);
        }

        if let Some(search) = self.search_debounce.poll(now) {
            if search != self.filters.search {
                self.filters.search = search;
                commands.extend(self.apply_filters());
            }
        }

        if self.view.is_admin() {
            let due = self.session.poll(now);
            if due.check {
                commands.push(Command::CheckSession);
            }
            if due.refresh {
                tracing::debug!("auto-refresh");
                commands.extend(self.reload_dashboard(now));
            }
        }

        if self.session.redirect_due(now) {
            tracing::info!("redirecting to signed-out screen");
            self.modals.close_all(now);
            self.view = View::SignedOut;
        }

        commands
    }

    /// Terminal focus stands in for page visibility
    pub fn focus_changed(&mut self, focused: bool, now: Instant) -> Vec<Command> {
        let regained = focused && !self.session.is_focused();
        self.session.set_focus(focused, now);
        if regained && self.view.is_admin() && self.refresh_stamp.is_stale(Utc::now()) {
            tracing::debug!("focus regained with stale data");
            return self.reload_dashboard(now);
        }
        Vec::new()
    }

    /// Reset state tied to a modal once its close transition finished
    fn on_modal_closed(&mut self, kind: ModalKind) {
        match kind {
            ModalKind::Registration => self.registration.reset(),
            ModalKind::EventForm => {
                self.event_form.reset();
                self.editing_event = None;
            }
            ModalKind::Certificate => self.certificate = None,
            ModalKind::Confirmation => self.confirmation = None,
            ModalKind::Help => {}
        }
    }

    fn form_mut(&mut self, kind: ModalKind) -> Option<&mut Form> {
        match kind {
            ModalKind::Registration => Some(&mut self.registration),
            ModalKind::EventForm => Some(&mut self.event_form),
            _ => None,
        }
    }

    fn open_modal(&mut self, kind: ModalKind, now: Instant) {
        if self.modals.open(kind, now) {
            // A form modal starts on its first input
            if let Some(form) = self.form_mut(kind) {
                form.focus = 0;
            }
        }
    }

    fn ask(&mut self, confirmation: Confirmation, now: Instant) {
        self.confirmation = Some(confirmation);
        self.open_modal(ModalKind::Confirmation, now);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mouse
    // ─────────────────────────────────────────────────────────────────────

    /// Left click: outside the top modal closes it
    pub fn click(&mut self, column: u16, row: u16, now: Instant) {
        if let Some(kind) = self.modals.click(column, row, now) {
            tracing::debug!(?kind, "backdrop click");
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Keyboard
    // ─────────────────────────────────────────────────────────────────────

    /// Layered dispatch: Escape → Modal → Search input → Global → View
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Vec<Command> {
        if key.kind != KeyEventKind::Press {
            return Vec::new();
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Vec::new();
        }

        if key.code == KeyCode::Esc {
            if self.search_editing {
                self.search_editing = false;
            } else {
                let closed = self.modals.close_all(now);
                tracing::debug!(closed, "escape");
            }
            return Vec::new();
        }

        if let Some(kind) = self.modals.top() {
            return self.handle_modal_key(kind, &key, now);
        }

        if self.search_editing {
            self.handle_search_key(&key, now);
            return Vec::new();
        }

        if ctrl {
            return self.handle_shortcut(key.code, now);
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return Vec::new();
            }
            KeyCode::Char('?') => {
                self.open_modal(ModalKind::Help, now);
                return Vec::new();
            }
            KeyCode::Char('x') => {
                self.toasts.dismiss_newest();
                return Vec::new();
            }
            KeyCode::Char('L') => {
                self.show_logs = !self.show_logs;
                return Vec::new();
            }
            KeyCode::Char('t') => {
                self.theme_kind = self.theme_kind.next();
                self.theme = self.theme_kind.theme();
                self.notify_for(
                    format!("Theme: {}", self.theme_kind.name()),
                    ToastKind::Info,
                    SHORT_TOAST,
                    now,
                );
                return Vec::new();
            }
            KeyCode::Tab if self.view.is_admin() => {
                self.view = match self.view {
                    View::Dashboard => View::EventSettings,
                    _ => View::Dashboard,
                };
                self.event_cursor = 0;
                return Vec::new();
            }
            _ => {}
        }

        match self.view {
            View::Register => self.handle_register_key(key.code, now),
            View::Dashboard => self.handle_dashboard_key(key.code, now),
            View::EventSettings => self.handle_settings_key(key.code, now),
            View::SignedOut => Vec::new(),
        }
    }

    /// Ctrl shortcuts, each only on the views that have the handler
    fn handle_shortcut(&mut self, code: KeyCode, now: Instant) -> Vec<Command> {
        match (code, self.view) {
            (KeyCode::Char('r'), View::Dashboard) => {
                let commands = self.reload_dashboard(now);
                self.notify_for("Dashboard refreshed", ToastKind::Success, SHORT_TOAST, now);
                commands
            }
            (KeyCode::Char('r'), View::EventSettings) => vec![Command::LoadEvents],
            (KeyCode::Char('e'), View::Dashboard) => {
                self.start_export(crate::api::ExportFormat::Csv, now)
            }
            (KeyCode::Char('n'), View::EventSettings) => {
                self.editing_event = None;
                self.open_modal(ModalKind::EventForm, now);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn handle_search_key(&mut self, key: &KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Enter => self.search_editing = false,
            KeyCode::Backspace => {
                self.search_input.pop();
                self.search_debounce.input(self.search_input.clone(), now);
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.search_debounce.input(self.search_input.clone(), now);
            }
            _ => {}
        }
    }

    fn handle_register_key(&mut self, code: KeyCode, now: Instant) -> Vec<Command> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.event_cursor = self.event_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.event_cursor + 1 < self.events.len() {
                    self.event_cursor += 1;
                }
            }
            KeyCode::Enter => {
                let name = self.events.get(self.event_cursor).map(|e| e.event_name.clone());
                self.open_registration(name.as_deref(), now);
            }
            KeyCode::Char('r') => self.open_registration(None, now),
            _ => {}
        }
        Vec::new()
    }

    /// Open the registration modal, optionally with the event preselected
    pub fn open_registration(&mut self, event: Option<&str>, now: Instant) {
        if let (Some(name), Some(field)) = (event, self.registration.field_mut("event")) {
            field.select(name);
        }
        self.open_modal(ModalKind::Registration, now);
    }

    fn handle_settings_key(&mut self, code: KeyCode, now: Instant) -> Vec<Command> {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.event_cursor = self.event_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.event_cursor + 1 < self.events.len() {
                    self.event_cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => self.edit_event(now),
            KeyCode::Char('D') => {
                if let Some((id, event)) = self.event_at_cursor(now) {
                    self.ask(
                        Confirmation {
                            title: "Delete Event".to_string(),
                            message: format!(
                                "Are you sure you want to delete {}?",
                                event.event_name
                            ),
                            warning: Some(
                                "Events that still have registrations cannot be deleted."
                                    .to_string(),
                            ),
                            action: PendingAction::DeleteEvent(id),
                        },
                        now,
                    );
                }
            }
            _ => {}
        }
        Vec::new()
    }

    /// Event under the cursor, if the backend gave it an id
    fn event_at_cursor(&mut self, now: Instant) -> Option<(u64, EventSummary)> {
        let event = self.events.get(self.event_cursor)?.clone();
        match event.id {
            Some(id) => Some((id, event)),
            None => {
                self.notify(
                    format!("{} cannot be changed from here", event.event_name),
                    ToastKind::Warning,
                    now,
                );
                None
            }
        }
    }

    /// Open the event form prefilled with the selected event
    fn edit_event(&mut self, now: Instant) {
        let Some((id, event)) = self.event_at_cursor(now) else {
            return;
        };
        self.event_form.reset();
        if let Some(field) = self.event_form.field_mut("event_name") {
            field.value = event.event_name.clone();
        }
        if let Some(field) = self.event_form.field_mut("description") {
            field.value = event.description.clone().unwrap_or_default();
        }
        self.editing_event = Some(id);
        self.open_modal(ModalKind::EventForm, now);
    }

    fn handle_dashboard_key(&mut self, code: KeyCode, now: Instant) -> Vec<Command> {
        let rows = self.participants.len();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.cursor + 1 < rows {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(p) = self.participant_at_cursor() {
                    self.toggle_selection(p.id);
                }
            }
            KeyCode::Char('a') => self.toggle_page_selection(),
            KeyCode::Char('w') => {
                if let Some(p) = self.participant_at_cursor() {
                    if p.winner_status {
                        self.notify(
                            format!("{} is already a winner", p.name),
                            ToastKind::Info,
                            now,
                        );
                    } else {
                        self.ask(
                            Confirmation {
                                title: "Select Winner".to_string(),
                                message: format!(
                                    "Are you sure you want to mark {} as a winner?",
                                    p.name
                                ),
                                warning: Some(
                                    "This action will generate a winner certificate.".to_string(),
                                ),
                                action: PendingAction::SelectWinner(p.id),
                            },
                            now,
                        );
                    }
                }
            }
            KeyCode::Char('u') => {
                if let Some(p) = self.participant_at_cursor() {
                    if p.winner_status {
                        self.ask(
                            Confirmation {
                                title: "Revoke Winner".to_string(),
                                message: format!(
                                    "Are you sure you want to revoke winner status for {}?",
                                    p.name
                                ),
                                warning: None,
                                action: PendingAction::RevokeWinner(p.id),
                            },
                            now,
                        );
                    } else {
                        self.notify(format!("{} is not a winner", p.name), ToastKind::Info, now);
                    }
                }
            }
            KeyCode::Char('D') => {
                if let Some(p) = self.participant_at_cursor() {
                    self.ask(
                        Confirmation {
                            title: "Delete Participant".to_string(),
                            message: format!(
                                "Are you sure you want to delete the registration of {}?",
                                p.name
                            ),
                            warning: Some("This action cannot be undone.".to_string()),
                            action: PendingAction::DeleteParticipant(p.id),
                        },
                        now,
                    );
                }
            }
            KeyCode::Char('b') => self.request_bulk_selection(now),
            KeyCode::Char('v') => {
                if let Some(p) = self.participant_at_cursor() {
                    return self.view_certificate(&p, now);
                }
            }
            KeyCode::Char('e') => {
                let names = self.event_names();
                self.filters.cycle_event(&names, true);
                return self.apply_filters();
            }
            KeyCode::Char('E') => {
                let names = self.event_names();
                self.filters.cycle_event(&names, false);
                return self.apply_filters();
            }
            KeyCode::Char('s') => {
                self.filters.cycle_status(true);
                return self.apply_filters();
            }
            KeyCode::Char('S') => {
                self.filters.cycle_status(false);
                return self.apply_filters();
            }
            KeyCode::Char('/') => {
                self.search_editing = true;
            }
            KeyCode::Char('c') => return self.clear_filters(now),
            KeyCode::Char('o') => {
                self.sort = self.sort.next();
                self.cursor = 0;
            }
            KeyCode::Char('O') => {
                self.sort_ascending = !self.sort_ascending;
                self.cursor = 0;
            }
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('n') => {
                if self.pagination.has_next {
                    self.page += 1;
                    self.cursor = 0;
                    return vec![self.reload_participants()];
                }
            }
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('p') => {
                if self.page > 1 {
                    self.page -= 1;
                    self.cursor = 0;
                    return vec![self.reload_participants()];
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn toggle_selection(&mut self, id: u64) {
        if let Some(idx) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(idx);
        } else {
            self.selection.push(id);
        }
    }

    /// Select every row on the page, or clear them if all are selected
    fn toggle_page_selection(&mut self) {
        let ids: Vec<u64> = self.sorted_participants().iter().map(|p| p.id).collect();
        if !ids.is_empty() && ids.iter().all(|id| self.selection.contains(id)) {
            self.selection.retain(|id| !ids.contains(id));
        } else {
            for id in ids {
                if !self.selection.contains(&id) {
                    self.selection.push(id);
                }
            }
        }
    }

    /// Ask for confirmation, or warn when nothing is selected
    pub fn request_bulk_selection(&mut self, now: Instant) {
        let ids = bulk::dedupe(&self.selection);
        if ids.is_empty() {
            self.notify(bulk::EMPTY_SELECTION, ToastKind::Warning, now);
            return;
        }
        self.ask(
            Confirmation {
                title: "Bulk Select Winners".to_string(),
                message: format!(
                    "Are you sure you want to mark {} participant(s) as winners?",
                    ids.len()
                ),
                warning: Some(
                    "This action will generate winner certificates for all selected participants."
                        .to_string(),
                ),
                action: PendingAction::BulkSelect(ids),
            },
            now,
        );
    }

    /// Winners get their server-issued certificate; everyone else is shown
    /// a participation certificate built from the row
    fn view_certificate(&mut self, p: &Participant, now: Instant) -> Vec<Command> {
        if !p.winner_status {
            self.show_certificate(participant_certificate(p), now);
            return Vec::new();
        }
        if self.busy.loading_certificate {
            return Vec::new();
        }
        self.busy.loading_certificate = true;
        vec![Command::LoadWinnerCertificate(p.id)]
    }

    fn start_export(&mut self, format: crate::api::ExportFormat, now: Instant) -> Vec<Command> {
        if self.busy.exporting {
            return Vec::new();
        }
        self.busy.exporting = true;
        self.notify(
            format!("Preparing {} export...", format.as_str().to_uppercase()),
            ToastKind::Info,
            now,
        );
        vec![Command::Export {
            format,
            filters: self.filters.clone(),
        }]
    }

    /// Open the certificate modal. A missing id is generated once here so
    /// the preview and the downloaded file agree.
    pub fn show_certificate(&mut self, mut data: CertificateData, now: Instant) {
        let view = CertificateView::build(&data, Local::now());
        if data.certificate_id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            data.certificate_id = Some(view.certificate_id.clone());
        }
        self.certificate = Some(OpenCertificate { data, view });
        self.open_modal(ModalKind::Certificate, now);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Modal input
    // ─────────────────────────────────────────────────────────────────────

    fn handle_modal_key(&mut self, kind: ModalKind, key: &KeyEvent, now: Instant) -> Vec<Command> {
        let action = key_action(kind, key);
        if action == ModalAction::Close {
            self.modals.close(kind, now);
            return Vec::new();
        }
        match kind {
            ModalKind::Registration => {
                let form = &mut self.registration;
                if apply_form_action(form, action) {
                    return self.submit_registration(now);
                }
            }
            ModalKind::EventForm => {
                let form = &mut self.event_form;
                if apply_form_action(form, action) {
                    return self.submit_event(now);
                }
            }
            ModalKind::Certificate => match action {
                ModalAction::Download => return self.download_certificate(),
                ModalAction::CopyId => {
                    if let Some(cert) = &self.certificate {
                        return vec![Command::Copy(cert.view.certificate_id.clone())];
                    }
                }
                _ => {}
            },
            ModalKind::Confirmation => {
                if action == ModalAction::Confirm {
                    return self.confirm(now);
                }
            }
            ModalKind::Help => {}
        }
        Vec::new()
    }

    fn submit_registration(&mut self, now: Instant) -> Vec<Command> {
        if self.busy.registering {
            return Vec::new();
        }
        let verdict = self.registration.validate();
        if !verdict.valid {
            if let Some(message) = verdict.first_error {
                self.report(&UiError::Validation(message), "Registration form invalid", now);
            }
            return Vec::new();
        }
        self.busy.registering = true;
        let form = &self.registration;
        let request = RegistrationRequest {
            name: form.value("name"),
            email: form.value("email"),
            college: form.value("college"),
            event: form.value("event"),
        };
        tracing::info!(event = %request.event, "submitting registration");
        vec![Command::Register(request)]
    }

    fn submit_event(&mut self, now: Instant) -> Vec<Command> {
        if self.busy.saving_event {
            return Vec::new();
        }
        let verdict = self.event_form.validate();
        if !verdict.valid {
            if let Some(message) = verdict.first_error {
                self.report(&UiError::Validation(message), "Event form invalid", now);
            }
            return Vec::new();
        }
        self.busy.saving_event = true;
        let name = self.event_form.value("event_name");
        let description = self.event_form.value("description");
        match self.editing_event {
            Some(id) => vec![Command::UpdateEvent {
                id,
                name,
                description,
            }],
            None => vec![Command::AddEvent { name, description }],
        }
    }

    fn download_certificate(&mut self) -> Vec<Command> {
        if self.busy.downloading {
            return Vec::new();
        }
        let Some(cert) = &self.certificate else {
            return Vec::new();
        };
        self.busy.downloading = true;
        vec![Command::DownloadCertificate(cert.data.clone())]
    }

    fn confirm(&mut self, now: Instant) -> Vec<Command> {
        self.modals.close(ModalKind::Confirmation, now);
        let Some(confirmation) = self.confirmation.take() else {
            return Vec::new();
        };
        match confirmation.action {
            PendingAction::SelectWinner(id) => vec![Command::SelectWinner(id)],
            PendingAction::BulkSelect(ids) => match self.bulk.start(&ids) {
                Some((job, ids)) => {
                    self.selection.clear();
                    vec![Command::BulkSelect { job, ids }]
                }
                None => {
                    self.notify(bulk::EMPTY_SELECTION, ToastKind::Warning, now);
                    Vec::new()
                }
            },
            PendingAction::RevokeWinner(id) => vec![Command::RevokeWinner(id)],
            PendingAction::DeleteParticipant(id) => vec![Command::DeleteParticipant(id)],
            PendingAction::DeleteEvent(id) => vec![Command::DeleteEvent(id)],
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Backend results
    // ─────────────────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent, now: Instant) -> Vec<Command> {
        match event {
            AppEvent::EventsLoaded(Ok(events)) => {
                self.set_events(events);
            }
            AppEvent::EventsLoaded(Err(e)) => self.report(&e, "Failed to load events", now),

            AppEvent::Registered(result) => {
                self.busy.registering = false;
                return self.on_registered(result, now);
            }

            AppEvent::ParticipantsLoaded(Ok(page)) => {
                self.participants = page.participants;
                self.pagination = page.pagination;
                if self.cursor >= self.participants.len() {
                    self.cursor = self.participants.len().saturating_sub(1);
                }
            }
            AppEvent::ParticipantsLoaded(Err(e)) => {
                self.report(&e, "Failed to load participants", now)
            }

            AppEvent::StatisticsLoaded(Ok(stats)) => self.statistics = Some(stats),
            AppEvent::StatisticsLoaded(Err(e)) => {
                self.report(&e, "Failed to load statistics", now)
            }

            AppEvent::SessionChecked(Ok(())) => tracing::debug!("session valid"),
            AppEvent::SessionChecked(Err(e)) => {
                if session::is_unauthorized(&e) {
                    self.report(&e, "Session check failed", now);
                } else {
                    tracing::warn!(error = %e, "session check failed");
                }
            }

            AppEvent::WinnerSelected { id, result } => match result {
                Ok(outcome) => {
                    tracing::info!(id, "winner selected");
                    self.on_winner_certificate(outcome, now);
                    return vec![self.reload_participants(), Command::LoadStatistics];
                }
                Err(e) => self.report(&e, "Failed to select winner", now),
            },

            AppEvent::WinnerRevoked { id, result } => match result {
                Ok(message) => {
                    tracing::info!(id, "winner revoked");
                    self.notify(
                        non_empty(message, "Winner status revoked successfully"),
                        ToastKind::Success,
                        now,
                    );
                    return vec![self.reload_participants(), Command::LoadStatistics];
                }
                Err(e) => self.report(&e, "Failed to revoke winner", now),
            },

            AppEvent::WinnerCertificateLoaded(result) => {
                self.busy.loading_certificate = false;
                match result {
                    Ok(outcome) => self.on_winner_certificate(outcome, now),
                    Err(e) => self.report(&e, "Failed to load certificate", now),
                }
            }

            AppEvent::ParticipantDeleted { id, result } => match result {
                Ok(message) => {
                    tracing::info!(id, "participant deleted");
                    self.selection.retain(|s| *s != id);
                    self.notify(
                        non_empty(message, "Participant deleted successfully"),
                        ToastKind::Success,
                        now,
                    );
                    return vec![self.reload_participants(), Command::LoadStatistics];
                }
                Err(e) => self.report(&e, "Failed to delete participant", now),
            },

            AppEvent::Bulk(resolution) => {
                if let Err(e) = &resolution.outcome {
                    if session::is_unauthorized(e) {
                        self.report(e, "Bulk selection failed", now);
                    }
                }
                let Some(update) = self.bulk.resolve(&resolution) else {
                    return Vec::new();
                };
                self.notify_for(
                    update.progress_message(),
                    ToastKind::Info,
                    bulk::PROGRESS_TOAST,
                    now,
                );
                if let Some(summary) = update.summary {
                    self.notify(summary.message(), summary.kind(), now);
                    return vec![self.reload_participants(), Command::LoadStatistics];
                }
            }

            AppEvent::EventAdded(result) => {
                self.busy.saving_event = false;
                match result {
                    Ok(message) => {
                        self.notify(
                            non_empty(message, "Event added successfully"),
                            ToastKind::Success,
                            now,
                        );
                        self.modals.close(ModalKind::EventForm, now);
                        return vec![Command::LoadEvents];
                    }
                    Err(e) => self.report(&e, "Failed to add event", now),
                }
            }

            AppEvent::EventUpdated(result) => {
                self.busy.saving_event = false;
                match result {
                    Ok(message) => {
                        self.notify(
                            non_empty(message, "Event updated successfully"),
                            ToastKind::Success,
                            now,
                        );
                        self.modals.close(ModalKind::EventForm, now);
                        return vec![Command::LoadEvents];
                    }
                    Err(e) => self.report(&e, "Failed to update event", now),
                }
            }

            AppEvent::EventDeleted { id, result } => match result {
                Ok(message) => {
                    tracing::info!(id, "event deleted");
                    self.notify(
                        non_empty(message, "Event deleted successfully"),
                        ToastKind::Success,
                        now,
                    );
                    return vec![Command::LoadEvents];
                }
                Err(e) => self.report(&e, "Failed to delete event", now),
            },

            AppEvent::Exported(result) => {
                self.busy.exporting = false;
                match result {
                    Ok(path) => self.notify(
                        format!("Export saved to {}", path.display()),
                        ToastKind::Success,
                        now,
                    ),
                    Err(e) => self.report(&e, "Export failed", now),
                }
            }

            AppEvent::CertificateSaved(result) => {
                self.busy.downloading = false;
                match result {
                    Ok(path) => {
                        tracing::info!(path = %path.display(), "certificate downloaded");
                        self.notify(
                            "Certificate downloaded successfully!",
                            ToastKind::Success,
                            now,
                        );
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "certificate generation failed");
                        self.notify(CERTIFICATE_FAILED, ToastKind::Error, now);
                    }
                }
            }

            AppEvent::ShowCertificate(data) => self.show_certificate(data, now),

            AppEvent::Copied(Ok(())) => {
                self.notify("Certificate ID copied to clipboard", ToastKind::Success, now)
            }
            AppEvent::Copied(Err(e)) => {
                tracing::warn!(error = %e, "clipboard copy failed");
                self.notify("Failed to copy to clipboard", ToastKind::Error, now);
            }
        }
        Vec::new()
    }

    /// Announce a winner certificate from the backend and open it
    fn on_winner_certificate(&mut self, outcome: WinnerOutcome, now: Instant) {
        if !outcome.message.is_empty() {
            self.notify(outcome.message, ToastKind::Success, now);
        }
        match outcome.certificate {
            Some(data) => self.show_certificate(data, now),
            None => tracing::warn!("winner response without certificate data"),
        }
    }

    fn set_events(&mut self, events: Vec<EventSummary>) {
        self.events = events;
        let names = self.event_names();
        if let Some(field) = self.registration.field_mut("event") {
            field.choices = names.clone();
            if !field.value.is_empty() && !names.contains(&field.value) {
                field.value.clear();
            }
        }
        self.filters.retain_event(&names);
        if self.event_cursor >= self.events.len() {
            self.event_cursor = self.events.len().saturating_sub(1);
        }
    }

    fn on_registered(
        &mut self,
        result: Result<crate::api::RegistrationOutcome, UiError>,
        now: Instant,
    ) -> Vec<Command> {
        match result {
            Ok(outcome) => {
                tracing::info!(id = ?outcome.registration_id, "registration accepted");
                let message = if outcome.message.is_empty() {
                    "Registration successful!".to_string()
                } else {
                    outcome.message
                };
                self.notify(message, ToastKind::Success, now);
                self.modals.close(ModalKind::Registration, now);
                match outcome.certificate {
                    Some(data) => vec![Command::ShowCertificateAfter {
                        delay: CERTIFICATE_DELAY,
                        data,
                    }],
                    None => Vec::new(),
                }
            }
            Err(UiError::Backend(message)) => {
                tracing::warn!(%message, "registration rejected");
                self.notify(message, ToastKind::Error, now);
                Vec::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "registration failed");
                self.notify(REGISTRATION_FAILED, ToastKind::Error, now);
                Vec::new()
            }
        }
    }
}

/// Server message, or `fallback` when the server sent none
fn non_empty(message: String, fallback: &str) -> String {
    if message.is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Apply a form-modal action; returns true when the form should be submitted
fn apply_form_action(form: &mut Form, action: ModalAction) -> bool {
    match action {
        ModalAction::Submit => return true,
        ModalAction::NextField => {
            form.validate_focused();
            form.focus_next();
        }
        ModalAction::PrevField => {
            form.validate_focused();
            form.focus_prev();
        }
        ModalAction::Input(c) => {
            if let Some(field) = form.focused_mut() {
                field.push_char(c);
            }
        }
        ModalAction::Backspace => {
            if let Some(field) = form.focused_mut() {
                field.pop_char();
            }
        }
        ModalAction::Cycle(forward) => {
            if let Some(field) = form.focused_mut() {
                field.cycle_choice(forward);
            }
        }
        _ => {}
    }
    false
}

/// Certificate snapshot for a dashboard row
fn participant_certificate(p: &Participant) -> CertificateData {
    CertificateData {
        name: Some(p.name.clone()),
        email: Some(p.email.clone()),
        event: Some(p.event.clone()),
        college: Some(p.college.clone()),
        issue_date: p.registration_date.clone(),
        certificate_id: None,
        certificate_type: Some(if p.winner_status {
            "winner".to_string()
        } else {
            "participation".to_string()
        }),
        event_title: None,
    }
}

//! Application state and update logic for the apidesk TUI.

use apidesk_engine::{
    Access, ApiRecord, ContentEditor, DescriptionType, LoadError, LoadTicket, PendingSave,
    ServerDirectory, ServerList, StoreError, UserProfile, SCOPE_API_CREATE,
};
use ratatui::text::Line;
use tracing::{info, warn};

use crate::event::Action;
use crate::text::{render_markdown, MarkdownStyles};
use crate::ui::widgets::TextAreaState;

/// Ticks a notification stays visible (4 Hz tick rate, so ~3 seconds).
const NOTIFICATION_TICKS: usize = 12;

/// Preview width used until the first frame reports the real pane size.
const DEFAULT_PREVIEW_WIDTH: usize = 40;

/// The current screen being displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    /// API overview with description, overview, and servers.
    #[default]
    Overview,
    /// Full-screen split editor/preview dialog.
    Editor,
}

/// A save the event loop should run in the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub api_id: String,
    pub pending: PendingSave,
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Current screen.
    pub screen: Screen,

    /// Persisted API record (source of truth for the editors).
    pub api: ApiRecord,

    /// User the console acts as.
    pub user: UserProfile,

    description_editor: ContentEditor,
    overview_editor: ContentEditor,

    /// Which editor the dialog is showing.
    pub active_editor: Option<DescriptionType>,

    /// Buffer and cursor of the dialog's text area.
    pub input_state: TextAreaState,

    /// Server list view state.
    pub servers: ServerList,

    /// Fetch the loop has yet to start.
    pending_load: Option<LoadTicket>,

    /// Save the loop has yet to start.
    pending_save: Option<SaveRequest>,

    /// Rendered preview of the active draft.
    preview: Vec<Line<'static>>,
    preview_revision: Option<u64>,
    preview_width: usize,

    /// Notification message (cleared after some ticks).
    pub notification: Option<String>,
    notification_ttl: usize,

    /// Tick counter for animations.
    pub tick: usize,

    /// Scroll offset of the overview screen.
    pub scroll: usize,
}

impl App {
    /// Create the app for `api` and mount its server list.
    pub fn new(api: ApiRecord, user: UserProfile) -> Self {
        let (servers, ticket) = ServerList::mount(api.id.clone());
        Self {
            should_quit: false,
            show_help: false,
            screen: Screen::Overview,
            api,
            user,
            description_editor: ContentEditor::new(DescriptionType::Description),
            overview_editor: ContentEditor::new(DescriptionType::Overview),
            active_editor: None,
            input_state: TextAreaState::default(),
            servers,
            pending_load: Some(ticket),
            pending_save: None,
            preview: Vec::new(),
            preview_revision: None,
            preview_width: DEFAULT_PREVIEW_WIDTH,
            notification: None,
            notification_ttl: 0,
            tick: 0,
            scroll: 0,
        }
    }

    /// Whether the user may edit this API's content.
    pub fn edit_access(&self) -> Access {
        Access::check(&[SCOPE_API_CREATE], &self.user, Some(self.api.access()))
    }

    pub fn editor(&self, description_type: DescriptionType) -> &ContentEditor {
        match description_type {
            DescriptionType::Description => &self.description_editor,
            DescriptionType::Overview => &self.overview_editor,
        }
    }

    fn editor_mut(&mut self, description_type: DescriptionType) -> &mut ContentEditor {
        match description_type {
            DescriptionType::Description => &mut self.description_editor,
            DescriptionType::Overview => &mut self.overview_editor,
        }
    }

    /// The editor shown in the dialog, if any.
    pub fn active(&self) -> Option<&ContentEditor> {
        self.active_editor.map(|dt| self.editor(dt))
    }

    /// Preview lines for the active draft.
    pub fn preview_lines(&self) -> &[Line<'static>] {
        &self.preview
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        if self.show_help {
            if matches!(action, Action::Help | Action::Back | Action::Quit) {
                self.show_help = false;
            }
            return;
        }

        match self.screen {
            Screen::Overview => self.handle_overview_action(action),
            Screen::Editor => self.handle_editor_action(action),
        }
    }

    fn handle_overview_action(&mut self, action: Action) {
        match action {
            Action::Quit | Action::Back => self.quit(),
            Action::Help => self.show_help = true,
            Action::EditDescription => self.open_editor(DescriptionType::Description),
            Action::EditOverview => self.open_editor(DescriptionType::Overview),
            Action::Refresh => self.refresh_servers(),
            Action::Up => self.scroll = self.scroll.saturating_sub(1),
            Action::Down => self.scroll = self.scroll.saturating_add(1),
            Action::Save | Action::None => {}
        }
    }

    fn handle_editor_action(&mut self, action: Action) {
        match action {
            Action::Save => self.save_active(),
            Action::Back => {
                self.cancel_active();
            }
            Action::Quit => {
                if self.cancel_active() {
                    self.quit();
                }
            }
            _ => {}
        }
    }

    /// Open the dialog for `description_type`. Does nothing if the user is
    /// restricted.
    pub fn open_editor(&mut self, description_type: DescriptionType) {
        let access = self.edit_access();
        let api = self.api.clone();
        let editor = self.editor_mut(description_type);
        match editor.open(&api, access) {
            Ok(()) => {
                let draft = editor.draft().unwrap_or_default().to_string();
                self.input_state = TextAreaState::with_content(draft);
                self.active_editor = Some(description_type);
                self.screen = Screen::Editor;
                self.refresh_preview();
            }
            Err(e) => self.notify(e.to_string()),
        }
    }

    /// Push the text area content into the active draft.
    pub fn sync_draft(&mut self) {
        let Some(dt) = self.active_editor else {
            return;
        };
        let content = self.input_state.content().to_string();
        if let Err(e) = self.editor_mut(dt).update_draft(content) {
            warn!(error = %e, "draft update rejected");
            return;
        }
        self.refresh_preview();
    }

    fn refresh_preview(&mut self) {
        let Some(editor) = self.active() else {
            return;
        };
        let revision = editor.revision();
        if self.preview_revision == Some(revision) {
            return;
        }
        let draft = editor.draft().unwrap_or_default();
        self.preview = render_markdown(draft, self.preview_width, &MarkdownStyles::default());
        self.preview_revision = Some(revision);
    }

    /// Set the inner width of the preview pane, re-rendering if it changed.
    pub fn resize_preview(&mut self, width: usize) {
        if width == self.preview_width {
            return;
        }
        self.preview_width = width;
        self.preview_revision = None;
        self.refresh_preview();
    }

    fn save_active(&mut self) {
        let Some(dt) = self.active_editor else {
            return;
        };
        let api_id = self.api.id.clone();
        match self.editor_mut(dt).begin_save() {
            Ok(pending) => self.pending_save = Some(SaveRequest { api_id, pending }),
            Err(e) => warn!(error = %e, "save ignored"),
        }
    }

    /// Cancel the active dialog. Returns `false` while a save is in flight.
    fn cancel_active(&mut self) -> bool {
        let Some(dt) = self.active_editor else {
            return true;
        };
        if self.editor_mut(dt).cancel() {
            self.close_dialog();
            true
        } else {
            self.notify("Save in progress".to_string());
            false
        }
    }

    fn close_dialog(&mut self) {
        self.active_editor = None;
        self.input_state = TextAreaState::default();
        self.preview.clear();
        self.preview_revision = None;
        self.screen = Screen::Overview;
    }

    /// Record the outcome of a background save.
    pub fn complete_save(
        &mut self,
        description_type: DescriptionType,
        result: Result<ApiRecord, StoreError>,
    ) {
        let (outcome, record) = match result {
            Ok(record) => (Ok(()), Some(record)),
            Err(e) => (Err(e), None),
        };
        let failed = outcome.as_ref().err().map(ToString::to_string);
        if let Err(e) = self.editor_mut(description_type).finish_save(outcome) {
            warn!(error = %e, "unexpected save completion");
            return;
        }

        if let Some(record) = record {
            info!(api_id = %record.id, field = %description_type, "content updated");
            self.api = record;
            if self.active_editor == Some(description_type) {
                self.close_dialog();
            }
            self.notify(format!("{} updated", description_type.label()));
        } else if let Some(message) = failed {
            self.notify(format!("Save failed: {message}"));
        }
    }

    /// Start a new fetch of the server list.
    pub fn refresh_servers(&mut self) {
        if let Some(ticket) = self.servers.refresh() {
            self.pending_load = Some(ticket);
        }
    }

    /// Apply a finished fetch; stale results are dropped.
    pub fn apply_servers(&mut self, ticket: &LoadTicket, result: Result<ServerDirectory, LoadError>) {
        self.servers.apply(ticket, result);
    }

    pub fn take_pending_load(&mut self) -> Option<LoadTicket> {
        self.pending_load.take()
    }

    pub fn take_pending_save(&mut self) -> Option<SaveRequest> {
        self.pending_save.take()
    }

    /// Quit unless a save is still running.
    fn quit(&mut self) {
        if self.active().is_some_and(ContentEditor::is_saving) {
            self.notify("Save in progress".to_string());
            return;
        }
        self.servers.unmount();
        self.should_quit = true;
    }

    /// Show a temporary notification.
    pub fn notify(&mut self, message: String) {
        self.notification = Some(message);
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Advance animations and expire notifications.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
    }
}

//! Background fetch and save tasks driven by the event loop.

use std::sync::Arc;
use std::time::Duration;

use apidesk_engine::{
    fetch_directory, ApiRecord, ContentStore, DefinitionSource, DescriptionType, LoadError,
    LoadTicket, ServerDirectory, StoreError,
};
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::app::App;

/// Storage the TUI reads from and writes to.
#[derive(Clone)]
pub struct Backends {
    pub content: Arc<dyn ContentStore>,
    pub definitions: Arc<dyn DefinitionSource>,
    pub fetch_timeout: Duration,
}

type LoadHandle = JoinHandle<(LoadTicket, Result<ServerDirectory, LoadError>)>;
type SaveHandle = JoinHandle<Result<ApiRecord, StoreError>>;

/// In-flight tasks owned by the event loop.
#[derive(Default)]
pub(crate) struct Tasks {
    loads: Vec<LoadHandle>,
    saves: Vec<(DescriptionType, SaveHandle)>,
}

impl Tasks {
    /// Start whatever fetch or save the app has queued.
    pub(crate) fn spawn_pending(&mut self, app: &mut App, backends: &Backends) {
        if let Some(ticket) = app.take_pending_load() {
            // A newer ticket supersedes every fetch still running.
            for handle in self.loads.drain(..) {
                handle.abort();
            }
            debug!(api_id = %ticket.api_id, "spawning server list fetch");
            let source = Arc::clone(&backends.definitions);
            let timeout = backends.fetch_timeout;
            self.loads.push(tokio::spawn(async move {
                let result = fetch_directory(source.as_ref(), &ticket.api_id, timeout).await;
                (ticket, result)
            }));
        }

        if let Some(request) = app.take_pending_save() {
            let description_type = request.pending.description_type;
            debug!(api_id = %request.api_id, field = %description_type, "spawning save");
            let store = Arc::clone(&backends.content);
            let handle = tokio::spawn(async move {
                store
                    .update_content(&request.api_id, description_type, &request.pending.content)
                    .await
            });
            self.saves.push((description_type, handle));
        }
    }

    /// Hand finished results to the app without blocking.
    pub(crate) async fn collect_finished(&mut self, app: &mut App) {
        let mut i = 0;
        while i < self.loads.len() {
            if self.loads[i].is_finished() {
                let handle = self.loads.remove(i);
                Self::finish_load(app, handle).await;
            } else {
                i += 1;
            }
        }

        let mut i = 0;
        while i < self.saves.len() {
            if self.saves[i].1.is_finished() {
                let (description_type, handle) = self.saves.remove(i);
                Self::finish_save(app, description_type, handle).await;
            } else {
                i += 1;
            }
        }
    }

    /// Wait for every task to finish and apply the results.
    #[cfg(test)]
    pub(crate) async fn drain(&mut self, app: &mut App) {
        for handle in std::mem::take(&mut self.loads) {
            Self::finish_load(app, handle).await;
        }
        for (description_type, handle) in std::mem::take(&mut self.saves) {
            Self::finish_save(app, description_type, handle).await;
        }
    }

    /// Abort everything still running.
    pub(crate) fn abort_all(self) {
        for handle in self.loads {
            handle.abort();
        }
        for (_, handle) in self.saves {
            handle.abort();
        }
    }

    async fn finish_load(app: &mut App, handle: LoadHandle) {
        match handle.await {
            Ok((ticket, result)) => {
                app.apply_servers(&ticket, result);
            }
            Err(e) if e.is_cancelled() => {}
            Err(e) => error!(error = %e, "server list task failed"),
        }
    }

    async fn finish_save(app: &mut App, description_type: DescriptionType, handle: SaveHandle) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "save task failed");
                Err(StoreError::Io(std::io::Error::other(e.to_string())))
            }
        };
        app.complete_save(description_type, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Action;
    use crate::test_utils::{create_test_app, sample_api, SAMPLE_DEFINITION};
    use apidesk_engine::FileStore;
    use tempfile::TempDir;

    fn backends(dir: &TempDir, with_definition: bool) -> Backends {
        let store = FileStore::new(dir.path()).unwrap();
        store.create_api(&sample_api()).unwrap();
        if with_definition {
            store.import_definition("pizza", SAMPLE_DEFINITION).unwrap();
        }
        let store = Arc::new(store);
        Backends {
            content: store.clone(),
            definitions: store,
            fetch_timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_initial_fetch_populates_servers() {
        let dir = TempDir::new().unwrap();
        let backends = backends(&dir, true);
        let mut app = create_test_app();
        let mut tasks = Tasks::default();

        tasks.spawn_pending(&mut app, &backends);
        tasks.drain(&mut app).await;

        let directory = app.servers.visible_directory().unwrap();
        assert_eq!(directory.names(), ["production", "sandbox"]);
        assert!(tasks.loads.is_empty() && tasks.saves.is_empty());
    }

    #[tokio::test]
    async fn test_missing_definition_hides_servers() {
        let dir = TempDir::new().unwrap();
        let backends = backends(&dir, false);
        let mut app = create_test_app();
        let mut tasks = Tasks::default();

        tasks.spawn_pending(&mut app, &backends);
        tasks.drain(&mut app).await;

        assert!(!app.servers.is_loading());
        assert!(app.servers.visible_directory().is_none());
    }

    #[tokio::test]
    async fn test_save_persists_and_closes_dialog() {
        let dir = TempDir::new().unwrap();
        let backends = backends(&dir, true);
        let mut app = create_test_app();
        let mut tasks = Tasks::default();

        app.handle_action(Action::EditOverview);
        app.input_state = crate::ui::widgets::TextAreaState::with_content("New text");
        app.sync_draft();
        app.handle_action(Action::Save);
        tasks.spawn_pending(&mut app, &backends);
        tasks.drain(&mut app).await;

        assert_eq!(app.screen, crate::app::Screen::Overview);
        assert_eq!(app.api.overview.as_deref(), Some("New text"));

        let stored = backends.content.load_api("pizza").await.unwrap();
        assert_eq!(stored.overview.as_deref(), Some("New text"));
        assert_eq!(stored.description.as_deref(), Some("Order pizza over events."));
    }

    #[tokio::test]
    async fn test_save_to_unknown_api_keeps_dialog_open() {
        let dir = TempDir::new().unwrap();
        let backends = backends(&dir, true);
        let mut app = create_test_app();
        app.api.id = "ghost".to_string();
        let mut tasks = Tasks::default();

        app.handle_action(Action::EditDescription);
        app.handle_action(Action::Save);
        tasks.spawn_pending(&mut app, &backends);
        tasks.drain(&mut app).await;

        assert_eq!(app.screen, crate::app::Screen::Editor);
        let editor = app.editor(DescriptionType::Description);
        assert!(editor.last_error().unwrap().contains("ghost"));
    }

    #[tokio::test]
    async fn test_refresh_aborts_superseded_fetch() {
        let dir = TempDir::new().unwrap();
        let backends = backends(&dir, true);
        let mut app = create_test_app();
        let mut tasks = Tasks::default();

        tasks.spawn_pending(&mut app, &backends);
        app.handle_action(Action::Refresh);
        tasks.spawn_pending(&mut app, &backends);
        assert_eq!(tasks.loads.len(), 1);

        tasks.drain(&mut app).await;
        assert_eq!(app.servers.visible_directory().unwrap().len(), 2);
    }
}

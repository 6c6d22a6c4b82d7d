//! Content edit session for an API's description or overview.
//!
//! A [`ContentEditor`] is a small state machine:
//!
//! ```text
//!            open               begin_save           finish_save(Ok)
//! Closed ──────────▶ Editing ──────────────▶ Saving ────────────────▶ Closed
//!   ▲                 │   ▲                    │
//!   └──── cancel ─────┘   └─ finish_save(Err) ─┘
//! ```
//!
//! The draft is loaded from the persisted record when the session opens
//! and dropped when it closes. A save is an awaited write; the session
//! stays in `Saving` until the store answers.

use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ApiRecord, DescriptionType};
use crate::auth::Access;
use crate::store::{ContentStore, StoreError};

/// Lifecycle state of an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Closed,
    Editing,
    Saving,
}

/// Errors from edit session transitions.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Editing {0} is not permitted for this user")]
    Restricted(DescriptionType),

    #[error("Cannot {action} while {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: EditorState,
    },

    #[error("Failed to save {field}: {source}")]
    SaveFailed {
        field: DescriptionType,
        #[source]
        source: StoreError,
    },
}

/// A write handed out by [`ContentEditor::begin_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub description_type: DescriptionType,
    pub content: String,
}

/// Edit session for one text field of an API.
#[derive(Debug, Clone)]
pub struct ContentEditor {
    description_type: DescriptionType,
    state: EditorState,
    draft: Option<String>,
    /// Bumped on every draft change so views can cache derived output.
    revision: u64,
    last_error: Option<String>,
}

impl ContentEditor {
    pub fn new(description_type: DescriptionType) -> Self {
        Self {
            description_type,
            state: EditorState::Closed,
            draft: None,
            revision: 0,
            last_error: None,
        }
    }

    pub fn description_type(&self) -> DescriptionType {
        self.description_type
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != EditorState::Closed
    }

    pub fn is_saving(&self) -> bool {
        self.state == EditorState::Saving
    }

    /// The staged content; `None` while closed.
    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Error from the most recent failed save, if the session is still open.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Open the session, loading the draft from the persisted record.
    pub fn open(&mut self, record: &ApiRecord, access: Access) -> Result<(), EditorError> {
        if !access.is_allowed() {
            debug!(field = %self.description_type, "open refused: restricted");
            return Err(EditorError::Restricted(self.description_type));
        }
        self.expect_state("open", EditorState::Closed)?;

        self.draft = Some(record.content(self.description_type).to_string());
        self.revision += 1;
        self.last_error = None;
        self.state = EditorState::Editing;
        debug!(api_id = %record.id, field = %self.description_type, "editor opened");
        Ok(())
    }

    /// Replace the draft. No validation; empty content is accepted.
    pub fn update_draft(&mut self, content: impl Into<String>) -> Result<(), EditorError> {
        self.expect_state("edit", EditorState::Editing)?;
        self.draft = Some(content.into());
        self.revision += 1;
        Ok(())
    }

    /// Discard the draft without writing. Returns `false` if there was
    /// nothing to cancel or a save is already in flight.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            EditorState::Editing => {
                self.close();
                debug!(field = %self.description_type, "editor cancelled");
                true
            }
            EditorState::Closed | EditorState::Saving => false,
        }
    }

    /// Enter `Saving` and hand out the write to perform.
    pub fn begin_save(&mut self) -> Result<PendingSave, EditorError> {
        self.expect_state("save", EditorState::Editing)?;
        self.state = EditorState::Saving;
        self.last_error = None;
        Ok(PendingSave {
            description_type: self.description_type,
            content: self.draft.clone().unwrap_or_default(),
        })
    }

    /// Complete a save started with [`Self::begin_save`].
    ///
    /// Success closes the session. Failure returns to `Editing` with the
    /// draft intact and the error recorded.
    pub fn finish_save<E: std::fmt::Display>(
        &mut self,
        result: Result<(), E>,
    ) -> Result<(), EditorError> {
        self.expect_state("finish save", EditorState::Saving)?;
        match result {
            Ok(()) => {
                self.close();
                debug!(field = %self.description_type, "editor saved");
            }
            Err(e) => {
                warn!(field = %self.description_type, error = %e, "save failed");
                self.last_error = Some(e.to_string());
                self.state = EditorState::Editing;
            }
        }
        Ok(())
    }

    /// Save the draft through `store` and wait for the result.
    ///
    /// The store is called exactly once. On success the updated record is
    /// returned and the session is closed.
    pub async fn save<S>(&mut self, store: &S, api_id: &str) -> Result<ApiRecord, EditorError>
    where
        S: ContentStore + ?Sized,
    {
        let pending = self.begin_save()?;
        match store
            .update_content(api_id, pending.description_type, &pending.content)
            .await
        {
            Ok(record) => {
                self.finish_save(Ok::<(), StoreError>(()))?;
                Ok(record)
            }
            Err(source) => {
                self.finish_save(Err::<(), _>(&source))?;
                Err(EditorError::SaveFailed {
                    field: self.description_type,
                    source,
                })
            }
        }
    }

    /// Label of the control that opens the dialog.
    pub fn button_label(record: &ApiRecord) -> &'static str {
        if record.has_content() {
            "Edit Content"
        } else {
            "Add Content"
        }
    }

    /// Dialog title for an API.
    pub fn title(&self, api_name: &str) -> String {
        format!("Edit {} of {api_name}", self.description_type.label())
    }

    fn close(&mut self) {
        self.draft = None;
        self.last_error = None;
        self.state = EditorState::Closed;
    }

    fn expect_state(&self, action: &'static str, expected: EditorState) -> Result<(), EditorError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EditorError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }
}

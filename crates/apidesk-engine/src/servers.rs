//! Server directory for an API and the state of its on-screen list.
//!
//! [`fetch_directory`] fetches and parses the AsyncAPI definition and
//! builds a [`ServerDirectory`]. [`ServerList`] holds the view state and
//! guards it with a generation counter: every mount or refresh hands out a
//! [`LoadTicket`], and a result carrying an old ticket (or arriving after
//! unmount) is dropped.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::asyncapi::{parse_document, AsyncApiDocument, DefinitionError, ServerEndpoint};
use crate::store::{DefinitionSource, StoreError};

/// Errors from loading a server directory.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to fetch definition: {0}")]
    Fetch(#[from] StoreError),

    #[error("Timed out after {0:?} fetching definition")]
    Timeout(Duration),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Ordered mapping from server name to protocol and URL.
///
/// `names` and `endpoints` always hold the same key set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerDirectory {
    names: Vec<String>,
    endpoints: HashMap<String, ServerEndpoint>,
}

impl ServerDirectory {
    /// Build from a parsed document. Empty when no servers are declared.
    pub fn from_document(doc: &AsyncApiDocument) -> Self {
        let mut directory = Self::default();
        if !doc.has_servers() {
            return directory;
        }
        for (name, endpoint) in doc.servers() {
            directory.insert(name.clone(), endpoint.clone());
        }
        directory
    }

    /// Add a server. A repeated name keeps its first position and takes the new value.
    fn insert(&mut self, name: String, endpoint: ServerEndpoint) {
        if self.endpoints.insert(name.clone(), endpoint).is_none() {
            self.names.push(name);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Server names in declaration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&ServerEndpoint> {
        self.endpoints.get(name)
    }

    /// `(name, endpoint)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServerEndpoint)> {
        self.names
            .iter()
            .filter_map(|name| self.endpoints.get(name).map(|e| (name.as_str(), e)))
    }
}

/// Fetch, parse, and build the directory for `api_id`.
pub async fn fetch_directory<S>(
    source: &S,
    api_id: &str,
    timeout: Duration,
) -> Result<ServerDirectory, LoadError>
where
    S: DefinitionSource + ?Sized,
{
    debug!(api_id, "fetching AsyncAPI definition");
    let raw = tokio::time::timeout(timeout, source.fetch_definition(api_id))
        .await
        .map_err(|_| LoadError::Timeout(timeout))??;
    let doc = parse_document(&raw)?;
    let directory = ServerDirectory::from_document(&doc);
    debug!(api_id, servers = directory.len(), "server directory built");
    Ok(directory)
}

/// Identifies one fetch issued by a [`ServerList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub api_id: String,
    generation: u64,
}

/// What the server list currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServerListState {
    #[default]
    Idle,
    Loading,
    Loaded(ServerDirectory),
    /// Kept for diagnostics; renders like an empty list.
    Failed(String),
}

/// View state of the server list for one API.
#[derive(Debug, Clone)]
pub struct ServerList {
    api_id: String,
    generation: u64,
    mounted: bool,
    state: ServerListState,
}

impl ServerList {
    /// Mount the list and issue its first fetch ticket.
    pub fn mount(api_id: impl Into<String>) -> (Self, LoadTicket) {
        let mut list = Self {
            api_id: api_id.into(),
            generation: 0,
            mounted: true,
            state: ServerListState::Idle,
        };
        let ticket = list.next_ticket();
        (list, ticket)
    }

    pub fn api_id(&self) -> &str {
        &self.api_id
    }

    pub fn state(&self) -> &ServerListState {
        &self.state
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_loading(&self) -> bool {
        self.state == ServerListState::Loading
    }

    /// Force a re-fetch. Results of earlier tickets will be ignored.
    /// Returns `None` once unmounted.
    pub fn refresh(&mut self) -> Option<LoadTicket> {
        if !self.mounted {
            return None;
        }
        Some(self.next_ticket())
    }

    /// Unmount the list; any outstanding fetch becomes a no-op.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.generation += 1;
    }

    /// Apply a fetch result. Returns `false` if the ticket is stale.
    pub fn apply(&mut self, ticket: &LoadTicket, result: Result<ServerDirectory, LoadError>) -> bool {
        if !self.mounted || ticket.generation != self.generation || ticket.api_id != self.api_id {
            debug!(api_id = %ticket.api_id, "dropping stale server list result");
            return false;
        }
        self.state = match result {
            Ok(directory) => ServerListState::Loaded(directory),
            Err(e) => {
                warn!(api_id = %self.api_id, error = %e, "failed to load server list");
                ServerListState::Failed(e.to_string())
            }
        };
        true
    }

    /// The directory to render, if any. Empty directories and failures
    /// render no server section at all.
    pub fn visible_directory(&self) -> Option<&ServerDirectory> {
        match &self.state {
            ServerListState::Loaded(directory) if !directory.is_empty() => Some(directory),
            _ => None,
        }
    }

    fn next_ticket(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = ServerListState::Loading;
        LoadTicket {
            api_id: self.api_id.clone(),
            generation: self.generation,
        }
    }
}

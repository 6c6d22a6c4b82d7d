//! apidesk-engine: Headless engine for the apidesk publisher console
//!
//! This crate provides the logic behind the console, including:
//! - Configuration and user profiles
//! - Capability checks for publisher actions
//! - The description/overview edit session
//! - AsyncAPI parsing and the server directory loader
//! - File and HTTP storage backends

pub mod api;
pub mod asyncapi;
pub mod auth;
pub mod config;
pub mod editor;
pub mod http;
pub mod servers;
pub mod store;
#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use api::{ApiRecord, ApiType, DescriptionType};
pub use asyncapi::{parse_document, AsyncApiDocument, DefinitionError, ServerEndpoint};
pub use auth::{
    is_restricted, Access, ApiAccess, SCOPE_API_CREATE, SCOPE_API_PUBLISH, SCOPE_API_VIEW,
};
pub use config::{Config, ConfigError, UserProfile};
pub use editor::{ContentEditor, EditorError, EditorState, PendingSave};
pub use http::HttpDefinitionSource;
pub use servers::{
    fetch_directory, LoadError, LoadTicket, ServerDirectory, ServerList, ServerListState,
};
pub use store::{ContentStore, DefinitionSource, FileStore, StoreError};

/// Directory holding apidesk state, relative to the working directory.
pub const APIDESK_DIR: &str = ".apidesk";

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

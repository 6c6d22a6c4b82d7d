//! Minimal AsyncAPI document reader.
//!
//! Only what the console shows is read: the `asyncapi` version, the title, and
//! the `servers` object. Servers keep their declaration order, which a
//! plain JSON map would lose, so they are collected through a custom
//! map visitor.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use thiserror::Error;

/// Errors from reading an AsyncAPI document.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Invalid AsyncAPI document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported AsyncAPI version: {0}")]
    UnsupportedVersion(String),

    #[error("Server '{server}' is missing required field '{field}'")]
    MissingField { server: String, field: &'static str },
}

/// A protocol server declared by the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    pub protocol: String,
    pub url: String,
    pub protocol_version: Option<String>,
    pub description: Option<String>,
}

impl ServerEndpoint {
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// A parsed AsyncAPI document.
#[derive(Debug, Clone)]
pub struct AsyncApiDocument {
    version: String,
    title: Option<String>,
    servers: Vec<(String, ServerEndpoint)>,
}

impl AsyncApiDocument {
    /// The `asyncapi` version string, e.g. `2.6.0`.
    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn has_servers(&self) -> bool {
        !self.servers.is_empty()
    }

    /// Server names in declaration order.
    pub fn server_names(&self) -> impl Iterator<Item = &str> {
        self.servers.iter().map(|(name, _)| name.as_str())
    }

    /// Look up a server by name. With duplicate names the last declaration wins.
    pub fn server(&self, name: &str) -> Option<&ServerEndpoint> {
        self.servers
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, server)| server)
    }

    /// All servers in declaration order.
    pub fn servers(&self) -> &[(String, ServerEndpoint)] {
        &self.servers
    }
}

#[derive(Deserialize)]
struct RawDocument {
    asyncapi: String,
    #[serde(default)]
    info: Option<RawInfo>,
    #[serde(default, deserialize_with = "ordered_servers")]
    servers: Vec<(String, RawServer)>,
}

#[derive(Deserialize)]
struct RawInfo {
    #[serde(default)]
    title: Option<String>,
}

/// Union of the 2.x and 3.x server object fields we read.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawServer {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    pathname: Option<String>,
    #[serde(default)]
    protocol: Option<String>,
    #[serde(default)]
    protocol_version: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn ordered_servers<'de, D>(deserializer: D) -> Result<Vec<(String, RawServer)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct OrderedServers;

    impl<'de> Visitor<'de> for OrderedServers {
        type Value = Vec<(String, RawServer)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of server objects")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut servers = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, RawServer>()? {
                servers.push(entry);
            }
            Ok(servers)
        }
    }

    deserializer.deserialize_map(OrderedServers)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Major {
    V2,
    V3,
}

fn major_version(version: &str) -> Result<Major, DefinitionError> {
    match version.split('.').next() {
        Some("2") => Ok(Major::V2),
        Some("3") => Ok(Major::V3),
        _ => Err(DefinitionError::UnsupportedVersion(version.to_string())),
    }
}

fn resolve_server(major: Major, name: &str, raw: RawServer) -> Result<ServerEndpoint, DefinitionError> {
    let missing = |field: &'static str| DefinitionError::MissingField {
        server: name.to_string(),
        field,
    };

    let protocol = raw.protocol.ok_or_else(|| missing("protocol"))?;
    let url = match major {
        Major::V2 => raw.url.ok_or_else(|| missing("url"))?,
        Major::V3 => {
            let host = raw.host.ok_or_else(|| missing("host"))?;
            match raw.pathname {
                Some(path) if !path.is_empty() => {
                    format!("{}/{}", host.trim_end_matches('/'), path.trim_start_matches('/'))
                }
                _ => host,
            }
        }
    };

    Ok(ServerEndpoint {
        protocol,
        url,
        protocol_version: raw.protocol_version,
        description: raw.description,
    })
}

/// Parse a JSON AsyncAPI document.
pub fn parse_document(raw: &str) -> Result<AsyncApiDocument, DefinitionError> {
    let doc: RawDocument = serde_json::from_str(raw)?;
    let major = major_version(&doc.asyncapi)?;

    let servers = doc
        .servers
        .into_iter()
        .map(|(name, server)| {
            let endpoint = resolve_server(major, &name, server)?;
            Ok((name, endpoint))
        })
        .collect::<Result<Vec<_>, DefinitionError>>()?;

    Ok(AsyncApiDocument {
        version: doc.asyncapi,
        title: doc.info.and_then(|info| info.title),
        servers,
    })
}

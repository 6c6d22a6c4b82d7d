//! API records as persisted by the publisher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::ApiAccess;

/// Kind of API entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApiType {
    /// A regular API.
    #[default]
    Api,
    /// A product bundling resources of other APIs.
    ApiProduct,
}

/// Which text field of an API an edit session works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionType {
    /// The short description.
    Description,
    /// The long-form markdown overview.
    Overview,
}

impl DescriptionType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Overview => "Overview",
        }
    }
}

impl fmt::Display for DescriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Description => f.write_str("description"),
            Self::Overview => f.write_str("overview"),
        }
    }
}

impl FromStr for DescriptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "description" => Ok(Self::Description),
            "overview" => Ok(Self::Overview),
            other => Err(format!(
                "unknown description type '{other}' (expected 'description' or 'overview')"
            )),
        }
    }
}

/// The persisted state of an API: the source of truth the editor reads
/// from and writes back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub api_type: ApiType,
    #[serde(default = "default_lifecycle_status")]
    pub lifecycle_status: String,
    pub updated_at: DateTime<Utc>,
}

fn default_lifecycle_status() -> String {
    "CREATED".into()
}

impl ApiRecord {
    /// Create a record with a fresh random ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), name)
    }

    /// Create a record with a caller-chosen ID.
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            overview: None,
            api_type: ApiType::Api,
            lifecycle_status: default_lifecycle_status(),
            updated_at: Utc::now(),
        }
    }

    /// The current value of the selected text field; absent fields read as empty.
    pub fn content(&self, description_type: DescriptionType) -> &str {
        match description_type {
            DescriptionType::Description => self.description.as_deref(),
            DescriptionType::Overview => self.overview.as_deref(),
        }
        .unwrap_or_default()
    }

    /// Replace the selected text field and bump `updated_at`.
    pub fn set_content(&mut self, description_type: DescriptionType, content: impl Into<String>) {
        let content = Some(content.into());
        match description_type {
            DescriptionType::Description => self.description = content,
            DescriptionType::Overview => self.overview = content,
        }
        self.updated_at = Utc::now();
    }

    /// Whether either text field has content.
    pub fn has_content(&self) -> bool {
        !self.content(DescriptionType::Description).is_empty()
            || !self.content(DescriptionType::Overview).is_empty()
    }

    pub fn access(&self) -> ApiAccess {
        ApiAccess {
            api_type: self.api_type,
        }
    }
}

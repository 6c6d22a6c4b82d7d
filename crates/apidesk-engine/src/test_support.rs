//! Mock backends for engine tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{ApiRecord, DescriptionType};
use crate::store::{ContentStore, DefinitionSource, StoreError};

// ===== MockContentStore =====

pub struct MockContentStore {
    records: Mutex<HashMap<String, ApiRecord>>,
    /// Every update_content call, in order.
    updates: Mutex<Vec<(DescriptionType, String)>>,
    /// If Some, the next update fails with this message.
    next_error: Mutex<Option<String>>,
}

impl MockContentStore {
    pub fn with_record(record: ApiRecord) -> Self {
        let mut records = HashMap::new();
        records.insert(record.id.clone(), record);
        Self {
            records: Mutex::new(records),
            updates: Mutex::new(Vec::new()),
            next_error: Mutex::new(None),
        }
    }

    pub fn fail_next_update(&self, message: &str) {
        *self.next_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn updates(&self) -> Vec<(DescriptionType, String)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn load_api(&self, api_id: &str) -> Result<ApiRecord, StoreError> {
        self.records
            .lock()
            .unwrap()
            .get(api_id)
            .cloned()
            .ok_or_else(|| StoreError::ApiNotFound(api_id.to_string()))
    }

    async fn update_content(
        &self,
        api_id: &str,
        description_type: DescriptionType,
        content: &str,
    ) -> Result<ApiRecord, StoreError> {
        self.updates
            .lock()
            .unwrap()
            .push((description_type, content.to_string()));

        if let Some(message) = self.next_error.lock().unwrap().take() {
            return Err(StoreError::Io(std::io::Error::other(message)));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(api_id)
            .ok_or_else(|| StoreError::ApiNotFound(api_id.to_string()))?;
        record.set_content(description_type, content);
        Ok(record.clone())
    }
}

// ===== MockDefinitionSource =====

#[derive(Default)]
pub struct MockDefinitionSource {
    documents: HashMap<String, String>,
    delay: Option<Duration>,
    fetches: Mutex<usize>,
}

impl MockDefinitionSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document(mut self, api_id: &str, raw: &str) -> Self {
        self.documents.insert(api_id.to_string(), raw.to_string());
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        *self.fetches.lock().unwrap()
    }
}

#[async_trait]
impl DefinitionSource for MockDefinitionSource {
    async fn fetch_definition(&self, api_id: &str) -> Result<String, StoreError> {
        *self.fetches.lock().unwrap() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.documents
            .get(api_id)
            .cloned()
            .ok_or_else(|| StoreError::DefinitionNotFound(api_id.to_string()))
    }
}

// ===== Sample documents =====

/// AsyncAPI 2.x document with `production` and `sandbox` servers.
pub const TWO_SERVERS_V2: &str = r#"{
  "asyncapi": "2.6.0",
  "info": { "title": "Streetlights", "version": "1.0.0" },
  "servers": {
    "production": {
      "url": "mqtt://broker.example.com:1883",
      "protocol": "mqtt",
      "protocolVersion": "3.1.1"
    },
    "sandbox": {
      "url": "ws://sandbox.example.com/events",
      "protocol": "ws",
      "description": "Testing only"
    }
  },
  "channels": {}
}"#;

/// AsyncAPI 2.x document without servers.
pub const NO_SERVERS_V2: &str = r#"{
  "asyncapi": "2.0.0",
  "info": { "title": "Quiet", "version": "1.0.0" },
  "channels": {}
}"#;

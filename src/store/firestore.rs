//! Firestore REST document store.
//!
//! Documents come back with typed field values
//! (`{"houseId": {"stringValue": "h1"}}`); they are decoded into plain JSON
//! before reaching callers.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;

use super::{Collection, Document, DocumentStore};
use crate::auth::Session;
use crate::config::LoginConfig;
use crate::error::{ConfigError, StoreError};

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

/// Document store backed by the Firestore REST API.
pub struct FirestoreStore {
    client: reqwest::Client,
    endpoint: String,
    project_id: String,
    session: Arc<Session>,
}

impl FirestoreStore {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            project_id: project_id.into(),
            session,
        }
    }

    pub fn from_config(config: &LoginConfig, session: Arc<Session>) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.http_client()?,
            config.firestore_endpoint.clone(),
            config.project_id.clone(),
            session,
        ))
    }

    fn document_url(&self, collection: Collection, id: &str) -> Result<reqwest::Url, StoreError> {
        let transport = |reason: String| StoreError::Transport {
            collection: collection.to_string(),
            id: id.to_string(),
            reason,
        };

        let mut url = reqwest::Url::parse(&self.endpoint)
            .map_err(|e| transport(format!("invalid endpoint {}: {e}", self.endpoint)))?;
        url.path_segments_mut()
            .map_err(|_| transport(format!("endpoint cannot be a base: {}", self.endpoint)))?
            .pop_if_empty()
            .extend([
                "projects",
                self.project_id.as_str(),
                "databases",
                "(default)",
                "documents",
                collection.as_str(),
                id,
            ]);
        Ok(url)
    }
}

/// Decode one Firestore typed value into plain JSON.
pub fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return value.clone();
    };
    let Some((kind, inner)) = obj.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" | "geoPointValue" => inner.clone(),
        // int64 travels as a decimal string
        "integerValue" => match inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| inner.clone()),
            other => other.clone(),
        },
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner.clone(),
        "mapValue" => Value::Object(decode_fields(
            inner.get("fields").and_then(Value::as_object),
        )),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        _ => inner.clone(),
    }
}

fn decode_fields(fields: Option<&serde_json::Map<String, Value>>) -> Document {
    fields
        .map(|f| {
            f.iter()
                .map(|(name, v)| (name.clone(), decode_value(v)))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get_by_id(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(collection, id)?;

        let mut request = self.client.get(url);
        if let Some(token) = self.session.bearer().await {
            request = request.bearer_auth(token.expose_secret());
        }

        let resp = request.send().await.map_err(|e| StoreError::Transport {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(StoreError::Status {
                collection: collection.to_string(),
                id: id.to_string(),
                status: status.as_u16(),
            });
        }

        let raw: RawDocument = resp.json().await.map_err(|e| StoreError::Decode {
            collection: collection.to_string(),
            id: id.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Some(decode_fields(Some(&raw.fields))))
    }
}

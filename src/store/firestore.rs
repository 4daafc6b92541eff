use super::{CODE_INVALID_ARGUMENT, Document, DocumentStore, StoreError, document_segments};
use crate::APP_USER_AGENT;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Number, Value, json};
use tracing::{Instrument, debug, error, info_span, instrument};
use url::Url;

pub const DEFAULT_FIRESTORE_URL: &str = "https://firestore.googleapis.com";

/// Firestore REST client bound to the `(default)` database of one project.
#[derive(Debug)]
pub struct Firestore {
    client: Client,
    documents_url: Url,
    token: Option<SecretString>,
}

impl Firestore {
    /// # Errors
    /// Returns an error if `base_url` is not a valid base URL or the HTTP
    /// client cannot be built.
    pub fn new(base_url: &str, project_id: &str, token: Option<SecretString>) -> Result<Self> {
        let mut documents_url = Url::parse(base_url)
            .with_context(|| format!("Invalid Firestore URL: {base_url}"))?;

        documents_url
            .path_segments_mut()
            .map_err(|()| anyhow!("Firestore URL cannot be a base: {base_url}"))?
            .pop_if_empty()
            .extend([
                "v1",
                "projects",
                project_id,
                "databases",
                "(default)",
                "documents",
            ]);

        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            client,
            documents_url,
            token,
        })
    }

    /// Each segment is pushed whole, so ids are percent-encoded and never
    /// reinterpreted as URL path syntax.
    fn document_url(&self, path: &str) -> Result<Url, StoreError> {
        let segments = document_segments(path)?;
        let mut url = self.documents_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::new(CODE_INVALID_ARGUMENT, "invalid documents URL"))?
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }
}

#[async_trait]
impl DocumentStore for Firestore {
    #[instrument(skip(self))]
    async fn get(&self, path: &str) -> Result<Option<Document>, StoreError> {
        let url = self.document_url(path)?;
        let span = info_span!("db.query", db.system = "firestore", db.operation = "GET");

        let response = self
            .authorize(self.client.get(url))
            .send()
            .instrument(span)
            .await
            .map_err(unavailable)?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("document {} not found", path);
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let json_response: Value = response.json().await.map_err(|e| {
            error!("Failed to parse Firestore document: {}", e);

            StoreError::new("internal", e.to_string())
        })?;

        Ok(Some(decode_fields(&json_response["fields"])))
    }

    #[instrument(skip(self, value))]
    async fn set(&self, path: &str, value: Document) -> Result<(), StoreError> {
        let url = self.document_url(path)?;
        let span = info_span!("db.query", db.system = "firestore", db.operation = "PATCH");

        // PATCH without an update mask replaces the whole document.
        let response = self
            .authorize(self.client.patch(url))
            .json(&json!({ "fields": encode_fields(&value) }))
            .send()
            .instrument(span)
            .await
            .map_err(unavailable)?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        Ok(())
    }
}

fn unavailable(e: reqwest::Error) -> StoreError {
    error!("Firestore request failed: {}", e);

    StoreError::new("unavailable", e.to_string())
}

async fn status_error(response: reqwest::Response) -> StoreError {
    let status = response.status();
    let json_response: Value = response.json().await.unwrap_or(Value::Null);

    let code = json_response["error"]["status"]
        .as_str()
        .map_or_else(|| "unknown".to_string(), |s| s.to_lowercase().replace('_', "-"));
    let message = json_response["error"]["message"]
        .as_str()
        .unwrap_or_default();

    error!("Firestore error: {} - {}, {}", status, code, message);

    StoreError::new(code, message)
}

/// Encode a JSON object as a Firestore `fields` map.
pub(crate) fn encode_fields(document: &Document) -> Value {
    Value::Object(
        document
            .iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(values) => json!({
            "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Decode a Firestore `fields` map back into a JSON object.
pub(crate) fn decode_fields(fields: &Value) -> Document {
    fields
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .map(|(key, value)| (key.clone(), decode_value(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn decode_value(value: &Value) -> Value {
    let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Value::Null;
    };

    match kind.as_str() {
        "booleanValue" => Value::Bool(inner.as_bool().unwrap_or_default()),
        "integerValue" => inner
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| inner.as_i64())
            .map_or(Value::Null, |i| Value::Number(i.into())),
        "doubleValue" => inner
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" | "geoPointValue" => {
            inner.clone()
        }
        "arrayValue" => Value::Array(
            inner["values"]
                .as_array()
                .map(|values| values.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => Value::Object(decode_fields(&inner["fields"])),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ALICE_PATH: &str = "/v1/projects/demo/databases/(default)/documents/users/alice";

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn profile() -> Document {
        let mut doc = Map::new();
        doc.insert("handle".to_string(), json!("alice"));
        doc.insert("email".to_string(), json!("a@b.com"));
        doc.insert("createdAt".to_string(), json!("2024-01-01T00:00:00.000Z"));
        doc.insert("userId".to_string(), json!("uid-1"));
        doc
    }

    #[test]
    fn codec_handles_nested_values() {
        let mut doc = Map::new();
        doc.insert("count".to_string(), json!(3));
        doc.insert("ratio".to_string(), json!(0.5));
        doc.insert("tags".to_string(), json!(["a", true, null]));
        doc.insert("meta".to_string(), json!({ "handle": "alice" }));

        let encoded = encode_fields(&doc);
        assert_eq!(encoded["count"], json!({ "integerValue": "3" }));
        assert_eq!(
            encoded["meta"],
            json!({ "mapValue": { "fields": { "handle": { "stringValue": "alice" } } } })
        );
        assert_eq!(decode_fields(&encoded), doc);
    }

    #[test]
    fn decode_reads_timestamps_as_strings() {
        let fields = json!({ "at": { "timestampValue": "2024-01-01T00:00:00Z" } });
        assert_eq!(
            decode_fields(&fields).get("at"),
            Some(&json!("2024-01-01T00:00:00Z"))
        );
    }

    #[test]
    fn document_url_appends_path_segments() -> Result<()> {
        let store = Firestore::new("http://localhost:8080/", "demo", None)?;
        let url = store.document_url("/users/alice")?;
        assert_eq!(url.path(), ALICE_PATH);
        Ok(())
    }

    #[test]
    fn document_url_rejects_paths_outside_the_document() -> Result<()> {
        let store = Firestore::new("http://localhost:8080/", "demo", None)?;
        for path in ["/users/alice/..", "/users/..", "/users/a/b"] {
            assert!(
                store
                    .document_url(path)
                    .is_err_and(|e| e.code == CODE_INVALID_ARGUMENT),
                "{path} accepted"
            );
        }
        Ok(())
    }

    #[test]
    fn document_url_encodes_ids() -> Result<()> {
        let store = Firestore::new("http://localhost:8080/", "demo", None)?;
        let url = store.document_url("/users/a?b#c")?;
        assert_eq!(
            url.path(),
            "/v1/projects/demo/databases/(default)/documents/users/a%3Fb%23c"
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_path_never_reaches_firestore() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(0)
            .mount(&server)
            .await;

        let store = Firestore::new(&server.uri(), "demo", None)?;
        match store.get("/users/a/b").await {
            Err(err) => assert_eq!(err.code, CODE_INVALID_ARGUMENT),
            Ok(found) => anyhow::bail!("expected invalid-argument, got {found:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn get_missing_document_is_none() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ALICE_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": 404, "message": "Document not found", "status": "NOT_FOUND" }
            })))
            .mount(&server)
            .await;

        let store = Firestore::new(&server.uri(), "demo", None)?;
        assert!(store.get("/users/alice").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn get_existing_document() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ALICE_PATH))
            .and(header("authorization", "Bearer owner"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "projects/demo/databases/(default)/documents/users/alice",
                "fields": encode_fields(&profile()),
                "createTime": "2024-01-01T00:00:00Z",
                "updateTime": "2024-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let store = Firestore::new(&server.uri(), "demo", Some(SecretString::from("owner")))?;
        assert_eq!(store.get("/users/alice").await?, Some(profile()));
        Ok(())
    }

    #[tokio::test]
    async fn set_patches_whole_document() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(ALICE_PATH))
            .and(body_json(json!({ "fields": encode_fields(&profile()) })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let store = Firestore::new(&server.uri(), "demo", None)?;
        store.set("/users/alice", profile()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn permission_denied_maps_to_code() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }

        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(ALICE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {
                    "code": 403,
                    "message": "Missing or insufficient permissions.",
                    "status": "PERMISSION_DENIED"
                }
            })))
            .mount(&server)
            .await;

        let store = Firestore::new(&server.uri(), "demo", None)?;
        match store.set("/users/alice", profile()).await {
            Err(err) => assert_eq!(err.code, "permission-denied"),
            Ok(()) => anyhow::bail!("expected PERMISSION_DENIED to fail"),
        }
        Ok(())
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use veritasq_core::{DocumentFile, ValidationRequest};

use crate::error::ClientError;

/// How a remote procedure is addressed: by symbolic path or by position.
///
/// Spaces expose the named route on current builds and the numeric
/// `fn_index` convention on older ones; the client tries both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointRef {
    /// Named endpoint, stored without the leading slash.
    Named(String),
    /// Positional endpoint index.
    Index(u32),
}

impl EndpointRef {
    /// Named endpoint reference; a leading slash is tolerated and dropped.
    pub fn named(name: &str) -> Self {
        EndpointRef::Named(name.trim_start_matches('/').to_string())
    }
}

impl std::fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointRef::Named(name) => write!(f, "/{name}"),
            EndpointRef::Index(i) => write!(f, "#{i}"),
        }
    }
}

/// A file stored on the space via the upload route.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Server-side path returned by the upload route.
    pub path: String,
    /// Original filename, carried for the space's display.
    pub orig_name: String,
}

impl UploadedFile {
    /// The `FileData` payload shape the space expects for file inputs.
    pub fn to_value(&self) -> Value {
        json!({
            "path": self.path,
            "orig_name": self.orig_name,
            "meta": {"_type": "gradio.FileData"},
        })
    }
}

/// The validate procedure's payload: the file plus the two tuning
/// parameters. Field names are the wire contract with the space.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationPayload {
    /// The uploaded file reference.
    #[serde(serialize_with = "serialize_file")]
    pub file: UploadedFile,
    /// Evidence snippets per compliance check.
    pub k_per_check: u32,
    /// Embedding model name.
    pub model_name: String,
}

fn serialize_file<S: serde::Serializer>(f: &UploadedFile, s: S) -> Result<S::Ok, S::Error> {
    f.to_value().serialize(s)
}

impl ValidationPayload {
    /// Pair an uploaded file with the run parameters.
    pub fn new(file: UploadedFile, request: &ValidationRequest) -> Self {
        Self {
            file,
            k_per_check: request.k_per_check,
            model_name: request.model_name.clone(),
        }
    }

    /// Positional call data, in the space's declared input order.
    pub fn to_call_data(&self) -> Vec<Value> {
        vec![
            self.file.to_value(),
            json!(self.k_per_check),
            json!(self.model_name),
        ]
    }
}

/// The invocable surface of a connected session.
///
/// `HttpSession` is the production implementation; tests substitute fakes
/// to exercise the fallback policy without a network.
#[async_trait]
pub trait PredictSession: Send + Sync {
    /// Invoke an endpoint with positional call data, returning the reply's
    /// `data` payload.
    async fn predict(&self, endpoint: &EndpointRef, data: &[Value]) -> Result<Value, ClientError>;
}

/// A connected session against one space host.
///
/// Holds no state beyond the connection parameters; each validation call
/// opens a fresh session and drops it afterwards.
#[derive(Debug, Clone)]
pub struct HttpSession {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
    session_hash: String,
}

#[derive(Debug, Deserialize)]
struct CallHandle {
    event_id: String,
}

#[derive(Debug, Deserialize)]
struct PredictBody {
    data: Value,
}

impl HttpSession {
    /// Build a session handle without probing the host.
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            session_hash: uuid::Uuid::new_v4().to_string(),
        }
    }

    /// Open a session: probe the host's API info route so connection
    /// failures surface here rather than mid-run.
    pub async fn open(
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, ClientError> {
        let session = Self::new(base_url, token);
        session
            .authorized(session.http.get(session.api_url("info")))
            .send()
            .await?
            .error_for_status()?;
        debug!(base_url = %session.base_url, "session opened");
        Ok(session)
    }

    /// Base URL of the connected host.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn api_url(&self, suffix: &str) -> String {
        format!("{}/gradio_api/{suffix}", self.base_url)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Store a file on the space. The upload route answers with a JSON
    /// array of server-side paths, one per part.
    pub async fn upload(&self, file: &DocumentFile) -> Result<UploadedFile, ClientError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.clone()).file_name(file.name.clone());
        let form = reqwest::multipart::Form::new().part("files", part);

        let paths: Vec<String> = self
            .authorized(self.http.post(self.api_url("upload")))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(UploadedFile {
            path: first_stored_path(paths)?,
            orig_name: file.name.clone(),
        })
    }

    async fn predict_named(&self, name: &str, data: &[Value]) -> Result<Value, ClientError> {
        let call_url = self.api_url(&format!("call/{name}"));
        let resp = self
            .authorized(self.http.post(&call_url))
            .json(&json!({"data": data, "session_hash": self.session_hash}))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Endpoint {
                endpoint: format!("/{name}"),
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let handle: CallHandle = resp.json().await?;

        let stream = self
            .authorized(
                self.http
                    .get(format!("{call_url}/{}", handle.event_id)),
            )
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        extract_complete_data(&stream).map_err(|reason| ClientError::Stream {
            endpoint: format!("/{name}"),
            reason,
        })
    }

    async fn predict_indexed(&self, index: u32, data: &[Value]) -> Result<Value, ClientError> {
        let resp = self
            .authorized(self.http.post(self.api_url("run/predict")))
            .json(&json!({
                "fn_index": index,
                "data": data,
                "session_hash": self.session_hash,
            }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Endpoint {
                endpoint: format!("#{index}"),
                status: status.as_u16(),
                body: resp.text().await.unwrap_or_default(),
            });
        }
        let body: PredictBody = resp.json().await?;
        Ok(body.data)
    }
}

#[async_trait]
impl PredictSession for HttpSession {
    async fn predict(&self, endpoint: &EndpointRef, data: &[Value]) -> Result<Value, ClientError> {
        match endpoint {
            EndpointRef::Named(name) => self.predict_named(name, data).await,
            EndpointRef::Index(i) => self.predict_indexed(*i, data).await,
        }
    }
}

/// Pick the stored path of the uploaded document from the upload route's
/// answer. The route returns one path per part; an empty array means the
/// upload did not take.
fn first_stored_path(paths: Vec<String>) -> Result<String, ClientError> {
    paths
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::Upload("upload returned no stored path".to_string()))
}

/// Pull the result payload out of a buffered server-sent event stream.
///
/// The call route streams `event:`/`data:` line pairs and finishes with a
/// `complete` event whose data line is the reply payload. An `error` event
/// or a stream without a completion is reported as a reason string.
fn extract_complete_data(stream: &str) -> Result<Value, String> {
    let mut current_event = "";
    let mut complete_data: Option<&str> = None;
    let mut error_data: Option<&str> = None;

    for line in stream.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            current_event = name.trim();
        } else if let Some(data) = line.strip_prefix("data:") {
            match current_event {
                "complete" => complete_data = Some(data.trim()),
                "error" => error_data = Some(data.trim()),
                _ => {}
            }
        }
    }

    if let Some(data) = complete_data {
        return serde_json::from_str(data).map_err(|e| format!("unparseable completion: {e}"));
    }
    if let Some(data) = error_data {
        return Err(format!("space reported an error: {data}"));
    }
    Err("stream ended without a completion event".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_ref_drops_leading_slash() {
        assert_eq!(EndpointRef::named("/validate"), EndpointRef::named("validate"));
        assert_eq!(EndpointRef::named("/validate").to_string(), "/validate");
        assert_eq!(EndpointRef::Index(0).to_string(), "#0");
    }

    #[test]
    fn payload_call_data_order_matches_wire_contract() {
        let payload = ValidationPayload {
            file: UploadedFile {
                path: "/tmp/gradio/abc/doc.pdf".into(),
                orig_name: "doc.pdf".into(),
            },
            k_per_check: 8,
            model_name: "intfloat/e5-base-v2".into(),
        };
        let data = payload.to_call_data();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["meta"]["_type"], "gradio.FileData");
        assert_eq!(data[1], json!(8));
        assert_eq!(data[2], json!("intfloat/e5-base-v2"));
    }

    #[test]
    fn payload_serializes_with_named_fields() {
        let payload = ValidationPayload {
            file: UploadedFile {
                path: "p".into(),
                orig_name: "n".into(),
            },
            k_per_check: 4,
            model_name: "m".into(),
        };
        let v = serde_json::to_value(&payload).unwrap();
        assert_eq!(v["k_per_check"], json!(4));
        assert_eq!(v["model_name"], json!("m"));
        assert_eq!(v["file"]["path"], json!("p"));
    }

    #[test]
    fn extracts_complete_event_payload() {
        let stream = "event: generating\ndata: null\n\nevent: complete\ndata: [\"f.pdf\", []]\n\n";
        let value = extract_complete_data(stream).unwrap();
        assert_eq!(value, json!(["f.pdf", []]));
    }

    #[test]
    fn last_complete_event_wins() {
        let stream =
            "event: complete\ndata: [1]\n\nevent: complete\ndata: [2]\n\n";
        assert_eq!(extract_complete_data(stream).unwrap(), json!([2]));
    }

    #[test]
    fn error_event_is_reported() {
        let stream = "event: error\ndata: \"boom\"\n\n";
        let reason = extract_complete_data(stream).unwrap_err();
        assert!(reason.contains("boom"));
    }

    #[test]
    fn empty_stream_is_reported() {
        let reason = extract_complete_data("").unwrap_err();
        assert!(reason.contains("without a completion"));
    }

    #[test]
    fn upload_answer_yields_the_first_stored_path() {
        let path = first_stored_path(vec![
            "/tmp/gradio/abc/doc.pdf".to_string(),
            "/tmp/gradio/abc/extra.pdf".to_string(),
        ])
        .unwrap();
        assert_eq!(path, "/tmp/gradio/abc/doc.pdf");
    }

    #[test]
    fn empty_upload_answer_is_an_upload_failure() {
        let err = first_stored_path(vec![]).unwrap_err();
        assert!(matches!(err, ClientError::Upload(_)));
    }

    #[test]
    fn session_hash_is_fresh_per_session() {
        let a = HttpSession::new("https://x.hf.space", None);
        let b = HttpSession::new("https://x.hf.space", None);
        assert_ne!(a.session_hash, b.session_hash);
    }
}

//! Model client: one non-streaming generate call per question or batch.
//!
//! [`VisionClient`] is built once from a [`ClientConfig`] and reuses a single
//! HTTP connection pool across calls. The actual network hop sits behind the
//! [`GenerateTransport`] trait so tests can substitute a counting mock and
//! callers can wrap the default [`HttpTransport`] with middleware.
//!
//! Two modes, mirroring the two caller-facing operations:
//!
//! * [`VisionClient::ask`] — free-text single question, returns the raw
//!   response text unmodified.
//! * [`VisionClient::ask_many`] — multi-question batch; forces structured
//!   output mode and decodes the JSON reply into an [`AnswerSet`].

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{ClientConfig, GenerateOptions};
use crate::decode;
use crate::error::AskDocError;
use crate::pipeline::{encode, input};
use crate::prompt::{self, RESPONSE_SCHEMA};
use crate::question::{validate_batch, AnswerSet, Question};

/// Request body for the generate endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
    /// Structured-output constraint: a JSON schema the reply must conform to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    pub stream: bool,
}

/// Reply body from the generate endpoint.
///
/// Only the `response` field matters here; everything else the server sends
/// (timings, context) is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// Transport carrying a [`GenerateRequest`] to a model server.
#[async_trait]
pub trait GenerateTransport: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AskDocError>;
}

/// Default transport: POST `{endpoint}/api/generate` via reqwest.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a transport with the request timeout applied to the whole call.
    ///
    /// The timeout is best-effort: it is forwarded to reqwest and not
    /// enforced separately.
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, AskDocError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AskDocError::Internal(format!("http client: {e}")))?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GenerateTransport for HttpTransport {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AskDocError> {
        let url = format!("{}/api/generate", self.endpoint);
        debug!("POST {} (model={})", url, request.model);

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| AskDocError::ApiError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AskDocError::ApiError {
                message: format!("server returned {status}: {body}"),
            });
        }

        response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| AskDocError::MalformedServerResponse {
                detail: format!("reply was not a generate response: {e}"),
            })
    }
}

/// Client for a vision-capable model behind a generate endpoint.
pub struct VisionClient {
    config: ClientConfig,
    transport: Arc<dyn GenerateTransport>,
}

impl VisionClient {
    /// Build a client with the default HTTP transport.
    pub fn new(config: ClientConfig) -> Result<Self, AskDocError> {
        let transport = Arc::new(HttpTransport::new(&config.endpoint, config.timeout_secs)?);
        Ok(Self { config, transport })
    }

    /// Build a client around a custom transport.
    ///
    /// Used by tests (mock server) and callers that need middleware such as
    /// caching or rate limiting.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn GenerateTransport>) -> Self {
        Self { config, transport }
    }

    fn model(&self) -> Result<String, AskDocError> {
        self.config
            .model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .ok_or(AskDocError::ModelNotConfigured)
    }

    /// Load the image as base64. Local files only, unless `allow_remote`
    /// (legacy single-question capability).
    async fn load_image(&self, image: &str, allow_remote: bool) -> Result<String, AskDocError> {
        if input::is_url(image) {
            if !allow_remote {
                return Err(AskDocError::UnsupportedInput {
                    input: image.to_string(),
                });
            }
            let bytes =
                input::fetch_remote_image(image, self.config.download_timeout_secs).await?;
            return Ok(encode::encode_image(&bytes));
        }
        let bytes = input::read_local_image(Path::new(image))?;
        Ok(encode::encode_image(&bytes))
    }

    /// Ask one free-text question about an image.
    ///
    /// `image` is a local file path; an `http(s)` URL is also accepted here
    /// (and only here) and fetched with the download timeout.
    ///
    /// Returns the model's textual answer unmodified.
    pub async fn ask(&self, image: &str, question: &str) -> Result<String, AskDocError> {
        let model = self.model()?;
        let b64 = self.load_image(image, true).await?;
        debug!("Prompt:\n{question}");

        let request = GenerateRequest {
            model,
            prompt: question.to_string(),
            images: vec![b64],
            options: non_empty(self.config.options.clone()),
            format: None,
            stream: false,
        };

        let reply = self.transport.generate(&request).await?;
        reply
            .response
            .ok_or_else(|| AskDocError::MalformedServerResponse {
                detail: "missing 'response' field".into(),
            })
    }

    /// Ask multiple typed questions about an image in a single call.
    ///
    /// Validates the batch before any network call, forces JSON mode on the
    /// request (caller options cannot override it), constrains the reply with
    /// the response schema, and decodes the result.
    ///
    /// `image` must be a local file path; URLs are rejected with
    /// [`AskDocError::UnsupportedInput`].
    pub async fn ask_many(
        &self,
        image: &str,
        questions: &[Question],
    ) -> Result<AnswerSet, AskDocError> {
        let model = self.model()?;
        validate_batch(questions)?;

        let prompt = prompt::build_batch_prompt(questions);
        info!("Generated prompt:\n{prompt}");

        let b64 = self.load_image(image, false).await?;

        // Forced structured-output flag; inserted last so caller options
        // never override it.
        let mut options = self.config.options.clone();
        options.insert("format".into(), Value::String("json".into()));

        let request = GenerateRequest {
            model,
            prompt,
            images: vec![b64],
            options: Some(options),
            format: Some(RESPONSE_SCHEMA.clone()),
            stream: false,
        };

        let reply = self.transport.generate(&request).await?;
        let raw = reply
            .response
            .ok_or_else(|| AskDocError::MalformedServerResponse {
                detail: "missing 'response' field".into(),
            })?;

        decode::decode_answers(&raw, questions.len())
    }
}

fn non_empty(options: GenerateOptions) -> Option<GenerateOptions> {
    if options.is_empty() {
        None
    } else {
        Some(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::AnswerType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport that records requests and replies with a canned response.
    struct MockTransport {
        reply: String,
        calls: AtomicUsize,
        last_request: Mutex<Option<GenerateRequest>>,
    }

    impl MockTransport {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerateTransport for MockTransport {
        async fn generate(
            &self,
            request: &GenerateRequest,
        ) -> Result<GenerateResponse, AskDocError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some(request.clone());
            Ok(GenerateResponse {
                response: Some(self.reply.clone()),
            })
        }
    }

    fn temp_image() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        std::fs::write(&path, b"\x89PNG fake bytes").unwrap();
        let s = path.to_string_lossy().into_owned();
        (dir, s)
    }

    fn client_with(transport: Arc<MockTransport>, model: Option<&str>) -> VisionClient {
        let mut builder = ClientConfig::builder();
        if let Some(m) = model {
            builder = builder.model(m);
        }
        VisionClient::with_transport(builder.build().unwrap(), transport)
    }

    #[tokio::test]
    async fn ask_returns_response_text_unchanged() {
        let transport = MockTransport::replying("Yes");
        let client = client_with(Arc::clone(&transport), Some("llava:7b"));
        let (_dir, image) = temp_image();

        let answer = client.ask(&image, "Is the box checked?").await.unwrap();
        assert_eq!(answer, "Yes");
        assert_eq!(transport.call_count(), 1);

        let req = transport.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(req.model, "llava:7b");
        assert!(!req.stream);
        assert!(req.format.is_none(), "single-question mode is free text");
        assert_eq!(req.images.len(), 1);
    }

    #[tokio::test]
    async fn ask_without_model_fails_before_network() {
        let transport = MockTransport::replying("Yes");
        let client = client_with(Arc::clone(&transport), None);
        let (_dir, image) = temp_image();

        let err = client.ask(&image, "Anything?").await.unwrap_err();
        assert!(matches!(err, AskDocError::ModelNotConfigured));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn ask_missing_image_fails_before_network() {
        let transport = MockTransport::replying("Yes");
        let client = client_with(Arc::clone(&transport), Some("llava:7b"));

        let err = client.ask("/no/such/image.png", "Anything?").await.unwrap_err();
        assert!(matches!(err, AskDocError::ImageNotFound { .. }));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn ask_many_empty_batch_fails_before_network() {
        let transport = MockTransport::replying("{}");
        let client = client_with(Arc::clone(&transport), Some("llava:7b"));
        let (_dir, image) = temp_image();

        let err = client.ask_many(&image, &[]).await.unwrap_err();
        assert!(matches!(err, AskDocError::InvalidQuestionBatch(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn ask_many_rejects_url_input() {
        let transport = MockTransport::replying("{}");
        let client = client_with(Arc::clone(&transport), Some("llava:7b"));

        let err = client
            .ask_many("https://example.com/scan.png", &[Question::new("Title?")])
            .await
            .unwrap_err();
        assert!(matches!(err, AskDocError::UnsupportedInput { .. }));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn ask_many_forces_json_mode_over_caller_options() {
        let transport =
            MockTransport::replying(r#"{"answers":[{"question":"Title?","answer":"Form"}]}"#);
        let config = ClientConfig::builder()
            .model("llava:7b")
            .option("format", "free-for-all")
            .option("temperature", 0)
            .build()
            .unwrap();
        let client = VisionClient::with_transport(config, transport.clone());
        let (_dir, image) = temp_image();

        client
            .ask_many(&image, &[Question::new("Title?")])
            .await
            .unwrap();

        let req = transport.last_request.lock().unwrap().clone().unwrap();
        let options = req.options.unwrap();
        assert_eq!(options["format"], "json", "forced flag must win");
        assert_eq!(options["temperature"], 0, "caller options are kept");
        assert!(!req.stream);
        assert_eq!(req.format.as_ref(), Some(&*RESPONSE_SCHEMA));
    }

    #[tokio::test]
    async fn ask_many_decodes_typed_answers() {
        let transport = MockTransport::replying(
            r#"{"answers":[{"question":"Q1","answer":"A1"},{"question":"Q2","answer":42}]}"#,
        );
        let client = client_with(Arc::clone(&transport), Some("llava:7b"));
        let (_dir, image) = temp_image();

        let questions = vec![
            Question::new("Q1"),
            Question::typed("Q2", AnswerType::Number),
        ];
        let set = client.ask_many(&image, &questions).await.unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.answers[0].answer, serde_json::json!("A1"));
        assert_eq!(set.answers[1].answer, serde_json::json!(42));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn missing_response_field_is_malformed() {
        struct Empty;
        #[async_trait]
        impl GenerateTransport for Empty {
            async fn generate(
                &self,
                _request: &GenerateRequest,
            ) -> Result<GenerateResponse, AskDocError> {
                Ok(GenerateResponse { response: None })
            }
        }

        let client =
            VisionClient::with_transport(
                ClientConfig::builder().model("llava:7b").build().unwrap(),
                Arc::new(Empty),
            );
        let (_dir, image) = temp_image();

        let err = client.ask(&image, "Anything?").await.unwrap_err();
        assert!(matches!(err, AskDocError::MalformedServerResponse { .. }));
    }
}

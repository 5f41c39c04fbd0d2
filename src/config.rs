//! Client configuration.
//!
//! All behaviour is controlled through [`ClientConfig`], built via its
//! [`ClientConfigBuilder`]. The library never reads the environment: the
//! default endpoint is a compile-time constant, and resolving
//! `OLLAMA_ENDPOINT` / `OLLAMA_MODEL` is the surrounding application's job at
//! process start (the CLI does this through clap's `env` attributes).

use serde_json::{Map, Value};
use std::fmt;

use crate::error::AskDocError;

/// Default Ollama endpoint when none is configured.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default rendering DPI for PDF pages (~2x 72 dpi).
pub const DEFAULT_DPI: u32 = 144;

/// Generation options forwarded to the model server (e.g. `temperature`).
pub type GenerateOptions = Map<String, Value>;

/// Configuration for a [`crate::client::VisionClient`].
///
/// # Example
/// ```rust
/// use askdoc::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .model("llava:7b")
///     .timeout_secs(180)
///     .option("temperature", 0)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the model server. Default: [`DEFAULT_ENDPOINT`].
    pub endpoint: String,

    /// Model identifier, e.g. "llava:7b". No default: every call fails with
    /// [`AskDocError::ModelNotConfigured`] until one is set.
    pub model: Option<String>,

    /// Request timeout in seconds, forwarded to the HTTP client. Best-effort:
    /// the transport may not enforce it exactly. Default: 120.
    pub timeout_secs: u64,

    /// Timeout for the legacy remote-image fetch in seconds. Default: 30.
    pub download_timeout_secs: u64,

    /// Rendering DPI used when rasterising a PDF page. Range: 72-400. Default: 144.
    pub dpi: u32,

    /// Generation options sent with every request (`temperature`, `num_ctx`, ...).
    ///
    /// Batch mode merges these with a forced `"format": "json"` entry; the
    /// forced entry always wins.
    pub options: GenerateOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            download_timeout_secs: 30,
            dpi: DEFAULT_DPI,
            options: GenerateOptions::new(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("dpi", &self.dpi)
            .field("options", &self.options)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs.max(1);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs.max(1);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    /// Set one generation option, overwriting any previous value for the key.
    pub fn option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.options.insert(key.into(), value.into());
        self
    }

    /// Replace the whole generation-options map.
    pub fn options(mut self, options: GenerateOptions) -> Self {
        self.config.options = options;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, AskDocError> {
        let c = &self.config;
        if c.endpoint.trim().is_empty() {
            return Err(AskDocError::InvalidConfig("endpoint must not be empty".into()));
        }
        if !(72..=400).contains(&c.dpi) {
            return Err(AskDocError::InvalidConfig(format!(
                "DPI must be 72-400, got {}",
                c.dpi
            )));
        }
        Ok(self.config)
    }
}

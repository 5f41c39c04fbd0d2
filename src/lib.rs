//! # askdoc
//!
//! Ask natural-language questions about the contents of a local image or a
//! PDF page, using a vision-capable model served by an Ollama-compatible
//! HTTP endpoint.
//!
//! ## Pipeline Overview
//!
//! ```text
//! image / PDF page
//!  │
//!  ├─ 1. Resolve  image path, or rasterise the selected page via pdfium
//!  ├─ 2. Encode   PNG → base64
//!  ├─ 3. Prompt   free-text question, or batch prompt + JSON answer schema
//!  ├─ 4. Generate one non-streaming call to {endpoint}/api/generate
//!  └─ 5. Decode   raw text, or {"answers": [...]} → AnswerSet
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use askdoc::{ask_document_many, AnswerType, ClientConfig, Question};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .model("llava:7b")
//!         .option("temperature", 0)
//!         .build()?;
//!
//!     let questions = vec![
//!         Question::new("What is the title of the form?"),
//!         Question::typed("Is the consent box checked?", AnswerType::Boolean),
//!     ];
//!
//!     let answers = ask_document_many("form.pdf", &questions, 1, &config).await?;
//!     for item in &answers.answers {
//!         println!("{}: {}", item.question, item.answer);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `askdoc` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! askdoc = { version = "0.3", default-features = false }
//! ```
//!
//! The endpoint defaults to `http://localhost:11434`; the library never reads
//! environment variables — resolve `OLLAMA_ENDPOINT` / `OLLAMA_MODEL` in your
//! application and pass them through [`ClientConfig`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod answer;
pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod question;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use answer::{
    ask_document, ask_document_many, ask_document_many_sync, ask_document_sync, ask_image,
    ask_image_many,
};
pub use client::{GenerateRequest, GenerateResponse, GenerateTransport, HttpTransport, VisionClient};
pub use config::{ClientConfig, ClientConfigBuilder, GenerateOptions, DEFAULT_DPI, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS};
pub use decode::decode_answers;
pub use error::AskDocError;
pub use prompt::{build_batch_prompt, RESPONSE_SCHEMA};
pub use question::{AnswerItem, AnswerSet, AnswerType, Question};

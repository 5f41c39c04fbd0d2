//! CLI binary for askdoc.
//!
//! A thin shim over the library crate that maps CLI flags to a
//! `ClientConfig` and prints the answer(s).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use askdoc::{
    ask_document, ask_document_many, AnswerSet, ClientConfig, GenerateOptions, Question,
    DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS,
};

const AFTER_HELP: &str = r#"EXAMPLES:
  # One free-text question about an image
  askdoc scan.png "What is the title of the form?" --model llava:7b

  # One question about page 3 of a PDF
  askdoc report.pdf "Who signed the last section?" --model llava:7b --page 3

  # Typed question batch (inline JSON)
  askdoc form.pdf --model llava:7b --questions \
    '[{"question":"What is the title?"},{"question":"Is the box checked?","type":"boolean"}]'

  # Typed question batch from a file, deterministic sampling, JSON output
  askdoc form.pdf --model llava:7b --questions @questions.json \
    --option temperature=0 --json

ENVIRONMENT VARIABLES:
  OLLAMA_ENDPOINT   Model server address (default: http://localhost:11434)
  OLLAMA_MODEL      Default value for --model

EXIT CODES:
  0   success
  1   any caught error (message on stderr)
  130 interrupted (Ctrl-C)
"#;

/// Ask questions about an image or a PDF page using a local vision model.
#[derive(Parser, Debug)]
#[command(
    name = "askdoc",
    version,
    about = "Ask questions about an image or a PDF page using a local vision model",
    long_about = "Ask natural-language questions about a local image or one page of a local PDF \
using a vision-capable model served by an Ollama-compatible endpoint (e.g. llava).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP,
    group(ArgGroup::new("query").required(true).args(["question", "questions"]))
)]
struct Cli {
    /// Local image path or PDF path.
    input: String,

    /// One free-text question about the image/page.
    question: Option<String>,

    /// Typed question batch: a JSON array of {"question", "type"} objects,
    /// or @file to read the array from a file.
    #[arg(long)]
    questions: Option<String>,

    /// Model to use, e.g. llava:7b.
    #[arg(long, env = "OLLAMA_MODEL")]
    model: String,

    /// Model server HTTP endpoint.
    #[arg(long, env = "OLLAMA_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Model generation option (repeatable), e.g. --option temperature=0.
    /// Values are auto-typed as bool/int/float/string.
    #[arg(long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,

    /// 1-based page number when the input is a PDF.
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Rendering DPI for PDF pages (72-400).
    #[arg(long, default_value_t = 144,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// Output a JSON envelope instead of plain text.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors and the answer.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tokio::select! {
        result = run(&cli) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e:#}");
                ExitCode::from(1)
            }
        },
        _ = tokio::signal::ctrl_c() => ExitCode::from(130),
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = ClientConfig::builder()
        .endpoint(&cli.endpoint)
        .model(&cli.model)
        .timeout_secs(cli.timeout)
        .dpi(cli.dpi)
        .options(parse_options(&cli.options)?)
        .build()
        .context("Invalid configuration")?;

    if let Some(ref arg) = cli.questions {
        let questions = parse_questions(arg)?;
        let answers = ask_document_many(&cli.input, &questions, cli.page, &config).await?;
        print_answers(&answers, cli.json)?;
    } else {
        let question = cli.question.as_deref().expect("clap group guarantees one");
        let answer = ask_document(&cli.input, question, cli.page, &config).await?;
        if cli.json {
            println!("{}", serde_json::json!({ "answer": answer }));
        } else {
            println!("{answer}");
        }
    }

    Ok(())
}

/// Parse repeatable `KEY=VALUE` generation options, auto-typing the values.
fn parse_options(raw: &[String]) -> Result<GenerateOptions> {
    let mut options = GenerateOptions::new();
    for item in raw {
        let Some((key, value)) = item.split_once('=') else {
            bail!("Invalid --option '{item}', expected KEY=VALUE");
        };
        options.insert(key.to_string(), auto_type(value));
    }
    Ok(options)
}

/// Cast an option value to bool, int, float, or fall back to string.
fn auto_type(value: &str) -> Value {
    match value.to_lowercase().as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if value.contains('.') {
        if let Ok(f) = value.parse::<f64>() {
            if let Some(n) = serde_json::Number::from_f64(f) {
                return Value::Number(n);
            }
        }
    } else if let Ok(i) = value.parse::<i64>() {
        return Value::Number(i.into());
    }
    Value::String(value.to_string())
}

/// Parse `--questions`: inline JSON array, or `@file` containing one.
fn parse_questions(arg: &str) -> Result<Vec<Question>> {
    let text = if let Some(path) = arg.strip_prefix('@') {
        std::fs::read_to_string(PathBuf::from(path))
            .with_context(|| format!("Failed to read questions from '{path}'"))?
    } else {
        arg.to_string()
    };

    serde_json::from_str::<Vec<Question>>(&text)
        .context("Questions must be a JSON array of {\"question\", \"type\"} objects")
}

fn print_answers(answers: &AnswerSet, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(answers).context("Failed to serialise answers")?
        );
        return Ok(());
    }
    for (i, item) in answers.answers.iter().enumerate() {
        let value = match &item.answer {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        println!("{}. {}", i + 1, item.question);
        println!("   {value}");
        if let Some(ref comment) = item.comment {
            println!("   ({comment})");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_type_casts_values() {
        assert_eq!(auto_type("true"), Value::Bool(true));
        assert_eq!(auto_type("False"), Value::Bool(false));
        assert_eq!(auto_type("42"), serde_json::json!(42));
        assert_eq!(auto_type("0.5"), serde_json::json!(0.5));
        assert_eq!(auto_type("llava"), serde_json::json!("llava"));
        // Not a float despite the dot
        assert_eq!(auto_type("1.2.3"), serde_json::json!("1.2.3"));
    }

    #[test]
    fn parse_options_rejects_missing_equals() {
        let err = parse_options(&["temperature".to_string()]).unwrap_err();
        assert!(err.to_string().contains("KEY=VALUE"));
    }

    #[test]
    fn parse_options_builds_typed_map() {
        let options = parse_options(&[
            "temperature=0".to_string(),
            "num_ctx=4096".to_string(),
            "stop=###".to_string(),
        ])
        .unwrap();
        assert_eq!(options["temperature"], serde_json::json!(0));
        assert_eq!(options["num_ctx"], serde_json::json!(4096));
        assert_eq!(options["stop"], serde_json::json!("###"));
    }

    #[test]
    fn parse_questions_inline_array() {
        let questions = parse_questions(
            r#"[{"question":"Title?"},{"question":"Checked?","type":"boolean"}]"#,
        )
        .unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].text, "Title?");
    }

    #[test]
    fn parse_questions_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("questions.json");
        std::fs::write(&path, r#"[{"question":"Who signed it?"}]"#).unwrap();
        let arg = format!("@{}", path.display());
        let questions = parse_questions(&arg).unwrap();
        assert_eq!(questions.len(), 1);
    }

    #[test]
    fn parse_questions_rejects_bad_type_literal() {
        let err = parse_questions(r#"[{"question":"When?","type":"date"}]"#).unwrap_err();
        assert!(err.to_string().contains("JSON array"));
    }
}
